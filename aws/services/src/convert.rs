/// Numeric and boolean members come back either bare or optional depending on the member's
/// model, so both are accepted.
pub(crate) fn number<T>(value: impl Into<Option<T>>) -> Option<T> {
    value.into()
}

pub(crate) fn string(value: Option<&str>) -> String {
    value.unwrap_or_default().to_string()
}
