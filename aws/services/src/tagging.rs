/*!

Tags are kept in sync through each service's tagging calls rather than through the resource's own
create and update calls. A service client implements [`TaggingApi`]; the adapters use
[`read_tags`] and [`update_tags`] on top of it.

!*/

use async_trait::async_trait;
use log::debug;
use provider_model::tags::strip_defaults;
use provider_model::{Tags, TagsDiff};
use resource_adapter::ProviderResult;

#[async_trait]
pub trait TaggingApi: Send + Sync {
    async fn list_tags(&self, arn: &str) -> ProviderResult<Tags>;

    async fn tag_resource(&self, arn: &str, tags: &Tags) -> ProviderResult<()>;

    async fn untag_resource(&self, arn: &str, keys: &[String]) -> ProviderResult<()>;
}

/// Read the tags of `arn` and split them into the resource's own tags and `tags_all`.
pub async fn read_tags<A>(api: &A, arn: &str, defaults: &Tags) -> ProviderResult<(Tags, Tags)>
where
    A: TaggingApi + ?Sized,
{
    let all = api.list_tags(arn).await?;
    Ok((strip_defaults(defaults, &all), all))
}

/// Move `arn` from the `old` tags to the `new` ones. Removed keys are untagged before new and
/// changed values are written.
pub async fn update_tags<A>(api: &A, arn: &str, old: &Tags, new: &Tags) -> ProviderResult<()>
where
    A: TaggingApi + ?Sized,
{
    let diff = TagsDiff::new(old, new);
    if diff.is_empty() {
        return Ok(());
    }
    if !diff.remove.is_empty() {
        debug!("Removing tags {:?} from '{}'", diff.remove, arn);
        api.untag_resource(arn, &diff.remove).await?;
    }
    if !diff.upsert.is_empty() {
        debug!("Setting tags {:?} on '{}'", diff.upsert.keys(), arn);
        api.tag_resource(arn, &diff.upsert).await?;
    }
    Ok(())
}
