/*!

This library provides the data model shared by resource adapters: attribute trees and their
flattened form, nested block representation, identifiers, tags and validation.

!*/

#![deny(
    clippy::expect_used,
    clippy::get_unwrap,
    clippy::panic,
    clippy::panic_in_result_fn,
    clippy::panicking_unwrap,
    clippy::unwrap_in_result,
    clippy::unwrap_used
)]

pub use attributes::{normalize, Attributes};
pub use configuration::Configuration;
pub use error::{Error, Result};
pub use id::{split_id, OpaqueId, ResourceId};
pub use tags::{Tags, TagsDiff};
pub use validation::{AttributePath, Validate};

pub mod attributes;
pub mod block;
mod configuration;
mod error;
mod id;
pub mod tags;
pub mod validation;
