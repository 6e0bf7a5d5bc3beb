//! Request-side types.
//!
//! These types enforce their invariants at construction time, so the
//! pipeline never has to re-validate a URL or a method.

mod api_url;
mod descriptor;
mod method;
mod wire;

pub use api_url::ApiUrl;
pub use descriptor::RequestDescriptor;
pub use method::Method;
pub use wire::{OutgoingRequest, RawResponse};
