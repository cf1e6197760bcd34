//! Read-through proxy to the upstream location-detail RPC.
//!
//! [`LookupProxy::lookup`] is the single entry point: it validates a DANE
//! code, calls the upstream under a bounded wait, and normalizes whatever
//! response shape comes back into a [`LocationDetail`].

pub mod client;
pub mod error;
pub mod lookup;
pub mod normalize;
pub mod types;

pub use client::UpstreamClient;
pub use error::{ClientError, FailureReason, LookupError};
pub use lookup::{validate_code, LookupProxy};
pub use types::{LocationDetail, LookupResult};
