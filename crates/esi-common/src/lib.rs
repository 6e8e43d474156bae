//! Common types for the esi client crates
//!
//! This crate holds everything that sits on the wire side of the ESI client:
//! ids and page descriptors, the error types, the raw [`http_client::HttpClient`]
//! seam and the [`request::EsiClient`] capability that the pagination and
//! batching layer in `esi` is written against.

#![warn(missing_docs)]
pub use smol_str;
pub use url;

pub mod error;
/// HTTP client abstraction used by the esi crates.
pub mod http_client;
pub mod options;
pub mod page;
pub mod request;
/// Identifier types shared by every resource.
pub mod types;

pub use error::{ClientError, EsiResult, NotFound};
pub use options::{Datasource, EsiOptions};
pub use page::Page;
pub use request::{EsiClient, EsiClientExt, EsiResponse, RequestParams, Route, RouteMethod};
pub use types::{Id, Links};
