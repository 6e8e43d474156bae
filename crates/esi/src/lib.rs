//! # esi
//!
//! Pagination, batching and id resolution for the EVE Swagger Interface.
//!
//! ESI hands data out in a few recurring shapes: bulk routes that take a
//! capped list of ids, listings split into numbered pages, feeds that page
//! backwards from the last id seen, and single-shot arrays. This crate turns
//! each shape into one reusable primitive, so resource wrappers only describe
//! *which* route to call and *how* to read an id off an element.
//!
//! - [`batch`]: split id lists into groups, request them concurrently, and
//!   put the answers back together.
//! - [`paginate`]: lazy, restartable element streams over paginated routes.
//! - [`resolve`]: find the elements for requested ids, or fail with
//!   [`NotFound`].
//! - [`resource`]: the single-id, id-set and full-listing building blocks.
//! - [`client`]: [`EsiAgent`], the [`EsiClient`] that sends requests.
//! - [`api`]: a few wrappers built from the above.
//!
//! ## Example
//!
//! ```no_run
//! # async fn run() -> miette::Result<()> {
//! use std::sync::Arc;
//! use esi::api::universe::Names;
//! use esi::client::EsiAgent;
//! use esi::EsiOptions;
//!
//! let options = EsiOptions::new().user_agent("my-tool (me@example.com)").build();
//! let agent = Arc::new(EsiAgent::new(reqwest::Client::new(), options));
//!
//! let names = Names::new(agent).by_ids(&[99000006, 1000125]).await?;
//! for (id, name) in names {
//!     println!("{id}: {}", name.name);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Streams
//!
//! Every stream handed out by a [`paginate::Streamer`] is single-pass. Once it
//! ends it stays ended; to read the resource again, ask the streamer for a new
//! stream. Pages are only fetched as the consumer pulls elements.

#![warn(missing_docs)]

pub mod api;
pub mod batch;
pub mod client;
pub mod paginate;
pub mod resolve;
pub mod resource;

pub use client::EsiAgent;
#[cfg(feature = "reqwest-client")]
pub use client::BasicClient;
pub use esi_common::*;
