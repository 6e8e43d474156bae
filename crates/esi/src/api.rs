//! Resource wrappers for a handful of ESI routes
//!
//! Each wrapper composes the pieces in [`crate::resource`],
//! [`crate::paginate`], [`crate::batch`] and [`crate::resolve`] around an
//! [`EsiClient`](esi_common::EsiClient). Every call shape gets its own named
//! method (`by_id`, `by_ids`, `all`, ...) rather than one method that branches on
//! what it was given.

pub mod alliance;
pub mod killmail;
pub mod universe;
pub mod wallet;
