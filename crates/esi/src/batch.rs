//! Batch resolver
//!
//! ESI's bulk routes cap how many ids one request may carry. These helpers
//! split an id list into groups of at most `batch_size`, send one request per
//! group, and put the results back together in group order.
//!
//! Requesters passed to [`resolve_batched`] and [`get_batched_values`] must
//! return exactly one element per id, in the same order as the ids they were
//! given. Nothing here checks that.

use std::collections::HashMap;
use std::future::Future;

use async_stream::stream;
use esi_common::Id;
use futures::future::try_join_all;
use indexmap::IndexSet;
use n0_future::{Stream, StreamExt};

/// Split `ids` into consecutive groups of at most `batch_size` ids.
///
/// A `batch_size` of zero is treated as one.
pub fn partition(ids: &[Id], batch_size: usize) -> Vec<&[Id]> {
    ids.chunks(batch_size.max(1)).collect()
}

/// Request every group concurrently and pair each element with the id at the
/// same position in its group.
pub async fn resolve_batched<T, E, F, Fut>(
    ids: &[Id],
    requester: F,
    batch_size: usize,
) -> Result<Vec<(T, Id)>, E>
where
    F: Fn(Vec<Id>) -> Fut,
    Fut: Future<Output = Result<Vec<T>, E>>,
{
    let groups = partition(ids, batch_size);
    #[cfg(feature = "tracing")]
    tracing::debug!(
        ids = ids.len(),
        groups = groups.len(),
        batch_size,
        "resolving batched ids"
    );

    let results = try_join_all(groups.iter().map(|group| requester(group.to_vec()))).await?;

    let mut resolved = Vec::with_capacity(ids.len());
    for (group, elements) in groups.into_iter().zip(results) {
        #[cfg(feature = "tracing")]
        {
            if elements.len() != group.len() {
                tracing::warn!(
                    requested = group.len(),
                    returned = elements.len(),
                    "batch result is not aligned with its id group"
                );
            }
        }
        resolved.extend(elements.into_iter().zip(group.iter().copied()));
    }
    Ok(resolved)
}

/// [`resolve_batched`], folded into an id → value map through `resolver`.
///
/// Later entries overwrite earlier ones if `resolver` maps two elements to the
/// same id.
pub async fn get_batched_values<T, V, E, F, Fut, R>(
    ids: &[Id],
    requester: F,
    resolver: R,
    batch_size: usize,
) -> Result<HashMap<Id, V>, E>
where
    F: Fn(Vec<Id>) -> Fut,
    Fut: Future<Output = Result<Vec<T>, E>>,
    R: Fn(T, Id) -> (Id, V),
{
    let resolved = resolve_batched(ids, requester, batch_size).await?;
    Ok(resolved
        .into_iter()
        .map(|(element, id)| resolver(element, id))
        .collect())
}

/// Request every group concurrently and concatenate the raw results in group
/// order.
pub async fn get_raw_values<T, E, F, Fut>(
    ids: &[Id],
    requester: F,
    batch_size: usize,
) -> Result<Vec<T>, E>
where
    F: Fn(Vec<Id>) -> Fut,
    Fut: Future<Output = Result<Vec<T>, E>>,
{
    let groups = partition(ids, batch_size);
    let results = try_join_all(groups.iter().map(|group| requester(group.to_vec()))).await?;
    Ok(results.into_iter().flatten().collect())
}

/// Batch ids pulled from a stream.
///
/// Ids are gathered into a window that drops repeats. As soon as the window
/// holds `batch_size` distinct ids it is sent as one request, and every element
/// of the response is mapped through `resolver` and yielded before the next id
/// is pulled. Whatever is left when the source ends is sent the same way.
///
/// Repeats are only dropped within one window: an id that shows up again
/// after its window was flushed is requested again.
///
/// The first error, from either the id source or the requester, is yielded and
/// ends the stream.
pub fn stream_batched<S, T, V, E, F, Fut, R>(
    ids: S,
    requester: F,
    resolver: R,
    batch_size: usize,
) -> impl Stream<Item = Result<(Id, V), E>>
where
    S: Stream<Item = Result<Id, E>>,
    F: Fn(Vec<Id>) -> Fut,
    Fut: Future<Output = Result<Vec<T>, E>>,
    R: Fn(T) -> (Id, V),
{
    let batch_size = batch_size.max(1);
    stream! {
        n0_future::pin!(ids);
        let mut window: IndexSet<Id> = IndexSet::with_capacity(batch_size);
        loop {
            let exhausted = match ids.next().await {
                Some(Ok(id)) => {
                    window.insert(id);
                    false
                }
                Some(Err(e)) => {
                    yield Err(e);
                    return;
                }
                None => true,
            };

            if window.len() >= batch_size || (exhausted && !window.is_empty()) {
                let group: Vec<Id> = window.drain(..).collect();
                #[cfg(feature = "tracing")]
                tracing::debug!(size = group.len(), "flushing id window");
                match requester(group).await {
                    Ok(elements) => {
                        for element in elements {
                            yield Ok(resolver(element));
                        }
                    }
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                }
            }

            if exhausted {
                break;
            }
        }
    }
}
