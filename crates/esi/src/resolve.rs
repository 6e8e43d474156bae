//! Resolve requested ids against a set of elements
//!
//! All four helpers take an `id_of` function that reads an element's id and
//! fail with [`NotFound`] when a requested id has no element. The stream
//! variants consume their stream by value: a stream is single-pass, so asking
//! again means producing a new one.

use std::collections::{HashMap, HashSet};

use esi_common::{Id, NotFound};
use n0_future::{Stream, StreamExt};

/// First element whose id is `id`.
pub fn filter_array<T, R>(elements: &[T], id: Id, id_of: R) -> Result<&T, NotFound>
where
    R: Fn(&T) -> Id,
{
    elements
        .iter()
        .find(|element| id_of(*element) == id)
        .ok_or(NotFound::new(id))
}

/// Map every requested id to its first matching element.
///
/// Ids are looked up in the order given and the first one without a match
/// fails the whole call.
pub fn filter_array_to_map<'a, T, R>(
    elements: &'a [T],
    ids: &[Id],
    id_of: R,
) -> Result<HashMap<Id, &'a T>, NotFound>
where
    R: Fn(&T) -> Id,
{
    ids.iter()
        .map(|&id| filter_array(elements, id, &id_of).map(|element| (id, element)))
        .collect()
}

/// Pull from `elements` until one with id `id` shows up.
///
/// Stops polling as soon as it matches. Upstream errors are returned as-is.
pub async fn filter_iterated<T, E, S, R>(elements: S, id: Id, id_of: R) -> Result<T, E>
where
    S: Stream<Item = Result<T, E>>,
    R: Fn(&T) -> Id,
    E: From<NotFound>,
{
    n0_future::pin!(elements);
    while let Some(element) = elements.next().await {
        let element = element?;
        if id_of(&element) == id {
            return Ok(element);
        }
    }
    Err(NotFound::new(id).into())
}

/// Collect the elements for every requested id in a single pass.
///
/// Polling stops early once every distinct requested id has been seen. If the
/// stream ends first, the error names the first requested id (in the order
/// given) that never showed up. The first element seen for an id wins.
pub async fn filter_iterated_to_map<T, E, S, R>(
    elements: S,
    ids: &[Id],
    id_of: R,
) -> Result<HashMap<Id, T>, E>
where
    S: Stream<Item = Result<T, E>>,
    R: Fn(&T) -> Id,
    E: From<NotFound>,
{
    let wanted: HashSet<Id> = ids.iter().copied().collect();
    let mut found: HashMap<Id, T> = HashMap::with_capacity(wanted.len());

    n0_future::pin!(elements);
    while found.len() < wanted.len() {
        let Some(element) = elements.next().await else {
            break;
        };
        let element = element?;
        let id = id_of(&element);
        if wanted.contains(&id) {
            found.entry(id).or_insert(element);
        }
    }

    if let Some(&missing) = ids.iter().find(|id| !found.contains_key(*id)) {
        return Err(NotFound::new(missing).into());
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Entry {
        id: Id,
        tag: &'static str,
    }

    #[derive(Debug, PartialEq, Eq)]
    enum TestError {
        Upstream,
        NotFound(Id),
    }

    impl From<NotFound> for TestError {
        fn from(e: NotFound) -> Self {
            Self::NotFound(e.id)
        }
    }

    fn entry(id: Id) -> Entry {
        Entry { id, tag: "" }
    }

    fn ok_stream(entries: Vec<Entry>) -> impl Stream<Item = Result<Entry, TestError>> {
        stream::iter(entries.into_iter().map(Ok))
    }

    #[test]
    fn filter_array_first_match_wins() {
        let elements = vec![
            Entry { id: 1, tag: "a" },
            Entry { id: 2, tag: "b" },
            Entry { id: 1, tag: "c" },
        ];
        assert_eq!(filter_array(&elements, 1, |e| e.id).unwrap().tag, "a");
        assert_eq!(filter_array(&elements, 9, |e| e.id), Err(NotFound::new(9)));
    }

    #[test]
    fn filter_array_to_map_completeness() {
        let elements = vec![entry(1), entry(2), entry(3)];

        let map = filter_array_to_map(&elements, &[1, 3], |e| e.id).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map[&1], &entry(1));
        assert_eq!(map[&3], &entry(3));

        let err = filter_array_to_map(&elements, &[1, 4], |e| e.id).unwrap_err();
        assert_eq!(err, NotFound::new(4));
    }

    #[test]
    fn filter_array_to_map_fails_on_first_missing_in_request_order() {
        let elements = vec![entry(1)];
        let err = filter_array_to_map(&elements, &[7, 1, 8], |e| e.id).unwrap_err();
        assert_eq!(err.id, 7);
    }

    #[tokio::test]
    async fn filter_iterated_stops_on_match() {
        let polled = Arc::new(AtomicUsize::new(0));
        let counter = polled.clone();
        let elements = ok_stream((1..=10).map(entry).collect()).inspect(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let found = filter_iterated(elements, 3, |e: &Entry| e.id).await.unwrap();
        assert_eq!(found, entry(3));
        assert_eq!(polled.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn filter_iterated_reports_missing_id() {
        let err = filter_iterated(ok_stream(vec![entry(1)]), 5, |e: &Entry| e.id)
            .await
            .unwrap_err();
        assert_eq!(err, TestError::NotFound(5));
    }

    #[tokio::test]
    async fn filter_iterated_passes_upstream_errors_through() {
        let elements = stream::iter(vec![Ok(entry(1)), Err(TestError::Upstream), Ok(entry(2))]);
        let err = filter_iterated(elements, 2, |e: &Entry| e.id)
            .await
            .unwrap_err();
        assert_eq!(err, TestError::Upstream);
    }

    #[tokio::test]
    async fn consumed_stream_cannot_match_again() {
        let mut elements = ok_stream(vec![entry(1), entry(2), entry(3)]).boxed();

        let found = filter_iterated(&mut elements, 3, |e: &Entry| e.id).await.unwrap();
        assert_eq!(found.id, 3);

        let again = filter_iterated(&mut elements, 3, |e: &Entry| e.id).await;
        assert_eq!(again, Err(TestError::NotFound(3)));
        assert!(elements.next().await.is_none());
    }

    #[tokio::test]
    async fn filter_iterated_to_map_collects_requested_ids() {
        let elements = ok_stream(vec![entry(5), entry(1), entry(3), entry(1)]);
        let map = filter_iterated_to_map(elements, &[1, 3], |e: &Entry| e.id)
            .await
            .unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map[&1], entry(1));
        assert_eq!(map[&3], entry(3));
    }

    #[tokio::test]
    async fn filter_iterated_to_map_exits_early() {
        let polled = Arc::new(AtomicUsize::new(0));
        let counter = polled.clone();
        let elements = ok_stream((1..=100).map(entry).collect()).inspect(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let map = filter_iterated_to_map(elements, &[2, 4, 2], |e: &Entry| e.id)
            .await
            .unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(polled.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn filter_iterated_to_map_names_first_missing_id() {
        let elements = ok_stream(vec![entry(1), entry(2)]);
        let err = filter_iterated_to_map(elements, &[2, 9, 1, 8], |e: &Entry| e.id)
            .await
            .unwrap_err();
        assert_eq!(err, TestError::NotFound(9));
    }

    #[tokio::test]
    async fn filter_iterated_to_map_with_no_ids_is_empty() {
        let map = filter_iterated_to_map(ok_stream(vec![entry(1)]), &[], |e: &Entry| e.id)
            .await
            .unwrap();
        assert!(map.is_empty());
    }
}
