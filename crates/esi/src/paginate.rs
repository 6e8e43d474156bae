//! Pagination engines
//!
//! Each engine turns a loader closure into a [`Streamer`]: a cloneable factory
//! that hands out a fresh, lazy, single-pass stream of elements every time
//! [`Streamer::stream`] is called. Pagination state (page number or cursor)
//! lives inside the stream, so two streams from the same streamer never share
//! progress. A stream only fetches the next page once the consumer has pulled
//! every element of the current one, and yields `None` forever after it ends.
//!
//! Loaders may return either a bare `Vec<T>` or a [`Page<T>`]; anything that
//! converts into a page works.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_stream::stream;
use esi_common::{Id, Page};
use n0_future::Stream;
use n0_future::stream::Boxed;

/// Factory for fresh element streams over one logical resource.
pub struct Streamer<T, E> {
    make: Arc<dyn Fn() -> Boxed<Result<T, E>> + Send + Sync>,
}

impl<T, E> Streamer<T, E> {
    /// Wrap a stream factory
    pub fn new<F, S>(make: F) -> Self
    where
        F: Fn() -> S + Send + Sync + 'static,
        S: Stream<Item = Result<T, E>> + Send + 'static,
    {
        Self {
            make: Arc::new(move || Box::pin(make()) as Boxed<Result<T, E>>),
        }
    }

    /// Start a new pass over the resource from the beginning
    pub fn stream(&self) -> Boxed<Result<T, E>> {
        (self.make)()
    }
}

impl<T, E> Clone for Streamer<T, E> {
    fn clone(&self) -> Self {
        Self {
            make: self.make.clone(),
        }
    }
}

impl<T, E> fmt::Debug for Streamer<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Streamer").finish_non_exhaustive()
    }
}

fn is_short_page(count: usize, max_page_size: Option<usize>) -> bool {
    max_page_size.is_some_and(|size| count < size)
}

/// Page-number pagination.
///
/// Pages are requested starting at 1. The stream ends on the first empty
/// page, on a page shorter than `max_page_size` (when given), or once the page
/// number reaches the `max_pages` the server declared. If none of those ever
/// happen the stream is unbounded.
pub fn page_based<T, E, P, F, Fut>(loader: F, max_page_size: Option<usize>) -> Streamer<T, E>
where
    F: Fn(u32) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<P, E>> + Send + 'static,
    P: Into<Page<T>> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    let loader = Arc::new(loader);
    Streamer::new(move || page_stream(loader.clone(), max_page_size))
}

fn page_stream<T, E, P, F, Fut>(
    loader: Arc<F>,
    max_page_size: Option<usize>,
) -> impl Stream<Item = Result<T, E>> + Send + 'static
where
    F: Fn(u32) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<P, E>> + Send + 'static,
    P: Into<Page<T>> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    stream! {
        let mut page_number: u32 = 1;
        let mut max_pages: Option<u32> = None;
        loop {
            let page: Page<T> = match (*loader)(page_number).await {
                Ok(page) => page.into(),
                Err(e) => {
                    yield Err(e);
                    break;
                }
            };
            if max_pages.is_none() {
                max_pages = page.max_pages;
            }
            let count = page.len();
            #[cfg(feature = "tracing")]
            tracing::trace!(page = page_number, count, ?max_pages, "fetched page");
            if count == 0 {
                break;
            }
            for element in page.elements {
                yield Ok(element);
            }
            if is_short_page(count, max_page_size) {
                break;
            }
            if max_pages.is_some_and(|max| page_number >= max) {
                break;
            }
            page_number += 1;
        }
    }
}

/// Max-id (cursor) pagination for feeds ordered by id, newest first.
///
/// The first page is requested with no cursor; every following page is
/// requested with the id of the previous page's last element, as resolved by
/// `id_resolver`. Ends on an empty page or a short page.
pub fn max_id<T, E, P, F, Fut, R>(
    loader: F,
    id_resolver: R,
    max_page_size: Option<usize>,
) -> Streamer<T, E>
where
    F: Fn(Option<Id>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<P, E>> + Send + 'static,
    P: Into<Page<T>> + Send + 'static,
    R: Fn(&T) -> Id + Send + Sync + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    let loader = Arc::new(loader);
    let id_resolver = Arc::new(id_resolver);
    Streamer::new(move || cursor_stream(loader.clone(), id_resolver.clone(), max_page_size))
}

fn cursor_stream<T, E, P, F, Fut, R>(
    loader: Arc<F>,
    id_resolver: Arc<R>,
    max_page_size: Option<usize>,
) -> impl Stream<Item = Result<T, E>> + Send + 'static
where
    F: Fn(Option<Id>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<P, E>> + Send + 'static,
    P: Into<Page<T>> + Send + 'static,
    R: Fn(&T) -> Id + Send + Sync + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    stream! {
        let mut cursor: Option<Id> = None;
        loop {
            let page: Page<T> = match (*loader)(cursor).await {
                Ok(page) => page.into(),
                Err(e) => {
                    yield Err(e);
                    break;
                }
            };
            let count = page.len();
            #[cfg(feature = "tracing")]
            tracing::trace!(?cursor, count, "fetched page");
            if count == 0 {
                break;
            }
            let next = page.elements.last().map(|last| (*id_resolver)(last));
            for element in page.elements {
                yield Ok(element);
            }
            if is_short_page(count, max_page_size) {
                break;
            }
            cursor = next;
        }
    }
}

/// Single-shot "pagination" for bulk routes that return everything at once.
pub fn array<T, E, F, Fut>(loader: F) -> Streamer<T, E>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<T>, E>> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    let loader = Arc::new(loader);
    Streamer::new(move || {
        let loader = loader.clone();
        stream! {
            match (*loader)().await {
                Ok(elements) => {
                    for element in elements {
                        yield Ok(element);
                    }
                }
                Err(e) => {
                    yield Err(e);
                }
            }
        }
    })
}
