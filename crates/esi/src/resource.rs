//! Building blocks for resource wrappers
//!
//! A wrapper picks whichever of these it needs and holds it as a field:
//! [`SingleId`] for routes keyed by one id, [`IdSet`] for routes that fan out
//! over many ids, and [`Iterated`] for routes that can list every element.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_stream::stream;
use esi_common::types::dedup_ids;
use esi_common::{Id, NotFound};
use futures::future::{BoxFuture, try_join_all};
use n0_future::StreamExt;
use n0_future::stream::Boxed;

use crate::paginate::Streamer;
use crate::resolve::{filter_iterated, filter_iterated_to_map};

/// A resource addressed by one fixed id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SingleId {
    id: Id,
}

impl SingleId {
    /// Wrap an id
    pub const fn new(id: Id) -> Self {
        Self { id }
    }

    /// The wrapped id
    pub const fn id(&self) -> Id {
        self.id
    }

    /// Run `loader` with the wrapped id.
    pub async fn load<T, E, F, Fut>(&self, loader: F) -> Result<T, E>
    where
        F: FnOnce(Id) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        loader(self.id).await
    }
}

impl From<Id> for SingleId {
    fn from(id: Id) -> Self {
        Self::new(id)
    }
}

type IdProvider<E> = Arc<dyn Fn() -> BoxFuture<'static, Result<Vec<Id>, E>> + Send + Sync>;

enum IdSource<E> {
    Fixed(Arc<[Id]>),
    Provider(IdProvider<E>),
}

/// A resource addressed by a set of ids.
///
/// The ids are either fixed up front (repeats removed, first occurrence kept)
/// or fetched on demand from a provider. Provider output is taken as-is and
/// must not contain repeats.
pub struct IdSet<E> {
    source: IdSource<E>,
}

impl<E> IdSet<E> {
    /// Fixed ids. Repeats are dropped here, once.
    pub fn from_ids(ids: impl IntoIterator<Item = Id>) -> Self {
        Self {
            source: IdSource::Fixed(dedup_ids(ids).into()),
        }
    }

    /// Ids fetched through `provider` every time they are asked for
    pub fn from_provider<F, Fut>(provider: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<Id>, E>> + Send + 'static,
    {
        Self {
            source: IdSource::Provider(Arc::new(
                move || -> BoxFuture<'static, Result<Vec<Id>, E>> { Box::pin(provider()) },
            )),
        }
    }

    /// The ids, if they are fixed rather than provided
    pub fn fixed(&self) -> Option<&[Id]> {
        match &self.source {
            IdSource::Fixed(ids) => Some(&ids[..]),
            IdSource::Provider(_) => None,
        }
    }

    /// The ids in order.
    pub async fn ids(&self) -> Result<Vec<Id>, E> {
        match &self.source {
            IdSource::Fixed(ids) => Ok(ids.to_vec()),
            IdSource::Provider(provider) => provider().await,
        }
    }

    /// The ids as a set
    pub async fn id_set(&self) -> Result<HashSet<Id>, E> {
        Ok(self.ids().await?.into_iter().collect())
    }

    /// Run `loader` for every id concurrently and collect the results by id.
    ///
    /// The first failing load fails the whole call.
    pub async fn load_map<V, F, Fut>(&self, loader: F) -> Result<HashMap<Id, V>, E>
    where
        F: Fn(Id) -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let ids = self.ids().await?;
        #[cfg(feature = "tracing")]
        tracing::debug!(count = ids.len(), "loading id set");
        let values = try_join_all(ids.iter().map(|&id| loader(id))).await?;
        Ok(ids.into_iter().zip(values).collect())
    }
}

impl<E> Clone for IdSet<E> {
    fn clone(&self) -> Self {
        let source = match &self.source {
            IdSource::Fixed(ids) => IdSource::Fixed(ids.clone()),
            IdSource::Provider(provider) => IdSource::Provider(provider.clone()),
        };
        Self { source }
    }
}

impl<E> fmt::Debug for IdSet<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            IdSource::Fixed(ids) => f.debug_tuple("IdSet").field(ids).finish(),
            IdSource::Provider(_) => f.write_str("IdSet(<provider>)"),
        }
    }
}

/// A resource that can list all of its elements.
///
/// Pairs a [`Streamer`] with the function that reads an element's id. Every
/// stream handed out starts a new pass from the first page.
pub struct Iterated<T, E> {
    streamer: Streamer<T, E>,
    id_of: Arc<dyn Fn(&T) -> Id + Send + Sync>,
}

impl<T, E> Iterated<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// Combine a streamer with an id reader
    pub fn new<R>(streamer: Streamer<T, E>, id_of: R) -> Self
    where
        R: Fn(&T) -> Id + Send + Sync + 'static,
    {
        Self {
            streamer,
            id_of: Arc::new(id_of),
        }
    }

    /// The underlying streamer
    pub fn streamer(&self) -> &Streamer<T, E> {
        &self.streamer
    }

    /// Id of one element
    pub fn id_of(&self, element: &T) -> Id {
        (self.id_of)(element)
    }

    /// Every element, without ids
    pub fn elements(&self) -> Boxed<Result<T, E>> {
        self.streamer.stream()
    }

    /// Every element paired with its id
    pub fn entries(&self) -> Boxed<Result<(Id, T), E>> {
        let id_of = self.id_of.clone();
        self.streamer
            .stream()
            .map(move |element| element.map(|element| (id_of(&element), element)))
            .boxed()
    }

    /// Every element's id
    pub fn ids(&self) -> Boxed<Result<Id, E>> {
        let id_of = self.id_of.clone();
        self.streamer
            .stream()
            .map(move |element| element.map(|element| id_of(&element)))
            .boxed()
    }

    /// Every id paired with what `loader` returns for it.
    ///
    /// `loader` also receives the element the id was read from, for resources
    /// that need more than the id to fetch details. Loads run one at a time as
    /// the stream is pulled; the first error is yielded and ends the stream.
    pub fn load_each<V, F, Fut>(&self, loader: F) -> Boxed<Result<(Id, V), E>>
    where
        F: Fn(Id, T) -> Fut + Send + 'static,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
        V: Send + 'static,
    {
        let mut entries = self.entries();
        Box::pin(stream! {
            while let Some(entry) = entries.next().await {
                let (id, element) = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                };
                let load = loader(id, element);
                match load.await {
                    Ok(value) => {
                        yield Ok((id, value));
                    }
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                }
            }
        })
    }

    /// Every element, collected
    pub async fn collect(&self) -> Result<Vec<T>, E> {
        self.streamer.stream().try_collect().await
    }
}

impl<T, E> Iterated<T, E>
where
    T: Send + 'static,
    E: From<NotFound> + Send + 'static,
{
    /// Scan a fresh pass for the element with id `id`.
    pub async fn get(&self, id: Id) -> Result<T, E> {
        filter_iterated(self.streamer.stream(), id, |element: &T| (self.id_of)(element)).await
    }

    /// Scan a fresh pass for every id in `ids`, failing if any is missing.
    pub async fn get_many(&self, ids: &[Id]) -> Result<HashMap<Id, T>, E> {
        filter_iterated_to_map(self.streamer.stream(), ids, |element: &T| {
            (self.id_of)(element)
        })
        .await
    }
}

impl<T, E> Clone for Iterated<T, E> {
    fn clone(&self) -> Self {
        Self {
            streamer: self.streamer.clone(),
            id_of: self.id_of.clone(),
        }
    }
}

impl<T, E> fmt::Debug for Iterated<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iterated")
            .field("streamer", &self.streamer)
            .finish_non_exhaustive()
    }
}
