//! `/alliances/` routes

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use esi_common::{ClientError, EsiClient, EsiClientExt, EsiResult, Id, RequestParams, Route};
use n0_future::stream::Boxed;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::paginate;
use crate::resource::{IdSet, Iterated, SingleId};

/// `GET /alliances/`
pub const ALLIANCES: Route = Route::get("get_alliances", "/alliances/");
/// `GET /alliances/{alliance_id}/`
pub const ALLIANCE: Route = Route::get("get_alliances_alliance_id", "/alliances/{alliance_id}/");
/// `GET /alliances/{alliance_id}/corporations/`
pub const ALLIANCE_CORPORATIONS: Route = Route::get(
    "get_alliances_alliance_id_corporations",
    "/alliances/{alliance_id}/corporations/",
);

/// Public alliance information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllianceInfo {
    /// Full name
    pub name: SmolStr,
    /// Short name
    pub ticker: SmolStr,
    /// Character that founded the alliance
    pub creator_id: Id,
    /// Corporation that founded the alliance
    pub creator_corporation_id: Id,
    /// Corporation currently running the alliance, absent once it closed
    #[serde(default)]
    pub executor_corporation_id: Option<Id>,
    /// Founding time
    pub date_founded: DateTime<Utc>,
    /// Militia faction, if enlisted
    #[serde(default)]
    pub faction_id: Option<Id>,
}

async fn fetch_info<C>(client: &C, id: Id) -> EsiResult<AllianceInfo>
where
    C: EsiClient + Sync,
{
    client
        .request_json(&ALLIANCE, RequestParams::new().path("alliance_id", id), None)
        .await
}

/// One alliance
#[derive(Debug)]
pub struct Alliance<C> {
    client: Arc<C>,
    id: SingleId,
}

impl<C> Alliance<C>
where
    C: EsiClient + Send + Sync + 'static,
{
    /// Wrap the alliance with id `id`
    pub fn new(client: Arc<C>, id: Id) -> Self {
        Self {
            client,
            id: SingleId::new(id),
        }
    }

    /// The alliance id
    pub fn id(&self) -> Id {
        self.id.id()
    }

    /// Public information
    pub async fn details(&self) -> EsiResult<AllianceInfo> {
        let client = &*self.client;
        self.id.load(move |id| fetch_info(client, id)).await
    }

    /// Ids of member corporations
    pub async fn corporations(&self) -> EsiResult<Vec<Id>> {
        let client = &*self.client;
        self.id
            .load(move |id| {
                client.request_json(
                    &ALLIANCE_CORPORATIONS,
                    RequestParams::new().path("alliance_id", id),
                    None,
                )
            })
            .await
    }
}

/// A set of alliances looked up together
#[derive(Debug)]
pub struct Alliances<C> {
    client: Arc<C>,
    ids: IdSet<ClientError>,
}

impl<C> Alliances<C>
where
    C: EsiClient + Send + Sync + 'static,
{
    /// Wrap a fixed list of alliance ids. Repeats are dropped.
    pub fn by_ids(client: Arc<C>, ids: impl IntoIterator<Item = Id>) -> Self {
        Self {
            client,
            ids: IdSet::from_ids(ids),
        }
    }

    /// Every alliance in the game, as listed by ESI at the time of each call
    pub fn all(client: Arc<C>) -> Self {
        let source = client.clone();
        let ids = IdSet::from_provider(move || {
            let client = source.clone();
            async move {
                client
                    .request_json::<Vec<Id>>(&ALLIANCES, RequestParams::new(), None)
                    .await
            }
        });
        Self { client, ids }
    }

    /// The alliance ids
    pub async fn ids(&self) -> EsiResult<Vec<Id>> {
        self.ids.ids().await
    }

    /// Public information for every alliance, by id
    pub async fn details(&self) -> EsiResult<HashMap<Id, AllianceInfo>> {
        let client = &*self.client;
        self.ids.load_map(move |id| fetch_info(client, id)).await
    }
}

/// The full alliance listing as a stream
#[derive(Debug)]
pub struct AllAlliances<C> {
    client: Arc<C>,
    listing: Iterated<Id, ClientError>,
}

impl<C> AllAlliances<C>
where
    C: EsiClient + Send + Sync + 'static,
{
    /// Stream over `GET /alliances/`
    pub fn new(client: Arc<C>) -> Self {
        let source = client.clone();
        let streamer = paginate::array(move || {
            let client = source.clone();
            async move {
                client
                    .request_json::<Vec<Id>>(&ALLIANCES, RequestParams::new(), None)
                    .await
            }
        });
        Self {
            client,
            listing: Iterated::new(streamer, |id: &Id| *id),
        }
    }

    /// Every alliance id
    pub fn ids(&self) -> Boxed<EsiResult<Id>> {
        self.listing.ids()
    }

    /// Every alliance id with its public information, fetched one at a time
    pub fn details(&self) -> Boxed<EsiResult<(Id, AllianceInfo)>> {
        let client = self.client.clone();
        self.listing.load_each(move |id, _| {
            let client = client.clone();
            async move { fetch_info(&*client, id).await }
        })
    }

    /// Public information for one alliance, if it is listed
    pub async fn get(&self, id: Id) -> EsiResult<AllianceInfo> {
        let id = self.listing.get(id).await?;
        fetch_info(&*self.client, id).await
    }
}
