//! Killmails
//!
//! ESI lists killmails as `(killmail_id, killmail_hash)` links; the details
//! route needs both halves, so loading details goes through the link rather
//! than the id alone.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use esi_common::{
    ClientError, EsiClient, EsiClientExt, EsiResult, Id, Links, NotFound, RequestParams, Route,
};
use n0_future::StreamExt;
use n0_future::stream::Boxed;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::paginate;
use crate::resource::{IdSet, Iterated, SingleId};

/// `GET /corporations/{corporation_id}/killmails/recent/`
pub const CORPORATION_RECENT: Route = Route::get(
    "get_corporations_corporation_id_killmails_recent",
    "/corporations/{corporation_id}/killmails/recent/",
);

/// `GET /killmails/{killmail_id}/{killmail_hash}/`
pub const KILLMAIL: Route = Route::get(
    "get_killmails_killmail_id_killmail_hash",
    "/killmails/{killmail_id}/{killmail_hash}/",
);

/// Links per page of the recent killmails listing
pub const RECENT_PAGE_SIZE: usize = 1000;

/// The two halves of a killmail's key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KillmailLink {
    /// Killmail id
    pub killmail_id: Id,
    /// Hash that authorizes reading the killmail
    pub killmail_hash: SmolStr,
}

/// The ship that died
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Victim {
    /// Hull type
    pub ship_type_id: Id,
    /// Pilot, absent for structures and NPCs
    #[serde(default)]
    pub character_id: Option<Id>,
    /// Owning corporation
    #[serde(default)]
    pub corporation_id: Option<Id>,
    /// Owning alliance
    #[serde(default)]
    pub alliance_id: Option<Id>,
    /// Total damage taken
    pub damage_taken: u64,
}

/// One participant on the killing side
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attacker {
    /// Pilot, absent for NPCs
    #[serde(default)]
    pub character_id: Option<Id>,
    /// Corporation of the pilot
    #[serde(default)]
    pub corporation_id: Option<Id>,
    /// Hull type
    #[serde(default)]
    pub ship_type_id: Option<Id>,
    /// Damage dealt
    pub damage_done: u64,
    /// Whether this attacker landed the last hit
    pub final_blow: bool,
}

/// Killmail details
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Killmail {
    /// Killmail id
    pub killmail_id: Id,
    /// Time of death
    pub killmail_time: DateTime<Utc>,
    /// Where it happened
    pub solar_system_id: Id,
    /// The loss
    pub victim: Victim,
    /// Everyone who got on the mail
    pub attackers: Vec<Attacker>,
}

/// Fetch one killmail's details
pub async fn fetch_killmail<C>(
    client: &C,
    killmail_id: Id,
    killmail_hash: &str,
) -> EsiResult<Killmail>
where
    C: EsiClient + Sync,
{
    let params = RequestParams::new()
        .path("killmail_id", killmail_id)
        .path("killmail_hash", killmail_hash);
    client.request_json(&KILLMAIL, params, None).await
}

/// Details for every killmail in `links`, fetched concurrently
pub async fn fetch_linked<C>(client: &C, links: &Links) -> EsiResult<HashMap<Id, Killmail>>
where
    C: EsiClient + Sync,
{
    let ids: IdSet<ClientError> = IdSet::from_ids(links.keys().copied());
    ids.load_map(|id| async move {
        let Some(hash) = links.get(&id) else {
            return Err(ClientError::from(NotFound::new(id)));
        };
        fetch_killmail(client, id, hash).await
    })
    .await
}

/// A corporation's recent kills and losses
#[derive(Debug)]
pub struct CorporationKillmails<C> {
    client: Arc<C>,
    corporation: SingleId,
    recent: Iterated<KillmailLink, ClientError>,
}

impl<C> CorporationKillmails<C>
where
    C: EsiClient + Send + Sync + 'static,
{
    /// Killmails of `corporation_id`, read with `token`
    pub fn new(client: Arc<C>, corporation_id: Id, token: impl Into<SmolStr>) -> Self {
        let token: SmolStr = token.into();
        let source = client.clone();
        let streamer: paginate::Streamer<KillmailLink, ClientError> = paginate::page_based(
            move |page: u32| {
                let client = source.clone();
                let token = token.clone();
                async move {
                    let params = RequestParams::new()
                        .path("corporation_id", corporation_id)
                        .query("page", page);
                    client
                        .request_page::<KillmailLink>(
                            &CORPORATION_RECENT,
                            params,
                            Some(token.as_str()),
                        )
                        .await
                }
            },
            Some(RECENT_PAGE_SIZE),
        );
        Self {
            client,
            corporation: SingleId::new(corporation_id),
            recent: Iterated::new(streamer, |link: &KillmailLink| link.killmail_id),
        }
    }

    /// The corporation id
    pub fn corporation_id(&self) -> Id {
        self.corporation.id()
    }

    /// Every recent killmail link
    pub fn recent(&self) -> Boxed<EsiResult<KillmailLink>> {
        self.recent.elements()
    }

    /// Every recent killmail id
    pub fn ids(&self) -> Boxed<EsiResult<Id>> {
        self.recent.ids()
    }

    /// Recent killmail ids mapped to their hashes
    pub async fn links(&self) -> EsiResult<Links> {
        self.recent
            .entries()
            .map(|entry| entry.map(|(id, link)| (id, link.killmail_hash)))
            .try_collect()
            .await
    }

    /// Details of every recent killmail, fetched one at a time as the stream is
    /// pulled
    pub fn details(&self) -> Boxed<EsiResult<(Id, Killmail)>> {
        let client = self.client.clone();
        self.recent.load_each(move |id, link| {
            let client = client.clone();
            async move { fetch_killmail(&*client, id, &link.killmail_hash).await }
        })
    }

    /// Details of one recent killmail
    pub async fn get(&self, killmail_id: Id) -> EsiResult<Killmail> {
        let link = self.recent.get(killmail_id).await?;
        fetch_killmail(&*self.client, link.killmail_id, &link.killmail_hash).await
    }
}
