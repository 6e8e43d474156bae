//! `/universe/names/`: bulk id to name lookup

use std::collections::HashMap;
use std::sync::Arc;

use esi_common::types::dedup_ids;
use esi_common::{EsiClient, EsiClientExt, EsiResult, Id, NotFound, RequestParams, Route};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::batch::get_raw_values;
use crate::resolve::filter_array_to_map;

/// `POST /universe/names/`
pub const NAMES: Route = Route::post("post_universe_names", "/universe/names/");

/// Most ids one `/universe/names/` call accepts
pub const NAMES_BATCH_SIZE: usize = 1000;

/// What kind of entity a resolved name belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum NameCategory {
    Alliance,
    Character,
    Constellation,
    Corporation,
    InventoryType,
    Region,
    SolarSystem,
    Station,
    Faction,
}

/// One resolved name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Name {
    /// The id that was looked up
    pub id: Id,
    /// Its name
    pub name: SmolStr,
    /// Its kind
    pub category: NameCategory,
}

async fn fetch_names<C>(client: &C, ids: Vec<Id>) -> EsiResult<Vec<Name>>
where
    C: EsiClient + Sync,
{
    let params = RequestParams::new().body(&ids)?;
    client.request_json(&NAMES, params, None).await
}

/// Name lookups for any mix of entity ids
#[derive(Debug, Clone)]
pub struct Names<C> {
    client: Arc<C>,
    batch_size: usize,
}

impl<C> Names<C>
where
    C: EsiClient + Send + Sync + 'static,
{
    /// Look names up through `client`, using its batch size capped at
    /// [`NAMES_BATCH_SIZE`]
    pub fn new(client: Arc<C>) -> Self {
        let batch_size = client.batch_size();
        Self::with_batch_size(client, batch_size)
    }

    /// Look names up with a custom group size, capped at [`NAMES_BATCH_SIZE`]
    pub fn with_batch_size(client: Arc<C>, batch_size: usize) -> Self {
        Self {
            client,
            batch_size: batch_size.min(NAMES_BATCH_SIZE),
        }
    }

    /// Names for every id in `ids`.
    ///
    /// Ids are split into groups that are sent concurrently. ESI answers in
    /// its own order, so results are matched back by id, and any id it did
    /// not answer for fails the call with [`NotFound`].
    pub async fn by_ids(&self, ids: &[Id]) -> EsiResult<HashMap<Id, Name>> {
        let ids = dedup_ids(ids.iter().copied());
        let client = &*self.client;
        let names = get_raw_values(&ids, move |group| fetch_names(client, group), self.batch_size)
            .await?;
        let found = filter_array_to_map(&names, &ids, |name: &Name| name.id)?;
        Ok(found
            .into_iter()
            .map(|(id, name)| (id, name.clone()))
            .collect())
    }

    /// Name for one id
    pub async fn by_id(&self, id: Id) -> EsiResult<Name> {
        let mut names = self.by_ids(&[id]).await?;
        names.remove(&id).ok_or_else(|| NotFound::new(id).into())
    }
}
