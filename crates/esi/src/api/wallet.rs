//! Wallet journal and transaction history
//!
//! Both routes need an access token with the matching wallet scope. Tokens are
//! taken as-is; obtaining and refreshing them is up to the caller.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use esi_common::{ClientError, EsiClient, EsiClientExt, Id, RequestParams, Route};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::paginate;
use crate::resource::{Iterated, SingleId};

/// `GET /corporations/{corporation_id}/wallets/{division}/journal/`
pub const CORPORATION_JOURNAL: Route = Route::get(
    "get_corporations_corporation_id_wallets_division_journal",
    "/corporations/{corporation_id}/wallets/{division}/journal/",
);

/// `GET /characters/{character_id}/wallet/transactions/`
pub const CHARACTER_TRANSACTIONS: Route = Route::get(
    "get_characters_character_id_wallet_transactions",
    "/characters/{character_id}/wallet/transactions/",
);

/// Entries per journal page
pub const JOURNAL_PAGE_SIZE: usize = 2500;

/// Transactions per `from_id` page
pub const TRANSACTIONS_PAGE_SIZE: usize = 2500;

/// One wallet journal line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Journal entry id
    pub id: Id,
    /// When it was booked
    pub date: DateTime<Utc>,
    /// Kind of entry, e.g. `bounty_prizes`
    pub ref_type: SmolStr,
    /// Change in balance; negative for debits
    #[serde(default)]
    pub amount: Option<f64>,
    /// Balance after this entry
    #[serde(default)]
    pub balance: Option<f64>,
    /// Game-generated description
    pub description: String,
    /// First party to the entry
    #[serde(default)]
    pub first_party_id: Option<Id>,
    /// Second party to the entry
    #[serde(default)]
    pub second_party_id: Option<Id>,
    /// Player-entered reason
    #[serde(default)]
    pub reason: Option<String>,
}

/// One market transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction id
    pub transaction_id: Id,
    /// When it happened
    pub date: DateTime<Utc>,
    /// Item type traded
    pub type_id: Id,
    /// Units traded
    pub quantity: i64,
    /// Price per unit
    pub unit_price: f64,
    /// The other side of the trade
    pub client_id: Id,
    /// Station or structure
    pub location_id: Id,
    /// Whether the character bought
    pub is_buy: bool,
    /// Whether the trade was on the personal wallet
    pub is_personal: bool,
    /// Matching journal entry
    pub journal_ref_id: Id,
}

/// A corporation's wallet divisions
#[derive(Debug)]
pub struct CorporationWallet<C> {
    client: Arc<C>,
    corporation: SingleId,
    token: SmolStr,
}

impl<C> CorporationWallet<C>
where
    C: EsiClient + Send + Sync + 'static,
{
    /// Wallet of `corporation_id`, read with `token`
    pub fn new(client: Arc<C>, corporation_id: Id, token: impl Into<SmolStr>) -> Self {
        Self {
            client,
            corporation: SingleId::new(corporation_id),
            token: token.into(),
        }
    }

    /// The corporation id
    pub fn corporation_id(&self) -> Id {
        self.corporation.id()
    }

    /// Journal of one wallet division (1 to 7), newest first.
    ///
    /// Pages follow the `X-Pages` header ESI sends with the first page.
    pub fn journal(&self, division: u8) -> Iterated<JournalEntry, ClientError> {
        let client = self.client.clone();
        let token = self.token.clone();
        let corporation_id = self.corporation.id();
        let streamer: paginate::Streamer<JournalEntry, ClientError> = paginate::page_based(
            move |page: u32| {
                let client = client.clone();
                let token = token.clone();
                async move {
                    let params = RequestParams::new()
                        .path("corporation_id", corporation_id)
                        .path("division", division)
                        .query("page", page);
                    client
                        .request_page::<JournalEntry>(
                            &CORPORATION_JOURNAL,
                            params,
                            Some(token.as_str()),
                        )
                        .await
                }
            },
            Some(JOURNAL_PAGE_SIZE),
        );
        Iterated::new(streamer, |entry: &JournalEntry| entry.id)
    }
}

/// A character's personal wallet
#[derive(Debug)]
pub struct CharacterWallet<C> {
    client: Arc<C>,
    character: SingleId,
    token: SmolStr,
}

impl<C> CharacterWallet<C>
where
    C: EsiClient + Send + Sync + 'static,
{
    /// Wallet of `character_id`, read with `token`
    pub fn new(client: Arc<C>, character_id: Id, token: impl Into<SmolStr>) -> Self {
        Self {
            client,
            character: SingleId::new(character_id),
            token: token.into(),
        }
    }

    /// The character id
    pub fn character_id(&self) -> Id {
        self.character.id()
    }

    /// Market transactions, newest first.
    ///
    /// Each page after the first asks for transactions before the last one
    /// already seen, through the `from_id` query parameter.
    pub fn transactions(&self) -> Iterated<Transaction, ClientError> {
        let client = self.client.clone();
        let token = self.token.clone();
        let character_id = self.character.id();
        let streamer: paginate::Streamer<Transaction, ClientError> = paginate::max_id(
            move |from_id: Option<Id>| {
                let client = client.clone();
                let token = token.clone();
                async move {
                    let params = RequestParams::new()
                        .path("character_id", character_id)
                        .maybe_query("from_id", from_id);
                    client
                        .request_json::<Vec<Transaction>>(
                            &CHARACTER_TRANSACTIONS,
                            params,
                            Some(token.as_str()),
                        )
                        .await
                }
            },
            |transaction: &Transaction| transaction.transaction_id,
            Some(TRANSACTIONS_PAGE_SIZE),
        );
        Iterated::new(streamer, |transaction: &Transaction| {
            transaction.transaction_id
        })
    }
}
