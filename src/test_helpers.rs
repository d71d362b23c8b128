//! Test helpers: scripted API fake, in-memory sink, and fixture builders.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::api::{
    Badge, BadgesPayload, Endpoint, FetchOutcome, GamesPayload, LevelPayload, SteamApi,
    SummaryPayload,
};
use crate::classify::{Category, MatchRecord};
use crate::error::{Error, Result};
use crate::sink::ResultSink;
use crate::steam_id::{AccountId, AuthServer, SteamId64};

/// Shorthand for an account on auth server 0
pub(crate) fn account(sequence: u32) -> AccountId {
    AccountId {
        auth_server: AuthServer::Zero,
        sequence,
    }
}

/// Scripted responses for one account
///
/// An endpoint left unscripted panics when called, so a test that forgets to script
/// a call (or a pipeline that fetches too much) fails loudly.
#[derive(Clone, Debug, Default)]
pub(crate) struct Script {
    pub summary: Option<FetchOutcome<SummaryPayload>>,
    pub level: Option<FetchOutcome<LevelPayload>>,
    pub games: Option<FetchOutcome<GamesPayload>>,
    pub badges: Option<FetchOutcome<BadgesPayload>>,
    pub fail: Option<Endpoint>,
}

impl Script {
    /// A real account with a community profile and nothing else scripted
    pub fn verified(name: &str) -> Self {
        Self {
            summary: Some(FetchOutcome::Payload(SummaryPayload {
                persona_name: name.to_string(),
                has_profile_state: true,
                ..SummaryPayload::default()
            })),
            ..Self::default()
        }
    }

    /// A real account that never set up its profile
    pub fn unverified(name: &str) -> Self {
        Self {
            summary: Some(FetchOutcome::Payload(SummaryPayload {
                persona_name: name.to_string(),
                has_profile_state: false,
                ..SummaryPayload::default()
            })),
            ..Self::default()
        }
    }

    /// An id with no account behind it
    pub fn absent() -> Self {
        Self {
            summary: Some(FetchOutcome::AccountAbsent),
            ..Self::default()
        }
    }

    pub fn level(mut self, level: u32) -> Self {
        self.level = Some(FetchOutcome::Payload(LevelPayload { level: Some(level) }));
        self
    }

    pub fn hidden_level(mut self) -> Self {
        self.level = Some(FetchOutcome::Payload(LevelPayload { level: None }));
        self
    }

    pub fn games(mut self, app_ids: &[u32]) -> Self {
        self.games = Some(FetchOutcome::Payload(GamesPayload {
            owned_app_ids: app_ids.iter().copied().collect(),
        }));
        self
    }

    pub fn badges(mut self, badges: &[(u32, u32)]) -> Self {
        self.badges = Some(FetchOutcome::Payload(BadgesPayload {
            badges: badges
                .iter()
                .map(|&(id, level)| Badge { id, level })
                .collect(),
        }));
        self
    }

    pub fn country(mut self, code: &str) -> Self {
        if let Some(FetchOutcome::Payload(summary)) = self.summary.as_mut() {
            summary.country_code = Some(code.to_string());
        }
        self
    }

    pub fn real_name(mut self, name: &str) -> Self {
        if let Some(FetchOutcome::Payload(summary)) = self.summary.as_mut() {
            summary.real_name = Some(name.to_string());
        }
        self
    }

    /// Answer `endpoint` with a 429
    pub fn rate_limited(mut self, endpoint: Endpoint) -> Self {
        match endpoint {
            Endpoint::Summary => self.summary = Some(FetchOutcome::RateLimited),
            Endpoint::Level => self.level = Some(FetchOutcome::RateLimited),
            Endpoint::Games => self.games = Some(FetchOutcome::RateLimited),
            Endpoint::Badges => self.badges = Some(FetchOutcome::RateLimited),
        }
        self
    }

    /// Fail `endpoint` as if its retries were exhausted
    pub fn failing(mut self, endpoint: Endpoint) -> Self {
        self.fail = Some(endpoint);
        self
    }
}

/// In-memory [`SteamApi`] answering from per-account scripts and logging every call
#[derive(Default)]
pub(crate) struct ScriptedApi {
    scripts: HashMap<SteamId64, Script>,
    calls: Mutex<Vec<(SteamId64, Endpoint)>>,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, account: AccountId, script: Script) -> Self {
        self.scripts.insert(account.to_steam_id64(), script);
        self
    }

    /// Endpoints called for `account`, in call order
    pub fn calls_for(&self, account: AccountId) -> Vec<Endpoint> {
        let id = account.to_steam_id64();
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(called, _)| *called == id)
            .map(|(_, endpoint)| *endpoint)
            .collect()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn answer<T: Clone>(
        &self,
        id: SteamId64,
        endpoint: Endpoint,
        pick: impl FnOnce(&Script) -> &Option<FetchOutcome<T>>,
    ) -> Result<FetchOutcome<T>> {
        self.calls.lock().unwrap().push((id, endpoint));

        let script = self
            .scripts
            .get(&id)
            .unwrap_or_else(|| panic!("no script for {id}"));
        if script.fail == Some(endpoint) {
            return Err(Error::FetchFailed {
                endpoint,
                attempts: 1,
                reason: "scripted failure".to_string(),
            });
        }
        Ok(pick(script)
            .clone()
            .unwrap_or_else(|| panic!("unscripted {endpoint} call for {id}")))
    }
}

#[async_trait::async_trait]
impl SteamApi for ScriptedApi {
    async fn summary(&self, id: SteamId64) -> Result<FetchOutcome<SummaryPayload>> {
        self.answer(id, Endpoint::Summary, |s| &s.summary)
    }

    async fn level(&self, id: SteamId64) -> Result<FetchOutcome<LevelPayload>> {
        self.answer(id, Endpoint::Level, |s| &s.level)
    }

    async fn games(&self, id: SteamId64) -> Result<FetchOutcome<GamesPayload>> {
        self.answer(id, Endpoint::Games, |s| &s.games)
    }

    async fn badges(&self, id: SteamId64) -> Result<FetchOutcome<BadgesPayload>> {
        self.answer(id, Endpoint::Badges, |s| &s.badges)
    }
}

/// API whose calls never complete
pub(crate) struct StalledApi;

#[async_trait::async_trait]
impl SteamApi for StalledApi {
    async fn summary(&self, _: SteamId64) -> Result<FetchOutcome<SummaryPayload>> {
        std::future::pending().await
    }

    async fn level(&self, _: SteamId64) -> Result<FetchOutcome<LevelPayload>> {
        std::future::pending().await
    }

    async fn games(&self, _: SteamId64) -> Result<FetchOutcome<GamesPayload>> {
        std::future::pending().await
    }

    async fn badges(&self, _: SteamId64) -> Result<FetchOutcome<BadgesPayload>> {
        std::future::pending().await
    }
}

/// [`ResultSink`] that keeps records in memory and can refuse one category
#[derive(Default)]
pub(crate) struct MemorySink {
    records: Mutex<Vec<MatchRecord>>,
    refuse: Option<Category>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every write to `category`
    pub fn refusing(category: Category) -> Self {
        Self {
            refuse: Some(category),
            ..Self::default()
        }
    }

    pub fn records(&self) -> Vec<MatchRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ResultSink for MemorySink {
    async fn record(&self, record: &MatchRecord) -> Result<()> {
        if self.refuse == Some(record.category) {
            return Err(Error::SinkWriteFailed {
                category: record.category,
                reason: "refused by test sink".to_string(),
            });
        }
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}
