//! Steam Web API access
//!
//! The classifier only ever talks to the [`SteamApi`] trait. [`SteamWebClient`] is the
//! production implementation over `reqwest`; tests substitute scripted fakes.
//!
//! Submodules:
//! - [`client`] - HTTP client with per-call timeout and bounded retry
//! - [`payload`] - Wire envelopes and the typed payloads decoded from them
//! - [`rate_limit`] - Process-wide cooldown after a 429

pub mod client;
pub mod payload;
pub mod rate_limit;


pub use client::SteamWebClient;
pub use payload::{Badge, BadgesPayload, GamesPayload, LevelPayload, SummaryPayload};
pub use rate_limit::RateLimitGate;

use crate::error::Result;
use crate::steam_id::SteamId64;

/// The four remote operations the scanner uses
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Endpoint {
    /// `ISteamUser/GetPlayerSummaries`
    Summary,
    /// `IPlayerService/GetSteamLevel`
    Level,
    /// `IPlayerService/GetOwnedGames`
    Games,
    /// `IPlayerService/GetBadges`
    Badges,
}

impl Endpoint {
    /// All endpoints in canonical fetch order
    pub const ALL: [Endpoint; 4] = [
        Endpoint::Summary,
        Endpoint::Level,
        Endpoint::Games,
        Endpoint::Badges,
    ];

    /// Path relative to the API base URL
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Summary => "ISteamUser/GetPlayerSummaries/v0002/",
            Endpoint::Level => "IPlayerService/GetSteamLevel/v1/",
            Endpoint::Games => "IPlayerService/GetOwnedGames/v0001/",
            Endpoint::Badges => "IPlayerService/GetBadges/v1/",
        }
    }

    /// Query parameter carrying the id64 (the summary call takes a list)
    pub fn id_param(self) -> &'static str {
        match self {
            Endpoint::Summary => "steamids",
            Endpoint::Level | Endpoint::Games | Endpoint::Badges => "steamid",
        }
    }

    fn method_name(self) -> &'static str {
        match self {
            Endpoint::Summary => "GetPlayerSummaries",
            Endpoint::Level => "GetSteamLevel",
            Endpoint::Games => "GetOwnedGames",
            Endpoint::Badges => "GetBadges",
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.method_name())
    }
}

/// Non-error result of one remote operation
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FetchOutcome<T> {
    /// The decoded payload
    Payload(T),
    /// The id does not belong to a real account (summary only)
    AccountAbsent,
    /// The API key is over quota; the caller must abandon this account
    RateLimited,
}

impl<T> FetchOutcome<T> {
    /// Apply `f` to the payload, keeping the other outcomes
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> FetchOutcome<U> {
        match self {
            FetchOutcome::Payload(p) => FetchOutcome::Payload(f(p)),
            FetchOutcome::AccountAbsent => FetchOutcome::AccountAbsent,
            FetchOutcome::RateLimited => FetchOutcome::RateLimited,
        }
    }
}

/// Abstraction over the Steam Web API, enabling testability
///
/// Implementations never return transient network errors: those are retried
/// internally and surface as [`Error::FetchFailed`](crate::error::Error::FetchFailed)
/// once the retry budget is spent.
#[async_trait::async_trait]
pub trait SteamApi: Send + Sync {
    /// Profile summary; [`FetchOutcome::AccountAbsent`] when the id has no account
    async fn summary(&self, id: SteamId64) -> Result<FetchOutcome<SummaryPayload>>;

    /// Steam level; `level` is `None` when the account hides it
    async fn level(&self, id: SteamId64) -> Result<FetchOutcome<LevelPayload>>;

    /// Owned application ids; empty when the library is private or empty
    async fn games(&self, id: SteamId64) -> Result<FetchOutcome<GamesPayload>>;

    /// Badges; empty when none are visible
    async fn badges(&self, id: SteamId64) -> Result<FetchOutcome<BadgesPayload>>;
}
