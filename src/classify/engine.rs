//! Per-account classification pipeline.

use super::{FetchBundle, MatchMode, MatchRecord, Rule, RuleConfig, Verdict};
use crate::api::{Endpoint, FetchOutcome, SteamApi};
use crate::error::{Error, Result};
use crate::steam_id::{AccountId, SteamId64};

/// How one account's pipeline ended
#[derive(Debug)]
pub enum PipelineOutcome {
    /// The id has no account behind it
    InvalidAccount,
    /// Every enabled rule was evaluated without a match
    NoMatch,
    /// One record per matching rule, in priority order
    Matched(Vec<MatchRecord>),
    /// The API reported its rate limit; the account was abandoned
    RateLimited(Endpoint),
    /// A fetch failed after its retry budget; the account was abandoned
    FetchFailed(Error),
}

/// Runs the enabled rules for one account, fetching only what they need
#[derive(Clone, Debug)]
pub struct Classifier {
    rules: Vec<Rule>,
    mode: MatchMode,
}

impl Classifier {
    /// Create a classifier for the enabled rules
    pub fn new(config: &RuleConfig, mode: MatchMode) -> Self {
        Self {
            rules: config.enabled(),
            mode,
        }
    }

    /// Enabled rules in evaluation order
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Match mode in effect
    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    /// Every endpoint the enabled rules could need, in fetch order
    ///
    /// The summary is always fetched, since it tells a real account from an empty id.
    pub fn plan(&self) -> Vec<Endpoint> {
        let needs: Vec<Endpoint> = self
            .rules
            .iter()
            .flat_map(|r| r.requirements().iter().copied())
            .chain([Endpoint::Summary])
            .collect();
        FetchBundle::default().missing(&needs)
    }

    /// Classify one account
    ///
    /// Payloads are fetched lazily: before each rule only its missing requirements are
    /// requested, so a first-match pipeline that stops early issues no further calls.
    /// A hidden player level ends the pipeline once the level is known, since every rule
    /// from [`Rule::LowLevel`] on needs a visible one.
    pub async fn classify(&self, api: &dyn SteamApi, account: AccountId) -> PipelineOutcome {
        let mut bundle = FetchBundle::default();

        if let Err(outcome) = fill(api, account, &mut bundle, &[Endpoint::Summary]).await {
            return outcome;
        }

        let mut matches = Vec::new();
        for rule in &self.rules {
            let requirements = rule.requirements();
            if requirements.contains(&Endpoint::Level) {
                let level_first = [Endpoint::Summary, Endpoint::Level];
                if let Err(outcome) = fill(api, account, &mut bundle, &level_first).await {
                    return outcome;
                }
                if bundle.level().is_none() {
                    tracing::debug!(steam_id = %account, "Player level hidden, stopping");
                    break;
                }
            }

            if let Err(outcome) = fill(api, account, &mut bundle, requirements).await {
                return outcome;
            }

            if let Verdict::Match(record) = rule.evaluate(account, &bundle) {
                tracing::info!(
                    steam_id = %record.steam_id,
                    steam_id64 = %record.steam_id64,
                    category = %record.category,
                    player_name = %record.player_name,
                    "Account matched"
                );
                matches.push(record);
                if self.mode == MatchMode::FirstMatch {
                    break;
                }
            }
        }

        if matches.is_empty() {
            PipelineOutcome::NoMatch
        } else {
            PipelineOutcome::Matched(matches)
        }
    }
}

/// Fetch whatever `needs` lists that the bundle lacks
async fn fill(
    api: &dyn SteamApi,
    account: AccountId,
    bundle: &mut FetchBundle,
    needs: &[Endpoint],
) -> std::result::Result<(), PipelineOutcome> {
    let id = account.to_steam_id64();

    for endpoint in bundle.missing(needs) {
        let outcome = match fetch_into(api, id, bundle, endpoint).await {
            Ok(outcome) => outcome,
            Err(error) => {
                tracing::warn!(
                    steam_id = %account,
                    %endpoint,
                    error = %error,
                    "Fetch failed, skipping account"
                );
                return Err(PipelineOutcome::FetchFailed(error));
            }
        };

        match outcome {
            FetchOutcome::Payload(()) => {}
            FetchOutcome::AccountAbsent => {
                tracing::debug!(steam_id = %account, steam_id64 = %id, "Invalid account");
                return Err(PipelineOutcome::InvalidAccount);
            }
            FetchOutcome::RateLimited => {
                tracing::warn!(
                    steam_id = %account,
                    %endpoint,
                    "Rate limited, skipping account"
                );
                return Err(PipelineOutcome::RateLimited(endpoint));
            }
        }
    }

    Ok(())
}

/// Fetch one endpoint and store its payload in the bundle
async fn fetch_into(
    api: &dyn SteamApi,
    id: SteamId64,
    bundle: &mut FetchBundle,
    endpoint: Endpoint,
) -> Result<FetchOutcome<()>> {
    Ok(match endpoint {
        Endpoint::Summary => api.summary(id).await?.map(|p| bundle.summary = Some(p)),
        Endpoint::Level => api.level(id).await?.map(|p| bundle.level = Some(p)),
        Endpoint::Games => api.games(id).await?.map(|p| bundle.games = Some(p)),
        Endpoint::Badges => api.badges(id).await?.map(|p| bundle.badges = Some(p)),
    })
}
