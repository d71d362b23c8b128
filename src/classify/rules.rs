//! Classification rules.
//!
//! Each rule is a pure predicate over an account's [`FetchBundle`]. A rule whose
//! payloads are missing from the bundle never matches; the engine fetches them first.

use super::{Category, FetchBundle, MatchRecord};
use crate::api::Endpoint;
use crate::steam_id::AccountId;

/// Badge awarded for years of service
pub const VETERAN_BADGE_ID: u32 = 13;

/// Highest player level either veteran rule accepts
pub const MAX_VETERAN_PLAYER_LEVEL: u32 = 9;

/// Highest years-of-service badge level for [`Rule::LegacyGames`]
pub const LEGACY_MAX_BADGE_LEVEL: u32 = 5;

/// Highest years-of-service badge level for [`Rule::RegionalVeteran`]
pub const REGIONAL_MAX_BADGE_LEVEL: u32 = 4;

/// Counter-Strike: Source, Half-Life, Counter-Strike
pub const LEGACY_APP_IDS: [u32; 3] = [240, 70, 10];

/// Counter-Strike: Global Offensive
pub const FLAGSHIP_APP_ID: u32 = 730;

/// Country code the regional rule targets
pub const TARGET_REGION: &str = "BR";

/// A named heuristic that maps to exactly one output [`Category`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Rule {
    /// Summary lacks `profilestate`
    Unverified,
    /// Player level is exactly 0
    LowLevel,
    /// Low level, young veteran badge, owns a legacy title
    LegacyGames,
    /// In (or not disclosing) the target region, full real name, low level,
    /// young veteran badge, owns the flagship title
    RegionalVeteran,
}

/// Outcome of evaluating one rule
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// The account does not satisfy the rule
    NoMatch,
    /// The account satisfies the rule
    Match(MatchRecord),
}

impl Rule {
    /// Evaluation order; an account matched by an earlier rule is not checked against
    /// later ones in [`MatchMode::FirstMatch`](super::MatchMode::FirstMatch)
    pub const PRIORITY: [Rule; 4] = [
        Rule::Unverified,
        Rule::LowLevel,
        Rule::RegionalVeteran,
        Rule::LegacyGames,
    ];

    /// Category a match is written to
    pub fn category(self) -> Category {
        match self {
            Rule::Unverified => Category::Unverified,
            Rule::LowLevel => Category::LowLevel,
            Rule::LegacyGames => Category::LegacyGames,
            Rule::RegionalVeteran => Category::RegionalVeteran,
        }
    }

    /// Payloads this rule reads, beyond the summary every pipeline fetches first
    pub fn requirements(self) -> &'static [Endpoint] {
        match self {
            Rule::Unverified => &[Endpoint::Summary],
            Rule::LowLevel => &[Endpoint::Summary, Endpoint::Level],
            Rule::LegacyGames | Rule::RegionalVeteran => &[
                Endpoint::Summary,
                Endpoint::Level,
                Endpoint::Games,
                Endpoint::Badges,
            ],
        }
    }

    /// Evaluate the rule against an account's bundle
    pub fn evaluate(self, account: AccountId, bundle: &FetchBundle) -> Verdict {
        let extra_fields = match self {
            Rule::Unverified => unverified(bundle),
            Rule::LowLevel => low_level(bundle),
            Rule::LegacyGames => legacy_games(bundle),
            Rule::RegionalVeteran => regional_veteran(bundle),
        };

        match (extra_fields, bundle.summary.as_ref()) {
            (Some(extra_fields), Some(summary)) => {
                let steam_id64 = account.to_steam_id64();
                Verdict::Match(MatchRecord {
                    category: self.category(),
                    steam_id: account.to_text_id(),
                    steam_id64,
                    player_name: summary.persona_name.clone(),
                    profile_url: steam_id64.profile_url(),
                    extra_fields,
                })
            }
            _ => Verdict::NoMatch,
        }
    }
}

// Each predicate returns the record's extra fields on a match.
type Extras = Option<Vec<(String, String)>>;

fn unverified(bundle: &FetchBundle) -> Extras {
    let summary = bundle.summary.as_ref()?;
    (!summary.has_profile_state).then(Vec::new)
}

fn low_level(bundle: &FetchBundle) -> Extras {
    (bundle.level()? == 0).then(Vec::new)
}

/// Level and veteran-badge gate shared by both veteran rules
fn is_young_veteran(bundle: &FetchBundle, max_badge_level: u32) -> Option<u32> {
    let level = bundle.level()?;
    if level > MAX_VETERAN_PLAYER_LEVEL {
        return None;
    }
    let badge_level = bundle.badge_level(VETERAN_BADGE_ID)?;
    (badge_level <= max_badge_level).then_some(level)
}

fn legacy_games(bundle: &FetchBundle) -> Extras {
    let level = is_young_veteran(bundle, LEGACY_MAX_BADGE_LEVEL)?;
    let games = bundle.games.as_ref()?;
    games
        .owns_any(&LEGACY_APP_IDS)
        .then(|| vec![("LEVEL".to_string(), level.to_string())])
}

/// The real name counts as full when splitting on single spaces yields two or more
/// parts, so a trailing space (`"Ana "`) is enough.
fn regional_veteran(bundle: &FetchBundle) -> Extras {
    let summary = bundle.summary.as_ref()?;
    if summary
        .country_code
        .as_deref()
        .is_some_and(|c| c != TARGET_REGION)
    {
        return None;
    }
    let real_name = summary.real_name.as_deref()?;
    if real_name.split(' ').count() < 2 {
        return None;
    }
    is_young_veteran(bundle, REGIONAL_MAX_BADGE_LEVEL)?;
    let games = bundle.games.as_ref()?;
    games
        .owns(FLAGSHIP_APP_ID)
        .then(|| vec![("REAL NAME".to_string(), real_name.to_string())])
}
