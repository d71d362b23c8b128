//! Account classification.
//!
//! - [`bundle`] - Per-account store of fetched payloads
//! - [`rules`] - The four heuristics as pure evaluators over a bundle
//! - [`engine`] - Plans fetches, drives the API, stops at the first match

pub mod bundle;
pub mod engine;
pub mod rules;


pub use bundle::FetchBundle;
pub use engine::{Classifier, PipelineOutcome};
pub use rules::{Rule, Verdict};

use serde::{Deserialize, Serialize};

use crate::steam_id::SteamId64;

/// Which rules are enabled for a scan (all on by default)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Accounts that never set up a community profile
    #[serde(default = "default_true")]
    pub unverified: bool,

    /// Accounts at Steam level 0
    #[serde(default = "default_true")]
    pub low_level: bool,

    /// Low-level veterans owning one of the legacy titles
    #[serde(default = "default_true")]
    pub legacy_games: bool,

    /// Low-level veterans in the target region owning the flagship title
    #[serde(default = "default_true")]
    pub regional_veteran: bool,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            unverified: true,
            low_level: true,
            legacy_games: true,
            regional_veteran: true,
        }
    }
}

impl RuleConfig {
    /// Every rule switched off
    pub fn none() -> Self {
        Self {
            unverified: false,
            low_level: false,
            legacy_games: false,
            regional_veteran: false,
        }
    }

    /// Only the given rules switched on
    pub fn only(rules: &[Rule]) -> Self {
        let mut config = Self::none();
        for rule in rules {
            match rule {
                Rule::Unverified => config.unverified = true,
                Rule::LowLevel => config.low_level = true,
                Rule::LegacyGames => config.legacy_games = true,
                Rule::RegionalVeteran => config.regional_veteran = true,
            }
        }
        config
    }

    /// Whether `rule` is switched on
    pub fn is_enabled(&self, rule: Rule) -> bool {
        match rule {
            Rule::Unverified => self.unverified,
            Rule::LowLevel => self.low_level,
            Rule::LegacyGames => self.legacy_games,
            Rule::RegionalVeteran => self.regional_veteran,
        }
    }

    /// Whether at least one rule is switched on
    pub fn any_enabled(&self) -> bool {
        Rule::PRIORITY.iter().any(|r| self.is_enabled(*r))
    }

    /// Enabled rules in evaluation order
    pub fn enabled(&self) -> Vec<Rule> {
        Rule::PRIORITY
            .into_iter()
            .filter(|r| self.is_enabled(*r))
            .collect()
    }
}

fn default_true() -> bool {
    true
}

/// Whether an account stops at its first matching rule
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Record at most one category per account, in rule priority order
    #[default]
    FirstMatch,
    /// Evaluate every enabled rule and record each match
    AllMatches,
}

/// Output category; one per rule, one file per category
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// `unverified_accounts`
    Unverified,
    /// `level_0_accounts`
    LowLevel,
    /// `old_games_accounts`
    LegacyGames,
    /// `csgo_accounts`
    RegionalVeteran,
}

impl Category {
    /// All categories
    pub const ALL: [Category; 4] = [
        Category::Unverified,
        Category::LowLevel,
        Category::LegacyGames,
        Category::RegionalVeteran,
    ];

    /// Output file name without extension
    pub fn file_stem(self) -> &'static str {
        match self {
            Category::Unverified => "unverified_accounts",
            Category::LowLevel => "level_0_accounts",
            Category::LegacyGames => "old_games_accounts",
            Category::RegionalVeteran => "csgo_accounts",
        }
    }

    /// First line of each record block
    pub fn header(self) -> &'static str {
        match self {
            Category::Unverified => "UNVERIFIED ACCOUNT FOUND",
            Category::LowLevel => "LEVEL 0 ACCOUNT FOUND",
            Category::LegacyGames => "OLD GAMES ACCOUNT FOUND",
            Category::RegionalVeteran => "CSGO ACCOUNT FOUND",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.file_stem())
    }
}

/// An account that satisfied a rule
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchRecord {
    /// Category the record is written to
    pub category: Category,
    /// Legacy text id, `STEAM_0:a:s`
    pub steam_id: String,
    /// Flat 64-bit id
    pub steam_id64: SteamId64,
    /// Display name at the time of the scan
    pub player_name: String,
    /// Community profile URL
    pub profile_url: String,
    /// Rule-specific labelled values, in output order
    pub extra_fields: Vec<(String, String)>,
}
