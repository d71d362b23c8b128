//! Per-account fetch bundle.

use crate::api::{BadgesPayload, Endpoint, GamesPayload, LevelPayload, SummaryPayload};

/// Payloads fetched so far for one account
///
/// Lives for a single pipeline run; a slot is `None` until its endpoint has been fetched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FetchBundle {
    /// Profile summary
    pub summary: Option<SummaryPayload>,
    /// Steam level
    pub level: Option<LevelPayload>,
    /// Owned games
    pub games: Option<GamesPayload>,
    /// Badges
    pub badges: Option<BadgesPayload>,
}

impl FetchBundle {
    /// Whether the slot for `endpoint` is filled
    pub fn has(&self, endpoint: Endpoint) -> bool {
        match endpoint {
            Endpoint::Summary => self.summary.is_some(),
            Endpoint::Level => self.level.is_some(),
            Endpoint::Games => self.games.is_some(),
            Endpoint::Badges => self.badges.is_some(),
        }
    }

    /// Endpoints from `needs` that are not yet fetched, in canonical fetch order
    pub fn missing(&self, needs: &[Endpoint]) -> Vec<Endpoint> {
        Endpoint::ALL
            .into_iter()
            .filter(|e| needs.contains(e) && !self.has(*e))
            .collect()
    }

    /// Player level, when both fetched and visible
    pub fn level(&self) -> Option<u32> {
        self.level.and_then(|l| l.level)
    }

    /// Level of the first badge with `badge_id`, when badges were fetched and it is held
    pub fn badge_level(&self, badge_id: u32) -> Option<u32> {
        self.badges
            .as_ref()
            .and_then(|b| b.find(badge_id))
            .map(|b| b.level)
    }
}
