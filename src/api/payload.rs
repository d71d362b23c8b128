//! Wire envelopes and typed payloads.
//!
//! Each endpoint wraps its data in `{"response": {...}}`. Everything optional in the wire
//! format is decoded here, once, into plain structs; classification never sees raw JSON.

use serde::Deserialize;
use serde::de::IgnoredAny;
use std::collections::BTreeSet;

use super::Endpoint;
use crate::error::{Error, Result};

/// Decoded profile summary
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SummaryPayload {
    /// Display name
    pub persona_name: String,
    /// Whether `profilestate` was present (absent means the community profile was never set up)
    pub has_profile_state: bool,
    /// ISO country code, if the profile shows one
    pub country_code: Option<String>,
    /// Real name, if the profile shows one
    pub real_name: Option<String>,
    /// Profile URL as reported by the API (may be a vanity URL)
    pub profile_url: Option<String>,
}

/// Decoded Steam level
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LevelPayload {
    /// Player level; `None` when hidden
    pub level: Option<u32>,
}

/// Decoded owned-games list
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GamesPayload {
    /// Application ids the account owns
    pub owned_app_ids: BTreeSet<u32>,
}

impl GamesPayload {
    /// Whether the account owns `app_id`
    pub fn owns(&self, app_id: u32) -> bool {
        self.owned_app_ids.contains(&app_id)
    }

    /// Whether the account owns at least one of `app_ids`
    pub fn owns_any(&self, app_ids: &[u32]) -> bool {
        app_ids.iter().any(|id| self.owns(*id))
    }
}

/// A single badge
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Badge {
    /// Badge id
    pub id: u32,
    /// Badge level
    pub level: u32,
}

/// Decoded badge list
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BadgesPayload {
    /// Badges in API order
    pub badges: Vec<Badge>,
}

impl BadgesPayload {
    /// First badge with the given id
    pub fn find(&self, id: u32) -> Option<&Badge> {
        self.badges.iter().find(|b| b.id == id)
    }
}

/// A payload that one endpoint produces
///
/// `decode` returns `Ok(None)` only when the body is well formed but names no account.
pub trait Payload: Sized + Send {
    /// Endpoint this payload comes from
    const ENDPOINT: Endpoint;

    /// Decode a raw response body
    fn decode(body: &[u8]) -> Result<Option<Self>>;
}

#[derive(Deserialize)]
struct Envelope<T> {
    response: T,
}

fn parse<T: for<'de> Deserialize<'de>>(endpoint: Endpoint, body: &[u8]) -> Result<T> {
    serde_json::from_slice::<Envelope<T>>(body)
        .map(|e| e.response)
        .map_err(|source| Error::Decode { endpoint, source })
}

#[derive(Deserialize)]
struct PlayersWire {
    #[serde(default)]
    players: Vec<PlayerWire>,
}

#[derive(Deserialize)]
struct PlayerWire {
    #[serde(default)]
    personaname: String,
    profilestate: Option<IgnoredAny>,
    loccountrycode: Option<String>,
    realname: Option<String>,
    profileurl: Option<String>,
}

impl Payload for SummaryPayload {
    const ENDPOINT: Endpoint = Endpoint::Summary;

    fn decode(body: &[u8]) -> Result<Option<Self>> {
        let wire: PlayersWire = parse(Self::ENDPOINT, body)?;
        Ok(wire.players.into_iter().next().map(|p| SummaryPayload {
            persona_name: p.personaname,
            has_profile_state: p.profilestate.is_some(),
            country_code: p.loccountrycode,
            real_name: p.realname,
            profile_url: p.profileurl,
        }))
    }
}

#[derive(Deserialize)]
struct LevelWire {
    player_level: Option<u32>,
}

impl Payload for LevelPayload {
    const ENDPOINT: Endpoint = Endpoint::Level;

    fn decode(body: &[u8]) -> Result<Option<Self>> {
        let wire: LevelWire = parse(Self::ENDPOINT, body)?;
        Ok(Some(LevelPayload {
            level: wire.player_level,
        }))
    }
}

#[derive(Deserialize)]
struct GamesWire {
    #[serde(default)]
    games: Vec<GameWire>,
}

#[derive(Deserialize)]
struct GameWire {
    appid: u32,
}

impl Payload for GamesPayload {
    const ENDPOINT: Endpoint = Endpoint::Games;

    fn decode(body: &[u8]) -> Result<Option<Self>> {
        let wire: GamesWire = parse(Self::ENDPOINT, body)?;
        Ok(Some(GamesPayload {
            owned_app_ids: wire.games.into_iter().map(|g| g.appid).collect(),
        }))
    }
}

#[derive(Deserialize)]
struct BadgesWire {
    #[serde(default)]
    badges: Vec<BadgeWire>,
}

#[derive(Deserialize)]
struct BadgeWire {
    badgeid: u32,
    #[serde(default)]
    level: u32,
}

impl Payload for BadgesPayload {
    const ENDPOINT: Endpoint = Endpoint::Badges;

    fn decode(body: &[u8]) -> Result<Option<Self>> {
        let wire: BadgesWire = parse(Self::ENDPOINT, body)?;
        Ok(Some(BadgesPayload {
            badges: wire
                .badges
                .into_iter()
                .map(|b| Badge {
                    id: b.badgeid,
                    level: b.level,
                })
                .collect(),
        }))
    }
}
