//! Steam account identifiers
//!
//! An [`AccountId`] is the legacy `STEAM_0:<auth_server>:<sequence>` pair. The Web API
//! wants the flat 64-bit form ([`SteamId64`]), which is a fixed linear function of the pair.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Offset of the individual-account id64 space
pub const STEAM_ID64_BASE: u64 = 76_561_197_960_265_728;

/// Community profile URL prefix
const PROFILE_URL_PREFIX: &str = "https://steamcommunity.com/profiles/";

/// Authentication server bit of a legacy Steam id
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AuthServer {
    /// `STEAM_0:0:*`
    Zero,
    /// `STEAM_0:1:*`
    One,
}

impl AuthServer {
    /// Both servers in scan order
    pub const ALL: [AuthServer; 2] = [AuthServer::Zero, AuthServer::One];

    /// Numeric bit value
    pub fn bit(self) -> u64 {
        match self {
            AuthServer::Zero => 0,
            AuthServer::One => 1,
        }
    }

    fn from_bit(bit: u64) -> Result<Self> {
        match bit {
            0 => Ok(AuthServer::Zero),
            1 => Ok(AuthServer::One),
            other => Err(Error::InvalidIdentifier(format!(
                "auth server must be 0 or 1, got {other}"
            ))),
        }
    }
}

/// Flat 64-bit account id used by every Web API call
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SteamId64(pub u64);

impl SteamId64 {
    /// Get the inner u64 value
    pub fn get(&self) -> u64 {
        self.0
    }

    /// Public community profile URL for this account
    pub fn profile_url(&self) -> String {
        format!("{PROFILE_URL_PREFIX}{}", self.0)
    }
}

impl std::fmt::Display for SteamId64 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Structured account identifier: auth server bit plus per-server sequence number
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountId {
    /// Authentication server bit
    pub auth_server: AuthServer,
    /// Sequence number on that server
    pub sequence: u32,
}

impl AccountId {
    /// Build an identifier from raw parts, rejecting a negative or oversized sequence
    ///
    /// # Examples
    ///
    /// ```
    /// use steam_sweep::steam_id::{AccountId, AuthServer};
    ///
    /// let id = AccountId::new(12, AuthServer::One).unwrap();
    /// assert_eq!(id.to_text_id(), "STEAM_0:1:12");
    /// assert!(AccountId::new(-1, AuthServer::Zero).is_err());
    /// ```
    pub fn new(sequence: i64, auth_server: AuthServer) -> Result<Self> {
        let sequence = u32::try_from(sequence).map_err(|_| {
            Error::InvalidIdentifier(format!("sequence {sequence} is outside 0..={}", u32::MAX))
        })?;
        Ok(Self {
            auth_server,
            sequence,
        })
    }

    /// Numeric id: `BASE + 2 * sequence + auth_server`
    pub fn to_steam_id64(&self) -> SteamId64 {
        SteamId64(STEAM_ID64_BASE + 2 * u64::from(self.sequence) + self.auth_server.bit())
    }

    /// Inverse of [`to_steam_id64`](Self::to_steam_id64)
    pub fn from_steam_id64(id: SteamId64) -> Result<Self> {
        let offset = id.0.checked_sub(STEAM_ID64_BASE).ok_or_else(|| {
            Error::InvalidIdentifier(format!("{id} is below the individual account range"))
        })?;
        let sequence = u32::try_from(offset / 2).map_err(|_| {
            Error::InvalidIdentifier(format!("{id} is above the individual account range"))
        })?;
        Ok(Self {
            auth_server: AuthServer::from_bit(offset % 2)?,
            sequence,
        })
    }

    /// Legacy text form, `STEAM_0:<auth_server>:<sequence>`
    pub fn to_text_id(&self) -> String {
        self.to_string()
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "STEAM_0:{}:{}", self.auth_server.bit(), self.sequence)
    }
}

impl std::str::FromStr for AccountId {
    type Err = Error;

    /// Accepts `STEAM_0:a:s` or the bare `0:a:s`
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let body = trimmed.strip_prefix("STEAM_").unwrap_or(trimmed);
        let parts: Vec<&str> = body.split(':').collect();
        let [universe, auth, sequence] = parts.as_slice() else {
            return Err(Error::InvalidIdentifier(format!(
                "expected STEAM_0:<auth>:<sequence>, got {s:?}"
            )));
        };

        if universe.parse::<u8>().is_err() {
            return Err(Error::InvalidIdentifier(format!(
                "bad universe digit in {s:?}"
            )));
        }
        let auth = auth
            .parse::<u64>()
            .map_err(|_| Error::InvalidIdentifier(format!("bad auth server in {s:?}")))?;
        let sequence = sequence
            .parse::<i64>()
            .map_err(|_| Error::InvalidIdentifier(format!("bad sequence in {s:?}")))?;

        AccountId::new(sequence, AuthServer::from_bit(auth)?)
    }
}
