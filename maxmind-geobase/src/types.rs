use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// One row of the locations table, keyed by `id`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocationRecord {
    pub id: String,
    pub city: String,
    /// Raw zone name or UTC offset in seconds, depending on `Config::tz_names`.
    pub tz: String,
    pub country_code: String,
    pub country: String,
}

/// A location annotated with one network range from the blocks table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlacementRecord {
    pub network: String,
    pub location: LocationRecord,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum IpVersion {
    V4,
    V6,
}

impl Default for IpVersion {
    fn default() -> Self {
        IpVersion::V4
    }
}

impl TryFrom<u8> for IpVersion {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            4 => Ok(IpVersion::V4),
            6 => Ok(IpVersion::V6),
            other => Err(Error::InvalidIpVersion(other.to_string())),
        }
    }
}

impl From<IpVersion> for u8 {
    fn from(version: IpVersion) -> Self {
        match version {
            IpVersion::V4 => 4,
            IpVersion::V6 => 6,
        }
    }
}

impl FromStr for IpVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "4" => Ok(IpVersion::V4),
            "6" => Ok(IpVersion::V6),
            other => Err(Error::InvalidIpVersion(other.to_string())),
        }
    }
}

impl fmt::Display for IpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", u8::from(*self))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warn,
    /// A malformed row; always reported, then skipped.
    Fail,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => f.write_str("INFO"),
            Severity::Warn => f.write_str("WARN"),
            Severity::Fail => f.write_str("FAIL"),
        }
    }
}

/// Counters kept by the network join. Misses and unrepresentable ranges are
/// expected and only counted, never reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JoinStats {
    pub rows: u64,
    pub malformed: u64,
    pub unrepresentable: u64,
    pub misses: u64,
    pub emitted: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub locations: usize,
    pub join: JoinStats,
    pub lines: u64,
}
