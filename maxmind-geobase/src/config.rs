use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::types::IpVersion;

/// How free-text values (city and country names) are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// `"value"` with embedded double quotes backslash-escaped.
    Quoted,
    Base64,
}

impl Default for Encoding {
    fn default() -> Self {
        Encoding::Base64
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Language of the locations table, e.g. `en` or `ru`.
    pub lang: String,
    pub ip_version: IpVersion,
    /// Keep zone names instead of converting them to offsets.
    pub tz_names: bool,
    /// Country codes to keep, concatenated. Matching is by substring.
    pub include: String,
    /// Country codes to drop, concatenated. Matching is by substring.
    pub exclude: String,
    pub no_base64: bool,
    pub no_country: bool,
    pub output_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lang: "en".to_string(),
            ip_version: IpVersion::V4,
            tz_names: false,
            include: String::new(),
            exclude: String::new(),
            no_base64: false,
            no_country: false,
            output_dir: PathBuf::from("."),
        }
    }
}

impl Config {
    pub fn locations_file(&self) -> String {
        format!("GeoLite2-City-Locations-{}.csv", self.lang)
    }

    pub fn blocks_file(&self) -> String {
        format!("GeoLite2-City-Blocks-IPv{}.csv", self.ip_version)
    }

    pub fn encoding(&self) -> Encoding {
        if self.no_base64 {
            Encoding::Quoted
        } else {
            Encoding::Base64
        }
    }

    pub fn country_files(&self) -> bool {
        !self.no_country
    }
}
