use std::collections::HashMap;

use chrono::{DateTime, Utc};
use csv::StringRecord;
use tracing::info;

use crate::{
    config::Config,
    error::{Error, LocationRejection, Result},
    report::Reporter,
    timezone::convert_tz_to_offset,
    types::LocationRecord,
};

const MIN_FIELDS: usize = 13;
const ID: usize = 0;
const COUNTRY_CODE: usize = 4;
const COUNTRY_NAME: usize = 5;
const CITY_NAME: usize = 10;
const TIME_ZONE: usize = 12;

/// Locations keyed by geoname id. Read-only once built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationTable {
    locations: HashMap<String, LocationRecord>,
}

impl LocationTable {
    pub fn get(&self, id: &str) -> Option<&LocationRecord> {
        self.locations.get(id)
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

impl FromIterator<LocationRecord> for LocationTable {
    fn from_iter<I: IntoIterator<Item = LocationRecord>>(iter: I) -> Self {
        let locations = iter
            .into_iter()
            .map(|location| (location.id.clone(), location))
            .collect();
        Self { locations }
    }
}

/// Turns rows of a GeoLite2-City-Locations table into a `LocationTable`.
pub struct LocationBuilder<'a> {
    config: &'a Config,
    now: DateTime<Utc>,
    reporter: &'a dyn Reporter,
    source: &'static str,
}

impl<'a> LocationBuilder<'a> {
    /// `now` is the instant used for every zone offset of this run.
    pub fn new(
        config: &'a Config,
        now: DateTime<Utc>,
        reporter: &'a dyn Reporter,
        source: &'static str,
    ) -> Self {
        Self {
            config,
            now,
            reporter,
            source,
        }
    }

    /// Validates one row. Checks run in a fixed order and the first failure wins.
    pub fn line_to_item(
        &self,
        record: &StringRecord,
    ) -> std::result::Result<LocationRecord, LocationRejection> {
        if record.len() < MIN_FIELDS {
            return Err(LocationRejection::TooShortLine);
        }
        let country_code = &record[COUNTRY_CODE];
        if country_code.is_empty() || record[COUNTRY_NAME].is_empty() {
            return Err(LocationRejection::TooShortCountry);
        }
        // Filters are concatenated code lists matched by substring, so "USRU"
        // keeps "US", "RU" and also "SR".
        if self.config.include.len() > 1 && !self.config.include.contains(country_code) {
            return Err(LocationRejection::CountrySkipped);
        }
        if self.config.exclude.contains(country_code) {
            return Err(LocationRejection::CountryExcluded);
        }
        let tz = if self.config.tz_names {
            record[TIME_ZONE].to_string()
        } else {
            convert_tz_to_offset(self.now, &record[TIME_ZONE])
        };
        if record[CITY_NAME].is_empty() {
            return Err(LocationRejection::TooShortCity);
        }
        Ok(LocationRecord {
            id: record[ID].to_string(),
            city: record[CITY_NAME].to_string(),
            tz,
            country_code: country_code.to_string(),
            country: record[COUNTRY_NAME].to_string(),
        })
    }

    pub fn build<I>(&self, filename: &str, rows: I) -> Result<LocationTable>
    where
        I: IntoIterator<Item = StringRecord>,
    {
        let mut locations = HashMap::new();
        for record in rows {
            match self.line_to_item(&record) {
                Ok(location) => {
                    locations.insert(location.id.clone(), location);
                }
                Err(rejection) => {
                    if let Some(severity) = rejection.severity() {
                        self.reporter.report(
                            self.source,
                            &format!("{} {}", filename, rejection),
                            severity,
                        );
                    }
                }
            }
        }
        if locations.is_empty() {
            return Err(Error::EmptyLocations(filename.to_string()));
        }
        info!("Loaded {} locations from {}", locations.len(), filename);
        Ok(LocationTable { locations })
    }
}
