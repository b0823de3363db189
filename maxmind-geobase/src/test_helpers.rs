use std::{
    io::{Cursor, Write},
    sync::Mutex,
};

use bytes::Bytes;
use csv::StringRecord;
use zip::write::SimpleFileOptions;

use crate::{report::Reporter, types::Severity};

/// Keeps every report for later inspection.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    pub reports: Mutex<Vec<(String, String, Severity)>>,
}

impl MemoryReporter {
    pub fn len(&self) -> usize {
        self.reports.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn messages(&self) -> Vec<String> {
        self.reports
            .lock()
            .unwrap()
            .iter()
            .map(|(_, message, _)| message.clone())
            .collect()
    }
}

impl Reporter for MemoryReporter {
    fn report(&self, source: &str, message: &str, severity: Severity) {
        self.reports
            .lock()
            .unwrap()
            .push((source.to_string(), message.to_string(), severity));
    }
}

/// A 14 field GeoLite2-City-Locations row.
pub fn location_row(id: &str, code: &str, country: &str, city: &str, tz: &str) -> StringRecord {
    StringRecord::from(vec![
        id, "en", "AS", "Asia", code, country, "", "", "", "", city, "", tz, "0",
    ])
}

pub fn block_row(network: &str, id: &str) -> StringRecord {
    StringRecord::from(vec![network, id, id, "", "0", "0", "", "", "", "100"])
}

pub const LOCATIONS_HEADER: &str = "geoname_id,locale_code,continent_code,continent_name,country_iso_code,country_name,subdivision_1_iso_code,subdivision_1_name,subdivision_2_iso_code,subdivision_2_name,city_name,metro_code,time_zone,is_in_european_union\n";

pub const BLOCKS_HEADER: &str = "network,geoname_id,registered_country_geoname_id,represented_country_geoname_id,is_anonymous_proxy,is_satellite_provider,postal_code,latitude,longitude,accuracy_radius\n";

pub fn zip_bytes(files: &[(&str, &str)]) -> Bytes {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in files {
        writer
            .start_file(name.to_string(), SimpleFileOptions::default())
            .unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    Bytes::from(writer.finish().unwrap().into_inner())
}
