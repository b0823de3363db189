use csv::StringRecord;
use tokio::sync::mpsc;
use tracing::info;

use crate::{
    locations::LocationTable,
    network::ip_range,
    report::Reporter,
    types::{IpVersion, JoinStats, PlacementRecord, Severity},
};

const MIN_FIELDS: usize = 2;
const NETWORK: usize = 0;
const GEONAME_ID: usize = 1;

/// Joins blocks table rows against a finished `LocationTable`, one row at a time.
pub struct Placements<'a, I> {
    rows: I,
    table: &'a LocationTable,
    ip_version: IpVersion,
    filename: &'a str,
    source: &'static str,
    reporter: &'a dyn Reporter,
    stats: JoinStats,
}

impl<'a, I> Placements<'a, I>
where
    I: Iterator<Item = StringRecord>,
{
    pub fn new(
        rows: I,
        table: &'a LocationTable,
        ip_version: IpVersion,
        filename: &'a str,
        source: &'static str,
        reporter: &'a dyn Reporter,
    ) -> Self {
        Self {
            rows,
            table,
            ip_version,
            filename,
            source,
            reporter,
            stats: JoinStats::default(),
        }
    }

    pub fn stats(&self) -> JoinStats {
        self.stats
    }
}

impl<I> Iterator for Placements<'_, I>
where
    I: Iterator<Item = StringRecord>,
{
    type Item = PlacementRecord;

    fn next(&mut self) -> Option<Self::Item> {
        for record in self.rows.by_ref() {
            self.stats.rows += 1;
            if record.len() < MIN_FIELDS {
                self.stats.malformed += 1;
                self.reporter.report(
                    self.source,
                    &format!("{} too short line: {:?}", self.filename, record),
                    Severity::Fail,
                );
                continue;
            }
            let network = ip_range(self.ip_version, &record[NETWORK]);
            if network.is_empty() {
                self.stats.unrepresentable += 1;
                continue;
            }
            match self.table.get(&record[GEONAME_ID]) {
                Some(location) => {
                    self.stats.emitted += 1;
                    return Some(PlacementRecord {
                        network,
                        location: location.clone(),
                    });
                }
                None => self.stats.misses += 1,
            }
        }
        None
    }
}

/// Drains `placements` into `tx`, one record in flight at a time.
///
/// Blocks the calling thread, so run it on a blocking task. Stops early when
/// the receiving side is gone.
pub fn produce<I>(mut placements: Placements<'_, I>, tx: mpsc::Sender<PlacementRecord>) -> JoinStats
where
    I: Iterator<Item = StringRecord>,
{
    for placement in placements.by_ref() {
        if tx.blocking_send(placement).is_err() {
            break;
        }
    }
    let stats = placements.stats();
    info!(
        "Joined {} of {} network rows ({} without location, {} unrepresentable, {} malformed)",
        stats.emitted, stats.rows, stats.misses, stats.unrepresentable, stats.malformed
    );
    stats
}
