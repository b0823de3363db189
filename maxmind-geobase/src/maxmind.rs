use std::{future::Future, sync::Arc};

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::info;

use crate::{
    archive::{Archive, ArchiveSource},
    config::Config,
    error::{Error, Result},
    join::{produce, Placements},
    locations::{LocationBuilder, LocationTable},
    report::{Reporter, TracingReporter},
    types::{JoinStats, Summary},
    writer::MapFiles,
    Generator,
};

const SOURCE: &str = "MaxMind";

/// Generator for the GeoLite2 City CSV bundle.
pub struct MaxMind<S> {
    source: S,
    config: Config,
    reporter: Arc<dyn Reporter>,
}

impl<S: ArchiveSource> MaxMind<S> {
    pub fn new(source: S, config: Config) -> Self {
        Self::with_reporter(source, config, Arc::new(TracingReporter))
    }

    pub fn with_reporter(source: S, config: Config, reporter: Arc<dyn Reporter>) -> Self {
        Self {
            source,
            config,
            reporter,
        }
    }

    async fn locations(&self, archive: Archive) -> Result<LocationTable> {
        let config = self.config.clone();
        let reporter = self.reporter.clone();
        tokio::task::spawn_blocking(move || -> Result<LocationTable> {
            let mut archive = archive;
            let filename = config.locations_file();
            let mut rows = archive.rows(&filename, SOURCE, b',', true, reporter.clone())?;
            let table = LocationBuilder::new(&config, Utc::now(), reporter.as_ref(), SOURCE)
                .build(&filename, rows.by_ref());
            if let Some(source) = rows.take_error() {
                return Err(Error::Read { filename, source });
            }
            table
        })
        .await?
    }

    async fn write_map(&self, archive: Archive, table: LocationTable) -> Result<Summary> {
        let locations = table.len();
        let files = MapFiles::create(
            &self.config.output_dir,
            self.config.encoding(),
            self.config.country_files(),
        )
        .await?;

        let (tx, rx) = mpsc::channel(1);
        let ip_version = self.config.ip_version;
        let filename = self.config.blocks_file();
        let reporter = self.reporter.clone();
        let producer = tokio::task::spawn_blocking(move || -> Result<JoinStats> {
            let mut archive = archive;
            let mut rows = archive.rows(&filename, SOURCE, b',', true, reporter.clone())?;
            let placements = Placements::new(
                rows.by_ref(),
                &table,
                ip_version,
                &filename,
                SOURCE,
                reporter.as_ref(),
            );
            let stats = produce(placements, tx);
            if let Some(source) = rows.take_error() {
                return Err(Error::Read { filename, source });
            }
            Ok(stats)
        });

        let written = files.write_from(rx).await;
        let join = producer.await?;
        let lines = written?;
        let join = join?;
        Ok(Summary {
            locations,
            join,
            lines,
        })
    }
}

impl<S: ArchiveSource> Generator for MaxMind<S> {
    fn name(&self) -> &'static str {
        SOURCE
    }

    fn generate(&self) -> impl Future<Output = Result<Summary>> + Send {
        async move {
            let data = self.source.fetch().await?;
            let archive = Archive::unpack(data)?;
            let table = self.locations(archive.clone()).await?;
            let summary = self.write_map(archive, table).await?;
            info!(
                "{}: {} locations, {} lines written to {}",
                self.name(),
                summary.locations,
                summary.lines,
                self.config.output_dir.display()
            );
            Ok(summary)
        }
    }
}
