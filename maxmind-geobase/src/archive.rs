use std::{
    future::Future,
    io::{Cursor, Read},
    path::PathBuf,
    sync::Arc,
    time::Duration,
};

use bytes::Bytes;
use tracing::{debug, info};

use crate::{
    error::{Error, Result},
    extract::CsvRows,
    report::Reporter,
};

pub const GEOLITE2_CITY_CSV_URL: &str =
    "https://download.maxmind.com/app/geoip_download?edition_id=GeoLite2-City-CSV&suffix=zip";

/// Where the compressed dataset comes from.
pub trait ArchiveSource: Send + Sync {
    fn fetch(&self) -> impl Future<Output = Result<Bytes>> + Send;
}

/// Downloads the archive over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSource {
    url: String,
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(600))
            .build()?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }

    /// The GeoLite2 City CSV permalink for a MaxMind account.
    pub fn with_license_key(license_key: &str) -> Result<Self> {
        Self::new(format!("{}&license_key={}", GEOLITE2_CITY_CSV_URL, license_key))
    }
}

impl ArchiveSource for HttpSource {
    fn fetch(&self) -> impl Future<Output = Result<Bytes>> + Send {
        async move {
            let response = self.client.get(&self.url).send().await?;
            if !response.status().is_success() {
                return Err(Error::DownloadStatus(response.status()));
            }
            let body = response.bytes().await?;
            info!("Downloaded archive ({} bytes)", body.len());
            Ok(body)
        }
    }
}

/// Reads an archive that was downloaded beforehand.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ArchiveSource for FileSource {
    fn fetch(&self) -> impl Future<Output = Result<Bytes>> + Send {
        async move {
            let data = tokio::fs::read(&self.path)
                .await
                .map_err(|source| Error::ArchiveRead {
                    path: self.path.clone(),
                    source,
                })?;
            info!("Read archive {} ({} bytes)", self.path.display(), data.len());
            Ok(Bytes::from(data))
        }
    }
}

/// An archive already held in memory.
impl ArchiveSource for Bytes {
    fn fetch(&self) -> impl Future<Output = Result<Bytes>> + Send {
        let data = self.clone();
        async move { Ok(data) }
    }
}

/// The unpacked zip bundle. Cloning shares the underlying buffer.
#[derive(Clone)]
pub struct Archive {
    inner: zip::ZipArchive<Cursor<Bytes>>,
}

impl Archive {
    pub fn unpack(data: Bytes) -> Result<Self> {
        let inner = zip::ZipArchive::new(Cursor::new(data))?;
        debug!("Archive holds {} entries", inner.len());
        Ok(Self { inner })
    }

    /// Full entry path for a table name, ignoring the bundle's directory prefix.
    pub fn entry_name(&self, filename: &str) -> Option<String> {
        let suffix = format!("/{}", filename);
        self.inner
            .file_names()
            .find(|name| *name == filename || name.ends_with(&suffix))
            .map(str::to_string)
    }

    /// Rows of the named CSV table.
    pub fn rows(
        &mut self,
        filename: &str,
        source: &'static str,
        delimiter: u8,
        skip_header: bool,
        reporter: Arc<dyn Reporter>,
    ) -> Result<CsvRows<impl Read + '_>> {
        let entry = self
            .entry_name(filename)
            .ok_or_else(|| Error::EntryNotFound(filename.to_string()))?;
        debug!("Reading {} from archive", entry);
        let file = self.inner.by_name(&entry)?;
        Ok(CsvRows::new(
            file, filename, source, delimiter, skip_header, reporter,
        ))
    }
}
