use std::path::PathBuf;

use crate::types::Severity;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("download failed: {0}")]
    Download(#[from] reqwest::Error),

    #[error("download failed with status {0}")]
    DownloadStatus(reqwest::StatusCode),

    #[error("unable to read archive {path}: {source}")]
    ArchiveRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to unpack archive: {0}")]
    Unpack(#[from] zip::result::ZipError),

    #[error("unable to read {filename}: {source}")]
    Read {
        filename: String,
        #[source]
        source: csv::Error,
    },

    #[error("{0} not found in archive")]
    EntryNotFound(String),

    #[error("{0}: locations db is empty")]
    EmptyLocations(String),

    #[error("unable to write {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid ip version: {0}")]
    InvalidIpVersion(String),

    #[error("pipeline task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Why a locations row did not make it into the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LocationRejection {
    #[error("too short line")]
    TooShortLine,
    #[error("too short country")]
    TooShortCountry,
    #[error("country skipped")]
    CountrySkipped,
    #[error("country excluded")]
    CountryExcluded,
    #[error("too short city name")]
    TooShortCity,
}

impl LocationRejection {
    /// Severity to report with, `None` for the silent rejections.
    pub fn severity(&self) -> Option<Severity> {
        match self {
            LocationRejection::TooShortLine => Some(Severity::Fail),
            _ => None,
        }
    }
}
