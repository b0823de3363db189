use std::future::Future;

pub mod archive;
pub mod config;
pub mod error;
pub mod extract;
pub mod join;
pub mod locations;
pub mod maxmind;
pub mod network;
pub mod report;
pub mod timezone;
pub mod types;
pub mod writer;
#[cfg(test)]
mod test_helpers;

pub use archive::{ArchiveSource, FileSource, HttpSource};
pub use config::{Config, Encoding};
pub use error::{Error, Result};
pub use maxmind::MaxMind;
pub use report::{Reporter, TracingReporter};
pub use types::Summary;

/// A producer of geo map files in the shared `network value;` line format.
pub trait Generator: Send + Sync {
    fn name(&self) -> &'static str;
    fn generate(&self) -> impl Future<Output = Result<Summary>> + Send;
}
