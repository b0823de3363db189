use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use maxmind_geobase::{
    types::IpVersion, Config, FileSource, Generator, HttpSource, MaxMind,
};
use tracing_subscriber::prelude::*;

/// Builds nginx geo maps (mm_city.txt, mm_tz.txt, mm_country.txt,
/// mm_country_code.txt) from the MaxMind GeoLite2 City CSV archive.
#[derive(Debug, Parser)]
#[command(name = "geobase", version)]
struct Args {
    /// Read the archive from disk instead of downloading it
    #[arg(long, env = "GEOBASE_ARCHIVE", conflicts_with = "url")]
    archive: Option<PathBuf>,

    /// Download URL of the GeoLite2-City-CSV zip
    #[arg(long, env = "GEOBASE_URL")]
    url: Option<String>,

    /// MaxMind license key, used when neither --archive nor --url is given
    #[arg(long, env = "MAXMIND_LICENSE_KEY", hide_env_values = true)]
    license_key: Option<String>,

    /// Language of the locations table
    #[arg(long, env = "GEOBASE_LANG", default_value = "en")]
    lang: String,

    /// IP version of the blocks table (4 or 6)
    #[arg(long, env = "GEOBASE_IPVER", default_value = "4")]
    ipver: IpVersion,

    /// Write zone names instead of UTC offsets
    #[arg(long, env = "GEOBASE_TZ_NAMES")]
    tz_names: bool,

    /// Country codes to keep, e.g. "RUUAKZ"
    #[arg(long, env = "GEOBASE_INCLUDE", default_value = "")]
    include: String,

    /// Country codes to skip
    #[arg(long, env = "GEOBASE_EXCLUDE", default_value = "")]
    exclude: String,

    /// Write city and country names quoted instead of base64
    #[arg(long, env = "GEOBASE_NO_BASE64")]
    no_base64: bool,

    /// Do not write the country files
    #[arg(long, env = "GEOBASE_NO_COUNTRY")]
    no_country: bool,

    /// Directory for the map files
    #[arg(long, short, env = "GEOBASE_OUTPUT", default_value = ".")]
    output: PathBuf,
}

impl Args {
    fn config(&self) -> Config {
        Config {
            lang: self.lang.clone(),
            ip_version: self.ipver,
            tz_names: self.tz_names,
            include: self.include.clone(),
            exclude: self.exclude.clone(),
            no_base64: self.no_base64,
            no_country: self.no_country,
            output_dir: self.output.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("{}=info,maxmind_geobase=info", env!("CARGO_CRATE_NAME")).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = args.config();

    let summary = if let Some(path) = &args.archive {
        MaxMind::new(FileSource::new(path), config).generate().await
    } else {
        let source = match (&args.url, &args.license_key) {
            (Some(url), _) => HttpSource::new(url.as_str())?,
            (None, Some(key)) => HttpSource::with_license_key(key)?,
            (None, None) => anyhow::bail!("one of --archive, --url or --license-key is required"),
        };
        MaxMind::new(source, config).generate().await
    }
    .context("MaxMind generation failed")?;

    tracing::info!(
        "done: {} locations, {} of {} networks placed ({} without location)",
        summary.locations,
        summary.join.emitted,
        summary.join.rows,
        summary.join.misses
    );
    Ok(())
}
