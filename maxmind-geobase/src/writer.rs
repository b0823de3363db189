use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use tokio::{
    fs::File,
    io::{AsyncWriteExt, BufWriter},
    sync::mpsc,
};
use tracing::info;

use crate::{
    config::Encoding,
    error::{Error, Result},
    types::PlacementRecord,
};

pub const CITY_FILE: &str = "mm_city.txt";
pub const TZ_FILE: &str = "mm_tz.txt";
pub const COUNTRY_FILE: &str = "mm_country.txt";
pub const COUNTRY_CODE_FILE: &str = "mm_country_code.txt";

/// Encodes a free-text value for a map file.
pub fn encode_value(value: &str, encoding: Encoding) -> String {
    match encoding {
        Encoding::Quoted => format!("\"{}\"", value.replace('"', "\\\"")),
        Encoding::Base64 => STANDARD.encode(value.as_bytes()),
    }
}

fn map_line(network: &str, value: &str) -> String {
    format!("{} {};\n", network, value)
}

struct MapFile {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl MapFile {
    async fn create(dir: &Path, name: &str) -> Result<Self> {
        let path = dir.join(name);
        let file = File::create(&path)
            .await
            .map_err(|source| Error::Output {
                path: path.clone(),
                source,
            })?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    async fn write_line(&mut self, line: &str) -> Result<()> {
        self.writer
            .write_all(line.as_bytes())
            .await
            .map_err(|source| Error::Output {
                path: self.path.clone(),
                source,
            })
    }

    async fn finish(&mut self) -> Result<()> {
        self.writer.flush().await.map_err(|source| Error::Output {
            path: self.path.clone(),
            source,
        })
    }
}

struct CountryFiles {
    country: MapFile,
    code: MapFile,
}

/// The aligned set of map files of one run.
///
/// Every record is written to all open files before the next one, so line
/// `n` of each file describes the same network.
pub struct MapFiles {
    city: MapFile,
    tz: MapFile,
    country: Option<CountryFiles>,
    encoding: Encoding,
    lines: u64,
}

impl MapFiles {
    /// Creates the city and tz files, plus the country files when `country` is set.
    /// Fails on the first file that can't be created.
    pub async fn create(dir: &Path, encoding: Encoding, country: bool) -> Result<Self> {
        let city = MapFile::create(dir, CITY_FILE).await?;
        let tz = MapFile::create(dir, TZ_FILE).await?;
        let country = if country {
            Some(CountryFiles {
                country: MapFile::create(dir, COUNTRY_FILE).await?,
                code: MapFile::create(dir, COUNTRY_CODE_FILE).await?,
            })
        } else {
            None
        };
        Ok(Self {
            city,
            tz,
            country,
            encoding,
            lines: 0,
        })
    }

    pub async fn write(&mut self, placement: &PlacementRecord) -> Result<()> {
        let location = &placement.location;
        let network = &placement.network;

        self.city
            .write_line(&map_line(network, &encode_value(&location.city, self.encoding)))
            .await?;
        self.tz.write_line(&map_line(network, &location.tz)).await?;
        if let Some(files) = self.country.as_mut() {
            files
                .country
                .write_line(&map_line(network, &encode_value(&location.country, self.encoding)))
                .await?;
            files
                .code
                .write_line(&map_line(network, &location.country_code))
                .await?;
        }
        self.lines += 1;
        Ok(())
    }

    /// Writes every record received until the sender closes, then flushes.
    /// Returns the number of lines written to each file.
    pub async fn write_from(mut self, mut rx: mpsc::Receiver<PlacementRecord>) -> Result<u64> {
        while let Some(placement) = rx.recv().await {
            self.write(&placement).await?;
        }
        self.finish().await
    }

    pub async fn finish(mut self) -> Result<u64> {
        self.city.finish().await?;
        self.tz.finish().await?;
        if let Some(files) = self.country.as_mut() {
            files.country.finish().await?;
            files.code.finish().await?;
        }
        info!("Wrote {} lines per map file", self.lines);
        Ok(self.lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LocationRecord;
    use base64::Engine;

    fn placement(network: &str, city: &str, country: &str, code: &str, tz: &str) -> PlacementRecord {
        PlacementRecord {
            network: network.to_string(),
            location: LocationRecord {
                id: "1".to_string(),
                city: city.to_string(),
                tz: tz.to_string(),
                country_code: code.to_string(),
                country: country.to_string(),
            },
        }
    }

    fn read(dir: &Path, name: &str) -> String {
        std::fs::read_to_string(dir.join(name)).unwrap()
    }

    #[test]
    fn test_quoted_escapes_double_quotes() {
        assert_eq!(
            encode_value("Saint \"City\"", Encoding::Quoted),
            "\"Saint \\\"City\\\"\""
        );
        assert_eq!(encode_value("Tokyo", Encoding::Quoted), "\"Tokyo\"");
        // Backslashes are left alone.
        assert_eq!(encode_value("a\\b", Encoding::Quoted), "\"a\\b\"");
    }

    #[test]
    fn test_base64_round_trips() {
        let city = "Saint \"City\" – Ñandú";
        let token = encode_value(city, Encoding::Base64);
        assert!(!token.contains(' '));
        let decoded = STANDARD.decode(token).unwrap();
        assert_eq!(decoded, city.as_bytes());
    }

    #[tokio::test]
    async fn test_writes_aligned_lines() {
        let dir = tempfile::tempdir().unwrap();
        let mut files = MapFiles::create(dir.path(), Encoding::Quoted, true)
            .await
            .unwrap();
        files
            .write(&placement("1.0.0.0/24", "Tokyo", "Japan", "JP", "32400"))
            .await
            .unwrap();
        files
            .write(&placement("2.0.0.0/24", "Saint \"City\"", "France", "FR", "3600"))
            .await
            .unwrap();
        assert_eq!(files.finish().await.unwrap(), 2);

        assert_eq!(
            read(dir.path(), CITY_FILE),
            "1.0.0.0/24 \"Tokyo\";\n2.0.0.0/24 \"Saint \\\"City\\\"\";\n"
        );
        assert_eq!(read(dir.path(), TZ_FILE), "1.0.0.0/24 32400;\n2.0.0.0/24 3600;\n");
        assert_eq!(
            read(dir.path(), COUNTRY_FILE),
            "1.0.0.0/24 \"Japan\";\n2.0.0.0/24 \"France\";\n"
        );
        assert_eq!(
            read(dir.path(), COUNTRY_CODE_FILE),
            "1.0.0.0/24 JP;\n2.0.0.0/24 FR;\n"
        );
    }

    #[tokio::test]
    async fn test_base64_values_and_raw_tz() {
        let dir = tempfile::tempdir().unwrap();
        let mut files = MapFiles::create(dir.path(), Encoding::Base64, true)
            .await
            .unwrap();
        files
            .write(&placement("1.0.0.0/24", "Tokyo", "Japan", "JP", "Asia/Tokyo"))
            .await
            .unwrap();
        files.finish().await.unwrap();

        assert_eq!(read(dir.path(), CITY_FILE), "1.0.0.0/24 VG9reW8=;\n");
        assert_eq!(read(dir.path(), COUNTRY_FILE), "1.0.0.0/24 SmFwYW4=;\n");
        assert_eq!(read(dir.path(), TZ_FILE), "1.0.0.0/24 Asia/Tokyo;\n");
        assert_eq!(read(dir.path(), COUNTRY_CODE_FILE), "1.0.0.0/24 JP;\n");
    }

    #[tokio::test]
    async fn test_country_files_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let mut files = MapFiles::create(dir.path(), Encoding::Base64, false)
            .await
            .unwrap();
        files
            .write(&placement("1.0.0.0/24", "Tokyo", "Japan", "JP", "32400"))
            .await
            .unwrap();
        files.finish().await.unwrap();

        assert!(dir.path().join(CITY_FILE).exists());
        assert!(dir.path().join(TZ_FILE).exists());
        assert!(!dir.path().join(COUNTRY_FILE).exists());
        assert!(!dir.path().join(COUNTRY_CODE_FILE).exists());
    }

    #[tokio::test]
    async fn test_missing_directory_fails_on_open() {
        let dir = tempfile::tempdir().unwrap();
        let result = MapFiles::create(&dir.path().join("missing"), Encoding::Base64, true).await;
        match result {
            Err(Error::Output { path, .. }) => assert!(path.ends_with(CITY_FILE)),
            _ => panic!("expected an output error"),
        }
    }

    #[tokio::test]
    async fn test_write_from_channel() {
        let dir = tempfile::tempdir().unwrap();
        let files = MapFiles::create(dir.path(), Encoding::Quoted, false)
            .await
            .unwrap();
        let (tx, rx) = mpsc::channel(1);
        let sender = tokio::spawn(async move {
            for i in 0..3 {
                tx.send(placement(&format!("10.0.{}.0/24", i), "Oslo", "Norway", "NO", "3600"))
                    .await
                    .unwrap();
            }
        });

        assert_eq!(files.write_from(rx).await.unwrap(), 3);
        sender.await.unwrap();
        assert_eq!(
            read(dir.path(), CITY_FILE),
            "10.0.0.0/24 \"Oslo\";\n10.0.1.0/24 \"Oslo\";\n10.0.2.0/24 \"Oslo\";\n"
        );
    }
}
