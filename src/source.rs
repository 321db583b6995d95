//! Input sources for country/CIDR data.
//!
//! Every source is read once and yields bytes in the tab-separated
//! `<country>\t<cidr>` line format understood by [`CountryCidrs`].

use flate2::read::GzDecoder;
use std::fmt;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::parser::CountryCidrs;
use crate::{Error, IpFamily, Result};

/// Timeout for fetching a remote source.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(60);

/// Where country/CIDR data is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// Tab-separated text file
    File(PathBuf),
    /// Checkout of a per-country dataset: `ipv4/<cc>.cidr`, `ipv6/<cc>.cidr`
    Directory(PathBuf),
    /// Tab-separated text at a URL, optionally gzip compressed
    Remote(String),
}

impl InputSource {
    /// The conventional local file for an address family.
    pub fn default_file(family: IpFamily) -> Self {
        InputSource::File(PathBuf::from(format!(
            "sorted-from-git-ipv{}.txt",
            family.version()
        )))
    }

    /// Read the whole source as raw country/CIDR bytes.
    ///
    /// Nothing is decoded here; lines that are not valid UTF-8 are skipped
    /// by [`CountryCidrs::from_reader`].
    pub fn read(&self, family: IpFamily) -> Result<Vec<u8>> {
        match self {
            InputSource::File(path) => fs::read(path).map_err(|e| {
                Error::Config(format!("cannot read input file {:?}: {}", path, e))
            }),
            InputSource::Directory(path) => read_dataset_dir(path, family),
            InputSource::Remote(url) => fetch(url),
        }
    }

    /// Read the source and group its prefixes by country.
    pub fn load(&self, family: IpFamily) -> Result<CountryCidrs> {
        let data = self.read(family)?;
        let mapping = CountryCidrs::from_reader(&data[..], family)?;
        log::info!(
            "Loaded {} prefixes for {} countries from {}",
            mapping.total_prefixes(),
            mapping.len(),
            self
        );
        Ok(mapping)
    }
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputSource::File(path) => write!(f, "file {}", path.display()),
            InputSource::Directory(path) => write!(f, "directory {}", path.display()),
            InputSource::Remote(url) => write!(f, "{}", url),
        }
    }
}

/// Convert a per-country dataset directory into country/CIDR lines.
///
/// Uses `<dir>/ipv{4,6}` when present, otherwise `dir` itself. Files are
/// visited in name order; the file stem is the country code.
fn read_dataset_dir(dir: &Path, family: IpFamily) -> Result<Vec<u8>> {
    let versioned = dir.join(format!("ipv{}", family.version()));
    let dir = if versioned.is_dir() { versioned } else { dir.to_path_buf() };

    let mut files: Vec<PathBuf> = fs::read_dir(&dir)
        .map_err(|e| Error::Config(format!("cannot read dataset directory {:?}: {}", dir, e)))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().map_or(false, |ext| ext == "cidr"))
        .collect();
    files.sort();

    let mut data = Vec::new();
    for file in &files {
        let country = match file.file_stem().and_then(|s| s.to_str()) {
            Some(stem) => stem.to_uppercase(),
            None => continue,
        };
        for raw in fs::read(file)?.split(|&b| b == b'\n') {
            // Undecodable lines are passed through for the parser to skip.
            if let Ok(line) = std::str::from_utf8(raw) {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
            }
            data.extend_from_slice(country.as_bytes());
            data.push(b'\t');
            data.extend_from_slice(raw);
            data.push(b'\n');
        }
    }

    log::debug!("Read {} country files from {:?}", files.len(), dir);
    Ok(data)
}

/// Fetch a remote source once.
fn fetch(url: &str) -> Result<Vec<u8>> {
    let client = reqwest::blocking::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()?;

    log::info!("Downloading {}", url);
    let response = client.get(url).send()?.error_for_status()?;
    let raw = response.bytes()?;

    if is_gzip(&raw) {
        let mut decoder = GzDecoder::new(&raw[..]);
        let mut data = Vec::new();
        decoder
            .read_to_end(&mut data)
            .map_err(|e| Error::Config(format!("Gzip decompression failed: {}", e)))?;
        log::debug!("Decompressed {} -> {} bytes", raw.len(), data.len());
        Ok(data)
    } else {
        Ok(raw.to_vec())
    }
}

/// Check if data is gzip compressed.
fn is_gzip(data: &[u8]) -> bool {
    data.len() >= 2 && data[0] == 0x1f && data[1] == 0x8b
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_file() {
        assert_eq!(
            InputSource::default_file(IpFamily::V4),
            InputSource::File(PathBuf::from("sorted-from-git-ipv4.txt"))
        );
        assert_eq!(
            InputSource::default_file(IpFamily::V6),
            InputSource::File(PathBuf::from("sorted-from-git-ipv6.txt"))
        );
    }

    #[test]
    fn test_is_gzip() {
        use flate2::write::GzEncoder;
        use flate2::Compression;

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"US\t1.2.3.0/24\n").unwrap();
        let gzip_data = encoder.finish().unwrap();

        assert!(is_gzip(&gzip_data));
        assert!(!is_gzip(b"US\t1.2.3.0/24\n"));
        assert!(!is_gzip(&[0x1f]));
    }

    #[test]
    fn test_missing_file_is_error() {
        let source = InputSource::File(PathBuf::from("/nonexistent/sorted-from-git-ipv4.txt"));
        assert!(matches!(source.read(IpFamily::V4), Err(Error::Config(_))));
    }

    #[test]
    fn test_read_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.txt");
        fs::write(&path, "US\t1.2.3.0/24\n").unwrap();

        let mapping = InputSource::File(path).load(IpFamily::V4).unwrap();
        assert_eq!(mapping.countries(), &["US"]);
    }

    #[test]
    fn test_read_dataset_dir() {
        let dir = tempfile::tempdir().unwrap();
        let v4 = dir.path().join("ipv4");
        fs::create_dir(&v4).unwrap();
        fs::write(v4.join("us.cidr"), "1.2.3.0/24\n\n1.2.4.0/24\n").unwrap();
        fs::write(v4.join("de.cidr"), "5.6.0.0/16\n").unwrap();
        fs::write(v4.join("README.md"), "not data\n").unwrap();

        let data = InputSource::Directory(dir.path().to_path_buf())
            .read(IpFamily::V4)
            .unwrap();
        assert_eq!(data, b"DE\t5.6.0.0/16\nUS\t1.2.3.0/24\nUS\t1.2.4.0/24\n");
    }

    #[test]
    fn test_dataset_dir_invalid_utf8_line() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("fr.cidr"), b"2.0.0.0/12
\xff\xfe
").unwrap();

        let mapping = InputSource::Directory(dir.path().to_path_buf())
            .load(IpFamily::V4)
            .unwrap();
        assert_eq!(mapping.countries(), &["FR"]);
        assert_eq!(mapping.total_prefixes(), 1);
        assert_eq!(mapping.skipped(), 1);
    }

    #[test]
    fn test_read_file_invalid_utf8_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.txt");
        fs::write(&path, b"US\t1.2.3.0/24\n\xff\xfe junk\n").unwrap();

        let mapping = InputSource::File(path).load(IpFamily::V4).unwrap();
        assert_eq!(mapping.countries(), &["US"]);
        assert_eq!(mapping.skipped(), 1);
    }

    #[test]
    fn test_missing_dataset_dir_is_error() {
        let source = InputSource::Directory(PathBuf::from("/nonexistent/country-ip-blocks"));
        assert!(source.read(IpFamily::V6).is_err());
    }

    #[test]
    fn test_display() {
        let source = InputSource::Remote("https://example.com/ipv4.txt".to_string());
        assert_eq!(source.to_string(), "https://example.com/ipv4.txt");
    }
}
