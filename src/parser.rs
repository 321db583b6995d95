//! Country/CIDR text format parser.
//!
//! Each line holds a country code and a CIDR block separated by a tab:
//!
//! ```text
//! US	1.2.3.0/24
//! DE	2a00:1450::/32
//! ```

use ahash::AHashMap;
use ipnet::IpNet;
use std::io::{BufRead, BufReader, Read};

use crate::{Error, IpFamily, Result};

/// Outcome of parsing one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine<'a> {
    /// A country code and its (unvalidated) CIDR text
    Record { country: &'a str, cidr: &'a str },
    /// Blank or malformed line
    Skip,
}

/// Split a line into its country code and CIDR fields.
///
/// Lines missing either field yield [`ParsedLine::Skip`]. Fields after the
/// second tab are ignored.
pub fn parse_line(line: &str) -> ParsedLine<'_> {
    let mut fields = line.trim_end_matches(['\r', '\n']).split('\t');
    let country = fields.next().unwrap_or("").trim();
    let cidr = fields.next().unwrap_or("").trim();

    if country.is_empty() || cidr.is_empty() {
        ParsedLine::Skip
    } else {
        ParsedLine::Record { country, cidr }
    }
}

/// Parse the CIDR field of a record.
pub fn parse_cidr(text: &str) -> Result<IpNet> {
    text.parse::<IpNet>()
        .map_err(|_| Error::InvalidCidr(text.to_string()))
}

/// Prefixes grouped by country code, in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct CountryCidrs {
    family: IpFamily,
    order: Vec<String>,
    cidrs: AHashMap<String, Vec<IpNet>>,
    skipped: usize,
}

impl CountryCidrs {
    /// Create an empty mapping for one address family.
    pub fn new(family: IpFamily) -> Self {
        Self {
            family,
            ..Self::default()
        }
    }

    /// Build a mapping from country/CIDR lines.
    ///
    /// Lines that are not valid UTF-8 are skipped and counted; only read
    /// errors are fatal.
    pub fn from_reader<R: Read>(reader: R, family: IpFamily) -> Result<Self> {
        let mut mapping = Self::new(family);
        for line in BufReader::new(reader).split(b'\n') {
            mapping.add_bytes(&line?);
        }

        log::debug!(
            "Parsed {} prefixes for {} countries ({} lines skipped)",
            mapping.total_prefixes(),
            mapping.len(),
            mapping.skipped
        );
        Ok(mapping)
    }

    /// Build a mapping from an in-memory string.
    pub fn from_text(text: &str, family: IpFamily) -> Self {
        let mut mapping = Self::new(family);
        for line in text.lines() {
            mapping.add_line(line);
        }
        mapping
    }

    /// Add one raw input line, skipping it if it is not valid UTF-8.
    pub fn add_bytes(&mut self, line: &[u8]) -> bool {
        match std::str::from_utf8(line) {
            Ok(text) => self.add_line(text),
            Err(e) => {
                log::warn!("Skipping line that is not valid UTF-8: {}", e);
                self.skipped += 1;
                false
            }
        }
    }

    /// Add one input line, skipping it if malformed or of the other family.
    ///
    /// Returns `true` if a prefix was recorded.
    pub fn add_line(&mut self, line: &str) -> bool {
        let (country, cidr) = match parse_line(line) {
            ParsedLine::Record { country, cidr } => (country, cidr),
            ParsedLine::Skip => {
                if !line.trim().is_empty() {
                    self.skipped += 1;
                }
                return false;
            }
        };

        let net = match parse_cidr(cidr) {
            Ok(net) => net,
            Err(e) => {
                log::warn!("Skipping line for {}: {}", country, e);
                self.skipped += 1;
                return false;
            }
        };

        if !self.family.matches(&net) {
            log::debug!("Skipping {} prefix {} for {} run", country, net, self.family);
            self.skipped += 1;
            return false;
        }

        self.insert(country, net);
        true
    }

    /// Record a prefix for a country code.
    pub fn insert(&mut self, country: &str, net: IpNet) {
        let code = country.to_uppercase();
        match self.cidrs.get_mut(&code) {
            Some(list) => list.push(net),
            None => {
                self.order.push(code.clone());
                self.cidrs.insert(code, vec![net]);
            }
        }
    }

    /// Get the prefixes recorded for a country code.
    pub fn get(&self, country: &str) -> Option<&[IpNet]> {
        self.cidrs.get(&country.to_uppercase()).map(|v| v.as_slice())
    }

    /// Iterate countries and their prefixes in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[IpNet])> {
        self.order.iter().filter_map(move |code| {
            self.cidrs
                .get(code)
                .map(|nets| (code.as_str(), nets.as_slice()))
        })
    }

    /// Country codes in first-seen order.
    pub fn countries(&self) -> &[String] {
        &self.order
    }

    /// Address family of the recorded prefixes.
    pub fn family(&self) -> IpFamily {
        self.family
    }

    /// Number of countries.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check if no prefixes were recorded.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Total number of recorded prefixes across all countries.
    pub fn total_prefixes(&self) -> usize {
        self.cidrs.values().map(|v| v.len()).sum()
    }

    /// Number of non-blank lines that were skipped.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}
