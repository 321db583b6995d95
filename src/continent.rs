//! Continent grouping of country codes.

use ahash::AHashMap;
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::{Error, Result};

/// A continent-level set group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Continent {
    Africa,
    Asia,
    Europe,
    NorthAmerica,
    Oceania,
    SouthAmerica,
}

impl Continent {
    /// All continents in emission order.
    pub const ALL: [Continent; 6] = [
        Continent::Africa,
        Continent::Asia,
        Continent::Europe,
        Continent::NorthAmerica,
        Continent::Oceania,
        Continent::SouthAmerica,
    ];

    /// Get the set name slug.
    pub fn slug(&self) -> &'static str {
        match self {
            Continent::Africa => "africa",
            Continent::Asia => "asia",
            Continent::Europe => "europe",
            Continent::NorthAmerica => "north-america",
            Continent::Oceania => "oceania",
            Continent::SouthAmerica => "south-america",
        }
    }
}

impl fmt::Display for Continent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.slug())
    }
}

impl std::str::FromStr for Continent {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let slug = s.trim().to_lowercase().replace(['_', ' '], "-");
        Continent::ALL
            .into_iter()
            .find(|c| c.slug() == slug)
            .ok_or_else(|| Error::UnknownContinent(s.to_string()))
    }
}

// Not assigned to any continent: AQ (Antarctica), A1 (anonymous proxies),
// A2 (satellite providers), ZZ (unknown).
const AFRICA: &[&str] = &[
    "AO", "BF", "BI", "BJ", "BW", "CD", "CF", "CG", "CI", "CM", "CV", "DJ", "DZ", "EG", "EH",
    "ER", "ET", "GA", "GH", "GM", "GN", "GQ", "GW", "IO", "KE", "KM", "LR", "LS", "LY", "MA",
    "MG", "ML", "MR", "MU", "MW", "MZ", "NA", "NE", "NG", "RE", "RW", "SC", "SD", "SH", "SL",
    "SN", "SO", "SS", "ST", "SZ", "TD", "TF", "TG", "TN", "TZ", "UG", "YT", "ZA", "ZM", "ZW",
];

const ASIA: &[&str] = &[
    "AE", "AF", "AM", "AP", "AZ", "BD", "BH", "BN", "BT", "CC", "CN", "CX", "CY", "EG", "GE",
    "HK", "ID", "IL", "IN", "IQ", "IR", "JO", "JP", "KG", "KH", "KP", "KR", "KW", "KZ", "LA",
    "LB", "LK", "MM", "MN", "MO", "MV", "MY", "NP", "OM", "PH", "PK", "PS", "QA", "RU", "SA",
    "SG", "SY", "TH", "TJ", "TL", "TM", "TR", "TW", "UZ", "VN", "XD", "XS", "YE",
];

const EUROPE: &[&str] = &[
    "AD", "AL", "AM", "AT", "AX", "AZ", "BA", "BE", "BG", "BY", "CH", "CY", "CZ", "DE", "DK",
    "EE", "ES", "EU", "FI", "FO", "FR", "GB", "GE", "GG", "GI", "GR", "HR", "HU", "IE", "IM",
    "IS", "IT", "JE", "KZ", "LI", "LT", "LU", "LV", "MC", "MD", "ME", "MK", "MT", "NL", "NO",
    "PL", "PT", "RO", "RS", "RU", "SE", "SI", "SJ", "SK", "SM", "TR", "UA", "VA", "XK",
];

const NORTH_AMERICA: &[&str] = &[
    "AG", "AI", "AW", "BB", "BL", "BM", "BQ", "BS", "BZ", "CA", "CR", "CU", "CW", "DM", "DO",
    "GD", "GL", "GP", "GT", "HN", "HT", "JM", "KN", "KY", "LC", "MF", "MQ", "MS", "MX", "NI",
    "PA", "PM", "PR", "SV", "SX", "TC", "TT", "UM", "US", "VC", "VG", "VI",
];

const OCEANIA: &[&str] = &[
    "AS", "AU", "CK", "FJ", "FM", "GU", "KI", "MH", "MP", "NC", "NF", "NR", "NU", "NZ", "PF",
    "PG", "PN", "PW", "SB", "TK", "TO", "TV", "UM", "VU", "WF", "WS", "XX",
];

const SOUTH_AMERICA: &[&str] = &[
    "AR", "BO", "BR", "CL", "CO", "EC", "FK", "GF", "GY", "PE", "PY", "SR", "UY", "VE",
];

/// Generic registry codes that stand for a whole region rather than a country.
pub const REGIONAL_CODES: &[&str] = &["AP", "EU"];

static BUILTIN: Lazy<ContinentTable> = Lazy::new(|| {
    ContinentTable::new(
        Continent::ALL
            .into_iter()
            .map(|c| {
                let codes = match c {
                    Continent::Africa => AFRICA,
                    Continent::Asia => ASIA,
                    Continent::Europe => EUROPE,
                    Continent::NorthAmerica => NORTH_AMERICA,
                    Continent::Oceania => OCEANIA,
                    Continent::SouthAmerica => SOUTH_AMERICA,
                };
                (c, codes.iter().map(|s| s.to_string()).collect())
            })
            .collect(),
    )
});

/// Ordered mapping of continents to their member country codes.
///
/// A country may belong to more than one continent (e.g. `RU`, `TR`).
#[derive(Debug, Clone)]
pub struct ContinentTable {
    entries: Vec<(Continent, Vec<String>)>,
    /// Reverse index: country code -> continents
    index: AHashMap<String, Vec<Continent>>,
}

impl ContinentTable {
    /// Build a table from continent entries. Codes are upper-cased and
    /// continents keep the given order.
    pub fn new(entries: Vec<(Continent, Vec<String>)>) -> Self {
        let entries: Vec<(Continent, Vec<String>)> = entries
            .into_iter()
            .map(|(c, codes)| (c, codes.iter().map(|s| s.trim().to_uppercase()).collect()))
            .collect();

        let mut index: AHashMap<String, Vec<Continent>> = AHashMap::new();
        for (continent, codes) in &entries {
            for code in codes {
                let owners = index.entry(code.clone()).or_default();
                if !owners.contains(continent) {
                    owners.push(*continent);
                }
            }
        }

        Self { entries, index }
    }

    /// Get the built-in table.
    pub fn builtin() -> &'static ContinentTable {
        &BUILTIN
    }

    /// Copy of this table with the generic regional codes (`AP`, `EU`) removed.
    pub fn without_regional_codes(&self) -> Self {
        Self::new(
            self.entries
                .iter()
                .map(|(c, codes)| {
                    let codes = codes
                        .iter()
                        .filter(|code| !REGIONAL_CODES.contains(&code.as_str()))
                        .cloned()
                        .collect();
                    (*c, codes)
                })
                .collect(),
        )
    }

    /// Parse a table from YAML mapping continent slugs to code lists.
    ///
    /// Continents are ordered as in [`Continent::ALL`]; those absent from the
    /// document are left out of the table.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let mut raw: HashMap<Continent, Vec<String>> = serde_yaml::from_str(content)?;
        let entries = Continent::ALL
            .into_iter()
            .filter_map(|c| raw.remove(&c).map(|codes| (c, codes)))
            .collect();
        Ok(Self::new(entries))
    }

    /// Load a table from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read continent table {:?}: {}", path, e))
        })?;
        Self::from_yaml(&content)
    }

    /// Get the member codes of a continent (empty if not in the table).
    pub fn countries(&self, continent: Continent) -> &[String] {
        self.entries
            .iter()
            .find(|(c, _)| *c == continent)
            .map(|(_, codes)| codes.as_slice())
            .unwrap_or(&[])
    }

    /// Get the continents a country code belongs to.
    pub fn continents_of(&self, code: &str) -> &[Continent] {
        self.index
            .get(&code.to_uppercase())
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Iterate continents and their codes in table order.
    pub fn iter(&self) -> impl Iterator<Item = (Continent, &[String])> {
        self.entries.iter().map(|(c, codes)| (*c, codes.as_slice()))
    }

    /// Number of continents in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table has no continents.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ContinentTable {
    fn default() -> Self {
        BUILTIN.clone()
    }
}
