//! geoipset - country and continent `ipset` scripts from CIDR lists.
//!
//! This crate turns country-to-CIDR mappings from a public IP geolocation
//! dataset into an `ipset restore` script with one `hash:net` set per
//! country and per continent.
//!
//! # Features
//!
//! - **CIDR aggregation**: duplicate, contained and sibling prefixes are
//!   collapsed into the minimal equivalent set
//! - **IPv4 and IPv6**: one family per run, with `-ipv6` set names
//! - **Continent groups**: built-in table, overridable from YAML
//! - **Replace mode**: load into `-new` sets, then `swap` and `destroy`
//! - **Input sources**: local file, per-country dataset checkout, or URL
//!
//! # Quick Start
//!
//! ```
//! use geoipset::{CountryCidrs, Generator, GeneratorConfig, IpFamily};
//!
//! let mapping = CountryCidrs::from_text("US\t1.2.3.0/24\nUS\t1.2.4.0/24\n", IpFamily::V4);
//! let generator = Generator::new(GeneratorConfig::default());
//! let (script, _summary) = generator.build(&mapping).unwrap();
//!
//! assert!(script.to_string().contains("add US 1.2.3.0/24\n"));
//! ```
//!
//! # Output
//!
//! ```text
//! create north-america hash:net family inet hashsize 2 maxelem 65536
//! add north-america 1.2.3.0/24
//! add north-america 1.2.4.0/24
//! create US hash:net family inet hashsize 2 maxelem 65536
//! add US 1.2.3.0/24
//! add US 1.2.4.0/24
//! ```

mod error;
mod family;

pub mod cidr;
pub mod config;
pub mod continent;
pub mod generator;
pub mod ipset;
pub mod parser;
pub mod source;

// Re-export core types
pub use error::{Error, Result};
pub use family::IpFamily;

pub use cidr::{aggregate, aggregate_v4, aggregate_v6, Aggregator};
pub use config::GeneratorConfig;
pub use continent::{Continent, ContinentTable};
pub use generator::{Generator, Summary};
pub use ipset::{hash_size, IpSetCommand, IpSetScript, SetName};
pub use parser::{parse_cidr, parse_line, CountryCidrs, ParsedLine};
pub use source::InputSource;
