//! Generator configuration.

use crate::continent::ContinentTable;
use crate::IpFamily;

/// Configuration for a [`Generator`](crate::Generator) run.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Address family of the generated sets
    pub family: IpFamily,
    /// Load into temporary sets and swap them over the live ones
    pub replace_existing: bool,
    /// Continent grouping
    pub continents: ContinentTable,
}

impl GeneratorConfig {
    /// Create a config for a family with the built-in continent table.
    pub fn new(family: IpFamily) -> Self {
        Self {
            family,
            replace_existing: false,
            continents: ContinentTable::default(),
        }
    }

    /// Set the address family.
    pub fn with_family(mut self, family: IpFamily) -> Self {
        self.family = family;
        self
    }

    /// Enable or disable replace mode.
    pub fn with_replace_existing(mut self, replace: bool) -> Self {
        self.replace_existing = replace;
        self
    }

    /// Use a custom continent table.
    pub fn with_continents(mut self, continents: ContinentTable) -> Self {
        self.continents = continents;
        self
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::new(IpFamily::V4)
    }
}
