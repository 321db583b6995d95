//! Country/continent set generation.
//!
//! Ties the pipeline together: load a source, group prefixes by country and
//! continent, aggregate each group and render the command script.

use ipnet::IpNet;
use std::io::Write;

use crate::cidr::Aggregator;
use crate::config::GeneratorConfig;
use crate::ipset::{IpSetScript, SetName};
use crate::parser::CountryCidrs;
use crate::source::InputSource;
use crate::{Error, Result};

/// Counts reported after a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// Country sets emitted
    pub countries: usize,
    /// Continent sets emitted
    pub continents: usize,
    /// Prefixes read from the source
    pub prefixes_in: usize,
    /// `add` commands emitted
    pub prefixes_out: usize,
    /// Input lines skipped
    pub skipped_lines: usize,
}

/// Builds `ipset restore` scripts from country/CIDR mappings.
#[derive(Debug, Clone, Default)]
pub struct Generator {
    config: GeneratorConfig,
}

impl Generator {
    /// Create a generator.
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Name of the set a group is loaded into.
    fn target_name(&self, base: &str) -> SetName {
        let name = SetName::new(base, self.config.family);
        if self.config.replace_existing {
            name.temporary()
        } else {
            name
        }
    }

    /// Aggregate one group's prefixes.
    fn aggregate<'a, I>(&self, nets: I) -> Result<Vec<IpNet>>
    where
        I: IntoIterator<Item = &'a IpNet>,
    {
        let mut aggregator = Aggregator::for_family(self.config.family);
        aggregator.extend(nets.into_iter().copied())?;
        Ok(aggregator.finish())
    }

    /// Build the script for a mapping.
    ///
    /// Continents come first in table order, then countries in first-seen
    /// order. In replace mode every set is then swapped in and its temporary
    /// copy destroyed, in the same order.
    pub fn build(&self, mapping: &CountryCidrs) -> Result<(IpSetScript, Summary)> {
        if mapping.family() != self.config.family {
            return Err(Error::MixedFamily);
        }

        let family = self.config.family;
        let mut script = IpSetScript::new();
        let mut summary = Summary {
            prefixes_in: mapping.total_prefixes(),
            skipped_lines: mapping.skipped(),
            ..Summary::default()
        };
        let mut emitted: Vec<SetName> = Vec::new();

        for (continent, codes) in self.config.continents.iter() {
            let nets = self.aggregate(
                codes
                    .iter()
                    .filter_map(|code| mapping.get(code))
                    .flatten(),
            )?;
            log::debug!("{}: {} prefixes after aggregation", continent, nets.len());

            let name = self.target_name(continent.slug());
            script.push_set(&name, family, &nets);
            summary.continents += 1;
            summary.prefixes_out += nets.len();
            emitted.push(name);
        }

        for (code, cidrs) in mapping.iter() {
            let nets = self.aggregate(cidrs)?;
            if self.config.continents.continents_of(code).is_empty() {
                log::debug!("{} is not assigned to any continent", code);
            }

            let name = self.target_name(code);
            script.push_set(&name, family, &nets);
            summary.countries += 1;
            summary.prefixes_out += nets.len();
            emitted.push(name);
        }

        if self.config.replace_existing {
            for name in &emitted {
                script.push_replace(name);
            }
        }

        Ok((script, summary))
    }

    /// Load a source and write its script to `writer`.
    pub fn run<W: Write>(&self, source: &InputSource, writer: W) -> Result<Summary> {
        let mapping = source.load(self.config.family)?;
        let (script, summary) = self.build(&mapping)?;
        script.write_to(writer)?;

        log::info!(
            "Generated {} continent and {} country sets ({} -> {} prefixes)",
            summary.continents,
            summary.countries,
            summary.prefixes_in,
            summary.prefixes_out
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::continent::{Continent, ContinentTable};
    use crate::IpFamily;

    fn lines(script: &IpSetScript) -> Vec<String> {
        script.commands().iter().map(|c| c.to_string()).collect()
    }

    fn north_america_only() -> ContinentTable {
        ContinentTable::new(vec![(Continent::NorthAmerica, vec!["US".to_string()])])
    }

    #[test]
    fn test_non_adjacent_prefixes_kept() {
        let mapping = CountryCidrs::from_text("US\t1.2.3.0/24\nUS\t1.2.4.0/24\n", IpFamily::V4);
        let generator =
            Generator::new(GeneratorConfig::default().with_continents(north_america_only()));

        let (script, summary) = generator.build(&mapping).unwrap();
        assert_eq!(
            lines(&script),
            vec![
                "create north-america hash:net family inet hashsize 2 maxelem 65536",
                "add north-america 1.2.3.0/24",
                "add north-america 1.2.4.0/24",
                "create US hash:net family inet hashsize 2 maxelem 65536",
                "add US 1.2.3.0/24",
                "add US 1.2.4.0/24",
            ]
        );
        assert_eq!(summary.countries, 1);
        assert_eq!(summary.continents, 1);
        assert_eq!(summary.prefixes_in, 2);
        assert_eq!(summary.prefixes_out, 4);
    }

    #[test]
    fn test_continent_merges_across_countries() {
        let table = ContinentTable::new(vec![(
            Continent::Europe,
            vec!["DE".to_string(), "FR".to_string()],
        )]);
        let mapping = CountryCidrs::from_text("DE\t10.0.0.0/25\nFR\t10.0.0.128/25\n", IpFamily::V4);
        let generator = Generator::new(GeneratorConfig::default().with_continents(table));

        let (script, _) = generator.build(&mapping).unwrap();
        let out = lines(&script);
        assert_eq!(out[0], "create europe hash:net family inet hashsize 1 maxelem 65536");
        assert_eq!(out[1], "add europe 10.0.0.0/24");
        assert!(out.contains(&"add DE 10.0.0.0/25".to_string()));
        assert!(out.contains(&"add FR 10.0.0.128/25".to_string()));
    }

    #[test]
    fn test_empty_continent_still_created() {
        let mapping = CountryCidrs::from_text("DE\t5.6.0.0/16\n", IpFamily::V4);
        let generator =
            Generator::new(GeneratorConfig::default().with_continents(north_america_only()));

        let (script, _) = generator.build(&mapping).unwrap();
        assert_eq!(
            lines(&script)[0],
            "create north-america hash:net family inet hashsize 1 maxelem 65536"
        );
    }

    #[test]
    fn test_replace_mode_ipv6() {
        let mapping = CountryCidrs::from_text("US\t2600::/12\n", IpFamily::V6);
        let config = GeneratorConfig::new(IpFamily::V6)
            .with_replace_existing(true)
            .with_continents(north_america_only());

        let (script, _) = Generator::new(config).build(&mapping).unwrap();
        assert_eq!(
            lines(&script),
            vec![
                "create north-america-ipv6-new hash:net family inet6 hashsize 1 maxelem 65536",
                "add north-america-ipv6-new 2600::/12",
                "create US-ipv6-new hash:net family inet6 hashsize 1 maxelem 65536",
                "add US-ipv6-new 2600::/12",
                "swap north-america-ipv6 north-america-ipv6-new",
                "destroy north-america-ipv6-new",
                "swap US-ipv6 US-ipv6-new",
                "destroy US-ipv6-new",
            ]
        );
    }

    #[test]
    fn test_unknown_country_only_in_country_sets() {
        let mapping = CountryCidrs::from_text("ZZ\t1.1.1.0/24\n", IpFamily::V4);
        let (script, summary) = Generator::default().build(&mapping).unwrap();

        let out = lines(&script);
        assert_eq!(summary.continents, 6);
        assert_eq!(summary.countries, 1);
        assert_eq!(out.iter().filter(|l| l.starts_with("add ")).count(), 1);
        assert!(out.contains(&"add ZZ 1.1.1.0/24".to_string()));
    }

    #[test]
    fn test_family_mismatch_rejected() {
        let mapping = CountryCidrs::from_text("US\t2600::/12\n", IpFamily::V6);
        assert!(matches!(
            Generator::default().build(&mapping),
            Err(Error::MixedFamily)
        ));
    }
}
