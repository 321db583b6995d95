//! geoipset-gen: CLI tool for generating ipset scripts from country CIDR lists.

use clap::{ArgGroup, Parser};
use geoipset::{ContinentTable, Generator, GeneratorConfig, InputSource, IpFamily};
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "geoipset-gen")]
#[command(version)]
#[command(about = "Generate an ipset file from published CIDR lists", long_about = None)]
#[command(group(ArgGroup::new("source").args(["input", "dataset_dir", "url"])))]
struct Cli {
    /// Generate an ipset file for IPv4
    #[arg(short = '4', conflicts_with = "ipv6")]
    ipv4: bool,

    /// Generate an ipset file for IPv6
    #[arg(short = '6')]
    ipv6: bool,

    /// Generate an ipset file for which IP protocol version
    #[arg(short, long, value_parser = ["4", "6"], default_value = "4")]
    ip_version: String,

    /// Replace existing ipsets with no downtime: load into temporary sets,
    /// then swap them in place
    #[arg(short, long)]
    replace_existing: bool,

    /// Tab-separated country/CIDR file [default: sorted-from-git-ipv<N>.txt]
    #[arg(short = 'f', long)]
    input: Option<PathBuf>,

    /// Per-country dataset checkout containing ipv4/ and ipv6/ directories
    #[arg(short, long)]
    dataset_dir: Option<PathBuf>,

    /// Fetch tab-separated country/CIDR text from a URL
    #[arg(short, long)]
    url: Option<String>,

    /// YAML file overriding the continent table
    #[arg(short, long)]
    continents: Option<PathBuf>,

    /// Leave the generic AP/EU registry codes out of continent sets
    #[arg(long)]
    no_regional_codes: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn family(&self) -> IpFamily {
        if self.ipv6 {
            return IpFamily::V6;
        }
        if self.ipv4 {
            return IpFamily::V4;
        }
        self.ip_version.parse().unwrap_or_default()
    }

    fn source(&self, family: IpFamily) -> InputSource {
        if let Some(ref path) = self.input {
            InputSource::File(path.clone())
        } else if let Some(ref dir) = self.dataset_dir {
            InputSource::Directory(dir.clone())
        } else if let Some(ref url) = self.url {
            InputSource::Remote(url.clone())
        } else {
            InputSource::default_file(family)
        }
    }

    fn continent_table(&self) -> geoipset::Result<ContinentTable> {
        let table = match self.continents {
            Some(ref path) => ContinentTable::load(path)?,
            None => ContinentTable::default(),
        };
        if self.no_regional_codes {
            Ok(table.without_regional_codes())
        } else {
            Ok(table)
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> geoipset::Result<()> {
    let family = cli.family();
    let config = GeneratorConfig::new(family)
        .with_replace_existing(cli.replace_existing)
        .with_continents(cli.continent_table()?);

    let source = cli.source(family);
    log::debug!("Generating {} sets from {}", family, source);

    let stdout = io::stdout();
    Generator::new(config).run(&source, stdout.lock())?;
    Ok(())
}
