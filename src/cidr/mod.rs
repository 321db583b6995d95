//! CIDR aggregation.
//!
//! Collapses a collection of network prefixes into the smallest equivalent
//! set: duplicates and contained prefixes are dropped, and sibling blocks
//! that exactly fill their parent are merged, repeatedly.
//!
//! # Examples
//! ```
//! use geoipset::cidr::aggregate_v4;
//! use ipnet::Ipv4Net;
//!
//! let nets: Vec<Ipv4Net> = vec![
//!     "10.0.0.0/25".parse().unwrap(),
//!     "10.0.0.128/25".parse().unwrap(),
//! ];
//! assert_eq!(aggregate_v4(&nets), vec!["10.0.0.0/24".parse::<Ipv4Net>().unwrap()]);
//! ```

mod merge;


use ipnet::{IpNet, Ipv4Net, Ipv6Net};
use std::net::{Ipv4Addr, Ipv6Addr};

use crate::{Error, IpFamily, Result};
use merge::{merge_blocks, Block, V4_WIDTH, V6_WIDTH};

/// Aggregate IPv4 prefixes.
pub fn aggregate_v4(nets: &[Ipv4Net]) -> Vec<Ipv4Net> {
    let blocks = nets
        .iter()
        .map(|n| Block::normalized(u128::from(u32::from(n.addr())), n.prefix_len(), V4_WIDTH))
        .collect();

    merge_blocks(blocks, V4_WIDTH)
        .into_iter()
        .filter_map(|b| Ipv4Net::new(Ipv4Addr::from(b.start as u32), b.len).ok())
        .collect()
}

/// Aggregate IPv6 prefixes.
pub fn aggregate_v6(nets: &[Ipv6Net]) -> Vec<Ipv6Net> {
    let blocks = nets
        .iter()
        .map(|n| Block::normalized(u128::from(n.addr()), n.prefix_len(), V6_WIDTH))
        .collect();

    merge_blocks(blocks, V6_WIDTH)
        .into_iter()
        .filter_map(|b| Ipv6Net::new(Ipv6Addr::from(b.start), b.len).ok())
        .collect()
}

/// Aggregate prefixes of a single address family.
///
/// Returns [`Error::MixedFamily`] if both IPv4 and IPv6 prefixes are present.
pub fn aggregate(nets: &[IpNet]) -> Result<Vec<IpNet>> {
    let mut aggregator = Aggregator::new();
    aggregator.extend(nets.iter().copied())?;
    Ok(aggregator.finish())
}

/// Accumulates prefixes of one family for a single aggregation.
///
/// The family is fixed by the first prefix pushed.
#[derive(Debug, Default, Clone)]
pub struct Aggregator {
    family: Option<IpFamily>,
    v4: Vec<Ipv4Net>,
    v6: Vec<Ipv6Net>,
}

impl Aggregator {
    /// Create an empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an aggregator that only accepts prefixes of `family`.
    pub fn for_family(family: IpFamily) -> Self {
        Self {
            family: Some(family),
            ..Self::default()
        }
    }

    /// Add a prefix.
    pub fn push(&mut self, net: IpNet) -> Result<()> {
        let family = IpFamily::of(&net);
        match self.family {
            Some(f) if f != family => return Err(Error::MixedFamily),
            _ => self.family = Some(family),
        }
        match net {
            IpNet::V4(n) => self.v4.push(n),
            IpNet::V6(n) => self.v6.push(n),
        }
        Ok(())
    }

    /// Add every prefix from an iterator, stopping at the first family mismatch.
    pub fn extend<I: IntoIterator<Item = IpNet>>(&mut self, nets: I) -> Result<()> {
        for net in nets {
            self.push(net)?;
        }
        Ok(())
    }

    /// Number of prefixes pushed so far.
    pub fn len(&self) -> usize {
        self.v4.len() + self.v6.len()
    }

    /// Check if nothing has been pushed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the family fixed by the pushed prefixes, if any.
    pub fn family(&self) -> Option<IpFamily> {
        self.family
    }

    /// Produce the aggregated, sorted prefix list.
    pub fn finish(self) -> Vec<IpNet> {
        match self.family {
            Some(IpFamily::V4) => aggregate_v4(&self.v4).into_iter().map(IpNet::V4).collect(),
            Some(IpFamily::V6) => aggregate_v6(&self.v6).into_iter().map(IpNet::V6).collect(),
            None => Vec::new(),
        }
    }
}
