//! Address family selection.

use std::fmt;

use ipnet::IpNet;

use crate::Error;

/// IpFamily selects which address family a run generates sets for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IpFamily {
    /// IPv4 (`family inet`)
    #[default]
    V4,
    /// IPv6 (`family inet6`)
    V6,
}

impl IpFamily {
    /// Get the family for an IP version number.
    ///
    /// Returns `None` for anything other than 4 or 6.
    pub fn from_version(version: u8) -> Option<Self> {
        match version {
            4 => Some(IpFamily::V4),
            6 => Some(IpFamily::V6),
            _ => None,
        }
    }

    /// Get the IP version number.
    pub fn version(self) -> u8 {
        match self {
            IpFamily::V4 => 4,
            IpFamily::V6 => 6,
        }
    }

    /// Get the family keyword used by `ipset create`.
    pub fn inet(self) -> &'static str {
        match self {
            IpFamily::V4 => "inet",
            IpFamily::V6 => "inet6",
        }
    }

    /// Get the suffix appended to set names for this family.
    pub fn set_suffix(self) -> &'static str {
        match self {
            IpFamily::V4 => "",
            IpFamily::V6 => "-ipv6",
        }
    }

    /// Get the family of a network.
    pub fn of(net: &IpNet) -> Self {
        match net {
            IpNet::V4(_) => IpFamily::V4,
            IpNet::V6(_) => IpFamily::V6,
        }
    }

    /// Check whether a network belongs to this family.
    pub fn matches(self, net: &IpNet) -> bool {
        Self::of(net) == self
    }
}

impl fmt::Display for IpFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IPv{}", self.version())
    }
}

impl std::str::FromStr for IpFamily {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "4" | "ipv4" | "v4" | "inet" => Ok(IpFamily::V4),
            "6" | "ipv6" | "v6" | "inet6" => Ok(IpFamily::V6),
            _ => Err(Error::InvalidIpVersion(s.to_string())),
        }
    }
}
