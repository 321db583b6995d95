//! `ipset restore` command script.

use ipnet::IpNet;
use std::fmt;
use std::io::{self, Write};

use crate::IpFamily;

/// Value of `maxelem` for every created set.
pub const MAX_ELEM: u32 = 65536;

/// Suffix of the temporary sets loaded in replace mode.
pub const TEMPORARY_SUFFIX: &str = "-new";

/// Smallest power of two not below `len`.
///
/// An empty group still yields 1, the smallest valid `hashsize`.
pub fn hash_size(len: usize) -> usize {
    len.max(1).next_power_of_two()
}

/// Name of a set: group name, family suffix and optional temporary suffix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SetName {
    base: String,
    family: IpFamily,
    temporary: bool,
}

impl SetName {
    /// Create the live set name for a group.
    pub fn new(base: impl Into<String>, family: IpFamily) -> Self {
        Self {
            base: base.into(),
            family,
            temporary: false,
        }
    }

    /// The temporary counterpart of this set.
    pub fn temporary(&self) -> Self {
        Self {
            temporary: true,
            ..self.clone()
        }
    }

    /// The live counterpart of this set.
    pub fn live(&self) -> Self {
        Self {
            temporary: false,
            ..self.clone()
        }
    }

    /// Get the group name without suffixes.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Check if this names a temporary set.
    pub fn is_temporary(&self) -> bool {
        self.temporary
    }
}

impl fmt::Display for SetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.base, self.family.set_suffix())?;
        if self.temporary {
            f.write_str(TEMPORARY_SUFFIX)?;
        }
        Ok(())
    }
}

/// A single `ipset restore` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IpSetCommand {
    Create {
        name: SetName,
        family: IpFamily,
        hash_size: usize,
    },
    Add {
        name: SetName,
        net: IpNet,
    },
    Swap {
        from: SetName,
        to: SetName,
    },
    Destroy {
        name: SetName,
    },
}

impl fmt::Display for IpSetCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpSetCommand::Create {
                name,
                family,
                hash_size,
            } => write!(
                f,
                "create {} hash:net family {} hashsize {} maxelem {}",
                name,
                family.inet(),
                hash_size,
                MAX_ELEM
            ),
            IpSetCommand::Add { name, net } => write!(f, "add {} {}", name, net),
            IpSetCommand::Swap { from, to } => write!(f, "swap {} {}", from, to),
            IpSetCommand::Destroy { name } => write!(f, "destroy {}", name),
        }
    }
}

/// An ordered list of commands.
#[derive(Debug, Clone, Default)]
pub struct IpSetScript {
    commands: Vec<IpSetCommand>,
}

impl IpSetScript {
    /// Create an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a `create` command followed by one `add` per prefix.
    pub fn push_set(&mut self, name: &SetName, family: IpFamily, nets: &[IpNet]) {
        self.commands.push(IpSetCommand::Create {
            name: name.clone(),
            family,
            hash_size: hash_size(nets.len()),
        });
        self.commands.extend(nets.iter().map(|net| IpSetCommand::Add {
            name: name.clone(),
            net: *net,
        }));
    }

    /// Append the swap of a temporary set into its live name and the
    /// destruction of the temporary set.
    pub fn push_replace(&mut self, name: &SetName) {
        let live = name.live();
        let temporary = name.temporary();
        self.commands.push(IpSetCommand::Swap {
            from: live,
            to: temporary.clone(),
        });
        self.commands.push(IpSetCommand::Destroy { name: temporary });
    }

    /// Append a single command.
    pub fn push(&mut self, command: IpSetCommand) {
        self.commands.push(command);
    }

    /// Get the commands.
    pub fn commands(&self) -> &[IpSetCommand] {
        &self.commands
    }

    /// Number of commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Check if the script has no commands.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Write one command per line.
    pub fn write_to<W: Write>(&self, mut writer: W) -> io::Result<()> {
        for command in &self.commands {
            writeln!(writer, "{}", command)?;
        }
        writer.flush()
    }
}

impl fmt::Display for IpSetScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for command in &self.commands {
            writeln!(f, "{}", command)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_size() {
        let sizes: Vec<usize> = [1, 2, 3, 4, 5, 64, 65].iter().map(|&n| hash_size(n)).collect();
        assert_eq!(sizes, vec![1, 2, 4, 4, 8, 64, 128]);
        assert_eq!(hash_size(0), 1);
    }

    #[test]
    fn test_set_names() {
        let name = SetName::new("north-america", IpFamily::V4);
        assert_eq!(name.to_string(), "north-america");
        assert_eq!(name.temporary().to_string(), "north-america-new");

        let v6 = SetName::new("US", IpFamily::V6).temporary();
        assert_eq!(v6.to_string(), "US-ipv6-new");
        assert_eq!(v6.live().to_string(), "US-ipv6");
        assert!(v6.is_temporary());
        assert_eq!(v6.base(), "US");
    }

    #[test]
    fn test_command_rendering() {
        let name = SetName::new("europe", IpFamily::V6);
        let create = IpSetCommand::Create {
            name: name.clone(),
            family: IpFamily::V6,
            hash_size: 4,
        };
        assert_eq!(
            create.to_string(),
            "create europe-ipv6 hash:net family inet6 hashsize 4 maxelem 65536"
        );

        let add = IpSetCommand::Add {
            name: name.clone(),
            net: "2a00::/12".parse().unwrap(),
        };
        assert_eq!(add.to_string(), "add europe-ipv6 2a00::/12");
        assert_eq!(
            IpSetCommand::Destroy { name }.to_string(),
            "destroy europe-ipv6"
        );
    }

    #[test]
    fn test_script_set_and_replace() {
        let name = SetName::new("DE", IpFamily::V4).temporary();
        let nets: Vec<IpNet> = vec!["5.6.0.0/16".parse().unwrap(), "9.9.9.0/24".parse().unwrap()];

        let mut script = IpSetScript::new();
        script.push_set(&name, IpFamily::V4, &nets);
        script.push_replace(&name);

        assert_eq!(
            script.to_string(),
            "create DE-new hash:net family inet hashsize 2 maxelem 65536\n\
             add DE-new 5.6.0.0/16\n\
             add DE-new 9.9.9.0/24\n\
             swap DE DE-new\n\
             destroy DE-new\n"
        );
        assert_eq!(script.len(), 5);
    }

    #[test]
    fn test_write_to() {
        let mut script = IpSetScript::new();
        script.push(IpSetCommand::Destroy {
            name: SetName::new("asia", IpFamily::V4),
        });

        let mut out = Vec::new();
        script.write_to(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "destroy asia\n");
    }
}
