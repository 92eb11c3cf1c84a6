//! Port type definitions for redundancy group members.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Slot a port occupies within a redundancy group.
///
/// A group holds at most one port of each type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortType {
    /// The logical redundancy interface presented to the upper stack.
    Master,
    /// First physical ring/LAN attachment.
    SlaveA,
    /// Second physical ring/LAN attachment.
    SlaveB,
    /// Attachment towards a RedBox-connected network.
    Interlink,
}

impl PortType {
    /// All port types, master first.
    pub const ALL: [PortType; 4] = [
        PortType::Master,
        PortType::SlaveA,
        PortType::SlaveB,
        PortType::Interlink,
    ];

    /// Returns the role this port type plays in the group.
    pub const fn role(&self) -> PortRole {
        match self {
            PortType::Master => PortRole::Master,
            _ => PortRole::Slave,
        }
    }

    /// Returns true for the master slot.
    pub const fn is_master(&self) -> bool {
        matches!(self, PortType::Master)
    }
}

impl fmt::Display for PortType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PortType::Master => "master",
            PortType::SlaveA => "slave-a",
            PortType::SlaveB => "slave-b",
            PortType::Interlink => "interlink",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for PortType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "master" => Ok(PortType::Master),
            "slave-a" | "slavea" | "a" => Ok(PortType::SlaveA),
            "slave-b" | "slaveb" | "b" => Ok(PortType::SlaveB),
            "interlink" => Ok(PortType::Interlink),
            _ => Err(ParseError::InvalidPortType(s.to_string())),
        }
    }
}

/// Role of a port: the single logical master or one of its physical slaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortRole {
    Master,
    Slave,
}

impl fmt::Display for PortRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortRole::Master => write!(f, "master"),
            PortRole::Slave => write!(f, "slave"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_port_type_role() {
        assert_eq!(PortType::Master.role(), PortRole::Master);
        assert_eq!(PortType::SlaveA.role(), PortRole::Slave);
        assert_eq!(PortType::SlaveB.role(), PortRole::Slave);
        assert_eq!(PortType::Interlink.role(), PortRole::Slave);
    }

    #[test]
    fn test_port_type_parse() {
        assert_eq!("master".parse::<PortType>().unwrap(), PortType::Master);
        assert_eq!("SLAVE-A".parse::<PortType>().unwrap(), PortType::SlaveA);
        assert_eq!("b".parse::<PortType>().unwrap(), PortType::SlaveB);
        assert!("slave-c".parse::<PortType>().is_err());
    }

    #[test]
    fn test_port_type_display_roundtrip() {
        for ty in PortType::ALL {
            assert_eq!(ty.to_string().parse::<PortType>().unwrap(), ty);
        }
    }
}
