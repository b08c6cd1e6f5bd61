//! Handler outcomes and tier definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Egress port for white-tier traffic.
pub const EGRESS_WHITE: u16 = 0x0302;

/// Egress port for grey-tier traffic.
pub const EGRESS_GREY: u16 = 0x0301;

/// Outcome returned to the host pipeline by a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    /// Hand the packet to the next pipeline stage.
    Forward,
    /// Discard the packet.
    Drop,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Forward => write!(f, "FORWARD"),
            Verdict::Drop => write!(f, "DROP"),
        }
    }
}

/// Classification tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    White,
    Grey,
    Black,
}

impl Tier {
    /// Egress port the classifier writes for this tier.
    /// Black traffic is dropped and never gets one.
    pub fn egress(self) -> Option<u16> {
        match self {
            Tier::White => Some(EGRESS_WHITE),
            Tier::Grey => Some(EGRESS_GREY),
            Tier::Black => None,
        }
    }

    /// Verdict the classifier returns for this tier.
    pub fn verdict(self) -> Verdict {
        match self {
            Tier::White | Tier::Grey => Verdict::Forward,
            Tier::Black => Verdict::Drop,
        }
    }

    /// Name of the exported counter for this tier.
    pub fn counter_name(self) -> &'static str {
        match self {
            Tier::White => "white_flows",
            Tier::Grey => "grey_flows",
            Tier::Black => "black_flows",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::White => write!(f, "white"),
            Tier::Grey => write!(f, "grey"),
            Tier::Black => write!(f, "black"),
        }
    }
}
