// Core draft vocabulary: sides, roles, actions, turn records.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The five positions a team fills during the pick phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Top,
    Jungle,
    Mid,
    Adc,
    Support,
}

impl Role {
    /// All roles in display order.
    pub const ALL: [Role; 5] = [
        Role::Top,
        Role::Jungle,
        Role::Mid,
        Role::Adc,
        Role::Support,
    ];

    /// Number of roles per team.
    pub const COUNT: usize = 5;

    /// Stable slot index used by `TeamComposition`.
    pub fn index(self) -> usize {
        match self {
            Role::Top => 0,
            Role::Jungle => 1,
            Role::Mid => 2,
            Role::Adc => 3,
            Role::Support => 4,
        }
    }

    /// Parse a role string.
    ///
    /// Accepts the canonical lowercase names plus common aliases:
    /// - "jg" -> Jungle
    /// - "middle" -> Mid
    /// - "bot", "bottom" -> Adc
    /// - "sup", "supp" -> Support
    pub fn from_str_role(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "top" => Some(Role::Top),
            "jungle" | "jg" => Some(Role::Jungle),
            "mid" | "middle" => Some(Role::Mid),
            "adc" | "bot" | "bottom" => Some(Role::Adc),
            "support" | "sup" | "supp" => Some(Role::Support),
            _ => None,
        }
    }

    /// Return the display string for this role.
    pub fn display_str(&self) -> &'static str {
        match self {
            Role::Top => "top",
            Role::Jungle => "jungle",
            Role::Mid => "mid",
            Role::Adc => "adc",
            Role::Support => "support",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_str())
    }
}

/// Which team a turn or slot belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Blue,
    Red,
}

impl Side {
    /// The other side.
    pub fn opponent(self) -> Side {
        match self {
            Side::Blue => Side::Red,
            Side::Red => Side::Blue,
        }
    }

    /// Parse a side string ("blue" or "red", case-insensitive).
    pub fn from_str_side(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "blue" => Some(Side::Blue),
            "red" => Some(Side::Red),
            _ => None,
        }
    }

    pub fn display_str(&self) -> &'static str {
        match self {
            Side::Blue => "blue",
            Side::Red => "red",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_str())
    }
}

/// What a turn asks the acting side to do. Picks are tied to a role;
/// bans are not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Ban,
    Pick(Role),
}

impl Action {
    /// The wire-level action kind ("ban" or "pick").
    pub fn kind_str(&self) -> &'static str {
        match self {
            Action::Ban => "ban",
            Action::Pick(_) => "pick",
        }
    }

    /// The role a pick targets; `None` for bans.
    pub fn role(&self) -> Option<Role> {
        match self {
            Action::Ban => None,
            Action::Pick(role) => Some(*role),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Ban => write!(f, "ban"),
            Action::Pick(role) => write!(f, "pick {}", role),
        }
    }
}

/// A single slot in the draft order. Generated once per draft and never
/// mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub side: Side,
    pub action: Action,
}

/// Ranked-ladder bracket the draft is being simulated for. Forwarded to
/// the recommendation provider; the engine itself never branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EloBracket {
    Iron,
    Bronze,
    Silver,
    Gold,
    Platinum,
    Emerald,
    Diamond,
    Master,
    Grandmaster,
    Challenger,
}

impl EloBracket {
    pub fn display_str(&self) -> &'static str {
        match self {
            EloBracket::Iron => "iron",
            EloBracket::Bronze => "bronze",
            EloBracket::Silver => "silver",
            EloBracket::Gold => "gold",
            EloBracket::Platinum => "platinum",
            EloBracket::Emerald => "emerald",
            EloBracket::Diamond => "diamond",
            EloBracket::Master => "master",
            EloBracket::Grandmaster => "grandmaster",
            EloBracket::Challenger => "challenger",
        }
    }
}

impl fmt::Display for EloBracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_str())
    }
}
