use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Raw action codes with a fixed meaning in `co_block.action`.
pub const INTERACTION_CODE: i64 = 1;
pub const PLACEMENT_CODE: i64 = 2;
pub const REMOVAL_CODE: i64 = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Placement,
    Removal,
    Interaction,
    Unclassified,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActionGroup {
    Placements,
    Removals,
    Interaction,
    Other,
}

impl ActionKind {
    pub const fn label(self) -> &'static str {
        match self {
            ActionKind::Placement => "placement",
            ActionKind::Removal => "removal",
            ActionKind::Interaction => "interaction",
            ActionKind::Unclassified => "unclassified",
        }
    }

    pub const fn group(self) -> ActionGroup {
        match self {
            ActionKind::Placement => ActionGroup::Placements,
            ActionKind::Removal => ActionGroup::Removals,
            ActionKind::Interaction => ActionGroup::Interaction,
            ActionKind::Unclassified => ActionGroup::Other,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

pub const fn classify(code: i64) -> ActionKind {
    match code {
        PLACEMENT_CODE => ActionKind::Placement,
        REMOVAL_CODE => ActionKind::Removal,
        INTERACTION_CODE => ActionKind::Interaction,
        _ => ActionKind::Unclassified,
    }
}

/// Action-class filter accepted on the command line (`-a`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActionFilter {
    Placements,
    Removals,
    BlockChanges,
    /// `b*`: every code except 1, 2 and 3. Interaction is excluded too.
    Other,
}

impl ActionFilter {
    pub const fn token(self) -> &'static str {
        match self {
            ActionFilter::Placements => "b+",
            ActionFilter::Removals => "b-",
            ActionFilter::BlockChanges => "b",
            ActionFilter::Other => "b*",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        token.parse().ok()
    }

    pub fn matches(self, code: i64) -> bool {
        match self {
            ActionFilter::Placements => code == PLACEMENT_CODE,
            ActionFilter::Removals => code == REMOVAL_CODE,
            ActionFilter::BlockChanges => code == PLACEMENT_CODE || code == REMOVAL_CODE,
            ActionFilter::Other => !Self::excluded_from_other().contains(&code),
        }
    }

    /// SQL membership test over `column`. Only classifier constants are
    /// rendered, never operator input.
    pub fn sql_predicate(self, column: &str) -> String {
        let (negated, codes): (bool, &[i64]) = match self {
            ActionFilter::Placements => (false, &[PLACEMENT_CODE][..]),
            ActionFilter::Removals => (false, &[REMOVAL_CODE][..]),
            ActionFilter::BlockChanges => (false, &[PLACEMENT_CODE, REMOVAL_CODE][..]),
            ActionFilter::Other => (true, Self::excluded_from_other()),
        };
        let list = codes
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        if negated {
            format!("{} NOT IN ({})", column, list)
        } else {
            format!("{} IN ({})", column, list)
        }
    }

    const fn excluded_from_other() -> &'static [i64] {
        &[INTERACTION_CODE, PLACEMENT_CODE, REMOVAL_CODE]
    }
}

impl fmt::Display for ActionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

impl FromStr for ActionFilter {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "b+" => Ok(ActionFilter::Placements),
            "b-" => Ok(ActionFilter::Removals),
            "b" => Ok(ActionFilter::BlockChanges),
            "b*" => Ok(ActionFilter::Other),
            _ => Err(()),
        }
    }
}
