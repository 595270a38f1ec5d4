//! Restore planning
//!
//! The planner decides what a restore would do with one snapshot record. It
//! never touches the store: callers pass in whether the record already exists
//! by id, which is what lets preview and real execution share it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How to treat snapshot records whose id already exists in the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictStrategy {
    /// Leave the existing record untouched
    #[default]
    Skip,
    /// Replace the existing record's fields with the snapshot's
    Overwrite,
}

impl fmt::Display for ConflictStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictStrategy::Skip => write!(f, "skip"),
            ConflictStrategy::Overwrite => write!(f, "overwrite"),
        }
    }
}

impl FromStr for ConflictStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "skip" => Ok(ConflictStrategy::Skip),
            "overwrite" => Ok(ConflictStrategy::Overwrite),
            other => Err(format!(
                "unknown conflict strategy '{}' (expected skip or overwrite)",
                other
            )),
        }
    }
}

/// What a restore does with one record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Create,
    Update,
    Skip,
}

/// Decide the operation for a record given whether its id already exists
pub fn plan(exists: bool, strategy: ConflictStrategy) -> Decision {
    match (exists, strategy) {
        (false, _) => Decision::Create,
        (true, ConflictStrategy::Overwrite) => Decision::Update,
        (true, ConflictStrategy::Skip) => Decision::Skip,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_records_are_always_created() {
        assert_eq!(plan(false, ConflictStrategy::Skip), Decision::Create);
        assert_eq!(plan(false, ConflictStrategy::Overwrite), Decision::Create);
    }

    #[test]
    fn test_existing_records_follow_strategy() {
        assert_eq!(plan(true, ConflictStrategy::Skip), Decision::Skip);
        assert_eq!(plan(true, ConflictStrategy::Overwrite), Decision::Update);
    }

    #[test]
    fn test_strategy_parsing() {
        assert_eq!("skip".parse::<ConflictStrategy>().unwrap(), ConflictStrategy::Skip);
        assert_eq!(
            "Overwrite".parse::<ConflictStrategy>().unwrap(),
            ConflictStrategy::Overwrite
        );
        assert!("merge".parse::<ConflictStrategy>().is_err());
    }

    #[test]
    fn test_strategy_serde() {
        let json = serde_json::to_string(&ConflictStrategy::Overwrite).unwrap();
        assert_eq!(json, "\"overwrite\"");
        assert_eq!(ConflictStrategy::default(), ConflictStrategy::Skip);
    }
}
