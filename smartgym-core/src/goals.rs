use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::db::models::GoalRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalType {
    Strength,
    Endurance,
    Weight,
    Other,
}

impl GoalType {
    pub const ALL: [GoalType; 4] = [
        GoalType::Strength,
        GoalType::Endurance,
        GoalType::Weight,
        GoalType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GoalType::Strength => "strength",
            GoalType::Endurance => "endurance",
            GoalType::Weight => "weight",
            GoalType::Other => "other",
        }
    }
}

impl FromStr for GoalType {
    type Err = anyhow::Error;

    /// Case-insensitive, surrounding whitespace ignored.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "strength" => Ok(GoalType::Strength),
            "endurance" => Ok(GoalType::Endurance),
            "weight" => Ok(GoalType::Weight),
            "other" => Ok(GoalType::Other),
            _ => Err(anyhow!("Invalid goal type: {}", s)),
        }
    }
}

impl fmt::Display for GoalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: i64,
    pub user_id: i64,
    pub goal_type: GoalType,
    pub description: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl TryFrom<GoalRow> for Goal {
    type Error = anyhow::Error;

    fn try_from(row: GoalRow) -> Result<Self> {
        Ok(Goal {
            id: row.id,
            user_id: row.user_id,
            goal_type: row.goal_type.parse()?,
            description: row.description,
            active: row.active,
            created_at: row.created_at,
            completed_at: row.completed_at,
        })
    }
}

/// Goals every new account starts with.
pub fn default_goals() -> Vec<(GoalType, &'static str)> {
    vec![
        (GoalType::Strength, "Build muscular strength"),
        (GoalType::Endurance, "Improve cardiovascular endurance"),
        (GoalType::Weight, "Maintain a healthy weight"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn goal_type_codes_round_trip() {
        for goal_type in GoalType::ALL {
            assert_eq!(goal_type.as_str().parse::<GoalType>().unwrap(), goal_type);
            assert_eq!(goal_type.to_string().parse::<GoalType>().unwrap(), goal_type);
        }
        assert_eq!(" Endurance ".parse::<GoalType>().unwrap(), GoalType::Endurance);
        assert!("flexibility".parse::<GoalType>().is_err());
    }

    #[test]
    fn unknown_stored_type_is_rejected() {
        let row = GoalRow {
            id: 1,
            user_id: 1,
            goal_type: "force".into(),
            description: "old code".into(),
            active: true,
            created_at: Utc::now(),
            completed_at: None,
        };
        assert!(Goal::try_from(row).is_err());
    }
}
