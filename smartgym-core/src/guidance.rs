//! Per-level guidance shown on a machine's page: the recommended load and
//! rep range, and a nutrition plan.

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::db::models::{NutritionMealRow, NutritionPlanRow, RecommendationRow};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrainingLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl TrainingLevel {
    pub const ALL: [TrainingLevel; 3] = [
        TrainingLevel::Beginner,
        TrainingLevel::Intermediate,
        TrainingLevel::Advanced,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TrainingLevel::Beginner => "beginner",
            TrainingLevel::Intermediate => "intermediate",
            TrainingLevel::Advanced => "advanced",
        }
    }

    /// Capitalized name for level selectors.
    pub fn label(&self) -> &'static str {
        match self {
            TrainingLevel::Beginner => "Beginner",
            TrainingLevel::Intermediate => "Intermediate",
            TrainingLevel::Advanced => "Advanced",
        }
    }
}

impl FromStr for TrainingLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "beginner" => Ok(TrainingLevel::Beginner),
            "intermediate" => Ok(TrainingLevel::Intermediate),
            "advanced" => Ok(TrainingLevel::Advanced),
            _ => Err(anyhow!("Invalid training level: {}", s)),
        }
    }
}

impl fmt::Display for TrainingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Suggested working load for one machine at one level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub machine_id: i64,
    pub level: TrainingLevel,
    pub weight_kg: f64,
    /// Rep range as displayed, e.g. `"12-15"`.
    pub reps: String,
}

impl TryFrom<RecommendationRow> for Recommendation {
    type Error = anyhow::Error;

    fn try_from(row: RecommendationRow) -> Result<Self> {
        Ok(Recommendation {
            machine_id: row.machine_id,
            level: row.level.parse()?,
            weight_kg: row.weight_kg,
            reps: row.reps,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Macros {
    pub protein: String,
    pub carbs: String,
    pub fats: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meal {
    pub time: String,
    pub items: Vec<String>,
    pub calories: String,
}

/// Plan content as authored, before it has an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewNutritionPlan {
    pub level: TrainingLevel,
    pub title: String,
    pub description: String,
    pub calories: String,
    pub macros: Macros,
    pub meals: Vec<Meal>,
    pub tips: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionPlan {
    pub id: i64,
    pub machine_id: i64,
    pub level: TrainingLevel,
    pub title: String,
    pub description: String,
    pub calories: String,
    pub macros: Macros,
    pub meals: Vec<Meal>,
    pub tips: Vec<String>,
}

impl NutritionPlan {
    /// Assembles a plan from its row and its meal rows, meals in stored order.
    pub fn from_rows(plan: NutritionPlanRow, mut meals: Vec<NutritionMealRow>) -> Result<Self> {
        meals.sort_by_key(|m| m.position);
        let meals = meals
            .into_iter()
            .map(|m| {
                let items: Vec<String> = serde_json::from_str(&m.items)
                    .with_context(|| format!("Malformed items for meal {}", m.id))?;
                Ok(Meal {
                    time: m.time_label,
                    items,
                    calories: m.calories,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let tips: Vec<String> = serde_json::from_str(&plan.tips)
            .with_context(|| format!("Malformed tips for nutrition plan {}", plan.id))?;

        Ok(NutritionPlan {
            id: plan.id,
            machine_id: plan.machine_id,
            level: plan.level.parse()?,
            title: plan.title,
            description: plan.description,
            calories: plan.calories,
            macros: Macros {
                protein: plan.protein,
                carbs: plan.carbs,
                fats: plan.fats,
            },
            meals,
            tips,
        })
    }
}
