//! Sample guidance inserted by `seed`.

use smartgym::guidance::{Macros, Meal, NewNutritionPlan, TrainingLevel};

type LoadTable = [(TrainingLevel, f64, &'static str); 3];

/// Recommended load and rep range per level for a seeded machine code.
pub fn recommended_loads(qr_code: &str) -> Option<LoadTable> {
    use TrainingLevel::*;
    let table = match qr_code {
        "QR-PRESS-01" => [
            (Beginner, 25.0, "12-15"),
            (Intermediate, 45.0, "10-12"),
            (Advanced, 65.0, "8-10"),
        ],
        "QR-ROW-02" => [
            (Beginner, 30.0, "12-15"),
            (Intermediate, 50.0, "10-12"),
            (Advanced, 70.0, "8-10"),
        ],
        "QR-LEG-03" => [
            (Beginner, 40.0, "12-15"),
            (Intermediate, 80.0, "10-12"),
            (Advanced, 120.0, "8-10"),
        ],
        _ => return None,
    };
    Some(table)
}

fn meal(time: &str, items: &[&str], calories: &str) -> Meal {
    Meal {
        time: time.to_string(),
        items: items.iter().map(|i| i.to_string()).collect(),
        calories: calories.to_string(),
    }
}

pub fn nutrition_plans(qr_code: &str) -> Vec<NewNutritionPlan> {
    if qr_code != "QR-LEG-03" {
        return Vec::new();
    }
    vec![NewNutritionPlan {
        level: TrainingLevel::Beginner,
        title: "Beginner Leg Press Nutrition Plan".to_string(),
        description: "Balanced nutrition to build foundational strength and support recovery."
            .to_string(),
        calories: "2,200-2,500".to_string(),
        macros: Macros {
            protein: "150-180g (25-30%)".to_string(),
            carbs: "250-300g (45-50%)".to_string(),
            fats: "70-90g (25-30%)".to_string(),
        },
        meals: vec![
            meal(
                "Breakfast",
                &["Oatmeal with banana and peanut butter", "Greek yogurt with berries"],
                "~500",
            ),
            meal(
                "Pre-workout Snack",
                &["Apple with almond butter", "Protein shake"],
                "~250",
            ),
            meal(
                "Post-workout Meal",
                &["Grilled chicken breast", "Brown rice", "Broccoli and sweet potato"],
                "~600",
            ),
            meal(
                "Lunch",
                &["Turkey sandwich on whole grain bread", "Mixed greens salad"],
                "~500",
            ),
            meal(
                "Dinner",
                &["Baked salmon", "Quinoa", "Steamed vegetables"],
                "~550",
            ),
        ],
        tips: vec![
            "Stay hydrated - aim for 3-4 liters of water daily".to_string(),
            "Include protein in every meal to support muscle repair".to_string(),
            "Focus on complex carbs for sustained energy".to_string(),
        ],
    }]
}
