//! services/api/src/adapters/static_plan.rs
//!
//! This module contains the stand-in plan generator. It implements the
//! `PlanGenerator` port from the core crate with a fixed sample week, labelled
//! with the goal and workout count the user asked for.

use async_trait::async_trait;
use chrono::Weekday;
use wellness_plan_core::{
    domain::{
        DailyMeals, DayPlan, Macros, Meal, PlanContent, QuestionnaireAnswers, Workout,
        PLACEHOLDER_DAILY_CALORIES,
    },
    ports::{PlanGenerator, PortResult},
};

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A `PlanGenerator` that always returns the same sample week.
#[derive(Clone, Debug, Default)]
pub struct StaticPlanGenerator;

impl StaticPlanGenerator {
    pub fn new() -> Self {
        Self
    }
}

//=========================================================================================
// `PlanGenerator` Trait Implementation
//=========================================================================================

#[async_trait]
impl PlanGenerator for StaticPlanGenerator {
    async fn generate(&self, answers: &QuestionnaireAnswers) -> PortResult<PlanContent> {
        let days = WEEK
            .into_iter()
            .map(|day| DayPlan {
                day,
                workout: sample_workout(day),
                meals: sample_meals(day),
            })
            .collect();

        Ok(PlanContent {
            goal: answers.goal.label().to_string(),
            daily_calories: PLACEHOLDER_DAILY_CALORIES,
            macros: Macros {
                protein_g: 135,
                carbs_g: 180,
                fat_g: 60,
            },
            workouts_count: answers.workouts_per_week.get(),
            days,
        })
    }
}

//=========================================================================================
// Sample Week
//=========================================================================================

fn sample_workout(day: Weekday) -> Option<Workout> {
    let (kind, duration_minutes, exercises): (&str, u32, [&str; 5]) = match day {
        Weekday::Mon => (
            "Cardio + strength",
            45,
            [
                "Warm-up - 5 min",
                "Squats - 3x15",
                "Push-ups - 3x10",
                "Plank - 3x30 sec",
                "Cardio - 20 min",
            ],
        ),
        Weekday::Wed => (
            "Strength training",
            50,
            [
                "Warm-up - 5 min",
                "Bench press - 4x8",
                "Lat pulldown - 4x10",
                "Biceps curls - 3x12",
                "Cool-down - 5 min",
            ],
        ),
        Weekday::Fri => (
            "Functional",
            40,
            [
                "Warm-up - 5 min",
                "Burpees - 3x8",
                "Lunges - 3x12",
                "Crunches - 3x15",
                "Stretching - 10 min",
            ],
        ),
        _ => return None,
    };

    Some(Workout {
        kind: kind.to_string(),
        duration_minutes,
        exercises: exercises.iter().map(|e| e.to_string()).collect(),
    })
}

fn meal(name: &str, calories: u32, description: Option<&str>) -> Meal {
    Meal {
        name: name.to_string(),
        calories,
        description: description.map(str::to_string),
    }
}

// Only Monday carries a worked example; the other days are left open.
fn sample_meals(day: Weekday) -> DailyMeals {
    if day != Weekday::Mon {
        return DailyMeals::default();
    }
    DailyMeals {
        breakfast: Some(meal(
            "Oatmeal with berries",
            320,
            Some("Rolled oats, blueberries, almonds, honey"),
        )),
        lunch: Some(meal(
            "Chicken breast with vegetables",
            450,
            Some("Baked chicken breast, broccoli, quinoa"),
        )),
        dinner: Some(meal(
            "Fish with salad",
            380,
            Some("Steamed salmon, leafy greens, avocado"),
        )),
        snacks: vec![
            meal("Greek yogurt", 120, None),
            meal("Apple with nuts", 150, None),
        ],
    }
}
