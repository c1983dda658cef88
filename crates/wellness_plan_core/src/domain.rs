//! crates/wellness_plan_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any transport or serialization format.

use chrono::{DateTime, Utc, Weekday};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

//=========================================================================================
// Navigation
//=========================================================================================

/// The top-level view currently presented to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    Home,
    Form,
    Loading,
    Plan,
    Profile,
}

impl Screen {
    pub const ALL: [Screen; 5] = [
        Screen::Home,
        Screen::Form,
        Screen::Loading,
        Screen::Plan,
        Screen::Profile,
    ];

    /// The bottom navigation is only drawn on the two tab roots.
    pub fn shows_navigation(self) -> bool {
        matches!(self, Screen::Home | Screen::Profile)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Screen::Home => "home",
            Screen::Form => "form",
            Screen::Loading => "loading",
            Screen::Plan => "plan",
            Screen::Profile => "profile",
        }
    }
}

/// The highlighted entry in the bottom navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tab {
    Home,
    Profile,
}

impl Tab {
    pub fn as_str(self) -> &'static str {
        match self {
            Tab::Home => "home",
            Tab::Profile => "profile",
        }
    }
}

impl FromStr for Tab {
    type Err = ParseCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "home" => Ok(Tab::Home),
            "profile" => Ok(Tab::Profile),
            other => Err(ParseCodeError::new("tab", other)),
        }
    }
}

/// How the Plan screen was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Provenance {
    /// Fresh generation or a quick view from the home screen.
    #[default]
    New,
    /// Selected from the saved-plan list in the profile.
    Profile,
}

impl Provenance {
    pub fn as_str(self) -> &'static str {
        match self {
            Provenance::New => "new",
            Provenance::Profile => "profile",
        }
    }
}

//=========================================================================================
// Questionnaire Vocabulary
//=========================================================================================

/// Returned when a wire code does not name any variant of a closed enum.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{code}'")]
pub struct ParseCodeError {
    kind: &'static str,
    code: String,
}

impl ParseCodeError {
    fn new(kind: &'static str, code: &str) -> Self {
        Self {
            kind,
            code: code.to_string(),
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }
}

/// Generates the code/label plumbing shared by the questionnaire enums.
macro_rules! coded_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($variant:ident => ($code:literal, $label:literal)),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Stable code used by the rendering layer.
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $code),+
                }
            }

            /// Human readable label.
            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl FromStr for $name {
            type Err = ParseCodeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($code => Ok($name::$variant),)+
                    other => Err(ParseCodeError::new($kind, other)),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

coded_enum! {
    /// What the user wants the plan to achieve.
    Goal, "goal" {
        WeightLoss => ("weight-loss", "Weight Loss"),
        MuscleGain => ("muscle-gain", "Muscle Gain"),
        Maintenance => ("maintenance", "Maintenance"),
        Endurance => ("endurance", "Endurance"),
    }
}

coded_enum! {
    FitnessLevel, "fitness level" {
        Beginner => ("beginner", "Beginner"),
        Intermediate => ("intermediate", "Intermediate"),
        Advanced => ("advanced", "Advanced"),
    }
}

coded_enum! {
    DietaryRestriction, "dietary restriction" {
        Vegetarian => ("vegetarian", "Vegetarian"),
        Vegan => ("vegan", "Vegan"),
        LactoseFree => ("lactose-free", "Lactose-free"),
        GlutenFree => ("gluten-free", "Gluten-free"),
        Keto => ("keto", "Keto"),
        LowCarb => ("low-carb", "Low-carb"),
    }
}

/// Number of training sessions per week, always within `MIN..=MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WorkoutsPerWeek(u8);

impl WorkoutsPerWeek {
    pub const MIN: u8 = 2;
    pub const MAX: u8 = 6;

    pub fn new(count: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&count).then_some(Self(count))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

/// The validated answers of the plan questionnaire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionnaireAnswers {
    pub goal: Goal,
    pub fitness_level: FitnessLevel,
    pub workouts_per_week: WorkoutsPerWeek,
    pub dietary_restrictions: BTreeSet<DietaryRestriction>,
    pub allergies: Option<String>,
    pub additional_notes: Option<String>,
}

//=========================================================================================
// Saved Plans
//=========================================================================================

/// Daily calorie figure shown for every plan until a real generator exists.
pub const PLACEHOLDER_DAILY_CALORIES: u32 = 1800;

/// A summary record of a generated plan kept in the user's profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedPlan {
    pub id: Uuid,
    pub name: String,
    pub goal: String,
    pub created_at: DateTime<Utc>,
    pub workouts_count: u8,
    pub total_calories: u32,
    pub is_completed: bool,
    /// The answers the plan was generated from.
    pub answers: QuestionnaireAnswers,
}

impl SavedPlan {
    /// Builds the record for the `ordinal`-th plan in the profile.
    pub fn from_answers(answers: &QuestionnaireAnswers, ordinal: usize, now: DateTime<Utc>) -> Self {
        let goal = answers.goal.label().to_string();
        Self {
            id: Uuid::new_v4(),
            name: format!("{goal} Plan #{ordinal}"),
            goal,
            created_at: now,
            workouts_count: answers.workouts_per_week.get(),
            total_calories: PLACEHOLDER_DAILY_CALORIES,
            is_completed: false,
            answers: answers.clone(),
        }
    }

    /// Creation date as day and month name, e.g. `10 August`.
    pub fn created_at_label(&self) -> String {
        self.created_at.format("%-d %B").to_string()
    }
}

//=========================================================================================
// Plan Content
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Macros {
    pub protein_g: u32,
    pub carbs_g: u32,
    pub fat_g: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workout {
    pub kind: String,
    pub duration_minutes: u32,
    pub exercises: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Meal {
    pub name: String,
    pub calories: u32,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DailyMeals {
    pub breakfast: Option<Meal>,
    pub lunch: Option<Meal>,
    pub dinner: Option<Meal>,
    pub snacks: Vec<Meal>,
}

impl DailyMeals {
    pub fn total_calories(&self) -> u32 {
        [&self.breakfast, &self.lunch, &self.dinner]
            .into_iter()
            .flatten()
            .chain(self.snacks.iter())
            .map(|meal| meal.calories)
            .sum()
    }
}

/// One day of the weekly plan. A day without a workout is a rest day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayPlan {
    pub day: Weekday,
    pub workout: Option<Workout>,
    pub meals: DailyMeals,
}

/// The full weekly plan handed to the rendering layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanContent {
    pub goal: String,
    pub daily_calories: u32,
    pub macros: Macros,
    pub workouts_count: u8,
    pub days: Vec<DayPlan>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn goal_codes_round_trip_through_from_str() {
        for goal in Goal::ALL {
            assert_eq!(goal.as_str().parse::<Goal>(), Ok(*goal));
        }
        let err = "yoga".parse::<Goal>().unwrap_err();
        assert_eq!(err.code(), "yoga");
    }

    #[test]
    fn workouts_per_week_rejects_out_of_range() {
        assert!(WorkoutsPerWeek::new(1).is_none());
        assert!(WorkoutsPerWeek::new(7).is_none());
        assert_eq!(WorkoutsPerWeek::new(2).map(WorkoutsPerWeek::get), Some(2));
        assert_eq!(WorkoutsPerWeek::new(6).map(WorkoutsPerWeek::get), Some(6));
    }

    #[test]
    fn navigation_shows_only_on_tab_roots() {
        let visible: Vec<Screen> = Screen::ALL
            .into_iter()
            .filter(|s| s.shows_navigation())
            .collect();
        assert_eq!(visible, vec![Screen::Home, Screen::Profile]);
    }

    #[test]
    fn saved_plan_takes_labels_from_answers() {
        let answers = QuestionnaireAnswers {
            goal: Goal::MuscleGain,
            fitness_level: FitnessLevel::Advanced,
            workouts_per_week: WorkoutsPerWeek::new(4).unwrap(),
            dietary_restrictions: BTreeSet::new(),
            allergies: None,
            additional_notes: None,
        };
        let now = DateTime::parse_from_rfc3339("2024-08-10T09:30:00Z")
            .unwrap()
            .with_timezone(&Utc);

        let plan = SavedPlan::from_answers(&answers, 3, now);

        assert_eq!(plan.name, "Muscle Gain Plan #3");
        assert_eq!(plan.goal, "Muscle Gain");
        assert_eq!(plan.workouts_count, 4);
        assert_eq!(plan.total_calories, PLACEHOLDER_DAILY_CALORIES);
        assert!(!plan.is_completed);
        assert_eq!(plan.created_at_label(), "10 August");
    }

    #[test]
    fn daily_meal_calories_include_snacks() {
        let meal = |calories| Meal {
            name: "m".to_string(),
            calories,
            description: None,
        };
        let meals = DailyMeals {
            breakfast: Some(meal(320)),
            lunch: Some(meal(450)),
            dinner: None,
            snacks: vec![meal(120), meal(150)],
        };
        assert_eq!(meals.total_calories(), 1040);
    }
}
