//! crates/wellness_plan_core/src/form.rs
//!
//! The raw questionnaire as filled in by the user, and its validation into
//! `QuestionnaireAnswers`. Validation failures are attached to individual
//! fields rather than raised as a single error.

use crate::domain::{
    DietaryRestriction, FitnessLevel, Goal, QuestionnaireAnswers, WorkoutsPerWeek,
};
use std::collections::BTreeMap;
use std::fmt;

/// The required questionnaire fields that can fail validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FormField {
    Goal,
    FitnessLevel,
    WorkoutsPerWeek,
}

impl FormField {
    /// The field name the rendering layer uses.
    pub fn as_str(self) -> &'static str {
        match self {
            FormField::Goal => "goal",
            FormField::FitnessLevel => "fitnessLevel",
            FormField::WorkoutsPerWeek => "workoutsPerWeek",
        }
    }

    fn missing_message(self) -> &'static str {
        match self {
            FormField::Goal => "Select a goal",
            FormField::FitnessLevel => "Select a fitness level",
            FormField::WorkoutsPerWeek => "Select the number of workouts",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    Missing,
    Invalid(String),
}

impl FieldError {
    pub fn message(&self, field: FormField) -> String {
        match self {
            FieldError::Missing => field.missing_message().to_string(),
            FieldError::Invalid(reason) => reason.clone(),
        }
    }
}

/// Field-level errors from a rejected submission. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("questionnaire has {} invalid field(s)", .errors.len())]
pub struct ValidationErrors {
    errors: BTreeMap<FormField, FieldError>,
}

impl ValidationErrors {
    pub fn get(&self, field: FormField) -> Option<&FieldError> {
        self.errors.get(&field)
    }

    pub fn fields(&self) -> impl Iterator<Item = FormField> + '_ {
        self.errors.keys().copied()
    }

    /// `(field, message)` pairs in field order.
    pub fn messages(&self) -> impl Iterator<Item = (FormField, String)> + '_ {
        self.errors
            .iter()
            .map(|(field, error)| (*field, error.message(*field)))
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The questionnaire exactly as the form holds it. Empty strings mean "not answered".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionnaireDraft {
    pub goal: String,
    pub fitness_level: String,
    pub workouts_per_week: String,
    pub dietary_restrictions: Vec<DietaryRestriction>,
    pub allergies: String,
    pub additional_notes: String,
}

impl QuestionnaireDraft {
    /// Checks every required field independently and builds the answers
    /// when all of them are present and well-formed.
    pub fn validate(&self) -> Result<QuestionnaireAnswers, ValidationErrors> {
        let mut errors = BTreeMap::new();

        let goal = required(&self.goal, FormField::Goal, &mut errors, |v| {
            v.parse::<Goal>().map_err(|e| format!("Unknown value '{}'", e.code()))
        });
        let fitness_level =
            required(&self.fitness_level, FormField::FitnessLevel, &mut errors, |v| {
                v.parse::<FitnessLevel>()
                    .map_err(|e| format!("Unknown value '{}'", e.code()))
            });
        let workouts_per_week = required(
            &self.workouts_per_week,
            FormField::WorkoutsPerWeek,
            &mut errors,
            parse_workouts,
        );

        match (goal, fitness_level, workouts_per_week) {
            (Some(goal), Some(fitness_level), Some(workouts_per_week)) => {
                Ok(QuestionnaireAnswers {
                    goal,
                    fitness_level,
                    workouts_per_week,
                    dietary_restrictions: self.dietary_restrictions.iter().copied().collect(),
                    allergies: optional_text(&self.allergies),
                    additional_notes: optional_text(&self.additional_notes),
                })
            }
            _ => Err(ValidationErrors { errors }),
        }
    }
}

fn required<T>(
    raw: &str,
    field: FormField,
    errors: &mut BTreeMap<FormField, FieldError>,
    parse: impl FnOnce(&str) -> Result<T, String>,
) -> Option<T> {
    let value = raw.trim();
    if value.is_empty() {
        errors.insert(field, FieldError::Missing);
        return None;
    }
    match parse(value) {
        Ok(parsed) => Some(parsed),
        Err(reason) => {
            errors.insert(field, FieldError::Invalid(reason));
            None
        }
    }
}

fn parse_workouts(value: &str) -> Result<WorkoutsPerWeek, String> {
    let out_of_range = || {
        format!(
            "Choose between {} and {} workouts",
            WorkoutsPerWeek::MIN,
            WorkoutsPerWeek::MAX
        )
    };
    value
        .parse::<u8>()
        .ok()
        .and_then(WorkoutsPerWeek::new)
        .ok_or_else(out_of_range)
}

fn optional_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
