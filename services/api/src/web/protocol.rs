//! services/api/src/web/protocol.rs
//!
//! Defines the WebSocket message protocol between the rendering client and the
//! API server. The client reports gestures; the server answers with the state the
//! client should draw.

use chrono::Weekday;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use wellness_plan_core::{
    domain::{
        DailyMeals, DayPlan, DietaryRestriction, Meal, PlanContent, QuestionnaireAnswers,
        SavedPlan, Tab, Workout,
    },
    form::{QuestionnaireDraft, ValidationErrors},
    progress::STAGE_CAPTIONS,
    session::{PlanAffordance, ProfileSummary, SessionController},
};

//=========================================================================================
// Messages Sent FROM the Client TO the Server
//=========================================================================================

/// Represents the structured text messages a client can send to the server.
#[derive(Deserialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Attaches the connection to a session. This must be the first message sent.
    Init { session_id: Uuid },

    /// A bottom-navigation button was pressed.
    SelectTab { tab: TabCode },

    /// "Create plan" from the home screen or the navigation bar.
    StartPlanCreation,

    /// The questionnaire was submitted.
    SubmitForm { answers: QuestionnaireForm },

    /// "View saved plan" on the home screen.
    QuickViewSavedPlan,

    /// A plan was selected in the profile list.
    OpenSavedPlan { plan_id: Uuid },

    SavePlan,

    /// "PDF" on the plan screen. Only acknowledged with a toast.
    DownloadPlan,

    DeletePlan { plan_id: Uuid },

    /// "Create new plan" on the plan screen.
    CreateNewPlan,

    BackToHome,

    BackToProfile,

    /// "View all plans in profile" on a freshly generated plan.
    ViewProfile,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TabCode {
    Home,
    Profile,
}

impl From<TabCode> for Tab {
    fn from(code: TabCode) -> Self {
        match code {
            TabCode::Home => Tab::Home,
            TabCode::Profile => Tab::Profile,
        }
    }
}

/// The questionnaire as the client form holds it. Unanswered fields are empty strings.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "camelCase", default)]
pub struct QuestionnaireForm {
    pub goal: String,
    pub fitness_level: String,
    pub workouts_per_week: String,
    pub dietary_restrictions: Vec<String>,
    pub allergies: String,
    pub additional_notes: String,
}

impl TryFrom<QuestionnaireForm> for QuestionnaireDraft {
    type Error = String;

    /// Dietary tags come from fixed checkboxes, so an unknown tag is a protocol
    /// error rather than a field error.
    fn try_from(form: QuestionnaireForm) -> Result<Self, Self::Error> {
        let dietary_restrictions = form
            .dietary_restrictions
            .iter()
            .map(|code| code.parse::<DietaryRestriction>().map_err(|e| e.to_string()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(QuestionnaireDraft {
            goal: form.goal,
            fitness_level: form.fitness_level,
            workouts_per_week: form.workouts_per_week,
            dietary_restrictions,
            allergies: form.allergies,
            additional_notes: form.additional_notes,
        })
    }
}

//=========================================================================================
// Messages Sent FROM the Server TO the Client
//=========================================================================================

/// Represents the structured text messages the server can send to the client.
#[derive(Serialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Confirms the connection is attached to a session.
    SessionInitialized { session_id: Uuid },

    /// Everything the client needs to draw the current screen.
    State { view: SessionView },

    /// The questionnaire was rejected; the client stays on the form.
    ValidationFailed { errors: Vec<FieldErrorView> },

    /// One tick of the loading screen.
    LoadingProgress {
        progress: u8,
        stage: usize,
        caption: String,
    },

    /// The weekly plan to show on the plan screen.
    PlanContent { content: PlanContentView },

    /// A short confirmation shown as a toast.
    Toast { message: String },

    /// Reports an error to the client, which should display an error message.
    Error { message: String },
}

impl ServerMessage {
    pub fn loading_progress(progress: u8, stage: usize) -> Self {
        ServerMessage::LoadingProgress {
            progress,
            stage,
            caption: STAGE_CAPTIONS[stage.min(STAGE_CAPTIONS.len() - 1)].to_string(),
        }
    }

    pub fn toast(message: impl Into<String>) -> Self {
        ServerMessage::Toast {
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error {
            message: message.into(),
        }
    }
}

//=========================================================================================
// Views
//=========================================================================================

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    pub screen: String,
    pub tab: String,
    pub nav_visible: bool,
    pub provenance: String,
    pub plan_affordance: String,
    pub has_saved_plans: bool,
    pub answers: Option<AnswersView>,
    pub saved_plans: Vec<SavedPlanView>,
    pub profile: ProfileSummaryView,
}

impl From<&SessionController> for SessionView {
    fn from(session: &SessionController) -> Self {
        let plan_affordance = match session.plan_affordance() {
            PlanAffordance::BackToProfile => "back_to_profile",
            PlanAffordance::ViewAllInProfile => "view_all_in_profile",
        };
        Self {
            screen: session.screen().as_str().to_string(),
            tab: session.tab().as_str().to_string(),
            nav_visible: session.nav_visible(),
            provenance: session.provenance().as_str().to_string(),
            plan_affordance: plan_affordance.to_string(),
            has_saved_plans: session.has_saved_plans(),
            answers: session.answers().map(AnswersView::from),
            saved_plans: session.saved_plans().iter().map(SavedPlanView::from).collect(),
            profile: session.profile_summary().into(),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AnswersView {
    pub goal: String,
    pub fitness_level: String,
    pub workouts_per_week: u8,
    pub dietary_restrictions: Vec<String>,
    pub allergies: Option<String>,
    pub additional_notes: Option<String>,
}

impl From<&QuestionnaireAnswers> for AnswersView {
    fn from(answers: &QuestionnaireAnswers) -> Self {
        Self {
            goal: answers.goal.as_str().to_string(),
            fitness_level: answers.fitness_level.as_str().to_string(),
            workouts_per_week: answers.workouts_per_week.get(),
            dietary_restrictions: answers
                .dietary_restrictions
                .iter()
                .map(|d| d.as_str().to_string())
                .collect(),
            allergies: answers.allergies.clone(),
            additional_notes: answers.additional_notes.clone(),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SavedPlanView {
    pub id: Uuid,
    pub name: String,
    pub goal: String,
    pub created_at: String,
    pub workouts_count: u8,
    pub total_calories: u32,
    pub is_completed: bool,
}

impl From<&SavedPlan> for SavedPlanView {
    fn from(plan: &SavedPlan) -> Self {
        Self {
            id: plan.id,
            name: plan.name.clone(),
            goal: plan.goal.clone(),
            created_at: plan.created_at_label(),
            workouts_count: plan.workouts_count,
            total_calories: plan.total_calories,
            is_completed: plan.is_completed,
        }
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileSummaryView {
    pub total_plans: usize,
    pub completed_plans: usize,
    pub completion_percent: u8,
}

impl From<ProfileSummary> for ProfileSummaryView {
    fn from(summary: ProfileSummary) -> Self {
        Self {
            total_plans: summary.total_plans,
            completed_plans: summary.completed_plans,
            completion_percent: summary.completion_percent,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct FieldErrorView {
    pub field: String,
    pub message: String,
}

impl FieldErrorView {
    pub fn from_errors(errors: &ValidationErrors) -> Vec<Self> {
        errors
            .messages()
            .map(|(field, message)| FieldErrorView {
                field: field.as_str().to_string(),
                message,
            })
            .collect()
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct PlanContentView {
    pub goal: String,
    pub daily_calories: u32,
    pub macros: MacrosView,
    pub workouts_count: u8,
    pub days: Vec<DayPlanView>,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacrosView {
    pub protein_g: u32,
    pub carbs_g: u32,
    pub fat_g: u32,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct DayPlanView {
    pub day: String,
    pub rest_day: bool,
    pub workout: Option<WorkoutView>,
    pub meals: MealsView,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct WorkoutView {
    pub kind: String,
    pub duration_minutes: u32,
    pub exercises: Vec<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct MealsView {
    pub breakfast: Option<MealView>,
    pub lunch: Option<MealView>,
    pub dinner: Option<MealView>,
    pub snacks: Vec<MealView>,
    pub total_calories: u32,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct MealView {
    pub name: String,
    pub calories: u32,
    pub description: Option<String>,
}

impl From<&PlanContent> for PlanContentView {
    fn from(content: &PlanContent) -> Self {
        Self {
            goal: content.goal.clone(),
            daily_calories: content.daily_calories,
            macros: MacrosView {
                protein_g: content.macros.protein_g,
                carbs_g: content.macros.carbs_g,
                fat_g: content.macros.fat_g,
            },
            workouts_count: content.workouts_count,
            days: content.days.iter().map(DayPlanView::from).collect(),
        }
    }
}

impl From<&DayPlan> for DayPlanView {
    fn from(day: &DayPlan) -> Self {
        Self {
            day: weekday_name(day.day).to_string(),
            rest_day: day.workout.is_none(),
            workout: day.workout.as_ref().map(WorkoutView::from),
            meals: MealsView::from(&day.meals),
        }
    }
}

impl From<&Workout> for WorkoutView {
    fn from(workout: &Workout) -> Self {
        Self {
            kind: workout.kind.clone(),
            duration_minutes: workout.duration_minutes,
            exercises: workout.exercises.clone(),
        }
    }
}

impl From<&DailyMeals> for MealsView {
    fn from(meals: &DailyMeals) -> Self {
        Self {
            breakfast: meals.breakfast.as_ref().map(MealView::from),
            lunch: meals.lunch.as_ref().map(MealView::from),
            dinner: meals.dinner.as_ref().map(MealView::from),
            snacks: meals.snacks.iter().map(MealView::from).collect(),
            total_calories: meals.total_calories(),
        }
    }
}

impl From<&Meal> for MealView {
    fn from(meal: &Meal) -> Self {
        Self {
            name: meal.name.clone(),
            calories: meal.calories,
            description: meal.description.clone(),
        }
    }
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
