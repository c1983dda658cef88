pub mod domain;
pub mod form;
pub mod ports;
pub mod progress;
pub mod session;

pub use domain::{
    DailyMeals, DayPlan, DietaryRestriction, FitnessLevel, Goal, Macros, Meal, PlanContent,
    Provenance, QuestionnaireAnswers, SavedPlan, Screen, Tab, Workout, WorkoutsPerWeek,
};
pub use form::{FieldError, FormField, QuestionnaireDraft, ValidationErrors};
pub use ports::{PlanGenerator, PortError, PortResult};
pub use progress::{LoadingProgress, TickOutcome};
pub use session::{PlanAffordance, PlanSource, ProfileSummary, SessionController};
