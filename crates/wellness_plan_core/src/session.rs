//! crates/wellness_plan_core/src/session.rs
//!
//! The session controller: the single owner of navigation and session data.
//! Every mutation goes through one of its operations; presentation code only
//! reads the accessors and calls operations in response to gestures.

use crate::domain::{Provenance, QuestionnaireAnswers, SavedPlan, Screen, Tab};
use crate::form::{QuestionnaireDraft, ValidationErrors};
use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

/// Which plan the Plan screen is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlanSource {
    /// The answers currently in flight (or the newest saved plan when there are none).
    #[default]
    Current,
    Saved(Uuid),
}

/// The "back" control the Plan screen offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanAffordance {
    BackToProfile,
    ViewAllInProfile,
}

/// Aggregate figures shown on the profile screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileSummary {
    pub total_plans: usize,
    pub completed_plans: usize,
    pub completion_percent: u8,
}

#[derive(Debug, Clone)]
pub struct SessionController {
    screen: Screen,
    tab: Tab,
    answers: Option<QuestionnaireAnswers>,
    saved_plans: Vec<SavedPlan>,
    provenance: Provenance,
    plan_source: PlanSource,
}

impl Default for SessionController {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionController {
    pub fn new() -> Self {
        Self {
            screen: Screen::Home,
            tab: Tab::Home,
            answers: None,
            saved_plans: Vec::new(),
            provenance: Provenance::New,
            plan_source: PlanSource::Current,
        }
    }

    // --- Accessors ---

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn answers(&self) -> Option<&QuestionnaireAnswers> {
        self.answers.as_ref()
    }

    /// Saved plans, newest first.
    pub fn saved_plans(&self) -> &[SavedPlan] {
        &self.saved_plans
    }

    pub fn saved_plan(&self, id: Uuid) -> Option<&SavedPlan> {
        self.saved_plans.iter().find(|plan| plan.id == id)
    }

    pub fn has_saved_plans(&self) -> bool {
        !self.saved_plans.is_empty()
    }

    pub fn provenance(&self) -> Provenance {
        self.provenance
    }

    pub fn plan_source(&self) -> PlanSource {
        self.plan_source
    }

    pub fn nav_visible(&self) -> bool {
        self.screen.shows_navigation()
    }

    pub fn plan_affordance(&self) -> PlanAffordance {
        match self.provenance {
            Provenance::Profile => PlanAffordance::BackToProfile,
            Provenance::New => PlanAffordance::ViewAllInProfile,
        }
    }

    /// The answers the Plan screen should be generated from, if any.
    pub fn plan_answers(&self) -> Option<&QuestionnaireAnswers> {
        let saved = match self.plan_source {
            PlanSource::Saved(id) => self.saved_plan(id).map(|plan| &plan.answers),
            PlanSource::Current => None,
        };
        saved
            .or(self.answers.as_ref())
            .or_else(|| self.saved_plans.first().map(|plan| &plan.answers))
    }

    pub fn profile_summary(&self) -> ProfileSummary {
        let total_plans = self.saved_plans.len();
        let completed_plans = self.saved_plans.iter().filter(|p| p.is_completed).count();
        let completion_percent = if total_plans == 0 {
            0
        } else {
            ((completed_plans * 100 + total_plans / 2) / total_plans) as u8
        };
        ProfileSummary {
            total_plans,
            completed_plans,
            completion_percent,
        }
    }

    // --- Operations ---

    pub fn select_tab(&mut self, tab: Tab) {
        self.tab = tab;
        self.go(match tab {
            Tab::Home => Screen::Home,
            Tab::Profile => Screen::Profile,
        });
    }

    pub fn start_plan_creation(&mut self) {
        self.tab = Tab::Home;
        self.go(Screen::Form);
    }

    /// Validates the questionnaire and, when it is complete, starts the
    /// generation simulation. A rejected form leaves the screen untouched.
    pub fn submit_form(&mut self, draft: &QuestionnaireDraft) -> Result<(), ValidationErrors> {
        let answers = draft.validate()?;
        self.answers = Some(answers);
        self.plan_source = PlanSource::Current;
        self.go(Screen::Loading);
        Ok(())
    }

    /// Moves from Loading to a freshly generated plan. Returns `false`
    /// without changing anything when the Loading screen is no longer active.
    pub fn loading_complete(&mut self) -> bool {
        if self.screen != Screen::Loading {
            debug!(screen = self.screen.as_str(), "ignoring stale loading completion");
            return false;
        }
        self.provenance = Provenance::New;
        self.plan_source = PlanSource::Current;
        self.go(Screen::Plan);
        true
    }

    pub fn quick_view_saved_plan(&mut self) {
        self.provenance = Provenance::New;
        self.plan_source = PlanSource::Current;
        self.go(Screen::Plan);
    }

    /// Shows a saved plan with the "back to profile" affordance.
    /// An unknown id is a no-op and returns `None`.
    pub fn open_saved_plan(&mut self, id: Uuid) -> Option<&SavedPlan> {
        self.saved_plan(id)?;
        self.provenance = Provenance::Profile;
        self.plan_source = PlanSource::Saved(id);
        self.go(Screen::Plan);
        self.saved_plan(id)
    }

    /// Prepends a new saved plan built from the current answers.
    pub fn save_current_plan(&mut self) -> Option<&SavedPlan> {
        let answers = self.answers.as_ref()?;
        let plan = SavedPlan::from_answers(answers, self.saved_plans.len() + 1, Utc::now());
        debug!(plan_id = %plan.id, name = %plan.name, "saving plan");
        self.saved_plans.insert(0, plan);
        self.saved_plans.first()
    }

    /// Removes the plan with `id`. An unknown id is a no-op and returns `None`.
    pub fn delete_plan(&mut self, id: Uuid) -> Option<SavedPlan> {
        let index = self.saved_plans.iter().position(|plan| plan.id == id)?;
        let removed = self.saved_plans.remove(index);
        if self.plan_source == PlanSource::Saved(id) {
            self.plan_source = PlanSource::Current;
        }
        debug!(plan_id = %id, "deleted plan");
        Some(removed)
    }

    pub fn start_new_plan_cycle(&mut self) {
        self.answers = None;
        self.tab = Tab::Home;
        self.provenance = Provenance::New;
        self.plan_source = PlanSource::Current;
        self.go(Screen::Home);
    }

    pub fn back_to_home(&mut self) {
        self.tab = Tab::Home;
        self.go(Screen::Home);
    }

    pub fn back_to_profile(&mut self) {
        self.tab = Tab::Profile;
        self.go(Screen::Profile);
    }

    pub fn view_profile_from_plan(&mut self) {
        self.tab = Tab::Profile;
        self.go(Screen::Profile);
    }

    fn go(&mut self, screen: Screen) {
        debug!(from = self.screen.as_str(), to = screen.as_str(), "screen transition");
        self.screen = screen;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Goal;
    use crate::form::FormField;

    fn draft(goal: &str) -> QuestionnaireDraft {
        QuestionnaireDraft {
            goal: goal.to_string(),
            fitness_level: "beginner".to_string(),
            workouts_per_week: "3".to_string(),
            ..Default::default()
        }
    }

    /// A controller sitting on a freshly generated plan.
    fn on_generated_plan(goal: &str) -> SessionController {
        let mut session = SessionController::new();
        session.start_plan_creation();
        session.submit_form(&draft(goal)).unwrap();
        assert!(session.loading_complete());
        session
    }

    #[test]
    fn fresh_controller_starts_home() {
        let session = SessionController::new();

        assert_eq!(session.screen(), Screen::Home);
        assert_eq!(session.tab(), Tab::Home);
        assert!(session.answers().is_none());
        assert!(session.saved_plans().is_empty());
        assert_eq!(session.provenance(), Provenance::New);
    }

    #[test]
    fn invalid_form_stays_on_form() {
        let mut session = SessionController::new();
        session.start_plan_creation();

        let errors = session.submit_form(&draft("")).unwrap_err();

        assert_eq!(errors.fields().count(), 1);
        assert!(errors.get(FormField::Goal).is_some());
        assert_eq!(session.screen(), Screen::Form);
        assert!(session.answers().is_none());
    }

    #[test]
    fn full_cycle_reaches_fresh_plan() {
        let mut session = SessionController::new();

        session.start_plan_creation();
        assert_eq!(session.screen(), Screen::Form);

        session.submit_form(&draft("weight-loss")).unwrap();
        assert_eq!(session.screen(), Screen::Loading);
        assert_eq!(session.answers().map(|a| a.goal), Some(Goal::WeightLoss));

        assert!(session.loading_complete());
        assert_eq!(session.screen(), Screen::Plan);
        assert_eq!(session.provenance(), Provenance::New);
        assert_eq!(session.plan_affordance(), PlanAffordance::ViewAllInProfile);
    }

    #[test]
    fn stale_loading_completion_is_ignored() {
        let mut session = SessionController::new();
        session.start_plan_creation();
        session.submit_form(&draft("endurance")).unwrap();
        session.back_to_home();

        assert!(!session.loading_complete());
        assert_eq!(session.screen(), Screen::Home);
    }

    #[test]
    fn saving_twice_creates_distinct_plans_newest_first() {
        let mut session = on_generated_plan("weight-loss");

        let first = session.save_current_plan().map(|p| p.id).unwrap();
        let second = session.save_current_plan().map(|p| p.id).unwrap();

        let plans = session.saved_plans();
        assert_eq!(plans.len(), 2);
        assert_ne!(first, second);
        assert_eq!(plans[0].id, second);
        assert_eq!(plans[0].name, "Weight Loss Plan #2");
        assert_eq!(plans[1].name, "Weight Loss Plan #1");
    }

    #[test]
    fn saving_without_answers_does_nothing() {
        let mut session = SessionController::new();
        assert!(session.save_current_plan().is_none());
        assert!(session.saved_plans().is_empty());
    }

    #[test]
    fn delete_keeps_relative_order() {
        let mut session = on_generated_plan("maintenance");
        for _ in 0..3 {
            session.save_current_plan();
        }
        let ids: Vec<Uuid> = session.saved_plans().iter().map(|p| p.id).collect();

        let removed = session.delete_plan(ids[1]).unwrap();

        assert_eq!(removed.id, ids[1]);
        let remaining: Vec<Uuid> = session.saved_plans().iter().map(|p| p.id).collect();
        assert_eq!(remaining, vec![ids[0], ids[2]]);
    }

    #[test]
    fn unknown_ids_are_no_ops() {
        let mut session = on_generated_plan("maintenance");
        session.save_current_plan();
        session.view_profile_from_plan();

        assert!(session.delete_plan(Uuid::new_v4()).is_none());
        assert!(session.open_saved_plan(Uuid::new_v4()).is_none());
        assert_eq!(session.saved_plans().len(), 1);
        assert_eq!(session.screen(), Screen::Profile);
    }

    #[test]
    fn plan_opened_from_profile_offers_back_to_profile() {
        let mut session = on_generated_plan("muscle-gain");
        let id = session.save_current_plan().map(|p| p.id).unwrap();
        session.select_tab(Tab::Profile);

        assert!(session.open_saved_plan(id).is_some());
        assert_eq!(session.screen(), Screen::Plan);
        assert_eq!(session.provenance(), Provenance::Profile);
        assert_eq!(session.plan_affordance(), PlanAffordance::BackToProfile);
        assert_eq!(session.plan_source(), PlanSource::Saved(id));

        session.back_to_profile();
        assert_eq!(session.screen(), Screen::Profile);
        assert_eq!(session.tab(), Tab::Profile);
    }

    #[test]
    fn quick_view_offers_view_all_in_profile() {
        let mut session = on_generated_plan("muscle-gain");
        session.save_current_plan();
        session.back_to_home();

        session.quick_view_saved_plan();
        assert_eq!(session.screen(), Screen::Plan);
        assert_eq!(session.provenance(), Provenance::New);
        assert_eq!(session.plan_affordance(), PlanAffordance::ViewAllInProfile);

        session.view_profile_from_plan();
        assert_eq!(session.screen(), Screen::Profile);
        assert_eq!(session.tab(), Tab::Profile);
    }

    #[test]
    fn opened_saved_plan_uses_its_own_answers() {
        let mut session = on_generated_plan("endurance");
        let id = session.save_current_plan().map(|p| p.id).unwrap();
        session.start_plan_creation();
        session.submit_form(&draft("weight-loss")).unwrap();
        session.loading_complete();

        session.open_saved_plan(id);

        assert_eq!(session.plan_answers().map(|a| a.goal), Some(Goal::Endurance));
    }

    #[test]
    fn quick_view_after_reset_falls_back_to_newest_saved_plan() {
        let mut session = on_generated_plan("endurance");
        session.save_current_plan();
        session.start_new_plan_cycle();
        assert!(session.answers().is_none());

        session.quick_view_saved_plan();

        assert_eq!(session.plan_answers().map(|a| a.goal), Some(Goal::Endurance));
    }

    #[test]
    fn new_plan_cycle_resets_to_start() {
        let mut session = on_generated_plan("weight-loss");
        let id = session.save_current_plan().map(|p| p.id).unwrap();
        session.open_saved_plan(id);

        session.start_new_plan_cycle();

        assert_eq!(session.screen(), Screen::Home);
        assert_eq!(session.tab(), Tab::Home);
        assert!(session.answers().is_none());
        assert_eq!(session.provenance(), Provenance::New);
        assert_eq!(session.saved_plans().len(), 1);
    }

    #[test]
    fn navigation_visible_only_on_home_and_profile() {
        let mut session = SessionController::new();
        assert!(session.nav_visible());

        session.start_plan_creation();
        assert!(!session.nav_visible());
        session.submit_form(&draft("endurance")).unwrap();
        assert!(!session.nav_visible());
        session.loading_complete();
        assert!(!session.nav_visible());
        session.view_profile_from_plan();
        assert!(session.nav_visible());

        for screen in Screen::ALL {
            let expected = matches!(screen, Screen::Home | Screen::Profile);
            assert_eq!(screen.shows_navigation(), expected);
        }
    }

    #[test]
    fn tab_selection_drives_screen() {
        let mut session = SessionController::new();

        session.select_tab(Tab::Profile);
        assert_eq!((session.screen(), session.tab()), (Screen::Profile, Tab::Profile));

        session.select_tab(Tab::Home);
        assert_eq!((session.screen(), session.tab()), (Screen::Home, Tab::Home));
    }

    #[test]
    fn profile_summary_rounds_completion() {
        let mut session = on_generated_plan("weight-loss");
        assert_eq!(session.profile_summary().completion_percent, 0);

        for _ in 0..3 {
            session.save_current_plan();
        }
        session.saved_plans[0].is_completed = true;

        let summary = session.profile_summary();
        assert_eq!(summary.total_plans, 3);
        assert_eq!(summary.completed_plans, 1);
        assert_eq!(summary.completion_percent, 33);
    }
}
