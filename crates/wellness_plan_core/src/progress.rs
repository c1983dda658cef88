//! crates/wellness_plan_core/src/progress.rs
//!
//! The simulated generation progress shown on the Loading screen. This is only
//! the arithmetic; the clock that drives `tick` lives with the caller.

use std::time::Duration;

/// Interval between two progress ticks.
pub const TICK_INTERVAL: Duration = Duration::from_millis(50);
/// Pause between reaching 100% and completing the loading screen.
pub const COMPLETION_DELAY: Duration = Duration::from_millis(500);
pub const MAX_PROGRESS: u8 = 100;

/// Status captions, one per equal fifth of the progress range.
pub const STAGE_CAPTIONS: [&str; 5] = [
    "Analyzing your answers...",
    "Selecting exercises...",
    "Building the menu...",
    "Calculating macros...",
    "Finalizing the plan...",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Progress moved; `value` is the new percentage.
    Advanced { value: u8, stage: usize },
    /// Progress just reached 100%. Reported exactly once.
    Finished,
    /// Already finished; nothing changes.
    Idle,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadingProgress {
    value: u8,
    finished: bool,
}

impl LoadingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> u8 {
        self.value
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn stage(&self) -> usize {
        stage_for(self.value)
    }

    pub fn caption(&self) -> &'static str {
        STAGE_CAPTIONS[self.stage()]
    }

    pub fn tick(&mut self) -> TickOutcome {
        if self.finished {
            return TickOutcome::Idle;
        }
        self.value = (self.value + 1).min(MAX_PROGRESS);
        if self.value == MAX_PROGRESS {
            self.finished = true;
            TickOutcome::Finished
        } else {
            TickOutcome::Advanced {
                value: self.value,
                stage: self.stage(),
            }
        }
    }
}

/// Maps a percentage onto one of the five captions. 100% stays on the last one.
pub fn stage_for(value: u8) -> usize {
    let stage = usize::from(value) * STAGE_CAPTIONS.len() / usize::from(MAX_PROGRESS);
    stage.min(STAGE_CAPTIONS.len() - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_split_range_into_fifths() {
        assert_eq!(stage_for(0), 0);
        assert_eq!(stage_for(19), 0);
        assert_eq!(stage_for(20), 1);
        assert_eq!(stage_for(59), 2);
        assert_eq!(stage_for(80), 4);
        assert_eq!(stage_for(100), 4);
    }

    #[test]
    fn finishes_exactly_once_after_one_hundred_ticks() {
        let mut progress = LoadingProgress::new();
        let mut finished = 0;
        let mut last_value = 0;

        for _ in 0..150 {
            assert_eq!(progress.is_finished(), finished == 1);
            match progress.tick() {
                TickOutcome::Advanced { value, .. } => {
                    assert!(value > last_value);
                    assert_eq!(finished, 0, "progress advanced after finishing");
                    last_value = value;
                }
                TickOutcome::Finished => finished += 1,
                TickOutcome::Idle => {}
            }
        }

        assert_eq!(finished, 1);
        assert!(progress.is_finished());
        assert_eq!(last_value, 99);
        assert_eq!(progress.value(), MAX_PROGRESS);
        assert_eq!(progress.caption(), "Finalizing the plan...");
    }

    #[test]
    fn full_run_takes_about_five_seconds() {
        assert_eq!(TICK_INTERVAL * u32::from(MAX_PROGRESS), Duration::from_secs(5));
    }
}
