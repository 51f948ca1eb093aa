use std::sync::Arc;

use glam::DVec3;
use tracing::{debug, warn};

use crate::track::CheckpointSet;
use crate::RaceError;

pub mod lap_info;

use lap_info::*;


#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProgressState {
    // waiting to cross the start line (checkpoint 0) for the first time
    NotStarted,
    Racing { last_checkpoint: CheckpointIndex },
    // terminal; nothing moves a racer out of here except a reset
    Finished { last_checkpoint: CheckpointIndex },
}

/// What a single checkpoint event did to a tracker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CheckpointOutcome {
    Ignored,
    Started,
    Advanced {
        from: CheckpointIndex,
        to: CheckpointIndex,
    },
    // forward, but some trigger volumes in between were never reported
    Skipped {
        from: CheckpointIndex,
        to: CheckpointIndex,
    },
    LapCompleted {
        lap: LapNumber,
    },
    Finished {
        lap: LapNumber,
    },
    // drove backwards over the finish line
    LapRevoked {
        lap: LapNumber,
        to: CheckpointIndex,
    },
    Regressed {
        from: CheckpointIndex,
        to: CheckpointIndex,
    },
}

impl CheckpointOutcome {
    /// Whether the event was accepted as progress towards the finish.
    pub fn is_forward(&self) -> bool {
        matches!(
            self,
            CheckpointOutcome::Started
                | CheckpointOutcome::Advanced { .. }
                | CheckpointOutcome::Skipped { .. }
                | CheckpointOutcome::LapCompleted { .. }
                | CheckpointOutcome::Finished { .. }
        )
    }
}

/// One racer's lap and checkpoint bookkeeping.
#[derive(Clone, Debug)]
pub struct ProgressTracker {
    checkpoints: Arc<CheckpointSet>,
    rules: ProgressRules,
    state: ProgressState,
    current_lap: LapNumber,
    last_position: Option<DVec3>,
}

impl ProgressTracker {
    pub fn new(checkpoints: Arc<CheckpointSet>, rules: ProgressRules) -> Self {
        ProgressTracker {
            checkpoints,
            rules,
            state: ProgressState::NotStarted,
            current_lap: 0,
            last_position: None,
        }
    }

    pub fn reset_progress(&mut self) {
        self.state = ProgressState::NotStarted;
        self.current_lap = 0;
        self.last_position = None;
    }

    /// Feed a checkpoint trigger into the state machine. Out-of-range indices
    /// are rejected without touching any state.
    pub fn on_checkpoint_reached(
        &mut self,
        index: CheckpointIndex,
    ) -> Result<CheckpointOutcome, RaceError> {
        let count = self.checkpoints.count();
        if index >= count {
            warn!(index, count, "dropping checkpoint event outside of the track");
            return Err(RaceError::InvalidArgument { index, count });
        }

        let outcome = self.apply_checkpoint(index, count);
        if outcome != CheckpointOutcome::Ignored {
            debug!(index, lap = self.current_lap, ?outcome, "checkpoint reached");
        }
        Ok(outcome)
    }

    // Rules are checked in priority order and the first match wins; lap
    // completion has to come before plain forward progression since both can
    // match index 0.
    fn apply_checkpoint(&mut self, index: CheckpointIndex, count: usize) -> CheckpointOutcome {
        let last = match self.state {
            ProgressState::NotStarted if index == 0 => {
                self.state = ProgressState::Racing { last_checkpoint: 0 };
                return CheckpointOutcome::Started;
            }
            ProgressState::NotStarted | ProgressState::Finished { .. } => {
                return CheckpointOutcome::Ignored
            }
            ProgressState::Racing { last_checkpoint } => last_checkpoint,
        };

        if index == 0 && last == count - 1 {
            self.current_lap += 1;
            if self.current_lap >= self.rules.total_laps {
                self.state = ProgressState::Finished { last_checkpoint: 0 };
                return CheckpointOutcome::Finished {
                    lap: self.current_lap,
                };
            }
            self.state = ProgressState::Racing { last_checkpoint: 0 };
            return CheckpointOutcome::LapCompleted {
                lap: self.current_lap,
            };
        }

        if index == last + 1 {
            self.state = ProgressState::Racing {
                last_checkpoint: index,
            };
            return CheckpointOutcome::Advanced {
                from: last,
                to: index,
            };
        }

        if index > last && index <= last + self.rules.forward_skip_tolerance {
            self.state = ProgressState::Racing {
                last_checkpoint: index,
            };
            return CheckpointOutcome::Skipped {
                from: last,
                to: index,
            };
        }

        let window = self.rules.backward_finish_line_window;
        if index != last && last < window && index >= count.saturating_sub(window) {
            // before the first lap is done there is no lap to take away, and
            // jumping to the end of the track would count as progress
            if self.current_lap == 0 {
                return CheckpointOutcome::Ignored;
            }
            self.current_lap -= 1;
            self.state = ProgressState::Racing {
                last_checkpoint: index,
            };
            return CheckpointOutcome::LapRevoked {
                lap: self.current_lap,
                to: index,
            };
        }

        if index < last {
            self.state = ProgressState::Racing {
                last_checkpoint: index,
            };
            return CheckpointOutcome::Regressed {
                from: last,
                to: index,
            };
        }

        CheckpointOutcome::Ignored
    }

    /// Remember where the racer is, for interpolating between checkpoints.
    pub fn observe_position(&mut self, position: DVec3) {
        self.last_position = Some(position);
    }

    /// `lap * N + last checkpoint + fraction towards the next checkpoint`.
    /// Safe to call at any time, including before the start.
    pub fn total_progress(&self) -> f64 {
        let count = self.checkpoints.count();
        let lap_progress = (self.current_lap as usize * count) as f64;
        let checkpoint_progress = self.last_checkpoint_index().unwrap_or(0) as f64;

        lap_progress + checkpoint_progress + self.progress_between_checkpoints()
    }

    pub fn progress_between_checkpoints(&self) -> f64 {
        let (last, position) = match (self.state, self.last_position) {
            (ProgressState::Racing { last_checkpoint }, Some(position)) => {
                (last_checkpoint, position)
            }
            _ => return 0.0,
        };

        self.checkpoints
            .fraction_between(position, last, self.checkpoints.next_index(last))
            .unwrap_or(0.0)
    }

    pub fn state(&self) -> ProgressState {
        self.state
    }

    pub fn rules(&self) -> &ProgressRules {
        &self.rules
    }

    pub fn checkpoints(&self) -> &Arc<CheckpointSet> {
        &self.checkpoints
    }

    pub fn current_lap(&self) -> LapNumber {
        self.current_lap
    }

    // what a HUD shows: "Lap 1/3" from the start, never past the last lap
    pub fn display_lap(&self) -> LapNumber {
        (self.current_lap + 1).min(self.rules.total_laps)
    }

    pub fn last_checkpoint_index(&self) -> Option<CheckpointIndex> {
        match self.state {
            ProgressState::NotStarted => None,
            ProgressState::Racing { last_checkpoint }
            | ProgressState::Finished { last_checkpoint } => Some(last_checkpoint),
        }
    }

    pub fn next_checkpoint_index(&self) -> CheckpointIndex {
        match self.last_checkpoint_index() {
            Some(last) => self.checkpoints.next_index(last),
            None => 0,
        }
    }

    pub fn has_started(&self) -> bool {
        self.state != ProgressState::NotStarted
    }

    pub fn has_finished(&self) -> bool {
        matches!(self.state, ProgressState::Finished { .. })
    }
}
