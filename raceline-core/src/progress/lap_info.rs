use serde::{Deserialize, Serialize};

pub type LapNumber = u32;
pub type CheckpointIndex = usize;
pub type Placement = usize;

// The knobs of the checkpoint state machine. Skip tolerance and the
// finish-line window are per-track tuning values.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProgressRules {
    pub total_laps: LapNumber,
    pub forward_skip_tolerance: usize,
    pub backward_finish_line_window: usize,
}

impl ProgressRules {
    pub fn new(
        total_laps: LapNumber,
        forward_skip_tolerance: usize,
        backward_finish_line_window: usize,
    ) -> Self {
        ProgressRules {
            total_laps,
            forward_skip_tolerance,
            backward_finish_line_window,
        }
    }
}

impl Default for ProgressRules {
    fn default() -> Self {
        ProgressRules::new(3, 5, 3)
    }
}

impl ProgressRules {
    pub fn validate(&self) -> Result<(), crate::RaceError> {
        if self.total_laps == 0 {
            return Err(crate::RaceError::InvalidConfiguration(
                "a race needs at least one lap".to_string(),
            ));
        }
        Ok(())
    }
}
