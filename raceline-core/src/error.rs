use thiserror::Error;

use crate::progress::lap_info::CheckpointIndex;
use crate::RacerID;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RaceError {
    // fatal at race setup; the race must not start
    #[error("invalid race configuration: {0}")]
    InvalidConfiguration(String),

    #[error("checkpoint index {index} out of range (track has {count} checkpoints)")]
    IndexOutOfRange {
        index: CheckpointIndex,
        count: usize,
    },

    // reported by the trigger system; the event is dropped
    #[error("checkpoint event for index {index} rejected, track has {count} checkpoints")]
    InvalidArgument {
        index: CheckpointIndex,
        count: usize,
    },

    #[error("no racer registered with id {0}")]
    UnknownRacer(RacerID),
}
