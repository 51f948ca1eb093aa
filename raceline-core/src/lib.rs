pub mod episode;
pub mod error;
pub mod progress;
pub mod race;
pub mod ranking;
mod settings;
pub mod track;

pub use error::RaceError;
pub use settings::{Settings, GLOBAL_CONFIG};

pub type RacerID = usize;
