mod checkpoint;

pub use checkpoint::{CheckpointMarker, CheckpointSet};
