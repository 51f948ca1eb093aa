use std::f64::consts::TAU;
use std::fs;
use std::path::Path;

use anyhow::Context;
use glam::DVec3;
use raceline_core::track::{CheckpointMarker, CheckpointSet};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::checkpoints::CheckpointVolume;
use crate::physics::bounding_box::BoundingBox;

fn default_half_extents() -> DVec3 {
    DVec3::new(4.0, 2.0, 4.0)
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CheckpointLayout {
    pub position: DVec3,
    #[serde(default = "default_half_extents")]
    pub half_extents: DVec3,
    #[serde(default)]
    pub is_finish_line: bool,
}

/// A track as stored on disk: checkpoints in driving order, the first one
/// doubling as the start/finish line unless another is flagged.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TrackLayout {
    pub name: String,
    pub checkpoints: Vec<CheckpointLayout>,
}

impl TrackLayout {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<TrackLayout> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("couldn't read track file {}", path.display()))?;
        let layout: TrackLayout = serde_yaml::from_str(&contents)
            .with_context(|| format!("couldn't parse track file {}", path.display()))?;

        info!(
            track = %layout.name,
            checkpoints = layout.checkpoints.len(),
            "loaded track"
        );
        Ok(layout)
    }

    // an ellipse in the xz-plane, driven counterclockwise seen from above
    pub fn oval(checkpoint_amount: usize, radius_x: f64, radius_z: f64) -> TrackLayout {
        let checkpoints = (0..checkpoint_amount)
            .map(|i| {
                let angle = TAU * i as f64 / checkpoint_amount as f64;
                CheckpointLayout {
                    position: DVec3::new(radius_x * angle.cos(), 0.0, radius_z * angle.sin()),
                    half_extents: default_half_extents(),
                    is_finish_line: i == 0,
                }
            })
            .collect();

        TrackLayout {
            name: "oval".to_string(),
            checkpoints,
        }
    }

    pub fn checkpoint_set(&self) -> anyhow::Result<CheckpointSet> {
        let mut markers: Vec<CheckpointMarker> = self
            .checkpoints
            .iter()
            .enumerate()
            .map(|(index, checkpoint)| CheckpointMarker {
                index,
                position: checkpoint.position,
                is_finish_line: checkpoint.is_finish_line,
            })
            .collect();

        if let Some(first) = markers.first_mut() {
            if !self.checkpoints.iter().any(|c| c.is_finish_line) {
                first.is_finish_line = true;
            }
        }

        CheckpointSet::build(markers).with_context(|| format!("track {} is unusable", self.name))
    }

    pub fn volumes(&self) -> Vec<CheckpointVolume> {
        self.checkpoints
            .iter()
            .enumerate()
            .map(|(index, checkpoint)| {
                CheckpointVolume::new(
                    index,
                    BoundingBox::around(checkpoint.position, checkpoint.half_extents),
                )
            })
            .collect()
    }

    // the closed loop the scripted drivers follow
    pub fn centerline(&self) -> Vec<DVec3> {
        self.checkpoints.iter().map(|c| c.position).collect()
    }
}
