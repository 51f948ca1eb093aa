use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::progress::lap_info::CheckpointIndex;
use crate::RaceError;

// markers closer together than this can't be interpolated between
const MIN_INTERPOLATION_DISTANCE: f64 = 0.01;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct CheckpointMarker {
    pub index: CheckpointIndex,
    pub position: DVec3,
    #[serde(default)]
    pub is_finish_line: bool,
}

impl CheckpointMarker {
    pub fn new(index: CheckpointIndex, position: DVec3) -> Self {
        Self {
            index,
            position,
            is_finish_line: index == 0,
        }
    }
}

/// The ordered checkpoints of one track. Built once at race setup and shared
/// read-only by every tracker afterwards.
#[derive(Clone, Debug)]
pub struct CheckpointSet {
    markers: Vec<CheckpointMarker>,
}

impl CheckpointSet {
    /// Fails unless the markers are non-empty and indexed `0..N-1` in order.
    pub fn build(markers: Vec<CheckpointMarker>) -> Result<Self, RaceError> {
        if markers.is_empty() {
            return Err(RaceError::InvalidConfiguration(
                "a track needs at least one checkpoint".to_string(),
            ));
        }

        if let Some((position, marker)) = markers
            .iter()
            .enumerate()
            .find(|(position, marker)| marker.index != *position)
        {
            return Err(RaceError::InvalidConfiguration(format!(
                "checkpoint at position {} has index {}, indices must be contiguous from 0",
                position, marker.index
            )));
        }

        Ok(Self { markers })
    }

    /// Indices follow the order of `positions`; the first one is the finish line.
    pub fn from_positions(positions: impl IntoIterator<Item = DVec3>) -> Result<Self, RaceError> {
        Self::build(
            positions
                .into_iter()
                .enumerate()
                .map(|(index, position)| CheckpointMarker::new(index, position))
                .collect(),
        )
    }

    pub fn count(&self) -> usize {
        self.markers.len()
    }

    pub fn contains(&self, index: CheckpointIndex) -> bool {
        index < self.markers.len()
    }

    pub fn at(&self, index: CheckpointIndex) -> Result<&CheckpointMarker, RaceError> {
        self.markers.get(index).ok_or(RaceError::IndexOutOfRange {
            index,
            count: self.markers.len(),
        })
    }

    pub fn next_index(&self, index: CheckpointIndex) -> CheckpointIndex {
        (index + 1) % self.markers.len()
    }

    pub fn finish_line(&self) -> &CheckpointMarker {
        self.markers
            .iter()
            .find(|marker| marker.is_finish_line)
            .unwrap_or(&self.markers[0])
    }

    pub fn iter(&self) -> impl Iterator<Item = &CheckpointMarker> {
        self.markers.iter()
    }

    /// Nearest checkpoint lying ahead of `position` when looking along `forward`.
    pub fn closest_index_in_front(
        &self,
        position: DVec3,
        forward: DVec3,
    ) -> Option<CheckpointIndex> {
        self.markers
            .iter()
            .filter(|marker| (marker.position - position).dot(forward) > 0.0)
            .min_by(|a, b| {
                a.position
                    .distance_squared(position)
                    .total_cmp(&b.position.distance_squared(position))
            })
            .map(|marker| marker.index)
    }

    /// How far `position` has come from checkpoint `from` towards checkpoint
    /// `to`, estimated from straight-line distances. Always in `[0, 1)`.
    pub fn fraction_between(
        &self,
        position: DVec3,
        from: CheckpointIndex,
        to: CheckpointIndex,
    ) -> Result<f64, RaceError> {
        let from = self.at(from)?.position;
        let to = self.at(to)?.position;

        if from.distance(to) <= MIN_INTERPOLATION_DISTANCE {
            return Ok(0.0);
        }

        let distance_from_last = position.distance(from);
        let distance_to_next = position.distance(to);
        let fraction = distance_from_last / (distance_from_last + distance_to_next);

        Ok(fraction.clamp(0.0, 1.0 - f64::EPSILON))
    }
}
