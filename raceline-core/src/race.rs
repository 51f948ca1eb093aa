use std::sync::Arc;

use glam::DVec3;
use tracing::info;

use crate::progress::lap_info::{CheckpointIndex, LapNumber, Placement, ProgressRules};
use crate::progress::{CheckpointOutcome, ProgressTracker};
use crate::ranking::{RankingAggregator, Standing};
use crate::track::CheckpointSet;
use crate::{RaceError, RacerID};

/// One race session: a tracker per racer plus the ranking over all of them.
/// Racer ids are handed out in registration order.
pub struct Race {
    checkpoints: Arc<CheckpointSet>,
    rules: ProgressRules,
    trackers: Vec<ProgressTracker>,
    ranking: RankingAggregator,
}

impl Race {
    pub fn new(checkpoints: Arc<CheckpointSet>, rules: ProgressRules) -> Result<Race, RaceError> {
        rules.validate()?;
        info!(
            checkpoints = checkpoints.count(),
            laps = rules.total_laps,
            "setting up race"
        );

        Ok(Race {
            checkpoints,
            rules,
            trackers: Vec::new(),
            ranking: RankingAggregator::new(),
        })
    }

    pub fn add_racer(&mut self) -> RacerID {
        let racer = self.trackers.len();
        self.trackers
            .push(ProgressTracker::new(self.checkpoints.clone(), self.rules));
        self.ranking.register(racer);
        racer
    }

    pub fn on_checkpoint_reached(
        &mut self,
        racer: RacerID,
        index: CheckpointIndex,
    ) -> Result<CheckpointOutcome, RaceError> {
        let outcome = self.tracker_mut(racer)?.on_checkpoint_reached(index)?;
        if let CheckpointOutcome::Finished { .. } = outcome {
            info!(racer, "racer finished");
        }
        Ok(outcome)
    }

    pub fn observe_position(&mut self, racer: RacerID, position: DVec3) -> Result<(), RaceError> {
        self.tracker_mut(racer)?.observe_position(position);
        Ok(())
    }

    pub fn reset_progress(&mut self, racer: RacerID) -> Result<(), RaceError> {
        self.tracker_mut(racer)?.reset_progress();
        Ok(())
    }

    pub fn recompute_rankings(&mut self) -> &[Standing] {
        let trackers = &self.trackers;
        self.ranking
            .recompute(|racer| trackers.get(racer).map(ProgressTracker::total_progress))
    }

    /// Standings as of right now, without touching the stored snapshot.
    pub fn current_standings(&self) -> Vec<Standing> {
        self.ranking
            .compute_standings(|racer| self.tracker(racer).map(ProgressTracker::total_progress))
    }

    pub fn rank(&self, racer: RacerID) -> Placement {
        self.ranking.rank(racer)
    }

    pub fn standings(&self) -> &[Standing] {
        self.ranking.standings()
    }

    pub fn lap_number(&self, racer: RacerID) -> Option<LapNumber> {
        self.tracker(racer).map(ProgressTracker::current_lap)
    }

    pub fn has_finished(&self, racer: RacerID) -> bool {
        self.tracker(racer)
            .map(ProgressTracker::has_finished)
            .unwrap_or(false)
    }

    pub fn all_finished(&self) -> bool {
        !self.trackers.is_empty() && self.trackers.iter().all(ProgressTracker::has_finished)
    }

    pub fn racer_count(&self) -> usize {
        self.trackers.len()
    }

    pub fn tracker(&self, racer: RacerID) -> Option<&ProgressTracker> {
        self.trackers.get(racer)
    }

    fn tracker_mut(&mut self, racer: RacerID) -> Result<&mut ProgressTracker, RaceError> {
        self.trackers
            .get_mut(racer)
            .ok_or(RaceError::UnknownRacer(racer))
    }

    pub fn checkpoints(&self) -> &Arc<CheckpointSet> {
        &self.checkpoints
    }

    pub fn rules(&self) -> &ProgressRules {
        &self.rules
    }
}
