use serde::Serialize;

use crate::progress::lap_info::Placement;
use crate::RacerID;

#[derive(Serialize, Clone, Copy, Debug, PartialEq)]
pub struct Standing {
    pub racer: RacerID,
    pub placement: Placement,
    pub total_progress: f64,
}

/// Orders racers by how far along the track they are. Only racer ids are
/// kept here; the progress itself is looked up on every recompute.
#[derive(Default, Debug)]
pub struct RankingAggregator {
    registered: Vec<RacerID>,
    standings: Vec<Standing>,
}

impl RankingAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the racer was already registered.
    pub fn register(&mut self, racer: RacerID) -> bool {
        if self.registered.contains(&racer) {
            return false;
        }
        self.registered.push(racer);
        true
    }

    pub fn unregister(&mut self, racer: RacerID) {
        self.registered.retain(|id| *id != racer);
        self.standings.retain(|standing| standing.racer != racer);
        for (i, standing) in self.standings.iter_mut().enumerate() {
            standing.placement = i + 1;
        }
    }

    pub fn registered_count(&self) -> usize {
        self.registered.len()
    }

    /// Descending total progress; the sort is stable so ties keep
    /// registration order. Racers `progress_of` knows nothing about are left out.
    pub fn compute_standings<F>(&self, progress_of: F) -> Vec<Standing>
    where
        F: Fn(RacerID) -> Option<f64>,
    {
        let mut progress: Vec<(RacerID, f64)> = self
            .registered
            .iter()
            .filter_map(|racer| progress_of(*racer).map(|total| (*racer, total)))
            .collect();

        progress.sort_by(|(_, a), (_, b)| b.total_cmp(a));

        progress
            .into_iter()
            .enumerate()
            .map(|(i, (racer, total_progress))| Standing {
                racer,
                placement: i + 1,
                total_progress,
            })
            .collect()
    }

    pub fn recompute<F>(&mut self, progress_of: F) -> &[Standing]
    where
        F: Fn(RacerID) -> Option<f64>,
    {
        self.standings = self.compute_standings(progress_of);
        &self.standings
    }

    /// 1-based placement from the last recompute. Racers that aren't ranked
    /// get the last place rather than an error.
    pub fn rank(&self, racer: RacerID) -> Placement {
        self.standings
            .iter()
            .find(|standing| standing.racer == racer)
            .map(|standing| standing.placement)
            .unwrap_or(self.registered.len())
    }

    pub fn standings(&self) -> &[Standing] {
        &self.standings
    }

    pub fn leader(&self) -> Option<RacerID> {
        self.standings.first().map(|standing| standing.racer)
    }
}
