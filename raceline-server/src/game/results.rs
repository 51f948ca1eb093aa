use std::cmp::Ordering;

use ordinal::Ordinal;
use raceline_core::progress::lap_info::{LapNumber, Placement};
use raceline_core::RacerID;
use serde::Serialize;

#[derive(Serialize, Clone, Debug)]
pub struct RacerResult {
    pub racer: RacerID,
    pub placement: Placement,
    pub placement_label: String,
    pub laps: LapNumber,
    pub finished: bool,
    pub finish_tick: Option<u64>,
    pub total_progress: f64,
}

#[derive(Serialize, Clone, Debug)]
pub struct TraineeSummary {
    pub racer: RacerID,
    pub episodes_completed: u32,
    pub total_reward: f32,
}

#[derive(Serialize, Clone, Debug)]
pub struct RaceResults {
    pub track: String,
    pub ticks: u64,
    pub completed: bool,
    pub standings: Vec<RacerResult>,
    pub trainee: Option<TraineeSummary>,
}

// Finished racers go by who crossed the line first; everyone else keeps the
// order of the live ranking.
fn compare_finishers(a: &RacerResult, b: &RacerResult) -> Ordering {
    match (a.finish_tick, b.finish_tick) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// `results` must already be in live-ranking order.
pub fn final_standings(mut results: Vec<RacerResult>) -> Vec<RacerResult> {
    results.sort_by(compare_finishers);
    for (i, result) in results.iter_mut().enumerate() {
        result.placement = i + 1;
        result.placement_label = Ordinal(result.placement).to_string();
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(racer: RacerID, finish_tick: Option<u64>) -> RacerResult {
        RacerResult {
            racer,
            placement: 0,
            placement_label: String::new(),
            laps: 0,
            finished: finish_tick.is_some(),
            finish_tick,
            total_progress: 0.0,
        }
    }

    #[test]
    fn test_finishers_ordered_by_finish_tick() {
        let standings = final_standings(vec![
            result(0, Some(120)),
            result(1, None),
            result(2, Some(90)),
            result(3, None),
        ]);

        let order: Vec<RacerID> = standings.iter().map(|r| r.racer).collect();
        assert_eq!(order, vec![2, 0, 1, 3]);

        let labels: Vec<&str> = standings
            .iter()
            .map(|r| r.placement_label.as_str())
            .collect();
        assert_eq!(labels, vec!["1st", "2nd", "3rd", "4th"]);
    }
}
