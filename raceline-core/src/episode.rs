use glam::DVec3;
use serde::Deserialize;
use tracing::{debug, info};

use crate::progress::lap_info::CheckpointIndex;
use crate::progress::{CheckpointOutcome, ProgressTracker};
use crate::track::CheckpointMarker;
use crate::RaceError;

// offsets to the next checkpoint are divided by this before being handed to
// the agent
const OBSERVATION_SCALE: f64 = 20.0;

/// The learning runtime on the other side of the coordinator.
pub trait LearningAgent {
    fn add_reward(&mut self, reward: f32);
    fn end_episode(&mut self);
}

#[derive(Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct RewardSchedule {
    // seconds
    pub max_time_to_reach_next_checkpoint: f64,
    pub checkpoint_reward: f32,
    pub lap_reward: f32,
    pub finish_reward: f32,
    pub timeout_penalty: f32,
    // applied every tick to push for faster laps
    pub step_penalty: f32,
}

impl Default for RewardSchedule {
    fn default() -> Self {
        RewardSchedule {
            max_time_to_reach_next_checkpoint: 30.0,
            checkpoint_reward: 0.03,
            lap_reward: 0.3,
            finish_reward: 0.5,
            timeout_penalty: -1.0,
            step_penalty: -0.0003,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EpisodeEnd {
    Finished,
    TimedOut,
}

/// Turns one racer's checkpoint progress into rewards and episode
/// boundaries for a learning agent.
pub struct EpisodeCoordinator {
    tracker: ProgressTracker,
    schedule: RewardSchedule,
    time_left: f64,
    episodes_completed: u32,
}

impl EpisodeCoordinator {
    pub fn new(tracker: ProgressTracker, schedule: RewardSchedule) -> Self {
        EpisodeCoordinator {
            tracker,
            schedule,
            time_left: schedule.max_time_to_reach_next_checkpoint,
            episodes_completed: 0,
        }
    }

    pub fn begin_episode(&mut self) {
        self.tracker.reset_progress();
        self.time_left = self.schedule.max_time_to_reach_next_checkpoint;
    }

    /// Advance the checkpoint timer by one fixed simulation step.
    pub fn tick<A: LearningAgent>(&mut self, time_step: f64, agent: &mut A) -> Option<EpisodeEnd> {
        agent.add_reward(self.schedule.step_penalty);
        self.time_left -= time_step;

        if self.time_left > 0.0 {
            return None;
        }

        info!(
            episode = self.episodes_completed,
            next_checkpoint = self.tracker.next_checkpoint_index(),
            "ran out of time before the next checkpoint"
        );
        agent.add_reward(self.schedule.timeout_penalty);
        self.end_episode(agent);
        Some(EpisodeEnd::TimedOut)
    }

    pub fn on_checkpoint_reached<A: LearningAgent>(
        &mut self,
        index: CheckpointIndex,
        agent: &mut A,
    ) -> Result<CheckpointOutcome, RaceError> {
        let outcome = self.tracker.on_checkpoint_reached(index)?;

        match outcome {
            CheckpointOutcome::Started
            | CheckpointOutcome::Advanced { .. }
            | CheckpointOutcome::Skipped { .. } => {
                self.reset_timer();
                agent.add_reward(self.schedule.checkpoint_reward);
            }
            CheckpointOutcome::LapCompleted { lap } => {
                debug!(lap, "lap completed");
                self.reset_timer();
                agent.add_reward(self.schedule.lap_reward);
            }
            CheckpointOutcome::Finished { lap } => {
                info!(lap, episode = self.episodes_completed, "finished the race");
                agent.add_reward(self.schedule.finish_reward);
                self.end_episode(agent);
            }
            CheckpointOutcome::Ignored
            | CheckpointOutcome::LapRevoked { .. }
            | CheckpointOutcome::Regressed { .. } => {}
        }

        Ok(outcome)
    }

    fn reset_timer(&mut self) {
        self.time_left = self.schedule.max_time_to_reach_next_checkpoint;
    }

    // the agent is told first, then the next episode starts straight away
    fn end_episode<A: LearningAgent>(&mut self, agent: &mut A) {
        agent.end_episode();
        self.episodes_completed += 1;
        self.begin_episode();
    }

    pub fn observe_position(&mut self, position: DVec3) {
        self.tracker.observe_position(position);
    }

    /// The checkpoint the agent should be driving towards.
    pub fn next_target(&self) -> &CheckpointMarker {
        let checkpoints = self.tracker.checkpoints();
        checkpoints
            .at(self.tracker.next_checkpoint_index())
            .unwrap_or_else(|_| checkpoints.finish_line())
    }

    pub fn observation_to_target(&self, position: DVec3) -> DVec3 {
        (self.next_target().position - position) / OBSERVATION_SCALE
    }

    pub fn time_left(&self) -> f64 {
        self.time_left
    }

    pub fn episodes_completed(&self) -> u32 {
        self.episodes_completed
    }

    pub fn tracker(&self) -> &ProgressTracker {
        &self.tracker
    }

    pub fn schedule(&self) -> &RewardSchedule {
        &self.schedule
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::progress::lap_info::ProgressRules;
    use crate::track::CheckpointSet;

    #[derive(Default)]
    struct RecordingAgent {
        rewards: Vec<f32>,
        episodes_ended: u32,
    }

    impl LearningAgent for RecordingAgent {
        fn add_reward(&mut self, reward: f32) {
            self.rewards.push(reward);
        }

        fn end_episode(&mut self) {
            self.episodes_ended += 1;
        }
    }

    fn get_coordinator(count: usize, total_laps: u32) -> EpisodeCoordinator {
        let checkpoints = Arc::new(
            CheckpointSet::from_positions(
                (0..count).map(|i| DVec3::new(0.0, 0.0, i as f64 * 20.0)),
            )
            .unwrap(),
        );
        let rules = ProgressRules {
            total_laps,
            ..ProgressRules::default()
        };
        EpisodeCoordinator::new(
            ProgressTracker::new(checkpoints, rules),
            RewardSchedule {
                max_time_to_reach_next_checkpoint: 3.0,
                step_penalty: 0.0,
                ..RewardSchedule::default()
            },
        )
    }

    #[test]
    fn test_accepted_checkpoints_pay_out_and_reset_the_timer() {
        let mut coordinator = get_coordinator(4, 2);
        let mut agent = RecordingAgent::default();

        coordinator.tick(2.0, &mut agent);
        assert_eq!(coordinator.time_left(), 1.0);

        coordinator.on_checkpoint_reached(0, &mut agent).unwrap();
        assert_eq!(coordinator.time_left(), 3.0);
        assert_eq!(agent.rewards.last(), Some(&0.03));
    }

    #[test]
    fn test_ignored_checkpoints_do_not_reset_the_timer() {
        let mut coordinator = get_coordinator(4, 2);
        let mut agent = RecordingAgent::default();
        coordinator.on_checkpoint_reached(0, &mut agent).unwrap();
        coordinator.on_checkpoint_reached(1, &mut agent).unwrap();
        coordinator.tick(1.5, &mut agent);
        let rewards_before = agent.rewards.len();

        assert_eq!(
            coordinator.on_checkpoint_reached(1, &mut agent),
            Ok(CheckpointOutcome::Ignored)
        );
        assert_eq!(coordinator.time_left(), 1.5);
        assert_eq!(agent.rewards.len(), rewards_before);
    }

    #[test]
    fn test_timeout_ends_the_episode_once_and_resets() {
        let mut coordinator = get_coordinator(4, 2);
        let mut agent = RecordingAgent::default();
        coordinator.on_checkpoint_reached(0, &mut agent).unwrap();

        assert_eq!(coordinator.tick(1.0, &mut agent), None);
        assert_eq!(coordinator.tick(1.0, &mut agent), None);
        assert_eq!(
            coordinator.tick(1.0, &mut agent),
            Some(EpisodeEnd::TimedOut)
        );
        assert_eq!(agent.episodes_ended, 1);
        assert!(agent.rewards.contains(&-1.0));

        // fresh episode, fresh timer
        assert!(!coordinator.tracker().has_started());
        assert_eq!(coordinator.time_left(), 3.0);
        assert_eq!(coordinator.tick(1.0, &mut agent), None);
        assert_eq!(agent.episodes_ended, 1);
    }

    #[test]
    fn test_lap_and_finish_rewards() {
        let mut coordinator = get_coordinator(3, 2);
        let mut agent = RecordingAgent::default();

        for index in [0, 1, 2] {
            coordinator.on_checkpoint_reached(index, &mut agent).unwrap();
        }
        assert_eq!(
            coordinator.on_checkpoint_reached(0, &mut agent),
            Ok(CheckpointOutcome::LapCompleted { lap: 1 })
        );
        assert_eq!(agent.rewards.last(), Some(&0.3));
        assert_eq!(agent.episodes_ended, 0);

        for index in [1, 2] {
            coordinator.on_checkpoint_reached(index, &mut agent).unwrap();
        }
        assert_eq!(
            coordinator.on_checkpoint_reached(0, &mut agent),
            Ok(CheckpointOutcome::Finished { lap: 2 })
        );
        assert_eq!(agent.rewards.last(), Some(&0.5));
        assert_eq!(agent.episodes_ended, 1);
        assert_eq!(coordinator.episodes_completed(), 1);
        assert!(!coordinator.tracker().has_started());
    }

    #[test]
    fn test_step_penalty_applies_every_tick() {
        let mut coordinator = get_coordinator(4, 2);
        coordinator.schedule.step_penalty = -0.5;
        let mut agent = RecordingAgent::default();

        coordinator.tick(0.1, &mut agent);
        coordinator.tick(0.1, &mut agent);
        assert_eq!(agent.rewards, vec![-0.5, -0.5]);
    }

    #[test]
    fn test_out_of_range_checkpoint_is_an_error() {
        let mut coordinator = get_coordinator(4, 2);
        let mut agent = RecordingAgent::default();
        assert!(coordinator.on_checkpoint_reached(9, &mut agent).is_err());
        assert!(agent.rewards.is_empty());
    }

    #[test]
    fn test_observation_points_at_next_checkpoint() {
        let mut coordinator = get_coordinator(4, 2);
        let mut agent = RecordingAgent::default();
        assert_eq!(coordinator.next_target().index, 0);

        coordinator.on_checkpoint_reached(0, &mut agent).unwrap();
        assert_eq!(coordinator.next_target().index, 1);
        let observation = coordinator.observation_to_target(DVec3::new(0.0, 0.0, 10.0));
        assert!(observation.abs_diff_eq(DVec3::new(0.0, 0.0, 0.5), 1e-9));
    }
}
