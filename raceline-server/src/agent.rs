use glam::DVec3;
use raceline_core::episode::LearningAgent;
use raceline_core::progress::lap_info::CheckpointIndex;
use tracing::{info, trace};

// Stands in for the learning runtime: keeps score and logs episode boundaries.
#[derive(Default, Debug)]
pub struct TelemetryAgent {
    pub episode_reward: f32,
    pub total_reward: f32,
    pub episodes: u32,

    // what a policy would be fed this tick
    pub last_observation: DVec3,
    pub checkpoint_ahead: Option<CheckpointIndex>,
}

impl TelemetryAgent {
    pub fn observe(&mut self, to_target: DVec3, checkpoint_ahead: Option<CheckpointIndex>) {
        trace!(?to_target, ?checkpoint_ahead, "observation");
        self.last_observation = to_target;
        self.checkpoint_ahead = checkpoint_ahead;
    }
}

impl LearningAgent for TelemetryAgent {
    fn add_reward(&mut self, reward: f32) {
        self.episode_reward += reward;
        self.total_reward += reward;
    }

    fn end_episode(&mut self) {
        info!(
            episode = self.episodes,
            reward = self.episode_reward,
            "episode ended"
        );
        self.episodes += 1;
        self.episode_reward = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewards_accumulate_per_episode() {
        let mut agent = TelemetryAgent::default();
        agent.add_reward(0.5);
        agent.add_reward(0.25);
        agent.end_episode();
        agent.add_reward(-1.0);

        assert_eq!(agent.episodes, 1);
        assert_eq!(agent.episode_reward, -1.0);
        assert_eq!(agent.total_reward, -0.25);
    }

    #[test]
    fn test_observation_keeps_the_latest_values() {
        let mut agent = TelemetryAgent::default();
        assert_eq!(agent.checkpoint_ahead, None);

        agent.observe(DVec3::new(1.0, 0.0, 0.5), Some(4));
        agent.observe(DVec3::new(0.5, 0.0, 0.25), Some(5));
        assert_eq!(agent.last_observation, DVec3::new(0.5, 0.0, 0.25));
        assert_eq!(agent.checkpoint_ahead, Some(5));
    }
}
