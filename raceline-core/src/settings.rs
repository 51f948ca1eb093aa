use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File};
use lazy_static::lazy_static;
use serde::Deserialize;

use crate::episode::RewardSchedule;
use crate::progress::lap_info::{LapNumber, ProgressRules};

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub server_tick_ms: u64,
    // sleep out the rest of each tick instead of simulating flat out
    pub realtime: bool,
    pub max_race_ticks: u64,
    pub countdown_ticks: u64,
    pub racer_amount: usize,
    pub track_file: String,
    pub trainee_enabled: bool,
    pub standings_log_interval: u64,

    // fraction of a lap per second, and how much each driver may deviate from it
    pub driver_travel_rate: f64,
    pub driver_rate_jitter: f64,

    pub total_laps: LapNumber,
    pub forward_skip_tolerance: usize,
    pub backward_finish_line_window: usize,

    pub max_time_to_reach_next_checkpoint: f64,
    pub checkpoint_reward: f32,
    pub lap_reward: f32,
    pub finish_reward: f32,
    pub timeout_penalty: f32,
    pub step_penalty: f32,
}

impl Settings {
    fn new() -> Result<Settings, ConfigError> {
        Settings::from_file("config.yaml")
    }

    // values in `path` override the defaults; a missing file is fine
    pub fn from_file(path: &str) -> Result<Settings, ConfigError> {
        Settings::builder()?
            .add_source(File::with_name(path).required(false))
            .build()?
            .try_deserialize()
    }

    fn builder() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("server_tick_ms", 30)?
            .set_default("realtime", true)?
            .set_default("max_race_ticks", 20_000)?
            .set_default("countdown_ticks", 3)?
            .set_default("racer_amount", 4)?
            .set_default("track_file", "tracks/oval.yaml")?
            .set_default("trainee_enabled", true)?
            .set_default("standings_log_interval", 100)?
            .set_default("driver_travel_rate", 0.05)?
            .set_default("driver_rate_jitter", 0.1)?
            .set_default("total_laps", 3)?
            .set_default("forward_skip_tolerance", 5)?
            .set_default("backward_finish_line_window", 3)?
            .set_default("max_time_to_reach_next_checkpoint", 30.0)?
            .set_default("checkpoint_reward", 0.03)?
            .set_default("lap_reward", 0.3)?
            .set_default("finish_reward", 0.5)?
            .set_default("timeout_penalty", -1.0)?
            .set_default("step_penalty", -0.0003)
    }

    pub fn progress_rules(&self) -> ProgressRules {
        ProgressRules::new(
            self.total_laps,
            self.forward_skip_tolerance,
            self.backward_finish_line_window,
        )
    }

    pub fn reward_schedule(&self) -> RewardSchedule {
        RewardSchedule {
            max_time_to_reach_next_checkpoint: self.max_time_to_reach_next_checkpoint,
            checkpoint_reward: self.checkpoint_reward,
            lap_reward: self.lap_reward,
            finish_reward: self.finish_reward,
            timeout_penalty: self.timeout_penalty,
            step_penalty: self.step_penalty,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings::builder()
            .and_then(|builder| builder.build())
            .and_then(|config| config.try_deserialize())
            .expect("built-in settings defaults should always deserialize")
    }
}

lazy_static! {
    pub static ref GLOBAL_CONFIG: Settings = Settings::new().expect("failed to read config file");
}
