use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::ensure;
use ordinal::Ordinal;
use rand::Rng;
use raceline_core::episode::EpisodeCoordinator;
use raceline_core::progress::{CheckpointOutcome, ProgressTracker};
use raceline_core::race::Race;
use raceline_core::{RacerID, Settings};
use tracing::{debug, info, warn};

use crate::agent::TelemetryAgent;
use crate::checkpoints::CheckpointVolume;
use crate::physics::trigger_entity::TriggerEntity;
use crate::racer::{get_racer_start_properties, RacerEntity};
use crate::track::TrackLayout;

use self::phase::RacePhase;
use self::results::{final_standings, RaceResults, RacerResult, TraineeSummary};

mod phase;
pub mod results;


// one racer whose progress is also fed to a learning agent
struct Trainee {
    racer: RacerID,
    coordinator: EpisodeCoordinator,
    agent: TelemetryAgent,
}

pub struct RaceServer {
    settings: Settings,
    track_name: String,
    race: Race,
    racers: Vec<RacerEntity>,
    volumes: Vec<CheckpointVolume>,
    phase: RacePhase,
    trainee: Option<Trainee>,
    finish_ticks: Vec<Option<u64>>,
    tick: u64,
}

impl RaceServer {
    pub fn new(layout: &TrackLayout, settings: &Settings) -> anyhow::Result<RaceServer> {
        ensure!(settings.server_tick_ms > 0, "server_tick_ms must be positive");
        ensure!(settings.racer_amount > 0, "a race needs at least one racer");

        // everything below shares this one checkpoint set
        let checkpoints = Arc::new(layout.checkpoint_set()?);
        let mut race = Race::new(checkpoints.clone(), settings.progress_rules())?;

        let mut rng = rand::thread_rng();
        let jitter = settings.driver_rate_jitter.abs();
        let racers: Vec<RacerEntity> = (0..settings.racer_amount)
            .map(|_| {
                let id = race.add_racer();
                let travel_rate =
                    settings.driver_travel_rate * (1.0 + rng.gen_range(-jitter..=jitter));
                let racer = get_racer_start_properties(id, layout.centerline(), travel_rate);
                debug!(racer = id, travel_rate = racer.driver.travel_rate(), "racer on the grid");
                racer
            })
            .collect();

        let trainee = settings.trainee_enabled.then(|| Trainee {
            racer: 0,
            coordinator: EpisodeCoordinator::new(
                ProgressTracker::new(checkpoints, settings.progress_rules()),
                settings.reward_schedule(),
            ),
            agent: TelemetryAgent::default(),
        });

        info!(
            track = %layout.name,
            racers = racers.len(),
            "race server ready"
        );

        Ok(RaceServer {
            settings: settings.clone(),
            track_name: layout.name.clone(),
            race,
            finish_ticks: vec![None; racers.len()],
            racers,
            volumes: layout.volumes(),
            phase: RacePhase::CountingDownToStart {
                ticks_left: settings.countdown_ticks,
            },
            trainee,
            tick: 0,
        })
    }

    fn time_step(&self) -> f64 {
        self.settings.server_tick_ms as f64 / 1000.0
    }

    /// Runs ticks until everyone has finished or the tick limit is hit.
    pub fn start_loop(&mut self) -> RaceResults {
        let max_server_tick_duration = Duration::from_millis(self.settings.server_tick_ms);

        while !self.phase.is_done() && self.tick < self.settings.max_race_ticks {
            let start_time = Instant::now();

            self.simulate_tick();

            if self.settings.realtime {
                // wait until server tick time has elapsed
                match max_server_tick_duration.checked_sub(start_time.elapsed()) {
                    Some(remaining_tick_duration) => thread::sleep(remaining_tick_duration),
                    None => warn!(tick = self.tick, "server tick took longer than configured length"),
                }
            }
        }

        if !self.phase.is_done() {
            warn!(
                ticks = self.tick,
                "tick limit reached before every racer finished"
            );
        }

        self.results()
    }

    pub fn simulate_tick(&mut self) {
        match self.phase {
            RacePhase::CountingDownToStart { ticks_left } => {
                if ticks_left == 0 {
                    info!("go!");
                    self.phase = RacePhase::Racing;
                } else {
                    debug!(ticks_left, "counting down");
                    self.phase = RacePhase::CountingDownToStart {
                        ticks_left: ticks_left - 1,
                    };
                }
            }
            RacePhase::Racing => {
                self.simulate_racing();
                if self.race.all_finished() {
                    info!(ticks = self.tick, "all racers done");
                    self.phase = RacePhase::AllRacersDone;
                }
            }
            RacePhase::AllRacersDone => {}
        }

        self.tick += 1;
    }

    fn simulate_racing(&mut self) {
        let time_step = self.time_step();

        for racer in self.racers.iter_mut() {
            racer.drive(time_step);
            racer.detect_triggers(self.volumes.iter().map(|v| v as &dyn TriggerEntity));
        }

        self.dispatch_checkpoint_events();

        for racer in &self.racers {
            let position = racer.entity_location.position;
            if let Err(e) = self.race.observe_position(racer.id, position) {
                warn!("{}", e);
            }

            if let Some(trainee) = self.trainee.as_mut().filter(|t| t.racer == racer.id) {
                trainee.coordinator.observe_position(position);
                let ahead = trainee
                    .coordinator
                    .tracker()
                    .checkpoints()
                    .closest_index_in_front(position, racer.entity_location.unit_steer_direction);
                trainee
                    .agent
                    .observe(trainee.coordinator.observation_to_target(position), ahead);
                if !racer.parked {
                    trainee.coordinator.tick(time_step, &mut trainee.agent);
                }
            }
        }

        self.race.recompute_rankings();

        let interval = self.settings.standings_log_interval;
        if interval > 0 && self.tick % interval == 0 {
            self.log_standings();
        }
    }

    // hand every queued trigger to the race, in the order they fired
    fn dispatch_checkpoint_events(&mut self) {
        for racer in self.racers.iter_mut() {
            for index in racer.take_reached_checkpoints() {
                match self.race.on_checkpoint_reached(racer.id, index) {
                    Ok(CheckpointOutcome::LapCompleted { lap }) => {
                        info!(racer = racer.id, lap, "lap completed");
                    }
                    Ok(CheckpointOutcome::LapRevoked { lap, .. }) => {
                        info!(racer = racer.id, lap, "crossed the finish line backwards");
                    }
                    Ok(CheckpointOutcome::Finished { .. }) => {
                        self.finish_ticks[racer.id] = Some(self.tick);
                        racer.parked = true;
                    }
                    Ok(_) => {}
                    Err(e) => warn!(racer = racer.id, "{}", e),
                }

                if let Some(trainee) = self.trainee.as_mut().filter(|t| t.racer == racer.id) {
                    if let Err(e) = trainee
                        .coordinator
                        .on_checkpoint_reached(index, &mut trainee.agent)
                    {
                        warn!(racer = racer.id, "{}", e);
                    }
                }
            }
        }
    }

    fn log_standings(&self) {
        for standing in self.race.standings() {
            let lap = self
                .race
                .tracker(standing.racer)
                .map(ProgressTracker::display_lap)
                .unwrap_or(0);
            info!(
                tick = self.tick,
                racer = standing.racer,
                place = %Ordinal(standing.placement),
                lap,
                total_laps = self.settings.total_laps,
                progress = standing.total_progress,
                "standing"
            );
        }
    }

    pub fn results(&self) -> RaceResults {
        // the stored snapshot is empty until the first racing tick
        let live: Vec<RacerResult> = self
            .race
            .current_standings()
            .iter()
            .map(|standing| RacerResult {
                racer: standing.racer,
                placement: standing.placement,
                placement_label: String::new(),
                laps: self.race.lap_number(standing.racer).unwrap_or(0),
                finished: self.race.has_finished(standing.racer),
                finish_tick: self.finish_ticks.get(standing.racer).copied().flatten(),
                total_progress: standing.total_progress,
            })
            .collect();

        RaceResults {
            track: self.track_name.clone(),
            ticks: self.tick,
            completed: self.phase.is_done(),
            standings: final_standings(live),
            trainee: self.trainee.as_ref().map(|trainee| TraineeSummary {
                racer: trainee.racer,
                episodes_completed: trainee.coordinator.episodes_completed(),
                total_reward: trainee.agent.total_reward,
            }),
        }
    }

    #[cfg(test)]
    pub fn race(&self) -> &Race {
        &self.race
    }

    #[cfg(test)]
    pub fn racers(&self) -> &[RacerEntity] {
        &self.racers
    }

    #[cfg(test)]
    pub fn trainee_agent(&self) -> Option<&TelemetryAgent> {
        self.trainee.as_ref().map(|trainee| &trainee.agent)
    }

    #[cfg(test)]
    pub fn is_done(&self) -> bool {
        self.phase.is_done()
    }
}
