use raceline_core::GLOBAL_CONFIG;
use tracing::warn;
use tracing_subscriber::filter::EnvFilter;

mod agent;
mod checkpoints;
mod driver;
mod game;
mod physics;
mod racer;
mod track;

use track::TrackLayout;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let layout = match TrackLayout::load(&GLOBAL_CONFIG.track_file) {
        Ok(layout) => layout,
        Err(e) => {
            warn!("{:#}; falling back to the built-in oval", e);
            TrackLayout::oval(12, 60.0, 30.0)
        }
    };

    // kick off the race loop; returns once everyone is done or time runs out
    let mut server = game::RaceServer::new(&layout, &GLOBAL_CONFIG)?;
    let results = server.start_loop();

    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}
