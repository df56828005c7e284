use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use navgrid::{Cell, PathCacheStats, RgbaFrame, Vec2};
use thiserror::Error;
use tracing::{debug, error, info};

use super::config::{
    load_config, resolve_config_source, ConfigError, PointerSpace, ScriptedPointer, CONFIG_ENV_VAR,
};
use super::demo_map::{demo_chart, demo_script};
use super::session::Session;
use super::snapshot::{write_png, SnapshotError};
use super::tmx::{load_tmx, TmxError};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct RunOptions {
    pub(crate) config_path: Option<PathBuf>,
    pub(crate) map_path: Option<PathBuf>,
    pub(crate) snapshot_path: Option<PathBuf>,
    pub(crate) max_ticks: Option<u64>,
}

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Map(#[from] TmxError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct RunSummary {
    pub(crate) ticks: u64,
    pub(crate) ship_cell: Cell,
    pub(crate) arrivals: u32,
    pub(crate) camera_scale: f32,
    pub(crate) cache: PathCacheStats,
}

pub(crate) fn run(options: RunOptions) -> ExitCode {
    match run_voyage(options) {
        Ok(summary) => {
            info!(
                ticks = summary.ticks,
                ship_cell = ?summary.ship_cell,
                arrivals = summary.arrivals,
                camera_scale = summary.camera_scale,
                cache_hits = summary.cache.hits,
                cache_misses = summary.cache.misses,
                "voyage_finished"
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "voyage_failed");
            ExitCode::FAILURE
        }
    }
}

fn run_voyage(options: RunOptions) -> Result<RunSummary, AppError> {
    let source = resolve_config_source(options.config_path.as_deref(), env::var_os(CONFIG_ENV_VAR));
    let mut config = load_config(&source)?;

    let (map, mut script) = match &options.map_path {
        Some(path) => (load_tmx(path)?, std::mem::take(&mut config.script)),
        None => {
            let script = if config.script.is_empty() {
                demo_script()
            } else {
                std::mem::take(&mut config.script)
            };
            (demo_chart(), script)
        }
    };
    script.sort_by_key(|event| event.tick);

    let mut session = Session::new(&map, &config);
    let max_ticks = options.max_ticks.unwrap_or(config.max_ticks);
    let fixed_dt = Duration::from_secs_f64(1.0 / f64::from(config.target_tps));
    let summary = drive(&mut session, &script, max_ticks, fixed_dt);

    if let Some(path) = &options.snapshot_path {
        let viewport = session.viewport();
        let mut frame = RgbaFrame::new(viewport.width, viewport.height);
        session.render(&mut frame);
        write_png(frame, path)?;
    }
    Ok(summary)
}

/// Steps the session at a fixed timestep, firing scripted pointer events on
/// their tick. Stops at `max_ticks`, or once the script is spent and the
/// ship has nothing left to sail.
pub(crate) fn drive(
    session: &mut Session,
    script: &[ScriptedPointer],
    max_ticks: u64,
    fixed_dt: Duration,
) -> RunSummary {
    let dt_seconds = fixed_dt.as_secs_f32();
    let mut pending = script.iter().peekable();
    let mut ticks = 0u64;

    while ticks < max_ticks {
        while let Some(event) = pending.next_if(|event| event.tick <= ticks) {
            apply_event(session, event);
        }
        if pending.peek().is_none() && session.is_idle() {
            break;
        }
        session.tick(dt_seconds);
        ticks = ticks.saturating_add(1);
    }

    RunSummary {
        ticks,
        ship_cell: session.ship().cell,
        arrivals: session.arrivals(),
        camera_scale: session.camera().scale,
        cache: session.cache_stats(),
    }
}

fn apply_event(session: &mut Session, event: &ScriptedPointer) {
    if event.zoom_steps != 0 {
        session.zoom(event.zoom_steps);
    }
    let screen = match event.space {
        PointerSpace::Screen => Vec2::new(event.x, event.y),
        PointerSpace::Grid => {
            session.cell_center_screen(Cell::new(event.x.floor() as i32, event.y.floor() as i32))
        }
    };
    session.pointer_moved(screen);
    debug!(
        tick = event.tick,
        x = screen.x,
        y = screen.y,
        click = event.click,
        hover_steps = session.hover_path().len(),
        "pointer_event"
    );
    if event.click {
        session.click(screen);
    }
}
