//! Headless replay: hydrate a board, feed it recorded input, print the result.
//!
//! Environment:
//! - `EVENTS_PATH` (required): JSON array of input events
//! - `SCENE_PATH` (optional): starting scene snapshot; image sources resolve relative to it
//! - `SCREEN_WIDTH` / `SCREEN_HEIGHT`: host surface size for fit-to-view, default 1280 x 800
//! - `BOARD_*`: see `BoardConfig::from_env`
//!
//! The final snapshot is printed to stdout; logs go to stderr.

use std::path::{Path, PathBuf};

use tokio::runtime::Handle;
use whiteboard::board::Board;
use whiteboard::config::{BoardConfig, env_parse};
use whiteboard::engine::Engine;
use whiteboard::input::InputEvent;
use whiteboard::plugins;
use whiteboard::resource::ResourceLoader;
use whiteboard::snapshot::{SceneSnapshot, SnapshotError};

#[derive(Debug, thiserror::Error)]
enum ReplayError {
    #[error("EVENTS_PATH is required")]
    MissingEvents,
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid events in {path}: {source}")]
    Events {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

async fn read(path: &Path) -> Result<String, ReplayError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ReplayError::Read { path: path.to_path_buf(), source })
}

#[tokio::main]
async fn main() -> Result<(), ReplayError> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let events_path = PathBuf::from(std::env::var("EVENTS_PATH").map_err(|_| ReplayError::MissingEvents)?);
    let screen_width = env_parse("SCREEN_WIDTH", 1280.0);
    let screen_height = env_parse("SCREEN_HEIGHT", 800.0);

    let mut board = Board::new(BoardConfig::from_env());
    board.set_screen_size(screen_width, screen_height);

    let mut loader = ResourceLoader::new(Handle::current());
    if let Ok(scene_path) = std::env::var("SCENE_PATH") {
        let scene_path = PathBuf::from(scene_path);
        let snapshot = SceneSnapshot::from_json(&read(&scene_path).await?)?;
        board.hydrate(snapshot)?;
        if let Some(dir) = scene_path.parent() {
            loader = loader.with_base_dir(dir);
        }
    }

    let events: Vec<InputEvent> = serde_json::from_str(&read(&events_path).await?)
        .map_err(|source| ReplayError::Events { path: events_path.clone(), source })?;

    let mut engine = Engine::new(board, plugins::default_pipeline(), loader);
    let mut consumed = 0_usize;
    for event in &events {
        if engine.handle(event).is_some() {
            consumed += 1;
        }
        engine.poll_resources();
    }
    let report = engine.settle_resources().await;

    tracing::info!(
        events = events.len(),
        consumed,
        elements = engine.board.scene().len(),
        undo_depth = engine.board.history().undo_len(),
        resources_applied = report.applied,
        resources_stale = report.stale,
        resources_failed = report.failed,
        "replay finished"
    );
    println!("{}", engine.board.snapshot().to_json()?);
    Ok(())
}
