use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::Deserialize;
use sitemark::camera::Point;
use sitemark::config::{ConfigError, EditorConfig};
use sitemark::doc::{Data, DeviceType, MarkerType};
use sitemark::draw::ShapeTool;
use sitemark::engine::{Action, EngineCore};
use sitemark::input::{Button, Key, Modifiers, Tool};
use sitemark::inventory::InventoryError;
use sitemark::store::{Store, StoreError};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("config: {0}")]
    Config(#[from] ConfigError),
    #[error("cannot read {}: {source}", path.display())]
    Read { path: PathBuf, source: std::io::Error },
    #[error("cannot write {}: {source}", path.display())]
    Write { path: PathBuf, source: std::io::Error },
    #[error("snapshot: {0}")]
    Store(#[from] StoreError),
    #[error("invalid script: {0}")]
    Script(#[from] serde_json::Error),
    #[error("project {project} is inconsistent: {source}")]
    Invalid { project: Uuid, source: InventoryError },
    #[error("no floorplan with id {0} in the active project")]
    UnknownFloorplan(Uuid),
}

#[derive(Parser, Debug)]
#[command(name = "sitemark", about = "Inspect and replay floorplan markup snapshots")]
struct Cli {
    /// User id stamped on audit entries (overrides `SITEMARK_USER_ID`).
    #[arg(long, env = "SITEMARK_USER_ID")]
    user_id: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Summarize a snapshot and check its invariants.
    Inspect { snapshot: PathBuf },
    /// Apply a JSON script of editor steps to a snapshot.
    Replay {
        snapshot: PathBuf,
        script: PathBuf,
        #[arg(long, short, help = "Output path; defaults to stdout")]
        output: Option<PathBuf>,
    },
}

/// One scripted editor step. Coordinates are screen pixels.
#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
enum Step {
    Tool { tool: ScriptTool },
    Floorplan { id: Uuid },
    Page { page: u32 },
    Click { x: f64, y: f64, #[serde(default)] shift: bool, #[serde(default)] time: u64 },
    Drag { from: [f64; 2], to: [f64; 2] },
    Key { key: String, #[serde(default)] ctrl: bool, #[serde(default)] shift: bool },
    Text { text: String },
    Rotate { degrees: f64 },
    Style { patch: Data },
    Bulk { patch: Data },
    Undo,
    Redo,
    Duplicate,
    Delete,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
enum ScriptTool {
    Select,
    Device {
        #[serde(rename = "deviceType")]
        device_type: DeviceType,
    },
    Marker {
        #[serde(rename = "markerType")]
        marker_type: MarkerType,
    },
    Text,
    Freehand,
    Rectangle,
    Conduit,
}

impl From<ScriptTool> for Tool {
    fn from(tool: ScriptTool) -> Self {
        match tool {
            ScriptTool::Select => Tool::Select,
            ScriptTool::Device { device_type } => Tool::Device(device_type),
            ScriptTool::Marker { marker_type } => Tool::Marker(marker_type),
            ScriptTool::Text => Tool::Text,
            ScriptTool::Freehand => Tool::Shape(ShapeTool::Freehand),
            ScriptTool::Rectangle => Tool::Shape(ShapeTool::Rectangle),
            ScriptTool::Conduit => Tool::Shape(ShapeTool::Conduit),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut config = EditorConfig::from_env()?;
    if let Some(user_id) = cli.user_id {
        config.user_id = user_id;
    }

    match cli.command {
        Command::Inspect { snapshot } => run_inspect(&config, &snapshot).await,
        Command::Replay { snapshot, script, output } => run_replay(config, &snapshot, &script, output).await,
    }
}

async fn read(path: &Path) -> Result<String, CliError> {
    tokio::fs::read_to_string(path).await.map_err(|source| CliError::Read { path: path.to_path_buf(), source })
}

async fn run_inspect(config: &EditorConfig, snapshot: &Path) -> Result<(), CliError> {
    let store = Store::from_json(&read(snapshot).await?, config.user_id.clone(), config.history_limit)?;
    for project in &store.state().projects {
        println!(
            "project {} {:?}: {} pooled, {} audit entries",
            project.id,
            project.name,
            project.pool.len(),
            project.audit_log.len()
        );
        for floorplan in &project.floorplans {
            println!(
                "  floorplan {} {:?}: {} pages, {} edits, {} placed",
                floorplan.id,
                floorplan.name,
                floorplan.page_count,
                floorplan.inventory.len(),
                floorplan.placed_edit_ids.len()
            );
        }
        project.validate().map_err(|source| CliError::Invalid { project: project.id, source })?;
    }
    println!("ok");
    Ok(())
}

async fn run_replay(
    config: EditorConfig,
    snapshot: &Path,
    script: &Path,
    output: Option<PathBuf>,
) -> Result<(), CliError> {
    let store = Store::from_json(&read(snapshot).await?, config.user_id.clone(), config.history_limit)?;
    let steps: Vec<Step> = serde_json::from_str(&read(script).await?)?;
    let mut core = EngineCore::new(store, config);

    for (index, step) in steps.into_iter().enumerate() {
        let actions = apply_step(&mut core, step)?;
        report(index, &actions);
    }

    let json = core.store.to_json()?;
    match output {
        Some(path) => {
            tokio::fs::write(&path, json).await.map_err(|source| CliError::Write { path: path.clone(), source })?;
            tracing::info!(path = %path.display(), "snapshot written");
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn apply_step(core: &mut EngineCore, step: Step) -> Result<Vec<Action>, CliError> {
    let none = Modifiers::default();
    let actions = match step {
        Step::Tool { tool } => core.set_tool(tool.into()),
        Step::Floorplan { id } => {
            let exists = core.store.active_project().is_some_and(|p| p.floorplan(id).is_some());
            if !exists {
                return Err(CliError::UnknownFloorplan(id));
            }
            core.select_floorplan(id)
        }
        Step::Page { page } => core.set_page(page),
        Step::Click { x, y, shift, time } => {
            let modifiers = Modifiers { shift, ..Default::default() };
            let at = Point::new(x, y);
            let mut actions = core.on_pointer_down(at, Button::Primary, modifiers, time);
            actions.extend(core.on_pointer_up(at, Button::Primary, modifiers));
            actions
        }
        Step::Drag { from, to } => {
            let (from, to) = (Point::new(from[0], from[1]), Point::new(to[0], to[1]));
            let mut actions = core.on_pointer_down(from, Button::Primary, none, 0);
            actions.extend(core.on_pointer_move(to, none));
            actions.extend(core.on_pointer_up(to, Button::Primary, none));
            actions
        }
        Step::Key { key, ctrl, shift } => core.on_key_down(Key(key), Modifiers { ctrl, shift, ..Default::default() }),
        Step::Text { text } => core.commit_text_edit(&text),
        Step::Rotate { degrees } => core.rotate_selection(degrees),
        Step::Style { patch } => core.apply_style(&patch),
        Step::Bulk { patch } => {
            let changed: BTreeSet<String> = patch.keys().cloned().collect();
            core.bulk_edit(&patch, &changed)
        }
        Step::Undo => core.undo(),
        Step::Redo => core.redo(),
        Step::Duplicate => core.duplicate(),
        Step::Delete => core.delete_selection(),
    };
    Ok(actions)
}

fn report(index: usize, actions: &[Action]) {
    for action in actions {
        match action {
            Action::Notice(message) => tracing::warn!(step = index, %message, "step rejected"),
            Action::PurgeAttachments(ids) => tracing::info!(step = index, ?ids, "attachments orphaned"),
            Action::EditsCreated(ids) => tracing::debug!(step = index, count = ids.len(), "edits created"),
            Action::EditsUpdated(ids) => tracing::debug!(step = index, count = ids.len(), "edits updated"),
            Action::EditsDeleted(ids) => tracing::debug!(step = index, count = ids.len(), "edits deleted"),
            Action::RenderNeeded | Action::SelectionChanged(_) | Action::OpenEditor(_) => {}
        }
    }
}
