use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use itertools::Itertools;
use tokio::time::{sleep, Duration};

use waypost::log::{self, Log, LogSeverity, Message};
use waypost::map::{IconSet, Projection};
use waypost::markers::{self, ResourceLayerKind, TravelPaths};
use waypost::models::reminder::ReminderDraft;
use waypost::models::zone::{zone_options, PlayerState, ZoneIndex};
use waypost::reminders::grid::GridRow;
use waypost::reminders::queue::{ReminderCommand, RequestQueue, TaskOutcome, TaskPriority};
use waypost::reminders::worker::ReminderWorker;
use waypost::reminders::{HttpReminderApi, ReminderEditor, ReminderStore, SaveOutcome, ZoneReminderDisplay};
use waypost::settings::Settings;
use waypost::steward::Steward;
use waypost::dataset;

const USAGE: &str = "Usage: waypost <command>\n\n\
Commands:\n  \
layers [--json]                 render travel and resource layers\n  \
reminders [--zone <id>]         list zone reminders\n  \
reminders save <file.json>      replace reminders with the drafts in a file\n  \
zones                           list zone choices\n  \
watch [--zone <id>]             keep the reminder cache fresh until Ctrl-C";

const WORKER_LABEL: &str = "REMINDERS";
const LOG_LABEL: &str = "LOG";

struct TracingDisplay {
    zone_names: HashMap<u32, String>,
}

impl ZoneReminderDisplay for TracingDisplay {
    fn show(&self, map_id: u32, reminders: &[String]) {
        let zone = self
            .zone_names
            .get(&map_id)
            .map(String::as_str)
            .unwrap_or("unknown zone");
        for reminder in reminders {
            tracing::info!("Reminder for {} ({}): {}", zone, map_id, reminder);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let config_path = std::env::var("WAYPOST_CONFIG").ok();
    let settings = Settings::load(config_path.as_deref().map(Path::new))?;
    log::init_tracing(&settings.log_filter);
    tracing::debug!("Loaded settings: {:?}", settings);

    match args.get(1).map(String::as_str) {
        Some("layers") => run_layers(&settings, flag(&args, "--json")),
        Some("reminders") if args.get(2).map(String::as_str) == Some("save") => {
            let file = args
                .get(3)
                .ok_or_else(|| anyhow!("reminders save requires a file"))?;
            run_save(&settings, Path::new(file)).await
        }
        Some("reminders") => run_reminders(&settings, zone_arg(&args)?).await,
        Some("zones") => run_zones(&settings),
        Some("watch") => run_watch(settings, zone_arg(&args)?).await,
        _ => bail!(USAGE),
    }
}

fn flag(args: &[String], name: &str) -> bool {
    args.iter().any(|a| a == name)
}

fn zone_arg(args: &[String]) -> Result<Option<u32>> {
    match args.iter().position(|a| a == "--zone") {
        Some(idx) => {
            let value = args
                .get(idx + 1)
                .ok_or_else(|| anyhow!("--zone requires a value"))?;
            let id = value
                .parse()
                .with_context(|| format!("invalid zone id {}", value))?;
            Ok(Some(id))
        }
        None => Ok(None),
    }
}

fn load_zones(settings: &Settings) -> Result<ZoneIndex> {
    match &settings.zones {
        Some(path) => Ok(ZoneIndex::new(dataset::load_json(path)?)),
        None => Ok(ZoneIndex::default()),
    }
}

fn load_travel_paths(settings: &Settings, zones: &ZoneIndex) -> Result<TravelPaths> {
    if let Some(raw_path) = &settings.raw_connections {
        let raw: markers::RawConnections = dataset::load_json(raw_path)?;
        return Ok(markers::build_travel_paths(&raw, zones));
    }
    match &settings.travel_paths {
        Some(path) => Ok(dataset::load_json(path)?),
        None => Ok(TravelPaths::default()),
    }
}

fn run_layers(settings: &Settings, as_json: bool) -> Result<()> {
    let zones = load_zones(settings)?;
    let icons = IconSet::standard(&settings.icon_base_url);
    let projection = Projection::new(settings.max_zoom);

    let paths = load_travel_paths(settings, &zones)?;
    let travel = markers::render_travel_markers(&paths, &icons, &projection);
    let resource_data = dataset::load_resource_data(&settings.resource_glob)?;
    let resources = markers::render_resource_markers(&resource_data, &icons, &projection);

    if as_json {
        let mut layers = serde_json::Map::new();
        layers.insert(
            travel.group.name().to_string(),
            serde_json::to_value(travel.group.markers())?,
        );
        for kind in ResourceLayerKind::ALL {
            let group = resources.group(kind);
            layers.insert(group.name().to_string(), serde_json::to_value(group.markers())?);
        }
        println!("{}", serde_json::to_string_pretty(&layers)?);
        return Ok(());
    }

    println!(
        "{}: {} markers ({} pairs, {} skipped)",
        travel.group.name(),
        travel.group.len(),
        travel.report.rendered_pairs,
        travel.report.skipped.len()
    );
    for skipped in &travel.report.skipped {
        println!("  skipped {} #{}: {}", skipped.category, skipped.index, skipped.reason);
    }
    for kind in ResourceLayerKind::ALL {
        let group = resources.group(kind);
        println!(
            "{}: {} markers{}",
            group.name(),
            group.len(),
            if group.is_hidden() { " (hidden)" } else { "" }
        );
    }
    if !resources.skipped_entries.is_empty() {
        println!("skipped resources: {}", resources.skipped_entries.join(", "));
    }
    Ok(())
}

fn run_zones(settings: &Settings) -> Result<()> {
    let zones = load_zones(settings)?;
    for option in zone_options(&zones.names()) {
        println!("{:>5}  {}", option.value, option.label);
    }
    Ok(())
}

fn build_editor(
    settings: &Settings,
    store: ReminderStore,
    zone: Option<u32>,
) -> Result<ReminderEditor<HttpReminderApi, TracingDisplay>> {
    let zone_names = load_zones(settings)?.names();
    let api = HttpReminderApi::new(&settings.api_base_url, settings.request_timeout())?;
    let display = TracingDisplay {
        zone_names: zone_names.clone(),
    };
    let mut editor = ReminderEditor::new(api, display, store, PlayerState::new(zone_names));
    if let Some(map_id) = zone {
        editor.set_current_zone(map_id);
    }
    Ok(editor)
}

async fn run_reminders(settings: &Settings, zone: Option<u32>) -> Result<()> {
    let mut editor = build_editor(settings, ReminderStore::new(), zone)?;
    let count = editor.load_reminders().await?;
    if count == 0 {
        println!("No zone reminders configured");
        return Ok(());
    }
    let snapshot = editor.snapshot();
    for map_id in snapshot.zones().sorted() {
        let name = editor.player().zone_name(map_id).unwrap_or("unknown zone");
        println!("{} ({}):", name, map_id);
        for text in snapshot.reminders_for(map_id) {
            println!("  - {}", text);
        }
    }
    Ok(())
}

async fn run_save(settings: &Settings, file: &Path) -> Result<()> {
    let drafts: Vec<ReminderDraft> = dataset::load_json(file)?;
    let mut editor = build_editor(settings, ReminderStore::new(), None)?;
    editor.open_edit_modal().await?;
    editor.grid_mut().replace_rows(
        drafts
            .iter()
            .map(|d| GridRow::new(d.map_id, d.text.to_string()))
            .collect(),
    );
    match editor.save_reminders().await? {
        SaveOutcome::NothingToSave => {
            editor.close_edit_modal();
            println!("Nothing to save");
        }
        SaveOutcome::Saved { count, .. } => println!("Saved {} zone reminders", count),
    }
    Ok(())
}

async fn run_watch(settings: Settings, zone: Option<u32>) -> Result<()> {
    // Setup ctrl-c handling
    let quit = Arc::new(AtomicBool::new(false));
    let q = quit.clone();
    ctrlc::set_handler(move || {
        q.store(true, Ordering::SeqCst);
    })
    .context("Error setting Ctrl-C handler")?;

    // Create SPMC command channel, used to gracefully shutdown tasks
    let (cmd_tx, cmd_rx) = tokio::sync::watch::channel("run".to_string());
    let steward = Steward::new(cmd_tx);

    let (log_tx, log_rx) = tokio::sync::mpsc::channel(settings.log_channel_size);
    let mut log_object = Log::new(LOG_LABEL.to_string(), cmd_rx.clone(), log_rx);
    steward.process_start(LOG_LABEL);
    let log_steward = steward.clone();
    tokio::spawn(async move { log_object.initialize(log_steward).await });

    let store = ReminderStore::new();
    let queue = RequestQueue::new();
    let editor = build_editor(&settings, store.clone(), zone)?;
    let worker = ReminderWorker::new(
        WORKER_LABEL.to_string(),
        editor,
        queue.clone(),
        cmd_rx.clone(),
        log_tx.clone(),
        settings.refresh_interval(),
    );
    steward.process_start(WORKER_LABEL);
    let worker_steward = steward.clone();
    let worker_handle = tokio::spawn(async move { worker.initialize(worker_steward).await });

    if !steward.wait_ready(WORKER_LABEL, Duration::from_secs(5)).await {
        tracing::warn!("{} did not report ready", WORKER_LABEL);
    }
    let loaded = queue.request(TaskPriority::ASAP, ReminderCommand::Load);
    match loaded.await {
        Ok(TaskOutcome::Failed(e)) => {
            log_tx
                .send(Message::new(
                    LogSeverity::Priority,
                    "MAIN".to_string(),
                    format!("Initial reminder load failed: {}", e),
                ))
                .await
                .ok();
        }
        Ok(outcome) => tracing::debug!("Initial load: {:?}", outcome),
        Err(_) => tracing::warn!("Reminder worker dropped the initial load"),
    }

    tracing::info!("Watching zone reminders, hit Ctrl+C to exit");
    loop {
        if quit.load(Ordering::SeqCst) {
            break;
        }
        sleep(Duration::from_millis(100)).await;
    }

    let remaining = steward.shutdown_gracefully(Duration::from_secs(5)).await;
    if !remaining.is_empty() {
        tracing::warn!("{} processes did not close", remaining.len());
    }
    let editor = worker_handle.await?;
    tracing::info!(
        "Stopped with {} zones cached",
        editor.snapshot().zone_count()
    );
    Ok(())
}
