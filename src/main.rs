// Draft engine entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, not terminal)
// 2. Load config
// 3. Load champion catalog
// 4. Build provider client
// 5. Create mpsc channels
// 6. Spawn engine event loop
// 7. Spawn console reader task
// 8. Print UI updates until the engine exits
// 9. Cleanup

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info};

use pickban::catalog::{ChampionCatalog, ChampionId};
use pickban::config;
use pickban::draft::state::Slot;
use pickban::draft::turn::{Role, Side};
use pickban::engine::{self, Engine};
use pickban::protocol::{UiUpdate, UserCommand};
use pickban::provider::http::ProviderClient;
use pickban::provider::Provider;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing (log to file, not the terminal the console uses)
    init_tracing()?;
    info!("pickban starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: {} bans per side, {} roles, {}s per turn, bracket {}",
        config.draft.ban_count_per_side,
        config.draft.roles.len(),
        config.draft.turn_duration,
        config.draft.elo_bracket
    );

    // 3. Load champion catalog
    let catalog = Arc::new(
        ChampionCatalog::load(Path::new(&config.data_paths.champions))
            .context("failed to load champion catalog")?,
    );

    // 4. Build the provider client from config
    let provider =
        ProviderClient::from_config(&config).context("failed to build provider client")?;
    match &provider {
        ProviderClient::Active(_) => info!("Provider client initialized"),
        ProviderClient::Disabled => info!("Provider client disabled (no provider.toml)"),
    }
    let provider: Arc<dyn Provider> = Arc::new(provider);

    // 5. Create mpsc channels
    let (cmd_tx, cmd_rx) = mpsc::channel(64);
    let (provider_tx, provider_rx) = mpsc::channel(256);
    let (ui_tx, mut ui_rx) = mpsc::channel(256);

    // 6. Spawn the engine event loop
    let engine = Engine::new(&config.draft, Arc::clone(&catalog), provider, provider_tx);
    let engine_handle = tokio::spawn(async move {
        if let Err(e) = engine::run(engine, cmd_rx, provider_rx, ui_tx).await {
            error!("Engine loop error: {}", e);
        }
    });

    // 7. Spawn the console reader task
    let reader_catalog = Arc::clone(&catalog);
    let reader_handle = tokio::spawn(async move {
        print_help();
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            match parse_command(&line, &reader_catalog) {
                Ok(Some(cmd)) => {
                    let quitting = cmd == UserCommand::Quit;
                    if cmd_tx.send(cmd).await.is_err() || quitting {
                        break;
                    }
                }
                Ok(None) => {}
                Err(msg) => println!("error: {msg}"),
            }
        }
    });

    // 8. Print UI updates until the engine drops its sender
    while let Some(update) = ui_rx.recv().await {
        print_update(&update, &catalog);
    }

    // 9. Cleanup: wait for the engine to finish, stop reading stdin
    let _ = tokio::time::timeout(Duration::from_secs(5), engine_handle).await;
    reader_handle.abort();

    info!("pickban shut down cleanly");
    Ok(())
}

/// Initialize tracing to log to a file (not the terminal, which belongs to
/// the console driver).
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("pickban.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pickban=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Console command parsing
// ---------------------------------------------------------------------------

/// Parse one console line into a command. `Ok(None)` means nothing to do
/// (blank line or a locally handled command like `help`).
fn parse_command(
    line: &str,
    catalog: &ChampionCatalog,
) -> Result<Option<UserCommand>, String> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let mut parts = trimmed.split_whitespace();
    let head = parts.next().unwrap_or_default().to_lowercase();

    match head.as_str() {
        "start" => Ok(Some(UserCommand::StartDraft)),
        "select" | "s" => {
            let rest: Vec<&str> = parts.collect();
            if rest.is_empty() {
                return Err("usage: select <champion name or id>".into());
            }
            let champion = resolve_champion(&rest.join(" "), catalog)?;
            Ok(Some(UserCommand::ApplyChampion { champion }))
        }
        "retract" => {
            let side_str = parts
                .next()
                .ok_or_else(|| "usage: retract <side> <role> | retract <side> ban <index>".to_string())?;
            let side = Side::from_str_side(side_str)
                .ok_or_else(|| format!("unknown side `{side_str}`"))?;
            let what = parts
                .next()
                .ok_or_else(|| "usage: retract <side> <role> | retract <side> ban <index>".to_string())?;
            if what.eq_ignore_ascii_case("ban") {
                let idx_str = parts
                    .next()
                    .ok_or_else(|| "usage: retract <side> ban <index>".to_string())?;
                let index = idx_str
                    .parse::<usize>()
                    .map_err(|_| format!("invalid ban index `{idx_str}`"))?;
                Ok(Some(UserCommand::Retract {
                    side,
                    slot: Slot::Ban(index),
                }))
            } else {
                let role = Role::from_str_role(what)
                    .ok_or_else(|| format!("unknown role `{what}`"))?;
                Ok(Some(UserCommand::Retract {
                    side,
                    slot: Slot::Pick(role),
                }))
            }
        }
        "pause" => Ok(Some(UserCommand::PauseTimer)),
        "resume" => Ok(Some(UserCommand::ResumeTimer)),
        "reset" => Ok(Some(UserCommand::ResetDraft)),
        "predict" => Ok(Some(UserCommand::Predict)),
        "quit" | "q" | "exit" => Ok(Some(UserCommand::Quit)),
        "help" | "?" => {
            print_help();
            Ok(None)
        }
        other => Err(format!("unknown command `{other}` (try `help`)")),
    }
}

/// Resolve console input to a champion id: numeric ids pass through,
/// anything else is a case-insensitive catalog name lookup.
fn resolve_champion(input: &str, catalog: &ChampionCatalog) -> Result<ChampionId, String> {
    if let Ok(raw) = input.parse::<u32>() {
        return Ok(ChampionId(raw));
    }
    catalog
        .by_name(input)
        .map(|c| c.id)
        .ok_or_else(|| format!("unknown champion `{input}`"))
}

fn print_help() {
    println!("commands:");
    println!("  start                       begin the draft");
    println!("  select <champion>           commit a champion to the current turn");
    println!("  retract <side> <role>       remove a committed pick");
    println!("  retract <side> ban <index>  remove a committed ban");
    println!("  pause / resume              control the turn timer");
    println!("  reset                       discard the draft and start over");
    println!("  predict                     re-run win prediction for a complete draft");
    println!("  quit                        exit");
}

// ---------------------------------------------------------------------------
// UI update rendering
// ---------------------------------------------------------------------------

fn print_update(update: &UiUpdate, catalog: &ChampionCatalog) {
    match update {
        UiUpdate::DraftStarted => println!("draft started"),
        UiUpdate::TurnChanged(info) => {
            println!(">>> turn {}: {} to {}", info.index, info.side, info.action)
        }
        UiUpdate::DraftComplete => println!("draft complete"),
        UiUpdate::ActionApplied {
            index,
            side,
            action,
            champion,
        } => println!(
            "turn {}: {} {} {}",
            index,
            side,
            action,
            catalog.display_name(*champion)
        ),
        UiUpdate::ActionRejected { reason } => println!("rejected: {reason}"),
        UiUpdate::ChampionRetracted { side, champion, .. } => println!(
            "retracted {} from {} (free to select again)",
            catalog.display_name(*champion),
            side
        ),
        UiUpdate::TimerTick { remaining } => {
            // Keep the console readable: announce only round numbers and the
            // final stretch.
            if *remaining <= 5 || remaining % 10 == 0 {
                println!("[timer] {remaining}s left");
            }
        }
        UiUpdate::TimerExpired => println!("[timer] time is up (selection stays open)"),
        UiUpdate::TimerPaused { remaining } => println!("[timer] paused at {remaining}s"),
        UiUpdate::TimerResumed { remaining } => println!("[timer] resumed at {remaining}s"),
        UiUpdate::Recommendations { entries, .. } => {
            println!("recommendations:");
            for rec in entries {
                let reasons = if rec.reasons.is_empty() {
                    String::new()
                } else {
                    format!("  ({})", rec.reasons.join("; "))
                };
                println!(
                    "  {:<16} {:.2}{}",
                    catalog.display_name(rec.champion_id),
                    rec.score,
                    reasons
                );
            }
        }
        UiUpdate::RecommendationsError { message } => {
            println!("recommendations unavailable: {message}")
        }
        UiUpdate::PredictionReady(prediction) => println!(
            "prediction: blue {:.1}% / red {:.1}% (confidence {:.2})",
            prediction.blue_win_probability * 100.0,
            prediction.red_win_probability * 100.0,
            prediction.confidence
        ),
        UiUpdate::PredictionError { message } => println!("prediction unavailable: {message}"),
        UiUpdate::DraftReset => println!("draft reset"),
    }
}
