use anyhow::{Context, Result};
use mdcontainer_core::ItemStack;
use mdcontainer_inventory::SlotInventory;
use mdcontainer_net::{ClickEvent, ClickReplay, ClientMessage, ServerMessage};
use mdcontainer_server::{encode_frames, BasicClickBehavior, ContainerSession, SessionConfig};
use mdcontainer_window::{ClientPlayer, GameMode, WindowLayout};
use std::env;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const CHEST_ROWS: usize = 3;

fn main() -> Result<()> {
    let cli = CliOptions::parse(env::args().skip(1));
    let config = match &cli.config {
        Some(path) => SessionConfig::load_from_path(path),
        None => SessionConfig::load(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .with_writer(io::stderr)
        .init();

    info!("Starting mdcontainer v{}", env!("CARGO_PKG_VERSION"));

    let game_mode = if cli.creative {
        GameMode::Creative
    } else {
        GameMode::Survival
    };
    let player = ClientPlayer::new(1, "demo", game_mode);
    let inventory = Arc::clone(player.inventory());
    inventory.main().set(0, Some(ItemStack::new(1, 48)));
    inventory.main().set(1, Some(ItemStack::new(332, 9)));
    inventory.main().set(9, Some(ItemStack::new(264, 20)));

    let chest = SlotInventory::new(CHEST_ROWS * 9);
    chest.set(0, Some(ItemStack::new(1, 16)));
    chest.set(4, Some(ItemStack::new(368, 3)));

    let progress = Arc::new(AtomicI32::new(0));
    let mut session = ContainerSession::new(config, player)?;
    let opened = session.open(
        WindowLayout::chest(CHEST_ROWS),
        Box::new(BasicClickBehavior),
        |window| {
            let mut top = window.top();
            for (local, slot) in chest.slots().enumerate() {
                top.bind(local, Arc::clone(slot));
            }
            let progress = Arc::clone(&progress);
            window.register_property(0, move || progress.load(Ordering::Relaxed));
        },
    )?;

    let mut out = io::stdout().lock();
    emit(&mut out, session.current_tick().0, &opened)?;

    match &cli.script {
        Some(path) => run_script(&mut session, path, &progress, &mut out)?,
        None => run_demo(&mut session, &progress, &mut out)?,
    }

    if let Some(close) = session.close() {
        emit(&mut out, session.current_tick().0, &[close])?;
    }
    info!(ticks = session.current_tick().0, "session finished");
    Ok(())
}

/// Replay a recorded click log.
fn run_script(
    session: &mut ContainerSession,
    path: &Path,
    progress: &AtomicI32,
    out: &mut impl Write,
) -> Result<()> {
    let mut replay = ClickReplay::load(path)
        .with_context(|| format!("failed to load click script {}", path.display()))?;
    info!(entries = replay.entry_count(), "replaying click script");

    let Some(last) = replay.last_tick() else {
        warn!("click script is empty");
        return Ok(());
    };
    while session.current_tick().0 <= last {
        let tick = session.current_tick().0;
        for message in replay.messages_for_tick(tick) {
            session.handle_message(message)?;
        }
        progress.fetch_add(1, Ordering::Relaxed);
        let messages = session.end_tick()?;
        emit(out, tick, &messages)?;
    }
    Ok(())
}

/// A short built-in sequence: pick up, spread by drag, shift-move, gather.
fn run_demo(
    session: &mut ContainerSession,
    progress: &AtomicI32,
    out: &mut impl Write,
) -> Result<()> {
    let Some(container_id) = session.window().map(|window| window.wire_id()) else {
        return Ok(());
    };
    let click = |slot_index: i16, mode: u8, button: u8| {
        ClientMessage::Click(ClickEvent {
            container_id,
            slot_index,
            mode,
            button,
        })
    };
    let hotbar = (CHEST_ROWS * 9 + 27) as i16;

    let ticks: Vec<Vec<ClientMessage>> = vec![
        // Pick up the stone stack from hotbar column 0.
        vec![click(hotbar, 0, 0)],
        // Left-drag it evenly over three chest slots.
        vec![
            click(-999, 5, 0),
            click(1, 5, 1),
            click(2, 5, 1),
            click(3, 5, 1),
            click(-999, 5, 2),
        ],
        // Shift-move the diamonds up into the chest.
        vec![click((CHEST_ROWS * 9) as i16, 1, 0)],
        // Pick stone back up and gather the rest of it.
        vec![click(1, 0, 0), click(1, 6, 0)],
        // Put it down again.
        vec![click(hotbar, 0, 0)],
    ];

    for messages in ticks {
        let tick = session.current_tick().0;
        for message in messages {
            session.handle_message(message)?;
        }
        progress.fetch_add(1, Ordering::Relaxed);
        let outbound = session.end_tick()?;
        emit(out, tick, &outbound)?;
    }
    Ok(())
}

/// Print outbound messages as JSON lines, one per message.
fn emit(out: &mut impl Write, tick: u64, messages: &[ServerMessage]) -> Result<()> {
    let frames = encode_frames(messages)?;
    for (message, frame) in messages.iter().zip(&frames) {
        let line = serde_json::json!({
            "tick": tick,
            "bytes": frame.len(),
            "message": message,
        });
        writeln!(out, "{line}")?;
    }
    Ok(())
}

struct CliOptions {
    config: Option<PathBuf>,
    script: Option<PathBuf>,
    creative: bool,
}

impl CliOptions {
    fn parse<I: Iterator<Item = String>>(mut args: I) -> Self {
        let mut opts = CliOptions {
            config: None,
            script: None,
            creative: false,
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => {
                    if let Some(path) = args.next() {
                        opts.config = Some(PathBuf::from(path));
                    } else {
                        eprintln!("--config requires a file path");
                    }
                }
                "--script" => {
                    if let Some(path) = args.next() {
                        opts.script = Some(PathBuf::from(path));
                    } else {
                        eprintln!("--script requires a file path");
                    }
                }
                "--creative" => opts.creative = true,
                other => eprintln!("Ignoring unknown argument {other}"),
            }
        }
        opts
    }
}
