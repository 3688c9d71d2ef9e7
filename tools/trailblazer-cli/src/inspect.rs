//! Inspect command - summarize a session
//!
//! Accepts either a blob file (`trailblazer inspect run.tbs`) or, with no
//! path, the stored session selected by `--store` / `--key`.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use trailblazer_core::{ExplorationCounters, ExplorerConfig, Session};

use crate::store::StoreArgs;

/// Arguments for the inspect command
#[derive(Args)]
pub struct InspectArgs {
    /// Session blob to inspect (omit to read the stored session)
    pub session: Option<PathBuf>,

    #[command(flatten)]
    pub store: StoreArgs,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Also list every command in the timeline
    #[arg(long)]
    pub commands: bool,
}

#[derive(Debug, Serialize)]
struct CheckpointSummary {
    command_index: usize,
    position: u32,
    area: u32,
    score: u32,
    cycle: u64,
    snapshot_bytes: usize,
    snapshot_valid: bool,
}

#[derive(Debug, Serialize)]
struct CommandRow {
    index: usize,
    cycle: u64,
    kind: &'static str,
    group: u32,
    position: Option<u32>,
    exec_count: u32,
    checkpoint: bool,
}

#[derive(Debug, Serialize)]
struct SessionSummary {
    source: String,
    commands: usize,
    executed: usize,
    checkpoints: usize,
    tail_position: Option<u32>,
    best_position: u32,
    next_group: u32,
    counters: ExplorationCounters,
    kinds: BTreeMap<&'static str, usize>,
    active_checkpoint: Option<CheckpointSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timeline: Option<Vec<CommandRow>>,
}

impl SessionSummary {
    fn new(source: String, session: &Session, with_commands: bool) -> Self {
        let mut kinds = BTreeMap::new();
        for command in &session.commands {
            *kinds.entry(command.kind.label()).or_insert(0) += 1;
        }

        let active_checkpoint = session.checkpoint.as_ref().map(|c| CheckpointSummary {
            command_index: c.command_index,
            position: c.position,
            area: c.fields.area,
            score: c.fields.score,
            cycle: c.fields.cycle,
            snapshot_bytes: c.snapshot.len(),
            snapshot_valid: c.snapshot.verify(),
        });

        let timeline = with_commands.then(|| {
            session
                .commands
                .iter()
                .enumerate()
                .map(|(index, c)| CommandRow {
                    index,
                    cycle: c.cycle,
                    kind: c.kind.label(),
                    group: c.group,
                    position: c.position,
                    exec_count: c.exec_count,
                    checkpoint: c.is_checkpoint,
                })
                .collect()
        });

        Self {
            source,
            commands: session.commands.len(),
            executed: session.commands.iter().filter(|c| c.exec_count > 0).count(),
            checkpoints: session.checkpoint_count(),
            tail_position: session.commands.last().and_then(|c| c.position),
            best_position: session.counters.best_position,
            next_group: session.next_group,
            counters: session.counters,
            kinds,
            active_checkpoint,
            timeline,
        }
    }

    fn print(&self) {
        println!("=== Session ===");
        println!("  Source:          {}", self.source);
        println!("  Commands:        {} ({} executed)", self.commands, self.executed);
        println!("  Checkpoints:     {}", self.checkpoints);
        match self.tail_position {
            Some(p) => println!("  Tail position:   {}", p),
            None => println!("  Tail position:   (not executed)"),
        }
        println!("  Best position:   {}", self.best_position);
        println!("  Restarts:        {}", self.counters.total_restarts);
        println!(
            "  Without progress: {}",
            self.counters.restarts_without_progress
        );
        println!("  Next group:      {}", self.next_group);

        println!();
        println!("  Command kinds:");
        for (kind, count) in &self.kinds {
            println!("    {:<14} {}", kind, count);
        }

        println!();
        match &self.active_checkpoint {
            Some(c) => {
                println!("  Active checkpoint:");
                println!("    Index:    {}", c.command_index);
                println!("    Position: {} (area {})", c.position, c.area);
                println!("    Score:    {}", c.score);
                println!("    Cycle:    {}", c.cycle);
                println!(
                    "    Snapshot: {} bytes{}",
                    c.snapshot_bytes,
                    if c.snapshot_valid { "" } else { " (CORRUPT)" }
                );
            }
            None => println!("  Active checkpoint: none"),
        }

        if let Some(rows) = &self.timeline {
            println!();
            println!("  {:>6} {:>12} {:<14} {:>6} {:>8} {:>5}", "index", "cycle", "kind", "group", "position", "execs");
            for row in rows {
                println!(
                    "  {:>6} {:>12} {:<14} {:>6} {:>8} {:>5}{}",
                    row.index,
                    row.cycle,
                    row.kind,
                    row.group,
                    row.position.map_or_else(|| "-".to_string(), |p| p.to_string()),
                    row.exec_count,
                    if row.checkpoint { "  [checkpoint]" } else { "" }
                );
            }
        }
    }
}

/// Execute the inspect command
pub fn execute(args: InspectArgs, config: &ExplorerConfig) -> Result<()> {
    let (source, session) = match &args.session {
        Some(path) => {
            let blob = std::fs::read(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let session = Session::decode(&blob)
                .with_context(|| format!("{} is not a valid session", path.display()))?;
            (path.display().to_string(), session)
        }
        None => {
            let resolved = args.store.resolve(config)?;
            (resolved.describe(), resolved.load()?)
        }
    };

    let summary = SessionSummary::new(source, &session, args.commands);
    if args.json {
        let json =
            serde_json::to_string_pretty(&summary).context("Failed to serialize summary")?;
        println!("{}", json);
    } else {
        summary.print();
    }
    Ok(())
}
