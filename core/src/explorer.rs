//! Exploration controller
//!
//! [`Explorer`] ties the timeline, scheduler, progress tracker, checkpoint
//! manager and pruning policy together behind the two machine hooks:
//!
//! - [`Explorer::on_pulse`] runs every machine cycle and executes at most one
//!   due command, or asks the scheduler for the next one.
//! - [`Explorer::on_sync`] runs every frame, detects failed runs and area
//!   transitions, and drives restarts and checkpoint saves.
//!
//! The explorer owns all of its state. Hosts keep it next to their machine
//! and pass the machine in on every call.

use crate::checkpoint::{Checkpoint, CheckpointManager, ControllerFields, HeldInputs};
use crate::command::{Command, CommandKind};
use crate::config::ExplorerConfig;
use crate::machine::{Control, LoadStateError, Machine, SaveStateError};
use crate::progress::{ProgressTracker, Verdict};
use crate::prune::{ExplorationCounters, PrunePolicy};
use crate::random::{PcgSource, RandomSource};
use crate::scheduler::{DecisionState, Scheduler};
use crate::session::{PersistError, Session, SessionError, SessionStore};
use crate::timeline::Timeline;

/// How a run was (re)started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartKind {
    /// Resumed from the active checkpoint
    Checkpoint,
    /// Machine reset to power-on, timeline replayed from the seed
    Cold,
}

/// Summary of one restart, returned to the host and logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestartReport {
    pub kind: RestartKind,
    pub total_restarts: u64,
    pub restarts_without_progress: u32,
    /// Restarts left before the prune widens
    pub retries_remaining: u32,
    pub best_position: u32,
    /// Commands removed by the prune
    pub pruned: usize,
    pub escalated: bool,
    /// Why the checkpoint could not be restored, if it was tried and failed
    pub error: Option<LoadStateError>,
}

pub struct Explorer {
    config: ExplorerConfig,
    timeline: Timeline,
    scheduler: Scheduler,
    tracker: ProgressTracker,
    checkpoints: CheckpointManager,
    prune: PrunePolicy,
    counters: ExplorationCounters,
    held: HeldInputs,
    area: u32,
    screen_id: u8,
    cycle_base: u64,
    running: bool,
    /// In-memory state is authoritative; `start` must not reload the store
    session_loaded: bool,
    store: Box<dyn SessionStore>,
    last_restart: Option<RestartReport>,
}

impl Explorer {
    /// Create an explorer with a PCG generator seeded from the config, or
    /// from entropy when no seed is configured.
    pub fn new(config: ExplorerConfig, store: Box<dyn SessionStore>) -> Self {
        let rng = match config.explore.seed {
            Some(seed) => PcgSource::seeded(seed),
            None => PcgSource::from_entropy(),
        };
        log::info!("exploration seed: {}", rng.seed());
        Self::with_random(config, store, Box::new(rng))
    }

    /// Create an explorer with an explicit random source.
    pub fn with_random(
        config: ExplorerConfig,
        store: Box<dyn SessionStore>,
        rng: Box<dyn RandomSource>,
    ) -> Self {
        let mut scheduler = Scheduler::new(config.durations.clone(), config.policy.clone(), rng);
        let tracker = ProgressTracker::new(config.probes.clone(), config.explore.initial_score);
        let checkpoints = CheckpointManager::new(config.explore.checkpoints);
        let prune = PrunePolicy::new(config.explore.escalation_threshold);
        let seed = Command::new(config.explore.seed_cycle, CommandKind::MoveStart, 1);
        let timeline = Timeline::new(seed);
        scheduler.set_next_group(timeline.max_group().saturating_add(1));

        Self {
            config,
            timeline,
            scheduler,
            tracker,
            checkpoints,
            prune,
            counters: ExplorationCounters::default(),
            held: HeldInputs::default(),
            area: 0,
            screen_id: 0,
            cycle_base: 0,
            running: false,
            session_loaded: false,
            store,
            last_restart: None,
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn config(&self) -> &ExplorerConfig {
        &self.config
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn counters(&self) -> &ExplorationCounters {
        &self.counters
    }

    pub fn active_checkpoint(&self) -> Option<&Checkpoint> {
        self.checkpoints.active()
    }

    pub fn checkpoints_enabled(&self) -> bool {
        self.checkpoints.enabled()
    }

    pub fn held_inputs(&self) -> HeldInputs {
        self.held
    }

    /// Screen changes since the current run started.
    pub fn area(&self) -> u32 {
        self.area
    }

    /// Screen id probe value of the current area.
    pub fn screen_id(&self) -> u8 {
        self.screen_id
    }

    /// Offset between the machine clock and the explorer clock.
    pub fn cycle_base(&self) -> u64 {
        self.cycle_base
    }

    pub fn next_decision_cycle(&self) -> u64 {
        self.scheduler.next_decision_cycle()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn last_restart(&self) -> Option<&RestartReport> {
        self.last_restart.as_ref()
    }

    pub fn store(&self) -> &dyn SessionStore {
        self.store.as_ref()
    }

    // ------------------------------------------------------------------
    // Machine hooks
    // ------------------------------------------------------------------

    /// Per-cycle hook. `cycle` is the machine clock.
    pub fn on_pulse<M: Machine + ?Sized>(&mut self, machine: &mut M, cycle: u64) {
        if !self.running {
            return;
        }
        let now = cycle.saturating_add(self.cycle_base);

        if let Some(pending) = self.timeline.pending() {
            if pending.cycle <= now {
                self.execute_pending(machine, now);
            }
            return;
        }

        if now >= self.scheduler.next_decision_cycle() {
            let state = DecisionState {
                on_rope: self.tracker.on_rope(machine),
                moving: self.held.moving,
            };
            self.scheduler
                .choose_next_command(&mut self.timeline, now + 1, state);
        }
    }

    /// Per-frame hook. Returns the restart report when the frame ended the run.
    pub fn on_sync<M: Machine + ?Sized>(
        &mut self,
        machine: &mut M,
        cycle: u64,
    ) -> Option<RestartReport> {
        if !self.running {
            return None;
        }

        if let Verdict::Regression(cause) = self.tracker.classify(machine) {
            log::info!(
                "run failed: {} [cursor={}/{}]",
                cause,
                self.timeline.cursor(),
                self.timeline.len()
            );
            return Some(self.restart(machine));
        }

        let screen_id = self.tracker.screen_id(machine);
        if screen_id != self.screen_id {
            self.screen_id = screen_id;
            self.area += 1;
            log::debug!("area {} entered [screen={:#04x}]", self.area, screen_id);

            let base = self.area_base();
            if self.checkpoints.enabled() && !self.checkpoints.covers(&self.timeline, base) {
                let now = cycle.saturating_add(self.cycle_base);
                if let Err(e) = self.save_checkpoint(machine, now) {
                    log::error!("checkpoint save failed: {}", e);
                }
            }
        }
        None
    }

    // ------------------------------------------------------------------
    // Restart protocol
    // ------------------------------------------------------------------

    /// Abandon the current run, prune and resume from the active checkpoint
    /// or from power-on.
    pub fn restart<M: Machine + ?Sized>(&mut self, machine: &mut M) -> RestartReport {
        self.running = false;
        let outcome = self.prune.prune(&mut self.timeline, &mut self.counters);
        self.counters.total_restarts += 1;

        self.release_all(machine);
        let (kind, error) = self.begin_run(machine);

        let report = RestartReport {
            kind,
            total_restarts: self.counters.total_restarts,
            restarts_without_progress: self.counters.restarts_without_progress,
            retries_remaining: self.prune.retries_remaining(&self.counters),
            best_position: self.counters.best_position,
            pruned: outcome.removed,
            escalated: outcome.escalated,
            error,
        };
        log::info!(
            "RESTART #{} ({:?}) [best={}, retries={}, pruned={}, commands={}]",
            report.total_restarts,
            report.kind,
            report.best_position,
            report.retries_remaining,
            report.pruned,
            self.timeline.len()
        );

        self.persist();
        self.last_restart = Some(report.clone());
        report
    }

    /// Restore the active checkpoint if possible, otherwise cold-reset the
    /// machine, then arm the scheduler and resume running.
    fn begin_run<M: Machine + ?Sized>(
        &mut self,
        machine: &mut M,
    ) -> (RestartKind, Option<LoadStateError>) {
        let mut error = None;
        let mut kind = RestartKind::Cold;

        if self.checkpoints.enabled() {
            match self.checkpoints.load(machine, &self.timeline) {
                Ok(Some(fields)) => {
                    self.resume_from(machine, &fields);
                    kind = RestartKind::Checkpoint;
                }
                Ok(None) => {}
                Err(e) => {
                    log::error!("checkpoint restore failed, falling back to cold restart: {}", e);
                    error = Some(e);
                }
            }
        }

        if kind == RestartKind::Cold {
            machine.cold_reset();
            self.timeline.rewind(0);
            self.area = 0;
            self.tracker.set_last_score(self.config.explore.initial_score);
            self.cycle_base = 0;
            self.held = HeldInputs::default();
            self.screen_id = self.tracker.screen_id(machine);
        }

        self.arm();
        self.running = true;
        (kind, error)
    }

    fn resume_from<M: Machine + ?Sized>(&mut self, machine: &mut M, fields: &ControllerFields) {
        self.timeline.rewind(fields.cursor);
        self.tracker.set_last_score(fields.score);
        self.area = fields.area;
        self.screen_id = fields.screen_id;
        self.cycle_base = fields.cycle.saturating_sub(machine.current_cycle());
        self.held = fields.held;
        for control in Control::ALL {
            if self.held.get(control) {
                machine.inject_input(control, true);
            }
        }
    }

    fn release_all<M: Machine + ?Sized>(&mut self, machine: &mut M) {
        for control in Control::ALL {
            machine.inject_input(control, false);
        }
        self.held = HeldInputs::default();
    }

    fn execute_pending<M: Machine + ?Sized>(&mut self, machine: &mut M, now: u64) {
        let position = self.position(machine);
        let index = self.timeline.cursor();
        let Some(command) = self.timeline.execute_next(position) else {
            return;
        };
        let (kind, cycle, recorded, exec_count, is_checkpoint) = (
            command.kind,
            command.cycle,
            command.position,
            command.exec_count,
            command.is_checkpoint,
        );

        if let Some((control, pressed)) = kind.input() {
            machine.inject_input(control, pressed);
            self.held.set(control, pressed);
        }

        log::debug!(
            "EXEC {} [index={}, cycle={}, position={:?}, count={}]",
            kind,
            index,
            cycle,
            recorded,
            exec_count
        );

        if is_checkpoint && recorded == Some(self.area_base()) {
            self.resave_checkpoint(machine, index, now);
        }
    }

    /// Replay just passed the flagged marker at `index` for the current area.
    /// Snapshot there again unless an equal or later checkpoint is active.
    fn resave_checkpoint<M: Machine + ?Sized>(
        &mut self,
        machine: &mut M,
        index: usize,
        now: u64,
    ) {
        if !self.checkpoints.enabled()
            || self
                .checkpoints
                .active()
                .is_some_and(|c| c.command_index >= index)
        {
            return;
        }

        let position = self.area_base();
        let fields = ControllerFields {
            score: self.tracker.last_score(),
            cursor: self.timeline.cursor(),
            area: self.area,
            screen_id: self.screen_id,
            cycle: now,
            held: self.held,
        };
        match self
            .checkpoints
            .save(machine, &mut self.timeline, index, position, fields)
        {
            Ok(_) => self.persist(),
            Err(e) => log::error!("checkpoint re-save failed: {}", e),
        }
    }

    fn area_base(&self) -> u32 {
        self.area.saturating_mul(self.config.explore.area_span)
    }

    /// Progress position: area base plus the in-area offset.
    pub fn position<M: Machine + ?Sized>(&self, machine: &M) -> u32 {
        self.area_base().saturating_add(self.tracker.offset(machine))
    }

    // ------------------------------------------------------------------
    // Checkpoints
    // ------------------------------------------------------------------

    /// Drop unexecuted commands, append an executed no-op marker at `now`
    /// and snapshot the machine there.
    ///
    /// Forced-hold controls still pressed are released first, so replaying
    /// up to the marker never leaves them stuck. On snapshot failure the
    /// marker stays in the timeline unflagged and the run continues.
    pub fn save_checkpoint<M: Machine + ?Sized>(
        &mut self,
        machine: &mut M,
        now: u64,
    ) -> Result<(), SaveStateError> {
        let cursor = self.timeline.cursor();
        if self.timeline.floor() > cursor {
            // still replaying toward an existing checkpoint
            log::debug!(
                "checkpoint skipped during replay [cursor={}, floor={}]",
                cursor,
                self.timeline.floor()
            );
            return Ok(());
        }

        self.timeline.truncate(cursor);
        let group = self.scheduler.allocate_group();

        for press in [CommandKind::AscendStart, CommandKind::DescendStart] {
            let (Some((control, _)), Some(release)) = (press.input(), press.paired_release())
            else {
                continue;
            };
            if self.held.get(control) {
                self.timeline.push(Command::new(now, release, group));
                self.execute_pending(machine, now);
            }
        }

        let position = self.area_base();
        let marker = self.scheduler.schedule_command(
            &mut self.timeline,
            now,
            CommandKind::Noop,
            Some(group),
            Some(now),
        );
        self.timeline.execute_next(position);

        let fields = ControllerFields {
            score: self.tracker.last_score(),
            cursor: self.timeline.cursor(),
            area: self.area,
            screen_id: self.screen_id,
            cycle: now,
            held: self.held,
        };
        self.checkpoints
            .save(machine, &mut self.timeline, marker, position, fields)?;

        self.persist();
        Ok(())
    }

    /// Turn checkpointing on or off. Disabling drops the active checkpoint;
    /// flags already in the timeline stay as pruning floors.
    pub fn set_checkpoints_enabled(&mut self, enabled: bool) {
        self.checkpoints.set_enabled(enabled);
        self.config.explore.checkpoints = enabled;
        log::info!("checkpoints {}", if enabled { "enabled" } else { "disabled" });
    }

    // ------------------------------------------------------------------
    // Operator commands
    // ------------------------------------------------------------------

    /// Start (or resume) exploration.
    ///
    /// On the first call the stored session is adopted when it decodes
    /// cleanly; an unreadable record is discarded in favour of the seed.
    pub fn start<M: Machine + ?Sized>(&mut self, machine: &mut M) -> RestartKind {
        if !self.session_loaded {
            if let Some(session) = self.load_stored_session()
                && let Err(e) = self.adopt(session)
            {
                log::warn!("discarding stored session: {}", e);
            }
            self.session_loaded = true;
        }

        self.release_all(machine);
        let (kind, error) = self.begin_run(machine);
        if let Some(e) = error {
            log::warn!("started cold after failed restore: {}", e);
        }
        log::info!(
            "exploration started ({:?}) [commands={}, restarts={}]",
            kind,
            self.timeline.len(),
            self.counters.total_restarts
        );
        kind
    }

    /// Back to the seed command with zeroed counters and no checkpoint.
    ///
    /// Exploration stops; call [`Explorer::start`] to begin again. The stored
    /// record is only deleted when `clear_store` is set.
    pub fn reset(&mut self, clear_store: bool) {
        self.running = false;
        self.timeline.reset_to_seed();
        self.counters = ExplorationCounters::default();
        self.checkpoints.clear();
        self.last_restart = None;
        self.session_loaded = true;
        self.scheduler
            .set_next_group(self.timeline.max_group().saturating_add(1));

        if clear_store {
            let key = &self.config.storage.session_key;
            if let Err(e) = self.store.delete(key) {
                log::warn!("failed to delete stored session {:?}: {}", key, e);
            }
        }
        log::info!("exploration reset (store cleared: {})", clear_store);
    }

    /// Snapshot the whole session as a portable blob.
    pub fn export_session(&self) -> Result<Vec<u8>, SessionError> {
        self.session().encode()
    }

    /// Replace the whole session with `blob` and resume from it.
    ///
    /// The blob is fully decoded and validated first; on any error the
    /// current session is left exactly as it was. With checkpoints disabled
    /// the imported checkpoint is kept in the session but not restored.
    pub fn import_session<M: Machine + ?Sized>(
        &mut self,
        machine: &mut M,
        blob: &[u8],
    ) -> Result<RestartKind, SessionError> {
        let session = Session::decode(blob)?;
        self.adopt(session)?;

        self.running = false;
        self.session_loaded = true;
        self.last_restart = None;
        self.persist();
        log::info!(
            "session imported [commands={}, checkpoint={}]",
            self.timeline.len(),
            self.checkpoints.active().is_some()
        );

        self.release_all(machine);
        let (kind, error) = self.begin_run(machine);
        if let Some(e) = error {
            log::warn!("imported checkpoint could not be restored: {}", e);
        }
        Ok(kind)
    }

    /// Write the current session to the store.
    pub fn save_session(&mut self) -> Result<(), PersistError> {
        let blob = self.session().encode()?;
        self.store.put(&self.config.storage.session_key, &blob)?;
        Ok(())
    }

    fn persist(&mut self) {
        if let Err(e) = self.save_session() {
            log::warn!("failed to persist session: {}", e);
        }
    }

    fn session(&self) -> Session {
        Session {
            commands: self.timeline.commands().to_vec(),
            checkpoint: self.checkpoints.active().cloned(),
            counters: self.counters,
            next_group: self.scheduler.next_group(),
        }
    }

    fn load_stored_session(&self) -> Option<Session> {
        let key = &self.config.storage.session_key;
        let blob = match self.store.get(key) {
            Ok(Some(blob)) => blob,
            Ok(None) => return None,
            Err(e) => {
                log::warn!("failed to read stored session {:?}: {}", key, e);
                return None;
            }
        };
        match Session::decode(&blob) {
            Ok(session) => {
                log::info!(
                    "resuming stored session [commands={}, checkpoints={}]",
                    session.commands.len(),
                    session.checkpoint_count()
                );
                Some(session)
            }
            Err(e) => {
                log::warn!("discarding unreadable session {:?}: {}", key, e);
                None
            }
        }
    }

    /// Install a decoded session. Nothing changes when its timeline is rejected.
    fn adopt(&mut self, session: Session) -> Result<(), SessionError> {
        let timeline = Timeline::from_commands(session.commands)
            .ok_or_else(|| SessionError::Invalid("timeline rejected".into()))?;
        self.timeline = timeline;
        self.counters = session.counters;
        self.scheduler
            .set_next_group(session.next_group.max(self.timeline.max_group() + 1));
        self.checkpoints.replace_active(session.checkpoint);
        Ok(())
    }

    /// Set the first decision of a run. A bare seed is followed by its own
    /// move-start gap, anything longer by the restart jitter after the tail.
    fn arm(&mut self) {
        match self.timeline.last() {
            Some(seed) if self.timeline.len() == 1 => {
                let gap = self.scheduler.durations().move_start;
                let next = seed.cycle + self.scheduler.draw(gap);
                self.scheduler.set_next_decision_cycle(next);
            }
            Some(tail) => self.scheduler.arm_after_restart(tail.cycle),
            None => self.scheduler.arm_after_restart(0),
        }
    }
}
