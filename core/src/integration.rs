//! Integration tests for the exploration controller
//!
//! Drives a full [`Explorer`] against a scripted machine: seed execution,
//! failure detection, checkpoint save/restore, pruning escalation and
//! session persistence.

#[cfg(test)]
mod tests {
    use crate::command::{Command, CommandKind};
    use crate::config::{ExploreConfig, ExplorerConfig};
    use crate::explorer::{Explorer, RestartKind};
    use crate::machine::{Control, LoadStateError, Machine};
    use crate::prune::ExplorationCounters;
    use crate::session::{FileStore, MemoryStore, Session, SessionStore};
    use crate::test_utils::{FixedDraws, ScriptedMachine};

    const KEY: &str = "trailblazer-session";

    // ============================================================================
    // Helpers
    // ============================================================================

    /// Seed at cycle 0 and a zero reference score, matching a zeroed machine.
    fn config() -> ExplorerConfig {
        ExplorerConfig {
            explore: ExploreConfig {
                seed_cycle: 0,
                initial_score: 0,
                ..ExploreConfig::default()
            },
            ..ExplorerConfig::default()
        }
    }

    fn explorer_with_store(store: Box<dyn SessionStore>, units: &[f64]) -> Explorer {
        Explorer::with_random(config(), store, Box::new(FixedDraws::new(units, 0)))
    }

    fn explorer(units: &[f64]) -> Explorer {
        explorer_with_store(Box::new(MemoryStore::new()), units)
    }

    /// Start, execute the seed and cross into the next screen at cycle 1000,
    /// which saves a checkpoint at position 10.
    fn run_to_first_checkpoint(ex: &mut Explorer, machine: &mut ScriptedMachine) {
        ex.start(machine);
        ex.on_pulse(machine, 0);
        machine.set_cycle(1000);
        machine.set_screen(1);
        assert!(ex.on_sync(machine, 1000).is_none());
    }

    /// Execute the seed, then fall before any decision is scheduled.
    fn fall_after_seed(ex: &mut Explorer, machine: &mut ScriptedMachine) {
        ex.on_pulse(machine, 0);
        machine.set_vertical(40);
        assert!(ex.on_sync(machine, 100).is_some());
    }

    /// Executed commands from `(group, position, checkpoint)` triples.
    fn session_from(entries: &[(u32, u32, bool)], counters: ExplorationCounters) -> Session {
        let commands: Vec<Command> = entries
            .iter()
            .enumerate()
            .map(|(i, &(group, position, checkpoint))| {
                let mut c = Command::new(i as u64 * 10, CommandKind::Noop, group);
                c.mark_executed(position);
                c.is_checkpoint = checkpoint;
                c
            })
            .collect();
        let next_group = commands.iter().map(|c| c.group).max().unwrap_or(0) + 1;
        Session {
            commands,
            checkpoint: None,
            counters,
            next_group,
        }
    }

    // ============================================================================
    // Execution pump
    // ============================================================================

    #[test]
    fn seed_executes_on_first_pulse_and_score_drop_cold_restarts() {
        let mut machine = ScriptedMachine::new();
        let mut ex = explorer(&[0.5]);

        assert_eq!(ex.start(&mut machine), RestartKind::Cold);
        machine.clear_inputs();

        ex.on_pulse(&mut machine, 0);
        assert_eq!(ex.timeline().cursor(), 1);
        assert_eq!(machine.inputs(), &[(Control::Move, true)]);

        machine.set_score(50);
        assert!(ex.on_sync(&mut machine, 100).is_none());

        machine.set_score(0);
        let report = ex.on_sync(&mut machine, 200).expect("score drop restarts");
        assert_eq!(report.kind, RestartKind::Cold);
        assert_eq!(report.total_restarts, 1);
        assert!(report.error.is_none());
        assert_eq!(machine.restores(), 0);
        assert_eq!(machine.cold_resets(), 2);
        assert_eq!(ex.timeline().cursor(), 0);
        assert_eq!(ex.timeline().len(), 1);
        assert!(ex.is_running());
    }

    #[test]
    fn cursor_is_monotonic_between_restarts() {
        let mut machine = ScriptedMachine::new();
        let mut ex = explorer(&[0.5, 0.05, 0.3, 0.9]);
        ex.start(&mut machine);

        let mut previous = 0;
        for cycle in (0..5_000_000u64).step_by(1000) {
            machine.set_cycle(cycle);
            ex.on_pulse(&mut machine, cycle);
            let cursor = ex.timeline().cursor();
            assert!(cursor >= previous);
            assert!(cursor <= ex.timeline().len());
            previous = cursor;
        }
        assert!(previous > 1, "exploration should schedule past the seed");
    }

    #[test]
    fn same_seed_gives_same_timeline() {
        let mut seeded = config();
        seeded.explore.seed = Some(7);
        let mut a = Explorer::new(seeded.clone(), Box::new(MemoryStore::new()));
        let mut b = Explorer::new(seeded, Box::new(MemoryStore::new()));
        let mut machine_a = ScriptedMachine::new();
        let mut machine_b = ScriptedMachine::new();
        a.start(&mut machine_a);
        b.start(&mut machine_b);

        for cycle in (0..3_000_000u64).step_by(2500) {
            a.on_pulse(&mut machine_a, cycle);
            b.on_pulse(&mut machine_b, cycle);
        }
        assert!(a.timeline().len() > 1);
        assert_eq!(a.timeline().commands(), b.timeline().commands());
        assert_eq!(machine_a.inputs(), machine_b.inputs());
    }

    #[test]
    fn first_decision_gets_a_group_of_its_own() {
        let mut machine = ScriptedMachine::new();
        let mut ex = explorer(&[0.5]);
        ex.start(&mut machine);

        for cycle in (0..5_000_000u64).step_by(1000) {
            ex.on_pulse(&mut machine, cycle);
            if ex.timeline().len() > 1 {
                break;
            }
        }

        let seed = ex.timeline().get(0).unwrap();
        let first = ex.timeline().get(1).expect("a decision was scheduled");
        assert_ne!(first.group, seed.group);
        assert_eq!(first.group, seed.group + 1);
    }

    #[test]
    fn one_command_per_pulse_even_when_backlogged() {
        let mut machine = ScriptedMachine::new();
        let mut ex = explorer(&[0.5]);
        let session = session_from(
            &[(1, 0, false), (2, 1, false), (3, 2, false)],
            ExplorationCounters::default(),
        );
        ex.import_session(&mut machine, &session.encode().unwrap())
            .unwrap();

        // every command is overdue at cycle 1000
        for expected in 1..=3 {
            ex.on_pulse(&mut machine, 1000);
            assert_eq!(ex.timeline().cursor(), expected);
        }
    }

    #[test]
    fn rope_forces_descend_before_any_other_decision() {
        let mut machine = ScriptedMachine::new();
        // 0.0 would pick a no-op on every draw
        let mut ex = explorer(&[0.0]);
        ex.start(&mut machine);
        ex.on_pulse(&mut machine, 0);

        machine.set_on_rope(true);
        let decision = ex.next_decision_cycle();
        ex.on_pulse(&mut machine, decision);

        let press = ex.timeline().get(1).unwrap();
        assert_eq!(press.kind, CommandKind::DescendStart);
        assert_eq!(press.cycle, decision + 1 + 200_000);
        let release = ex.timeline().get(2).unwrap();
        assert_eq!(release.kind, CommandKind::DescendEnd);
        assert_eq!(release.group, press.group);
    }

    // ============================================================================
    // Pruning through restarts
    // ============================================================================

    #[test]
    fn escalation_after_twenty_fruitless_restarts_lowers_the_tail() {
        let mut machine = ScriptedMachine::new();
        let mut ex = explorer(&[0.5]);
        let counters = ExplorationCounters {
            total_restarts: 40,
            restarts_without_progress: 19,
            best_position: 30,
        };
        let entries = [
            (1, 0, false),
            (2, 15, false),
            (3, 22, false),
            (4, 24, false),
            (5, 25, false),
            (6, 25, false),
        ];
        let session = session_from(&entries, counters);
        ex.import_session(&mut machine, &session.encode().unwrap())
            .unwrap();
        for _ in 0..entries.len() {
            ex.on_pulse(&mut machine, 1000);
        }
        assert!(ex.timeline().is_drained());

        let report = ex.restart(&mut machine);

        assert!(report.escalated);
        assert_eq!(report.restarts_without_progress, 0);
        assert_eq!(report.retries_remaining, 20);
        assert_eq!(report.total_restarts, 41);
        assert_eq!(ex.timeline().tail_position(), Some(22));
    }

    #[test]
    fn escalation_stops_at_latest_checkpoint() {
        let mut machine = ScriptedMachine::new();
        let mut ex = explorer(&[0.5]);
        let counters = ExplorationCounters {
            total_restarts: 0,
            restarts_without_progress: 19,
            best_position: 40,
        };
        let entries = [
            (1, 0, false),
            (2, 10, true),
            (3, 14, false),
            (4, 20, true),
            (5, 24, false),
            (6, 24, false),
            (7, 25, false),
        ];
        let session = session_from(&entries, counters);
        ex.import_session(&mut machine, &session.encode().unwrap())
            .unwrap();
        for _ in 0..entries.len() {
            ex.on_pulse(&mut machine, 1000);
        }

        let report = ex.restart(&mut machine);

        assert!(report.escalated);
        assert_eq!(ex.timeline().len(), 4);
        let tail = ex.timeline().last().unwrap();
        assert!(tail.is_checkpoint);
        assert_eq!(tail.position, Some(20));
        assert!(ex.timeline().get(1).unwrap().is_checkpoint);
    }

    // ============================================================================
    // Checkpoints
    // ============================================================================

    #[test]
    fn area_transition_saves_checkpoint_marker() {
        let mut machine = ScriptedMachine::new();
        let mut ex = explorer(&[0.5]);
        run_to_first_checkpoint(&mut ex, &mut machine);

        assert_eq!(ex.area(), 1);
        let checkpoint = ex.active_checkpoint().expect("checkpoint saved");
        assert_eq!(checkpoint.command_index, 1);
        assert_eq!(checkpoint.position, 10);
        assert_eq!(checkpoint.fields.cursor, 2);
        assert!(checkpoint.fields.held.moving);

        let marker = ex.timeline().get(1).unwrap();
        assert_eq!(marker.kind, CommandKind::Noop);
        assert!(marker.is_checkpoint);
        assert_eq!(marker.position, Some(10));
        assert_eq!(marker.exec_count, 1);
        assert_eq!(ex.timeline().cursor(), 2);
        assert_eq!(ex.next_decision_cycle(), 1000);

        let stored = ex.store().get(KEY).unwrap().expect("session persisted");
        let session = Session::decode(&stored).unwrap();
        assert_eq!(session.checkpoint_count(), 1);
        assert!(session.checkpoint.is_some());
    }

    #[test]
    fn every_new_area_gets_its_own_checkpoint() {
        let mut machine = ScriptedMachine::new();
        let mut ex = explorer(&[0.5]);
        run_to_first_checkpoint(&mut ex, &mut machine);
        let len = ex.timeline().len();

        // screen changes count as new areas in either direction
        machine.set_screen(0);
        assert!(ex.on_sync(&mut machine, 1100).is_none());

        assert_eq!(ex.area(), 2);
        let checkpoint = ex.active_checkpoint().unwrap();
        assert_eq!(checkpoint.position, 20);
        assert_eq!(checkpoint.command_index, len);
        assert_eq!(ex.timeline().floor(), len + 1);
        assert!(ex.timeline().get(1).unwrap().is_checkpoint);
    }

    /// Fail a restore once, then cold-replay the seed and the area change.
    fn replay_after_failed_restore(ex: &mut Explorer, machine: &mut ScriptedMachine) {
        machine.fail_restores(true);
        machine.set_vertical(40);
        let report = ex.on_sync(machine, 1500).unwrap();
        assert_eq!(report.kind, RestartKind::Cold);
        machine.fail_restores(false);

        ex.on_pulse(machine, 0);
        machine.set_cycle(1000);
        machine.set_screen(1);
        assert!(ex.on_sync(machine, 1000).is_none());
    }

    #[test]
    fn cold_replay_does_not_append_a_second_marker() {
        let mut machine = ScriptedMachine::new();
        let mut ex = explorer(&[0.5]);
        run_to_first_checkpoint(&mut ex, &mut machine);
        replay_after_failed_restore(&mut ex, &mut machine);

        assert_eq!(ex.area(), 1);
        assert_eq!(ex.timeline().len(), 2);
        assert_eq!(ex.timeline().last_checkpoint(), Some(1));
    }

    #[test]
    fn cold_replay_snapshots_again_at_existing_marker() {
        let mut machine = ScriptedMachine::new();
        let mut ex = explorer(&[0.5]);
        run_to_first_checkpoint(&mut ex, &mut machine);
        replay_after_failed_restore(&mut ex, &mut machine);
        assert!(ex.active_checkpoint().is_none());

        ex.on_pulse(&mut machine, 1000);
        let checkpoint = ex.active_checkpoint().expect("snapshot at replayed marker");
        assert_eq!(checkpoint.command_index, 1);
        assert_eq!(checkpoint.position, 10);
        assert_eq!(checkpoint.fields.cursor, 2);
        assert_eq!(ex.timeline().len(), 2);

        let stored = Session::decode(&ex.store().get(KEY).unwrap().unwrap()).unwrap();
        assert_eq!(stored.checkpoint.as_ref(), ex.active_checkpoint());

        machine.set_cycle(1500);
        machine.set_vertical(40);
        let report = ex.on_sync(&mut machine, 1500).expect("fall restarts");
        assert_eq!(report.kind, RestartKind::Checkpoint);
        assert_eq!(machine.restores(), 1);
        assert_eq!(machine.current_cycle(), 1000);
        assert_eq!(ex.area(), 1);
    }

    #[test]
    fn reenabled_checkpoints_recover_on_next_replay() {
        let mut machine = ScriptedMachine::new();
        let mut ex = explorer(&[0.5]);
        run_to_first_checkpoint(&mut ex, &mut machine);
        ex.set_checkpoints_enabled(false);
        ex.set_checkpoints_enabled(true);
        assert!(ex.active_checkpoint().is_none());

        machine.set_vertical(40);
        let report = ex.on_sync(&mut machine, 1500).unwrap();
        assert_eq!(report.kind, RestartKind::Cold);

        ex.on_pulse(&mut machine, 0);
        machine.set_cycle(1000);
        machine.set_screen(1);
        assert!(ex.on_sync(&mut machine, 1000).is_none());
        ex.on_pulse(&mut machine, 1000);

        assert_eq!(ex.active_checkpoint().map(|c| c.command_index), Some(1));
    }

    #[test]
    fn checkpoint_restore_brings_back_screen_id() {
        let mut machine = ScriptedMachine::new();
        let mut ex = explorer(&[0.5]);
        run_to_first_checkpoint(&mut ex, &mut machine);
        assert_eq!(ex.active_checkpoint().unwrap().fields.screen_id, 1);

        machine.set_vertical(40);
        let report = ex.on_sync(&mut machine, 1500).unwrap();
        assert_eq!(report.kind, RestartKind::Checkpoint);
        assert_eq!(ex.screen_id(), 1);

        // same screen after the restore is not a new area
        assert!(ex.on_sync(&mut machine, 1000).is_none());
        assert_eq!(ex.area(), 1);
    }

    #[test]
    fn failed_run_resumes_from_checkpoint() {
        let mut machine = ScriptedMachine::new();
        let mut ex = explorer(&[0.5]);
        run_to_first_checkpoint(&mut ex, &mut machine);

        // next decision at 1000 is a jump (moving, no stop)
        ex.on_pulse(&mut machine, 1000);
        assert_eq!(ex.timeline().get(2).unwrap().kind, CommandKind::AscendStart);
        ex.on_pulse(&mut machine, 1001);
        assert!(ex.held_inputs().ascending);

        machine.set_cycle(2000);
        machine.set_vertical(40);
        machine.clear_inputs();
        let report = ex.on_sync(&mut machine, 2000).expect("fall restarts");

        assert_eq!(report.kind, RestartKind::Checkpoint);
        assert_eq!(report.best_position, 10);
        assert_eq!(machine.restores(), 1);
        assert_eq!(machine.current_cycle(), 1000);
        assert_eq!(machine.read_probe(0xe9), 0);
        assert_eq!(ex.cycle_base(), 0);
        assert_eq!(ex.area(), 1);
        assert_eq!(ex.timeline().len(), 2);
        assert_eq!(ex.timeline().cursor(), 2);

        let held = ex.held_inputs();
        assert!(held.moving);
        assert!(!held.ascending);
        assert_eq!(machine.inputs().last(), Some(&(Control::Move, true)));
    }

    #[test]
    fn failed_restore_falls_back_to_cold_and_forgets_checkpoint() {
        let mut machine = ScriptedMachine::new();
        let mut ex = explorer(&[0.5]);
        run_to_first_checkpoint(&mut ex, &mut machine);

        machine.fail_restores(true);
        machine.set_vertical(40);
        let report = ex.on_sync(&mut machine, 1500).expect("fall restarts");

        assert_eq!(report.kind, RestartKind::Cold);
        assert!(matches!(report.error, Some(LoadStateError::Machine(_))));
        assert!(ex.active_checkpoint().is_none());
        assert_eq!(ex.timeline().cursor(), 0);
        assert_eq!(ex.area(), 0);
        // the marker still guards the replayed prefix
        assert!(ex.timeline().get(1).unwrap().is_checkpoint);

        // the next failure goes straight to a cold restart
        machine.fail_restores(false);
        machine.set_vertical(40);
        let report = ex.on_sync(&mut machine, 10).expect("fall restarts");
        assert_eq!(report.kind, RestartKind::Cold);
        assert!(report.error.is_none());
        assert_eq!(machine.restores(), 0);
    }

    #[test]
    fn snapshot_failure_keeps_exploring_without_checkpoint() {
        let mut machine = ScriptedMachine::new();
        machine.fail_snapshots(true);
        let mut ex = explorer(&[0.5]);
        run_to_first_checkpoint(&mut ex, &mut machine);

        assert!(ex.is_running());
        assert!(ex.active_checkpoint().is_none());
        assert!(!ex.timeline().get(1).unwrap().is_checkpoint);
        assert_eq!(ex.area(), 1);
    }

    #[test]
    fn disabled_checkpoints_only_advance_the_area() {
        let mut machine = ScriptedMachine::new();
        let mut ex = explorer(&[0.5]);
        ex.set_checkpoints_enabled(false);
        run_to_first_checkpoint(&mut ex, &mut machine);

        assert_eq!(ex.area(), 1);
        assert!(ex.active_checkpoint().is_none());
        assert_eq!(ex.timeline().last_checkpoint(), None);
        assert_eq!(ex.timeline().len(), 1);
    }

    #[test]
    fn disabling_drops_active_checkpoint() {
        let mut machine = ScriptedMachine::new();
        let mut ex = explorer(&[0.5]);
        run_to_first_checkpoint(&mut ex, &mut machine);
        assert!(ex.active_checkpoint().is_some());

        ex.set_checkpoints_enabled(false);
        assert!(ex.active_checkpoint().is_none());
        assert!(!ex.checkpoints_enabled());

        machine.set_vertical(40);
        let report = ex.on_sync(&mut machine, 1500).unwrap();
        assert_eq!(report.kind, RestartKind::Cold);
    }

    // ============================================================================
    // Sessions
    // ============================================================================

    #[test]
    fn export_import_roundtrip_without_checkpoints() {
        let mut machine = ScriptedMachine::new();
        let mut source = explorer(&[0.5, 0.05]);
        source.start(&mut machine);
        for cycle in (0..2_000_000u64).step_by(5000) {
            source.on_pulse(&mut machine, cycle);
        }
        let blob = source.export_session().unwrap();

        let mut target_machine = ScriptedMachine::new();
        let mut target = explorer(&[0.5]);
        target.import_session(&mut target_machine, &blob).unwrap();

        let exported = Session::decode(&target.export_session().unwrap()).unwrap();
        assert_eq!(exported, Session::decode(&blob).unwrap());
        assert_eq!(exported.checkpoint_count(), 0);
        assert_eq!(target.timeline().commands(), source.timeline().commands());
        assert!(target.is_running());
    }

    #[test]
    fn fresh_session_survives_export_and_import() {
        let mut machine = ScriptedMachine::new();
        let mut source = explorer(&[0.5]);
        source.start(&mut machine);
        let blob = source.export_session().unwrap();

        let mut target_machine = ScriptedMachine::new();
        let mut target = explorer(&[0.5]);
        assert_eq!(
            target.import_session(&mut target_machine, &blob).unwrap(),
            RestartKind::Cold
        );
        assert_eq!(target.export_session().unwrap(), blob);
    }

    #[test]
    fn restart_before_first_decision_is_resumable() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut machine = ScriptedMachine::new();
        let mut first = explorer_with_store(Box::new(FileStore::new(tmp.path())), &[0.5]);
        first.start(&mut machine);
        fall_after_seed(&mut first, &mut machine);
        assert_eq!(first.counters().total_restarts, 1);

        let mut second = explorer_with_store(Box::new(FileStore::new(tmp.path())), &[0.5]);
        second.start(&mut ScriptedMachine::new());
        assert_eq!(second.counters().total_restarts, 1);
    }

    #[test]
    fn disabled_checkpoints_keep_imported_checkpoint_unrestored() {
        let mut machine = ScriptedMachine::new();
        let mut source = explorer(&[0.5]);
        run_to_first_checkpoint(&mut source, &mut machine);
        let blob = source.export_session().unwrap();

        let mut target_machine = ScriptedMachine::new();
        let mut target = explorer(&[0.5]);
        target.set_checkpoints_enabled(false);
        let kind = target.import_session(&mut target_machine, &blob).unwrap();

        assert_eq!(kind, RestartKind::Cold);
        assert_eq!(target_machine.restores(), 0);
        assert_eq!(target.export_session().unwrap(), blob);
    }

    #[test]
    fn export_import_roundtrip_with_checkpoint() {
        let mut machine = ScriptedMachine::new();
        let mut source = explorer(&[0.5]);
        run_to_first_checkpoint(&mut source, &mut machine);
        let blob = source.export_session().unwrap();

        let mut target_machine = ScriptedMachine::new();
        let mut target = explorer(&[0.5]);
        let kind = target.import_session(&mut target_machine, &blob).unwrap();

        assert_eq!(kind, RestartKind::Checkpoint);
        assert_eq!(target.active_checkpoint(), source.active_checkpoint());
        assert_eq!(target_machine.current_cycle(), 1000);
        assert_eq!(target.export_session().unwrap(), blob);
    }

    #[test]
    fn malformed_import_leaves_session_untouched() {
        let mut machine = ScriptedMachine::new();
        let mut ex = explorer(&[0.5]);
        run_to_first_checkpoint(&mut ex, &mut machine);
        let before = ex.export_session().unwrap();

        assert!(ex.import_session(&mut machine, b"not a session").is_err());
        let truncated = &before[..before.len() - 3];
        assert!(ex.import_session(&mut machine, truncated).is_err());

        assert_eq!(ex.export_session().unwrap(), before);
        assert!(ex.is_running());
        assert_eq!(ex.area(), 1);
    }

    #[test]
    fn corrupt_stored_session_starts_fresh() {
        let mut store = MemoryStore::new();
        store.put(KEY, b"TBSS garbage that will not decode").unwrap();
        let mut machine = ScriptedMachine::new();
        let mut ex = explorer_with_store(Box::new(store), &[0.5]);

        assert_eq!(ex.start(&mut machine), RestartKind::Cold);
        assert_eq!(ex.timeline().len(), 1);
        assert_eq!(ex.timeline().get(0).unwrap().kind, CommandKind::MoveStart);
        assert_eq!(*ex.counters(), ExplorationCounters::default());
    }

    #[test]
    fn file_store_session_resumes_in_new_explorer() {
        let tmp = tempfile::TempDir::new().unwrap();

        let mut machine = ScriptedMachine::new();
        let mut first = explorer_with_store(Box::new(FileStore::new(tmp.path())), &[0.5]);
        run_to_first_checkpoint(&mut first, &mut machine);

        let mut fresh_machine = ScriptedMachine::new();
        let mut second = explorer_with_store(Box::new(FileStore::new(tmp.path())), &[0.5]);
        assert_eq!(second.start(&mut fresh_machine), RestartKind::Checkpoint);

        assert_eq!(second.timeline().commands(), first.timeline().commands());
        assert_eq!(second.area(), 1);
        assert_eq!(fresh_machine.current_cycle(), 1000);
    }

    #[test]
    fn reset_returns_to_seed_and_clears_store() {
        let mut machine = ScriptedMachine::new();
        let mut ex = explorer(&[0.5]);
        run_to_first_checkpoint(&mut ex, &mut machine);
        machine.set_vertical(40);
        ex.on_sync(&mut machine, 1500);
        assert!(ex.counters().total_restarts > 0);

        ex.reset(true);

        assert!(!ex.is_running());
        assert_eq!(ex.timeline().len(), 1);
        assert!(ex.active_checkpoint().is_none());
        assert_eq!(*ex.counters(), ExplorationCounters::default());
        assert_eq!(ex.store().get(KEY).unwrap(), None);

        // start keeps the reset state instead of reloading anything
        machine.set_vertical(0);
        assert_eq!(ex.start(&mut machine), RestartKind::Cold);
        assert_eq!(ex.timeline().len(), 1);
    }

    #[test]
    fn reset_without_clearing_keeps_store_record() {
        let mut machine = ScriptedMachine::new();
        let mut ex = explorer(&[0.5]);
        run_to_first_checkpoint(&mut ex, &mut machine);

        ex.reset(false);

        assert_eq!(ex.timeline().len(), 1);
        assert!(ex.store().get(KEY).unwrap().is_some());
    }
}
