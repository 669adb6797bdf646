//! Timer engine: the focus/break state machine
//!
//! Remaining time while running is always derived from an absolute
//! wall-clock deadline, never decremented per tick. A tick that fires late,
//! or not at all, is corrected by the next recomputation.

use std::{sync::Arc, time::Duration};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::{
    chime::Chime,
    clock::Clock,
    notifier::CompletionNotifier,
    policy::{self, SessionKind},
    scheduler::{Scheduler, TickHandle, TickSignal},
};
use crate::{
    state::{CompletedStats, DurableTimer, RunState, SessionType, Settings, TimerSnapshot},
    storage::TimerStore,
};

/// Interval between scheduled ticks while running
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Collaborators injected into the engine
#[derive(Clone)]
pub struct EngineDeps {
    pub clock: Arc<dyn Clock>,
    pub scheduler: Arc<dyn Scheduler>,
    pub chime: Arc<dyn Chime>,
    pub notifier: Arc<dyn CompletionNotifier>,
    pub store: TimerStore,
}

/// A session that ran out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Completion {
    pub finished: SessionKind,
    pub next: SessionKind,
    pub completed_count: u32,
    /// Minutes credited to the focus total; `None` when a break finished
    pub minutes_added: Option<u32>,
}

/// Result of recomputing the remaining time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TickOutcome {
    /// Remaining seconds computed from the deadline, before any transition
    pub remaining_seconds: u32,
    pub completion: Option<Completion>,
}

/// Seconds left until `ends_at_ms`, rounded to the nearest second, never negative
pub fn seconds_until(ends_at_ms: i64, now_ms: i64) -> u32 {
    let ms = ends_at_ms.saturating_sub(now_ms).max(0);
    u32::try_from((ms + 500) / 1000).unwrap_or(u32::MAX)
}

/// Owns the timer state and applies every transition
pub struct TimerEngine {
    deps: EngineDeps,
    on_tick: TickSignal,
    settings: Settings,
    stats: CompletedStats,
    timer: DurableTimer,
    run: RunState,
    ticker: Option<TickHandle>,
}

impl TimerEngine {
    /// Build an engine from whatever is in storage.
    ///
    /// A restored engine is always stopped; `on_tick` is handed to the
    /// scheduler whenever the engine starts running.
    pub fn restore(deps: EngineDeps, on_tick: TickSignal) -> Self {
        let settings = deps.store.load_settings();
        let stats = deps.store.load_completed();
        let snapshot = deps.store.load_snapshot(settings.focus_minutes);

        let mut timer = DurableTimer::from_snapshot(&snapshot);
        if timer.session == SessionType::Break {
            timer.committed_focus_minutes = None;
        }
        let total = policy::total_session_seconds(
            timer.session,
            &settings,
            timer.committed_focus_minutes,
            stats.completed_pomodoros,
        );
        timer.remaining_seconds = timer.remaining_seconds.min(total);

        info!(
            "Restored timer: session={}, remaining={}s, completed={}",
            timer.session.as_str(),
            timer.remaining_seconds,
            stats.completed_pomodoros
        );

        Self {
            deps,
            on_tick,
            settings,
            stats,
            timer,
            run: RunState::Stopped,
            ticker: None,
        }
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    pub fn stats(&self) -> CompletedStats {
        self.stats
    }

    pub fn run_state(&self) -> RunState {
        self.run
    }

    pub fn session_type(&self) -> SessionType {
        self.timer.session
    }

    pub fn session_kind(&self) -> SessionKind {
        policy::session_kind(self.timer.session, self.stats.completed_pomodoros)
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.timer.remaining_seconds
    }

    pub fn committed_focus_minutes(&self) -> Option<u32> {
        self.timer.committed_focus_minutes
    }

    pub fn is_running(&self) -> bool {
        self.run.is_running()
    }

    pub fn is_paused(&self) -> bool {
        self.run.is_paused()
    }

    /// Whether a tick callback is currently scheduled
    pub fn is_ticking(&self) -> bool {
        self.ticker.is_some()
    }

    /// Total length of the current session for progress display
    pub fn total_seconds(&self) -> u32 {
        policy::total_session_seconds(
            self.timer.session,
            &self.settings,
            self.timer.committed_focus_minutes,
            self.stats.completed_pomodoros,
        )
    }

    pub fn progress_percent(&self) -> f64 {
        policy::progress_percent(
            self.timer.session,
            self.timer.remaining_seconds,
            self.total_seconds(),
        )
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot::from_parts(&self.timer, self.run)
    }

    /// Stopped|Paused -> Running
    pub fn start(&mut self) {
        if self.run.is_running() {
            return;
        }
        self.run = RunState::Running {
            ends_at_ms: self.deadline_from_now(),
        };
        self.capture_committed();
        self.arm_ticker();

        info!(
            "Timer started: session={}, remaining={}s",
            self.session_kind().as_str(),
            self.timer.remaining_seconds
        );
        self.persist_snapshot();
    }

    /// Running -> Paused, freezing the remaining time at its current value
    pub fn pause(&mut self) {
        if !self.run.is_running() {
            return;
        }
        // Bring the countdown up to date first; this may complete the session
        self.recompute();

        self.run = RunState::Paused;
        self.cancel_ticker();

        info!(
            "Timer paused: session={}, remaining={}s",
            self.session_kind().as_str(),
            self.timer.remaining_seconds
        );
        self.persist_snapshot();
    }

    /// Start when not running, pause otherwise
    pub fn toggle(&mut self) {
        if self.run.is_running() {
            self.pause();
        } else {
            self.start();
        }
    }

    /// Scheduled tick; a no-op unless running
    pub fn tick(&mut self) -> TickOutcome {
        self.recompute().unwrap_or(TickOutcome {
            remaining_seconds: self.timer.remaining_seconds,
            completion: None,
        })
    }

    /// Any state -> Stopped at the start of the current session type
    pub fn reset(&mut self) {
        self.cancel_ticker();
        self.run = RunState::Stopped;
        self.timer.committed_focus_minutes = None;
        self.timer.remaining_seconds = self.total_seconds();

        info!(
            "Timer reset: session={}, remaining={}s",
            self.session_kind().as_str(),
            self.timer.remaining_seconds
        );
        self.persist_snapshot();
    }

    /// Switch Focus <-> Break without counting a completion
    pub fn skip(&mut self) {
        let from = self.session_kind();
        self.timer.session = self.timer.session.toggled();
        self.timer.committed_focus_minutes = None;
        self.timer.remaining_seconds = self.total_seconds();

        match self.run {
            RunState::Running { .. } => self.rearm(),
            // Clear the pause so the next settings change resyncs
            RunState::Paused => self.run = RunState::Stopped,
            RunState::Stopped => {}
        }

        info!(
            "Skipped {} -> {} ({}), remaining={}s",
            from.as_str(),
            self.session_kind().as_str(),
            self.run.as_str(),
            self.timer.remaining_seconds
        );
        self.persist_snapshot();
    }

    /// Replace the settings; a stopped timer resyncs its remaining time
    pub fn update_settings(&mut self, settings: Settings) {
        self.settings = settings.clamped();
        if let Err(e) = self.deps.store.save_settings(&self.settings) {
            warn!("Failed to persist settings: {}", e);
        }

        if self.run == RunState::Stopped {
            self.timer.committed_focus_minutes = None;
            self.timer.remaining_seconds = self.total_seconds();
            debug!(
                "Settings synced into stopped timer: remaining={}s",
                self.timer.remaining_seconds
            );
            self.persist_snapshot();
        } else {
            debug!("Settings changed mid-session; countdown left untouched");
        }
    }

    /// Zero the completed-session accumulators
    pub fn reset_completed(&mut self) {
        self.stats = CompletedStats::default();
        info!("Completed stats reset");
        self.persist_stats();
    }

    /// Teardown: bring the countdown up to date, stop ticking and persist
    pub fn shutdown(&mut self) {
        self.recompute();
        self.cancel_ticker();
        self.persist_snapshot();
        debug!("Timer engine shut down ({})", self.run.as_str());
    }

    /// Recompute the remaining time from the deadline and complete the
    /// session if it ran out. `None` when not running.
    pub(crate) fn recompute(&mut self) -> Option<TickOutcome> {
        let ends_at_ms = self.run.ends_at_ms()?;
        let now = self.deps.clock.now_ms();
        // The deadline was set from the remaining time; never count back up
        let remaining = seconds_until(ends_at_ms, now).min(self.timer.remaining_seconds);
        self.timer.remaining_seconds = remaining;

        let completion = if remaining == 0 {
            Some(self.complete_session())
        } else {
            debug!("Tick: remaining={}s", remaining);
            self.persist_snapshot();
            None
        };

        Some(TickOutcome {
            remaining_seconds: remaining,
            completion,
        })
    }

    fn complete_session(&mut self) -> Completion {
        let finished = self.session_kind();
        let minutes_added = match self.timer.session {
            SessionType::Focus => {
                if let Err(e) = self.deps.chime.play() {
                    warn!("Completion chime failed: {}", e);
                }

                let minutes = self
                    .timer
                    .committed_focus_minutes
                    .unwrap_or(self.settings.focus_minutes);
                self.stats.record(minutes);
                self.persist_stats();
                self.deps
                    .notifier
                    .focus_completed(self.stats.completed_pomodoros, minutes);

                self.timer.committed_focus_minutes = None;
                self.timer.session = SessionType::Break;
                Some(minutes)
            }
            SessionType::Break => {
                self.timer.session = SessionType::Focus;
                None
            }
        };

        self.timer.remaining_seconds = self.total_seconds();
        // Auto-continue into the next session
        self.rearm();
        self.persist_snapshot();

        let completion = Completion {
            finished,
            next: self.session_kind(),
            completed_count: self.stats.completed_pomodoros,
            minutes_added,
        };
        info!(
            "{} complete, continuing with {} ({} completed)",
            finished.as_str(),
            completion.next.as_str(),
            completion.completed_count
        );
        completion
    }

    /// Fresh deadline for a running timer, capturing the focus length if needed
    fn rearm(&mut self) {
        if self.run.is_running() {
            self.capture_committed();
            self.timer.remaining_seconds = self.total_seconds();
            self.run = RunState::Running {
                ends_at_ms: self.deadline_from_now(),
            };
        }
    }

    /// Lock in the focus length for a running, uncommitted focus session
    fn capture_committed(&mut self) {
        if self.run.is_running()
            && self.timer.session == SessionType::Focus
            && self.timer.committed_focus_minutes.is_none()
        {
            self.timer.committed_focus_minutes = Some(self.settings.focus_minutes);
        }
    }

    fn deadline_from_now(&self) -> i64 {
        self.deps.clock.now_ms() + i64::from(self.timer.remaining_seconds) * 1000
    }

    fn arm_ticker(&mut self) {
        if self.ticker.is_none() {
            let handle = self
                .deps
                .scheduler
                .every(TICK_PERIOD, Arc::clone(&self.on_tick));
            self.ticker = Some(handle);
        }
    }

    fn cancel_ticker(&mut self) {
        if let Some(handle) = self.ticker.take() {
            handle.cancel();
        }
    }

    fn persist_snapshot(&self) {
        if let Err(e) = self.deps.store.save_snapshot(&self.snapshot()) {
            warn!("Failed to persist timer snapshot: {}", e);
        }
    }

    fn persist_stats(&self) {
        if let Err(e) = self.deps.store.save_completed(&self.stats) {
            warn!("Failed to persist completed stats: {}", e);
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{
        presentation::{format_clock, RingView, UnitFill},
        storage::{MemoryStore, StoragePort},
        timer::{
            chime::{ChimeError, SilentChime},
            clock::FakeClock,
            notifier::NoopNotifier,
            scheduler::ManualScheduler,
        },
    };
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    };

    #[derive(Default)]
    pub(crate) struct RecordingNotifier {
        pub calls: Mutex<Vec<(u32, u32)>>,
    }

    impl CompletionNotifier for RecordingNotifier {
        fn focus_completed(&self, completed_count: u32, minutes_added: u32) {
            self.calls.lock().unwrap().push((completed_count, minutes_added));
        }
    }

    impl RecordingNotifier {
        pub fn calls(&self) -> Vec<(u32, u32)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[derive(Default)]
    struct BrokenSpeaker {
        attempts: AtomicUsize,
    }

    impl Chime for BrokenSpeaker {
        fn play(&self) -> Result<(), ChimeError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(std::io::Error::new(std::io::ErrorKind::Other, "no audio device").into())
        }
    }

    pub(crate) struct Harness {
        pub engine: TimerEngine,
        pub clock: FakeClock,
        pub scheduler: ManualScheduler,
        pub notifier: Arc<RecordingNotifier>,
        pub storage: Arc<MemoryStore>,
        pending: Arc<AtomicUsize>,
    }

    impl Harness {
        pub fn new(focus: u32, short: u32, long: u32) -> Self {
            Self::build(Arc::new(MemoryStore::new()), Settings::new(focus, short, long), None, Arc::new(SilentChime))
        }

        pub fn with_completed(focus: u32, completed: u32) -> Self {
            let stats = CompletedStats {
                completed_pomodoros: completed,
                total_focus_minutes: completed * focus,
            };
            Self::build(
                Arc::new(MemoryStore::new()),
                Settings::new(focus, 5, 30),
                Some(stats),
                Arc::new(SilentChime),
            )
        }

        fn build(
            storage: Arc<MemoryStore>,
            settings: Settings,
            stats: Option<CompletedStats>,
            chime: Arc<dyn Chime>,
        ) -> Self {
            let store = TimerStore::new(storage.clone());
            store.save_settings(&settings).unwrap();
            if let Some(stats) = stats {
                store.save_completed(&stats).unwrap();
            }
            Self::restore_from(storage, FakeClock::new(), chime)
        }

        fn restore_from(storage: Arc<MemoryStore>, clock: FakeClock, chime: Arc<dyn Chime>) -> Self {
            let scheduler = ManualScheduler::new();
            let notifier = Arc::new(RecordingNotifier::default());
            let pending = Arc::new(AtomicUsize::new(0));
            let signal_pending = Arc::clone(&pending);

            let deps = EngineDeps {
                clock: Arc::new(clock.clone()),
                scheduler: Arc::new(scheduler.clone()),
                chime,
                notifier: notifier.clone(),
                store: TimerStore::new(storage.clone()),
            };
            let engine = TimerEngine::restore(
                deps,
                Arc::new(move || {
                    signal_pending.fetch_add(1, Ordering::SeqCst);
                }),
            );

            Self { engine, clock, scheduler, notifier, storage, pending }
        }

        pub fn advance(&self, secs: u64) {
            self.clock.advance(Duration::from_secs(secs));
        }

        /// Fire the scheduled callback once and apply the resulting ticks
        pub fn fire_tick(&mut self) -> Vec<TickOutcome> {
            self.scheduler.fire();
            let signalled = self.pending.swap(0, Ordering::SeqCst);
            (0..signalled).map(|_| self.engine.tick()).collect()
        }

        pub fn ring(&self) -> RingView {
            RingView::for_engine(&self.engine)
        }
    }

    #[test]
    fn start_captures_committed_length_and_deadline() {
        let mut h = Harness::new(1, 5, 30);
        let now = h.clock.now_ms();
        h.engine.start();

        assert_eq!(h.engine.committed_focus_minutes(), Some(1));
        assert_eq!(h.engine.run_state(), RunState::Running { ends_at_ms: now + 60_000 });
        assert!(h.engine.is_ticking());
        assert_eq!(h.scheduler.active(), 1);
    }

    #[test]
    fn ticks_recompute_from_deadline() {
        let mut h = Harness::new(1, 5, 30);
        h.engine.start();

        h.advance(1);
        assert_eq!(h.fire_tick()[0].remaining_seconds, 59);

        // Three seconds pass with no callback; the next tick self-corrects
        h.advance(3);
        assert_eq!(h.fire_tick()[0].remaining_seconds, 56);

        h.clock.advance(Duration::from_millis(400));
        assert_eq!(h.fire_tick()[0].remaining_seconds, 56);
        h.clock.advance(Duration::from_millis(200));
        assert_eq!(h.fire_tick()[0].remaining_seconds, 55);
    }

    #[test]
    fn single_late_tick_completes_exactly_once() {
        let mut h = Harness::new(1, 5, 30);
        h.engine.start();

        h.advance(70);
        let outcomes = h.fire_tick();
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].remaining_seconds, 0);
        let completion = outcomes[0].completion.expect("session should complete");
        assert_eq!(completion.finished, SessionKind::Focus);
        assert_eq!(completion.next, SessionKind::ShortBreak);
        assert_eq!(h.notifier.calls(), vec![(1, 1)]);

        // The break runs from the moment of detection, not from the missed deadline
        assert!(h.engine.is_running());
        assert_eq!(h.engine.remaining_seconds(), 300);
        let outcomes = h.fire_tick();
        assert!(outcomes[0].completion.is_none());
        assert_eq!(h.engine.stats().completed_pomodoros, 1);
        assert_eq!(h.notifier.calls().len(), 1);
    }

    #[test]
    fn pause_freezes_progress_through_settings_change() {
        let mut h = Harness::new(1, 5, 30);
        h.engine.start();
        h.advance(5);
        h.engine.pause();

        assert_eq!(h.engine.remaining_seconds(), 55);
        let before = h.engine.progress_percent();
        assert!((before - 8.333).abs() < 0.01, "progress was {}", before);
        assert_eq!(h.scheduler.active(), 0);

        let mut settings = h.engine.settings();
        settings.focus_minutes = 10;
        h.engine.update_settings(settings);

        assert_eq!(h.engine.remaining_seconds(), 55);
        assert_eq!(h.engine.progress_percent(), before);
        assert_eq!(h.engine.settings().focus_minutes, 10);
    }

    #[test]
    fn running_countdown_ignores_settings_change() {
        let mut h = Harness::new(1, 5, 30);
        h.engine.start();
        h.advance(10);
        h.fire_tick();

        h.engine.update_settings(Settings::new(45, 5, 30));
        assert_eq!(h.engine.remaining_seconds(), 50);
        assert_eq!(h.engine.total_seconds(), 60);
    }

    #[test]
    fn stopped_timer_syncs_settings() {
        let mut h = Harness::new(25, 5, 30);
        h.engine.update_settings(Settings::new(40, 5, 30));
        assert_eq!(h.engine.remaining_seconds(), 2400);

        h.engine.skip();
        h.engine.update_settings(Settings::new(40, 7, 30));
        assert_eq!(h.engine.remaining_seconds(), 420);
    }

    #[test]
    fn reset_is_idempotent() {
        let mut h = Harness::new(25, 5, 30);
        h.engine.start();
        h.advance(100);
        h.fire_tick();

        h.engine.reset();
        let once = h.engine.remaining_seconds();
        h.engine.reset();

        assert_eq!(once, 1500);
        assert_eq!(h.engine.remaining_seconds(), once);
        assert_eq!(h.engine.run_state(), RunState::Stopped);
        assert_eq!(h.engine.committed_focus_minutes(), None);
        assert_eq!(h.scheduler.active(), 0);
    }

    #[test]
    fn reset_keeps_session_type_and_counters() {
        let mut h = Harness::with_completed(25, 4);
        h.engine.skip();
        h.engine.start();
        h.advance(60);
        h.engine.reset();

        assert_eq!(h.engine.session_kind(), SessionKind::LongBreak);
        assert_eq!(h.engine.remaining_seconds(), 1800);
        assert_eq!(h.engine.stats().completed_pomodoros, 4);
    }

    #[test]
    fn skip_with_no_completed_sessions_is_short_break() {
        let mut h = Harness::new(25, 5, 30);
        h.engine.skip();

        assert_eq!(h.engine.session_kind(), SessionKind::ShortBreak);
        assert_eq!(h.engine.remaining_seconds(), 300);
        assert_eq!(h.ring().filled_units(), 0);
        assert!(h.notifier.calls().is_empty());
    }

    #[test]
    fn skip_after_fourth_session_is_long_break_with_full_ring() {
        let mut h = Harness::with_completed(25, 4);
        h.engine.skip();

        assert_eq!(h.engine.session_kind(), SessionKind::LongBreak);
        assert_eq!(h.engine.remaining_seconds(), 1800);
        assert_eq!(h.ring().filled_units(), 4);
        assert!(h.ring().units.iter().all(|u| *u == UnitFill::Full));
    }

    #[test]
    fn skip_while_running_sets_fresh_deadline() {
        let mut h = Harness::new(25, 5, 30);
        h.engine.start();
        h.advance(10);
        h.engine.skip();

        let now = h.clock.now_ms();
        assert_eq!(h.engine.session_type(), SessionType::Break);
        assert_eq!(h.engine.run_state(), RunState::Running { ends_at_ms: now + 300_000 });
        assert_eq!(h.engine.committed_focus_minutes(), None);

        // Back into focus while running captures the length again
        h.engine.skip();
        assert_eq!(h.engine.committed_focus_minutes(), Some(25));
        assert_eq!(h.engine.remaining_seconds(), 1500);
        assert_eq!(h.scheduler.active(), 1);
    }

    #[test]
    fn skip_while_paused_unblocks_settings_sync() {
        let mut h = Harness::new(1, 5, 30);
        h.engine.start();
        h.advance(60);
        let outcomes = h.fire_tick();
        assert!(outcomes[0].completion.is_some());
        assert_eq!(h.notifier.calls(), vec![(1, 1)]);
        assert_eq!(h.engine.session_kind(), SessionKind::ShortBreak);

        h.engine.pause();
        h.engine.skip();
        assert_eq!(h.engine.session_type(), SessionType::Focus);
        assert_eq!(h.engine.run_state(), RunState::Stopped);
        assert_eq!(h.engine.remaining_seconds(), 60);

        h.engine.update_settings(Settings::new(2, 5, 30));
        assert_eq!(h.engine.remaining_seconds(), 120);
        assert_eq!(format_clock(h.engine.remaining_seconds()), "02:00");
    }

    #[test]
    fn running_break_ignores_break_length_change() {
        let mut h = Harness::new(25, 5, 30);
        h.engine.skip();
        h.engine.start();
        h.advance(10);
        h.fire_tick();
        assert_eq!(h.engine.remaining_seconds(), 290);

        h.engine.update_settings(Settings::new(25, 1, 30));
        h.advance(1);
        h.fire_tick();
        assert_eq!(h.engine.remaining_seconds(), 289);
        assert_eq!(h.engine.session_kind(), SessionKind::ShortBreak);
    }

    #[test]
    fn paused_break_resumes_where_it_stopped() {
        let mut h = Harness::new(25, 5, 30);
        h.engine.skip();
        h.engine.start();
        h.advance(20);
        h.fire_tick();
        h.engine.pause();
        assert_eq!(h.engine.remaining_seconds(), 280);

        h.engine.update_settings(Settings::new(25, 1, 30));
        assert_eq!(h.engine.remaining_seconds(), 280);

        h.engine.start();
        h.advance(1);
        h.fire_tick();
        assert_eq!(h.engine.remaining_seconds(), 279);
    }

    #[test]
    fn reset_completed_during_long_break_keeps_countdown() {
        let mut h = Harness::with_completed(25, 4);
        h.engine.skip();
        assert_eq!(h.engine.session_kind(), SessionKind::LongBreak);
        h.engine.start();
        h.advance(10);
        h.fire_tick();
        assert_eq!(h.engine.remaining_seconds(), 1790);

        h.engine.reset_completed();
        h.advance(1);
        h.fire_tick();
        assert_eq!(h.engine.remaining_seconds(), 1789);
    }

    #[test]
    fn completes_without_a_listener() {
        let storage = Arc::new(MemoryStore::new());
        let clock = FakeClock::new();
        let store = TimerStore::new(storage.clone());
        store.save_settings(&Settings::new(1, 5, 30)).unwrap();
        let deps = EngineDeps {
            clock: Arc::new(clock.clone()),
            scheduler: Arc::new(ManualScheduler::new()),
            chime: Arc::new(SilentChime),
            notifier: Arc::new(NoopNotifier),
            store,
        };
        let mut engine = TimerEngine::restore(deps, Arc::new(|| {}));

        engine.start();
        clock.advance(Duration::from_secs(60));
        let outcome = engine.tick();

        assert!(outcome.completion.is_some());
        assert_eq!(engine.stats().completed_pomodoros, 1);
        assert_eq!(engine.session_kind(), SessionKind::ShortBreak);
    }

    #[test]
    fn break_completion_returns_to_focus_and_keeps_running() {
        let mut h = Harness::new(1, 1, 30);
        h.engine.start();
        h.advance(60);
        h.fire_tick();
        assert_eq!(h.engine.committed_focus_minutes(), None);

        h.engine.update_settings(Settings::new(3, 1, 30));
        h.advance(60);
        let outcome = h.fire_tick()[0];
        let completion = outcome.completion.unwrap();
        assert_eq!(completion.finished, SessionKind::ShortBreak);
        assert_eq!(completion.minutes_added, None);

        assert_eq!(h.engine.session_type(), SessionType::Focus);
        assert!(h.engine.is_running());
        assert_eq!(h.engine.committed_focus_minutes(), Some(3));
        assert_eq!(h.engine.remaining_seconds(), 180);
        assert_eq!(h.notifier.calls().len(), 1);
    }

    #[test]
    fn totals_use_committed_lengths_across_four_sessions() {
        let mut h = Harness::new(1, 5, 30);
        let mut expected_total = 0;

        for (focus, mid_session_change) in [(1, None), (2, Some(5)), (3, None), (1, None)] {
            h.engine.update_settings(Settings::new(focus, 5, 30));
            h.engine.start();
            if let Some(changed) = mid_session_change {
                h.advance(30);
                h.fire_tick();
                h.engine.update_settings(Settings::new(changed, 5, 30));
                h.advance(u64::from(focus) * 60 - 30);
            } else {
                h.advance(u64::from(focus) * 60);
            }
            let completion = h.fire_tick()[0].completion.unwrap();
            assert_eq!(completion.minutes_added, Some(focus));
            expected_total += focus;

            // Skip out of the break and back to a stopped focus session
            h.engine.skip();
            h.engine.reset();
        }

        let stats = h.engine.stats();
        assert_eq!(stats.completed_pomodoros, 4);
        assert_eq!(stats.total_focus_minutes, expected_total);
        assert_eq!(expected_total, 7);
        assert_eq!(h.notifier.calls(), vec![(1, 1), (2, 2), (3, 3), (4, 1)]);
    }

    #[test]
    fn fourth_completion_leads_to_long_break() {
        let mut h = Harness::with_completed(1, 3);
        h.engine.start();
        h.advance(60);
        let completion = h.fire_tick()[0].completion.unwrap();

        assert_eq!(completion.next, SessionKind::LongBreak);
        assert_eq!(h.engine.remaining_seconds(), 1800);
        assert_eq!(h.ring().filled_units(), 4);
    }

    #[test]
    fn chime_failure_does_not_block_completion() {
        let chime = Arc::new(BrokenSpeaker::default());
        let storage = Arc::new(MemoryStore::new());
        TimerStore::new(storage.clone())
            .save_settings(&Settings::new(1, 5, 30))
            .unwrap();
        let mut h = Harness::restore_from(storage, FakeClock::new(), chime.clone());

        h.engine.start();
        h.advance(60);
        let outcome = h.fire_tick()[0];

        assert!(outcome.completion.is_some());
        assert_eq!(chime.attempts.load(Ordering::SeqCst), 1);
        assert_eq!(h.engine.stats().completed_pomodoros, 1);
    }

    #[test]
    fn restart_restores_durable_state_stopped() {
        let mut h = Harness::new(25, 5, 30);
        h.engine.start();
        h.advance(100);
        h.fire_tick();
        let storage = h.storage.clone();
        let clock = h.clock.clone();
        drop(h);

        let restored = Harness::restore_from(storage, clock, Arc::new(SilentChime));
        assert_eq!(restored.engine.run_state(), RunState::Stopped);
        assert_eq!(restored.engine.remaining_seconds(), 1400);
        assert_eq!(restored.engine.committed_focus_minutes(), Some(25));
        assert_eq!(restored.scheduler.active(), 0);
    }

    #[test]
    fn dropping_engine_cancels_tick() {
        let mut h = Harness::new(25, 5, 30);
        h.engine.start();
        let scheduler = h.scheduler.clone();
        assert_eq!(scheduler.active(), 1);

        drop(h);
        assert_eq!(scheduler.active(), 0);
    }

    #[test]
    fn shutdown_stops_ticking_and_saves_progress() {
        let mut h = Harness::new(25, 5, 30);
        h.engine.start();
        h.advance(30);
        h.engine.shutdown();

        assert_eq!(h.scheduler.active(), 0);
        let saved = TimerStore::new(h.storage.clone()).load_snapshot(25);
        assert_eq!(saved.remaining_seconds, 1470);
    }

    #[test]
    fn snapshot_write_failure_is_swallowed() {
        let storage = Arc::new(MemoryStore::with_quota(0));
        let mut h = Harness::restore_from(storage.clone(), FakeClock::new(), Arc::new(SilentChime));

        h.engine.start();
        h.advance(5);
        h.fire_tick();
        assert_eq!(h.engine.remaining_seconds(), 1495);
        assert_eq!(storage.get(crate::storage::SNAPSHOT_KEY).unwrap(), None);
    }

    #[test]
    fn reset_completed_zeroes_counters() {
        let mut h = Harness::with_completed(25, 6);
        h.engine.reset_completed();

        assert_eq!(h.engine.stats(), CompletedStats::default());
        let reloaded = TimerStore::new(h.storage.clone()).load_completed();
        assert_eq!(reloaded, CompletedStats::default());
    }

    #[test]
    fn seconds_until_rounds_and_floors_at_zero() {
        assert_eq!(seconds_until(10_000, 0), 10);
        assert_eq!(seconds_until(10_000, 500), 10);
        assert_eq!(seconds_until(10_000, 501), 9);
        assert_eq!(seconds_until(10_000, 20_000), 0);
    }
}
