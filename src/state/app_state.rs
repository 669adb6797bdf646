//! Main application state management

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Instant,
};
use chrono::{DateTime, Utc};
use tokio::{runtime::Handle, sync::mpsc};
use tracing::{debug, info};

use super::{Settings, SettingsPatch};
use crate::{
    analytics::{AnalyticsCounters, AnalyticsNotifier},
    config::Config,
    error::AppError,
    presentation::{CompletedSummary, TimerView},
    storage::{StoragePort, TimerStore},
    timer::{
        reconcile_on_foreground, Chime, Clock, EngineDeps, Reconciliation, Scheduler,
        SilentChime, TerminalBell, TickSignal, TimerEngine, TimerEvent,
    },
    todo::{TaskDocument, TaskList, TaskStore, TodoError},
};

/// Shared state behind every handler and background task
pub struct AppState {
    /// The countdown engine; all transitions go through this lock
    pub timer: Mutex<TimerEngine>,
    pub tasks: Mutex<TaskList>,
    pub analytics: Arc<AnalyticsCounters>,
    /// Feeds ticks and foreground events to the timer driver
    pub events_tx: mpsc::UnboundedSender<TimerEvent>,
    pub clock: Arc<dyn Clock>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    reset_key: Option<String>,
    /// Last action tracking
    last_action: Mutex<Option<String>>,
    last_action_time: Mutex<Option<DateTime<Utc>>>,
}

impl AppState {
    /// Restore everything from `storage` and wire the engine's tick callback
    /// into the returned event receiver
    pub fn assemble(
        config: &Config,
        storage: Arc<dyn StoragePort>,
        clock: Arc<dyn Clock>,
        scheduler: Arc<dyn Scheduler>,
        runtime: Handle,
    ) -> (Arc<Self>, mpsc::UnboundedReceiver<TimerEvent>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let analytics = Arc::new(AnalyticsCounters::open(
            Arc::clone(&storage),
            Arc::clone(&clock),
        ));
        let chime: Arc<dyn Chime> = if config.silent {
            Arc::new(SilentChime)
        } else {
            Arc::new(TerminalBell)
        };

        let deps = EngineDeps {
            clock: Arc::clone(&clock),
            scheduler,
            chime,
            notifier: Arc::new(AnalyticsNotifier::new(Arc::clone(&analytics), runtime)),
            store: TimerStore::new(Arc::clone(&storage)),
        };

        let tick_tx = events_tx.clone();
        let on_tick: TickSignal = Arc::new(move || {
            if tick_tx.send(TimerEvent::Tick).is_err() {
                debug!("Timer driver stopped; dropping tick");
            }
        });

        let engine = TimerEngine::restore(deps, on_tick);
        let tasks = TaskList::load(TaskStore::new(storage), Arc::clone(&clock));

        let state = Self {
            timer: Mutex::new(engine),
            tasks: Mutex::new(tasks),
            analytics,
            events_tx,
            clock,
            start_time: Instant::now(),
            port: config.port,
            host: config.host.clone(),
            reset_key: config.reset_key.clone(),
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
        };

        (Arc::new(state), events_rx)
    }

    fn lock_timer(&self) -> Result<MutexGuard<'_, TimerEngine>, AppError> {
        self.timer.lock().map_err(|_| AppError::LockPoisoned("timer"))
    }

    fn lock_tasks(&self) -> Result<MutexGuard<'_, TaskList>, AppError> {
        self.tasks.lock().map_err(|_| AppError::LockPoisoned("task list"))
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Apply a timer transition and return the resulting view
    pub fn update_timer<F>(&self, action: &str, transition: F) -> Result<TimerView, AppError>
    where
        F: FnOnce(&mut TimerEngine),
    {
        let mut engine = self.lock_timer()?;
        transition(&mut *engine);
        let view = TimerView::from_engine(&engine);
        drop(engine);

        info!("Timer action: {}", action);
        self.record_action(action);
        Ok(view)
    }

    pub fn timer_view(&self) -> Result<TimerView, AppError> {
        self.lock_timer().map(|engine| TimerView::from_engine(&engine))
    }

    pub fn start_timer(&self) -> Result<TimerView, AppError> {
        self.update_timer("start", TimerEngine::start)
    }

    pub fn pause_timer(&self) -> Result<TimerView, AppError> {
        self.update_timer("pause", TimerEngine::pause)
    }

    pub fn toggle_timer(&self) -> Result<TimerView, AppError> {
        self.update_timer("toggle", TimerEngine::toggle)
    }

    pub fn reset_timer(&self) -> Result<TimerView, AppError> {
        self.update_timer("reset", TimerEngine::reset)
    }

    pub fn skip_session(&self) -> Result<TimerView, AppError> {
        self.update_timer("skip", TimerEngine::skip)
    }

    /// Apply one event from the driver channel
    pub fn handle_event(&self, event: TimerEvent) -> Result<(), AppError> {
        match event {
            TimerEvent::Tick => {
                let outcome = self.lock_timer()?.tick();
                debug!("Tick: {}s remaining", outcome.remaining_seconds);
            }
            TimerEvent::Foreground => {
                self.foreground()?;
            }
        }
        Ok(())
    }

    /// Reconcile the countdown after the client or host comes back
    pub fn foreground(&self) -> Result<(Reconciliation, TimerView), AppError> {
        let mut engine = self.lock_timer()?;
        let reconciliation = reconcile_on_foreground(&mut engine);
        Ok((reconciliation, TimerView::from_engine(&engine)))
    }

    pub fn settings(&self) -> Result<Settings, AppError> {
        self.lock_timer().map(|engine| engine.settings())
    }

    /// Merge `patch` into the current settings; values are corrected into range
    pub fn update_settings(&self, patch: &SettingsPatch) -> Result<Settings, AppError> {
        let mut engine = self.lock_timer()?;
        let settings = engine.settings().patched(patch);
        engine.update_settings(settings);
        let applied = engine.settings();
        drop(engine);

        self.record_action("settings");
        Ok(applied)
    }

    pub fn reset_settings(&self) -> Result<Settings, AppError> {
        let mut engine = self.lock_timer()?;
        engine.update_settings(Settings::default());
        let applied = engine.settings();
        drop(engine);

        self.record_action("settings-reset");
        Ok(applied)
    }

    pub fn completed_summary(&self) -> Result<CompletedSummary, AppError> {
        self.lock_timer()
            .map(|engine| CompletedSummary::from_stats(&engine.stats()))
    }

    pub fn reset_completed(&self) -> Result<CompletedSummary, AppError> {
        let mut engine = self.lock_timer()?;
        engine.reset_completed();
        let summary = CompletedSummary::from_stats(&engine.stats());
        drop(engine);

        self.record_action("completed-reset");
        Ok(summary)
    }

    /// Current tasks in the stored document shape
    pub fn task_document(&self) -> Result<TaskDocument, AppError> {
        let tasks = self.lock_tasks()?;
        Ok(TaskDocument {
            tasks: tasks.tasks().to_vec(),
            last_modified: tasks.last_modified(),
        })
    }

    /// Run a task-list operation and return its result with the new list
    pub fn update_tasks<T, F>(&self, action: &str, op: F) -> Result<(T, TaskDocument), AppError>
    where
        F: FnOnce(&mut TaskList) -> Result<T, TodoError>,
    {
        let mut tasks = self.lock_tasks()?;
        let out = op(&mut tasks)?;
        let doc = TaskDocument {
            tasks: tasks.tasks().to_vec(),
            last_modified: tasks.last_modified(),
        };
        drop(tasks);

        debug!("Task action: {}", action);
        self.record_action(action);
        Ok((out, doc))
    }

    /// Whether `key` unlocks the analytics reset; always false when no key
    /// is configured
    pub fn reset_key_matches(&self, key: Option<&str>) -> bool {
        match (self.reset_key.as_deref(), key) {
            (Some(expected), Some(given)) => !expected.is_empty() && expected == given,
            _ => false,
        }
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}
