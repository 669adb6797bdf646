//! Focus-completion notification

/// Told once per completed focus session. Implementations must not block
/// and must swallow their own failures.
pub trait CompletionNotifier: Send + Sync {
    fn focus_completed(&self, completed_count: u32, minutes_added: u32);
}

/// Ignores every notification
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl CompletionNotifier for NoopNotifier {
    fn focus_completed(&self, _completed_count: u32, _minutes_added: u32) {}
}
