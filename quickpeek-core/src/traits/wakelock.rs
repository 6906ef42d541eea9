//! Sleep-prevention token trait

use embassy_time::Duration;

/// Keeps the host awake while peek work is outstanding
///
/// The token is not reference counted: one `release` undoes any number of
/// `acquire` calls. All methods must be safe to call from interrupt
/// context.
pub trait WakeLock {
    /// Prevent system sleep until released
    fn acquire(&self);

    /// Allow system sleep
    fn release(&self);

    /// Allow system sleep once `timeout` has elapsed
    fn release_after(&self, timeout: Duration);
}
