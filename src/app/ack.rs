//! Single-use acknowledgment handle.

use std::fmt;

/// A capability that confirms receipt of one event to the platform.
///
/// Calling [`Ack::ack`] consumes the handle, so it can be invoked at most once. A handle dropped
/// without being invoked leaves the event unacknowledged.
pub struct Ack {
    on_ack: Option<Box<dyn FnOnce() + Send>>,
}

impl Ack {
    pub fn new<F>(on_ack: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self { on_ack: Some(Box::new(on_ack)) }
    }

    /// Signal receipt of the event.
    pub fn ack(mut self) {
        if let Some(on_ack) = self.on_ack.take() {
            on_ack();
        }
    }
}

impl fmt::Debug for Ack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ack").field("pending", &self.on_ack.is_some()).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use super::*;

    #[test]
    fn ack_runs_callback_once() {
        let count = Arc::new(AtomicUsize::new(0));
        let ack = Ack::new({
            let count = count.clone();
            move || {
                count.fetch_add(1, Ordering::SeqCst);
            }
        });

        assert_eq!(format!("{ack:?}"), "Ack { pending: true }");
        ack.ack();

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dropping_without_ack_never_runs_callback() {
        let count = Arc::new(AtomicUsize::new(0));
        let ack = Ack::new({
            let count = count.clone();
            move || {
                count.fetch_add(1, Ordering::SeqCst);
            }
        });

        drop(ack);

        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
