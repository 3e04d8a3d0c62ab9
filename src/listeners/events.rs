//! App mention registration and acknowledgment.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::{
    app::{EventOptions, GenericApp, LazyHandler, ack::Ack, event::EventKind},
    base::types::RegistrationError,
};

/// Attach the app mention subscription to `app`.
///
/// Mentions are acknowledged by [`respond_within_3_seconds`]; `lazy` handlers are run by the host
/// afterwards, in order of spawning. Call once at startup.
#[instrument(skip_all)]
pub fn listener(app: &dyn GenericApp, lazy: Vec<Arc<dyn LazyHandler>>) -> Result<(), RegistrationError> {
    app.event(EventKind::AppMention, EventOptions::new().with_ack(respond_within_3_seconds).with_lazy(lazy))
}

/// Confirm receipt of the event. Nothing else may happen here.
pub fn respond_within_3_seconds(ack: Ack) {
    debug!("Acknowledging app mention.");
    ack.ack();
}

// Tests.

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::{
        app::{App, event::Event},
        base::types::Void,
    };

    struct Counting(Arc<AtomicUsize>);

    #[async_trait]
    impl LazyHandler for Counting {
        async fn process(&self, _event: &Event) -> Void {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn acknowledger_invokes_handle_once() {
        let count = Arc::new(AtomicUsize::new(0));
        let ack = Ack::new({
            let count = count.clone();
            move || {
                count.fetch_add(1, Ordering::SeqCst);
            }
        });

        respond_within_3_seconds(ack);

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn listener_subscribes_only_to_mentions() {
        let app = App::new();
        app.initialize("UBOT");

        listener(&app, vec![Arc::new(Counting(Arc::new(AtomicUsize::new(0))))]).unwrap();

        assert!(app.is_subscribed(EventKind::AppMention));
        assert_eq!(app.subscription_count(), 1);
    }

    #[test]
    fn listener_fails_on_uninitialized_app() {
        let app = App::new();

        assert_eq!(listener(&app, Vec::new()), Err(RegistrationError::NotInitialized));
        assert_eq!(app.subscription_count(), 0);
    }
}
