//! The hosting application object.
//!
//! This module provides the routing table listeners attach to and the dispatch path the chat
//! transport drives for every incoming event:
//! - Registering one subscription (ack callback plus lazy handlers) per event kind
//! - Handing a fresh acknowledgment handle to the ack callback on the fast path
//! - Spawning lazy handlers independently on the slow path

pub mod ack;
pub mod event;

use std::{
    collections::HashMap,
    fmt,
    sync::{
        Arc, OnceLock, PoisonError, RwLock,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::{Instrument, error, info, instrument, warn};

use crate::base::types::{RegistrationError, Void};

use self::{
    ack::Ack,
    event::{Event, EventKind},
};

/// Deadline the platform gives the ack callback before treating the event as timed out.
pub const ACK_DEADLINE: Duration = Duration::from_secs(3);

// Traits.

/// A deferred handler, invoked by the host outside the acknowledgment deadline.
#[async_trait]
pub trait LazyHandler: Send + Sync + 'static {
    /// Process one event.
    async fn process(&self, event: &Event) -> Void;

    /// Name used in logs.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Generic "application" trait that hosts must implement.
///
/// Listeners only ever see this seam, which keeps them testable against a mocked host.
pub trait GenericApp: Send + Sync {
    /// Attach a subscription for `kind`.
    ///
    /// Implementations must either attach the whole subscription or nothing.
    fn event(&self, kind: EventKind, options: EventOptions) -> Result<(), RegistrationError>;
}

// Structs.

/// Immediate callback invoked with the acknowledgment handle.
pub type AckFn = Arc<dyn Fn(Ack) + Send + Sync>;

/// Registration options for a single event kind.
#[derive(Clone, Default)]
pub struct EventOptions {
    ack: Option<AckFn>,
    lazy: Vec<Arc<dyn LazyHandler>>,
}

impl EventOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ack<F>(mut self, ack: F) -> Self
    where
        F: Fn(Ack) + Send + Sync + 'static,
    {
        self.ack = Some(Arc::new(ack));
        self
    }

    pub fn with_lazy(mut self, lazy: Vec<Arc<dyn LazyHandler>>) -> Self {
        self.lazy = lazy;
        self
    }

    pub fn has_ack(&self) -> bool {
        self.ack.is_some()
    }

    pub fn lazy(&self) -> &[Arc<dyn LazyHandler>] {
        &self.lazy
    }
}

impl fmt::Debug for EventOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventOptions")
            .field("ack", &self.has_ack())
            .field("lazy", &self.lazy.iter().map(|h| h.name()).collect::<Vec<_>>())
            .finish()
    }
}

/// An attached subscription.
struct Subscription {
    ack: AckFn,
    lazy: Vec<Arc<dyn LazyHandler>>,
}

struct AppInner {
    ack_deadline: Duration,
    bot_user_id: OnceLock<String>,
    subscriptions: RwLock<HashMap<EventKind, Arc<Subscription>>>,
}

/// In-process application object that routes events to their subscription.
///
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct App {
    inner: Arc<AppInner>,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    /// Create an empty, uninitialized application using the platform's [`ACK_DEADLINE`].
    pub fn new() -> Self {
        Self::with_ack_deadline(ACK_DEADLINE)
    }

    /// Create an empty, uninitialized application with a custom acknowledgment deadline.
    pub fn with_ack_deadline(ack_deadline: Duration) -> Self {
        Self {
            inner: Arc::new(AppInner {
                ack_deadline,
                bot_user_id: OnceLock::new(),
                subscriptions: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// Record the bot identity, after which subscriptions may be attached.
    pub fn initialize(&self, bot_user_id: impl Into<String>) {
        let bot_user_id = bot_user_id.into();

        if self.inner.bot_user_id.set(bot_user_id.clone()).is_err() {
            warn!("Application already initialized; ignoring bot user ID `{}`.", bot_user_id);
        }
    }

    pub fn ack_deadline(&self) -> Duration {
        self.inner.ack_deadline
    }

    pub fn bot_user_id(&self) -> Option<&str> {
        self.inner.bot_user_id.get().map(String::as_str)
    }

    pub fn is_subscribed(&self, kind: EventKind) -> bool {
        self.inner.subscriptions.read().unwrap_or_else(PoisonError::into_inner).contains_key(&kind)
    }

    pub fn subscription_count(&self) -> usize {
        self.inner.subscriptions.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn subscription(&self, kind: EventKind) -> Option<Arc<Subscription>> {
        self.inner.subscriptions.read().unwrap_or_else(PoisonError::into_inner).get(&kind).cloned()
    }

    /// Route one event: acknowledge on the fast path, then spawn lazy handlers.
    ///
    /// Returns `None` when nothing is subscribed to the event's kind, or when the bot authored the
    /// event itself. Must be called from within a tokio runtime.
    #[instrument(skip_all, fields(kind = %event.kind, channel_id = %event.channel_id))]
    pub fn dispatch(&self, event: Event) -> Option<Dispatch> {
        let Some(subscription) = self.subscription(event.kind) else {
            warn!("No subscription for `{}` events.", event.kind);
            return None;
        };

        if event.user_id.is_some() && event.user_id.as_deref() == self.bot_user_id() {
            warn!("Skipping `{}` event authored by the bot.", event.kind);
            return None;
        }

        // Fast path.

        let acked = Arc::new(AtomicBool::new(false));
        let ack = Ack::new({
            let acked = acked.clone();
            move || acked.store(true, Ordering::SeqCst)
        });

        let started = Instant::now();
        (subscription.ack)(ack);
        let ack_elapsed = started.elapsed();
        let acknowledged = acked.load(Ordering::SeqCst);

        if !acknowledged {
            error!("Event was not acknowledged; the platform will treat it as timed out.");
        } else if ack_elapsed > self.inner.ack_deadline {
            error!("Event acknowledged after {:?}, past the {:?} deadline.", ack_elapsed, self.inner.ack_deadline);
        } else {
            info!("Acknowledged event in {:?}.", ack_elapsed);
        }

        // Slow path.

        let event = Arc::new(event);
        let handles = subscription
            .lazy
            .iter()
            .cloned()
            .map(|handler| {
                let event = event.clone();

                tokio::spawn(
                    async move {
                        // Process the event.
                        let result = handler.process(&event).await;

                        // Log any errors.
                        if let Err(err) = &result {
                            error!("Error while handling in `{}`: {}", handler.name(), err);
                        }
                    }
                    .in_current_span(),
                )
            })
            .collect();

        Some(Dispatch { acknowledged, ack_elapsed, handles })
    }
}

impl GenericApp for App {
    #[instrument(skip_all, fields(kind = %kind))]
    fn event(&self, kind: EventKind, options: EventOptions) -> Result<(), RegistrationError> {
        if self.bot_user_id().is_none() {
            return Err(RegistrationError::NotInitialized);
        }

        let Some(ack) = options.ack else {
            return Err(RegistrationError::MissingAck(kind));
        };

        let mut subscriptions = self.inner.subscriptions.write().unwrap_or_else(PoisonError::into_inner);

        if subscriptions.contains_key(&kind) {
            return Err(RegistrationError::AlreadySubscribed(kind));
        }

        info!("Subscribed to `{}` with {} lazy handler(s).", kind, options.lazy.len());
        subscriptions.insert(kind, Arc::new(Subscription { ack, lazy: options.lazy }));

        Ok(())
    }
}

/// The outcome of dispatching one event.
pub struct Dispatch {
    /// Whether the ack callback invoked its handle.
    pub acknowledged: bool,
    /// Time spent in the ack callback.
    pub ack_elapsed: Duration,
    handles: Vec<JoinHandle<()>>,
}

impl Dispatch {
    /// Whether the platform should receive the acknowledgment for this event.
    ///
    /// Fails when the ack callback never invoked its handle, so the caller can withhold the
    /// platform ack and let the event time out.
    pub fn ensure_acknowledged(&self) -> Void {
        if !self.acknowledged {
            return Err(anyhow::anyhow!("Event was not acknowledged by its ack callback."));
        }

        Ok(())
    }

    /// Number of lazy handlers spawned for the event.
    pub fn deferred(&self) -> usize {
        self.handles.len()
    }

    /// Wait for every spawned lazy handler to finish.
    pub async fn join(self) {
        for result in futures::future::join_all(self.handles).await {
            if let Err(err) = result {
                error!("Lazy handler task failed: {}", err);
            }
        }
    }
}

// Tests.
