use thiserror::Error;

use crate::app::event::EventKind;

pub type Err = anyhow::Error;
pub type Res<T> = Result<T, Err>;
pub type Void = Res<()>;

/// Errors raised while attaching an event subscription to the application.
///
/// These are startup-time failures: they are propagated to the caller and halt initialization.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("The application has not been initialized with a bot identity.")]
    NotInitialized,
    #[error("A subscription for `{0}` is already registered.")]
    AlreadySubscribed(EventKind),
    #[error("No acknowledgment callback was provided for `{0}`.")]
    MissingAck(EventKind),
    #[error("Failed to attach subscription: {0}")]
    Attach(String),
}
