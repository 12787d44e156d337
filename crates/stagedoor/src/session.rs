//! Immersive session lifecycle state machine
//!
//! Gates entry and exit of the single immersive rendering session. The
//! machine owns a tri-state lifecycle (`Closed` / `InTransition` / `Open`):
//! UI intents (`request_open`, `request_close`) delegate to the external
//! session platform and return immediately; the platform later confirms
//! with `on_opened`, `on_open_failed`, or `on_closed`.
//!
//! Every transition is a compare-and-swap on an `AtomicU8`, so a
//! user-initiated close and an asynchronous platform confirmation can never
//! both apply from the same observed state - the loser gets
//! [`SessionError::InvalidTransition`] and the state is unchanged. The
//! render loop reads the state with a single atomic load at the top of each
//! frame.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::primitives::SessionState;

/// Transition inputs, named for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    RequestOpen,
    RequestClose,
    Opened,
    OpenFailed,
    Closed,
}

impl std::fmt::Display for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Transition::RequestOpen => "open request",
            Transition::RequestClose => "close request",
            Transition::Opened => "open confirmation",
            Transition::OpenFailed => "open failure",
            Transition::Closed => "close confirmation",
        };
        write!(f, "{}", label)
    }
}

/// Error raised by rejected transitions
#[derive(Debug, Clone, thiserror::Error)]
pub enum SessionError {
    #[error("invalid transition: {event} while session is {from}")]
    InvalidTransition {
        from: SessionState,
        event: Transition,
    },
}

/// Lifecycle events broadcast to the registered observer
///
/// `OpenFailed` is the recovery path the UI cares about most: the machine
/// is back in `Closed` and the enter affordance must be re-offered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEvent {
    Opening,
    Opened,
    OpenFailed { reason: String },
    Closing,
    Closed,
}

/// Outbound seam to the host session platform
///
/// Intents are fire-and-forget: the machine has already moved to
/// `InTransition` when these are called, and waits indefinitely for the
/// platform's confirmation callback. Retry and timeout are the platform's
/// concern.
pub trait SessionPlatform: Send + Sync {
    fn on_open_requested(&self);
    fn on_close_requested(&self);
}

/// Platform that does nothing, for tests and demos
///
/// Confirmations must be driven manually via the machine's `on_*` methods.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPlatform;

impl SessionPlatform for NullPlatform {
    fn on_open_requested(&self) {}
    fn on_close_requested(&self) {}
}

/// Observer for session lifecycle events
pub trait SessionObserver: Send + Sync {
    fn on_event(&self, event: SessionEvent);
}

/// Record of one open attempt, kept for the most recent activation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionActivation {
    pub id: Uuid,
    pub requested_at: DateTime<Utc>,
    pub opened_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
}

impl SessionActivation {
    fn begin() -> Self {
        Self {
            id: Uuid::new_v4(),
            requested_at: Utc::now(),
            opened_at: None,
            closed_at: None,
        }
    }
}

/// The session lifecycle state machine
///
/// One instance per process; initial state `Closed`; no terminal state.
pub struct SessionStateMachine {
    state: AtomicU8,
    platform: Arc<dyn SessionPlatform>,
    observer: RwLock<Option<Arc<dyn SessionObserver>>>,
    activation: RwLock<Option<SessionActivation>>,
}

impl SessionStateMachine {
    pub fn new(platform: Arc<dyn SessionPlatform>) -> Self {
        Self {
            state: AtomicU8::new(SessionState::Closed as u8),
            platform,
            observer: RwLock::new(None),
            activation: RwLock::new(None),
        }
    }

    /// Register the observer notified on every applied transition
    pub fn set_observer(&self, observer: Arc<dyn SessionObserver>) {
        *self.observer.write().unwrap() = Some(observer);
    }

    /// Current state; a single atomic load, safe from the render loop
    pub fn current_state(&self) -> SessionState {
        decode(self.state.load(Ordering::Acquire))
    }

    /// Record of the most recent open attempt, if any
    pub fn activation(&self) -> Option<SessionActivation> {
        self.activation.read().unwrap().clone()
    }

    /// UI intent: open the immersive session
    ///
    /// Valid only from `Closed`. Delegates to the platform and returns
    /// immediately; the session is not open until `on_opened` arrives.
    pub fn request_open(&self) -> Result<(), SessionError> {
        self.transition(
            SessionState::Closed,
            SessionState::InTransition,
            Transition::RequestOpen,
        )?;

        let activation = SessionActivation::begin();
        debug!(activation_id = %activation.id, "open requested, delegating to platform");
        *self.activation.write().unwrap() = Some(activation);

        self.platform.on_open_requested();
        self.emit(SessionEvent::Opening);
        Ok(())
    }

    /// UI intent: close the immersive session
    ///
    /// Valid only from `Open`. A close issued mid-open is rejected, not
    /// queued.
    pub fn request_close(&self) -> Result<(), SessionError> {
        self.transition(
            SessionState::Open,
            SessionState::InTransition,
            Transition::RequestClose,
        )?;

        debug!("close requested, delegating to platform");
        self.platform.on_close_requested();
        self.emit(SessionEvent::Closing);
        Ok(())
    }

    /// Platform confirmation: the session is live
    pub fn on_opened(&self) -> Result<(), SessionError> {
        self.transition(
            SessionState::InTransition,
            SessionState::Open,
            Transition::Opened,
        )?;

        if let Some(activation) = self.activation.write().unwrap().as_mut() {
            activation.opened_at = Some(Utc::now());
        }
        info!("immersive session opened");
        self.emit(SessionEvent::Opened);
        Ok(())
    }

    /// Platform confirmation: the open attempt failed or was cancelled
    ///
    /// Recovers to `Closed`; the UI must re-offer the enter affordance.
    pub fn on_open_failed(&self, reason: impl Into<String>) -> Result<(), SessionError> {
        self.transition(
            SessionState::InTransition,
            SessionState::Closed,
            Transition::OpenFailed,
        )?;

        let reason = reason.into();
        warn!(reason = %reason, "platform failed to open immersive session");
        self.emit(SessionEvent::OpenFailed { reason });
        Ok(())
    }

    /// Platform confirmation: the session has been torn down
    pub fn on_closed(&self) -> Result<(), SessionError> {
        self.transition(
            SessionState::InTransition,
            SessionState::Closed,
            Transition::Closed,
        )?;

        if let Some(activation) = self.activation.write().unwrap().as_mut() {
            activation.closed_at = Some(Utc::now());
        }
        info!("immersive session closed");
        self.emit(SessionEvent::Closed);
        Ok(())
    }

    fn transition(
        &self,
        from: SessionState,
        to: SessionState,
        event: Transition,
    ) -> Result<(), SessionError> {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|actual| {
                let from = decode(actual);
                debug!(%from, %event, "rejected invalid transition");
                SessionError::InvalidTransition { from, event }
            })?;
        Ok(())
    }

    fn emit(&self, event: SessionEvent) {
        if let Some(observer) = self.observer.read().unwrap().as_ref() {
            observer.on_event(event);
        }
    }
}

fn decode(raw: u8) -> SessionState {
    match raw {
        0 => SessionState::Closed,
        1 => SessionState::InTransition,
        2 => SessionState::Open,
        // Only `SessionState as u8` values are ever stored.
        _ => unreachable!("invalid session state tag {raw}"),
    }
}
