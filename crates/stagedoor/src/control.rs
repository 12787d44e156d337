//! UI-facing control surface
//!
//! Thin glue between the control window and the core: a session toggle, a
//! clamped animation-speed setter, and the affordance label the UI should
//! present. All calls are safe from the interaction context at any moment;
//! a toggle that loses a race against a platform confirmation degrades to a
//! no-op.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::clock::SceneClock;
use crate::config::StageConfig;
use crate::primitives::{Affordance, SessionState};
use crate::session::SessionStateMachine;

/// Control handle handed to the UI layer
#[derive(Clone)]
pub struct ControlSurface {
    session: Arc<SessionStateMachine>,
    clock: Arc<SceneClock>,
    speed_limit: f64,
}

impl ControlSurface {
    pub fn new(
        session: Arc<SessionStateMachine>,
        clock: Arc<SceneClock>,
        config: &StageConfig,
    ) -> Self {
        Self {
            session,
            clock,
            speed_limit: config.speed_limit,
        }
    }

    /// Open if closed, close if open, no-op while a transition is in flight
    ///
    /// Returns the state after the toggle was applied (or ignored), for the
    /// UI to re-render from.
    pub fn toggle_session(&self) -> SessionState {
        let result = match self.session.current_state() {
            SessionState::Closed => self.session.request_open(),
            SessionState::Open => self.session.request_close(),
            SessionState::InTransition => {
                debug!("toggle ignored while session is in transition");
                Ok(())
            }
        };
        if let Err(err) = result {
            // State moved between our read and the machine's swap; the
            // machine already rejected the stale intent.
            debug!(%err, "toggle lost a race, ignoring");
        }
        self.session.current_state()
    }

    /// Set animation speed, clamped to `[0, speed_limit]`
    ///
    /// The clamp makes this infallible for any finite input; non-finite
    /// values are dropped.
    pub fn set_animation_speed(&self, value: f64) {
        if !value.is_finite() {
            warn!(value, "ignoring non-finite animation speed");
            return;
        }
        let clamped = value.clamp(0.0, self.speed_limit);
        if clamped != value {
            debug!(value, clamped, "animation speed clamped");
        }
        if let Err(err) = self.clock.set_speed(clamped) {
            warn!(%err, "rejected animation speed");
        }
    }

    /// The control the UI should offer right now
    pub fn affordance(&self) -> Affordance {
        Affordance::for_state(self.session.current_state())
    }

    /// Current session state, for rendering the rest of the window
    pub fn current_state(&self) -> SessionState {
        self.session.current_state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::NullPlatform;

    fn surface() -> (Arc<SessionStateMachine>, Arc<SceneClock>, ControlSurface) {
        let session = Arc::new(SessionStateMachine::new(Arc::new(NullPlatform)));
        let clock = Arc::new(SceneClock::new());
        let control = ControlSurface::new(session.clone(), clock.clone(), &StageConfig::default());
        (session, clock, control)
    }

    #[test]
    fn toggle_opens_from_closed() {
        let (_, _, control) = surface();
        assert_eq!(control.toggle_session(), SessionState::InTransition);
    }

    #[test]
    fn toggle_is_noop_in_transition() {
        let (session, _, control) = surface();
        control.toggle_session();
        assert_eq!(control.toggle_session(), SessionState::InTransition);
        assert_eq!(session.current_state(), SessionState::InTransition);
    }

    #[test]
    fn toggle_closes_from_open() {
        let (session, _, control) = surface();
        control.toggle_session();
        session.on_opened().unwrap();

        assert_eq!(control.toggle_session(), SessionState::InTransition);
        session.on_closed().unwrap();
        assert_eq!(control.current_state(), SessionState::Closed);
    }

    #[test]
    fn speed_clamps_to_limit() {
        let (_, clock, control) = surface();
        control.set_animation_speed(5.0);
        assert_eq!(clock.speed(), 2.0);

        control.set_animation_speed(-3.0);
        assert_eq!(clock.speed(), 0.0);

        control.set_animation_speed(1.25);
        assert_eq!(clock.speed(), 1.25);
    }

    #[test]
    fn non_finite_speed_is_dropped() {
        let (_, clock, control) = surface();
        control.set_animation_speed(1.0);
        control.set_animation_speed(f64::NAN);
        assert_eq!(clock.speed(), 1.0);
    }

    #[test]
    fn custom_speed_limit_respected() {
        let session = Arc::new(SessionStateMachine::new(Arc::new(NullPlatform)));
        let clock = Arc::new(SceneClock::new());
        let config = StageConfig {
            speed_limit: 1.0,
            ..Default::default()
        };
        let control = ControlSurface::new(session, clock.clone(), &config);

        control.set_animation_speed(1.8);
        assert_eq!(clock.speed(), 1.0);
    }

    #[test]
    fn affordance_follows_lifecycle() {
        let (session, _, control) = surface();
        assert_eq!(control.affordance(), Affordance::Enter);

        control.toggle_session();
        assert_eq!(control.affordance(), Affordance::Wait);

        session.on_opened().unwrap();
        assert_eq!(control.affordance(), Affordance::Exit);
    }
}
