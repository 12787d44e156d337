//! The stage model - the owning aggregate
//!
//! One `StageModel` per process holds the session machine and the scene
//! clock as explicitly constructed objects, passed by reference into the
//! render-loop entry point and the UI layer. No ambient singletons: tests
//! construct fresh instances.

use std::sync::Arc;

use crate::clock::SceneClock;
use crate::config::StageConfig;
use crate::control::ControlSurface;
use crate::primitives::{Second, SessionState};
use crate::session::{SessionPlatform, SessionStateMachine};

/// Per-frame snapshot handed to the render loop
///
/// Sampled once at frame top. `elapsed` and `speed` drive the animation
/// phase; they are always safe to sample but only meaningful when the
/// session is open.
#[derive(Debug, Clone, Copy)]
pub struct FrameContext {
    pub state: SessionState,
    pub elapsed: Second,
    pub speed: f64,
}

impl FrameContext {
    /// Frame-submission gate: only an open session renders
    pub fn should_render(&self) -> bool {
        self.state == SessionState::Open
    }
}

/// Aggregate of the session machine and the scene clock
pub struct StageModel {
    session: Arc<SessionStateMachine>,
    clock: Arc<SceneClock>,
    config: StageConfig,
}

impl StageModel {
    /// Build with default configuration
    pub fn new(platform: Arc<dyn SessionPlatform>) -> Self {
        Self::with_config(StageConfig::default(), platform)
    }

    /// Build with explicit configuration
    pub fn with_config(config: StageConfig, platform: Arc<dyn SessionPlatform>) -> Self {
        let clock = SceneClock::new();
        if config.initial_speed > 0.0 {
            // Validated non-negative at load; a bad hand-built config just
            // leaves the clock frozen.
            if let Err(err) = clock.set_speed(config.initial_speed) {
                tracing::warn!(%err, "ignoring invalid initial speed");
            }
        }

        Self {
            session: Arc::new(SessionStateMachine::new(platform)),
            clock: Arc::new(clock),
            config,
        }
    }

    pub fn session(&self) -> &Arc<SessionStateMachine> {
        &self.session
    }

    pub fn clock(&self) -> &Arc<SceneClock> {
        &self.clock
    }

    pub fn config(&self) -> &StageConfig {
        &self.config
    }

    /// Build the UI-facing control handle
    pub fn control(&self) -> ControlSurface {
        ControlSurface::new(self.session.clone(), self.clock.clone(), &self.config)
    }

    /// Sample state, elapsed time, and speed once at frame top
    pub fn begin_frame(&self) -> FrameContext {
        FrameContext {
            state: self.session.current_state(),
            elapsed: self.clock.elapsed(),
            speed: self.clock.speed(),
        }
    }
}
