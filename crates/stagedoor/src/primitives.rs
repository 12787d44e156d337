//! Core primitives for stagedoor
//!
//! Time and session-state value types shared by the clock, the state
//! machine, and the control surface.

use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

// =============================================================================
// TIME TYPES
// =============================================================================

/// Elapsed scene time in seconds
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize, Default)]
pub struct Second(pub f64);

impl Second {
    pub fn zero() -> Self {
        Self(0.0)
    }
}

impl Add for Second {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Second(self.0 + rhs.0)
    }
}

impl Sub for Second {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Second((self.0 - rhs.0).max(0.0))
    }
}

impl std::fmt::Display for Second {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3}s", self.0)
    }
}

// =============================================================================
// SESSION STATE
// =============================================================================

/// Lifecycle state of the immersive session
///
/// Exactly one session exists at a time; the machine cycles
/// `Closed -> InTransition -> Open -> InTransition -> Closed` for the life
/// of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum SessionState {
    /// No immersive session; frame submission must not happen
    #[default]
    Closed = 0,
    /// An open or close request is in flight, waiting on the platform
    InTransition = 1,
    /// Session is live; the render loop may submit frames
    Open = 2,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            SessionState::Closed => "closed",
            SessionState::InTransition => "in transition",
            SessionState::Open => "open",
        };
        write!(f, "{}", label)
    }
}

/// The control the UI should offer for the current session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Affordance {
    /// Offer "enter the immersive space"
    Enter,
    /// Offer "exit the immersive space"
    Exit,
    /// Transition in flight; offer nothing actionable
    Wait,
}

impl Affordance {
    pub fn for_state(state: SessionState) -> Self {
        match state {
            SessionState::Closed => Affordance::Enter,
            SessionState::Open => Affordance::Exit,
            SessionState::InTransition => Affordance::Wait,
        }
    }
}
