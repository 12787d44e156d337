//! Stagedoor: Immersive Session Control Layer
//!
//! The control plane behind an immersive visual session on a head-mounted
//! display. Stagedoor does not render anything; it gates the session the
//! renderer lives in and drives the clock the renderer animates from:
//!
//! - **SessionStateMachine**: tri-state lifecycle (closed / in transition /
//!   open) with atomic transitions, delegating open/close intents to the
//!   host platform and absorbing its asynchronous confirmations
//! - **SceneClock**: speed-adjustable accumulating clock, frame-query-safe
//!   from the render loop while the interaction context changes speed
//! - **Capability negotiation**: one-shot pure selection of the layer
//!   configuration from a platform capability offer
//! - **ControlSurface / StageModel**: the UI glue and the owning aggregate
//!   handed to the render-loop entry point

pub mod capabilities;
pub mod clock;
pub mod config;
pub mod control;
pub mod model;
pub mod primitives;
pub mod session;

pub use capabilities::{
    negotiate, CapabilityError, ColorFormat, DepthFormat, LayerCapabilities, LayerConfiguration,
    ViewLayout,
};
pub use clock::{ClockError, SceneClock};
pub use config::{ConfigError, StageConfig};
pub use control::ControlSurface;
pub use model::{FrameContext, StageModel};
pub use primitives::{Affordance, Second, SessionState};
pub use session::{
    NullPlatform, SessionActivation, SessionError, SessionEvent, SessionObserver, SessionPlatform,
    SessionStateMachine, Transition,
};
