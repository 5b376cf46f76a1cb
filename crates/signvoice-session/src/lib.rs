//! Composition and orchestration core.
//!
//! [`session`] holds the pure, synchronous state machine that owns all text
//! state. [`orchestrator`] drives the asynchronous collaborators (suggestion
//! lookup, translation, speech) around it without letting their responses
//! race. [`poller`] feeds the session with the prediction stream.

pub mod orchestrator;
pub mod poller;
pub mod session;

pub use orchestrator::{SessionOrchestrator, SessionSnapshot};
pub use poller::PredictionPoller;
pub use session::CompositionSession;
