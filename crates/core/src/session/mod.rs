//! Focus session lifecycle

pub mod policy;
pub mod ports;
pub mod service;

pub use policy::AdjustmentPolicy;
pub use ports::{SessionCursor, SessionRepository};
pub use service::{ReconcileReport, ScreenAnalysis, SessionPage, SessionService, StopOutcome};
