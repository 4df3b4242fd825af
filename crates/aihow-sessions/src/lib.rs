//! Admin session management for AIhow
//!
//! Sessions expire after a period of inactivity or an absolute lifetime,
//! whichever comes first, and each admin may hold only a limited number of
//! active sessions at once. `Expired` and `Revoked` are terminal states.

pub mod clock;
pub mod error;
pub mod manager;
pub mod models;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Result, SessionError};
pub use manager::{AdminSessionManager, EVICTION_REASON, LOGOUT_REASON};
pub use models::{AdminSession, AdminSessionConfig, LimitPolicy, SessionState};
