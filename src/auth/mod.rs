//! Account session handling.
//!
//! This module owns the email/token pair used for every authenticated request
//! and the loop that keeps asking the operator for replacements until the
//! marketplace accepts them.

mod error;
mod session;

pub use error::AuthError;
pub use session::{Session, SessionManager};
