//! Authentication for the board: roles, password hashing, bearer sessions, and the role guard
//! every gated entry point calls explicitly.

pub mod guard;
pub mod password;
pub mod role;
pub mod session;

pub use guard::{bearer_token, require_role, AuthContext, AuthError};
pub use password::PasswordHash;
pub use role::{Role, UnknownRole};
pub use session::{IssuedSession, SessionStore};
