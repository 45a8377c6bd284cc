mod registry;
mod session;

pub use registry::{Session, SessionRegistry, SessionSweeper, TOKEN_BYTES, generate_token};
pub use session::{Auth, SessionCookie, SessionToken};
