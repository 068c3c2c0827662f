mod middleware;

pub use middleware::{AuthError, Caller, RequireAdmin, RequireUser, USER_ID_HEADER};
