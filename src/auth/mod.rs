//! Authentication module
//!
//! Sign-in is delegated to the Frontegg hosted login; the launcher only keeps
//! the resulting access token in a cookie and validates it on each request.
//!
//! ## Structure
//!
//! - `extractors`: Axum extractors for signed-in users and session cookies
//! - `jwt`: JWT validation with a cached JWKS
//! - `helpers`: Pure helper functions (URL builders, cookies, session ids)
//! - `handlers`: HTTP handlers for login, callback, and logout
//!
//! ## Authentication Flow
//!
//! 1. User visits `/account/login` → redirect to the Frontegg hosted login
//! 2. Frontegg authenticates → redirect to `/oauth/callback`
//! 3. Launcher exchanges the code → sets `fe_session` and `launcher_sid` → redirect to `/`
//! 4. User visits `/account/logout` → session storage and cookies cleared → Frontegg logout

pub mod extractors;
pub mod handlers;
pub mod helpers;
pub mod jwt;

pub use extractors::{AuthError, MaybeSessionUser, SessionCookie, SessionUser};
pub use handlers::{callback_handler, login_handler, logout_handler, CallbackParams};
