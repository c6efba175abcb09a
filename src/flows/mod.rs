//! Bullhorn Authentication Flows
//!
//! The three network exchanges the session lifecycle is built from:
//!
//! - **Authorization Code**: username/password → code → access/refresh tokens
//! - **Refresh**: refresh token → new access/refresh tokens
//! - **Login**: access token → REST URL and session token

pub mod authorization_code;
pub mod login;
pub mod refresh;

pub use authorization_code::{AuthorizationCodeFlow, MAX_AUTHORIZE_REDIRECTS};
pub use login::SessionLoginFlow;
pub use refresh::{is_refresh_rejection, RefreshFlow};
