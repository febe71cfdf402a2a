mod auth;
mod health_check;

pub use auth::{authenticate, current_account, refresh, register};
pub use auth::{AccountResponse, AuthResponse, AuthenticationRequest, RegisterRequest};
pub use health_check::health_check;
