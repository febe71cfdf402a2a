/// Authentication module
///
/// Credential lifecycle: token encoding/validation, secret hashing,
/// issuance, refresh, and the facade the HTTP layer talks to.

mod claims;
mod clock;
mod codec;
mod facade;
mod issuer;
mod password;
mod refresh;

pub use claims::{Claims, TokenPurpose};
pub use clock::{Clock, ManualClock, SystemClock};
pub use codec::{is_expired, token_fingerprint, SigningKey, TokenCodec, TokenError};
pub use facade::{bearer_token, AuthenticationFacade};
pub use issuer::{AuthenticationResponse, CredentialIssuer};
pub use password::{validate_password_strength, BcryptVerifier, SecretVerifier};
pub use refresh::RefreshHandler;
