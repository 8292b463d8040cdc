//! Administrator credentials and cookie sessions.

pub mod credentials;
pub mod sessions;

pub use credentials::{
    CredentialService, CredentialVerifier, HmacSha512Verifier, PasswordDigest, Registration,
};
pub use sessions::{AuthzModule, SessionStore};
