//! Administrator registration and authentication.

use std::sync::Arc;

use hmac::{Hmac, Mac};
use libris_db::{AdminId, Administrator, Repository, Store};
use libris_kernel::{LibraryError, LibraryResult};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha512;

type HmacSha512 = Hmac<Sha512>;

/// Salt length in bytes; matches the HMAC-SHA512 block size.
pub const SALT_LEN: usize = 128;

/// Stored form of a password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordDigest {
    pub hash: Vec<u8>,
    pub salt: Vec<u8>,
}

/// Password hashing primitive used by [`CredentialService`].
pub trait CredentialVerifier: Send + Sync {
    /// Derive a fresh salt and hash for `password`.
    fn derive(&self, password: &str) -> LibraryResult<PasswordDigest>;

    /// Recompute the hash with the stored salt and compare it to the stored hash.
    fn verify(&self, password: &str, digest: &PasswordDigest) -> bool;
}

/// HMAC-SHA512 keyed by a random salt.
#[derive(Debug, Clone, Copy, Default)]
pub struct HmacSha512Verifier;

impl HmacSha512Verifier {
    fn keyed(salt: &[u8]) -> LibraryResult<HmacSha512> {
        HmacSha512::new_from_slice(salt)
            .map_err(|err| LibraryError::Storage(format!("invalid credential salt: {err}")))
    }
}

impl CredentialVerifier for HmacSha512Verifier {
    fn derive(&self, password: &str) -> LibraryResult<PasswordDigest> {
        let mut salt = vec![0u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);

        let mut mac = Self::keyed(&salt)?;
        mac.update(password.as_bytes());
        let hash = mac.finalize().into_bytes().to_vec();

        Ok(PasswordDigest { hash, salt })
    }

    fn verify(&self, password: &str, digest: &PasswordDigest) -> bool {
        let Ok(mut mac) = Self::keyed(&digest.salt) else {
            return false;
        };
        mac.update(password.as_bytes());
        mac.verify_slice(&digest.hash).is_ok()
    }
}

/// Digest checked when no administrator matches; it never verifies.
fn unmatched_digest() -> PasswordDigest {
    PasswordDigest {
        hash: vec![0u8; 64],
        salt: vec![0u8; SALT_LEN],
    }
}

/// Input to [`CredentialService::register`].
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub password: String,
    pub name: String,
    pub last_name: String,
}

pub struct CredentialService {
    store: Arc<Store>,
    verifier: Arc<dyn CredentialVerifier>,
}

impl CredentialService {
    pub fn new(store: Arc<Store>) -> Self {
        Self::with_verifier(store, Arc::new(HmacSha512Verifier))
    }

    pub fn with_verifier(store: Arc<Store>, verifier: Arc<dyn CredentialVerifier>) -> Self {
        Self { store, verifier }
    }

    /// Store a new administrator. Usernames are matched exactly, case included.
    pub async fn register(&self, registration: Registration) -> LibraryResult<Administrator> {
        if registration.username.trim().is_empty() || registration.password.is_empty() {
            return Err(LibraryError::InvalidRequest);
        }

        let digest = self.verifier.derive(&registration.password)?;
        let Registration {
            username,
            name,
            last_name,
            ..
        } = registration;

        let admin = self
            .store
            .write(move |tables| {
                let taken = !tables
                    .query(|existing: &Administrator| existing.username == username)
                    .is_empty();
                if taken {
                    return Err(LibraryError::DuplicateUser(username));
                }

                Ok(tables.add(Administrator {
                    id: AdminId::default(),
                    username,
                    password_hash: digest.hash,
                    password_salt: digest.salt,
                    name,
                    last_name,
                }))
            })
            .await;

        match &admin {
            Ok(admin) => tracing::info!(
                target: "libris-authz",
                admin_id = %admin.id,
                username = %admin.username,
                "administrator registered"
            ),
            Err(err) => tracing::warn!(
                target: "libris-authz",
                error = %err,
                "administrator registration rejected"
            ),
        }
        admin
    }

    /// Check a username/password pair.
    ///
    /// An unknown username and a wrong password fail identically with
    /// [`LibraryError::InvalidCredentials`]. An unknown username still runs
    /// one verification against a throwaway digest so both paths cost the same.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> LibraryResult<Administrator> {
        let admin = self
            .store
            .read(|tables| {
                tables
                    .query(|existing: &Administrator| existing.username == username)
                    .into_iter()
                    .next()
            })
            .await;

        let Some(admin) = admin else {
            let _ = self.verifier.verify(password, &unmatched_digest());
            tracing::debug!(target: "libris-authz", "authentication failed");
            return Err(LibraryError::InvalidCredentials);
        };

        let digest = PasswordDigest {
            hash: admin.password_hash.clone(),
            salt: admin.password_salt.clone(),
        };
        if !self.verifier.verify(password, &digest) {
            tracing::debug!(target: "libris-authz", "authentication failed");
            return Err(LibraryError::InvalidCredentials);
        }

        Ok(admin)
    }
}
