//! Server-side cookie sessions for logged-in administrators.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use libris_kernel::settings::AuthSettings;
use libris_kernel::{IdentityContext, InitCtx, Module, SharedClock};
use time::{Duration, OffsetDateTime};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Upper bound on `auth.session_ttl_secs`.
const MAX_SESSION_TTL: Duration = Duration::days(366);

#[derive(Debug, Clone)]
struct Session {
    identity: IdentityContext,
    expires_at: OffsetDateTime,
}

pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
    cookie_name: String,
    ttl: Duration,
    clock: SharedClock,
}

impl SessionStore {
    pub fn new(settings: &AuthSettings, clock: SharedClock) -> Self {
        let requested = i64::try_from(settings.session_ttl_secs)
            .map(Duration::seconds)
            .unwrap_or(MAX_SESSION_TTL);
        if requested > MAX_SESSION_TTL {
            tracing::warn!(
                target: "libris-authz",
                requested_secs = settings.session_ttl_secs,
                max_secs = MAX_SESSION_TTL.whole_seconds(),
                "session ttl clamped"
            );
        }

        Self {
            sessions: RwLock::new(HashMap::new()),
            cookie_name: settings.cookie_name.clone(),
            ttl: requested.min(MAX_SESSION_TTL),
            clock,
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Open a session for an authenticated administrator and return its token.
    pub async fn issue(&self, identity: IdentityContext) -> String {
        let token = Uuid::new_v4().simple().to_string();
        let now = self.clock.now();
        let expires_at = now.checked_add(self.ttl).unwrap_or(now);

        tracing::info!(
            target: "libris-authz",
            username = identity.username(),
            %expires_at,
            "session issued"
        );

        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| session.expires_at > now);
        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::debug!(target: "libris-authz", evicted, "expired sessions evicted");
        }

        sessions.insert(
            token.clone(),
            Session {
                identity,
                expires_at,
            },
        );
        token
    }

    /// The identity behind a live token. Expired sessions are dropped on sight.
    pub async fn resolve(&self, token: &str) -> Option<IdentityContext> {
        let now = self.clock.now();
        {
            let sessions = self.sessions.read().await;
            match sessions.get(token) {
                Some(session) if session.expires_at > now => {
                    return Some(session.identity.clone());
                }
                Some(_) => {}
                None => return None,
            }
        }

        self.sessions.write().await.remove(token);
        tracing::debug!(target: "libris-authz", "expired session dropped");
        None
    }

    pub async fn revoke(&self, token: &str) -> bool {
        self.sessions.write().await.remove(token).is_some()
    }

    pub async fn revoke_all(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let count = sessions.len();
        sessions.clear();
        count
    }
}

/// Core module that closes every open session on shutdown.
pub struct AuthzModule {
    sessions: Arc<SessionStore>,
}

impl AuthzModule {
    pub fn new(sessions: Arc<SessionStore>) -> Self {
        Self { sessions }
    }
}

#[async_trait]
impl Module for AuthzModule {
    fn name(&self) -> &'static str {
        "authz"
    }

    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            cookie = self.sessions.cookie_name(),
            ttl_secs = self.sessions.ttl().whole_seconds(),
            "session store ready"
        );
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        let revoked = self.sessions.revoke_all().await;
        tracing::info!(module = self.name(), revoked, "sessions closed");
        Ok(())
    }
}
