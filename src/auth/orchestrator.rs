use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::auth::session::{AuthPhase, AuthSession, AuthSnapshot};
use crate::errors::AuthError;
use crate::providers::{
    AdapterRegistry, AuthOutcome, AuthResult, Credentials, LoginMethod, OtpChallenge, ProviderKind,
};
use crate::storage::{PersistedSession, SessionStore};
use crate::wallet::WalletHandle;

/// Result of a login call: either the connection is live, or the caller
/// must collect an OTP code and come back through [`verify_challenge`].
///
/// [`verify_challenge`]: AuthOrchestrator::verify_challenge
#[derive(Debug, Clone)]
pub enum LoginFlow {
    Connected(WalletHandle),
    ChallengePending(OtpChallenge),
}

struct OrchestratorState {
    session: AuthSession,
    handle: Option<WalletHandle>,
    pending_challenge: Option<OtpChallenge>,
}

/// Owns the login life-cycle across all providers: one active wallet at a
/// time, serialized login attempts, and a watch channel broadcasting every
/// phase change.
pub struct AuthOrchestrator {
    adapters: AdapterRegistry,
    store: Arc<dyn SessionStore>,
    state: Mutex<OrchestratorState>,
    // Serializes whole login attempts, not just state pokes.
    login_gate: Mutex<()>,
    watch_tx: watch::Sender<AuthSnapshot>,
}

impl AuthOrchestrator {
    pub fn new(adapters: AdapterRegistry, store: Arc<dyn SessionStore>) -> Self {
        let (watch_tx, _) = watch::channel(AuthSnapshot::default());
        Self {
            adapters,
            store,
            state: Mutex::new(OrchestratorState {
                session: AuthSession::default(),
                handle: None,
                pending_challenge: None,
            }),
            login_gate: Mutex::new(()),
            watch_tx,
        }
    }

    /// Subscribes to session snapshots. The receiver immediately sees the
    /// current state.
    pub fn subscribe(&self) -> watch::Receiver<AuthSnapshot> {
        self.watch_tx.subscribe()
    }

    pub async fn active_wallet(&self) -> Option<WalletHandle> {
        self.state.lock().await.handle.clone()
    }

    pub async fn phase(&self) -> AuthPhase {
        self.state.lock().await.session.phase
    }

    /// Runs a login attempt against one provider. Concurrent calls are
    /// serialized; a call that finds the same provider already connected
    /// coalesces into the existing connection instead of re-authenticating.
    #[instrument(skip(self, credentials), fields(%provider, attempt_id = %Uuid::new_v4()))]
    pub async fn login(
        &self,
        provider: ProviderKind,
        method: LoginMethod,
        credentials: &Credentials,
    ) -> Result<LoginFlow, AuthError> {
        let _gate = self.login_gate.lock().await;

        {
            let state = self.state.lock().await;
            if state.session.phase == AuthPhase::Connected
                && state.session.provider == Some(provider)
            {
                if let Some(handle) = &state.handle {
                    debug!("provider already connected, coalescing login");
                    return Ok(LoginFlow::Connected(handle.clone()));
                }
            }
        }

        let adapter = self.adapters.get(provider).ok_or_else(|| {
            AuthError::ProviderUnavailable(format!("no adapter registered for {provider}"))
        })?;

        // A new attempt over a stale connection or abandoned challenge
        // starts from a clean slate, persisted record included: the store
        // must not keep claiming the old provider if this attempt fails.
        if !matches!(
            self.phase().await,
            AuthPhase::Unauthenticated | AuthPhase::Failed
        ) {
            self.transition(None, AuthPhase::Unauthenticated, None).await;
            if let Err(err) = self.store.clear().await {
                warn!(error = %err, "could not clear persisted session");
            }
        }

        self.transition(Some(provider), AuthPhase::AwaitingCredential, None)
            .await;

        match adapter.authenticate(method, credentials).await {
            Ok(AuthOutcome::Connected(result)) => {
                self.transition(Some(provider), AuthPhase::Provisioning, None)
                    .await;
                let handle = self.complete_connection(result).await;
                Ok(LoginFlow::Connected(handle))
            }
            Ok(AuthOutcome::ChallengePending(challenge)) => {
                {
                    let mut state = self.state.lock().await;
                    state.pending_challenge = Some(challenge.clone());
                }
                self.transition(Some(provider), AuthPhase::AwaitingChallenge, None)
                    .await;
                info!(challenge_id = %challenge.challenge_id, "awaiting challenge answer");
                Ok(LoginFlow::ChallengePending(challenge))
            }
            Err(AuthError::UserCancelled) => {
                // Cancellation is not a failure; drop back to the idle
                // state with no error attached.
                info!("login cancelled by user");
                self.transition(None, AuthPhase::Unauthenticated, None).await;
                Err(AuthError::UserCancelled)
            }
            Err(err) => {
                warn!(error = %err, "login failed");
                self.transition(Some(provider), AuthPhase::Failed, Some(err.to_string()))
                    .await;
                Err(err)
            }
        }
    }

    /// Answers the pending OTP challenge. The challenge is single-use: this
    /// call consumes it whether verification succeeds or fails.
    #[instrument(skip(self, code))]
    pub async fn verify_challenge(&self, code: &str) -> Result<WalletHandle, AuthError> {
        let _gate = self.login_gate.lock().await;

        let (challenge, provider) = {
            let mut state = self.state.lock().await;
            let challenge = state.pending_challenge.take().ok_or_else(|| {
                AuthError::CredentialRejected("no active challenge".to_string())
            })?;
            let provider = state.session.provider.ok_or_else(|| {
                AuthError::CredentialRejected("no provider for pending challenge".to_string())
            })?;
            (challenge, provider)
        };

        let adapter = self.adapters.get(provider).ok_or_else(|| {
            AuthError::ProviderUnavailable(format!("no adapter registered for {provider}"))
        })?;

        match adapter.verify_challenge(&challenge, code).await {
            Ok(result) => {
                self.transition(Some(provider), AuthPhase::Provisioning, None)
                    .await;
                Ok(self.complete_connection(result).await)
            }
            Err(err) => {
                warn!(error = %err, "challenge verification failed");
                self.transition(Some(provider), AuthPhase::Failed, Some(err.to_string()))
                    .await;
                Err(err)
            }
        }
    }

    /// Ends the active session. Local and persisted state are cleared
    /// first, unconditionally; a failing provider-side logout is logged but
    /// never leaves the app half-connected.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        let provider = {
            let mut state = self.state.lock().await;
            let provider = state.session.provider;
            state.session = AuthSession::default();
            state.handle = None;
            state.pending_challenge = None;
            provider
        };

        if let Err(err) = self.store.clear().await {
            warn!(error = %err, "could not clear persisted session");
        }
        self.publish().await;

        if let Some(provider) = provider {
            if let Some(adapter) = self.adapters.get(provider) {
                if let Err(err) = adapter.logout().await {
                    warn!(%provider, error = %err, "provider-side logout failed");
                }
            }
        }

        info!("logged out");
    }

    /// Warm-start restore: pairs the persisted session record with live
    /// provider-side state. Returns the restored handle when both agree.
    #[instrument(skip(self))]
    pub async fn restore(&self) -> Option<WalletHandle> {
        let persisted = match self.store.load().await {
            Ok(Some(persisted)) => persisted,
            Ok(None) => return None,
            Err(err) => {
                warn!(error = %err, "could not load persisted session");
                return None;
            }
        };

        let adapter = self.adapters.get(persisted.provider)?;
        let result = adapter.resume().await?;

        if result.address != persisted.address {
            warn!(
                persisted = %persisted.address,
                live = %result.address,
                "persisted session does not match provider state, discarding"
            );
            if let Err(err) = self.store.clear().await {
                warn!(error = %err, "could not clear stale session");
            }
            return None;
        }

        let handle = result.into_handle();
        {
            let mut state = self.state.lock().await;
            state.session = AuthSession {
                provider: Some(persisted.provider),
                phase: AuthPhase::Connected,
                user_id: None,
                error: None,
            };
            state.handle = Some(handle.clone());
        }
        self.publish().await;

        info!(provider = %persisted.provider, address = %handle.address(), "session restored");
        Some(handle)
    }

    async fn complete_connection(&self, result: AuthResult) -> WalletHandle {
        let provider = result.provider;
        let user_id = result.user_id.clone();
        let handle = result.into_handle();

        let persisted = PersistedSession::new(provider, handle.address());
        if let Err(err) = self.store.save(&persisted).await {
            warn!(error = %err, "could not persist session");
        }

        {
            let mut state = self.state.lock().await;
            state.session = AuthSession {
                provider: Some(provider),
                phase: AuthPhase::Connected,
                user_id,
                error: None,
            };
            state.handle = Some(handle.clone());
        }
        self.publish().await;

        info!(%provider, address = %handle.address(), "wallet connected");
        handle
    }

    async fn transition(
        &self,
        provider: Option<ProviderKind>,
        next: AuthPhase,
        error: Option<String>,
    ) {
        {
            let mut state = self.state.lock().await;
            let current = state.session.phase;

            if !current.is_valid_transition(next) {
                warn!(?current, ?next, "refusing invalid phase transition");
                return;
            }

            state.session.phase = next;
            state.session.provider = provider;
            state.session.error = error;
            if next != AuthPhase::Connected {
                state.handle = None;
            }
        }
        self.publish().await;
    }

    async fn publish(&self) {
        let snapshot = {
            let state = self.state.lock().await;
            AuthSnapshot {
                phase: state.session.phase,
                provider: state.session.provider,
                handle: state.handle.clone(),
                error: state.session.error.clone(),
            }
        };
        self.watch_tx.send_replace(snapshot);
    }
}
