use serde::{Deserialize, Serialize};

use crate::providers::ProviderKind;
use crate::wallet::WalletHandle;

/// The login life-cycle. Transitions only move along the edges
/// [`is_valid_transition`] allows; anything else is a programming error the
/// orchestrator refuses.
///
/// [`is_valid_transition`]: AuthPhase::is_valid_transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuthPhase {
    Unauthenticated,
    /// A login attempt is running inside the provider flow.
    AwaitingCredential,
    /// The provider returned a challenge the user must answer.
    AwaitingChallenge,
    /// Credentials accepted; wallet and session are being set up.
    Provisioning,
    Connected,
    Failed,
}

impl AuthPhase {
    pub fn is_valid_transition(self, next: AuthPhase) -> bool {
        use AuthPhase::*;
        match (self, next) {
            // Logout and reset drop back to Unauthenticated from anywhere.
            (_, Unauthenticated) => true,
            (Unauthenticated, AwaitingCredential) => true,
            (Failed, AwaitingCredential) => true,
            (AwaitingCredential, AwaitingChallenge) => true,
            (AwaitingCredential, Provisioning) => true,
            (AwaitingChallenge, Provisioning) => true,
            (Provisioning, Connected) => true,
            (AwaitingCredential, Failed) => true,
            (AwaitingChallenge, Failed) => true,
            (Provisioning, Failed) => true,
            // Warm-start restore connects without a login attempt.
            (Unauthenticated, Connected) => true,
            _ => false,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, AuthPhase::Connected | AuthPhase::Failed)
    }
}

/// Mutable session record the orchestrator owns.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub provider: Option<ProviderKind>,
    pub phase: AuthPhase,
    pub user_id: Option<String>,
    pub error: Option<String>,
}

impl Default for AuthSession {
    fn default() -> Self {
        Self {
            provider: None,
            phase: AuthPhase::Unauthenticated,
            user_id: None,
            error: None,
        }
    }
}

/// Immutable view of the session published to subscribers.
#[derive(Debug, Clone)]
pub struct AuthSnapshot {
    pub phase: AuthPhase,
    pub provider: Option<ProviderKind>,
    pub handle: Option<WalletHandle>,
    pub error: Option<String>,
}

impl Default for AuthSnapshot {
    fn default() -> Self {
        Self {
            phase: AuthPhase::Unauthenticated,
            provider: None,
            handle: None,
            error: None,
        }
    }
}
