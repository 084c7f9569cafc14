use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::errors::AuthError;

/// Result of opening an OTP challenge with the credential-issuance service.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeInit {
    pub otp_id: String,
    pub organization_id: String,
}

/// Opaque credential bundle minted by the service once a challenge or OAuth
/// token is verified. Scopes a signing session to one organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialBundle(pub String);

/// Client interface to the credential-issuance back-end used by the remote
/// key service provider.
#[async_trait]
pub trait CredentialService: Send + Sync {
    /// Opens an OTP challenge for an email or phone contact.
    async fn init_challenge(&self, otp_type: &str, contact: &str)
        -> Result<ChallengeInit, AuthError>;

    /// Redeems an OTP code against an open challenge, binding the bundle to
    /// the supplied target public key.
    async fn verify_challenge(
        &self,
        otp_id: &str,
        otp_code: &str,
        organization_id: &str,
        target_public_key: &str,
    ) -> Result<CredentialBundle, AuthError>;

    /// Exchanges an OIDC token for a credential bundle.
    async fn oauth_token(
        &self,
        oidc_token: &str,
        provider_name: &str,
        target_public_key: &str,
    ) -> Result<CredentialBundle, AuthError>;
}

/// HTTP implementation of [`CredentialService`].
pub struct CredentialApi {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InitOtpRequest<'a> {
    otp_type: &'a str,
    contact: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VerifyOtpRequest<'a> {
    otp_id: &'a str,
    otp_code: &'a str,
    organization_id: &'a str,
    target_public_key: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OAuthRequest<'a> {
    oidc_token: &'a str,
    provider_name: &'a str,
    target_public_key: &'a str,
    expiration_seconds: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BundleResponse {
    credential_bundle: String,
}

const OAUTH_SESSION_SECONDS: u64 = 3_600;

impl CredentialApi {
    pub fn new(base_url: &str) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, AuthError>
    where
        B: Serialize + ?Sized,
        T: for<'de> Deserialize<'de>,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "credential service request");

        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| AuthError::Network(format!("credential service unreachable: {e}")))?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| AuthError::Provider(format!("malformed service response: {e}")));
        }

        let detail = response.text().await.unwrap_or_default();
        Err(Self::classify_status(status, &detail))
    }

    fn classify_status(status: StatusCode, detail: &str) -> AuthError {
        if status.is_server_error() {
            AuthError::ProviderUnavailable(format!("credential service error {status}"))
        } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            AuthError::CredentialRejected(format!("credential rejected ({status}): {detail}"))
        } else {
            AuthError::CredentialRejected(format!("request rejected ({status}): {detail}"))
        }
    }
}

#[async_trait]
impl CredentialService for CredentialApi {
    #[instrument(skip(self, contact))]
    async fn init_challenge(
        &self,
        otp_type: &str,
        contact: &str,
    ) -> Result<ChallengeInit, AuthError> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct InitResponse {
            otp_id: String,
            organization_id: String,
        }

        let body = InitOtpRequest { otp_type, contact };
        let response: InitResponse = self.post("/api/auth/initOtpAuth", &body).await?;

        Ok(ChallengeInit {
            otp_id: response.otp_id,
            organization_id: response.organization_id,
        })
    }

    #[instrument(skip(self, otp_code))]
    async fn verify_challenge(
        &self,
        otp_id: &str,
        otp_code: &str,
        organization_id: &str,
        target_public_key: &str,
    ) -> Result<CredentialBundle, AuthError> {
        let body = VerifyOtpRequest {
            otp_id,
            otp_code,
            organization_id,
            target_public_key,
        };
        let response: BundleResponse = self.post("/api/auth/otpAuth", &body).await?;
        Ok(CredentialBundle(response.credential_bundle))
    }

    #[instrument(skip(self, oidc_token))]
    async fn oauth_token(
        &self,
        oidc_token: &str,
        provider_name: &str,
        target_public_key: &str,
    ) -> Result<CredentialBundle, AuthError> {
        let body = OAuthRequest {
            oidc_token,
            provider_name,
            target_public_key,
            expiration_seconds: OAUTH_SESSION_SECONDS,
        };
        let response: BundleResponse = self.post("/api/auth/oAuthLogin", &body).await?;
        Ok(CredentialBundle(response.credential_bundle))
    }
}
