//! Firebase Authentication identity provider.
//!
//! Exchanges an OAuth id token issued by Google or Apple for a Firebase user
//! through the Identity Toolkit `accounts:signInWithIdp` endpoint.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use ieltsprep_core::error::ServiceError;
use ieltsprep_core::traits::{AuthUser, IdentityProvider, SignInMethod};

use crate::error::{check_status, google_error_message, http_client, send_error, ProviderError};

pub const DEFAULT_BASE_URL: &str = "https://identitytoolkit.googleapis.com";
pub const DEFAULT_REQUEST_URI: &str = "http://localhost";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub struct FirebaseIdentity {
    api_key: String,
    base_url: String,
    request_uri: String,
    client: reqwest::Client,
}

impl FirebaseIdentity {
    pub fn new(
        api_key: &str,
        base_url: Option<String>,
        request_uri: Option<String>,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            api_key: api_key.trim().to_string(),
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            request_uri: request_uri.unwrap_or_else(|| DEFAULT_REQUEST_URI.to_string()),
            client: http_client(DEFAULT_TIMEOUT_SECS)?,
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInRequest<'a> {
    post_body: String,
    request_uri: &'a str,
    return_secure_token: bool,
    return_idp_credential: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    local_id: String,
    id_token: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    full_name: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

#[async_trait]
impl IdentityProvider for FirebaseIdentity {
    fn name(&self) -> &str {
        "firebase"
    }

    #[instrument(skip(self, credential), fields(method = %method))]
    async fn sign_in(
        &self,
        method: SignInMethod,
        credential: &str,
    ) -> Result<AuthUser, ServiceError> {
        if self.api_key.is_empty() {
            return Err(ServiceError::MissingCredential(
                "Firebase API key (set IELTSPREP_FIREBASE_KEY or [identity].api_key)".into(),
            ));
        }
        let credential = credential.trim();
        if credential.is_empty() {
            return Err(ServiceError::MissingCredential(format!(
                "{method} id token"
            )));
        }

        let url = reqwest::Url::parse_with_params(
            &format!("{}/v1/accounts:signInWithIdp", self.base_url),
            &[("key", self.api_key.as_str())],
        )
        .map_err(|e| ProviderError::Client(format!("invalid base url: {e}")))?;

        let body = SignInRequest {
            post_body: format!("id_token={credential}&providerId={}", method.provider_id()),
            request_uri: &self.request_uri,
            return_secure_token: true,
            return_idp_credential: true,
        };

        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| send_error(e, DEFAULT_TIMEOUT_SECS))?;

        // Identity Toolkit reports rejected credentials as 400.
        if response.status().as_u16() == 400 {
            let body = response.text().await.unwrap_or_default();
            let message = google_error_message(&body).unwrap_or(body);
            return Err(ServiceError::AuthenticationFailed(message));
        }
        let response = check_status(response, "accounts:signInWithIdp", google_error_message).await?;

        let reply: SignInResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("failed to parse sign-in reply: {e}")))?;

        tracing::info!(uid = %reply.local_id, "signed in");
        Ok(AuthUser {
            uid: reply.local_id,
            display_name: reply.display_name.or(reply.full_name),
            email: reply.email,
            id_token: reply.id_token,
        })
    }
}
