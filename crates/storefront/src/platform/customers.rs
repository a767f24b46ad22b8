//! Customer account client.
//!
//! Customer accounts live on the platform and are scoped to one store: the
//! same email can hold separate accounts in separate stores, so every call
//! here carries the tenant id in its body.

use std::sync::Arc;
use std::time::Duration;

use kiosk_core::TenantId;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, instrument};

use super::{PlatformError, snippet};

const AUTH_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the platform's customer account endpoints.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Clone)]
pub struct CustomerClient {
    inner: Arc<CustomerClientInner>,
}

struct CustomerClientInner {
    client: reqwest::Client,
    api_base: String,
}

/// A customer as the platform reports it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerAccount {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Result of a successful login or registration.
#[derive(Debug, Clone)]
pub struct CustomerAuth {
    /// Bearer token for subsequent customer-scoped calls.
    pub token: String,
    pub customer: CustomerAccount,
}

#[derive(Debug, Deserialize)]
struct AuthEnvelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    customer: Option<CustomerAccount>,
    #[serde(default)]
    message: Option<String>,
}

impl CustomerClient {
    /// Create a client for the given API base URL (version prefix included).
    #[must_use]
    pub fn new(api_base: impl Into<String>) -> Self {
        let api_base = api_base.into().trim_end_matches('/').to_string();
        Self {
            inner: Arc::new(CustomerClientInner {
                client: reqwest::Client::new(),
                api_base,
            }),
        }
    }

    /// Log a customer in to one store.
    ///
    /// # Errors
    ///
    /// `PlatformError::Rejected` for bad credentials; other variants for
    /// transport and payload problems.
    #[instrument(skip(self, password), fields(tenant = %tenant))]
    pub async fn login(
        &self,
        tenant: &TenantId,
        email: &str,
        password: &str,
    ) -> Result<CustomerAuth, PlatformError> {
        let body = json!({
            "email": email,
            "password": password,
            "store_id": tenant,
        });
        self.authenticate("login", &body).await
    }

    /// Register a customer account in one store.
    ///
    /// # Errors
    ///
    /// `PlatformError::Rejected` when the platform refuses the account (for
    /// example a duplicate email within the store).
    #[instrument(skip(self, password), fields(tenant = %tenant))]
    pub async fn register(
        &self,
        tenant: &TenantId,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<CustomerAuth, PlatformError> {
        let body = json!({
            "name": name,
            "email": email,
            "password": password,
            "store_id": tenant,
        });
        self.authenticate("register", &body).await
    }

    async fn authenticate(
        &self,
        action: &str,
        body: &serde_json::Value,
    ) -> Result<CustomerAuth, PlatformError> {
        let url = format!("{}/store/customers/{}", self.inner.api_base, action);
        let response = self
            .inner
            .client
            .post(&url)
            .timeout(AUTH_TIMEOUT)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if status.is_client_error() {
            let message = serde_json::from_str::<AuthEnvelope>(&text)
                .ok()
                .and_then(|envelope| envelope.message)
                .unwrap_or_else(|| snippet(&text));
            return Err(PlatformError::Rejected(message));
        }
        if !status.is_success() {
            return Err(PlatformError::Status {
                status,
                snippet: snippet(&text),
            });
        }

        let envelope: AuthEnvelope = serde_json::from_str(&text)?;
        match (envelope.success, envelope.token) {
            (true, Some(token)) => {
                debug!(action, "customer authenticated");
                Ok(CustomerAuth {
                    token,
                    customer: envelope.customer.unwrap_or_default(),
                })
            }
            _ => Err(PlatformError::Rejected(
                envelope
                    .message
                    .unwrap_or_else(|| "authentication failed".to_string()),
            )),
        }
    }
}

impl std::fmt::Debug for CustomerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomerClient")
            .field("api_base", &self.inner.api_base)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_envelope_with_token() {
        let json = r#"{
            "success": true,
            "token": "jwt-here",
            "customer": {"id": "cust_1", "name": "Ada", "email": "ada@example.com"}
        }"#;
        let envelope: AuthEnvelope = serde_json::from_str(json).unwrap();
        assert!(envelope.success);
        assert_eq!(envelope.token.as_deref(), Some("jwt-here"));
        assert_eq!(envelope.customer.unwrap().name.as_deref(), Some("Ada"));
    }

    #[test]
    fn test_auth_envelope_failure_message() {
        let json = r#"{"success": false, "message": "Invalid credentials"}"#;
        let envelope: AuthEnvelope = serde_json::from_str(json).unwrap();
        assert!(!envelope.success);
        assert!(envelope.token.is_none());
        assert_eq!(envelope.message.as_deref(), Some("Invalid credentials"));
    }

    #[test]
    fn test_customer_account_roundtrips_through_session_storage() {
        let account = CustomerAccount {
            id: Some("cust_1".to_string()),
            name: Some("Ada".to_string()),
            email: Some("ada@example.com".to_string()),
        };
        let json = serde_json::to_string(&account).unwrap();
        let back: CustomerAccount = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id.as_deref(), Some("cust_1"));
    }
}
