//! Per-tenant customer session storage.
//!
//! One browser session can hold logins for several stores at once. Each
//! login is stored under its own tenant-derived key, so reading store A's
//! customer can never observe store B's, and logging out of one store
//! leaves the others signed in.

use kiosk_core::TenantId;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::platform::CustomerAccount;

/// A customer login bound to one store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerSession {
    /// Store this login belongs to.
    pub tenant_id: TenantId,
    /// Bearer token issued by the platform.
    pub token: String,
    /// Profile snapshot captured at login time.
    pub customer: CustomerAccount,
}

/// Session key for one tenant's customer record: `customer.{tenant_id}`.
#[must_use]
pub fn customer_session_key(tenant_id: &TenantId) -> String {
    format!("customer.{tenant_id}")
}

/// Read the customer login for one store.
///
/// A missing or undecodable record reads as not logged in.
pub async fn current_customer(session: &Session, tenant_id: &TenantId) -> Option<CustomerSession> {
    session
        .get(&customer_session_key(tenant_id))
        .await
        .ok()
        .flatten()
}

/// Store a customer login under its tenant's key.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_customer(
    session: &Session,
    record: &CustomerSession,
) -> Result<(), tower_sessions::session::Error> {
    session
        .insert(&customer_session_key(&record.tenant_id), record)
        .await
}

/// Clear one store's customer login, leaving other stores' logins intact.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_customer(
    session: &Session,
    tenant_id: &TenantId,
) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CustomerSession>(&customer_session_key(tenant_id))
        .await?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    fn test_session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    fn login_for(tenant: &str) -> CustomerSession {
        CustomerSession {
            tenant_id: TenantId::parse(tenant).unwrap(),
            token: format!("token-for-{tenant}"),
            customer: CustomerAccount {
                id: Some(format!("cust-{tenant}")),
                name: Some("Ada".to_string()),
                email: Some("ada@example.com".to_string()),
            },
        }
    }

    #[tokio::test]
    async fn test_logins_are_isolated_per_tenant() {
        let session = test_session();
        let acme = TenantId::parse("t_acme").unwrap();
        let zenith = TenantId::parse("t_zenith").unwrap();

        set_customer(&session, &login_for("t_acme")).await.unwrap();

        let found = current_customer(&session, &acme).await.unwrap();
        assert_eq!(found.token, "token-for-t_acme");
        assert!(current_customer(&session, &zenith).await.is_none());
    }

    #[tokio::test]
    async fn test_logout_clears_only_one_tenant() {
        let session = test_session();
        let acme = TenantId::parse("t_acme").unwrap();
        let zenith = TenantId::parse("t_zenith").unwrap();

        set_customer(&session, &login_for("t_acme")).await.unwrap();
        set_customer(&session, &login_for("t_zenith"))
            .await
            .unwrap();

        clear_customer(&session, &acme).await.unwrap();

        assert!(current_customer(&session, &acme).await.is_none());
        assert!(current_customer(&session, &zenith).await.is_some());
    }

    #[tokio::test]
    async fn test_relogin_overwrites_previous_token() {
        let session = test_session();
        let acme = TenantId::parse("t_acme").unwrap();

        set_customer(&session, &login_for("t_acme")).await.unwrap();
        let mut renewed = login_for("t_acme");
        renewed.token = "fresh-token".to_string();
        set_customer(&session, &renewed).await.unwrap();

        let found = current_customer(&session, &acme).await.unwrap();
        assert_eq!(found.token, "fresh-token");
    }

    #[test]
    fn test_session_key_embeds_tenant_id() {
        let tenant = TenantId::parse("t_123").unwrap();
        assert_eq!(customer_session_key(&tenant), "customer.t_123");
    }
}
