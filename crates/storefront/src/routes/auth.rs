//! Customer authentication route handlers.
//!
//! Login, signup, and logout are all store-scoped: the platform keeps a
//! separate customer directory per store, so every handler first resolves
//! the store from the path slug and then talks to the platform with that
//! store's tenant id.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::warn;

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{CustomerSession, clear_customer, set_customer};
use crate::platform::PlatformError;
use crate::routes::live::load_live_store;
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Signup form data.
#[derive(Debug, Deserialize)]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

/// Query parameters for error/success display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub store_name: String,
    pub slug: String,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Signup page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/signup.html")]
pub struct SignupTemplate {
    pub store_name: String,
    pub slug: String,
    pub error: Option<String>,
}

/// Map an error code from the redirect query to a display message.
fn error_message(code: &str) -> &'static str {
    match code {
        "credentials" => "Invalid email or password.",
        "missing_fields" => "Please fill in every field.",
        "password_mismatch" => "Passwords don't match.",
        "password_too_short" => "Password must be at least 8 characters.",
        "email_taken" => "An account with this email already exists in this store.",
        "session" => "Couldn't save your session. Please try again.",
        "unavailable" => "The store can't be reached right now. Please try again in a moment.",
        _ => "Something went wrong. Please try again.",
    }
}

/// Map a success code from the redirect query to a display message.
fn success_message(code: &str) -> &'static str {
    match code {
        "signed_out" => "You're signed out.",
        _ => "Done.",
    }
}

// =============================================================================
// Login Routes
// =============================================================================

/// `GET /s/{slug}/login` - display the login page.
pub async fn login_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<MessageQuery>,
) -> Response {
    let (slug, live) = match load_live_store(&state, &slug).await {
        Ok(loaded) => loaded,
        Err(page) => return page,
    };

    LoginTemplate {
        store_name: live.store.name,
        slug: slug.to_string(),
        error: query.error.as_deref().map(|code| error_message(code).to_string()),
        success: query
            .success
            .as_deref()
            .map(|code| success_message(code).to_string()),
    }
    .into_response()
}

/// `POST /s/{slug}/login` - handle login form submission.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Path(slug): Path<String>,
    Form(form): Form<LoginForm>,
) -> Response {
    let (slug, live) = match load_live_store(&state, &slug).await {
        Ok(loaded) => loaded,
        Err(page) => return page,
    };

    if form.email.trim().is_empty() || form.password.is_empty() {
        return Redirect::to(&format!("/s/{slug}/login?error=missing_fields")).into_response();
    }

    match state
        .customers()
        .login(&live.store.id, form.email.trim(), &form.password)
        .await
    {
        Ok(auth) => {
            let record = CustomerSession {
                tenant_id: live.store.id.clone(),
                token: auth.token,
                customer: auth.customer,
            };

            if let Err(e) = set_customer(&session, &record).await {
                tracing::error!("Failed to set session: {}", e);
                return Redirect::to(&format!("/s/{slug}/login?error=session")).into_response();
            }

            if let Some(id) = &record.customer.id {
                set_sentry_user(id, record.customer.email.as_deref());
            }

            Redirect::to(&format!("/s/{slug}")).into_response()
        }
        Err(PlatformError::Rejected(reason)) => {
            warn!(%slug, %reason, "customer login rejected");
            Redirect::to(&format!("/s/{slug}/login?error=credentials")).into_response()
        }
        Err(e) => {
            warn!(%slug, error = %e, "customer login failed");
            Redirect::to(&format!("/s/{slug}/login?error=unavailable")).into_response()
        }
    }
}

// =============================================================================
// Signup Routes
// =============================================================================

/// `GET /s/{slug}/signup` - display the signup page.
pub async fn signup_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<MessageQuery>,
) -> Response {
    let (slug, live) = match load_live_store(&state, &slug).await {
        Ok(loaded) => loaded,
        Err(page) => return page,
    };

    SignupTemplate {
        store_name: live.store.name,
        slug: slug.to_string(),
        error: query.error.as_deref().map(|code| error_message(code).to_string()),
    }
    .into_response()
}

/// `POST /s/{slug}/signup` - handle signup form submission.
///
/// A successful registration signs the customer straight in; the platform
/// returns a token with the new account.
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    Path(slug): Path<String>,
    Form(form): Form<SignupForm>,
) -> Response {
    let (slug, live) = match load_live_store(&state, &slug).await {
        Ok(loaded) => loaded,
        Err(page) => return page,
    };

    if form.name.trim().is_empty() || form.email.trim().is_empty() {
        return Redirect::to(&format!("/s/{slug}/signup?error=missing_fields")).into_response();
    }
    if form.password != form.password_confirm {
        return Redirect::to(&format!("/s/{slug}/signup?error=password_mismatch")).into_response();
    }
    if form.password.len() < 8 {
        return Redirect::to(&format!("/s/{slug}/signup?error=password_too_short"))
            .into_response();
    }

    match state
        .customers()
        .register(&live.store.id, form.name.trim(), form.email.trim(), &form.password)
        .await
    {
        Ok(auth) => {
            let record = CustomerSession {
                tenant_id: live.store.id.clone(),
                token: auth.token,
                customer: auth.customer,
            };

            if let Err(e) = set_customer(&session, &record).await {
                tracing::error!("Failed to set session: {}", e);
                return Redirect::to(&format!("/s/{slug}/login?error=session")).into_response();
            }

            if let Some(id) = &record.customer.id {
                set_sentry_user(id, record.customer.email.as_deref());
            }

            Redirect::to(&format!("/s/{slug}")).into_response()
        }
        Err(PlatformError::Rejected(reason)) => {
            warn!(%slug, %reason, "customer signup rejected");
            let code = if reason.contains("exist") || reason.contains("taken") {
                "email_taken"
            } else {
                "failed"
            };
            Redirect::to(&format!("/s/{slug}/signup?error={code}")).into_response()
        }
        Err(e) => {
            warn!(%slug, error = %e, "customer signup failed");
            Redirect::to(&format!("/s/{slug}/signup?error=unavailable")).into_response()
        }
    }
}

// =============================================================================
// Logout
// =============================================================================

/// `POST /s/{slug}/logout` - sign out of one store.
///
/// Only this store's login is cleared; the same browser session stays
/// signed in to any other stores.
pub async fn logout(
    State(state): State<AppState>,
    session: Session,
    Path(slug): Path<String>,
) -> Response {
    let (slug, live) = match load_live_store(&state, &slug).await {
        Ok(loaded) => loaded,
        Err(page) => return page,
    };

    if let Err(e) = clear_customer(&session, &live.store.id).await {
        tracing::error!("Failed to clear session: {}", e);
    }
    clear_sentry_user();

    Redirect::to(&format!("/s/{slug}/login?success=signed_out")).into_response()
}
