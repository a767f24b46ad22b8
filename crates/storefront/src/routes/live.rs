//! Live storefront page.
//!
//! One handler serves every store: the slug in the path picks the tenant,
//! the live payload describes it, and the delivery selector decides between
//! an embedded export, a built-in template, and the empty-store page.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kiosk_core::StoreSlug;
use tower_sessions::Session;
use tracing::{error, instrument};

use crate::delivery::DeliveryMode;
use crate::error::add_breadcrumb;
use crate::filters;
use crate::middleware::current_customer;
use crate::platform::{LiveStore, PlatformError};
use crate::state::AppState;
use crate::themes;

/// Embedded export page: a full-viewport iframe around the uploaded theme.
#[derive(Template, WebTemplate)]
#[template(path = "live_embed.html")]
pub struct LiveEmbedTemplate {
    pub store_name: String,
    pub embed_url: String,
}

/// Page for a live store with no theme assigned.
#[derive(Template, WebTemplate)]
#[template(path = "store_empty.html")]
pub struct StoreEmptyTemplate {
    pub store_name: String,
}

/// Page for a store that could not be delivered.
#[derive(Template, WebTemplate)]
#[template(path = "store_error.html")]
pub struct StoreErrorTemplate {
    pub slug: String,
    pub message: String,
}

/// Load the live payload for a raw path slug, mapping every failure to a
/// complete error page so callers can `?`-style early-return the response.
///
/// Failures render distinctly from an empty storefront: a missing or
/// unreachable store is an error page with an error status, never a blank
/// store page.
pub(crate) async fn load_live_store(
    state: &AppState,
    raw_slug: &str,
) -> Result<(StoreSlug, LiveStore), Response> {
    let Ok(slug) = StoreSlug::parse(raw_slug) else {
        let page = StoreErrorTemplate {
            slug: raw_slug.to_string(),
            message: "That doesn't look like a store address.".to_string(),
        };
        return Err((StatusCode::NOT_FOUND, page).into_response());
    };

    match state.live_store().fetch(&slug).await {
        Ok(live) => Ok((slug, live)),
        Err(PlatformError::NotFound(_)) => {
            let page = StoreErrorTemplate {
                slug: slug.to_string(),
                message: "This store doesn't exist or isn't live yet.".to_string(),
            };
            Err((StatusCode::NOT_FOUND, page).into_response())
        }
        Err(err) => {
            error!(%slug, error = %err, "live storefront fetch failed");
            let page = StoreErrorTemplate {
                slug: slug.to_string(),
                message: "The store can't be reached right now. Please try again in a moment."
                    .to_string(),
            };
            Err((StatusCode::BAD_GATEWAY, page).into_response())
        }
    }
}

/// `GET /s/{slug}` - deliver a store's front page.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Path(slug): Path<String>,
) -> Response {
    let (slug, live) = match load_live_store(&state, &slug).await {
        Ok(loaded) => loaded,
        Err(page) => return page,
    };

    let storefront = state.delivery().select(&live).await;
    add_breadcrumb(
        "delivery",
        "Selected storefront mode",
        Some(&[("store", slug.as_str())]),
    );

    match storefront.mode {
        DeliveryMode::EmbeddedExport { url } => LiveEmbedTemplate {
            store_name: live.store.name.clone(),
            embed_url: url,
        }
        .into_response(),
        DeliveryMode::NativeTemplate { theme_slug } => {
            let customer = current_customer(&session, &storefront.tenant_id).await;
            themes::render(&theme_slug, &live, customer.as_ref())
        }
        DeliveryMode::Empty => StoreEmptyTemplate {
            store_name: live.store.name.clone(),
        }
        .into_response(),
    }
}
