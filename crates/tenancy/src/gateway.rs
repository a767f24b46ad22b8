//! Authenticated request gateway.
//!
//! Every tenant-scoped platform call funnels through [`TenantGateway::call`]:
//! resolve the tenant first, then stamp its id into the request in whatever
//! shape the request body takes. The caller never supplies the tenant field
//! itself; if it tries, the value is overwritten.

use std::sync::Arc;

use kiosk_core::TenantId;
use reqwest::Method;
use reqwest::multipart::{Form, Part};
use secrecy::ExposeSecret;
use serde_json::{Map, Value};
use tracing::{error, instrument};

use crate::context::{RequestContext, SessionContext};
use crate::error::TenancyError;
use crate::resolver::TenantResolver;

/// Wire name of the tenant field injected into every call.
pub const TENANT_FIELD: &str = "storeId";

const BODY_SNIPPET_CHARS: usize = 200;
const LOG_SNIPPET_CHARS: usize = 500;

/// Body payload for write calls through the gateway.
#[derive(Debug, Clone)]
pub enum Payload {
    /// JSON object body. The tenant field is inserted after the caller's
    /// entries, so it wins any collision.
    Json(Map<String, Value>),
    /// Multipart form body. Any caller-supplied tenant part is stripped
    /// before the canonical one is appended.
    Multipart(MultipartPayload),
}

/// Multipart body assembled field-by-field.
///
/// `reqwest::multipart::Form` is append-only, which makes scrub-and-replace
/// of a single field impossible. The gateway keeps fields in its own
/// structure until send time for exactly that reason.
#[derive(Debug, Clone, Default)]
pub struct MultipartPayload {
    fields: Vec<MultipartField>,
}

#[derive(Debug, Clone)]
enum MultipartField {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: String,
        content_type: String,
        data: Vec<u8>,
    },
}

impl MultipartPayload {
    /// An empty multipart body.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a text field.
    #[must_use]
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(MultipartField::Text {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Append a file field.
    #[must_use]
    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        data: Vec<u8>,
    ) -> Self {
        self.fields.push(MultipartField::File {
            name: name.into(),
            file_name: file_name.into(),
            content_type: content_type.into(),
            data,
        });
        self
    }

    /// Number of fields currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when no fields are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn strip(&mut self, name: &str) {
        self.fields.retain(|field| {
            let field_name = match field {
                MultipartField::Text { name, .. } | MultipartField::File { name, .. } => name,
            };
            field_name != name
        });
    }

    fn into_form(self) -> Result<Form, TenancyError> {
        let mut form = Form::new();
        for field in self.fields {
            form = match field {
                MultipartField::Text { name, value } => form.text(name, value),
                MultipartField::File {
                    name,
                    file_name,
                    content_type,
                    data,
                } => {
                    let part = Part::bytes(data)
                        .file_name(file_name)
                        .mime_str(&content_type)?;
                    form.part(name, part)
                }
            };
        }
        Ok(form)
    }
}

/// Authenticated platform API client that injects the resolved tenant into
/// every request.
///
/// Cheap to clone; clones share the HTTP client, the session context, and
/// the resolver (including its slug cache).
#[derive(Clone)]
pub struct TenantGateway {
    inner: Arc<GatewayInner>,
}

struct GatewayInner {
    client: reqwest::Client,
    api_base: String,
    resolver: TenantResolver,
    context: SessionContext,
}

impl TenantGateway {
    /// Create a gateway bound to one session context.
    ///
    /// `api_base` is the platform API base URL without a trailing slash,
    /// e.g. `http://127.0.0.1:8000/api/v1`.
    #[must_use]
    pub fn new(
        api_base: impl Into<String>,
        resolver: TenantResolver,
        context: SessionContext,
    ) -> Self {
        Self {
            inner: Arc::new(GatewayInner {
                client: reqwest::Client::new(),
                api_base: api_base.into(),
                resolver,
                context,
            }),
        }
    }

    /// The session context this gateway was built with.
    #[must_use]
    pub fn context(&self) -> &SessionContext {
        &self.inner.context
    }

    /// GET with tenant-stamped query parameters.
    ///
    /// # Errors
    ///
    /// See [`call`](Self::call).
    pub async fn get(
        &self,
        nav: &RequestContext,
        path: &str,
        params: Map<String, Value>,
    ) -> Result<Value, TenancyError> {
        self.call(nav, Method::GET, path, Some(params), None).await
    }

    /// DELETE with tenant-stamped query parameters.
    ///
    /// # Errors
    ///
    /// See [`call`](Self::call).
    pub async fn delete(
        &self,
        nav: &RequestContext,
        path: &str,
        params: Map<String, Value>,
    ) -> Result<Value, TenancyError> {
        self.call(nav, Method::DELETE, path, Some(params), None)
            .await
    }

    /// POST with a tenant-stamped body.
    ///
    /// # Errors
    ///
    /// See [`call`](Self::call).
    pub async fn post(
        &self,
        nav: &RequestContext,
        path: &str,
        payload: Payload,
    ) -> Result<Value, TenancyError> {
        self.call(nav, Method::POST, path, None, Some(payload)).await
    }

    /// PUT with a tenant-stamped body.
    ///
    /// # Errors
    ///
    /// See [`call`](Self::call).
    pub async fn put(
        &self,
        nav: &RequestContext,
        path: &str,
        payload: Payload,
    ) -> Result<Value, TenancyError> {
        self.call(nav, Method::PUT, path, None, Some(payload)).await
    }

    /// PATCH with a tenant-stamped body.
    ///
    /// # Errors
    ///
    /// See [`call`](Self::call).
    pub async fn patch(
        &self,
        nav: &RequestContext,
        path: &str,
        payload: Payload,
    ) -> Result<Value, TenancyError> {
        self.call(nav, Method::PATCH, path, None, Some(payload))
            .await
    }

    /// Resolve the tenant, stamp it into the request, send, and return the
    /// response JSON verbatim.
    ///
    /// GET and DELETE always carry the tenant in the query string (params
    /// default to empty); body-carrying methods get it in the body. A `204`
    /// or otherwise empty success body comes back as `Value::Null`.
    ///
    /// # Errors
    ///
    /// [`TenancyError::TenantUnresolved`] before any bytes are sent when no
    /// tenant can be resolved; transport, status, and parse errors
    /// otherwise.
    #[instrument(skip(self, params, payload), fields(%method, path))]
    pub async fn call(
        &self,
        nav: &RequestContext,
        method: Method,
        path: &str,
        params: Option<Map<String, Value>>,
        payload: Option<Payload>,
    ) -> Result<Value, TenancyError> {
        let tenant = self
            .inner
            .resolver
            .resolve(&self.inner.context, nav)
            .await?;

        let url = format!("{}{path}", self.inner.api_base);
        let mut request = self.inner.client.request(method.clone(), &url);

        if matches!(method, Method::GET | Method::DELETE) {
            let mut query = params.unwrap_or_default();
            stamp_tenant(&mut query, &tenant);
            request = request.query(&query);
        }

        request = match payload {
            Some(Payload::Json(mut body)) => {
                stamp_tenant(&mut body, &tenant);
                request.json(&Value::Object(body))
            }
            Some(Payload::Multipart(mut parts)) => {
                parts.strip(TENANT_FIELD);
                let parts = parts.text(TENANT_FIELD, tenant.as_str());
                request.multipart(parts.into_form()?)
            }
            None => request,
        };

        if let Some(credential) = &self.inner.context.credential {
            request = request.bearer_auth(credential.expose_secret());
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            error!(
                %status,
                body = %text.chars().take(LOG_SNIPPET_CHARS).collect::<String>(),
                "platform API returned non-success status"
            );
            return Err(TenancyError::Status {
                status,
                snippet: text.chars().take(BODY_SNIPPET_CHARS).collect(),
            });
        }

        if text.is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }
}

impl std::fmt::Debug for TenantGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TenantGateway")
            .field("api_base", &self.inner.api_base)
            .finish_non_exhaustive()
    }
}

fn stamp_tenant(map: &mut Map<String, Value>, tenant: &TenantId) {
    map.insert(
        TENANT_FIELD.to_owned(),
        Value::String(tenant.as_str().to_owned()),
    );
}
