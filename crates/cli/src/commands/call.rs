//! Exercise the authenticated gateway from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Tenant-stamped GET (storeId is injected into the query)
//! kiosk call get /store/products --param page=1 --store t_123
//!
//! # Tenant-stamped POST (storeId is injected into the body)
//! kiosk call post /store/products --data '{"name": "Widget"}' \
//!     --token "$KIOSK_TOKEN" --store t_123
//! ```
//!
//! The gateway resolves the tenant exactly as the server would, so `call` is
//! also the quickest way to check what a given token/override combination
//! resolves to in practice.

use clap::{Args, ValueEnum};
use kiosk_tenancy::{
    Payload, RequestContext, SessionContext, TenancyError, TenantGateway, TenantResolver,
};
use serde_json::{Map, Value};
use thiserror::Error;

/// HTTP methods the gateway exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CallMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

/// Arguments for the `call` command.
#[derive(Debug, Args)]
pub struct CallArgs {
    /// HTTP method
    #[arg(value_enum)]
    pub method: CallMethod,

    /// API path, e.g. /store/products
    pub path: String,

    /// Query parameter as key=value (GET/DELETE only; repeatable)
    #[arg(long = "param", value_name = "KEY=VALUE")]
    pub params: Vec<String>,

    /// JSON object body (POST/PUT/PATCH only)
    #[arg(long)]
    pub data: Option<String>,

    /// Bearer token (default: KIOSK_TOKEN)
    #[arg(long)]
    pub token: Option<String>,

    /// Session-scope store override
    #[arg(long)]
    pub store: Option<String>,

    /// Platform API base URL (default: KIOSK_API_URL)
    #[arg(long)]
    pub api_url: Option<String>,
}

/// Errors that can occur while calling through the gateway.
#[derive(Debug, Error)]
pub enum CallError {
    /// No API URL was supplied in any form.
    #[error("Missing API URL: pass --api-url or set KIOSK_API_URL")]
    MissingApiUrl,

    /// A `--param` entry is not of the form `key=value`.
    #[error("Invalid --param {0:?}: expected key=value")]
    InvalidParam(String),

    /// The `--data` argument is not valid JSON.
    #[error("Invalid --data: {0}")]
    InvalidBody(serde_json::Error),

    /// The `--data` argument is valid JSON but not an object.
    #[error("--data must be a JSON object")]
    BodyNotObject,

    /// Query parameters were combined with a body-carrying method.
    #[error("--param only applies to get and delete")]
    ParamsWithBodyMethod,

    /// A body was combined with a query-carrying method.
    #[error("--data only applies to post, put, and patch")]
    BodyWithQueryMethod,

    /// The gateway call itself failed.
    #[error("Gateway call failed: {0}")]
    Gateway(#[from] TenancyError),
}

/// Send one gateway call and pretty-print the response JSON.
pub async fn run(args: CallArgs) -> Result<(), CallError> {
    let api_url = super::api_url_or_env(args.api_url.clone()).ok_or(CallError::MissingApiUrl)?;

    let mut ctx = SessionContext::anonymous();
    if let Some(token) = super::token_or_env(args.token.clone()) {
        ctx = ctx.with_credential(token);
    }
    if let Some(store) = args.store.as_deref() {
        ctx.overrides.set_session("store_id", store);
    }

    let resolver = TenantResolver::new(api_url.clone());
    let gateway = TenantGateway::new(api_url, resolver, ctx);
    let nav = RequestContext::detached();

    match args.method {
        CallMethod::Get | CallMethod::Delete if args.data.is_some() => {
            return Err(CallError::BodyWithQueryMethod);
        }
        CallMethod::Post | CallMethod::Put | CallMethod::Patch if !args.params.is_empty() => {
            return Err(CallError::ParamsWithBodyMethod);
        }
        _ => {}
    }

    let response = match args.method {
        CallMethod::Get => {
            gateway
                .get(&nav, &args.path, parse_params(&args.params)?)
                .await?
        }
        CallMethod::Delete => {
            gateway
                .delete(&nav, &args.path, parse_params(&args.params)?)
                .await?
        }
        CallMethod::Post => {
            gateway
                .post(&nav, &args.path, parse_payload(args.data.as_deref())?)
                .await?
        }
        CallMethod::Put => {
            gateway
                .put(&nav, &args.path, parse_payload(args.data.as_deref())?)
                .await?
        }
        CallMethod::Patch => {
            gateway
                .patch(&nav, &args.path, parse_payload(args.data.as_deref())?)
                .await?
        }
    };

    #[allow(clippy::print_stdout)]
    {
        let pretty =
            serde_json::to_string_pretty(&response).unwrap_or_else(|_| response.to_string());
        println!("{pretty}");
    }
    Ok(())
}

fn parse_params(raw: &[String]) -> Result<Map<String, Value>, CallError> {
    let mut params = Map::new();
    for entry in raw {
        let (key, value) = entry
            .split_once('=')
            .ok_or_else(|| CallError::InvalidParam(entry.clone()))?;
        params.insert(key.to_owned(), Value::String(value.to_owned()));
    }
    Ok(params)
}

fn parse_payload(raw: Option<&str>) -> Result<Payload, CallError> {
    let Some(raw) = raw else {
        return Ok(Payload::Json(Map::new()));
    };
    match serde_json::from_str::<Value>(raw).map_err(CallError::InvalidBody)? {
        Value::Object(map) => Ok(Payload::Json(map)),
        _ => Err(CallError::BodyNotObject),
    }
}
