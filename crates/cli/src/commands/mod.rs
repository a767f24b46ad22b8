//! CLI subcommands.

pub mod call;
pub mod probe;
pub mod resolve;
pub mod sources;

/// Flag value first, then `KIOSK_API_URL` from the environment.
///
/// Loads `.env` as a side effect so one-off shells work like the server.
pub(crate) fn api_url_or_env(flag: Option<String>) -> Option<String> {
    dotenvy::dotenv().ok();
    flag.or_else(|| std::env::var("KIOSK_API_URL").ok())
}

/// Flag value first, then `KIOSK_TOKEN` from the environment.
pub(crate) fn token_or_env(flag: Option<String>) -> Option<String> {
    flag.or_else(|| std::env::var("KIOSK_TOKEN").ok())
}
