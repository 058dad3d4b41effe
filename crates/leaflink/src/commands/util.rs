//! Shared helpers for command handlers.

use leaflink_api::RestClient;
use leaflink_config::Config;
use leaflink_core::CoordinatorConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Load the config, applying the `--server` override.
pub fn load_config(global: &GlobalOpts) -> Config {
    let mut cfg = leaflink_config::load_config_or_default();
    if let Some(ref server) = global.server {
        cfg.server.clone_from(server);
    }
    cfg
}

/// Backend client without a token (login only).
pub fn rest_client(cfg: &Config) -> Result<RestClient, CliError> {
    let url = parse_server(cfg)?;
    Ok(RestClient::new(url).map_err(leaflink_core::CoreError::from)?)
}

/// Backend client carrying the stored bearer token.
pub fn rest_client_authed(cfg: &Config) -> Result<RestClient, CliError> {
    let token = leaflink_config::resolve_token(cfg).ok_or(CliError::NotAuthenticated)?;
    Ok(rest_client(cfg)?.with_token(token))
}

/// Full coordinator config (broker settings, token chain, instance id).
pub fn coordinator_config(cfg: &Config) -> Result<CoordinatorConfig, CliError> {
    Ok(leaflink_config::to_coordinator_config(cfg)?)
}

fn parse_server(cfg: &Config) -> Result<url::Url, CliError> {
    cfg.server.parse().map_err(|_| CliError::Validation {
        field: "server".into(),
        reason: format!("invalid URL: {}", cfg.server),
    })
}
