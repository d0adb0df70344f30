use crate::domain::model::Endpoint;
use crate::utils::error::{EntrypointError, Result};
use url::Url;

const ASYNC_POSTGRES_SCHEME: &str = "postgresql+asyncpg";
const SYNC_POSTGRES_SCHEME: &str = "postgresql";

/// Rewrites an async driver URL to the sync form the migration tool expects.
pub fn normalize_sync_url(raw: &str) -> String {
    match raw.strip_prefix(ASYNC_POSTGRES_SCHEME) {
        Some(rest) => format!("{}{}", SYNC_POSTGRES_SCHEME, rest),
        None => raw.to_string(),
    }
}

/// Default port for a scheme family, ignoring any `+driver` suffix.
pub fn default_port_for_scheme(scheme: &str) -> Option<u16> {
    let family = scheme.split('+').next().unwrap_or(scheme);
    match family {
        "postgres" | "postgresql" => Some(5432),
        "mysql" | "mariadb" => Some(3306),
        "redis" => Some(6379),
        _ => None,
    }
}

/// Host and port of a database URL. The port falls back to the scheme default.
pub fn endpoint_from_url(raw: &str) -> Result<(String, Option<u16>)> {
    let url = Url::parse(raw).map_err(|e| EntrypointError::InvalidConfigValueError {
        field: "database.url".to_string(),
        value: redact(raw),
        reason: format!("Invalid database URL: {}", e),
    })?;

    let host = url
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| EntrypointError::InvalidConfigValueError {
            field: "database.url".to_string(),
            value: redact(raw),
            reason: "Database URL has no host".to_string(),
        })?;
    // IPv6 hosts come back bracketed; the socket API wants them bare.
    let host = host.trim_start_matches('[').trim_end_matches(']').to_string();

    let port = url.port().or_else(|| default_port_for_scheme(url.scheme()));
    Ok((host, port))
}

pub fn resolve_endpoint(
    host: Option<&str>,
    port: Option<u16>,
    database_url: Option<&str>,
    default_host: &str,
    default_port: u16,
) -> Result<Endpoint> {
    let (url_host, url_port) = match database_url {
        Some(raw) if host.is_none() || port.is_none() => {
            let (h, p) = endpoint_from_url(raw)?;
            (Some(h), p)
        }
        _ => (None, None),
    };

    let host = host
        .map(str::to_string)
        .or(url_host)
        .unwrap_or_else(|| default_host.to_string());
    let port = port.or(url_port).unwrap_or(default_port);

    Ok(Endpoint::new(host, port))
}

/// Masks the password component so URLs can appear in errors and logs.
pub fn redact(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(mut url) if url.password().is_some() => {
            if url.set_password(Some("***")).is_err() {
                return "<unprintable url>".to_string();
            }
            url.to_string()
        }
        Ok(url) => url.to_string(),
        Err(_) => "<unparseable url>".to_string(),
    }
}
