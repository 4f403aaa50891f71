use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use classroom_application::TokenLifetimes;
use classroom_core::AppError;
use tracing_subscriber::EnvFilter;

/// Runtime configuration read from the process environment.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub database_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub db_max_connections: u32,
    pub shutdown_grace: Duration,
    pub token_lifetimes: TokenLifetimes,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");

        let database_url = required_non_empty_env("DATABASE_URL")?;
        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = parsed_env("API_PORT", 4000_u16)?;
        let db_max_connections = parsed_env("DB_MAX_CONNECTIONS", 10_u32)?;
        if db_max_connections == 0 {
            return Err(AppError::Validation(
                "DB_MAX_CONNECTIONS must be greater than zero".to_owned(),
            ));
        }

        let shutdown_grace = Duration::from_secs(parsed_env("SHUTDOWN_GRACE_SECONDS", 5_u64)?);

        let token_lifetimes = TokenLifetimes {
            activation: token_lifetime("ACTIVATION_TOKEN_TTL_HOURS", 72)?,
            authentication: token_lifetime("AUTHENTICATION_TOKEN_TTL_HOURS", 24)?,
        };

        Ok(Self {
            migrate_only,
            database_url,
            api_host,
            api_port,
            db_max_connections,
            shutdown_grace,
            token_lifetimes,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

/// Longest accepted token lifetime, ten years.
const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365 * 10;

fn token_lifetime(name: &str, default_hours: i64) -> Result<chrono::Duration, AppError> {
    let hours = parsed_env(name, default_hours)?;
    if !(1..=MAX_TOKEN_TTL_HOURS).contains(&hours) {
        return Err(AppError::Validation(format!(
            "{name} must be between 1 and {MAX_TOKEN_TTL_HOURS}"
        )));
    }

    chrono::Duration::try_hours(hours)
        .ok_or_else(|| AppError::Validation(format!("{name} is out of range")))
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn required_non_empty_env(name: &str) -> Result<String, AppError> {
    let value = required_env(name)?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}

/// Reads an optional variable, falling back to `default` when it is unset or
/// blank. A value that does not parse is rejected rather than ignored.
fn parsed_env<T>(name: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse::<T>()
            .map_err(|error| AppError::Validation(format!("invalid {name}: {error}"))),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use classroom_core::AppError;

    use super::{MAX_TOKEN_TTL_HOURS, parsed_env, token_lifetime};

    #[test]
    fn unset_variable_uses_default() {
        let value = parsed_env("CLASSROOM_TEST_UNSET_VARIABLE", 42_u16);
        assert!(matches!(value, Ok(42)));
    }

    #[test]
    fn unset_token_lifetime_uses_default() {
        let lifetime = token_lifetime("CLASSROOM_TEST_UNSET_TTL_HOURS", 72);
        assert!(matches!(lifetime, Ok(hours) if hours == chrono::Duration::hours(72)));
    }

    #[test]
    fn token_lifetime_outside_bounds_is_rejected() {
        for hours in [0, -1, MAX_TOKEN_TTL_HOURS + 1, 3_000_000_000, i64::MAX] {
            let lifetime = token_lifetime("CLASSROOM_TEST_UNSET_TTL_HOURS", hours);
            assert!(
                matches!(lifetime, Err(AppError::Validation(_))),
                "{hours} hours should be rejected"
            );
        }
    }
}
