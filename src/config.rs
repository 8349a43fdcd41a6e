use std::env;
use std::num::ParseIntError;
use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use thiserror::Error;

const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable {name}")]
    Missing { name: &'static str },

    #[error("Unable to parse environment variable {name}")]
    Unparseable {
        name: &'static str,
        source: ParseIntError,
    },
}

/// Database settings read from the environment.
#[derive(Clone, Debug)]
pub struct DbConfig {
    pub connection_string: String,
    pub max_connections: u32,

    /// How long a single create call may take, if limited.
    pub create_timeout: Option<Duration>,
}

impl DbConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        const CONNECTION_STRING: &str = "MOVIES_DB_CONNECTION_STRING";

        let connection_string = env::var(CONNECTION_STRING).map_err(|_| ConfigError::Missing {
            name: CONNECTION_STRING,
        })?;

        let max_connections = parse_optional("MOVIES_DB_MAX_CONNECTIONS")?
            .unwrap_or(DEFAULT_MAX_CONNECTIONS);

        let create_timeout =
            parse_optional::<u64>("MOVIES_CREATE_TIMEOUT_SECONDS")?.map(Duration::from_secs);

        Ok(DbConfig {
            connection_string,
            max_connections,
            create_timeout,
        })
    }

    pub async fn connect(&self) -> Result<PgPool, sqlx::Error> {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .connect(&self.connection_string)
            .await
    }
}

fn parse_optional<T>(name: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr<Err = ParseIntError>,
{
    match env::var(name) {
        Ok(value) => value
            .parse()
            .map(Some)
            .map_err(|source| ConfigError::Unparseable { name, source }),
        Err(_) => Ok(None),
    }
}
