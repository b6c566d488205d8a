//! Server configuration read from the environment at startup.

use crate::errors::StartupError;
use std::env;
use url::Url;

pub const DEFAULT_BIND: &str = ":80";
pub const DEFAULT_DATA_STORE_URL: &str = "mongodb://localhost:27017/surveys";

/// Which backend to build, as described by `DATA_STORE_URL`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataStoreUrl {
    /// `uri` is the full connection string handed to the MongoDB driver.
    Mongo { uri: String, database: String },
    S3 { bucket: String },
    Sqlite { path: String },
}

impl DataStoreUrl {
    /// Parses a data store URL.
    ///
    /// MongoDB accepts comma separated host lists, which are not valid URLs,
    /// so scheme and path are read from a single-host form of the value.
    pub fn parse(raw: &str) -> Result<Self, StartupError> {
        if let Some(path) = raw.strip_prefix("sqlite://") {
            if path.is_empty() {
                return Err(StartupError::InvalidDataStoreUrl(raw.to_string()));
            }
            return Ok(DataStoreUrl::Sqlite {
                path: path.to_string(),
            });
        }

        let url = Url::parse(&single_host(raw))
            .map_err(|_| StartupError::InvalidDataStoreUrl(raw.to_string()))?;

        match url.scheme() {
            "mongodb" | "mongodb+srv" => {
                let database = url.path().trim_start_matches('/');
                if database.is_empty() {
                    return Err(StartupError::InvalidDataStoreUrl(raw.to_string()));
                }
                Ok(DataStoreUrl::Mongo {
                    uri: raw.to_string(),
                    database: database.to_string(),
                })
            }
            "s3" => {
                if !matches!(url.path(), "" | "/") {
                    return Err(StartupError::S3PathPrefix);
                }
                match url.host_str() {
                    Some(bucket) if !bucket.is_empty() => Ok(DataStoreUrl::S3 {
                        bucket: bucket.to_string(),
                    }),
                    _ => Err(StartupError::InvalidDataStoreUrl(raw.to_string())),
                }
            }
            other => Err(StartupError::UnknownScheme(other.to_string())),
        }
    }
}

/// Drops all but the last host of a `scheme://h1,h2,h3/path` list, keeping
/// the scheme and everything after the last host.
fn single_host(raw: &str) -> String {
    match (raw.find("://"), raw.rsplit_once(',')) {
        (Some(scheme_end), Some((_, last))) => format!("{}{}", &raw[..scheme_end + 3], last),
        _ => raw.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `host:port` the HTTP server binds to.
    pub bind: String,
    pub data_store: DataStoreUrl,
}

impl ServerConfig {
    /// Reads `BIND` and `DATA_STORE_URL` from the process environment.
    ///
    /// # Defaults
    ///
    /// - `BIND` defaults to `":80"` (all interfaces).
    /// - `DATA_STORE_URL` defaults to `"mongodb://localhost:27017/surveys"`.
    pub fn from_env() -> Result<Self, StartupError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, StartupError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind = lookup("BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let data_store =
            lookup("DATA_STORE_URL").unwrap_or_else(|| DEFAULT_DATA_STORE_URL.to_string());

        Ok(Self {
            bind: normalize_bind(&bind)?,
            data_store: DataStoreUrl::parse(&data_store)?,
        })
    }
}

/// Turns `:8080` into `0.0.0.0:8080`; full `host:port` values pass through.
pub fn normalize_bind(bind: &str) -> Result<String, StartupError> {
    let (host, port) = bind
        .rsplit_once(':')
        .ok_or_else(|| StartupError::InvalidBind(bind.to_string()))?;
    if port.parse::<u16>().is_err() {
        return Err(StartupError::InvalidBind(bind.to_string()));
    }
    let host = if host.is_empty() { "0.0.0.0" } else { host };
    Ok(format!("{}:{}", host, port))
}
