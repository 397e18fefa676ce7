//! Store connection configuration.
//!
//! Values are read once from a `database.properties` file in Java properties
//! format: `key=value`, `key: value` and `key value` lines, `#`/`!` comments,
//! backslash escapes and continuation lines. Every recognised key has a
//! built-in default, so loading never fails: a missing file, a missing key,
//! or an unparseable value all degrade to the documented default and log a
//! warning.

use std::collections::HashMap;
use std::env;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::str::FromStr;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use thiserror::Error;
use tracing::{debug, warn};

/// Default properties file name, resolved relative to the working directory.
pub const DEFAULT_PROPERTIES_FILE: &str = "database.properties";

/// Recognised property keys.
pub mod keys {
    /// Connection URI (`jdbc:` prefix accepted).
    pub const URL: &str = "database.url";
    /// Login role.
    pub const USERNAME: &str = "database.username";
    /// Login password.
    pub const PASSWORD: &str = "database.password";
    /// Driver identifier.
    pub const DRIVER: &str = "jdbc.driver";
    /// SQL dialect identifier.
    pub const DIALECT: &str = "hibernate.dialect";
    /// Schema management mode.
    pub const SCHEMA_MODE: &str = "hibernate.hbm2ddl.auto";
    /// Statement logging flag.
    pub const SHOW_SQL: &str = "hibernate.show_sql";
    /// Maximum pooled connections.
    pub const POOL_MAX_SIZE: &str = "database.pool.maximumPoolSize";
    /// Minimum idle pooled connections.
    pub const POOL_MIN_IDLE: &str = "database.pool.minimumIdle";
}

/// Environment variable overriding [`keys::URL`].
pub const URL_ENV_VAR: &str = "CRAFTMESSAGE_DATABASE_URL";
/// Environment variable overriding [`keys::USERNAME`].
pub const USERNAME_ENV_VAR: &str = "CRAFTMESSAGE_DATABASE_USERNAME";
/// Environment variable overriding [`keys::PASSWORD`].
pub const PASSWORD_ENV_VAR: &str = "CRAFTMESSAGE_DATABASE_PASSWORD";

/// Bytes escaped in the userinfo part of a connection URL: everything but the
/// RFC 3986 unreserved set.
const USERINFO: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

const ENV_OVERRIDES: [(&str, &str); 3] = [
    (URL_ENV_VAR, keys::URL),
    (USERNAME_ENV_VAR, keys::USERNAME),
    (PASSWORD_ENV_VAR, keys::PASSWORD),
];

/// Default connection URI.
pub const DEFAULT_URL: &str = "jdbc:postgresql://localhost:5432/craftmessage";
/// Default login role.
pub const DEFAULT_USERNAME: &str = "postgres";
/// Default login password.
pub const DEFAULT_PASSWORD: &str = "postgres";
/// Default driver identifier.
pub const DEFAULT_DRIVER: &str = "org.postgresql.Driver";
/// Default dialect identifier.
pub const DEFAULT_DIALECT: &str = "org.hibernate.dialect.PostgreSQLDialect";
/// Default statement logging flag.
pub const DEFAULT_SHOW_SQL: bool = false;
/// Default maximum pool size.
pub const DEFAULT_POOL_MAX_SIZE: u32 = 10;
/// Default minimum idle connections.
pub const DEFAULT_POOL_MIN_IDLE: u32 = 2;

/// How the store schema is managed when the Store Handle initialises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchemaMode {
    /// Leave the schema alone.
    None,
    /// Check that the expected table and columns exist.
    Validate,
    /// Create the table when it is missing.
    #[default]
    Update,
    /// Drop and recreate the table.
    Create,
    /// Recreate the table and drop it again when the handle closes.
    CreateDrop,
}

impl SchemaMode {
    /// Returns the canonical property value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Validate => "validate",
            Self::Update => "update",
            Self::Create => "create",
            Self::CreateDrop => "create-drop",
        }
    }
}

impl fmt::Display for SchemaMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemaMode {
    type Err = ParseSchemaModeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "validate" => Ok(Self::Validate),
            "update" => Ok(Self::Update),
            "create" => Ok(Self::Create),
            "create-drop" => Ok(Self::CreateDrop),
            _ => Err(ParseSchemaModeError(value.to_owned())),
        }
    }
}

/// Error returned when a schema mode value is not recognised.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown schema mode: {0}")]
pub struct ParseSchemaModeError(pub String);

/// Immutable connection configuration for the message store.
#[derive(Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Connection URI as configured (may carry a `jdbc:` prefix).
    pub url: String,
    /// Login role.
    pub username: String,
    /// Login password.
    pub password: String,
    /// Driver identifier.
    pub driver: String,
    /// SQL dialect identifier.
    pub dialect: String,
    /// Schema management mode.
    pub schema_mode: SchemaMode,
    /// Whether executed statements are logged.
    pub show_sql: bool,
    /// Maximum pooled connections.
    pub pool_max_size: u32,
    /// Minimum idle pooled connections, never above `pool_max_size`.
    pub pool_min_idle: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_owned(),
            username: DEFAULT_USERNAME.to_owned(),
            password: DEFAULT_PASSWORD.to_owned(),
            driver: DEFAULT_DRIVER.to_owned(),
            dialect: DEFAULT_DIALECT.to_owned(),
            schema_mode: SchemaMode::default(),
            show_sql: DEFAULT_SHOW_SQL,
            pool_max_size: DEFAULT_POOL_MAX_SIZE,
            pool_min_idle: DEFAULT_POOL_MIN_IDLE,
        }
    }
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("driver", &self.driver)
            .field("dialect", &self.dialect)
            .field("schema_mode", &self.schema_mode)
            .field("show_sql", &self.show_sql)
            .field("pool_max_size", &self.pool_max_size)
            .field("pool_min_idle", &self.pool_min_idle)
            .finish()
    }
}

impl StoreConfig {
    /// Loads configuration from a properties file, then applies the
    /// `CRAFTMESSAGE_DATABASE_*` environment overrides.
    ///
    /// Never fails; see the module documentation for the fallback rules.
    #[must_use]
    pub fn load(path: impl AsRef<Path>) -> Self {
        Self::load_with(path.as_ref(), |name| env::var(name).ok())
    }

    fn load_with(path: &Path, lookup_env: impl Fn(&str) -> Option<String>) -> Self {
        let mut properties = read_properties(path);
        for (var, key) in ENV_OVERRIDES {
            if let Some(value) = lookup_env(var) {
                debug!(var, key, "applying environment override");
                properties.insert(key.to_owned(), value);
            }
        }
        Self::from_properties(&properties)
    }

    /// Builds configuration from already-parsed key/value pairs.
    #[must_use]
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let properties: HashMap<String, String> = pairs
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        Self::from_properties(&properties)
    }

    /// Builds configuration from a property map, substituting defaults.
    #[must_use]
    pub fn from_properties<S: std::hash::BuildHasher>(
        properties: &HashMap<String, String, S>,
    ) -> Self {
        let text = |key: &str, default: &str| {
            properties
                .get(key)
                .map_or_else(|| default.to_owned(), |value| value.trim().to_owned())
        };

        let pool_max_size = positive_or_default(
            parse_or_default(properties, keys::POOL_MAX_SIZE, DEFAULT_POOL_MAX_SIZE),
            keys::POOL_MAX_SIZE,
            DEFAULT_POOL_MAX_SIZE,
        );
        let requested_min_idle =
            parse_or_default(properties, keys::POOL_MIN_IDLE, DEFAULT_POOL_MIN_IDLE);

        Self {
            url: text(keys::URL, DEFAULT_URL),
            username: text(keys::USERNAME, DEFAULT_USERNAME),
            password: properties
                .get(keys::PASSWORD)
                .map_or_else(|| DEFAULT_PASSWORD.to_owned(), Clone::clone),
            driver: text(keys::DRIVER, DEFAULT_DRIVER),
            dialect: text(keys::DIALECT, DEFAULT_DIALECT),
            schema_mode: parse_or_default(properties, keys::SCHEMA_MODE, SchemaMode::default()),
            show_sql: parse_bool_or_default(properties, keys::SHOW_SQL, DEFAULT_SHOW_SQL),
            pool_max_size,
            pool_min_idle: requested_min_idle.min(pool_max_size),
        }
    }

    /// Returns a libpq connection URL with the credentials folded in.
    ///
    /// A leading `jdbc:` is stripped. Credentials already present in the URI
    /// take precedence over the configured username and password.
    #[must_use]
    pub fn connection_url(&self) -> String {
        let trimmed = self.url.trim();
        let uri = trimmed.strip_prefix("jdbc:").unwrap_or(trimmed);
        let Some((scheme, rest)) = uri.split_once("://") else {
            return uri.to_owned();
        };

        let authority = rest.split(['/', '?']).next().unwrap_or_default();
        if self.username.is_empty() || authority.contains('@') {
            return uri.to_owned();
        }

        let mut userinfo = utf8_percent_encode(&self.username, USERINFO).to_string();
        if !self.password.is_empty() {
            userinfo.push(':');
            userinfo.extend(utf8_percent_encode(&self.password, USERINFO));
        }
        format!("{scheme}://{userinfo}@{rest}")
    }

    /// Returns `true` when both the driver and dialect identify `PostgreSQL`.
    #[must_use]
    pub fn targets_postgres(&self) -> bool {
        names_postgres(&self.driver) && names_postgres(&self.dialect)
    }
}

fn names_postgres(identifier: &str) -> bool {
    identifier.to_ascii_lowercase().contains("postgres")
}

/// Reads a Java properties file. The file is decoded as ISO-8859-1 like
/// `java.util.Properties`; other characters need `\uXXXX` escapes.
fn read_properties(path: &Path) -> HashMap<String, String> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) => {
            warn!(
                path = %path.display(),
                error = %err,
                "database properties unavailable, using defaults"
            );
            return HashMap::new();
        }
    };

    let properties = match java_properties::read(BufReader::new(file)) {
        Ok(properties) => properties,
        Err(err) => {
            warn!(
                path = %path.display(),
                error = %err,
                "database properties unreadable, using defaults"
            );
            return HashMap::new();
        }
    };
    debug!(
        path = %path.display(),
        keys = properties.len(),
        "database properties loaded"
    );
    properties
}

fn parse_or_default<T, S>(properties: &HashMap<String, String, S>, key: &str, default: T) -> T
where
    T: FromStr + fmt::Display,
    S: std::hash::BuildHasher,
{
    let Some(raw) = properties.get(key) else {
        return default;
    };
    raw.trim().parse().unwrap_or_else(|_| {
        warn!(key, value = %raw, %default, "invalid property value, using default");
        default
    })
}

fn parse_bool_or_default<S: std::hash::BuildHasher>(
    properties: &HashMap<String, String, S>,
    key: &str,
    default: bool,
) -> bool {
    let Some(raw) = properties.get(key) else {
        return default;
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" => true,
        "false" => false,
        _ => {
            warn!(key, value = %raw, default, "invalid boolean property, using default");
            default
        }
    }
}

fn positive_or_default(value: u32, key: &str, default: u32) -> u32 {
    if value == 0 {
        warn!(key, default, "pool size must be positive, using default");
        default
    } else {
        value
    }
}
