use std::time::Duration;
use thiserror::Error;

pub const MEMORY_SCHEME: &str = "memdb://";
pub const MONGODB_SCHEME: &str = "mongodb://";
pub const DEFAULT_PORT: u16 = 27017;
pub const DEFAULT_DATABASE: &str = "fiber-hrms";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("URL must start with 'mongodb://' or 'memdb://'")]
    InvalidScheme,

    #[error("invalid credentials format")]
    InvalidCredentials,

    #[error("URL must name a database: mongodb://host[:port]/database or memdb:///database")]
    MissingDatabase,

    #[error("invalid port '{0}'")]
    InvalidPort(String),

    #[error("memdb URLs take no host, port or credentials: memdb:///database")]
    MemoryAuthority,

    #[error("{0}")]
    Invalid(String),
}

/// Where documents live.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreBackend {
    /// MongoDB server reached through the official driver.
    MongoDb {
        host: String,
        port: u16,
        /// Kept as written in the URL, so still percent-encoded.
        username: Option<String>,
        password: Option<String>,
    },
    /// Process-local store; nothing survives a restart.
    Memory,
}

/// Document store connection configuration
///
/// Parsed from `mongodb://[username:password@]host[:port]/database` or
/// `memdb:///database`.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub database: String,
    /// Upper bound for the initial connect + ping
    pub connect_timeout: Duration,
}

impl StoreConfig {
    pub fn mongodb(host: &str, port: u16, database: &str) -> Self {
        Self {
            backend: StoreBackend::MongoDb {
                host: host.to_string(),
                port,
                username: None,
                password: None,
            },
            database: database.to_string(),
            connect_timeout: Duration::from_secs(30),
        }
    }

    pub fn memory(database: &str) -> Self {
        Self {
            backend: StoreBackend::Memory,
            database: database.to_string(),
            connect_timeout: Duration::from_secs(30),
        }
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn is_memory(&self) -> bool {
        matches!(self.backend, StoreBackend::Memory)
    }

    /// Parse from connection string
    ///
    /// # Examples
    ///
    /// ```
    /// use hrms::connection::StoreConfig;
    ///
    /// let config = StoreConfig::from_url("mongodb://localhost:27017/fiber-hrms").unwrap();
    /// assert_eq!(config.database, "fiber-hrms");
    /// assert!(!config.is_memory());
    /// ```
    pub fn from_url(url: &str) -> Result<Self, ConfigError> {
        let config = if let Some(rest) = url.strip_prefix(MEMORY_SCHEME) {
            let (authority, database) = split_database(rest)?;
            if !authority.is_empty() {
                return Err(ConfigError::MemoryAuthority);
            }
            Self::memory(database)
        } else if let Some(rest) = url.strip_prefix(MONGODB_SCHEME) {
            let (authority, database) = split_database(rest)?;
            parse_mongodb(authority, database)?
        } else {
            return Err(ConfigError::InvalidScheme);
        };

        config.validate()?;
        Ok(config)
    }

    /// Connection string with the password masked, for logs.
    pub fn to_url(&self) -> String {
        self.render(true)
    }

    /// Connection string handed to the driver.
    pub(crate) fn connection_string(&self) -> String {
        self.render(false)
    }

    fn render(&self, mask_password: bool) -> String {
        match &self.backend {
            StoreBackend::Memory => format!("{}/{}", MEMORY_SCHEME, self.database),
            StoreBackend::MongoDb {
                host,
                port,
                username,
                password,
            } => {
                let credentials = match (username, password) {
                    (Some(user), Some(_)) if mask_password => format!("{user}:***@"),
                    (Some(user), Some(pass)) => format!("{user}:{pass}@"),
                    _ => String::new(),
                };
                format!(
                    "{}{}{}:{}/{}",
                    MONGODB_SCHEME, credentials, host, port, self.database
                )
            }
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let StoreBackend::MongoDb { host, .. } = &self.backend
            && host.is_empty()
        {
            return Err(ConfigError::Invalid("host cannot be empty".to_string()));
        }

        if self.database.is_empty() {
            return Err(ConfigError::MissingDatabase);
        }

        if self.database.contains(['/', '.', ' ', '?']) {
            return Err(ConfigError::Invalid(format!(
                "invalid database name '{}'",
                self.database
            )));
        }

        if self.connect_timeout.is_zero() {
            return Err(ConfigError::Invalid(
                "connect_timeout must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::mongodb("localhost", DEFAULT_PORT, DEFAULT_DATABASE)
    }
}

fn split_database(rest: &str) -> Result<(&str, &str), ConfigError> {
    let (authority, database) = rest.split_once('/').ok_or(ConfigError::MissingDatabase)?;
    if database.is_empty() {
        return Err(ConfigError::MissingDatabase);
    }
    Ok((authority, database))
}

fn parse_mongodb(authority: &str, database: &str) -> Result<StoreConfig, ConfigError> {
    let (credentials, host_port) = match authority.rsplit_once('@') {
        Some((credentials, host_port)) => (Some(credentials), host_port),
        None => (None, authority),
    };

    let (host, port) = match host_port.split_once(':') {
        Some((host, port)) => (
            host,
            port.parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(port.to_string()))?,
        ),
        None => (host_port, DEFAULT_PORT),
    };

    let mut config = StoreConfig::mongodb(host, port, database);
    if let Some(credentials) = credentials {
        let (user, pass) = credentials
            .split_once(':')
            .ok_or(ConfigError::InvalidCredentials)?;
        if let StoreBackend::MongoDb {
            username, password, ..
        } = &mut config.backend
        {
            *username = Some(user.to_string());
            *password = Some(pass.to_string());
        }
    }
    Ok(config)
}
