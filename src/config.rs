use crate::error::{CottonOpsError, Result};
use crate::models::DEFAULT_RISK_THRESHOLD;
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgConnectOptions;
use std::path::PathBuf;
use std::str::FromStr;

const ENV_PREFIX: &str = "COTTONOPS";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

/// Connection to the farmer grid database. Either `url` or the individual
/// fields; `url` wins when both are present.
///
/// A `${VAR}` placeholder whose variable was not set counts as unset, so the
/// `DB_*` fallbacks still apply.
#[derive(Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default, deserialize_with = "deserialize_setting")]
    pub url: Option<String>,
    #[serde(default = "default_host", deserialize_with = "deserialize_host")]
    pub host: String,
    #[serde(default = "default_port", deserialize_with = "deserialize_port")]
    pub port: u16,
    #[serde(default, deserialize_with = "deserialize_setting")]
    pub database: Option<String>,
    #[serde(default, deserialize_with = "deserialize_setting")]
    pub user: Option<String>,
    #[serde(default, deserialize_with = "deserialize_setting")]
    pub password: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_host() -> String {
    "localhost".into()
}

fn default_port() -> u16 {
    5432
}

fn default_max_connections() -> u32 {
    2
}

fn is_unresolved(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || (value.starts_with("${") && value.ends_with('}'))
}

fn deserialize_setting<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.filter(|v| !is_unresolved(v)))
}

fn deserialize_host<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(deserialize_setting(deserializer)?.unwrap_or_else(default_host))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PortValue {
    Number(u64),
    Text(String),
}

fn deserialize_port<'de, D>(deserializer: D) -> std::result::Result<u16, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    let value = match PortValue::deserialize(deserializer)? {
        PortValue::Number(n) => n.to_string(),
        PortValue::Text(s) if is_unresolved(&s) => return Ok(default_port()),
        PortValue::Text(s) => s,
    };
    value.trim().parse::<u16>().map_err(|_| {
        D::Error::custom(format!(
            "invalid port '{}' - ensure DB_PORT environment variable is set",
            value
        ))
    })
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: default_host(),
            port: default_port(),
            database: None,
            user: None,
            password: None,
            max_connections: default_max_connections(),
        }
    }
}

impl DatabaseConfig {
    pub fn is_configured(&self) -> bool {
        self.url.is_some() || (self.user.is_some() && self.database.is_some())
    }

    /// Fill unset fields from `DB_URL`, `DB_USER`, `DB_PASS`, `DB_HOST`,
    /// `DB_PORT` and `DB_NAME`.
    pub fn with_env_fallback(mut self) -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        if self.url.is_none() {
            self.url = var("DB_URL");
        }
        if self.user.is_none() {
            self.user = var("DB_USER");
        }
        if self.password.is_none() {
            self.password = var("DB_PASS");
        }
        if self.database.is_none() {
            self.database = var("DB_NAME");
        }
        if let Some(host) = var("DB_HOST") {
            if self.host == default_host() {
                self.host = host;
            }
        }
        if let Some(port) = var("DB_PORT").and_then(|p| p.parse().ok()) {
            if self.port == default_port() {
                self.port = port;
            }
        }
        self
    }

    /// Connection options for sqlx. Credentials are passed as-is, so
    /// passwords need no URL escaping.
    pub fn connect_options(&self) -> Result<PgConnectOptions> {
        if let Some(url) = &self.url {
            return PgConnectOptions::from_str(url).map_err(|e| {
                CottonOpsError::Config(format!("Invalid database.url {}: {}", mask_password(url), e))
            });
        }

        let (Some(user), Some(database)) = (&self.user, &self.database) else {
            return Err(CottonOpsError::Config(
                "database.url not set and database.user/database.database are missing".into(),
            ));
        };

        let options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(user)
            .database(database);
        Ok(match &self.password {
            Some(password) => options.password(password),
            None => options,
        })
    }

    /// Connection target with the password hidden, safe for logs.
    pub fn masked(&self) -> String {
        if let Some(url) = &self.url {
            return mask_password(url);
        }
        match (&self.user, &self.database) {
            (Some(user), Some(database)) => format!(
                "postgres://{}{}@{}:{}/{}",
                user,
                if self.password.is_some() { ":***" } else { "" },
                self.host,
                self.port,
                database
            ),
            _ => "<unconfigured>".into(),
        }
    }
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &self.url.as_deref().map(mask_password))
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

fn mask_password(url: &str) -> String {
    match regex_lite::Regex::new(r"://([^:/@]+):[^@]*@") {
        Ok(re) => re.replace(url, "://$1:***@").into_owned(),
        Err(_) => "masked_db_url".into(),
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_risk_threshold")]
    pub risk_threshold: f64,
    /// YAML rule catalog replacing the built-in insect, disease and PBW tables.
    pub catalog_path: Option<PathBuf>,
}

fn default_risk_threshold() -> f64 {
    DEFAULT_RISK_THRESHOLD
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            risk_threshold: DEFAULT_RISK_THRESHOLD,
            catalog_path: None,
        }
    }
}

impl Config {
    /// Load configuration from the YAML file (if any) and `COTTONOPS__*`
    /// environment overrides, e.g. `COTTONOPS__ANALYSIS__RISK_THRESHOLD=55`.
    pub fn load(config_override: Option<PathBuf>) -> Result<Self> {
        let config_path = match config_override {
            Some(p) => {
                if !p.exists() {
                    return Err(CottonOpsError::Config(format!(
                        "Config file not found at {:?}",
                        p
                    )));
                }
                Some(p)
            }
            None => Self::find_config_path(),
        };

        let mut builder = config::Config::builder();

        if let Some(path) = &config_path {
            tracing::debug!("Loading config from {}", path.display());
            let config_str = std::fs::read_to_string(path)
                .map_err(|e| CottonOpsError::Config(format!("Failed to read config: {}", e)))?;

            // Substitute environment variables
            let config_str = Self::substitute_env_vars(&config_str);
            builder = builder.add_source(config::File::from_str(
                &config_str,
                config::FileFormat::Yaml,
            ));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .map_err(|e| CottonOpsError::Config(format!("Failed to parse config: {}", e)))?;

        let mut config: Config = settings
            .try_deserialize()
            .map_err(|e| CottonOpsError::Config(format!("Invalid config: {}", e)))?;
        config.database = config.database.with_env_fallback();
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let threshold = self.analysis.risk_threshold;
        if !(0.0..=100.0).contains(&threshold) {
            return Err(CottonOpsError::Config(format!(
                "analysis.risk_threshold must be between 0 and 100, got {}",
                threshold
            )));
        }
        if self.database.max_connections == 0 {
            return Err(CottonOpsError::Config(
                "database.max_connections must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Search for config.yaml in standard locations.
    fn find_config_path() -> Option<PathBuf> {
        // Try current directory first
        let local_config = PathBuf::from("config/config.yaml");
        if local_config.exists() {
            return Some(local_config);
        }

        // Try XDG config directory
        dirs::config_dir()
            .map(|dir| dir.join("cottonops").join("config.yaml"))
            .filter(|p| p.exists())
    }

    fn substitute_env_vars(content: &str) -> String {
        let mut result = content.to_string();

        // Find all ${VAR_NAME} patterns and substitute
        let Ok(re) = regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}") else {
            return result;
        };

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let placeholder = &cap[0];
            if let Ok(value) = std::env::var(var_name) {
                result = result.replace(placeholder, &value);
            }
        }

        result
    }
}
