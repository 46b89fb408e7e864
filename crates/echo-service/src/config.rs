//! Service configuration.

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::time::Duration;

pub use service_kit::{ConfigBuilder, ConfigError, Environment};

/// Environment variable naming an optional TOML/YAML/JSON config file.
pub const CONFIG_FILE_ENV: &str = "CONFIG_FILE";

/// Listen port, read from `PORT` (or `port` in a config file).
///
/// Any integer is accepted here, including ones no socket can use; those
/// fail when the listener binds rather than at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Port(i64);

impl Port {
    pub const DEFAULT: Port = Port(8080);

    pub const fn new(port: i64) -> Self {
        Self(port)
    }

    /// Resolve a textual port override.
    ///
    /// Absent means [`Port::DEFAULT`]. Text that is not a base-10 integer
    /// (after trimming) is logged and also resolves to the default.
    pub fn resolve(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::DEFAULT;
        };

        match raw.trim().parse::<i64>() {
            Ok(port) => Self(port),
            Err(err) => {
                tracing::warn!(
                    value = %raw,
                    error = %err,
                    default = %Self::DEFAULT,
                    "ignoring malformed port override"
                );
                Self::DEFAULT
            }
        }
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl Default for Port {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for Port {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Environment values arrive pre-parsed when they look numeric, and
        // as strings otherwise; files may use either.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawPort {
            Number(i64),
            Text(String),
            Other(IgnoredAny),
        }

        Ok(match RawPort::deserialize(deserializer)? {
            RawPort::Number(port) => Port(port),
            RawPort::Text(text) => Port::resolve(Some(text.as_str())),
            RawPort::Other(_) => {
                tracing::warn!(default = %Port::DEFAULT, "ignoring non-numeric port setting");
                Port::DEFAULT
            }
        })
    }
}

/// Accepts a list, or one comma-separated string as environment variables
/// deliver it (`CORS_ORIGINS=https://a.example,https://b.example`).
fn origin_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawOrigins {
        List(Vec<String>),
        Csv(String),
    }

    Ok(match RawOrigins::deserialize(deserializer)? {
        RawOrigins::List(list) => list,
        RawOrigins::Csv(csv) => csv
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect(),
    })
}

/// Everything the service reads at startup. Immutable once loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub environment: Environment,
    pub host: String,
    pub port: Port,
    /// Reported as `message` by `GET /`.
    pub service_name: String,
    pub request_timeout_secs: u64,
    /// Allowed CORS origins; empty disables CORS, `"*"` allows any.
    /// Only read with the `cors` feature.
    #[serde(deserialize_with = "origin_list")]
    pub cors_origins: Vec<String>,
    /// Largest accepted echo body. Unset means no limit.
    pub max_body_bytes: Option<usize>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            host: "0.0.0.0".to_string(),
            port: Port::DEFAULT,
            service_name: "C++ HTTP Service".to_string(),
            request_timeout_secs: 30,
            cors_origins: Vec::new(),
            max_body_bytes: None,
        }
    }
}

impl ServiceConfig {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Load from `.env`, the file named by `CONFIG_FILE` (if any) and the
    /// process environment, initializing logging on the way.
    pub fn load() -> Result<Self, ConfigError> {
        Self::builder()
            .with_dotenv()
            .with_config_file_from_env(CONFIG_FILE_ENV)
            .with_logging_from_env()
            .build()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// `host:port`, the form handed to the listener.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl AsRef<ServiceConfig> for ServiceConfig {
    fn as_ref(&self) -> &ServiceConfig {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Serializes tests that build from (or write to) the process environment.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn with_env<T>(vars: &[(&str, Option<&str>)], f: impl FnOnce() -> T) -> T {
        let saved: Vec<_> = vars
            .iter()
            .map(|(key, _)| (*key, std::env::var(key).ok()))
            .collect();
        for (key, value) in vars {
            match value {
                Some(value) => std::env::set_var(key, value),
                None => std::env::remove_var(key),
            }
        }

        let out = f();

        for (key, value) in saved {
            match value {
                Some(value) => std::env::set_var(key, value),
                None => std::env::remove_var(key),
            }
        }
        out
    }

    fn build_from_env() -> ServiceConfig {
        ServiceConfig::builder().build().unwrap()
    }

    #[test]
    fn resolve_defaults_when_absent() {
        assert_eq!(Port::resolve(None), Port::new(8080));
    }

    #[test]
    fn resolve_accepts_integers() {
        assert_eq!(Port::resolve(Some("9999")), Port::new(9999));
        assert_eq!(Port::resolve(Some(" 3000\n")), Port::new(3000));
    }

    #[test]
    fn resolve_falls_back_on_garbage() {
        assert_eq!(Port::resolve(Some("notanumber")), Port::DEFAULT);
        assert_eq!(Port::resolve(Some("")), Port::DEFAULT);
        assert_eq!(Port::resolve(Some("80abc")), Port::DEFAULT);
        assert_eq!(Port::resolve(Some("80.5")), Port::DEFAULT);
    }

    #[test]
    fn resolve_leaves_range_checks_to_bind() {
        assert_eq!(Port::resolve(Some("70000")).get(), 70000);
        assert_eq!(Port::resolve(Some("-1")).get(), -1);
    }

    #[test]
    fn port_deserializes_numbers_and_strings() {
        #[derive(Deserialize)]
        struct Wrapper {
            port: Port,
        }

        let parse = |json: &str| serde_json::from_str::<Wrapper>(json).unwrap().port;

        assert_eq!(parse(r#"{"port": 9999}"#), Port::new(9999));
        assert_eq!(parse(r#"{"port": "4000"}"#), Port::new(4000));
        assert_eq!(parse(r#"{"port": "notanumber"}"#), Port::DEFAULT);
        assert_eq!(parse(r#"{"port": true}"#), Port::DEFAULT);
        assert_eq!(parse(r#"{"port": null}"#), Port::DEFAULT);
    }

    #[test]
    fn defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, Port::DEFAULT);
        assert_eq!(config.service_name, "C++ HTTP Service");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert!(config.cors_origins.is_empty());
        assert!(config.max_body_bytes.is_none());
        assert!(config.environment.is_development());
    }

    #[test]
    fn addr_joins_host_and_port() {
        let config = ServiceConfig {
            host: "127.0.0.1".to_string(),
            port: Port::new(9999),
            ..Default::default()
        };
        assert_eq!(config.addr(), "127.0.0.1:9999");
    }

    #[test]
    fn loads_from_toml_file() {
        let _env = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("echo.toml");
        std::fs::write(
            &path,
            r#"
            host = "127.0.0.1"
            service_name = "Echo"
            request_timeout_secs = 5
            environment = "production"
            "#,
        )
        .unwrap();

        let config: ServiceConfig = ServiceConfig::builder()
            .with_config_file(&path)
            .build()
            .unwrap();

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.service_name, "Echo");
        assert_eq!(config.request_timeout_secs, 5);
        assert!(config.environment.is_production());
    }

    #[test]
    fn missing_config_file_is_reported() {
        let _env = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let result: Result<ServiceConfig, _> = ServiceConfig::builder()
            .with_config_file("/nonexistent/echo.yaml")
            .build();
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn environment_drives_port_origins_and_body_limit() {
        let _env = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());

        let port = |value: Option<&str>| with_env(&[("PORT", value)], || build_from_env().port);
        assert_eq!(port(None), Port::new(8080));
        assert_eq!(port(Some("9999")), Port::new(9999));
        assert_eq!(port(Some("notanumber")), Port::new(8080));
        assert_eq!(port(Some("1e3")), Port::new(8080));

        let origins = |value: &str| {
            with_env(&[("CORS_ORIGINS", Some(value))], || build_from_env().cors_origins)
        };
        assert_eq!(origins("*"), vec!["*"]);
        assert_eq!(
            origins("https://a.example, https://b.example"),
            vec!["https://a.example", "https://b.example"]
        );

        let limit = with_env(&[("MAX_BODY_BYTES", Some("1048576"))], || {
            build_from_env().max_body_bytes
        });
        assert_eq!(limit, Some(1_048_576));
    }

    #[test]
    fn origins_from_file_list() {
        let config: ServiceConfig =
            serde_json::from_str(r#"{"cors_origins": ["https://a.example"]}"#).unwrap();
        assert_eq!(config.cors_origins, vec!["https://a.example"]);
    }
}
