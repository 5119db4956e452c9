//! Process configuration, read once at startup and immutable afterwards.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use indexmap::IndexSet;

use crate::error::CoreError;

/// Listen port used when `PORT` is unset.
pub const DEFAULT_PORT: u16 = 5000;

/// Origins allowed when `ALLOWED_ORIGINS` is unset.
pub const DEFAULT_ALLOWED_ORIGINS: [&str; 2] =
    ["http://localhost:3000", "https://champion-hr-service.vercel.app"];

/// Environment mode reported when `NODE_ENV` is unset.
pub const DEFAULT_ENVIRONMENT: &str = "development";

/// The only environment mode in which the origin allow-list is consulted.
pub const PRODUCTION: &str = "production";

pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 465;
pub const DEFAULT_SMTP_TIMEOUT: Duration = Duration::from_secs(30);

/// What happens to a production request whose origin is not allow-listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OriginMode {
    /// Grant access anyway and log a warning.
    #[default]
    Permissive,
    /// Reject with `403 Forbidden`.
    Strict,
}

impl FromStr for OriginMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "permissive" => Ok(Self::Permissive),
            "strict" => Ok(Self::Strict),
            _ => Err(CoreError::InvalidConfig {
                key: "ORIGIN_POLICY".to_owned(),
                value: s.to_owned(),
                reason: "expected 'permissive' or 'strict'".to_owned(),
            }),
        }
    }
}

/// How strictly submitted inquiries are checked before relaying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    /// Relay whatever arrived, blanks included.
    #[default]
    Lenient,
    /// Reject inquiries that fail [`Inquiry::validate`](crate::Inquiry::validate).
    Strict,
}

impl FromStr for ValidationMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lenient" => Ok(Self::Lenient),
            "strict" => Ok(Self::Strict),
            _ => Err(CoreError::InvalidConfig {
                key: "INQUIRY_VALIDATION".to_owned(),
                value: s.to_owned(),
                reason: "expected 'lenient' or 'strict'".to_owned(),
            }),
        }
    }
}

/// Connection settings for the outbound mail relay.
#[derive(Clone)]
pub struct RelayConfig {
    /// Relay host, reached over implicit TLS.
    pub host: String,
    pub port: u16,
    /// Account name; also used as the sender address.
    pub username: String,
    pub password: String,
    /// Mailbox every inquiry is delivered to.
    pub recipient: String,
    /// Upper bound on one send or self-check.
    pub timeout: Duration,
}

impl fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("recipient", &self.recipient)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Complete service configuration.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct AppConfig {
    pub port: u16,
    /// Value of `NODE_ENV`, reported verbatim by `/api/test`.
    pub environment: String,
    /// Origins granted cross-origin access in production, in configured order.
    pub allowed_origins: IndexSet<String>,
    pub origin_mode: OriginMode,
    pub validation: ValidationMode,
    pub relay: RelayConfig,
}

impl AppConfig {
    /// Build the configuration from the process environment.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidConfig`] if a numeric or mode variable
    /// cannot be parsed.
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// Blank values are treated as unset.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidConfig`] if a numeric or mode variable
    /// cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match get("PORT") {
            Some(v) => parse_number::<u16>("PORT", &v)?,
            None => DEFAULT_PORT,
        };

        let allowed_origins = match get("ALLOWED_ORIGINS") {
            Some(v) => parse_origins(&v),
            None => DEFAULT_ALLOWED_ORIGINS.iter().map(|o| (*o).to_owned()).collect(),
        };

        let timeout = match get("SMTP_TIMEOUT_SECS") {
            Some(v) => match parse_number::<u64>("SMTP_TIMEOUT_SECS", &v)? {
                0 => {
                    return Err(CoreError::InvalidConfig {
                        key: "SMTP_TIMEOUT_SECS".to_owned(),
                        value: v,
                        reason: "must be at least 1".to_owned(),
                    })
                }
                secs => Duration::from_secs(secs),
            },
            None => DEFAULT_SMTP_TIMEOUT,
        };

        Ok(Self {
            port,
            environment: get("NODE_ENV").unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_owned()),
            allowed_origins,
            origin_mode: get("ORIGIN_POLICY").map_or(Ok(OriginMode::default()), |v| v.parse())?,
            validation: get("INQUIRY_VALIDATION")
                .map_or(Ok(ValidationMode::default()), |v| v.parse())?,
            relay: RelayConfig {
                host: get("SMTP_HOST").unwrap_or_else(|| DEFAULT_SMTP_HOST.to_owned()),
                port: match get("SMTP_PORT") {
                    Some(v) => parse_number::<u16>("SMTP_PORT", &v)?,
                    None => DEFAULT_SMTP_PORT,
                },
                username: get("EMAIL_USER").unwrap_or_default(),
                password: get("EMAIL_PASS").unwrap_or_default(),
                recipient: get("EMAIL_TO").unwrap_or_default(),
                timeout,
            },
        })
    }

    /// Whether the service runs in `production` mode.
    #[must_use]
    pub fn is_production(&self) -> bool {
        self.environment == PRODUCTION
    }

    /// Names of the relay variables left unset.
    ///
    /// These are not startup errors; the relay rejects the send instead.
    #[must_use]
    pub fn missing_relay_settings(&self) -> Vec<&'static str> {
        [
            ("EMAIL_USER", &self.relay.username),
            ("EMAIL_PASS", &self.relay.password),
            ("EMAIL_TO", &self.relay.recipient),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(key, _)| key)
        .collect()
    }
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T, CoreError>
where
    T::Err: fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| CoreError::InvalidConfig {
        key: key.to_owned(),
        value: value.to_owned(),
        reason: e.to_string(),
    })
}

fn parse_origins(value: &str) -> IndexSet<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_owned)
        .collect()
}
