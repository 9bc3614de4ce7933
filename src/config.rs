use std::env;
use std::fmt;

pub const REGULARS_ENV: &str = "KHUTBA_REGULARS";
pub const ADMIN_PIN_ENV: &str = "KHUTBA_ADMIN_PIN";

/// Process-wide roster configuration: the three recurring speakers and the
/// shared admin PIN. Built once at startup and passed explicitly to the
/// classification and authorization code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterConfig {
    regulars: [String; 3],
    admin_pin: String,
}

#[derive(Debug, Clone)]
pub enum ConfigError {
    MissingVar(&'static str),
    RegularCount(usize),
    EmptyRegular,
    DuplicateRegular(String),
    EmptyPin,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingVar(name) => write!(f, "missing environment variable {name}"),
            ConfigError::RegularCount(count) => {
                write!(f, "expected exactly 3 regular khatibs, got {count}")
            }
            ConfigError::EmptyRegular => write!(f, "regular khatib names must not be empty"),
            ConfigError::DuplicateRegular(name) => {
                write!(f, "regular khatib '{name}' listed more than once")
            }
            ConfigError::EmptyPin => write!(f, "admin PIN must not be empty"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl RosterConfig {
    pub fn new(regulars: [String; 3], admin_pin: impl Into<String>) -> Result<Self, ConfigError> {
        for name in &regulars {
            if name.trim().is_empty() {
                return Err(ConfigError::EmptyRegular);
            }
        }
        for (idx, name) in regulars.iter().enumerate() {
            if regulars[..idx].contains(name) {
                return Err(ConfigError::DuplicateRegular(name.clone()));
            }
        }
        let admin_pin = admin_pin.into();
        if admin_pin.is_empty() {
            return Err(ConfigError::EmptyPin);
        }
        Ok(Self {
            regulars,
            admin_pin,
        })
    }

    /// Read `KHUTBA_REGULARS` (comma-separated, exactly three names) and
    /// `KHUTBA_ADMIN_PIN`. There is deliberately no built-in PIN fallback.
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw = env::var(REGULARS_ENV).map_err(|_| ConfigError::MissingVar(REGULARS_ENV))?;
        let names: Vec<String> = raw
            .split(',')
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();
        let count = names.len();
        let regulars: [String; 3] = names
            .try_into()
            .map_err(|_| ConfigError::RegularCount(count))?;
        let pin = env::var(ADMIN_PIN_ENV).map_err(|_| ConfigError::MissingVar(ADMIN_PIN_ENV))?;
        Self::new(regulars, pin)
    }

    pub fn regulars(&self) -> &[String; 3] {
        &self.regulars
    }

    pub fn regular_index(&self, name: &str) -> Option<usize> {
        self.regulars.iter().position(|regular| regular == name)
    }

    pub fn is_regular(&self, name: &str) -> bool {
        self.regular_index(name).is_some()
    }

    /// Exact string equality; a minimal gate, not a security control.
    pub fn pin_matches(&self, submitted: &str) -> bool {
        self.admin_pin == submitted
    }
}
