use std::env;
use std::fmt;
use std::str::FromStr;

use tracing::warn;

/// Which relational store the clinic core talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseBackend {
    Sqlite,
    Supabase,
}

impl FromStr for DatabaseBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(DatabaseBackend::Sqlite),
            "supabase" | "postgrest" => Ok(DatabaseBackend::Supabase),
            other => Err(format!("unknown database backend: {}", other)),
        }
    }
}

impl fmt::Display for DatabaseBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseBackend::Sqlite => write!(f, "sqlite"),
            DatabaseBackend::Supabase => write!(f, "supabase"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_backend: DatabaseBackend,
    pub database_path: String,
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub doctor_directory_path: Option<String>,
    pub bind_address: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_backend: DatabaseBackend::Sqlite,
            database_path: "clinic.db".to_string(),
            supabase_url: String::new(),
            supabase_anon_key: String::new(),
            doctor_directory_path: None,
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let config = Self {
            database_backend: env::var("DATABASE_BACKEND")
                .ok()
                .and_then(|raw| match raw.parse() {
                    Ok(backend) => Some(backend),
                    Err(e) => {
                        warn!("{}, falling back to sqlite", e);
                        None
                    }
                })
                .unwrap_or_else(|| {
                    warn!("DATABASE_BACKEND not set, using sqlite");
                    defaults.database_backend
                }),
            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| {
                    warn!("DATABASE_PATH not set, using {}", defaults.database_path);
                    defaults.database_path.clone()
                }),
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_anon_key: env::var("SUPABASE_ANON_PUBLIC_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_ANON_PUBLIC_KEY not set, using empty value");
                    String::new()
                }),
            doctor_directory_path: env::var("DOCTOR_DIRECTORY_PATH").ok(),
            bind_address: env::var("BIND_ADDRESS")
                .unwrap_or_else(|_| {
                    warn!("BIND_ADDRESS not set, using {}", defaults.bind_address);
                    defaults.bind_address.clone()
                }),
        };

        if config.doctor_directory_path.is_none() {
            warn!("DOCTOR_DIRECTORY_PATH not set, using the built-in roster");
        }

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        match self.database_backend {
            DatabaseBackend::Sqlite => !self.database_path.is_empty(),
            DatabaseBackend::Supabase => {
                !self.supabase_url.is_empty() && !self.supabase_anon_key.is_empty()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_parses_known_names() {
        assert_eq!("sqlite".parse::<DatabaseBackend>(), Ok(DatabaseBackend::Sqlite));
        assert_eq!(" Supabase ".parse::<DatabaseBackend>(), Ok(DatabaseBackend::Supabase));
        assert!("mysql".parse::<DatabaseBackend>().is_err());
    }

    #[test]
    fn supabase_backend_needs_url_and_key() {
        let mut config = AppConfig {
            database_backend: DatabaseBackend::Supabase,
            ..AppConfig::default()
        };
        assert!(!config.is_configured());

        config.supabase_url = "http://localhost:54321".to_string();
        config.supabase_anon_key = "anon".to_string();
        assert!(config.is_configured());
    }

    #[test]
    fn default_config_uses_sqlite() {
        let config = AppConfig::default();
        assert_eq!(config.database_backend, DatabaseBackend::Sqlite);
        assert!(config.is_configured());
    }
}
