use serde::{Deserialize, Deserializer};

/// Each question row binds 16 parameters and Postgres allows 65535 per statement
pub const MAX_IMPORT_BATCH_SIZE: usize = 1000;

/// Configuration for the admin API server
#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    /// PostgreSQL database URL
    pub database_url: String,
    /// Redis URL, used for bulk import job state
    pub redis_url: String,
    /// Service secret every admin request must present in the Authorization header
    pub auth_secret: String,
    /// Port to run the server on
    pub port: u16,
    /// Rows per insert batch for the bulk question importer
    #[serde(
        default = "default_import_batch_size",
        deserialize_with = "bounded_batch_size"
    )]
    pub import_batch_size: usize,
    /// Run insert-then-link imports in a single transaction
    #[serde(default = "default_import_atomic")]
    pub import_atomic: bool,
    /// Directory for the rolling admin action log
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
    /// Maximum number of pooled Postgres connections
    #[serde(default = "default_pool_size")]
    pub db_pool_size: usize,
}

fn default_import_batch_size() -> usize {
    100
}

fn bounded_batch_size<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    let size = usize::deserialize(deserializer)?;
    Ok(size.clamp(1, MAX_IMPORT_BATCH_SIZE))
}

fn default_import_atomic() -> bool {
    true
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_pool_size() -> usize {
    20
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied_when_optional_vars_missing() {
        let vars = vec![
            ("DATABASE_URL".to_string(), "postgres://localhost/ssc".to_string()),
            ("REDIS_URL".to_string(), "redis://localhost".to_string()),
            ("AUTH_SECRET".to_string(), "secret".to_string()),
            ("PORT".to_string(), "3000".to_string()),
        ];
        let config: Config = envy::from_iter(vars).unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.import_batch_size, 100);
        assert!(config.import_atomic);
        assert_eq!(config.log_dir, "logs");
        assert_eq!(config.db_pool_size, 20);
    }

    #[test]
    fn test_import_overrides() {
        let vars = vec![
            ("DATABASE_URL".to_string(), "postgres://localhost/ssc".to_string()),
            ("REDIS_URL".to_string(), "redis://localhost".to_string()),
            ("AUTH_SECRET".to_string(), "secret".to_string()),
            ("PORT".to_string(), "3000".to_string()),
            ("IMPORT_BATCH_SIZE".to_string(), "25".to_string()),
            ("IMPORT_ATOMIC".to_string(), "false".to_string()),
        ];
        let config: Config = envy::from_iter(vars).unwrap();

        assert_eq!(config.import_batch_size, 25);
        assert!(!config.import_atomic);
    }

    #[test]
    fn test_import_batch_size_is_bounded() {
        let base = vec![
            ("DATABASE_URL".to_string(), "postgres://localhost/ssc".to_string()),
            ("REDIS_URL".to_string(), "redis://localhost".to_string()),
            ("AUTH_SECRET".to_string(), "secret".to_string()),
            ("PORT".to_string(), "3000".to_string()),
        ];

        let mut vars = base.clone();
        vars.push(("IMPORT_BATCH_SIZE".to_string(), "5000".to_string()));
        let config: Config = envy::from_iter(vars).unwrap();
        assert_eq!(config.import_batch_size, MAX_IMPORT_BATCH_SIZE);

        let mut vars = base;
        vars.push(("IMPORT_BATCH_SIZE".to_string(), "0".to_string()));
        let config: Config = envy::from_iter(vars).unwrap();
        assert_eq!(config.import_batch_size, 1);
    }
}
