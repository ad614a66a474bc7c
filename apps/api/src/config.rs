use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use crate::matching::TrainingOptions;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub corpus_path: PathBuf,
    pub skill_catalog_path: PathBuf,
    /// `None` selects the built-in alias table.
    pub alias_table_path: Option<PathBuf>,
    pub n_estimators: usize,
    pub random_seed: u64,
    pub test_fraction: f64,
    pub evaluate_model: bool,
    pub default_top_n: usize,
    pub gap_top_n: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let config = Config {
            corpus_path: require_env("CORPUS_PATH")?.into(),
            skill_catalog_path: require_env("SKILL_CATALOG_PATH")?.into(),
            alias_table_path: std::env::var("ALIAS_TABLE_PATH").ok().map(PathBuf::from),
            n_estimators: parse_env("N_ESTIMATORS", 150)?,
            random_seed: parse_env("RANDOM_SEED", 42)?,
            test_fraction: parse_env("TEST_FRACTION", 0.2)?,
            evaluate_model: parse_env("EVALUATE_MODEL", true)?,
            default_top_n: parse_env("DEFAULT_TOP_N", 5)?,
            gap_top_n: parse_env("GAP_TOP_N", 3)?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        };
        config.validate()?;
        Ok(config)
    }

    /// Range checks that parsing alone cannot express.
    fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.test_fraction) {
            bail!("TEST_FRACTION must be in [0, 1), got {}", self.test_fraction);
        }
        if self.n_estimators == 0 {
            bail!("N_ESTIMATORS must be at least 1");
        }
        if self.default_top_n == 0 {
            bail!("DEFAULT_TOP_N must be at least 1");
        }
        Ok(())
    }

    pub fn training_options(&self) -> TrainingOptions {
        TrainingOptions {
            n_estimators: self.n_estimators,
            seed: self.random_seed,
            test_fraction: self.test_fraction,
            evaluate: self.evaluate_model,
        }
    }
}

#[cfg(test)]
impl Config {
    /// Small forest and no holdout; paths are never read.
    pub(crate) fn for_tests() -> Self {
        Config {
            corpus_path: "corpus.csv".into(),
            skill_catalog_path: "skills.json".into(),
            alias_table_path: None,
            n_estimators: 10,
            random_seed: 3,
            test_fraction: 0.25,
            evaluate_model: false,
            default_top_n: 5,
            gap_top_n: 3,
            port: 8080,
            rust_log: "info".to_string(),
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_default_when_unset() {
        let value: usize = parse_env("SKILLFIT_TEST_UNSET_VARIABLE", 7).unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    fn test_parse_env_reports_bad_values() {
        std::env::set_var("SKILLFIT_TEST_BAD_NUMBER", "twelve");
        let err = parse_env::<usize>("SKILLFIT_TEST_BAD_NUMBER", 1).unwrap_err();
        assert!(err.to_string().contains("SKILLFIT_TEST_BAD_NUMBER"));
    }

    #[test]
    fn test_test_fraction_outside_unit_interval_rejected() {
        for fraction in [1.0, 1.5, -0.1] {
            let config = Config {
                test_fraction: fraction,
                ..Config::for_tests()
            };
            let err = config.validate().unwrap_err();
            assert!(err.to_string().contains("TEST_FRACTION"));
        }
    }

    #[test]
    fn test_zero_estimators_rejected() {
        let config = Config {
            n_estimators: 0,
            ..Config::for_tests()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("N_ESTIMATORS"));
    }

    #[test]
    fn test_zero_default_top_n_rejected() {
        let config = Config {
            default_top_n: 0,
            ..Config::for_tests()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_for_tests_config_is_valid() {
        assert!(Config::for_tests().validate().is_ok());
    }

    #[test]
    fn test_from_env_rejects_bad_test_fraction() {
        // The only test that sets these variables.
        std::env::set_var("CORPUS_PATH", "corpus.csv");
        std::env::set_var("SKILL_CATALOG_PATH", "skills.json");
        std::env::set_var("TEST_FRACTION", "1.5");
        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("TEST_FRACTION"));
    }

    #[test]
    fn test_training_options_mirror_config() {
        let config = Config::for_tests();
        let options = config.training_options();
        assert_eq!(options.n_estimators, 10);
        assert_eq!(options.seed, 3);
        assert!(!options.evaluate);
    }
}
