//! Runtime configuration.
//!
//! All settings are read once from the environment at startup (after `.env`
//! is loaded) into a `Config` value that is passed down explicitly.

mod dependencies;

pub use dependencies::Dependencies;

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use serverless_search_pipeline::{
    CleanupPolicy, LoaderConfig, OrchestratorConfig, QueryPlan, ReadinessConfig, WorkflowPlan,
};
use serverless_search_repository::{AzureOpenAiSettings, InferenceEndpoint};
use serverless_search_shared::{CreateProjectRequest, OptimizationProfile};

/// Configuration error type
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Environment variable '{0}' is required but not set")]
    MissingEnvVar(String),

    #[error("Failed to parse environment variable '{key}': {details}")]
    ParseError { key: String, details: String },
}

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    /// Read `LOG_FORMAT` (default: text).
    pub fn from_env() -> Result<Self, ConfigError> {
        env_parse("LOG_FORMAT", "text")
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

/// Settings for one bootstrap run.
#[derive(Clone)]
pub struct Config {
    pub project: CreateProjectRequest,
    pub control_api_url: String,
    pub control_api_key: String,
    pub inference_id: String,
    pub azure: AzureOpenAiSettings,
    pub index_name: String,
    pub data_path: PathBuf,
    pub query: QueryPlan,
    pub readiness: ReadinessConfig,
    pub batch_size: usize,
    pub cleanup: CleanupPolicy,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("project", &self.project)
            .field("control_api_url", &self.control_api_url)
            .field("control_api_key", &"<redacted>")
            .field("inference_id", &self.inference_id)
            .field("azure", &self.azure)
            .field("index_name", &self.index_name)
            .field("data_path", &self.data_path)
            .field("query", &self.query)
            .field("readiness", &self.readiness)
            .field("batch_size", &self.batch_size)
            .field("cleanup", &self.cleanup)
            .finish()
    }
}

impl Config {
    /// Load the configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// Required: `PROJECT_NAME`, `ELASTIC_API_URL`, `ELASTIC_API_KEY`,
    /// `INFERENCE_ID`, `INDEXNAME`, `FILEPATH`, `AZURE_OPENAI_API_KEY`,
    /// `AZURE_OPENAI_RESOURCE_NAME`, `AZURE_OPENAI_DEPLOYMENT_ID`,
    /// `AZURE_OPENAI_API_VERSION`.
    ///
    /// Optional:
    /// - `PROJECT_REGION` (default: aws-us-east-1)
    /// - `PROJECT_OPTIMIZED_FOR` (default: vector)
    /// - `QUERY_TEXT` (default: punk rock)
    /// - `QUERY_FIELD` (default: short_description.semantic)
    /// - `QUERY_SIZE` (default: 1)
    /// - `READINESS_POLL_INTERVAL_SECS` (default: 5)
    /// - `READINESS_TIMEOUT_SECS` (default: 1800, 0 waits indefinitely)
    /// - `READINESS_MAX_ATTEMPTS` (default: unlimited)
    /// - `BULK_BATCH_SIZE` (default: 500)
    /// - `CLEANUP_ON_FAILURE` (default: false)
    ///
    /// `LOG_FORMAT` is read separately by `LogFormat::from_env`, before
    /// logging starts.
    pub fn from_env() -> Result<Self, ConfigError> {
        let optimized_for: OptimizationProfile = env_parse("PROJECT_OPTIMIZED_FOR", "vector")?;
        let project = CreateProjectRequest::new(env_required("PROJECT_NAME")?)
            .with_region(env_or_default("PROJECT_REGION", "aws-us-east-1"))
            .with_profile(optimized_for);

        let azure = AzureOpenAiSettings {
            api_key: env_required("AZURE_OPENAI_API_KEY")?,
            resource_name: env_required("AZURE_OPENAI_RESOURCE_NAME")?,
            deployment_id: env_required("AZURE_OPENAI_DEPLOYMENT_ID")?,
            api_version: env_required("AZURE_OPENAI_API_VERSION")?,
        };

        let defaults = QueryPlan::default();
        let query = QueryPlan {
            field: env_or_default("QUERY_FIELD", &defaults.field),
            text: env_or_default("QUERY_TEXT", &defaults.text),
            size: env_parse("QUERY_SIZE", "1")?,
        };

        let interval_secs: u64 = env_parse("READINESS_POLL_INTERVAL_SECS", "5")?;
        if interval_secs == 0 {
            return Err(ConfigError::ParseError {
                key: "READINESS_POLL_INTERVAL_SECS".to_string(),
                details: "must be at least 1".to_string(),
            });
        }
        let timeout_secs: u64 = env_parse("READINESS_TIMEOUT_SECS", "1800")?;
        let readiness = ReadinessConfig {
            interval: Duration::from_secs(interval_secs),
            timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
            max_attempts: env_parse_optional("READINESS_MAX_ATTEMPTS")?,
            ..ReadinessConfig::default()
        };

        let batch_size: usize = env_parse("BULK_BATCH_SIZE", "500")?;
        if batch_size == 0 {
            return Err(ConfigError::ParseError {
                key: "BULK_BATCH_SIZE".to_string(),
                details: "must be at least 1".to_string(),
            });
        }

        let cleanup = if env_parse::<bool>("CLEANUP_ON_FAILURE", "false")? {
            CleanupPolicy::Always
        } else {
            CleanupPolicy::RetainOnFailure
        };

        Ok(Self {
            project,
            control_api_url: env_required("ELASTIC_API_URL")?,
            control_api_key: env_required("ELASTIC_API_KEY")?,
            inference_id: env_required("INFERENCE_ID")?,
            azure,
            index_name: env_required("INDEXNAME")?,
            data_path: PathBuf::from(env_required("FILEPATH")?),
            query,
            readiness,
            batch_size,
            cleanup,
        })
    }

    /// The steps this configuration asks the orchestrator to run.
    pub fn plan(&self) -> WorkflowPlan {
        let inference = InferenceEndpoint::azure_openai(self.inference_id.clone(), self.azure.clone());
        WorkflowPlan::news_articles(
            self.project.clone(),
            inference,
            self.index_name.clone(),
            self.data_path.clone(),
        )
        .with_query(self.query.clone())
    }

    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            readiness: self.readiness.clone(),
            loader: LoaderConfig {
                batch_size: self.batch_size,
                ..LoaderConfig::default()
            },
            cleanup: self.cleanup,
        }
    }
}

/// Helper to load an environment variable or return an error
pub fn env_required(key: &str) -> Result<String, ConfigError> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingEnvVar(key.to_string())),
    }
}

/// Helper to load an environment variable with a default value
pub fn env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    parse_value(key, &env_or_default(key, default))
}

fn env_parse_optional<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    env::var(key)
        .ok()
        .map(|value| parse_value(key, &value))
        .transpose()
}

fn parse_value<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::ParseError {
        key: key.to_string(),
        details: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUIRED: [(&str, Option<&str>); 10] = [
        ("PROJECT_NAME", Some("semantic-demo")),
        ("ELASTIC_API_URL", Some("https://api.example.io/api/v1/serverless/projects/elasticsearch")),
        ("ELASTIC_API_KEY", Some("control-key")),
        ("INFERENCE_ID", Some("my-e5")),
        ("INDEXNAME", Some("news")),
        ("FILEPATH", Some("data/news.jsonl")),
        ("AZURE_OPENAI_API_KEY", Some("azure-key")),
        ("AZURE_OPENAI_RESOURCE_NAME", Some("my-resource")),
        ("AZURE_OPENAI_DEPLOYMENT_ID", Some("text-embedding-3-small")),
        ("AZURE_OPENAI_API_VERSION", Some("2024-02-01")),
    ];

    const OPTIONAL: [&str; 11] = [
        "PROJECT_REGION",
        "PROJECT_OPTIMIZED_FOR",
        "QUERY_TEXT",
        "QUERY_FIELD",
        "QUERY_SIZE",
        "READINESS_POLL_INTERVAL_SECS",
        "READINESS_TIMEOUT_SECS",
        "READINESS_MAX_ATTEMPTS",
        "BULK_BATCH_SIZE",
        "CLEANUP_ON_FAILURE",
        "LOG_FORMAT",
    ];

    fn with_env<F: FnOnce()>(overrides: &[(&str, Option<&str>)], f: F) {
        let mut vars: Vec<(&str, Option<&str>)> = REQUIRED.to_vec();
        vars.extend(OPTIONAL.iter().map(|key| (*key, None)));
        for (key, value) in overrides {
            vars.retain(|(k, _)| k != key);
            vars.push((*key, *value));
        }
        temp_env::with_vars(vars, f);
    }

    #[test]
    fn test_defaults_apply() {
        with_env(&[], || {
            let config = Config::from_env().unwrap();

            assert_eq!(config.project.name, "semantic-demo");
            assert_eq!(config.project.region_id, "aws-us-east-1");
            assert_eq!(config.project.optimized_for, OptimizationProfile::Vector);
            assert_eq!(config.query, QueryPlan::default());
            assert_eq!(config.readiness.interval, Duration::from_secs(5));
            assert_eq!(config.readiness.timeout, Some(Duration::from_secs(1800)));
            assert_eq!(config.readiness.max_attempts, None);
            assert_eq!(config.batch_size, 500);
            assert_eq!(config.cleanup, CleanupPolicy::RetainOnFailure);
        });
    }

    #[test]
    fn test_missing_required_variable_is_named() {
        with_env(&[("INDEXNAME", None)], || {
            assert_eq!(
                Config::from_env().unwrap_err(),
                ConfigError::MissingEnvVar("INDEXNAME".to_string())
            );
        });
    }

    #[test]
    fn test_blank_required_variable_counts_as_missing() {
        with_env(&[("ELASTIC_API_KEY", Some("  "))], || {
            assert_eq!(
                Config::from_env().unwrap_err(),
                ConfigError::MissingEnvVar("ELASTIC_API_KEY".to_string())
            );
        });
    }

    #[test]
    fn test_bad_numeric_value_is_reported() {
        with_env(&[("QUERY_SIZE", Some("one"))], || {
            match Config::from_env().unwrap_err() {
                ConfigError::ParseError { key, .. } => assert_eq!(key, "QUERY_SIZE"),
                other => panic!("expected ParseError, got {:?}", other),
            }
        });
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        with_env(&[("BULK_BATCH_SIZE", Some("0"))], || {
            assert!(matches!(
                Config::from_env().unwrap_err(),
                ConfigError::ParseError { key, .. } if key == "BULK_BATCH_SIZE"
            ));
        });
    }

    #[test]
    fn test_overrides() {
        with_env(
            &[
                ("PROJECT_REGION", Some("gcp-us-central1")),
                ("PROJECT_OPTIMIZED_FOR", Some("general_purpose")),
                ("QUERY_TEXT", Some("jazz")),
                ("QUERY_SIZE", Some("3")),
                ("READINESS_TIMEOUT_SECS", Some("0")),
                ("READINESS_MAX_ATTEMPTS", Some("10")),
                ("CLEANUP_ON_FAILURE", Some("true")),
            ],
            || {
                let config = Config::from_env().unwrap();

                assert_eq!(config.project.region_id, "gcp-us-central1");
                assert_eq!(
                    config.project.optimized_for,
                    OptimizationProfile::GeneralPurpose
                );
                assert_eq!(config.query.text, "jazz");
                assert_eq!(config.query.size, 3);
                assert_eq!(config.readiness.timeout, None);
                assert_eq!(config.readiness.max_attempts, Some(10));
                assert_eq!(config.cleanup, CleanupPolicy::Always);
            },
        );
    }

    #[test]
    fn test_unknown_profile_rejected() {
        with_env(&[("PROJECT_OPTIMIZED_FOR", Some("cheap"))], || {
            assert!(matches!(
                Config::from_env().unwrap_err(),
                ConfigError::ParseError { key, .. } if key == "PROJECT_OPTIMIZED_FOR"
            ));
        });
    }

    #[test]
    fn test_plan_uses_configured_names() {
        with_env(&[], || {
            let config = Config::from_env().unwrap();
            let plan = config.plan();

            assert_eq!(plan.index_name, "news");
            assert_eq!(plan.inference.inference_id, "my-e5");
            assert_eq!(plan.inference.path(), "/_inference/text_embedding/my-e5");
            assert_eq!(plan.mapping.inference_ids(), vec!["my-e5"]);
            assert_eq!(plan.data_path, PathBuf::from("data/news.jsonl"));

            let orchestrator = config.orchestrator_config();
            assert_eq!(orchestrator.loader.batch_size, 500);
            assert!(orchestrator.loader.refresh_on_completion);
        });
    }

    #[test]
    fn test_debug_redacts_keys() {
        with_env(&[], || {
            let rendered = format!("{:?}", Config::from_env().unwrap());
            assert!(!rendered.contains("control-key"));
            assert!(!rendered.contains("azure-key"));
        });
    }

    #[test]
    fn test_zero_poll_interval_rejected() {
        with_env(&[("READINESS_POLL_INTERVAL_SECS", Some("0"))], || {
            assert!(matches!(
                Config::from_env().unwrap_err(),
                ConfigError::ParseError { key, .. } if key == "READINESS_POLL_INTERVAL_SECS"
            ));
        });
    }

    #[test]
    fn test_log_format_parsing() {
        assert_eq!("JSON".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_log_format_from_env() {
        temp_env::with_var_unset("LOG_FORMAT", || {
            assert_eq!(LogFormat::from_env(), Ok(LogFormat::Text));
        });
        temp_env::with_var("LOG_FORMAT", Some("json"), || {
            assert_eq!(LogFormat::from_env(), Ok(LogFormat::Json));
        });
        temp_env::with_var("LOG_FORMAT", Some("xml"), || {
            assert!(matches!(
                LogFormat::from_env(),
                Err(ConfigError::ParseError { key, .. }) if key == "LOG_FORMAT"
            ));
        });
    }

    #[test]
    fn test_config_ignores_log_format() {
        with_env(&[("LOG_FORMAT", Some("xml"))], || {
            assert!(Config::from_env().is_ok());
        });
    }
}
