use std::env;
use std::path::PathBuf;
use thiserror::Error;

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
const DEFAULT_CORPUS_FILE: &str = "alumni_details.pdf";
const DEFAULT_TOP_K: usize = 3;

/// Name of the environment variable holding the hosted capability credential.
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
/// Name of the environment variable that redirects file logging.
pub const LOG_FILE_VARIABLE: &str = "PDFQA_LOG_FILE";

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration shared by both service variants.
#[derive(Debug, Clone)]
pub struct Config {
    /// Credential for the hosted QA capability, resolved at startup when that capability is selected.
    pub openai_api_key: Option<String>,
    /// Base URL of the OpenAI-compatible API.
    pub openai_base_url: String,
    /// Chat model used to answer questions.
    pub openai_model: String,
    /// Explicit capability choice; `None` lets each variant pick its default.
    pub capability: Option<CapabilityProvider>,
    /// Files ingested once at startup by the fixed-corpus variant.
    pub corpus_files: Vec<PathBuf>,
    /// Number of documents retrieved before answer extraction.
    pub top_k_retrieve: usize,
    /// Number of answer candidates requested from the reader.
    pub top_k_read: usize,
    /// Whether repeated ingestion appends to or replaces the corpus store.
    pub ingest_mode: IngestMode,
    /// Optional upper bound on a single request, in seconds.
    pub request_timeout_secs: Option<u64>,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
    /// Log file path; `None` keeps the default under `logs/`.
    pub log_file: Option<PathBuf>,
}

/// Supported QA capability backends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CapabilityProvider {
    /// Hosted OpenAI chat completions grounded on retrieved documents.
    OpenAI,
    /// Local extractive reader; needs no credential.
    Extractive,
}

/// Behavior of the corpus store when the same request ingests again.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IngestMode {
    /// Append every ingestion to the store; re-ingesting a folder duplicates its documents.
    #[default]
    Append,
    /// Clear the store before each ingestion.
    Replace,
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    ///
    /// The credential is read but not required here; [`Config::require_credential`] enforces it
    /// once the capability has been chosen.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any key/value source; `from_env` passes the process environment.
    ///
    /// Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let parsed = |key: &str| -> Result<Option<u64>, ConfigError> {
            get(key)
                .map(|value| {
                    value
                        .trim()
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue(key.to_string()))
                })
                .transpose()
        };

        Ok(Self {
            openai_api_key: get(OPENAI_API_KEY),
            openai_base_url: get("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            openai_model: get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            capability: get("QA_CAPABILITY")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|()| ConfigError::InvalidValue("QA_CAPABILITY".into()))
                })
                .transpose()?,
            corpus_files: get("QA_CORPUS_FILES")
                .map(|value| parse_file_list(&value))
                .unwrap_or_else(|| vec![PathBuf::from(DEFAULT_CORPUS_FILE)]),
            top_k_retrieve: parse_top_k("QA_TOP_K_RETRIEVE", get("QA_TOP_K_RETRIEVE"))?,
            top_k_read: parse_top_k("QA_TOP_K_READ", get("QA_TOP_K_READ"))?,
            ingest_mode: get("QA_INGEST_MODE")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|()| ConfigError::InvalidValue("QA_INGEST_MODE".into()))
                })
                .transpose()?
                .unwrap_or_default(),
            request_timeout_secs: parsed("QA_REQUEST_TIMEOUT_SECS")?,
            server_port: parsed("SERVER_PORT")?
                .map(|port| {
                    u16::try_from(port).map_err(|_| ConfigError::InvalidValue("SERVER_PORT".into()))
                })
                .transpose()?,
            log_file: get(LOG_FILE_VARIABLE).map(PathBuf::from),
        })
    }

    /// Capability in effect, falling back to the variant's default when none was configured.
    pub fn capability_or(&self, fallback: CapabilityProvider) -> CapabilityProvider {
        self.capability.unwrap_or(fallback)
    }

    /// Ensure the credential needed by `provider` is present.
    ///
    /// Fails with [`ConfigError::MissingVariable`] when the hosted capability is selected and
    /// `OPENAI_API_KEY` is absent or blank. Callers run this before binding a listener so a
    /// misconfigured process never serves traffic.
    pub fn require_credential(&self, provider: CapabilityProvider) -> Result<(), ConfigError> {
        match provider {
            CapabilityProvider::Extractive => Ok(()),
            CapabilityProvider::OpenAI => match self.openai_api_key.as_deref() {
                Some(key) if !key.trim().is_empty() => Ok(()),
                _ => Err(ConfigError::MissingVariable(OPENAI_API_KEY.to_string())),
            },
        }
    }
}

fn parse_top_k(key: &str, value: Option<String>) -> Result<usize, ConfigError> {
    let Some(value) = value else {
        return Ok(DEFAULT_TOP_K);
    };
    match value.trim().parse::<usize>() {
        Ok(parsed) if parsed > 0 => Ok(parsed),
        _ => Err(ConfigError::InvalidValue(key.to_string())),
    }
}

/// Split a comma separated file list, dropping blank entries.
pub(crate) fn parse_file_list(value: &str) -> Vec<PathBuf> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(PathBuf::from)
        .collect()
}

impl std::str::FromStr for CapabilityProvider {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "extractive" => Ok(Self::Extractive),
            _ => Err(()),
        }
    }
}

impl std::str::FromStr for IngestMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "append" => Ok(Self::Append),
            "replace" => Ok(Self::Replace),
            _ => Err(()),
        }
    }
}

/// Load configuration from the environment after applying any `.env` file.
pub fn init_config() -> Result<Config, ConfigError> {
    dotenvy::dotenv().ok();
    Config::from_env()
}
