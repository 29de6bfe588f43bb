use std::{env::VarError, str::FromStr, time::Duration};

use anyhow::{Context, Result, anyhow, bail};
use config::{Config, File, FileFormat, Source};
use serde::Deserialize;

use crate::provider::DEFAULT_BASE_URL;

const DEFAULT_CONFIG_PATH: &str = "settings.yml";

const APP_PORT_ENV: &str = "APP_PORT";
const API_KEY_ENV: &str = "WEATHER_API_KEY";
const BASE_URL_ENV: &str = "WEATHER_BASE_URL";
const UPSTREAM_TIMEOUT_ENV: &str = "WEATHER_TIMEOUT_S";
const CACHE_BACKEND_ENV: &str = "CACHE_BACKEND";
const REDIS_URL_ENV: &str = "REDIS_URL";
const CACHE_TIMEOUT_ENV: &str = "CACHE_TIMEOUT_MS";
const CACHE_CAPACITY_ENV: &str = "CACHE_CAPACITY";
const DIAG_INTERVAL_ENV: &str = "DIAG_INTERVAL_S";

const DEFAULT_UPSTREAM_TIMEOUT_S: u64 = 10;
const DEFAULT_CACHE_TIMEOUT_MS: u64 = 500;
const DEFAULT_CACHE_CAPACITY: u64 = 10_000;
const DEFAULT_DIAG_INTERVAL_S: u64 = 300;

#[derive(Debug, Clone)]
pub struct Settings {
    pub port: u16,
    pub upstream: UpstreamSettings,
    pub cache: CacheSettings,
    pub diag_interval_s: u64,
}

#[derive(Debug, Clone)]
pub struct UpstreamSettings {
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub backend: CacheBackend,
    pub op_timeout: Duration,
    pub capacity: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheBackend {
    Memory,
    Redis { url: String },
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum BackendKind {
    Memory,
    Redis,
    None,
}

impl FromStr for BackendKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "redis" => Ok(Self::Redis),
            "none" => Ok(Self::None),
            other => bail!("unknown cache backend `{other}`"),
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct FileConfig {
    app_port: Option<u16>,
    api_key: Option<String>,
    base_url: Option<String>,
    upstream_timeout_s: Option<u64>,
    cache_backend: Option<BackendKind>,
    redis_url: Option<String>,
    cache_timeout_ms: Option<u64>,
    cache_capacity: Option<u64>,
    diag_interval_s: Option<u64>,
}

fn load_file_config<S>(source: S) -> Result<FileConfig>
where
    S: Source + Send + Sync + 'static,
{
    let settings = Config::builder()
        .add_source(source)
        .build()
        .map_err(|e| anyhow!("Failed to read config file: {e}"))?;

    settings
        .try_deserialize::<FileConfig>()
        .map_err(|e| anyhow!("Failed to deserialize config file: {e}"))
}

/// Try to parse env variable. If it's not set, return None. If it's invalid, treat it as an error.
fn try_from_env<T, E, F>(env: &E, env_var: &str, f: F) -> Result<Option<T>>
where
    E: Fn(&str) -> Result<String, VarError>,
    F: FnOnce(String) -> Result<T>,
{
    match env(env_var) {
        Ok(raw) => {
            let val = f(raw).with_context(|| format!("Failed to parse {env_var}"))?;
            Ok(Some(val))
        }
        Err(VarError::NotPresent) => Ok(None),
        Err(_) => bail!("Could not read {env_var} from env"),
    }
}

fn parse_env<T, E>(env: &E, env_var: &str) -> Result<Option<T>>
where
    E: Fn(&str) -> Result<String, VarError>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    try_from_env(env, env_var, |raw| raw.trim().parse::<T>().map_err(|e| e.into()))
}

/// Load configuration from env with fallback to the default config file
pub fn load() -> Result<Settings> {
    load_with(
        File::with_name(DEFAULT_CONFIG_PATH).required(false),
        |name: &str| std::env::var(name),
    )
}

/// Env values win over values from `file`, which win over built-in defaults
pub fn load_with<S, E>(file: S, env: E) -> Result<Settings>
where
    S: Source + Send + Sync + 'static,
    E: Fn(&str) -> Result<String, VarError>,
{
    let config = load_file_config(file)?;

    let port = parse_env::<u16, _>(&env, APP_PORT_ENV)?
        .or(config.app_port)
        .ok_or_else(|| {
            anyhow!("{APP_PORT_ENV} is not set and {DEFAULT_CONFIG_PATH} has no app_port")
        })?;

    let api_key = try_from_env(&env, API_KEY_ENV, Ok)?
        .or(config.api_key)
        .filter(|key| !key.is_empty())
        .ok_or_else(|| {
            anyhow!("{API_KEY_ENV} is not set and {DEFAULT_CONFIG_PATH} has no api_key")
        })?;

    let base_url = try_from_env(&env, BASE_URL_ENV, Ok)?
        .or(config.base_url)
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    let upstream_timeout_s = parse_env::<u64, _>(&env, UPSTREAM_TIMEOUT_ENV)?
        .or(config.upstream_timeout_s)
        .unwrap_or(DEFAULT_UPSTREAM_TIMEOUT_S);

    let backend_kind = try_from_env(&env, CACHE_BACKEND_ENV, |raw| raw.parse::<BackendKind>())?
        .or(config.cache_backend)
        .unwrap_or(BackendKind::Memory);

    let backend = match backend_kind {
        BackendKind::Memory => CacheBackend::Memory,
        BackendKind::None => CacheBackend::None,
        BackendKind::Redis => {
            let url = try_from_env(&env, REDIS_URL_ENV, Ok)?
                .or(config.redis_url)
                .ok_or_else(|| {
                    anyhow!("redis cache backend selected but {REDIS_URL_ENV} is not set")
                })?;
            CacheBackend::Redis { url }
        }
    };

    let cache_timeout_ms = parse_env::<u64, _>(&env, CACHE_TIMEOUT_ENV)?
        .or(config.cache_timeout_ms)
        .unwrap_or(DEFAULT_CACHE_TIMEOUT_MS);

    let capacity = parse_env::<u64, _>(&env, CACHE_CAPACITY_ENV)?
        .or(config.cache_capacity)
        .unwrap_or(DEFAULT_CACHE_CAPACITY);

    let diag_interval_s = parse_env::<u64, _>(&env, DIAG_INTERVAL_ENV)?
        .or(config.diag_interval_s)
        .unwrap_or(DEFAULT_DIAG_INTERVAL_S);

    if upstream_timeout_s == 0 {
        bail!("{UPSTREAM_TIMEOUT_ENV} must be positive");
    }
    if diag_interval_s == 0 {
        bail!("{DIAG_INTERVAL_ENV} must be positive");
    }

    Ok(Settings {
        port,
        upstream: UpstreamSettings {
            base_url,
            api_key,
            timeout: Duration::from_secs(upstream_timeout_s),
        },
        cache: CacheSettings {
            backend,
            op_timeout: Duration::from_millis(cache_timeout_ms),
            capacity,
        },
        diag_interval_s,
    })
}

/// Builds a config source from an in-memory yaml document
pub fn yaml_source(contents: &str) -> File<config::FileSourceString, FileFormat> {
    File::from_str(contents, FileFormat::Yaml)
}
