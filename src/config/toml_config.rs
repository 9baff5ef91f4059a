use crate::adapters::nhtsa::NhtsaSettings;
use crate::core::eta::{BufferSettings, EtaSettings, SpeedSettings, TrafficSettings};
use crate::core::eta_alerts::AlertSettings;
use crate::core::watch::WatchSettings;
use crate::utils::error::{CourierError, Result};
use crate::utils::validation::{validate_non_empty_string, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

static ENV_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("placeholder pattern is valid"));

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub eta: EtaConfig,
    pub vin: VinConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EtaConfig {
    pub speeds: SpeedSettings,
    pub buffers: BufferSettings,
    pub traffic: TrafficSettings,
    pub alerts: AlertSettings,
    pub watch: WatchSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VinConfig {
    pub nhtsa: NhtsaSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// EnvFilter directive, e.g. "courier_kit=debug"
    pub level: Option<String>,
    pub json: bool,
}

impl EtaConfig {
    pub fn settings(&self) -> EtaSettings {
        EtaSettings {
            speeds: self.speeds.clone(),
            buffers: self.buffers.clone(),
            traffic: self.traffic.clone(),
        }
    }
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 有指定檔案就載入，否則使用預設值
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) if !path.exists() => Err(CourierError::MissingConfigError {
                field: path.display().to_string(),
            }),
            Some(path) => {
                tracing::debug!("Loading configuration from {}", path.display());
                Self::from_file(path)
            }
            None => Ok(Self::default()),
        }
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content);

        toml::from_str(&processed).map_err(|e| CourierError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${NHTSA_ENDPOINT})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_PLACEHOLDER
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.eta.settings().validate()?;
        self.eta.alerts.validate()?;
        if self.vin.nhtsa.enabled {
            self.vin.nhtsa.validate()?;
        }
        if let Some(level) = &self.logging.level {
            validate_non_empty_string("logging.level", level)?;
        }
        Ok(())
    }
}
