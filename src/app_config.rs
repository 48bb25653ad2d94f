use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;

use crate::providers::AccentControl;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Locale of the cue text (e.g. "en-US")
    pub locale: String,

    /// Synthesis config
    pub synthesis: SynthesisConfig,

    /// Output waveform config
    #[serde(default)]
    pub output: OutputConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Speech synthesis provider type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SynthesisProvider {
    // @provider: Deepdub WebSocket API
    #[default]
    Deepdub,
}

impl SynthesisProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Deepdub => "Deepdub",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Deepdub => "deepdub".to_string(),
        }
    }
}

// Implement Display trait for SynthesisProvider
impl std::fmt::Display for SynthesisProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

// Implement FromStr trait for SynthesisProvider
impl std::str::FromStr for SynthesisProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "deepdub" => Ok(Self::Deepdub),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: Model name
    #[serde(default = "default_model")]
    pub model: String,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    // @field: Timeout seconds for connect and per-message receive
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: SynthesisProvider) -> Self {
        match provider_type {
            SynthesisProvider::Deepdub => Self {
                provider_type: "deepdub".to_string(),
                model: default_model(),
                api_key: String::new(),
                endpoint: default_endpoint(),
                timeout_secs: default_timeout_secs(),
            },
        }
    }
}

/// Voice settings shared by every request of a run
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct VoiceConfig {
    /// Voice/prompt identifier
    #[serde(default = "String::new")]
    pub voice_prompt_id: String,

    /// Whether to send the cue span as a target duration hint
    #[serde(default = "default_true")]
    pub send_duration_hint: bool,

    /// Optional accent control
    #[serde(default)]
    pub accent: Option<AccentConfig>,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            voice_prompt_id: String::new(),
            send_duration_hint: true,
            accent: None,
        }
    }
}

/// Accent-control settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AccentConfig {
    /// Locale whose pronunciation forms the base
    pub base_locale: String,

    /// Locale whose accent is blended in
    pub target_locale: String,

    /// Blend ratio, 0.0 to 1.0
    pub ratio: f64,
}

impl AccentConfig {
    /// Convert to the wire-level accent-control block
    pub fn to_accent_control(&self) -> AccentControl {
        AccentControl {
            accent_base_locale: self.base_locale.clone(),
            accent_locale: self.target_locale.clone(),
            accent_ratio: self.ratio,
        }
    }
}

/// Synthesis service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SynthesisConfig {
    /// Synthesis provider to use
    #[serde(default)]
    pub provider: SynthesisProvider,

    /// Available synthesis providers
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,

    /// Voice settings
    #[serde(default)]
    pub voice: VoiceConfig,
}

/// Output waveform configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OutputConfig {
    /// Sample rate of the output track in Hz
    #[serde(default = "default_sample_rate_hz")]
    pub sample_rate_hz: u32,

    /// Channel count of the output track
    #[serde(default = "default_channels")]
    pub channels: u16,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: default_sample_rate_hz(),
            channels: default_channels(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

fn default_endpoint() -> String {
    "wss://wsapi.deepdub.ai/open".to_string()
}

fn default_model() -> String {
    "dd-etts-1.1".to_string()
}

fn default_sample_rate_hz() -> u32 {
    24_000
}

fn default_channels() -> u16 {
    1
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        // Validate the locale tag
        crate::locale_utils::validate_locale(&self.locale)?;

        // The one supported provider requires a credential
        let api_key = self.synthesis.get_api_key();
        if api_key.is_empty() {
            return Err(anyhow!("Synthesis API key is required for Deepdub provider"));
        }

        if self.synthesis.voice.voice_prompt_id.is_empty() {
            return Err(anyhow!("A voice prompt id is required"));
        }

        if let Some(accent) = &self.synthesis.voice.accent {
            crate::locale_utils::validate_locale(&accent.base_locale)?;
            crate::locale_utils::validate_locale(&accent.target_locale)?;
            if !(0.0..=1.0).contains(&accent.ratio) {
                return Err(anyhow!(
                    "Accent ratio must be within [0, 1], got {}",
                    accent.ratio
                ));
            }
        }

        if self.output.sample_rate_hz == 0 {
            return Err(anyhow!("Output sample rate must be positive"));
        }
        if self.output.channels == 0 || self.output.channels > 2 {
            return Err(anyhow!(
                "Output channel count must be 1 or 2, got {}",
                self.output.channels
            ));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            locale: "en-US".to_string(),
            synthesis: SynthesisConfig::default(),
            output: OutputConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl SynthesisConfig {
    /// Get the active provider configuration from the available_providers array
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        let provider_str = self.provider.to_lowercase_string();
        self.available_providers
            .iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Get the model for the active provider
    pub fn get_model(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.model.is_empty() {
                return provider_config.model.clone();
            }
        }

        default_model()
    }

    /// Get the API key for the active provider
    pub fn get_api_key(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.api_key.is_empty() {
                return provider_config.api_key.clone();
            }
        }

        String::new()
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.endpoint.is_empty() {
                return provider_config.endpoint.clone();
            }
        }

        default_endpoint()
    }

    /// Get the timeout for the active provider
    pub fn get_timeout_secs(&self) -> u64 {
        if let Some(provider_config) = self.get_active_provider_config() {
            if provider_config.timeout_secs > 0 {
                return provider_config.timeout_secs;
            }
        }

        default_timeout_secs()
    }
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        let mut config = Self {
            provider: SynthesisProvider::default(),
            available_providers: Vec::new(),
            voice: VoiceConfig::default(),
        };

        // Add default providers
        config
            .available_providers
            .push(ProviderConfig::new(SynthesisProvider::Deepdub));

        config
    }
}
