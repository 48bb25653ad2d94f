/*!
 * Provider implementations for speech synthesis services.
 *
 * This module defines the request types shared by all providers and the
 * trait a synthesis backend must implement:
 * - Deepdub: WebSocket streaming synthesis API
 */

use async_trait::async_trait;
use serde::{Serialize, Deserialize};
use std::fmt::Debug;

use crate::errors::ProviderError;

/// Accent-control block carried by a synthesis request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AccentControl {
    /// Locale whose pronunciation forms the base
    pub accent_base_locale: String,

    /// Locale whose accent is blended in
    pub accent_locale: String,

    /// Blend ratio, 0.0 (pure base) to 1.0 (pure accent)
    pub accent_ratio: f64,
}

/// One speech synthesis request
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisRequest {
    /// The synthesis model to use
    model: String,

    /// Fixed action identifier understood by the service
    action: String,

    /// The text to synthesize
    target_text: String,

    /// Requested clip duration in seconds (best-effort hint)
    #[serde(skip_serializing_if = "Option::is_none")]
    target_duration: Option<f64>,

    /// Locale of the target text
    locale: String,

    /// Voice/prompt identifier
    voice_prompt_id: String,

    /// Optional accent control
    #[serde(skip_serializing_if = "Option::is_none")]
    accent_control: Option<AccentControl>,
}

impl SynthesisRequest {
    /// Create a new synthesis request for the given model and text
    pub fn new(model: impl Into<String>, target_text: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            action: "text-to-speech".to_string(),
            target_text: target_text.into(),
            target_duration: None,
            locale: String::new(),
            voice_prompt_id: String::new(),
            accent_control: None,
        }
    }

    /// Set the requested clip duration in seconds
    pub fn target_duration(mut self, seconds: f64) -> Self {
        self.target_duration = Some(seconds);
        self
    }

    /// Set the locale
    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// Set the voice prompt identifier
    pub fn voice_prompt_id(mut self, voice_prompt_id: impl Into<String>) -> Self {
        self.voice_prompt_id = voice_prompt_id.into();
        self
    }

    /// Set the accent-control block
    pub fn accent_control(mut self, accent_control: AccentControl) -> Self {
        self.accent_control = Some(accent_control);
        self
    }

    /// The text this request will synthesize
    pub fn text(&self) -> &str {
        &self.target_text
    }

    /// The requested duration hint, if any
    pub fn duration_hint(&self) -> Option<f64> {
        self.target_duration
    }
}

/// Common trait for all speech synthesis providers
///
/// A provider takes one request and returns the complete audio byte buffer
/// for it, fully drained from however many response messages the service
/// produces. The receiver is `&mut` because providers hold live connections.
#[async_trait]
pub trait SpeechProvider: Send + Debug {
    /// Synthesize one request into a contiguous audio byte buffer
    ///
    /// # Arguments
    /// * `request` - The request to synthesize
    ///
    /// # Returns
    /// * `Result<Vec<u8>, ProviderError>` - The raw audio bytes or an error
    async fn synthesize(&mut self, request: &SynthesisRequest) -> Result<Vec<u8>, ProviderError>;

    /// Close the underlying connection, if any
    async fn close(&mut self) -> Result<(), ProviderError> {
        Ok(())
    }
}

pub mod deepdub;
