/*!
 * Speech synthesis service.
 *
 * This module contains the service layer between cue extraction and timeline
 * composition: it turns one cue into one synthesis request, hands the request
 * to the configured provider, and decodes the drained audio bytes into a
 * clip ready for overlay.
 */

use log::debug;

use crate::app_config::SynthesisConfig;
use crate::compositor::SynthesizedClip;
use crate::cue_processor::Cue;
use crate::errors::SynthesisError;
use crate::providers::deepdub::DeepdubClient;
use crate::providers::{AccentControl, SpeechProvider, SynthesisRequest};

/// Service wrapping a speech provider with the run's voice settings
#[derive(Debug)]
pub struct SynthesisService {
    /// The connected provider
    provider: Box<dyn SpeechProvider>,

    /// Model identifier sent with every request
    model: String,

    /// Locale of the cue text
    locale: String,

    /// Voice/prompt identifier
    voice_prompt_id: String,

    /// Optional accent control sent with every request
    accent: Option<AccentControl>,

    /// Whether cue spans are sent as duration hints
    send_duration_hint: bool,
}

impl SynthesisService {
    /// Connect the configured provider and build a service around it
    pub async fn connect(config: &SynthesisConfig, locale: &str) -> Result<Self, SynthesisError> {
        let client = DeepdubClient::connect(
            &config.get_endpoint(),
            &config.get_api_key(),
            config.get_timeout_secs(),
        )
        .await?;

        Ok(Self::with_provider(Box::new(client), config, locale))
    }

    /// Build a service around an already-constructed provider.
    ///
    /// This is the seam tests use to substitute a mock provider.
    pub fn with_provider(
        provider: Box<dyn SpeechProvider>,
        config: &SynthesisConfig,
        locale: &str,
    ) -> Self {
        Self {
            provider,
            model: config.get_model(),
            locale: locale.to_string(),
            voice_prompt_id: config.voice.voice_prompt_id.clone(),
            accent: config.voice.accent.as_ref().map(|a| a.to_accent_control()),
            send_duration_hint: config.voice.send_duration_hint,
        }
    }

    /// Build the request for one cue.
    ///
    /// The cue span is passed as a best-effort duration hint in seconds when
    /// enabled; the service is free to return a longer or shorter clip.
    pub fn build_cue_request(&self, cue: &Cue) -> SynthesisRequest {
        let mut request = self.build_text_request(&cue.text);
        if self.send_duration_hint {
            request = request.target_duration(cue.duration_ms() as f64 / 1000.0);
        }
        request
    }

    /// Build a request for free-standing text (no timeline placement)
    pub fn build_text_request(&self, text: &str) -> SynthesisRequest {
        let mut request = SynthesisRequest::new(&self.model, text)
            .locale(&self.locale)
            .voice_prompt_id(&self.voice_prompt_id);
        if let Some(accent) = &self.accent {
            request = request.accent_control(accent.clone());
        }
        request
    }

    /// Synthesize one cue into a decoded clip
    pub async fn synthesize_cue(&mut self, cue: &Cue) -> Result<SynthesizedClip, SynthesisError> {
        let request = self.build_cue_request(cue);
        debug!(
            "Synthesizing cue {} ({} ms): {}",
            cue.seq_num,
            cue.duration_ms(),
            cue.text
        );

        let bytes = self.provider.synthesize(&request).await?;
        let clip = SynthesizedClip::from_wav_bytes(&bytes)?;

        debug!(
            "Cue {} synthesized: {} ms of audio for a {} ms slot",
            cue.seq_num,
            clip.duration_ms(),
            cue.duration_ms()
        );
        Ok(clip)
    }

    /// Synthesize free-standing text into a decoded clip
    pub async fn synthesize_text(&mut self, text: &str) -> Result<SynthesizedClip, SynthesisError> {
        let request = self.build_text_request(text);
        let bytes = self.provider.synthesize(&request).await?;
        Ok(SynthesizedClip::from_wav_bytes(&bytes)?)
    }

    /// Close the underlying provider connection
    pub async fn close(&mut self) -> Result<(), SynthesisError> {
        self.provider.close().await?;
        Ok(())
    }
}
