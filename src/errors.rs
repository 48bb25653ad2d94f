/*!
 * Error types for the audiodesc application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

// Allow dead code - error types are for library consumers
#![allow(dead_code)]

use thiserror::Error;

/// Errors that can occur while extracting cues from a timed-text document
#[derive(Error, Debug)]
pub enum CueError {
    /// A timed element is missing a required attribute
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    /// A begin/end timestamp could not be parsed
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// A cue's end time does not come after its begin time
    #[error("Invalid time range: end time {end_ms} <= begin time {begin_ms}")]
    InvalidTimeRange {
        /// Cue begin time in milliseconds
        begin_ms: u64,
        /// Cue end time in milliseconds
        end_ms: u64,
    },

    /// The document contains no timed elements at all
    #[error("Document contains no timed text elements")]
    EmptyDocument,
}

/// Errors that can occur when talking to a speech synthesis provider
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error establishing the connection
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// Connection dropped or errored mid-exchange
    #[error("Transport failure: {0}")]
    TransportFailure(String),

    /// A response message violated the synthesis protocol
    #[error("Protocol violation: {0}")]
    ProtocolViolation(String),
}

/// Errors that can occur while decoding or composing audio
#[derive(Error, Debug)]
pub enum AudioError {
    /// The synthesized bytes could not be decoded as a waveform
    #[error("Failed to decode audio: {0}")]
    DecodeFailed(String),

    /// A clip's sample format does not match the track's
    #[error("Format mismatch: clip is {clip_rate} Hz / {clip_channels} ch, track is {track_rate} Hz / {track_channels} ch")]
    FormatMismatch {
        /// Clip sample rate in Hz
        clip_rate: u32,
        /// Clip channel count
        clip_channels: u16,
        /// Track sample rate in Hz
        track_rate: u32,
        /// Track channel count
        track_channels: u16,
    },

    /// Error writing the output waveform
    #[error("Failed to write waveform: {0}")]
    WriteFailed(String),
}

/// Errors that can occur during speech synthesis
#[derive(Error, Debug)]
pub enum SynthesisError {
    /// Error from the provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error decoding the synthesized audio
    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from cue extraction
    #[error("Cue error: {0}")]
    Cue(#[from] CueError),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from audio processing
    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),

    /// Error from synthesis
    #[error("Synthesis error: {0}")]
    Synthesis(#[from] SynthesisError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
