/*!
 * # audiodesc - AI-voiced audio description tracks from timed text
 *
 * A Rust library for composing synthesized speech onto a timeline derived
 * from a timed-text document.
 *
 * ## Features
 *
 * - Extract timed cues from TTML-like documents
 * - Synthesize each cue through a hosted WebSocket text-to-speech service
 * - Compose clips onto a growing, silence-padded output track
 * - Additive overlay: overlapping speech mixes instead of replacing
 * - Export the finished track as an uncompressed WAV file
 * - Optional accent control and per-cue duration hints
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `cue_processor`: Timed-text document handling and cue extraction
 * - `synthesis_service`: Per-cue speech synthesis service
 * - `compositor`: Timeline composition (Track, SynthesizedClip)
 * - `providers`: Client implementations for synthesis services:
 *   - `providers::deepdub`: Deepdub WebSocket API client
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `locale_utils`: Locale tag utilities
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod compositor;
pub mod cue_processor;
pub mod errors;
pub mod file_utils;
pub mod locale_utils;
pub mod providers;
pub mod synthesis_service;

// Re-export main types for easier usage
pub use app_config::Config;
pub use compositor::{SynthesizedClip, Track, TrackSpec};
pub use cue_processor::{Cue, CueCollection};
pub use errors::{AppError, AudioError, CueError, ProviderError, SynthesisError};
pub use synthesis_service::SynthesisService;
