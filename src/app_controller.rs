use anyhow::{Result, Context};
use log::{error, warn, info};
use std::path::{Path, PathBuf};
use indicatif::{ProgressBar, ProgressStyle, MultiProgress};

use crate::app_config::Config;
use crate::compositor::{Track, TrackSpec};
use crate::cue_processor::{Cue, CueCollection};
use crate::file_utils::{FileManager, FileType};
use crate::synthesis_service::SynthesisService;

// @module: Application controller for timeline composition

/// Main application controller for audio description composition
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    /// Create a new controller for test purposes with default configuration
    pub fn new_for_test() -> Result<Self> {
        Self::with_config(Config::default())
    }

    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let controller = Self { config };

        Ok(controller)
    }

    /// Check if the controller is properly initialized with configuration
    pub fn is_initialized(&self) -> bool {
        !self.config.locale.is_empty()
    }

    /// The track spec the configuration asks for
    pub fn track_spec(&self) -> TrackSpec {
        TrackSpec::new(self.config.output.sample_rate_hz, self.config.output.channels)
    }

    /// Run the main workflow: one timed-text document to one composed track
    pub async fn run(
        &self,
        input_file: PathBuf,
        output_file: Option<PathBuf>,
        force_overwrite: bool,
    ) -> Result<()> {
        let multi_progress = MultiProgress::new();
        self.run_with_progress(input_file, output_file, &multi_progress, force_overwrite)
            .await
    }

    /// Run the controller with progress reporting
    async fn run_with_progress(
        &self,
        input_file: PathBuf,
        output_file: Option<PathBuf>,
        multi_progress: &MultiProgress,
        force_overwrite: bool,
    ) -> Result<()> {
        // Start timing the process
        let start_time = std::time::Instant::now();

        if !input_file.exists() {
            return Err(anyhow::anyhow!("Input file does not exist: {:?}", input_file));
        }

        let file_type = FileManager::detect_file_type(&input_file)?;
        if file_type != FileType::TimedText {
            return Err(anyhow::anyhow!(
                "Input is not a timed-text document: {:?}",
                input_file
            ));
        }

        let output_path = match output_file {
            Some(path) => path,
            None => FileManager::generate_output_path(
                &input_file,
                input_file.parent().unwrap_or(Path::new(".")),
                &self.config.locale,
                "wav",
            ),
        };

        if output_path.exists() && !force_overwrite {
            warn!("Skipping file, output already exists (use -f to force overwrite)");
            return Ok(());
        }

        // Extract cues first: a malformed document must fail before any
        // network traffic happens.
        let collection = CueCollection::parse_file(&input_file)
            .with_context(|| format!("Failed to extract cues from {:?}", input_file))?;
        info!(
            "Extracted {} cue(s) spanning {} ms",
            collection.cues.len(),
            collection.total_span_ms()
        );

        info!(
            "{} - {}",
            self.config.synthesis.provider.display_name(),
            self.config.synthesis.get_model()
        );

        let mut service =
            SynthesisService::connect(&self.config.synthesis, &self.config.locale).await?;

        // Create a progress bar for synthesis tracking
        let progress_bar = multi_progress.add(ProgressBar::new(collection.cues.len() as u64));
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} cues ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result);
        progress_bar.set_message("Synthesizing");

        let compose_result = Self::compose_cues(
            &mut service,
            &collection.cues,
            self.track_spec(),
            Some(&progress_bar),
        )
        .await;

        progress_bar.finish_and_clear();

        // Close the connection regardless of the outcome before propagating
        let _ = service.close().await;
        let track = compose_result?;

        track.write_wav(&output_path)?;
        info!("Wrote {} to {:?}", track, output_path);

        let elapsed = start_time.elapsed();
        info!("Composition completed in {}.", Self::format_duration(elapsed));

        Ok(())
    }

    /// Synthesize each cue in order and overlay it onto a fresh track.
    ///
    /// For every cue the track is first padded with silence up to the cue's
    /// end time, then the clip is mixed in at the cue's begin offset. A clip
    /// longer than its slot extends the track. Any synthesis failure aborts
    /// the whole run; nothing is salvaged.
    pub async fn compose_cues(
        service: &mut SynthesisService,
        cues: &[Cue],
        spec: TrackSpec,
        progress: Option<&ProgressBar>,
    ) -> Result<Track> {
        let mut track = Track::new(spec);

        for (i, cue) in cues.iter().enumerate() {
            let clip = service
                .synthesize_cue(cue)
                .await
                .with_context(|| format!("Synthesis failed for cue {}", cue.seq_num))?;

            track.pad_to(cue.end_ms);
            track.overlay(&clip, cue.begin_ms)?;

            if let Some(pb) = progress {
                pb.set_position((i + 1) as u64);
            }
        }

        Ok(track)
    }

    /// Process every timed-text document in a directory
    pub async fn run_folder(&self, input_dir: PathBuf, force_overwrite: bool) -> Result<()> {
        info!("Starting composition for directory: {:?}", input_dir);

        let files = FileManager::find_files(&input_dir, &["ttml", "dfxp", "xml"])?;
        if files.is_empty() {
            warn!("No timed-text documents found in {:?}", input_dir);
            return Ok(());
        }

        let mut processed_count = 0;
        for path in files {
            info!("Processing document: {:?}", path);

            if let Err(e) = self.run(path.clone(), None, force_overwrite).await {
                error!("Error processing file: {}", e);
            } else {
                processed_count += 1;
            }
        }

        info!("Finished processing {} files", processed_count);

        Ok(())
    }

    /// Synthesize one free-standing text straight to a waveform file
    pub async fn speak(&self, text: &str, output_file: PathBuf) -> Result<()> {
        let mut service =
            SynthesisService::connect(&self.config.synthesis, &self.config.locale).await?;

        let result = service.synthesize_text(text).await;
        let _ = service.close().await;
        let clip = result?;

        // A single clip becomes a track of its own duration
        let mut track = Track::new(TrackSpec::new(clip.sample_rate, clip.channels));
        track.overlay(&clip, 0)?;
        track.write_wav(&output_file)?;

        info!("Wrote {} ms of audio to {:?}", clip.duration_ms(), output_file);
        Ok(())
    }

    /// Format a duration as a short human-readable string
    fn format_duration(duration: std::time::Duration) -> String {
        let total_secs = duration.as_secs();
        let minutes = total_secs / 60;
        let seconds = total_secs % 60;

        if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:01}s", seconds, duration.subsec_millis() / 100)
        }
    }
}
