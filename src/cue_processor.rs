use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use once_cell::sync::Lazy;
use regex::Regex;
use log::{warn, debug};
use crate::errors::CueError;

// @module: Timed-text cue extraction

// @const: Timed paragraph element regex (namespace prefix optional)
static TIMED_ELEMENT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<(?:[A-Za-z][A-Za-z0-9]*:)?p\b([^>]*)>(.*?)</(?:[A-Za-z][A-Za-z0-9]*:)?p>")
        .unwrap()
});

// @const: begin/end attribute regexes
static BEGIN_ATTR_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\bbegin\s*=\s*"([^"]*)""#).unwrap()
});
static END_ATTR_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\bend\s*=\s*"([^"]*)""#).unwrap()
});

// @const: Inline markup inside cue text (<br/>, spans)
static INLINE_TAG_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<[^>]+>").unwrap()
});

// @struct: Single timed cue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cue {
    // @field: Sequence number
    pub seq_num: usize,

    // @field: Begin time in ms
    pub begin_ms: u64,

    // @field: End time in ms
    pub end_ms: u64,

    // @field: Cue text
    pub text: String,
}

impl Cue {
    /// Creates a new cue - used by tests and external consumers
    #[allow(dead_code)]
    pub fn new(seq_num: usize, begin_ms: u64, end_ms: u64, text: String) -> Self {
        Cue {
            seq_num,
            begin_ms,
            end_ms,
            text,
        }
    }

    // @creates: Validated cue
    // @validates: Time range and non-empty text
    pub fn new_validated(
        seq_num: usize,
        begin_ms: u64,
        end_ms: u64,
        text: String,
    ) -> Result<Self, CueError> {
        if end_ms <= begin_ms {
            return Err(CueError::InvalidTimeRange { begin_ms, end_ms });
        }

        let trimmed_text = text.trim();
        if trimmed_text.is_empty() {
            return Err(CueError::MalformedDocument(format!(
                "Empty cue text for element {}",
                seq_num
            )));
        }

        Ok(Cue {
            seq_num,
            begin_ms,
            end_ms,
            text: trimmed_text.to_string(),
        })
    }

    /// Parse an HH:MM:SS.mmm timestamp to milliseconds.
    ///
    /// All three clock components contribute to the result; the fraction
    /// separator may be a dot or a comma, and the fraction may be omitted.
    pub fn parse_timestamp(timestamp: &str) -> Result<u64, CueError> {
        let trimmed = timestamp.trim();
        let parts: Vec<&str> = trimmed.split(':').collect();

        if parts.len() != 3 {
            return Err(CueError::InvalidTimestamp(format!(
                "Expected HH:MM:SS.mmm, got: {}",
                timestamp
            )));
        }

        let hours: u64 = parts[0]
            .parse()
            .map_err(|_| CueError::InvalidTimestamp(format!("Bad hours in: {}", timestamp)))?;
        let minutes: u64 = parts[1]
            .parse()
            .map_err(|_| CueError::InvalidTimestamp(format!("Bad minutes in: {}", timestamp)))?;

        // The seconds component carries an optional .mmm or ,mmm fraction
        let (seconds_str, fraction_str) = match parts[2].split_once(['.', ',']) {
            Some((s, f)) => (s, Some(f)),
            None => (parts[2], None),
        };

        let seconds: u64 = seconds_str
            .parse()
            .map_err(|_| CueError::InvalidTimestamp(format!("Bad seconds in: {}", timestamp)))?;

        let millis: u64 = match fraction_str {
            Some(frac) => {
                if frac.is_empty() || frac.len() > 3 || !frac.chars().all(|c| c.is_ascii_digit()) {
                    return Err(CueError::InvalidTimestamp(format!(
                        "Bad fraction in: {}",
                        timestamp
                    )));
                }
                // Scale a 1-3 digit fraction to milliseconds
                let digits: u64 = frac.parse().map_err(|_| {
                    CueError::InvalidTimestamp(format!("Bad fraction in: {}", timestamp))
                })?;
                digits * 10u64.pow(3 - frac.len() as u32)
            }
            None => 0,
        };

        if minutes >= 60 || seconds >= 60 {
            return Err(CueError::InvalidTimestamp(format!(
                "Invalid time components in timestamp: {}",
                timestamp
            )));
        }

        Ok(hours * 3_600_000 + minutes * 60_000 + seconds * 1_000 + millis)
    }

    /// Convert begin time to a formatted timestamp
    pub fn format_begin_time(&self) -> String {
        Self::format_timestamp(self.begin_ms)
    }

    /// Convert end time to a formatted timestamp
    pub fn format_end_time(&self) -> String {
        Self::format_timestamp(self.end_ms)
    }

    /// Format a timestamp in milliseconds as HH:MM:SS.mmm
    pub fn format_timestamp(ms: u64) -> String {
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis)
    }

    /// Nominal duration of the cue slot in milliseconds
    pub fn duration_ms(&self) -> u64 {
        self.end_ms - self.begin_ms
    }
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.seq_num)?;
        writeln!(f, "{} --> {}", self.format_begin_time(), self.format_end_time())?;
        writeln!(f, "{}", self.text)
    }
}

/// Collection of cues extracted from one timed-text document
#[derive(Debug)]
pub struct CueCollection {
    /// Source document path
    pub source_file: PathBuf,

    /// Cues in document order
    pub cues: Vec<Cue>,
}

impl CueCollection {
    /// Create an empty collection
    pub fn new(source_file: PathBuf) -> Self {
        CueCollection {
            source_file,
            cues: Vec::new(),
        }
    }

    /// Parse a timed-text document from a file
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Self, CueError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            CueError::MalformedDocument(format!("Failed to read document {:?}: {}", path, e))
        })?;

        let cues = Self::parse_string(&content)?;
        Ok(CueCollection {
            source_file: path.to_path_buf(),
            cues,
        })
    }

    /// Parse timed-text markup into cues, preserving document order.
    ///
    /// Cues are never reordered: the synthesis timeline follows the document,
    /// and a non-decreasing begin time is assumed rather than enforced.
    pub fn parse_string(content: &str) -> Result<Vec<Cue>, CueError> {
        let mut cues = Vec::new();
        let mut element_count = 0;

        for caps in TIMED_ELEMENT_REGEX.captures_iter(content) {
            element_count += 1;
            let attrs = caps.get(1).map_or("", |m| m.as_str());
            let raw_text = caps.get(2).map_or("", |m| m.as_str());

            let begin_attr = BEGIN_ATTR_REGEX
                .captures(attrs)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str())
                .ok_or_else(|| {
                    CueError::MalformedDocument(format!(
                        "Timed element {} is missing a begin attribute",
                        element_count
                    ))
                })?;

            let end_attr = END_ATTR_REGEX
                .captures(attrs)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str())
                .ok_or_else(|| {
                    CueError::MalformedDocument(format!(
                        "Timed element {} is missing an end attribute",
                        element_count
                    ))
                })?;

            let begin_ms = Cue::parse_timestamp(begin_attr)?;
            let end_ms = Cue::parse_timestamp(end_attr)?;
            let text = Self::clean_cue_text(raw_text);

            match Cue::new_validated(element_count, begin_ms, end_ms, text) {
                Ok(cue) => cues.push(cue),
                Err(e) => {
                    warn!("Skipping cue element {}: {}", element_count, e);
                }
            }
        }

        if element_count == 0 {
            return Err(CueError::EmptyDocument);
        }

        // Warn about cues that start earlier than their predecessor; the
        // document order still wins.
        let mut out_of_order = 0;
        for window in cues.windows(2) {
            if window[1].begin_ms < window[0].begin_ms {
                out_of_order += 1;
            }
        }
        if out_of_order > 0 {
            warn!("Found {} cue(s) starting earlier than their predecessor", out_of_order);
        }

        // Renumber kept cues to ensure a sequential order
        for (i, cue) in cues.iter_mut().enumerate() {
            cue.seq_num = i + 1;
        }

        debug!("Extracted {} cue(s) from {} timed element(s)", cues.len(), element_count);
        Ok(cues)
    }

    /// Latest end time across all cues, in milliseconds
    pub fn total_span_ms(&self) -> u64 {
        self.cues.iter().map(|c| c.end_ms).max().unwrap_or(0)
    }

    /// Strip inline markup and resolve the basic XML entities
    fn clean_cue_text(raw: &str) -> String {
        let without_tags = INLINE_TAG_REGEX.replace_all(raw, " ");
        let unescaped = without_tags
            .replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&apos;", "'")
            .replace("&amp;", "&");

        // Collapse runs of whitespace left behind by stripped markup
        unescaped.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

impl fmt::Display for CueCollection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Cue Collection")?;
        writeln!(f, "Source: {:?}", self.source_file)?;
        writeln!(f, "Cues: {}", self.cues.len())?;
        writeln!(f, "Span: {}", Cue::format_timestamp(self.total_span_ms()))?;
        Ok(())
    }
}
