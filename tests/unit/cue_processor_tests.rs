/*!
 * Tests for timed-text cue extraction
 */

use std::fmt::Write;
use audiodesc::cue_processor::{Cue, CueCollection};
use audiodesc::errors::CueError;
use crate::common;

/// Test timestamp parsing and formatting
#[test]
fn test_timestamp_parsing_withValidTimestamp_shouldParseAndFormat() {
    let ts = "01:23:45.678";
    let ms = Cue::parse_timestamp(ts).unwrap();
    assert_eq!(ms, 5025678);

    let formatted = Cue::format_timestamp(ms);
    assert_eq!(formatted, ts);
}

/// Hours and minutes must contribute to the parsed offset
#[test]
fn test_timestamp_parsing_withNonZeroHoursAndMinutes_shouldIncludeAllComponents() {
    assert_eq!(Cue::parse_timestamp("01:00:00.000").unwrap(), 3_600_000);
    assert_eq!(Cue::parse_timestamp("00:01:00.000").unwrap(), 60_000);
    assert_eq!(Cue::parse_timestamp("00:01:06.640").unwrap(), 66_640);
    assert_eq!(Cue::parse_timestamp("02:30:15.500").unwrap(), 9_015_500);
}

#[test]
fn test_timestamp_parsing_withCommaFraction_shouldParse() {
    assert_eq!(Cue::parse_timestamp("00:00:03,400").unwrap(), 3400);
}

#[test]
fn test_timestamp_parsing_withShortFraction_shouldScaleToMillis() {
    assert_eq!(Cue::parse_timestamp("00:00:03.4").unwrap(), 3400);
    assert_eq!(Cue::parse_timestamp("00:00:03.45").unwrap(), 3450);
}

#[test]
fn test_timestamp_parsing_withoutFraction_shouldParse() {
    assert_eq!(Cue::parse_timestamp("00:00:10").unwrap(), 10_000);
}

#[test]
fn test_timestamp_parsing_withInvalidInput_shouldFail() {
    assert!(Cue::parse_timestamp("10.5").is_err());
    assert!(Cue::parse_timestamp("00:00").is_err());
    assert!(Cue::parse_timestamp("aa:bb:cc.ddd").is_err());
    assert!(Cue::parse_timestamp("00:61:00.000").is_err());
    assert!(Cue::parse_timestamp("00:00:61.000").is_err());
    assert!(Cue::parse_timestamp("00:00:01.1234").is_err());
}

/// Test cue display formatting
#[test]
fn test_cue_display_withValidCue_shouldFormatCorrectly() {
    let cue = Cue::new(1, 5000, 10000, "Test cue".to_string());
    let mut output = String::new();
    write!(output, "{}", cue).unwrap();

    assert!(output.contains("1"));
    assert!(output.contains("00:00:05.000"));
    assert!(output.contains("00:00:10.000"));
    assert!(output.contains("Test cue"));
}

#[test]
fn test_cue_validation_withInvertedRange_shouldFail() {
    let result = Cue::new_validated(1, 2000, 1000, "text".to_string());
    assert!(matches!(result, Err(CueError::InvalidTimeRange { .. })));
}

#[test]
fn test_cue_validation_withEmptyText_shouldFail() {
    let result = Cue::new_validated(1, 1000, 2000, "   ".to_string());
    assert!(result.is_err());
}

/// Test parsing a complete document
#[test]
fn test_parse_string_withValidDocument_shouldExtractCuesInOrder() {
    let cues = CueCollection::parse_string(common::SAMPLE_DOCUMENT).unwrap();

    assert_eq!(cues.len(), 3);
    assert_eq!(cues[0].begin_ms, 1000);
    assert_eq!(cues[0].end_ms, 2500);
    assert_eq!(cues[0].text, "First cue.");
    assert_eq!(cues[1].begin_ms, 2500);
    assert_eq!(cues[2].end_ms, 6000);

    // Sequence numbers follow document order
    let seq_nums: Vec<usize> = cues.iter().map(|c| c.seq_num).collect();
    assert_eq!(seq_nums, vec![1, 2, 3]);
}

/// Re-parsing the same document must yield the same cue sequence
#[test]
fn test_parse_string_withSameDocument_shouldBeIdempotent() {
    let first = CueCollection::parse_string(common::SAMPLE_DOCUMENT).unwrap();
    let second = CueCollection::parse_string(common::SAMPLE_DOCUMENT).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_parse_string_withMissingBeginAttribute_shouldFailMalformed() {
    let document = r#"<tt><body><div>
        <p end="00:00:02.000">No begin here</p>
    </div></body></tt>"#;

    let result = CueCollection::parse_string(document);
    assert!(matches!(result, Err(CueError::MalformedDocument(_))));
}

#[test]
fn test_parse_string_withMissingEndAttribute_shouldFailMalformed() {
    let document = r#"<tt><body><div>
        <p begin="00:00:01.000">No end here</p>
    </div></body></tt>"#;

    let result = CueCollection::parse_string(document);
    assert!(matches!(result, Err(CueError::MalformedDocument(_))));
}

#[test]
fn test_parse_string_withNoTimedElements_shouldFailEmpty() {
    let document = r#"<tt><body><div>nothing timed</div></body></tt>"#;

    let result = CueCollection::parse_string(document);
    assert!(matches!(result, Err(CueError::EmptyDocument)));
}

#[test]
fn test_parse_string_withBadTimestamp_shouldFailInvalidTimestamp() {
    let document = r#"<tt><body><div>
        <p begin="not-a-time" end="00:00:02.000">text</p>
    </div></body></tt>"#;

    let result = CueCollection::parse_string(document);
    assert!(matches!(result, Err(CueError::InvalidTimestamp(_))));
}

#[test]
fn test_parse_string_withNamespacedElements_shouldParse() {
    let document = r#"<tt:tt xmlns:tt="http://www.w3.org/ns/ttml"><tt:body><tt:div>
        <tt:p begin="00:00:01.000" end="00:00:02.000">Namespaced cue</tt:p>
    </tt:div></tt:body></tt:tt>"#;

    let cues = CueCollection::parse_string(document).unwrap();
    assert_eq!(cues.len(), 1);
    assert_eq!(cues[0].text, "Namespaced cue");
}

#[test]
fn test_parse_string_withInlineMarkupAndEntities_shouldCleanText() {
    let document = r#"<tt><body><div>
        <p begin="00:00:01.000" end="00:00:02.000">Rock <br/> &amp; roll &lt;live&gt;</p>
    </div></body></tt>"#;

    let cues = CueCollection::parse_string(document).unwrap();
    assert_eq!(cues[0].text, "Rock & roll <live>");
}

/// Cues with empty text or inverted ranges are skipped, not fatal
#[test]
fn test_parse_string_withUnusableCues_shouldSkipThem() {
    let document = r#"<tt><body><div>
        <p begin="00:00:01.000" end="00:00:02.000">Good cue</p>
        <p begin="00:00:03.000" end="00:00:02.000">Inverted range</p>
        <p begin="00:00:04.000" end="00:00:05.000">   </p>
        <p begin="00:00:06.000" end="00:00:07.000">Another good cue</p>
    </div></body></tt>"#;

    let cues = CueCollection::parse_string(document).unwrap();
    assert_eq!(cues.len(), 2);
    assert_eq!(cues[0].text, "Good cue");
    assert_eq!(cues[1].text, "Another good cue");
    // Kept cues are renumbered sequentially
    assert_eq!(cues[1].seq_num, 2);
}

/// Document order wins over begin-time order
#[test]
fn test_parse_string_withOutOfOrderCues_shouldPreserveDocumentOrder() {
    let document = r#"<tt><body><div>
        <p begin="00:00:05.000" end="00:00:06.000">Later cue first</p>
        <p begin="00:00:01.000" end="00:00:02.000">Earlier cue second</p>
    </div></body></tt>"#;

    let cues = CueCollection::parse_string(document).unwrap();
    assert_eq!(cues[0].begin_ms, 5000);
    assert_eq!(cues[1].begin_ms, 1000);
}

#[test]
fn test_parse_file_withDocumentOnDisk_shouldExtractCues() {
    let temp_dir = common::create_temp_dir().unwrap();
    let path = common::create_test_document(&temp_dir.path().to_path_buf(), "test.ttml").unwrap();

    let collection = CueCollection::parse_file(&path).unwrap();
    assert_eq!(collection.cues.len(), 3);
    assert_eq!(collection.source_file, path);
    assert_eq!(collection.total_span_ms(), 6000);
}
