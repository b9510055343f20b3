/*!
 * Tests for the four-stage normalization pipeline
 */

use subpipe::normalize;

use crate::common;

/// Test whitespace trimming and collapsing
#[test]
fn test_trim_whitespace_withPaddedLines_shouldTrimAndCollapse() {
    let mut blocks = vec![common::block(1, 0, 1_000, &["  Hello   there  ", "\tworld\t"])];
    normalize::trim_whitespace(&mut blocks);

    assert_eq!(blocks[0].lines, vec!["Hello there", "world"]);
}

/// Test that lines reduced to nothing are dropped but the block survives
#[test]
fn test_trim_whitespace_withBlankLines_shouldDropLinesButKeepBlock() {
    let mut blocks = vec![common::block(1, 0, 1_000, &["   ", "\t", "  "])];
    normalize::trim_whitespace(&mut blocks);

    assert_eq!(blocks.len(), 1);
    assert!(blocks[0].lines.is_empty());
}

/// Test that trimming twice gives the same result as trimming once
#[test]
fn test_trim_whitespace_appliedTwice_shouldBeIdempotent() {
    let mut once = vec![common::block(1, 0, 1_000, &["  a   b ", "", " c  d"])];
    normalize::trim_whitespace(&mut once);

    let mut twice = once.clone();
    normalize::trim_whitespace(&mut twice);

    assert_eq!(once, twice);
}

/// Test folding a two-line block into one line
#[test]
fn test_fold_two_line_blocks_withTwoLines_shouldJoinWithSpace() {
    let mut blocks = vec![common::block(1, 0, 1_000, &["Hello", "world"])];
    normalize::fold_two_line_blocks(&mut blocks);

    assert_eq!(blocks[0].lines, vec!["Hello world"]);
}

/// Test that blocks with other line counts are untouched by the fold
#[test]
fn test_fold_two_line_blocks_withOtherLineCounts_shouldLeaveUntouched() {
    let mut blocks = vec![
        common::block(1, 0, 1_000, &["single"]),
        common::block(2, 1_000, 2_000, &["one", "two", "three"]),
        common::block(3, 2_000, 3_000, &[]),
    ];
    let before = blocks.clone();
    normalize::fold_two_line_blocks(&mut blocks);

    assert_eq!(blocks, before);
}

/// Test merging a non-terminal block into its terminal successor
#[test]
fn test_merge_withUnterminatedBlock_shouldMergeIntoSuccessor() {
    let blocks = vec![
        common::block(1, 0, 1_000, &["Hello"]),
        common::block(2, 2_000, 3_000, &["world."]),
    ];
    let merged = normalize::merge_unterminated_blocks(blocks);

    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].lines, vec!["Hello world."]);
    assert_eq!(merged[0].timecode.start.as_millis(), 0);
    assert_eq!(merged[0].timecode.end.as_millis(), 3_000);
    assert_eq!(merged[0].index, 0);
}

/// Test that a terminal block is never merged with its successor
#[test]
fn test_merge_withTerminalBlock_shouldNotMerge() {
    let blocks = vec![
        common::block(1, 0, 1_000, &["Hello."]),
        common::block(2, 2_000, 3_000, &["World!"]),
    ];
    let merged = normalize::merge_unterminated_blocks(blocks.clone());

    assert_eq!(merged, blocks);
}

/// Test the single-pass semantics on a chain of three non-terminal blocks:
/// only the first pair merges, and the merged result is not re-examined
#[test]
fn test_merge_withThreeUnterminatedBlocks_shouldMergeOnlyFirstPair() {
    let blocks = vec![
        common::block(1, 0, 1_000, &["one"]),
        common::block(2, 1_000, 2_000, &["two"]),
        common::block(3, 2_000, 3_000, &["three."]),
    ];
    let merged = normalize::merge_unterminated_blocks(blocks);

    assert_eq!(merged.len(), 2);
    assert_eq!(merged[0].lines, vec!["one two"]);
    assert_eq!(merged[1].lines, vec!["three."]);
}

/// Test that two consecutive pairs both merge in one pass
#[test]
fn test_merge_withFourUnterminatedBlocks_shouldMergeBothPairs() {
    let blocks = vec![
        common::block(1, 0, 1_000, &["a"]),
        common::block(2, 1_000, 2_000, &["b"]),
        common::block(3, 2_000, 3_000, &["c"]),
        common::block(4, 3_000, 4_000, &["d"]),
    ];
    let merged = normalize::merge_unterminated_blocks(blocks);

    assert_eq!(merged.len(), 2);
    assert_eq!(merged[0].lines, vec!["a b"]);
    assert_eq!(merged[1].lines, vec!["c d"]);
}

/// Test that a trailing non-terminal block is kept as-is
#[test]
fn test_merge_withTrailingUnterminatedBlock_shouldKeepIt() {
    let blocks = vec![
        common::block(1, 0, 1_000, &["Done."]),
        common::block(2, 2_000, 3_000, &["dangling"]),
    ];
    let merged = normalize::merge_unterminated_blocks(blocks.clone());

    assert_eq!(merged, blocks);
}

/// Test that full-width terminal punctuation counts as terminal
#[test]
fn test_merge_withFullWidthPunctuation_shouldTreatAsTerminal() {
    let blocks = vec![
        common::block(1, 0, 1_000, &["你好。"]),
        common::block(2, 1_000, 2_000, &["再見…"]),
        common::block(3, 2_000, 3_000, &["好嗎？"]),
    ];
    let merged = normalize::merge_unterminated_blocks(blocks.clone());

    assert_eq!(merged, blocks);
}

/// Test that a zero-line block is non-terminal and merges forward
#[test]
fn test_merge_withZeroLineBlock_shouldMergeForward() {
    let blocks = vec![
        common::block(1, 0, 1_000, &[]),
        common::block(2, 1_000, 2_000, &["Text."]),
    ];
    let merged = normalize::merge_unterminated_blocks(blocks);

    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].lines, vec!["Text."]);
    assert_eq!(merged[0].timecode.start.as_millis(), 0);
}

/// Test sequential renumbering from 1
#[test]
fn test_renumber_withArbitraryIndices_shouldAssignSequential() {
    let mut blocks = vec![
        common::block(9, 0, 1_000, &["a."]),
        common::block(0, 1_000, 2_000, &["b."]),
        common::block(9, 2_000, 3_000, &["c."]),
    ];
    normalize::renumber(&mut blocks);

    let indices: Vec<usize> = blocks.iter().map(|b| b.index).collect();
    assert_eq!(indices, vec![1, 2, 3]);
}

/// Test the composed pipeline on an empty input
#[test]
fn test_clean_withEmptyInput_shouldPassThrough() {
    let cleaned = normalize::clean(Vec::new());
    assert!(cleaned.is_empty());
}

/// Test the composed pipeline: trim, fold, merge, renumber in order
#[test]
fn test_clean_withWrappedAndUnterminatedBlocks_shouldNormalizeAll() {
    let blocks = vec![
        common::block(1, 0, 1_000, &["  This sentence ", " continues"]),
        common::block(2, 2_000, 3_000, &["to the end."]),
        common::block(3, 4_000, 5_000, &["Standalone."]),
    ];
    let cleaned = normalize::clean(blocks);

    assert_eq!(cleaned.len(), 2);
    assert_eq!(cleaned[0].lines, vec!["This sentence continues to the end."]);
    assert_eq!(cleaned[0].timecode.end.as_millis(), 3_000);
    assert_eq!(cleaned[1].lines, vec!["Standalone."]);
    let indices: Vec<usize> = cleaned.iter().map(|b| b.index).collect();
    assert_eq!(indices, vec![1, 2]);
}
