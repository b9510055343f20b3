use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::subtitle_processor::{SubtitleBlock, Timecode};

// @module: Subtitle normalization pipeline

// @const: Interior whitespace run
static WHITESPACE_RUN_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Sentence-closing punctuation. A block whose last line ends with one of
/// these is "terminal" and never merges into its successor.
const TERMINAL_PUNCTUATION: [char; 7] = ['.', '!', '?', '…', '。', '！', '？'];

/// Run the full normalization pipeline over a block sequence.
///
/// The four stages run in strict order: whitespace trim, two-line fold,
/// punctuation-continuation merge, renumber. An empty input passes through
/// unchanged.
pub fn clean(mut blocks: Vec<SubtitleBlock>) -> Vec<SubtitleBlock> {
    trim_whitespace(&mut blocks);
    fold_two_line_blocks(&mut blocks);
    let mut blocks = merge_unterminated_blocks(blocks);
    renumber(&mut blocks);
    blocks
}

/// Stage A: strip leading/trailing whitespace from every line, collapse
/// interior whitespace runs to a single space, and drop lines that become
/// empty. Blocks reduced to zero lines are retained.
pub fn trim_whitespace(blocks: &mut [SubtitleBlock]) {
    for block in blocks.iter_mut() {
        block.lines = block
            .lines
            .iter()
            .map(|line| WHITESPACE_RUN_REGEX.replace_all(line.trim(), " ").into_owned())
            .filter(|line| !line.is_empty())
            .collect();
    }
}

/// Stage B: join the lines of exactly-two-line blocks with a single space.
///
/// Two-line captions are almost always one sentence wrapped for display
/// width; blocks with three or more lines are assumed intentional and left
/// alone, as are zero- and one-line blocks.
pub fn fold_two_line_blocks(blocks: &mut [SubtitleBlock]) {
    for block in blocks.iter_mut() {
        if block.lines.len() == 2 {
            block.lines = vec![block.lines.join(" ")];
        }
    }
}

/// Stage C: merge blocks that don't end in sentence-closing punctuation into
/// their immediate successor.
///
/// Single left-to-right pass: after a merge the scan resumes at the merged
/// pair's successor, so a chain of three or more non-terminal blocks only
/// merges its first pair per encounter. This is deliberate one-pass policy,
/// not a merge-until-stable loop. The merged block takes the first block's
/// start, the second block's end, a single combined text line, and a
/// placeholder index of 0 that the renumber stage replaces. A trailing
/// non-terminal block has nothing to merge with and is kept as-is.
pub fn merge_unterminated_blocks(blocks: Vec<SubtitleBlock>) -> Vec<SubtitleBlock> {
    let mut merged = Vec::with_capacity(blocks.len());
    let mut i = 0;

    while i < blocks.len() {
        let current = &blocks[i];
        if is_terminal(current) || i + 1 == blocks.len() {
            merged.push(current.clone());
            i += 1;
        } else {
            let next = &blocks[i + 1];
            let text = current
                .lines
                .iter()
                .chain(next.lines.iter())
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(" ");
            debug!(
                "Merging unterminated block {} into block {}",
                current.index, next.index
            );
            merged.push(SubtitleBlock::new(
                0,
                Timecode::new(current.timecode.start, next.timecode.end),
                vec![text],
            ));
            i += 2;
        }
    }

    merged
}

/// Stage D: assign indices sequentially starting at 1, discarding whatever
/// values were present before.
pub fn renumber(blocks: &mut [SubtitleBlock]) {
    for (i, block) in blocks.iter_mut().enumerate() {
        block.index = i + 1;
    }
}

// A zero-line block is never terminal; so is a block whose last line is all
// whitespace.
fn is_terminal(block: &SubtitleBlock) -> bool {
    block
        .lines
        .last()
        .and_then(|line| line.trim_end().chars().last())
        .is_some_and(|c| TERMINAL_PUNCTUATION.contains(&c))
}
