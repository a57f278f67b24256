//! Line-oriented diff with per-version attribution
//!
//! Two raw-text versions are aligned on their longest common subsequence of lines.
//! Every run of non-matching lines becomes an added, removed or modified block, and
//! nearby blocks of the same kind are merged. Each block is stamped with the single
//! identity that produced the new version; no per-line authorship is inferred.

use crate::error::{Result, VerdiffError};
use serde::{Deserialize, Serialize};

/// Maximum number of unchanged lines allowed between two blocks that get merged.
///
/// Blocks merge when `next.block_start <= current.block_end + gap + 1`, so two
/// intervening unchanged lines still merge. Diffs produced under the stricter
/// `block_end + 2` rule will not replay identically against this default.
pub const DEFAULT_MERGE_GAP: usize = 2;

/// Identity stamped onto every block of one diff invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribution {
    pub user_id: String,
    pub username: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockChangeType {
    Added,
    Modified,
    Removed,
}

/// A contiguous run of changed lines.
///
/// `block_start`/`block_end` are 1-indexed and refer to the new text for added and
/// modified blocks, and to the old text for removed blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffBlock {
    pub block_index: usize,
    pub block_start: usize,
    pub block_end: usize,
    pub change_type: BlockChangeType,
    pub before_text: Option<String>,
    pub after_text: Option<String>,
    pub edited_by_user_id: String,
    pub edited_by_username: String,
}

/// Aggregate line counts over a list of blocks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffStats {
    pub added: usize,
    pub removed: usize,
    pub modified: usize,
}

/// Tuning for the text diff engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffOptions {
    /// Blocks separated by at most this many unchanged lines are merged
    pub merge_gap: usize,
    /// Reject inputs with more lines than this before allocating the LCS table
    pub max_lines: Option<usize>,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            merge_gap: DEFAULT_MERGE_GAP,
            max_lines: None,
        }
    }
}

/// Text diff engine
#[derive(Debug, Clone, Default)]
pub struct TextDiffEngine {
    options: DiffOptions,
}

impl Attribution {
    pub fn new(user_id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
        }
    }
}

impl TextDiffEngine {
    pub fn new(options: DiffOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &DiffOptions {
        &self.options
    }

    /// Diff two text versions, attributing every block to `editor`
    pub fn diff(&self, old_text: &str, new_text: &str, editor: &Attribution) -> Result<Vec<DiffBlock>> {
        let old_lines = split_lines(old_text);
        let new_lines = split_lines(new_text);

        if let Some(limit) = self.options.max_lines {
            for (side, lines) in [("old", old_lines.len()), ("new", new_lines.len())] {
                if lines > limit {
                    return Err(VerdiffError::InputTooLarge { side, lines, limit });
                }
            }
        }

        let blocks = build_blocks(&old_lines, &new_lines, editor);
        let raw_count = blocks.len();
        let merged = merge_adjacent_blocks(blocks, self.options.merge_gap);

        log::debug!(
            "Diffed {} -> {} lines: {} raw blocks, {} after merge",
            old_lines.len(),
            new_lines.len(),
            raw_count,
            merged.len()
        );

        Ok(merged)
    }

    /// Recompute the diff and check it reproduces `stored` exactly
    pub fn replay_matches(
        &self,
        old_text: &str,
        new_text: &str,
        editor: &Attribution,
        stored: &[DiffBlock],
    ) -> Result<bool> {
        Ok(self.diff(old_text, new_text, editor)? == stored)
    }
}

/// Diff with default options
pub fn diff_lines(old_text: &str, new_text: &str, editor: &Attribution) -> Vec<DiffBlock> {
    let old_lines = split_lines(old_text);
    let new_lines = split_lines(new_text);
    merge_adjacent_blocks(build_blocks(&old_lines, &new_lines, editor), DEFAULT_MERGE_GAP)
}

fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n').collect()
}

fn count_lines(text: Option<&str>) -> usize {
    text.map_or(0, |t| t.split('\n').count())
}

/// Longest common subsequence of two line sequences.
///
/// Classic O(m*n) table. Backtracking moves up only when that strictly keeps a
/// longer subsequence, otherwise left.
pub fn longest_common_subsequence<'a>(old: &[&'a str], new: &[&str]) -> Vec<&'a str> {
    let m = old.len();
    let n = new.len();
    let width = n + 1;
    let mut dp = vec![0usize; (m + 1) * width];

    for i in 1..=m {
        for j in 1..=n {
            dp[i * width + j] = if old[i - 1] == new[j - 1] {
                dp[(i - 1) * width + (j - 1)] + 1
            } else {
                dp[(i - 1) * width + j].max(dp[i * width + (j - 1)])
            };
        }
    }

    let mut lcs = Vec::with_capacity(dp[m * width + n]);
    let (mut i, mut j) = (m, n);
    while i > 0 && j > 0 {
        if old[i - 1] == new[j - 1] {
            lcs.push(old[i - 1]);
            i -= 1;
            j -= 1;
        } else if dp[(i - 1) * width + j] > dp[i * width + (j - 1)] {
            i -= 1;
        } else {
            j -= 1;
        }
    }
    lcs.reverse();
    lcs
}

/// Walk both sides against the LCS and emit one block per divergence point
fn build_blocks(old: &[&str], new: &[&str], editor: &Attribution) -> Vec<DiffBlock> {
    let lcs = longest_common_subsequence(old, new);
    let mut blocks = Vec::new();
    let (mut i, mut j, mut k) = (0usize, 0usize, 0usize);

    while i < old.len() || j < new.len() {
        let target = lcs.get(k).copied();

        if let Some(anchor) = target {
            if i < old.len() && j < new.len() && old[i] == anchor && new[j] == anchor {
                i += 1;
                j += 1;
                k += 1;
                continue;
            }
        }

        let removed_start = i;
        while i < old.len() && Some(old[i]) != target {
            i += 1;
        }
        let added_start = j;
        while j < new.len() && Some(new[j]) != target {
            j += 1;
        }

        let removed = &old[removed_start..i];
        let added = &new[added_start..j];

        let block = match (removed.is_empty(), added.is_empty()) {
            (false, false) => DiffBlock {
                block_index: 0,
                block_start: added_start + 1,
                block_end: j,
                change_type: BlockChangeType::Modified,
                before_text: Some(removed.join("\n")),
                after_text: Some(added.join("\n")),
                edited_by_user_id: editor.user_id.clone(),
                edited_by_username: editor.username.clone(),
            },
            (false, true) => DiffBlock {
                block_index: 0,
                block_start: removed_start + 1,
                block_end: i,
                change_type: BlockChangeType::Removed,
                before_text: Some(removed.join("\n")),
                after_text: None,
                edited_by_user_id: editor.user_id.clone(),
                edited_by_username: editor.username.clone(),
            },
            (true, false) => DiffBlock {
                block_index: 0,
                block_start: added_start + 1,
                block_end: j,
                change_type: BlockChangeType::Added,
                before_text: None,
                after_text: Some(added.join("\n")),
                edited_by_user_id: editor.user_id.clone(),
                edited_by_username: editor.username.clone(),
            },
            // Greedy matching keeps the LCS a subsequence of both remainders,
            // so a divergence always consumes at least one line.
            (true, true) => unreachable!("divergence at old line {i}, new line {j} consumed nothing"),
        };
        blocks.push(block);
    }

    blocks
}

fn join_text(current: Option<String>, next: Option<String>) -> Option<String> {
    match (current, next) {
        (Some(a), Some(b)) => Some(format!("{a}\n{b}")),
        (a, b) => a.or(b),
    }
}

/// Merge same-kind, same-author blocks separated by at most `gap` unchanged lines,
/// then renumber `block_index` positionally.
pub fn merge_adjacent_blocks(blocks: Vec<DiffBlock>, gap: usize) -> Vec<DiffBlock> {
    let mut merged: Vec<DiffBlock> = Vec::with_capacity(blocks.len());

    for block in blocks {
        if let Some(current) = merged.last_mut() {
            if current.change_type == block.change_type
                && current.edited_by_user_id == block.edited_by_user_id
                && block.block_start <= current.block_end.saturating_add(gap).saturating_add(1)
            {
                current.before_text = join_text(current.before_text.take(), block.before_text);
                current.after_text = join_text(current.after_text.take(), block.after_text);
                current.block_end = current.block_end.max(block.block_end);
                continue;
            }
        }
        merged.push(block);
    }

    for (index, block) in merged.iter_mut().enumerate() {
        block.block_index = index;
    }
    merged
}

impl DiffStats {
    /// Line counts per kind; a modified block counts the longer of its two sides
    pub fn from_blocks(blocks: &[DiffBlock]) -> Self {
        let mut stats = Self::default();
        for block in blocks {
            let before = count_lines(block.before_text.as_deref());
            let after = count_lines(block.after_text.as_deref());
            match block.change_type {
                BlockChangeType::Added => stats.added += after,
                BlockChangeType::Removed => stats.removed += before,
                BlockChangeType::Modified => stats.modified += before.max(after),
            }
        }
        stats
    }

    pub fn total(&self) -> usize {
        self.added + self.removed + self.modified
    }

    pub fn has_changes(&self) -> bool {
        self.total() > 0
    }
}
