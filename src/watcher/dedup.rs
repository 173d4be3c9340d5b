//! Line-level deduplication that keeps the last occurrence of each line
//!
//! A line is a run of bytes ending in `\n`, terminator included. A final
//! fragment without terminator is a line of its own, so `"a\n"` and a
//! trailing `"a"` are different values. Content is never decoded: anything
//! that is not line-oriented text is simply partitioned on `\n`.

use std::collections::HashMap;

/// Ordered lines of a file plus the number of occurrences of each value.
#[derive(Debug, Clone)]
pub struct LineMultiset<'a> {
    lines: Vec<&'a [u8]>,
    counts: HashMap<&'a [u8], usize>,
}

impl<'a> LineMultiset<'a> {
    pub fn from_bytes(content: &'a [u8]) -> Self {
        let lines: Vec<&[u8]> = content.split_inclusive(|&b| b == b'\n').collect();
        let mut counts = HashMap::with_capacity(lines.len());
        for line in &lines {
            *counts.entry(*line).or_insert(0) += 1;
        }
        Self { lines, counts }
    }

    /// Total number of lines, duplicates included
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct line values
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    pub fn count(&self, line: &[u8]) -> usize {
        self.counts.get(line).copied().unwrap_or(0)
    }

    /// True when no line value occurs more than once.
    pub fn is_unique(&self) -> bool {
        self.counts.len() == self.lines.len()
    }

    /// Lines with the earliest `n - 1` occurrences of every value dropped.
    ///
    /// The surviving occurrence of each value is its last one, and survivors
    /// keep their original relative order.
    pub fn retain_last(&self) -> Vec<&'a [u8]> {
        let mut remaining = self.counts.clone();
        self.lines
            .iter()
            .copied()
            .filter(|line| match remaining.get_mut(line) {
                Some(left) if *left > 1 => {
                    *left -= 1;
                    false
                }
                _ => true,
            })
            .collect()
    }
}

/// Deduplicate `content`, returning `None` when every line is already unique.
pub fn dedup_keep_last(content: &[u8]) -> Option<Vec<u8>> {
    let lines = LineMultiset::from_bytes(content);
    if lines.is_unique() {
        return None;
    }
    Some(lines.retain_last().concat())
}
