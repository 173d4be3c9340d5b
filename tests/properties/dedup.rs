//! Property tests for last-occurrence line deduplication.

use std::collections::HashSet;

use proptest::prelude::*;

use rireki::{dedup_keep_last, LineMultiset};

/// Lines from a tiny alphabet so duplicates are common, plus an optional
/// unterminated final fragment.
fn history_lines() -> impl Strategy<Value = Vec<String>> {
    let line = proptest::string::string_regex("[abc ]{0,3}").unwrap().boxed();
    (
        proptest::collection::vec(line.clone(), 0..40),
        proptest::option::of(line),
    )
        .prop_map(|(lines, tail)| {
            let mut lines: Vec<String> = lines.into_iter().map(|l| format!("{l}\n")).collect();
            if let Some(tail) = tail.filter(|t| !t.is_empty()) {
                lines.push(tail);
            }
            lines
        })
}

/// Keep line `i` only if the same value does not occur again later.
fn reference_dedup(lines: &[String]) -> Vec<String> {
    lines
        .iter()
        .enumerate()
        .filter(|(i, line)| !lines[i + 1..].contains(line))
        .map(|(_, line)| line.clone())
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: output matches "keep each value's last occurrence, in order".
    #[test]
    fn property_keeps_last_occurrence_in_order(lines in history_lines()) {
        let content = lines.concat();
        let expected = reference_dedup(&lines).concat();

        let actual = dedup_keep_last(content.as_bytes()).unwrap_or_else(|| content.clone().into_bytes());

        prop_assert_eq!(String::from_utf8(actual).unwrap(), expected);
    }

    /// PROPERTY: a second pass never finds anything left to remove.
    #[test]
    fn property_dedup_is_idempotent(lines in history_lines()) {
        let content = lines.concat();

        if let Some(once) = dedup_keep_last(content.as_bytes()) {
            prop_assert_eq!(dedup_keep_last(&once), None);
        }
    }

    /// PROPERTY: every distinct line survives exactly once.
    #[test]
    fn property_distinct_lines_survive_exactly_once(lines in history_lines()) {
        let content = lines.concat();
        let output = dedup_keep_last(content.as_bytes()).unwrap_or_else(|| content.clone().into_bytes());

        let before = LineMultiset::from_bytes(content.as_bytes());
        let after = LineMultiset::from_bytes(&output);

        prop_assert!(after.is_unique());
        prop_assert_eq!(after.len(), before.distinct());

        let input: HashSet<&String> = lines.iter().collect();
        for line in &input {
            prop_assert_eq!(after.count(line.as_bytes()), 1);
        }
    }

    /// PROPERTY: `None` is returned exactly when the input has no duplicates.
    #[test]
    fn property_none_means_already_unique(lines in history_lines()) {
        let content = lines.concat();
        let unique = LineMultiset::from_bytes(content.as_bytes()).is_unique();

        prop_assert_eq!(dedup_keep_last(content.as_bytes()).is_none(), unique);
    }
}
