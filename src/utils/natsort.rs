//! Natural ordering for file and directory names.
//!
//! Plain lexicographic ordering puts "Chapter 10" before "Chapter 9". The
//! natural key treats embedded digit runs as numbers, so chapter listings
//! come out in the order a human expects. Keys normalize `_` and `-` to
//! spaces, collapse whitespace, and lowercase before splitting into
//! alternating digit/non-digit runs.

use std::cmp::Ordering;

/// One run of a natural key: either a digit run or a text run.
///
/// Digit runs store the zero-trimmed digits plus their length, so two runs
/// compare numerically (shorter trimmed run is smaller; equal lengths fall
/// back to lexicographic digit comparison) without ever parsing into a
/// fixed-width integer. Variant order makes numbers sort before text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Segment {
    /// Digit run, leading zeros stripped. "000" becomes `{ magnitude: 0, digits: "" }`.
    Number {
        /// Length of the zero-trimmed digit string.
        magnitude: usize,
        /// The zero-trimmed digits themselves.
        digits: String,
    },
    /// Non-digit run, already lowercased.
    Text(String),
}

/// Comparable natural-ordering key derived from a name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct NaturalKey(Vec<Segment>);

/// Builds the natural key for `name`.
#[must_use]
pub fn natural_key(name: &str) -> NaturalKey {
    let normalized: String = name
        .chars()
        .map(|c| if c == '_' || c == '-' { ' ' } else { c })
        .collect();
    let collapsed = normalized
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    let mut segments = Vec::new();
    let mut run = String::new();
    let mut run_is_digits = false;

    for ch in collapsed.chars() {
        let is_digit = ch.is_ascii_digit();
        if !run.is_empty() && is_digit != run_is_digits {
            segments.push(make_segment(std::mem::take(&mut run), run_is_digits));
        }
        run_is_digits = is_digit;
        run.push(ch);
    }
    if !run.is_empty() {
        segments.push(make_segment(run, run_is_digits));
    }

    NaturalKey(segments)
}

/// Compares two names by natural order.
#[must_use]
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    natural_key(a).cmp(&natural_key(b))
}

/// Converts a finished run into a [`Segment`].
fn make_segment(run: String, is_digits: bool) -> Segment {
    if is_digits {
        let trimmed = run.trim_start_matches('0');
        Segment::Number {
            magnitude: trimmed.len(),
            digits: trimmed.to_string(),
        }
    } else {
        Segment::Text(run)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_runs_compare_numerically() {
        assert_eq!(natural_cmp("Ch9", "Ch10"), Ordering::Less);
        assert_eq!(natural_cmp("Chapter 2", "Chapter 10"), Ordering::Less);
        assert_eq!(natural_cmp("Ch10", "Ch10"), Ordering::Equal);
    }

    #[test]
    fn sorts_sample_chapter_names() {
        let mut names = vec!["Ch1", "Ch10", "Ch2"];
        names.sort_by(|a, b| natural_cmp(a, b));
        assert_eq!(names, vec!["Ch1", "Ch2", "Ch10"]);
    }

    #[test]
    fn separators_normalize_to_spaces() {
        assert_eq!(natural_cmp("vol_1", "vol 1"), Ordering::Equal);
        assert_eq!(natural_cmp("vol-2", "vol 2"), Ordering::Equal);
        assert_eq!(natural_cmp("vol  3", "vol 3"), Ordering::Equal);
    }

    #[test]
    fn comparison_is_case_insensitive() {
        assert_eq!(natural_cmp("CHAPTER 1", "chapter 1"), Ordering::Equal);
    }

    #[test]
    fn leading_zeros_do_not_change_value() {
        assert_eq!(natural_cmp("ch007", "ch7"), Ordering::Equal);
        assert_eq!(natural_cmp("ch007", "ch8"), Ordering::Less);
        assert_eq!(natural_cmp("ch000", "ch0"), Ordering::Equal);
    }

    #[test]
    fn huge_digit_runs_do_not_overflow() {
        let a = format!("ch{}", "9".repeat(60));
        let b = format!("ch1{}", "0".repeat(60));
        assert_eq!(natural_cmp(&a, &b), Ordering::Less);
    }

    #[test]
    fn numbers_order_before_text() {
        assert_eq!(natural_cmp("1 extra", "extra"), Ordering::Less);
    }
}
