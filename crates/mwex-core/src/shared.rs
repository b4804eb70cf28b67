//! Separators and small parsing helpers shared across the pipeline

use crate::error::{PipelineError, PipelineResult};

/// Separates factors inside a token (`form|lemma|tag|id|parent`)
pub const SEP_FACTORS: char = '|';
/// Separates tokens inside a line
pub const SEP_WORDS: char = ' ';
/// Separates the two bounds of a range argument
pub const SEP_RANGE: char = '-';
/// Separates the per-slot pieces of a regex filter argument
pub const SEP_REGEXPS: char = ':';
/// Separates the tab-delimited sections of candidate and statistics lines
pub const SEP_SECTIONS: char = '\t';

/// Positions of each factor in a corpus token
pub const FORM: usize = 0;
pub const LEMMA: usize = 1;
pub const TAG: usize = 2;
pub const ID: usize = 3;
pub const PARENT_ID: usize = 4;
pub const FUNCTION: usize = 5;

/// Parse a `min-max` range argument
///
/// A single value `min` implies an unbounded maximum.
pub fn parse_range(s: &str) -> PipelineResult<(i64, i64)> {
    let parse_bound = |piece: &str| {
        piece
            .parse::<i64>()
            .map_err(|e| PipelineError::parse(format!("range '{s}'"), e.to_string()))
    };
    match s.find(SEP_RANGE) {
        None => Ok((parse_bound(s)?, i64::MAX)),
        Some(pos) => Ok((parse_bound(&s[..pos])?, parse_bound(&s[pos + 1..])?)),
    }
}

/// Split a string on the last occurrence of a separator
///
/// Used for `type:count` context entries, where the type itself may contain
/// the separator.
pub fn split_pair(s: &str, sep: char) -> (&str, &str) {
    match s.rfind(sep) {
        Some(pos) => (&s[..pos], &s[pos + 1..]),
        None => (s, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_range_pair() {
        assert_eq!(parse_range("1-2").unwrap(), (1, 2));
        assert_eq!(parse_range("3-90").unwrap(), (3, 90));
    }

    #[test]
    fn test_parse_range_single_value_is_unbounded() {
        assert_eq!(parse_range("9").unwrap(), (9, i64::MAX));
    }

    #[test]
    fn test_parse_range_rejects_garbage() {
        assert!(parse_range("x-3").is_err());
        assert!(parse_range("").is_err());
    }

    #[test]
    fn test_split_pair_on_last_separator() {
        assert_eq!(split_pair("cat|NN:3", ':'), ("cat|NN", "3"));
        assert_eq!(split_pair("a:b:7", ':'), ("a:b", "7"));
        assert_eq!(split_pair("nosep", ':'), ("nosep", ""));
    }
}
