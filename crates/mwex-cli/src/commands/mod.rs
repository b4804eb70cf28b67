//! Subcommand implementations

pub mod extract;
pub mod filter;
pub mod scores;
pub mod statistics;

use mwex_core::{PipelineError, PipelineResult};
use mwex_extract::AdjacencyMode;

/// Resolve the `-d`/`-s` flag pair into an adjacency mode
pub(crate) fn resolve_mode(dependency: bool, surface: bool) -> PipelineResult<AdjacencyMode> {
    match (dependency, surface) {
        (true, false) => Ok(AdjacencyMode::Dependency),
        (false, true) => Ok(AdjacencyMode::Surface),
        _ => Err(PipelineError::config(
            "choose between dependency (-d) and surface (-s) extraction",
        )),
    }
}

/// Resolve distance-range options to the effective `[surf_min, surf_max]`
///
/// `--adjacent` pins both bounds to `n - 1`; an absent range defaults to
/// `[n - 1, unbounded]`.
pub(crate) fn resolve_distance_range(
    n: usize,
    adjacent: bool,
    range: Option<&str>,
) -> PipelineResult<(i64, i64)> {
    if adjacent {
        let d = (n - 1) as i64;
        return Ok((d, d));
    }
    match range {
        Some(r) => mwex_core::shared::parse_range(r),
        None => Ok(((n - 1) as i64, i64::MAX)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_requires_exactly_one_flag() {
        assert!(resolve_mode(false, false).is_err());
        assert!(resolve_mode(true, true).is_err());
        assert_eq!(resolve_mode(true, false).unwrap(), AdjacencyMode::Dependency);
        assert_eq!(resolve_mode(false, true).unwrap(), AdjacencyMode::Surface);
    }

    #[test]
    fn test_adjacent_pins_both_bounds() {
        assert_eq!(resolve_distance_range(3, true, None).unwrap(), (2, 2));
        // Adjacent wins over an explicit range, matching the front-end
        assert_eq!(resolve_distance_range(3, true, Some("1-9")).unwrap(), (2, 2));
    }

    #[test]
    fn test_default_range_is_adjacent_to_unbounded() {
        assert_eq!(resolve_distance_range(2, false, None).unwrap(), (1, i64::MAX));
    }

    #[test]
    fn test_explicit_range_is_parsed() {
        assert_eq!(resolve_distance_range(2, false, Some("1-4")).unwrap(), (1, 4));
    }
}
