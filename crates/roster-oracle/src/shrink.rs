//! Failing-population minimizer.
//!
//! Given a population on which the program disagrees with the reference
//! oracle, re-runs the comparison on smaller sub-populations (delta
//! debugging) and keeps the smallest one that still fails:
//!
//! 1. **Binary partition**: remove chunks of decreasing size.
//! 2. **1-minimal**: try removing each remaining record individually.
//!
//! Relative order is always preserved, so stability failures survive
//! shrinking. Populations never shrink below one record.

use tracing::debug;

use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShrinkConfig {
    /// Upper bound on re-invocations of the failure predicate.
    pub max_invocations: usize,
    /// Run the one-at-a-time phase after binary partitioning.
    pub one_minimal: bool,
}

impl Default for ShrinkConfig {
    fn default() -> Self {
        Self {
            max_invocations: 200,
            one_minimal: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shrunk<T> {
    pub population: Vec<T>,
    pub invocations: usize,
}

/// Shrinks `population` while `still_fails` keeps returning `true`.
///
/// The input is assumed to fail already and is not re-checked.
///
/// # Errors
///
/// Propagates the first error returned by `still_fails`; a fatal error from
/// the program under test must abort the run, not just the shrink.
pub fn minimize_population<T, F>(
    population: &[T],
    config: &ShrinkConfig,
    mut still_fails: F,
) -> Result<Shrunk<T>>
where
    T: Clone,
    F: FnMut(&[T]) -> Result<bool>,
{
    let mut current = population.to_vec();
    let mut invocations = 0_usize;

    let mut granularity = 2;
    while granularity <= current.len() && invocations < config.max_invocations {
        let chunk_size = current.len().div_ceil(granularity);
        let mut reduced = false;

        for chunk_idx in 0..granularity {
            let start = chunk_idx * chunk_size;
            if start >= current.len() {
                break;
            }
            let end = (start + chunk_size).min(current.len());
            let mut candidate = Vec::with_capacity(current.len() - (end - start));
            candidate.extend_from_slice(&current[..start]);
            candidate.extend_from_slice(&current[end..]);
            if candidate.is_empty() {
                continue;
            }

            invocations += 1;
            if still_fails(&candidate)? {
                current = candidate;
                reduced = true;
                break;
            }
            if invocations >= config.max_invocations {
                break;
            }
        }

        if reduced {
            granularity = 2;
        } else {
            granularity *= 2;
        }
    }

    if config.one_minimal {
        let mut i = 0;
        while i < current.len() && current.len() > 1 && invocations < config.max_invocations {
            let mut candidate = current.clone();
            candidate.remove(i);
            invocations += 1;
            if still_fails(&candidate)? {
                current = candidate;
            } else {
                i += 1;
            }
        }
    }

    debug!(
        original = population.len(),
        shrunk = current.len(),
        invocations,
        "population minimized"
    );
    Ok(Shrunk {
        population: current,
        invocations,
    })
}
