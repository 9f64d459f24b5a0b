//! Multi-start fitting over a grid of initial guesses.
//!
//! Each guess is fitted independently (in parallel). The winner is the
//! successful fit with the lowest SSE; ties break on grid index so the result
//! does not depend on thread scheduling.

use rayon::prelude::*;
use tracing::{debug, info};

use crate::domain::{FitResult, RationalParams, Sample};
use crate::fit::error::{FitError, FitOutcome};
use crate::fit::fitter::{CurveFitter, validate_samples};

/// Fit every guess and keep the best.
///
/// Input problems (too few samples, constant target) are reported once up
/// front. If every guess fails, the first guess's error is returned.
pub fn fit_multistart(
    fitter: &CurveFitter,
    samples: &[Sample],
    guesses: &[RationalParams],
) -> FitOutcome<FitResult> {
    validate_samples(samples)?;
    if guesses.is_empty() {
        return Err(FitError::InvalidInput("guess grid is empty".to_string()));
    }

    let outcomes: Vec<(usize, FitOutcome<FitResult>)> = guesses
        .par_iter()
        .enumerate()
        .map(|(idx, guess)| (idx, fitter.fit(samples, *guess)))
        .collect();

    let mut best: Option<(usize, &FitResult)> = None;
    for (idx, outcome) in &outcomes {
        match outcome {
            Ok(fit) => {
                let better = match best {
                    None => true,
                    Some((best_idx, b)) => fit.sse < b.sse || (fit.sse == b.sse && *idx < best_idx),
                };
                if better {
                    best = Some((*idx, fit));
                }
            }
            Err(e) => {
                let guess = guesses[*idx];
                debug!(idx, %guess, error = %e, "multistart guess failed");
            }
        }
    }

    match best {
        Some((idx, fit)) => {
            info!(
                guesses = guesses.len(),
                winner = idx,
                sse = fit.sse,
                "multistart fit selected"
            );
            Ok(fit.clone())
        }
        None => Err(outcomes
            .into_iter()
            .find_map(|(_, outcome)| outcome.err())
            .unwrap_or_else(|| FitError::Convergence("no guess converged".to_string()))),
    }
}
