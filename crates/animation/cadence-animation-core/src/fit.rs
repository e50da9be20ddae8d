//! Non-negative least-squares fit of gesture weights to a target skeleton.
//!
//! Each candidate gesture contributes one column of joint-DOF offsets from the rest pose;
//! the goal is the target's offset from rest. The system is solved with a truncated SVD.
//! Candidates that come back clearly negative are excluded and the solve repeats, so the
//! loop runs at most once per candidate plus one.

use nalgebra::{DMatrix, DVector};

use crate::config::FitterConfig;
use crate::skeleton::Skeleton;

/// Outcome of one fit.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FitResult {
    /// `(candidate index, weight)` for every kept candidate; weights are strictly positive.
    pub weights: Vec<(usize, f64)>,
    pub iterations: usize,
    /// Candidates dropped for negative weights, in exclusion order.
    pub excluded: Vec<usize>,
}

impl FitResult {
    pub fn weight_of(&self, candidate: usize) -> f64 {
        self.weights
            .iter()
            .find(|(k, _)| *k == candidate)
            .map(|(_, w)| *w)
            .unwrap_or(0.0)
    }

    /// True when every candidate was excluded (or there were none).
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

/// DOF offsets of `skeleton` from `rest`, four per rest joint. Joints are paired by index;
/// a joint missing from `skeleton` contributes zeros.
pub fn dof_offsets(skeleton: &Skeleton, rest: &Skeleton) -> DVector<f64> {
    let mut out = DVector::zeros(rest.len() * 4);
    for (j, rest_joint) in rest.joints().iter().enumerate() {
        let Some(joint) = skeleton.joints().get(j) else {
            continue;
        };
        let (a, r) = (joint.dofs(), rest_joint.dofs());
        for d in 0..4 {
            out[j * 4 + d] = a[d] - r[d];
        }
    }
    out
}

/// Weights on `candidates` whose rest-relative sum best reproduces `target`.
pub fn solve_gesture_weights(
    target: &Skeleton,
    rest: &Skeleton,
    candidates: &[&Skeleton],
    cfg: &FitterConfig,
) -> FitResult {
    let num_dof = rest.len() * 4;
    if num_dof == 0 || candidates.is_empty() {
        return FitResult::default();
    }

    let goal = dof_offsets(target, rest);
    let columns: Vec<DVector<f64>> = candidates.iter().map(|c| dof_offsets(c, rest)).collect();

    let mut excluded = vec![false; candidates.len()];
    let mut result = FitResult::default();
    loop {
        let active: Vec<usize> = (0..candidates.len()).filter(|&k| !excluded[k]).collect();
        if active.is_empty() {
            log::debug!("gesture fit: no eligible gestures after {} iterations", result.iterations);
            result.weights.clear();
            return result;
        }
        result.iterations += 1;

        let a = DMatrix::from_fn(num_dof, active.len(), |r, c| columns[active[c]][r]);
        let svd = a.svd(true, true);
        let eps = svd.singular_values.max() * cfg.svd_cutoff;
        let w = svd
            .solve(&goal, eps)
            .unwrap_or_else(|_| DVector::zeros(active.len()));

        let mut converged = true;
        result.weights.clear();
        for (c, &k) in active.iter().enumerate() {
            let wk = w[c];
            if wk < -cfg.weight_threshold {
                excluded[k] = true;
                result.excluded.push(k);
                converged = false;
            } else if wk > cfg.weight_threshold {
                result.weights.push((k, wk));
            }
        }

        if converged {
            log::debug!(
                "gesture fit converged in {} iterations with {} gestures",
                result.iterations,
                result.weights.len()
            );
            return result;
        }
    }
}
