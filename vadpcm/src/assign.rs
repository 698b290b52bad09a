// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Predictor assignment (§4.6): an iterative k-means-style clustering of
//! frames over their autocorrelation vectors, minimizing total `eval` error.

use crate::autocorrelate::Autocorrelation;
use crate::solve::{eval, solve};
use crate::stabilize::stabilize;

const ITERATIONS: usize = 20;

/// The irreducible per-frame error floor: the error each frame would have
/// under its own individually optimal predictor (§4.6 step 1).
pub fn best_error(corr: &[Autocorrelation]) -> Vec<f32> {
    corr.iter()
        .map(|frame| {
            let fcorr: [f64; 6] = frame.map(|v| v as f64);
            let coeff = solve(&fcorr);
            let coeff32 = [coeff[0] as f32, coeff[1] as f32];
            eval(frame, &coeff32)
        })
        .collect()
}

/// Mean autocorrelation per predictor over the frames currently assigned to
/// it. Frames whose `predictors[frame] >= predictor_count` are ignored (this
/// never happens from [`assign_predictors`] itself, but keeps the function
/// well-defined for arbitrary input).
pub(crate) fn mean_corrs(
    corr: &[Autocorrelation],
    predictors: &[u8],
    predictor_count: usize,
) -> (Vec<[f64; 6]>, Vec<usize>) {
    let mut sums = vec![[0.0f64; 6]; predictor_count];
    let mut counts = vec![0usize; predictor_count];
    for (frame, &p) in corr.iter().zip(predictors) {
        let p = p as usize;
        if p < predictor_count {
            counts[p] += 1;
            for j in 0..6 {
                sums[p][j] += frame[j] as f64;
            }
        }
    }
    for (sum, &count) in sums.iter_mut().zip(&counts) {
        if count > 0 {
            let scale = 1.0 / count as f64;
            for v in sum.iter_mut() {
                *v *= scale;
            }
        }
    }
    (sums, counts)
}

/// Solve and stabilize each non-empty cluster's mean autocorrelation,
/// down-converting to 32-bit float coefficients (§4.6 step 3a). Empty
/// clusters (`count == 0`) are dropped rather than producing a coefficient.
pub(crate) fn solve_cluster_coeffs(pcorr: &[[f64; 6]], counts: &[usize]) -> Vec<[f32; 2]> {
    pcorr
        .iter()
        .zip(counts)
        .filter(|(_, &count)| count > 0)
        .map(|(cluster_corr, _)| {
            let coeff = solve(cluster_corr);
            let (coeff, _changed) = stabilize(coeff[0], coeff[1]);
            [coeff[0] as f32, coeff[1] as f32]
        })
        .collect()
}

/// Re-solve each active cluster's predictor, reassign every frame to its best
/// cluster, and report either the first cluster that ended up empty, or
/// `active_count` if none did.
fn refine(
    corr: &[Autocorrelation],
    active_count: usize,
    error: &mut [f32],
    predictors: &mut [u8],
) -> usize {
    let (pcorr, counts) = mean_corrs(corr, predictors, active_count);
    let coeffs = solve_cluster_coeffs(&pcorr, &counts);
    let active_count = coeffs.len();

    let mut counts2 = vec![0usize; active_count];
    for (frame_idx, frame_corr) in corr.iter().enumerate() {
        let mut best_predictor = 0usize;
        let mut best = 0.0f32;
        for (i, coeff) in coeffs.iter().enumerate() {
            let e = eval(frame_corr, coeff);
            if i == 0 || e < best {
                best_predictor = i;
                best = e;
            }
        }
        predictors[frame_idx] = best_predictor as u8;
        error[frame_idx] = best;
        counts2[best_predictor] += 1;
    }

    counts2.iter().position(|&c| c == 0).unwrap_or(active_count)
}

/// Assign every frame to one of `predictor_count` clusters, minimizing total
/// `eval` error, via 20 iterations of worst-frame reassignment plus
/// cluster-mean refinement (§4.6).
///
/// Returns `(predictors_per_frame, best_error_per_frame)`.
pub fn assign_predictors(corr: &[Autocorrelation], predictor_count: usize) -> (Vec<u8>, Vec<f32>) {
    let frame_count = corr.len();
    let mut predictors = vec![0u8; frame_count];
    let floor = best_error(corr);

    if predictor_count <= 1 || frame_count == 0 {
        return (predictors, floor);
    }

    let mut error = floor.clone();
    let mut unassigned = predictor_count;
    let mut active_count = 1usize;

    for _ in 0..ITERATIONS {
        if unassigned < predictor_count {
            let worst = worst_frame(&floor, &error);
            predictors[worst] = unassigned as u8;
            if unassigned >= active_count {
                active_count = unassigned + 1;
            }
        }
        unassigned = refine(corr, active_count, &mut error, &mut predictors);
    }

    (predictors, floor)
}

fn worst_frame(best_error: &[f32], error: &[f32]) -> usize {
    let mut best_improvement = error[0] - best_error[0];
    let mut best_index = 0;
    for frame in 1..error.len() {
        let improvement = error[frame] - best_error[frame];
        if improvement > best_improvement {
            best_improvement = improvement;
            best_index = frame;
        }
    }
    best_index
}
