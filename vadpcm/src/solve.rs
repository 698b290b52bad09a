// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Predictor solver (§4.3): the 2x2 normal-equations solve that turns a
//! frame's (or cluster's) autocorrelation into AR(2) coefficients, plus the
//! `eval`/`eval_solved` error functions used throughout predictor assignment.

use crate::autocorrelate::Autocorrelation;

/// `eval(corr, coeff)` is the sum-of-squared-residuals an AR(2) predictor with
/// coefficients `coeff = (c0, c1)` would produce on the frame whose
/// autocorrelation is `corr`, computed without re-touching the samples.
///
/// Grounded on the identity `err = corr[0] + corr[2]*c0^2 + corr[5]*c1^2 +
/// 2*(corr[4]*c0*c1 - corr[1]*c0 - corr[3]*c1)`; see P3 for its relation to the
/// direct sum of squares.
pub fn eval(corr: &Autocorrelation, coeff: &[f32; 2]) -> f32 {
    let (c0, c1) = (coeff[0], coeff[1]);
    corr[0] + corr[2] * c0 * c0 + corr[5] * c1 * c1
        + 2.0 * (corr[4] * c0 * c1 - corr[1] * c0 - corr[3] * c1)
}

/// Shortcut form of `eval` that only needs the *solved* coefficients, avoiding
/// the `c0*c1` cross term (P5: agrees with `eval(corr, solve(corr))`).
pub fn eval_solved(corr: &[f64; 6], coeff: &[f64; 2]) -> f64 {
    corr[0] - corr[1] * coeff[0] - corr[3] * coeff[1]
}

/// Solve the 2x2 normal equations
/// ```text
/// [corr[2] corr[4]] [c0]   [corr[1]]
/// [corr[4] corr[5]] [c1] = [corr[3]]
/// ```
/// via Gaussian elimination with partial pivoting on the diagonal. Degenerate
/// matrices degrade gracefully (§4.3): a pivot at or below the relative
/// epsilon yields a zero coefficient rather than a division by a near-zero
/// value.
pub fn solve(corr: &[f64; 6]) -> [f64; 2] {
    let mut coeff = [0.0f64; 2];

    // The element with maximum absolute value is on the diagonal (Cauchy-Schwarz).
    let max = corr[0].max(corr[2]).max(corr[5]);
    let epsilon = max / 4096.0;

    // [a b | x]
    // [b c | y]
    let (mut a, b, mut c, mut x, mut y) = (corr[2], corr[4], corr[5], corr[1], corr[3]);

    // Partial pivoting. `a` and `c` are non-negative, so comparing magnitudes
    // is just comparing values. Pivoting this way is equivalent to relabeling
    // which unknown is solved for first, since the matrix is symmetric.
    let pivot = c > a;
    if pivot {
        std::mem::swap(&mut a, &mut c);
        std::mem::swap(&mut x, &mut y);
    }

    if a <= epsilon {
        // Matrix is close to zero: leave both coefficients at zero.
        return coeff;
    }

    // Multiply first row by 1/a: [1 b/a | x/a]
    let a1 = 1.0 / a;
    let b1 = b * a1;
    let x1 = x * a1;

    // Subtract first row * b from second row: [0 c-b1*b | y - x1*b]
    let c2 = c - b1 * b;
    let y2 = y - x1 * b;

    if c2.abs() <= epsilon {
        // Poorly conditioned or singular: fall back to a first-order solution.
        coeff[pivot as usize] = x1;
        return coeff;
    }

    // Multiply second row by 1/c2, then back-substitute.
    let y3 = y2 / c2;
    let x4 = x1 - y3 * b1;

    coeff[pivot as usize] = x4;
    coeff[!pivot as usize] = y3;
    coeff
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_MATRICES: [[f64; 6]; 8] = [
        // Simple positive definite matrices.
        [4.0, 1.0, 5.0, 2.0, 3.0, 6.0],
        [4.0, -1.0, 5.0, -2.0, -3.0, 6.0],
        [4.0, 1.0, 6.0, 2.0, 3.0, 5.0],
        // Singular matrices.
        [1.0, 0.5, 1.0, 0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0, 0.5, 0.0, 1.0],
        [1.0, 0.25, 2.0, 0.25, 2.0, 2.0],
        // Zero submatrix.
        [1.0, 0.0, 0.0, 0.0, 0.0, 0.0],
        // All zero.
        [0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    ];

    const OFFSETS: [[f32; 2]; 4] = [[1.0, 0.0], [0.0, 1.0], [-1.0, 0.0], [0.0, -1.0]];

    #[test]
    fn solve_is_a_local_minimum_p4_p5() {
        let offset_amt = 0.01f32;
        for corr in TEST_MATRICES {
            let coeff = solve(&corr);
            let corr32: Autocorrelation = corr.map(|v| v as f32);
            let coeff32 = [coeff[0] as f32, coeff[1] as f32];
            let error = eval(&corr32, &coeff32);
            assert!(error >= 0.0, "eval produced negative error for {:?}", corr);

            let min_error = error - error * (1.0 / 65536.0);
            for offset in OFFSETS {
                let perturbed =
                    [coeff32[0] + offset[0] * offset_amt, coeff32[1] + offset[1] * offset_amt];
                let perturbed_error = eval(&corr32, &perturbed);
                assert!(
                    perturbed_error >= min_error,
                    "perturbation {:?} decreased error below local minimum for {:?}",
                    offset,
                    corr
                );
            }

            // P5: eval_solved must agree with eval at the solved point.
            let shortcut = eval_solved(&corr, &coeff);
            let relative = (shortcut - error as f64).abs() / (error as f64).max(f64::MIN_POSITIVE);
            assert!(relative < 1.0 / 65536.0, "eval_solved disagreed for {:?}", corr);
        }
    }

    #[test]
    fn s4_scenario() {
        let corr = [4.0, 1.0, 5.0, 2.0, 3.0, 6.0];
        let coeff = solve(&corr);
        let corr32: Autocorrelation = corr.map(|v| v as f32);
        let coeff32 = [coeff[0] as f32, coeff[1] as f32];
        let error = eval(&corr32, &coeff32);
        let shortcut = eval_solved(&corr, &coeff);
        assert!((shortcut - error as f64).abs() / (error as f64) < 1.0 / 65536.0);
    }
}
