// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Stabilization (§4.4): project AR(2) coefficients onto the region that
//! guarantees a stable predictor (both characteristic roots inside the unit
//! circle) when they fall outside it.
//!
//! No reference implementation of this step survived in the retrieved source
//! (see DESIGN.md); the projection below follows the specification's explicit
//! formulas, including the c0 <= 0 branch mirrored from the c0 > 0 branch by
//! the symmetry `(c0, c1) <-> (-c0, c1)` of the stability triangle's other
//! edge.

/// Stabilize `(c0, c1)`, returning the (possibly unchanged) coefficients and
/// whether a projection occurred.
pub fn stabilize(c0: f64, c1: f64) -> ([f64; 2], bool) {
    if c1 < -1.0 {
        let new_c0 = c0.clamp(-1.0, 1.0);
        return ([new_c0, -1.0], true);
    }
    if c0 > 0.0 {
        if c0 + c1 > 1.0 {
            let d = (c1 - c0).clamp(-3.0, 1.0);
            return ([0.5 - 0.5 * d, 0.5 + 0.5 * d], true);
        }
    }
    else if c1 - c0 > 1.0 {
        let d = (c0 + c1).clamp(-1.0, 3.0);
        return ([-0.5 + 0.5 * d, 0.5 + 0.5 * d], true);
    }
    ([c0, c1], false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vectors::make_vectors;

    #[test]
    fn s5_scenario_projects_and_bounds_vectors() {
        let (coeff, changed) = stabilize(0.8, 0.6);
        assert!(changed);
        let [v0, v1] = make_vectors(coeff[0], coeff[1]);
        for value in v0.iter().chain(v1.iter()) {
            assert!(value.unsigned_abs() as i32 <= 2048, "vector entry {} out of bound", value);
        }
    }

    #[test]
    fn mirrored_c0_non_positive_branch() {
        let (coeff, changed) = stabilize(-0.8, 0.6);
        assert!(changed);
        let [v0, v1] = make_vectors(coeff[0], coeff[1]);
        for value in v0.iter().chain(v1.iter()) {
            assert!(value.unsigned_abs() as i32 <= 2048, "vector entry {} out of bound", value);
        }
    }

    #[test]
    fn in_region_coefficients_are_untouched() {
        let (coeff, changed) = stabilize(0.1, 0.2);
        assert!(!changed);
        assert_eq!(coeff, [0.1, 0.2]);
    }

    #[test]
    fn p6_grid_stays_bounded() {
        let steps = 41;
        for i in 0..steps {
            for j in 0..steps {
                let c0 = -2.0 + 4.0 * i as f64 / (steps - 1) as f64;
                let c1 = -2.0 + 4.0 * j as f64 / (steps - 1) as f64;
                let (coeff, _) = stabilize(c0, c1);
                let [v0, v1] = make_vectors(coeff[0], coeff[1]);
                for value in v0.iter().chain(v1.iter()) {
                    assert!(
                        value.unsigned_abs() as i32 <= 2048,
                        "c0={} c1={} produced out-of-bound vector entry {}",
                        c0,
                        c1,
                        value
                    );
                }
            }
        }
    }
}
