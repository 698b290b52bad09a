// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Vector synthesis (§4.5): turn AR(2) coefficients into the pair of Q11
//! predictor vectors stored in the codebook, by simulating the predictor's
//! impulse response.

use crate::codebook::PredictorVector;
use crate::common::round_ties_even_clip_i16;

const SCALE: f64 = 2048.0; // 2^11

/// Synthesize `[v0, v1]` from AR(2) coefficients `(c0, c1)`.
///
/// `v0` is the impulse response to a unit sample two steps in the past
/// (`x2 = scale, x1 = 0`); `v1` to a unit sample one step in the past
/// (`x2 = 0, x1 = scale`).
pub fn make_vectors(c0: f64, c1: f64) -> [PredictorVector; 2] {
    [synthesize(c0, c1, 0.0, SCALE), synthesize(c0, c1, SCALE, 0.0)]
}

fn synthesize(c0: f64, c1: f64, mut x1: f64, mut x2: f64) -> PredictorVector {
    let mut vector = [0i16; 8];
    for slot in &mut vector {
        let x = c0 * x1 + c1 * x2;
        *slot = round_ties_even_clip_i16(x);
        x2 = x1;
        x1 = x;
    }
    vector
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_coefficients_produce_silence() {
        let [v0, v1] = make_vectors(0.0, 0.0);
        assert_eq!(v0, [0i16; 8]);
        assert_eq!(v1, [0i16; 8]);
    }

    #[test]
    fn pure_gain_through_v1_first_tap() {
        // c0 = 1, c1 = 0 means x[n] = x[n-1]; v1's first tap should carry the
        // full unit impulse forward.
        let [_, v1] = make_vectors(1.0, 0.0);
        assert_eq!(v1[0], 2048);
        assert_eq!(v1[1], 2048);
    }
}
