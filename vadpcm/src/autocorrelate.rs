// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-frame autocorrelation (§4.2): the upper triangle of the 3x3 symmetric
//! matrix of lagged inner products within each 16-sample frame.

use crate::common::FRAME_SAMPLE_COUNT;

/// Upper triangle of the 3x3 symmetric autocorrelation matrix for one frame,
/// indexed `[0,1,3 / _,2,4 / _,_,5]`.
pub type Autocorrelation = [f32; 6];

const SAMPLE_SCALE: f32 = 1.0 / 32768.0;

/// Compute the autocorrelation vector for a single 16-sample frame.
///
/// Lag state is reset at the start of every frame: there is no carry of `x0`,
/// `x1`, `x2` across frame boundaries.
pub fn autocorrelate_frame(frame: &[i16; FRAME_SAMPLE_COUNT]) -> Autocorrelation {
    let mut x0 = 0.0f32;
    let mut x1 = 0.0f32;
    let mut x2 = 0.0f32;
    let mut m = [0.0f32; 6];
    for &sample in frame {
        let x = sample as f32 * SAMPLE_SCALE;
        x2 = x1;
        x1 = x0;
        x0 = x;
        m[0] += x0 * x0;
        m[1] += x1 * x0;
        m[2] += x1 * x1;
        m[3] += x2 * x0;
        m[4] += x2 * x1;
        m[5] += x2 * x2;
    }
    m
}

/// Compute the autocorrelation vector for every frame in `pcm`.
///
/// `pcm.len()` must be a multiple of [`FRAME_SAMPLE_COUNT`]; any remainder is
/// ignored (the top-level encoder only ever calls this with whole frames).
pub fn autocorrelate(pcm: &[i16]) -> Vec<Autocorrelation> {
    pcm.chunks_exact(FRAME_SAMPLE_COUNT)
        .map(|chunk| {
            let frame: [i16; FRAME_SAMPLE_COUNT] = chunk.try_into().unwrap();
            autocorrelate_frame(&frame)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solve::eval;
    use crate::state::Rng;

    #[test]
    fn eval_matches_direct_error_p3() {
        // P3: eval(corr(frame), coeff) must agree with a direct sum-of-squares
        // computation of the same AR(2) residual, to within 1e-4 relative error.
        let coeff = [0.5f32, 0.25f32];
        let mut rng = Rng(1);
        for _ in 0..10 {
            let mut data = [0i32; FRAME_SAMPLE_COUNT * 2];
            for pass in 0..=4 {
                let n = (FRAME_SAMPLE_COUNT * 2) >> pass;
                let step = 1usize << pass;
                for j in 0..n {
                    let s = (rng.0 >> 19) as i32 - (1 << 12);
                    rng = rng.advance();
                    for k in 0..step {
                        data[j * step + k] += s;
                    }
                }
            }
            let samples: Vec<i16> = data.iter().map(|&v| v as i16).collect();
            let frame: [i16; FRAME_SAMPLE_COUNT] =
                samples[FRAME_SAMPLE_COUNT..].try_into().unwrap();
            let corr = autocorrelate_frame(&frame);

            let mut s1 = samples[FRAME_SAMPLE_COUNT - 2] as f32 * SAMPLE_SCALE;
            let mut s2 = samples[FRAME_SAMPLE_COUNT - 1] as f32 * SAMPLE_SCALE;
            let mut error = 0.0f32;
            for i in 0..FRAME_SAMPLE_COUNT {
                let s = samples[FRAME_SAMPLE_COUNT + i] as f32 * SAMPLE_SCALE;
                let d = s - coeff[1] * s1 - coeff[0] * s2;
                error += d * d;
                s1 = s2;
                s2 = s;
            }
            let evaluated = eval(&corr, &coeff);
            let relative = (error - evaluated).abs() / (error + evaluated).max(f32::MIN_POSITIVE);
            assert!(relative < 1.0e-4, "relative error {} too large", relative);
        }
    }

    #[test]
    fn silence_has_zero_autocorrelation() {
        let frame = [0i16; FRAME_SAMPLE_COUNT];
        assert_eq!(autocorrelate_frame(&frame), [0.0f32; 6]);
    }
}
