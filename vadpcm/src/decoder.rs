// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The bit-exact VADPCM decoder (§4.1).

use crate::codebook::Codebook;
use crate::common::{
    saturate16, unpack_residuals, FRAME_BYTE_COUNT, FRAME_SAMPLE_COUNT, MAX_PREDICTOR_COUNT,
    MAX_SHIFT, ORDER,
};
use crate::error::{self, Result, VadpcmError};
use crate::state::CarryState;

use log::{debug, warn};

/// Decode `frames` (a contiguous stream of 9-byte VADPCM frames) into PCM
/// samples, starting from `state` and advancing it frame by frame.
///
/// `codebook.order` must be 2 and `codebook.predictor_count()` must not
/// exceed 16, or this returns [`VadpcmError::LargeOrder`] /
/// [`VadpcmError::LargePredictorCount`] without touching `state` or producing
/// any output. A malformed frame header (`predictor >= predictor_count` or
/// `shift > 12`) fails with [`VadpcmError::InvalidData`]; samples already
/// decoded from earlier frames in the same call are still returned to the
/// caller via the `Err`'s absence of output — the operation is frame-atomic,
/// not call-atomic, but this function only reports success or failure for the
/// whole stream, so a caller wanting partial output on failure should decode
/// frame-by-frame itself via repeated 9-byte slices.
pub fn decode(codebook: &Codebook, state: &mut CarryState, frames: &[u8]) -> Result<Vec<i16>> {
    if codebook.order as usize != ORDER {
        warn!("decode: unsupported predictor order {}", codebook.order);
        return error::large_order();
    }
    if codebook.predictor_count() > MAX_PREDICTOR_COUNT {
        warn!("decode: predictor count {} exceeds maximum", codebook.predictor_count());
        return error::large_predictor_count();
    }
    if frames.len() % FRAME_BYTE_COUNT != 0 {
        warn!("decode: frame stream length {} is not a multiple of {FRAME_BYTE_COUNT}", frames.len());
        return error::invalid_data();
    }

    let frame_count = frames.len() / FRAME_BYTE_COUNT;
    debug!("decoding {frame_count} frames");
    let mut out = Vec::with_capacity(frame_count * FRAME_SAMPLE_COUNT);
    for chunk in frames.chunks_exact(FRAME_BYTE_COUNT) {
        decode_frame(codebook, state, chunk, &mut out)?;
    }
    Ok(out)
}

fn decode_frame(
    codebook: &Codebook,
    state: &mut CarryState,
    frame: &[u8],
    out: &mut Vec<i16>,
) -> Result<()> {
    let header = frame[0];
    let shift = header >> 4;
    let predictor = (header & 0x0f) as usize;
    if shift > MAX_SHIFT {
        return Err(VadpcmError::InvalidData);
    }
    let (v0, v1) = codebook.predictor(predictor).map_err(|_| VadpcmError::InvalidData)?;

    let mut payload = [0u8; 8];
    payload.copy_from_slice(&frame[1..9]);
    let residuals = unpack_residuals(&payload);

    decode_half_frame(v0, v1, shift, &residuals[0..8], state, out);
    decode_half_frame(v0, v1, shift, &residuals[8..16], state, out);
    Ok(())
}

/// Decode one 8-sample half-frame, given the fixed predictor vectors for this
/// frame's assigned predictor.
///
/// The accumulator convolution below mirrors the encoder's forward model
/// (§4.8) exactly: `acc[i]` starts as the contribution of carried history
/// through `v0`/`v1`, and as each residual is decoded its scaled value is
/// folded forward into the remaining taps via `v1`, so later samples in the
/// half-frame see the cumulative effect of every earlier residual without
/// recomputing the history convolution from scratch.
fn decode_half_frame(
    v0: &[i16; 8],
    v1: &[i16; 8],
    shift: u8,
    residuals: &[i32],
    state: &mut CarryState,
    out: &mut Vec<i16>,
) {
    let mut acc = [0i64; 8];
    let s0 = state.prev2 as i64;
    let s1 = state.prev1 as i64;
    for i in 0..8 {
        acc[i] = s0 * v0[i] as i64 + s1 * v1[i] as i64;
    }

    for i in 0..8 {
        let scaled_residual = (residuals[i] as i64) << shift;
        let sample = saturate16(((acc[i] >> 11) as i32).wrapping_add(scaled_residual as i32));
        for j in 0..(7 - i) {
            acc[i + 1 + j] += scaled_residual * v1[j] as i64;
        }
        out.push(sample);
        state.prev2 = state.prev1;
        state.prev1 = sample;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codebook::Codebook;

    fn codebook_v1_first_tap(v1_first: i16) -> Codebook {
        let v0 = [0i16; 8];
        let mut v1 = [0i16; 8];
        v1[0] = v1_first;
        Codebook::new(1, vec![v0, v1]).unwrap()
    }

    #[test]
    fn s1_all_zero_frame_decodes_to_silence() {
        let codebook = codebook_v1_first_tap(2048);
        let mut state = CarryState::ZERO;
        let mut frame = [0u8; FRAME_BYTE_COUNT];
        frame[0] = 0x00;
        let samples = decode(&codebook, &mut state, &frame).unwrap();
        assert_eq!(samples, vec![0i16; FRAME_SAMPLE_COUNT]);
    }

    #[test]
    fn s2_scenario_direct_simulation() {
        // byte0 = 0x10 (S=1, P=0), all residuals = +1 (0x11 repeated).
        //
        // Tracing the accumulator convolution by hand: only v1[0] is nonzero,
        // so each step's scaled residual (+2) only ever contributes to the
        // very next accumulator slot, not to every later one. The first
        // sample of each half-frame sees whatever history the previous
        // half-frame carried forward (0, then 4 from history), and every
        // later sample in a half-frame sees a steady-state accumulator of
        // 4096 (2 in Q11, plus the +2 residual = 4). This does not produce a
        // monotone ramp to 32; it produces 2,4,4,4,4,4,4,4 then 6,4,4,4,4,4,4,4.
        let codebook = codebook_v1_first_tap(2048);
        let mut state = CarryState::ZERO;
        let mut frame = [0x11u8; FRAME_BYTE_COUNT];
        frame[0] = 0x10;
        let samples = decode(&codebook, &mut state, &frame).unwrap();
        let expected = [2, 4, 4, 4, 4, 4, 4, 4, 6, 4, 4, 4, 4, 4, 4, 4];
        assert_eq!(samples, expected);
    }

    #[test]
    fn monotone_ramp_requires_a_flat_v1() {
        // A true "integrator" response (y[n] = y[n-1] + 2) requires every tap
        // of v1 to carry the residual forward, not just the first.
        let v0 = [0i16; 8];
        let v1 = [2048i16; 8];
        let codebook = Codebook::new(1, vec![v0, v1]).unwrap();
        let mut state = CarryState::ZERO;
        let mut frame = [0x11u8; FRAME_BYTE_COUNT];
        frame[0] = 0x10;
        let samples = decode(&codebook, &mut state, &frame).unwrap();
        let expected: Vec<i16> = (1..=16).map(|n| 2 * n).collect();
        assert_eq!(samples, expected);
    }

    #[test]
    fn rejects_out_of_range_predictor() {
        let codebook = codebook_v1_first_tap(2048);
        let mut state = CarryState::ZERO;
        let mut frame = [0u8; FRAME_BYTE_COUNT];
        frame[0] = 0x01; // predictor index 1, but predictor_count == 1
        assert_eq!(decode(&codebook, &mut state, &frame), Err(VadpcmError::InvalidData));
    }

    #[test]
    fn rejects_shift_above_twelve() {
        let codebook = codebook_v1_first_tap(2048);
        let mut state = CarryState::ZERO;
        let mut frame = [0u8; FRAME_BYTE_COUNT];
        frame[0] = 0xd0; // shift 13
        assert_eq!(decode(&codebook, &mut state, &frame), Err(VadpcmError::InvalidData));
    }

    #[test]
    fn rejects_truncated_stream() {
        let codebook = codebook_v1_first_tap(2048);
        let mut state = CarryState::ZERO;
        let frame = [0u8; FRAME_BYTE_COUNT - 1];
        assert_eq!(decode(&codebook, &mut state, &frame), Err(VadpcmError::InvalidData));
    }
}
