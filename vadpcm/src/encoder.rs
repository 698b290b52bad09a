// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The encoder inner loop (§4.8) and top-level encode pipeline (§4.9).

use crate::assign::assign_predictors;
use crate::autocorrelate::autocorrelate;
use crate::codebook::{build_codebook, Codebook};
use crate::common::{pack_nibble, FRAME_SAMPLE_COUNT, MAX_PREDICTOR_COUNT};
use crate::error::{self, invalid_params, Result};
use crate::state::{CarryState, EncoderState, Rng};

use log::{debug, warn};

/// Parameters controlling the top-level [`encode`] pipeline.
#[derive(Debug, Clone, Copy)]
pub struct EncodeParams {
    pub predictor_count: u8,
}

/// Signal- and error-power statistics collected while encoding, for SNR
/// reporting (§4.9, §4.11).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncodeStats {
    pub signal_ms: f64,
    pub error_ms: f64,
}

impl EncodeStats {
    /// Signal-to-noise ratio in decibels. Returns `f64::INFINITY` for
    /// perfectly lossless encodes (`error_ms == 0.0`).
    pub fn snr_db(&self) -> f64 {
        if self.error_ms == 0.0 {
            f64::INFINITY
        }
        else {
            10.0 * (self.signal_ms / self.error_ms).log10()
        }
    }
}

/// The smallest shift `S` in `0..=12` such that `min >> S >= -8` and
/// `max >> S <= 7`.
fn get_shift(mut min: i32, mut max: i32) -> u8 {
    let mut shift = 0u8;
    while shift < 12 && (min < -8 || max > 7) {
        min >>= 1;
        max >>= 1;
        shift += 1;
    }
    shift
}

/// Estimate the shift a frame needs by running the same accumulator
/// convolution as the trial encoder, but in one pass with full-precision
/// (infinite-shift) residuals, tracking the widest residual seen.
///
/// `next_two` supplies the two samples that stand in for the second
/// half-frame's predictor history; the reference implementation uses the raw
/// input samples here (not the true decoded history, which isn't known yet)
/// since this is only used to pick a shift, not to produce output.
fn estimate_shift(frame: &[i16; FRAME_SAMPLE_COUNT], v0: &[i16; 8], v1: &[i16; 8], carry: CarryState) -> u8 {
    let mut min = 0i32;
    let mut max = 0i32;
    let halves = [
        (carry.prev2 as i64, carry.prev1 as i64, &frame[0..8]),
        (frame[6] as i64, frame[7] as i64, &frame[8..16]),
    ];
    for (s0, s1, samples) in halves {
        let mut acc = [0i64; 8];
        for i in 0..8 {
            acc[i] = ((samples[i] as i64) << 11) - s0 * v0[i] as i64 - s1 * v1[i] as i64;
        }
        for i in 0..8 {
            let s = (acc[i] >> 11) as i32;
            min = min.min(s);
            max = max.max(s);
            for j in 0..(7 - i) {
                acc[i + 1 + j] -= (s as i64) * v1[j] as i64;
            }
        }
    }
    get_shift(min, max)
}

/// Trial-encode one frame at a fixed shift, returning the packed 9-byte
/// frame, the sum of squared error, and the carry-state after this frame.
fn trial_encode(
    frame: &[i16; FRAME_SAMPLE_COUNT],
    predictor: u8,
    v0: &[i16; 8],
    v1: &[i16; 8],
    shift: u8,
    carry: CarryState,
    rng: Rng,
) -> ([u8; 9], f64, CarryState, Rng) {
    let mut out = [0u8; 9];
    out[0] = (shift << 4) | predictor;

    let mut s0 = carry.prev2 as i64;
    let mut s1 = carry.prev1 as i64;
    let mut rng = rng;
    let mut error = 0.0f64;

    for half in 0..2 {
        let samples = &frame[half * 8..half * 8 + 8];
        let mut acc = [0i64; 8];
        for i in 0..8 {
            acc[i] = s0 * v0[i] as i64 + s1 * v1[i] as i64;
        }
        let mut residuals = [0i32; 8];
        for i in 0..8 {
            let sample = samples[i] as i64;
            let a = acc[i] >> 11;
            let bias = rng.bias(shift);
            rng = rng.advance();
            let r = (((sample - a + bias as i64) >> shift) as i32).clamp(-8, 7);
            residuals[i] = r;
            let sout_residual = (r as i64) << shift;
            for j in 0..(7 - i) {
                acc[i + 1 + j] += sout_residual * v1[j] as i64;
            }
            let sout = crate::common::saturate16((a as i32).wrapping_add(sout_residual as i32)) as i64;
            s0 = s1;
            s1 = sout;
            let serror = sample as f64 - sout as f64;
            error += serror * serror;
        }
        for i in 0..4 {
            let hi = pack_nibble(residuals[2 * i]);
            let lo = pack_nibble(residuals[2 * i + 1]);
            out[1 + half * 4 + i] = (hi << 4) | lo;
        }
    }

    (out, error, CarryState::new(s0 as i16, s1 as i16), rng)
}

/// Encode one 16-sample frame with a fixed predictor assignment, trying
/// shifts `S-1, S, S+1` (clamped to `0..=12`) and keeping whichever produces
/// the lowest squared error (§4.8).
pub fn encode_frame(
    frame: &[i16; FRAME_SAMPLE_COUNT],
    predictor: u8,
    codebook: &Codebook,
    state: &mut EncoderState,
) -> Result<([u8; 9], f64)> {
    let (v0, v1) = codebook.predictor(predictor as usize)?;
    let shift = estimate_shift(frame, v0, v1, state.samples);
    let min_shift = shift.saturating_sub(1);
    let max_shift = shift.saturating_add(1).min(12);

    let init_rng = state.rng;
    let mut best: Option<([u8; 9], f64, CarryState, Rng)> = None;
    for trial_shift in min_shift..=max_shift {
        let candidate = trial_encode(frame, predictor, v0, v1, trial_shift, state.samples, init_rng);
        let is_better = match &best {
            None => true,
            Some((_, best_error, _, _)) => candidate.1 < *best_error,
        };
        if is_better {
            best = Some(candidate);
        }
    }

    let (bytes, error, carry, rng) = best.expect("shift range is always non-empty");
    state.samples = carry;
    state.rng = rng;
    Ok((bytes, error))
}

/// Encode `pcm` (a multiple of 16 samples) frame by frame against a fixed
/// `predictors_per_frame` assignment and `codebook`, starting from `state`.
/// Low-level hook used directly by tests (§6).
pub fn encode_data(
    pcm: &[i16],
    predictors_per_frame: &[u8],
    codebook: &Codebook,
    state: &mut EncoderState,
) -> Result<(Vec<u8>, Vec<f64>)> {
    let frame_count = pcm.len() / FRAME_SAMPLE_COUNT;
    let mut frames = Vec::new();
    if frames.try_reserve_exact(frame_count * 9).is_err() {
        warn!("encode_data: failed to allocate frame buffer for {frame_count} frames");
        return error::memory();
    }
    let mut errors = Vec::new();
    if errors.try_reserve_exact(frame_count).is_err() {
        warn!("encode_data: failed to allocate error buffer for {frame_count} frames");
        return error::memory();
    }
    for (chunk, &predictor) in pcm.chunks_exact(FRAME_SAMPLE_COUNT).zip(predictors_per_frame) {
        let frame: [i16; FRAME_SAMPLE_COUNT] = chunk.try_into().unwrap();
        let (bytes, error) = encode_frame(&frame, predictor, codebook, state)?;
        frames.extend_from_slice(&bytes);
        errors.push(error);
    }
    Ok((frames, errors))
}

/// Top-level encode (§4.9): autocorrelate, assign predictors, build the
/// codebook, then encode every frame from a zeroed initial state.
pub fn encode(params: EncodeParams, pcm: &[i16]) -> Result<(Codebook, Vec<u8>, EncodeStats)> {
    let predictor_count = params.predictor_count as usize;
    if predictor_count < 1 || predictor_count > MAX_PREDICTOR_COUNT {
        warn!("encode: predictor count {predictor_count} out of range 1..=16");
        return invalid_params();
    }

    let frame_count = pcm.len() / FRAME_SAMPLE_COUNT;
    if frame_count == 0 {
        debug!("encode: empty input, returning zeroed codebook");
        let codebook = Codebook::zeroed(predictor_count)?;
        return Ok((codebook, Vec::new(), EncodeStats { signal_ms: 0.0, error_ms: 0.0 }));
    }
    debug!("encoding {frame_count} frames with {predictor_count} predictors");

    let corr = autocorrelate(pcm);
    let predictors = if predictor_count > 1 {
        assign_predictors(&corr, predictor_count).0
    }
    else {
        vec![0u8; frame_count]
    };
    let codebook = build_codebook(&corr, &predictors, predictor_count)?;

    let mut state = EncoderState::ZERO;
    let (frames, errors) = encode_data(pcm, &predictors, &codebook, &mut state)?;

    let sample_count = (frame_count * FRAME_SAMPLE_COUNT) as f64;
    let scale = 32768.0f64 * 32768.0;
    let signal_ms: f64 =
        pcm.iter().map(|&s| (s as f64) * (s as f64)).sum::<f64>() / sample_count / scale;
    let error_ms: f64 = errors.iter().sum::<f64>() / sample_count / scale;

    let stats = EncodeStats { signal_ms, error_ms };
    debug!("encode: snr = {:.2} dB", stats.snr_db());
    Ok((codebook, frames, stats))
}
