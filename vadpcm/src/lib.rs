// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

//! VADPCM: a lossy, 16-bit PCM audio codec built around per-frame linear
//! prediction and a shared codebook of predictor vectors.
//!
//! Sixteen mono samples form one frame. A predictor index and a shift select
//! an AR(2) predictor (in Q11 fixed point) and a residual scale; the
//! remaining error is quantized to 4 bits per sample with a small amount of
//! error-feedback dither. The codebook (the set of predictor vectors shared
//! by an entire stream) must be known to the decoder; the sibling
//! `vadpcm-format` crate stores it alongside the encoded frames.

mod assign;
mod autocorrelate;
mod codebook;
mod common;
mod decoder;
mod encoder;
mod error;
mod solve;
mod stabilize;
mod state;
mod vectors;

pub use autocorrelate::{autocorrelate, autocorrelate_frame, Autocorrelation};
pub use codebook::{build_codebook, Codebook, PredictorVector};
pub use common::{FRAME_BYTE_COUNT, FRAME_SAMPLE_COUNT, MAX_PREDICTOR_COUNT, MAX_SHIFT, ORDER, Q11_SHIFT};
pub use decoder::decode;
pub use encoder::{encode, encode_data, encode_frame, EncodeParams, EncodeStats};
pub use error::{Result, VadpcmError};
pub use state::{CarryState, EncoderState, Rng};
