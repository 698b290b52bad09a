// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::error::Error as StdError;
use std::fmt;

/// `VadpcmError` enumerates every way a VADPCM codec operation can fail.
///
/// Numerical degeneracies (a singular autocorrelation matrix, an empty predictor
/// cluster, unstable coefficients) are not represented here: the codec resolves
/// them in place (zero predictor, zero vectors, projected coefficients) rather
/// than failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VadpcmError {
    /// A frame's header byte encoded a predictor index or shift out of range,
    /// or a residual could not be decoded.
    InvalidData,
    /// `order` was not 2, the only order this codec supports.
    LargeOrder,
    /// `predictor_count` exceeded 16.
    LargePredictorCount,
    /// A codebook's version field was not 1.
    UnknownVersion,
    /// Encoder parameters (e.g. `predictor_count`) were out of range.
    InvalidParams,
    /// Scratch allocation failed.
    Memory,
}

impl VadpcmError {
    fn as_str(&self) -> &'static str {
        match *self {
            VadpcmError::InvalidData => "invalid frame data",
            VadpcmError::LargeOrder => "predictor order is not supported",
            VadpcmError::LargePredictorCount => "predictor count exceeds maximum of 16",
            VadpcmError::UnknownVersion => "unknown codebook version",
            VadpcmError::InvalidParams => "invalid encoder parameters",
            VadpcmError::Memory => "scratch allocation failed",
        }
    }
}

impl fmt::Display for VadpcmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "vadpcm: {}", self.as_str())
    }
}

impl StdError for VadpcmError {}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, VadpcmError>;

pub(crate) fn invalid_data<T>() -> Result<T> {
    Err(VadpcmError::InvalidData)
}

pub(crate) fn large_order<T>() -> Result<T> {
    Err(VadpcmError::LargeOrder)
}

pub(crate) fn large_predictor_count<T>() -> Result<T> {
    Err(VadpcmError::LargePredictorCount)
}

pub(crate) fn invalid_params<T>() -> Result<T> {
    Err(VadpcmError::InvalidParams)
}

pub(crate) fn memory<T>() -> Result<T> {
    Err(VadpcmError::Memory)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_stable() {
        assert_eq!(VadpcmError::InvalidData.to_string(), "vadpcm: invalid frame data");
        assert_eq!(VadpcmError::LargeOrder.to_string(), "vadpcm: predictor order is not supported");
        assert_eq!(VadpcmError::Memory.to_string(), "vadpcm: scratch allocation failed");
    }

    #[test]
    fn memory_constructor_returns_memory_variant() {
        let result: Result<()> = memory();
        assert_eq!(result, Err(VadpcmError::Memory));
    }
}
