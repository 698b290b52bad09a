// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Codebook representation and its external wire format, as stored in the
//! AIFF-C `APPL` "VADPCMCODES" chunk (§6).

use crate::assign::mean_corrs;
use crate::autocorrelate::Autocorrelation;
use crate::common::{MAX_PREDICTOR_COUNT, ORDER};
use crate::error::{Result, VadpcmError};
use crate::solve::solve;
use crate::vectors::make_vectors;

/// A single predictor vector: 8 signed 16-bit Q11 coefficients.
pub type PredictorVector = [i16; 8];

/// A VADPCM codebook: `order * predictor_count` predictor vectors.
///
/// `order` is always 2 for this codec; the field exists so the wire format's
/// `order` value round-trips even though every operation in this crate is
/// specialized to order 2 (`LargeOrder` is returned wherever a caller-supplied
/// order is validated).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Codebook {
    pub order: u16,
    pub predictor_count: u16,
    vectors: Vec<PredictorVector>,
}

impl Codebook {
    /// Build a codebook from `order * predictor_count` vectors in `(v0, v1)`
    /// pairs per predictor.
    pub fn new(predictor_count: usize, vectors: Vec<PredictorVector>) -> Result<Self> {
        if predictor_count > MAX_PREDICTOR_COUNT {
            return Err(VadpcmError::LargePredictorCount);
        }
        if vectors.len() != predictor_count * ORDER {
            return Err(VadpcmError::InvalidData);
        }
        Ok(Codebook { order: ORDER as u16, predictor_count: predictor_count as u16, vectors })
    }

    /// Zero-filled codebook of `predictor_count` predictors.
    pub fn zeroed(predictor_count: usize) -> Result<Self> {
        if predictor_count > MAX_PREDICTOR_COUNT {
            return Err(VadpcmError::LargePredictorCount);
        }
        Ok(Codebook {
            order: ORDER as u16,
            predictor_count: predictor_count as u16,
            vectors: vec![[0i16; 8]; predictor_count * ORDER],
        })
    }

    pub fn predictor_count(&self) -> usize {
        self.predictor_count as usize
    }

    /// The `(v0, v1)` vector pair for predictor `p`.
    pub fn predictor(&self, p: usize) -> Result<(&PredictorVector, &PredictorVector)> {
        if p >= self.predictor_count() {
            return Err(VadpcmError::InvalidData);
        }
        Ok((&self.vectors[2 * p], &self.vectors[2 * p + 1]))
    }

    pub fn vectors(&self) -> &[PredictorVector] {
        &self.vectors
    }

    /// Serialize to the APPL "VADPCMCODES" payload format: u16 version(1),
    /// u16 order, u16 predictor_count, then `order*predictor_count` vectors of
    /// 8 big-endian i16 each.
    pub fn to_wire(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(6 + 16 * self.vectors.len());
        out.extend_from_slice(&1u16.to_be_bytes());
        out.extend_from_slice(&self.order.to_be_bytes());
        out.extend_from_slice(&self.predictor_count.to_be_bytes());
        for vector in &self.vectors {
            for &sample in vector {
                out.extend_from_slice(&sample.to_be_bytes());
            }
        }
        out
    }

    /// Parse a codebook from the APPL "VADPCMCODES" payload format.
    pub fn from_wire(data: &[u8]) -> Result<Self> {
        if data.len() < 6 {
            return Err(VadpcmError::InvalidData);
        }
        let version = u16::from_be_bytes([data[0], data[1]]);
        if version != 1 {
            return Err(VadpcmError::UnknownVersion);
        }
        let order = u16::from_be_bytes([data[2], data[3]]);
        if order as usize != ORDER {
            return Err(VadpcmError::LargeOrder);
        }
        let predictor_count = u16::from_be_bytes([data[4], data[5]]);
        if predictor_count as usize > MAX_PREDICTOR_COUNT || predictor_count == 0 {
            return Err(VadpcmError::LargePredictorCount);
        }
        let vector_count = order as usize * predictor_count as usize;
        let body = &data[6..];
        if body.len() < vector_count * 16 {
            return Err(VadpcmError::InvalidData);
        }
        let mut vectors = Vec::with_capacity(vector_count);
        for chunk in body[..vector_count * 16].chunks_exact(16) {
            let mut vector = [0i16; 8];
            for (i, pair) in chunk.chunks_exact(2).enumerate() {
                vector[i] = i16::from_be_bytes([pair[0], pair[1]]);
            }
            vectors.push(vector);
        }
        Ok(Codebook { order, predictor_count, vectors })
    }
}

/// Build the final codebook from a frame-to-predictor assignment (§4.7): each
/// predictor's vectors are synthesized from the mean autocorrelation of the
/// frames assigned to it, with no stabilization (that happens during
/// assignment's own refinement step, not here). Predictors with no frames
/// assigned get zero vectors.
pub fn build_codebook(
    corr: &[Autocorrelation],
    predictors: &[u8],
    predictor_count: usize,
) -> Result<Codebook> {
    let (pcorr, counts) = mean_corrs(corr, predictors, predictor_count);
    let mut vectors = Vec::with_capacity(predictor_count * ORDER);
    for (cluster_corr, &count) in pcorr.iter().zip(&counts) {
        if count > 0 {
            let coeff = solve(cluster_corr);
            let [v0, v1] = make_vectors(coeff[0], coeff[1]);
            vectors.push(v0);
            vectors.push(v1);
        }
        else {
            vectors.push([0i16; 8]);
            vectors.push([0i16; 8]);
        }
    }
    Codebook::new(predictor_count, vectors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_round_trip() {
        let vectors: Vec<PredictorVector> = (0..6)
            .map(|i| {
                let mut v = [0i16; 8];
                for (j, slot) in v.iter_mut().enumerate() {
                    *slot = (i * 8 + j as i32) as i16;
                }
                v
            })
            .collect();
        let codebook = Codebook::new(3, vectors).unwrap();
        let wire = codebook.to_wire();
        let parsed = Codebook::from_wire(&wire).unwrap();
        assert_eq!(codebook, parsed);
    }

    #[test]
    fn rejects_unknown_version() {
        let mut wire = Codebook::zeroed(1).unwrap().to_wire();
        wire[1] = 2;
        assert_eq!(Codebook::from_wire(&wire), Err(VadpcmError::UnknownVersion));
    }

    #[test]
    fn rejects_large_predictor_count() {
        assert_eq!(Codebook::zeroed(17), Err(VadpcmError::LargePredictorCount));
    }

    #[test]
    fn build_codebook_zeroes_empty_clusters() {
        let corr: Vec<Autocorrelation> = vec![[1.0, 0.5, 1.0, 0.25, 0.5, 1.0]];
        let predictors = vec![0u8];
        let codebook = build_codebook(&corr, &predictors, 2).unwrap();
        let (v0, v1) = codebook.predictor(1).unwrap();
        assert_eq!(*v0, [0i16; 8]);
        assert_eq!(*v1, [0i16; 8]);
    }
}
