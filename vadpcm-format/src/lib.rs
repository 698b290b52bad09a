// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

//! Container read/write for the `vadpcm` codec: AIFF, AIFF-C, and WAVE.
//! AIFF-C is the only container that can carry an encoded VADPCM stream;
//! plain AIFF and WAVE are always raw 16-bit mono PCM.

mod aiff;
mod chunk;
mod error;
mod sample_rate;
mod wave;

use std::io::Read;

use vadpcm::Codebook;

pub use aiff::{read_aiff, write_aiff, AiffCodec, AiffVersion};
pub use error::{FormatError, Result};
pub use wave::{read_wave, write_wave};

/// The result of reading a container: either raw PCM samples, or an encoded
/// VADPCM stream plus the codebook needed to decode it.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedInput {
    Pcm { sample_rate: u32, samples: Vec<i16> },
    Vadpcm { sample_rate: u32, codebook: Codebook, frames: Vec<u8> },
}

const FORM: [u8; 4] = *b"FORM";
const RIFF: [u8; 4] = *b"RIFF";

/// Sniff the first 4 bytes of `reader` and dispatch to [`read_aiff`] or
/// [`read_wave`] accordingly.
pub fn read_container<R: Read>(reader: &mut R) -> Result<DecodedInput> {
    let mut marker = [0u8; 4];
    reader.read_exact(&mut marker)?;
    let mut chained = marker.as_slice().chain(reader);
    match marker {
        m if m == FORM => read_aiff(&mut chained),
        m if m == RIFF => read_wave(&mut chained),
        _ => Err(FormatError::InvalidChunk("unrecognized container marker")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniffs_aiff_marker() {
        let samples: Vec<i16> = vec![1, -1, 2, -2];
        let mut audio = Vec::new();
        for s in &samples {
            audio.extend_from_slice(&s.to_be_bytes());
        }
        let mut buf = Vec::new();
        write_aiff(&mut buf, AiffVersion::Aiff, AiffCodec::Pcm, 8000, 1, 16, samples.len() as u32, &audio, None)
            .unwrap();

        let mut cursor = &buf[..];
        let decoded = read_container(&mut cursor).unwrap();
        assert!(matches!(decoded, DecodedInput::Pcm { .. }));
    }

    #[test]
    fn rejects_unknown_marker() {
        let bytes = b"JUNK\0\0\0\0".to_vec();
        let mut cursor = &bytes[..];
        assert!(read_container(&mut cursor).is_err());
    }
}
