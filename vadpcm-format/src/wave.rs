// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! WAVE read/write: `RIFF`/`WAVE` with `fmt ` and `data` chunks, 16-bit mono
//! PCM only (VADPCM has no WAVE container convention, so this crate never
//! writes an encoded stream here). Unlike AIFF, RIFF chunk sizes and all
//! multi-byte fields are little-endian.

use std::io::{Read, Write};

use crate::chunk::{padded_len, read_chunk_header_le, read_tag};
use crate::error::{FormatError, Result};
use crate::DecodedInput;

use log::debug;

const RIFF: [u8; 4] = *b"RIFF";
const WAVE: [u8; 4] = *b"WAVE";
const WAVE_FORMAT_PCM: u16 = 1;

pub fn read_wave<R: Read>(reader: &mut R) -> Result<DecodedInput> {
    let marker = read_tag(reader)?;
    if marker != RIFF {
        return Err(FormatError::InvalidChunk("missing RIFF marker"));
    }
    let _riff_len = read_le_u32(reader)?;
    let form = read_tag(reader)?;
    if form != WAVE {
        return Err(FormatError::InvalidChunk("RIFF form is not WAVE"));
    }

    let mut channels: Option<u16> = None;
    let mut bits_per_sample: Option<u16> = None;
    let mut sample_rate: Option<u32> = None;
    let mut samples: Option<Vec<i16>> = None;

    while let Some(header) = read_chunk_header_le(reader)? {
        let mut payload = vec![0u8; header.len as usize];
        reader.read_exact(&mut payload)?;
        if header.len & 1 == 1 {
            reader.read_exact(&mut [0u8; 1])?;
        }

        match &header.tag {
            b"fmt " => {
                let mut cursor = &payload[..];
                let format_tag = read_le_u16(&mut cursor)?;
                if format_tag != WAVE_FORMAT_PCM {
                    return Err(FormatError::UnsupportedCodec);
                }
                channels = Some(read_le_u16(&mut cursor)?);
                sample_rate = Some(read_le_u32(&mut cursor)?);
                let _byte_rate = read_le_u32(&mut cursor)?;
                let _block_align = read_le_u16(&mut cursor)?;
                bits_per_sample = Some(read_le_u16(&mut cursor)?);
            }
            b"data" => {
                if bits_per_sample != Some(16) {
                    return Err(FormatError::UnsupportedCodec);
                }
                if channels != Some(1) {
                    return Err(FormatError::UnsupportedCodec);
                }
                if payload.len() % 2 != 0 {
                    return Err(FormatError::InvalidChunk("data length is not a multiple of sample width"));
                }
                samples = Some(
                    payload.chunks_exact(2).map(|pair| i16::from_le_bytes([pair[0], pair[1]])).collect(),
                );
            }
            other => debug!("read_wave: skipping unrecognized chunk {:?}", String::from_utf8_lossy(other)),
        }
    }

    let sample_rate = sample_rate.ok_or(FormatError::InvalidChunk("missing fmt chunk"))?;
    let samples = samples.ok_or(FormatError::InvalidChunk("missing data chunk"))?;
    debug!("read_wave: {} samples at {} Hz", samples.len(), sample_rate);
    Ok(DecodedInput::Pcm { sample_rate, samples })
}

/// Write 16-bit mono PCM as a WAVE file: `RIFF`/`WAVE` with a 16-byte `fmt `
/// chunk followed by `data`. Chunk sizes here are little-endian, unlike
/// AIFF's big-endian convention; only the 4-byte tag fields are unaffected.
pub fn write_wave<W: Write>(writer: &mut W, sample_rate: u32, samples: &[i16]) -> Result<()> {
    debug!("write_wave: {} samples at {} Hz", samples.len(), sample_rate);
    let mut data = Vec::with_capacity(samples.len() * 2);
    for &s in samples {
        data.extend_from_slice(&s.to_le_bytes());
    }
    let data_size = padded_len(data.len() as u32);
    let riff_len = 4 + (8 + 16) + (8 + data_size);

    writer.write_all(&RIFF)?;
    writer.write_all(&riff_len.to_le_bytes())?;
    writer.write_all(&WAVE)?;

    writer.write_all(b"fmt ")?;
    writer.write_all(&16u32.to_le_bytes())?;
    writer.write_all(&WAVE_FORMAT_PCM.to_le_bytes())?;
    writer.write_all(&1u16.to_le_bytes())?; // mono
    writer.write_all(&sample_rate.to_le_bytes())?;
    writer.write_all(&(sample_rate * 2).to_le_bytes())?; // byte rate
    writer.write_all(&2u16.to_le_bytes())?; // block align
    writer.write_all(&16u16.to_le_bytes())?; // bits per sample

    writer.write_all(b"data")?;
    writer.write_all(&(data.len() as u32).to_le_bytes())?;
    writer.write_all(&data)?;
    if data.len() % 2 == 1 {
        writer.write_all(&[0u8])?;
    }
    Ok(())
}

fn read_le_u16<R: Read>(reader: &mut R) -> Result<u16> {
    let mut buf = [0u8; 2];
    reader.read_exact(&mut buf)?;
    Ok(u16::from_le_bytes(buf))
}

fn read_le_u32<R: Read>(reader: &mut R) -> Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_wave(sample_rate: u32, samples: &[i16]) -> Vec<u8> {
        let mut data = Vec::new();
        for &s in samples {
            data.extend_from_slice(&s.to_le_bytes());
        }
        let fmt_len = 16u32;
        let data_len = data.len() as u32;
        let riff_len = 4 + (8 + fmt_len) + (8 + data_len);

        let mut out = Vec::new();
        out.extend_from_slice(&RIFF);
        out.extend_from_slice(&riff_len.to_le_bytes());
        out.extend_from_slice(&WAVE);

        out.extend_from_slice(b"fmt ");
        out.extend_from_slice(&fmt_len.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes()); // PCM
        out.extend_from_slice(&1u16.to_le_bytes()); // mono
        out.extend_from_slice(&sample_rate.to_le_bytes());
        out.extend_from_slice(&(sample_rate * 2).to_le_bytes()); // byte rate
        out.extend_from_slice(&2u16.to_le_bytes()); // block align
        out.extend_from_slice(&16u16.to_le_bytes()); // bits per sample

        out.extend_from_slice(b"data");
        out.extend_from_slice(&data_len.to_le_bytes());
        out.extend_from_slice(&data);

        out
    }

    #[test]
    fn reads_mono_16bit_pcm() {
        let samples = vec![0i16, 1, -1, 32767, -32768];
        let bytes = build_wave(44100, &samples);
        let mut cursor = &bytes[..];
        let decoded = read_wave(&mut cursor).unwrap();
        match decoded {
            DecodedInput::Pcm { sample_rate, samples: parsed } => {
                assert_eq!(sample_rate, 44100);
                assert_eq!(parsed, samples);
            }
            DecodedInput::Vadpcm { .. } => panic!("wave is always PCM"),
        }
    }

    #[test]
    fn write_then_read_round_trips() {
        let samples = vec![0i16, 12345, -12345, 32767, -32768, 7];
        let mut buf = Vec::new();
        write_wave(&mut buf, 48000, &samples).unwrap();
        let mut cursor = &buf[..];
        let decoded = read_wave(&mut cursor).unwrap();
        match decoded {
            DecodedInput::Pcm { sample_rate, samples: parsed } => {
                assert_eq!(sample_rate, 48000);
                assert_eq!(parsed, samples);
            }
            DecodedInput::Vadpcm { .. } => panic!("wave is always PCM"),
        }
    }
}
