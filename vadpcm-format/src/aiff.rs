// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! AIFF and AIFF-C container read/write (§4.10).
//!
//! Chunk order on write is fixed: `FVER` (AIFF-C only) → `COMM` → `APPL`
//! VADPCM codebook (AIFF-C + VADPCM only) → `SSND`, matching the reference
//! writer's two-pass "compute every chunk's size and offset, then emit a
//! single contiguous header buffer" approach.

use std::io::{Read, Write};

use vadpcm::Codebook;

use crate::chunk::{
    pascal_string_bytes, read_be_i16, read_be_u32, read_chunk_header, read_pascal_string,
    read_tag, write_chunk_header, write_pad,
};
use crate::error::{FormatError, Result};
use crate::sample_rate::{read_sample_rate, write_sample_rate};
use crate::DecodedInput;

use log::{debug, warn};

const FORM: [u8; 4] = *b"FORM";
const AIFF_FORM: [u8; 4] = *b"AIFF";
const AIFC_FORM: [u8; 4] = *b"AIFC";

const CODEC_NAME_PCM: &str = "not compressed";
const CODEC_NAME_VADPCM: &str = "VADPCM ~4-1";

/// The Apple "stoc" application-specific chunk signature, used here to carry
/// the VADPCM codebook blob inside an `APPL` chunk.
const APPL_STOC: [u8; 4] = *b"stoc";
const CODEBOOK_SIGNATURE: &str = "VADPCMCODES";

/// Timestamp identifying AIFF-C format version 1 (1991-01-23), as defined by
/// the AIFF-C specification and written verbatim into every `FVER` chunk.
const AIFC_VERSION_1: u32 = 0xA280_5140;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiffVersion {
    Aiff,
    AiffC,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiffCodec {
    Pcm,
    Vadpcm,
}

/// Read an AIFF or AIFF-C stream, returning either raw PCM or a VADPCM
/// codebook plus frame stream, depending on which the `COMM`/`SSND` chunks
/// described.
pub fn read_aiff<R: Read>(reader: &mut R) -> Result<DecodedInput> {
    let marker = read_tag(reader)?;
    if marker != FORM {
        return Err(FormatError::InvalidChunk("missing FORM marker"));
    }
    let form_len = read_be_u32(reader)?;
    if form_len < 4 {
        return Err(FormatError::Truncated("FORM chunk too short"));
    }
    let form_type = read_tag(reader)?;
    let is_aifc = match form_type {
        t if t == AIFF_FORM => false,
        t if t == AIFC_FORM => true,
        _ => return Err(FormatError::InvalidChunk("form type is not AIFF or AIFC")),
    };

    let mut remaining: i64 = form_len as i64 - 4;
    let mut sample_rate: Option<u32> = None;
    let mut codec = AiffCodec::Pcm;
    let mut pcm_samples: Option<Vec<i16>> = None;
    let mut frames: Option<Vec<u8>> = None;
    let mut codebook: Option<Codebook> = None;

    while remaining >= 8 {
        let header = match read_chunk_header(reader)? {
            Some(h) => h,
            None => break,
        };
        remaining -= 8;
        if i64::from(header.len) > remaining {
            return Err(FormatError::Truncated("chunk exceeds parent length"));
        }

        let mut payload = vec![0u8; header.len as usize];
        reader.read_exact(&mut payload)?;
        if header.len & 1 == 1 {
            reader.read_exact(&mut [0u8; 1])?;
        }
        remaining -= i64::from(header.len) + i64::from(header.len & 1);

        match &header.tag {
            b"COMM" => {
                let mut cursor = &payload[..];
                let _n_channels = read_be_i16(&mut cursor)?;
                let _n_sample_frames = read_be_u32(&mut cursor)?;
                let _sample_size = read_be_i16(&mut cursor)?;
                sample_rate = Some(read_sample_rate(&mut cursor)?);
                if is_aifc {
                    let compression = read_tag(&mut cursor)?;
                    codec = match &compression {
                        b"NONE" => AiffCodec::Pcm,
                        b"VAPC" => AiffCodec::Vadpcm,
                        _ => {
                            warn!(
                                "read_aiff: unsupported compression type {:?}",
                                String::from_utf8_lossy(&compression)
                            );
                            return Err(FormatError::UnsupportedCodec);
                        }
                    };
                }
            }
            b"SSND" => {
                let mut cursor = &payload[..];
                let offset = read_be_u32(&mut cursor)?;
                let block_size = read_be_u32(&mut cursor)?;
                if offset != 0 || block_size != 0 {
                    return Err(FormatError::InvalidChunk("block-aligned SSND data is unsupported"));
                }
                match codec {
                    AiffCodec::Pcm => {
                        let data = cursor;
                        if data.len() % 2 != 0 {
                            return Err(FormatError::InvalidChunk("SSND length is not a multiple of sample width"));
                        }
                        pcm_samples = Some(
                            data.chunks_exact(2)
                                .map(|pair| i16::from_be_bytes([pair[0], pair[1]]))
                                .collect(),
                        );
                    }
                    AiffCodec::Vadpcm => frames = Some(cursor.to_vec()),
                }
            }
            b"APPL" => {
                let mut cursor = &payload[..];
                let signature = read_tag(&mut cursor)?;
                if signature == APPL_STOC {
                    if let Ok(name) = read_pascal_string(&mut cursor) {
                        if name == CODEBOOK_SIGNATURE {
                            codebook = Some(Codebook::from_wire(cursor)?);
                        }
                    }
                }
            }
            other => {
                debug!("read_aiff: skipping unrecognized chunk {:?}", String::from_utf8_lossy(other));
            }
        }
    }

    let sample_rate = sample_rate.ok_or(FormatError::InvalidChunk("missing COMM chunk"))?;
    match codec {
        AiffCodec::Pcm => {
            let samples = pcm_samples.ok_or(FormatError::InvalidChunk("missing SSND chunk"))?;
            Ok(DecodedInput::Pcm { sample_rate, samples })
        }
        AiffCodec::Vadpcm => {
            let codebook = codebook.ok_or(FormatError::InvalidChunk("missing VADPCM codebook chunk"))?;
            let frames = frames.ok_or(FormatError::InvalidChunk("missing SSND chunk"))?;
            Ok(DecodedInput::Vadpcm { sample_rate, codebook, frames })
        }
    }
}

/// Write an AIFF or AIFF-C file. `audio` is the SSND payload: big-endian i16
/// PCM bytes for [`AiffCodec::Pcm`], raw VADPCM frame bytes for
/// [`AiffCodec::Vadpcm`]. `codebook` must be `Some` for
/// `(AiffVersion::AiffC, AiffCodec::Vadpcm)` and is ignored otherwise.
pub fn write_aiff<W: Write>(
    writer: &mut W,
    version: AiffVersion,
    codec: AiffCodec,
    sample_rate: u32,
    channels: u16,
    sample_size: u16,
    n_sample_frames: u32,
    audio: &[u8],
    codebook: Option<&Codebook>,
) -> Result<()> {
    debug!("write_aiff: version={version:?} codec={codec:?} sample_rate={sample_rate} frames={n_sample_frames}");
    if version == AiffVersion::Aiff && codec != AiffCodec::Pcm {
        return Err(FormatError::InvalidChunk("standard AIFF files must be PCM"));
    }

    let mut comm = Vec::new();
    comm.extend_from_slice(&(channels as i16).to_be_bytes());
    comm.extend_from_slice(&n_sample_frames.to_be_bytes());
    comm.extend_from_slice(&(sample_size as i16).to_be_bytes());
    write_sample_rate(&mut comm, sample_rate)?;
    if version == AiffVersion::AiffC {
        let (fourcc, name): (&[u8; 4], &str) = match codec {
            AiffCodec::Pcm => (b"NONE", CODEC_NAME_PCM),
            AiffCodec::Vadpcm => (b"VAPC", CODEC_NAME_VADPCM),
        };
        comm.extend_from_slice(fourcc);
        comm.extend_from_slice(&pascal_string_bytes(name));
    }

    let mut codebook_chunk = Vec::new();
    if version == AiffVersion::AiffC && codec == AiffCodec::Vadpcm {
        let codebook = codebook.ok_or(FormatError::InvalidChunk("VADPCM output requires a codebook"))?;
        codebook_chunk.extend_from_slice(&APPL_STOC);
        codebook_chunk.extend_from_slice(&pascal_string_bytes(CODEBOOK_SIGNATURE));
        codebook_chunk.extend_from_slice(&codebook.to_wire());
    }

    let mut ssnd = Vec::with_capacity(8 + audio.len());
    ssnd.extend_from_slice(&0u32.to_be_bytes());
    ssnd.extend_from_slice(&0u32.to_be_bytes());
    ssnd.extend_from_slice(audio);

    let mut form_len: u32 = 4; // form type tag
    if version == AiffVersion::AiffC {
        form_len += 8 + 4; // FVER header + payload
    }
    form_len += 8 + crate::chunk::padded_len(comm.len() as u32);
    if !codebook_chunk.is_empty() {
        form_len += 8 + crate::chunk::padded_len(codebook_chunk.len() as u32);
    }
    form_len += 8 + crate::chunk::padded_len(ssnd.len() as u32);

    writer.write_all(&FORM)?;
    writer.write_all(&form_len.to_be_bytes())?;
    writer.write_all(match version {
        AiffVersion::Aiff => &AIFF_FORM,
        AiffVersion::AiffC => &AIFC_FORM,
    })?;

    if version == AiffVersion::AiffC {
        write_chunk_header(writer, b"FVER", 4)?;
        writer.write_all(&AIFC_VERSION_1.to_be_bytes())?;
    }

    write_chunk_header(writer, b"COMM", comm.len() as u32)?;
    writer.write_all(&comm)?;
    write_pad(writer, comm.len() as u32)?;

    if !codebook_chunk.is_empty() {
        write_chunk_header(writer, b"APPL", codebook_chunk.len() as u32)?;
        writer.write_all(&codebook_chunk)?;
        write_pad(writer, codebook_chunk.len() as u32)?;
    }

    write_chunk_header(writer, b"SSND", ssnd.len() as u32)?;
    writer.write_all(&ssnd)?;
    write_pad(writer, ssnd.len() as u32)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use vadpcm::PredictorVector;

    #[test]
    fn s8_aiffc_vadpcm_round_trip() {
        let vectors: Vec<PredictorVector> = vec![[0i16; 8], [2048, 0, 0, 0, 0, 0, 0, 0]];
        let codebook = Codebook::new(1, vectors).unwrap();
        let frames = vec![0x10u8, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11];

        let mut buf = Vec::new();
        write_aiff(
            &mut buf,
            AiffVersion::AiffC,
            AiffCodec::Vadpcm,
            44100,
            1,
            16,
            16,
            &frames,
            Some(&codebook),
        )
        .unwrap();

        let mut cursor = &buf[..];
        let decoded = read_aiff(&mut cursor).unwrap();
        match decoded {
            DecodedInput::Vadpcm { sample_rate, codebook: parsed, frames: parsed_frames } => {
                assert_eq!(sample_rate, 44100);
                assert_eq!(parsed, codebook);
                assert_eq!(parsed_frames, frames);
            }
            DecodedInput::Pcm { .. } => panic!("expected a VADPCM stream"),
        }
    }

    #[test]
    fn aiff_pcm_round_trip() {
        let samples: Vec<i16> = vec![0, 100, -100, 32767, -32768];
        let mut audio = Vec::new();
        for s in &samples {
            audio.extend_from_slice(&s.to_be_bytes());
        }

        let mut buf = Vec::new();
        write_aiff(&mut buf, AiffVersion::Aiff, AiffCodec::Pcm, 8000, 1, 16, samples.len() as u32, &audio, None)
            .unwrap();

        let mut cursor = &buf[..];
        let decoded = read_aiff(&mut cursor).unwrap();
        match decoded {
            DecodedInput::Pcm { sample_rate, samples: parsed } => {
                assert_eq!(sample_rate, 8000);
                assert_eq!(parsed, samples);
            }
            DecodedInput::Vadpcm { .. } => panic!("expected a PCM stream"),
        }
    }

    #[test]
    fn rejects_vadpcm_in_plain_aiff() {
        let codebook = Codebook::zeroed(1).unwrap();
        let mut buf = Vec::new();
        let result =
            write_aiff(&mut buf, AiffVersion::Aiff, AiffCodec::Vadpcm, 8000, 1, 0, 0, &[], Some(&codebook));
        assert!(result.is_err());
    }
}
