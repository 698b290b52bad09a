// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Path-extension-driven container I/O: infer AIFF/AIFF-C/WAVE from a
//! filename and delegate to `vadpcm_format`.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use vadpcm::Codebook;
use vadpcm_format::{read_container, write_aiff, write_wave, AiffCodec, AiffVersion, DecodedInput};

use crate::error::{CliError, CliResult};

/// Read any supported container and return its decoded contents, regardless
/// of the file's extension (the magic bytes decide the format).
pub fn read_any(path: &Path) -> CliResult<DecodedInput> {
    let file = File::open(path).map_err(|e| CliError::Io(path.to_path_buf(), e))?;
    let mut reader = BufReader::new(file);
    read_container(&mut reader).map_err(|e| CliError::Format(path.to_path_buf(), e))
}

fn aiff_version_for(path: &Path) -> CliResult<AiffVersion> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("aifc") => Ok(AiffVersion::AiffC),
        Some("aiff") => Ok(AiffVersion::Aiff),
        _ => Err(CliError::Usage(format!(
            "cannot infer container format from output path {}: expected .aiff, .aifc, or .wav",
            path.display()
        ))),
    }
}

/// Write raw PCM to `path`, choosing AIFF, AIFF-C, or WAVE by extension.
pub fn write_pcm(path: &Path, sample_rate: u32, samples: &[i16]) -> CliResult<()> {
    let file = File::create(path).map_err(|e| CliError::Io(path.to_path_buf(), e))?;
    let mut writer = BufWriter::new(file);

    if path.extension().and_then(|e| e.to_str()) == Some("wav") {
        return write_wave(&mut writer, sample_rate, samples)
            .map_err(|e| CliError::Format(path.to_path_buf(), e));
    }

    let version = aiff_version_for(path)?;
    let mut audio = Vec::with_capacity(samples.len() * 2);
    for &s in samples {
        audio.extend_from_slice(&s.to_be_bytes());
    }
    write_aiff(
        &mut writer,
        version,
        AiffCodec::Pcm,
        sample_rate,
        1,
        16,
        samples.len() as u32,
        &audio,
        None,
    )
    .map_err(|e| CliError::Format(path.to_path_buf(), e))
}

/// Write an encoded VADPCM stream to `path`. Only AIFF-C can carry VADPCM, so
/// `path` must have a `.aifc` extension.
pub fn write_vadpcm(path: &Path, sample_rate: u32, codebook: &Codebook, frames: &[u8]) -> CliResult<()> {
    let version = aiff_version_for(path)?;
    if version != AiffVersion::AiffC {
        return Err(CliError::Usage(format!(
            "VADPCM output requires a .aifc path, got {}",
            path.display()
        )));
    }
    let file = File::create(path).map_err(|e| CliError::Io(path.to_path_buf(), e))?;
    let mut writer = BufWriter::new(file);
    write_aiff(
        &mut writer,
        AiffVersion::AiffC,
        AiffCodec::Vadpcm,
        sample_rate,
        1,
        16,
        (frames.len() / vadpcm::FRAME_BYTE_COUNT * vadpcm::FRAME_SAMPLE_COUNT) as u32,
        frames,
        Some(codebook),
    )
    .map_err(|e| CliError::Format(path.to_path_buf(), e))
}
