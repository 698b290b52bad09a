// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use log::{debug, info, warn};

use vadpcm::{encode, CarryState, EncodeParams};
use vadpcm_format::DecodedInput;

use crate::container::{read_any, write_pcm, write_vadpcm};
use crate::error::{CliError, CliResult};

pub fn run_encode(input: &Path, output: &Path, predictor_count: u8) -> CliResult<()> {
    let decoded = read_any(input)?;
    let (sample_rate, samples) = match decoded {
        DecodedInput::Pcm { sample_rate, samples } => (sample_rate, samples),
        DecodedInput::Vadpcm { .. } => {
            return Err(CliError::Usage(format!("{}: already a VADPCM stream", input.display())))
        }
    };
    info!("encoding {} samples at {} Hz", samples.len(), sample_rate);

    let (codebook, frames, stats) = encode(EncodeParams { predictor_count }, &samples)?;
    debug!("encoded {} frames, snr = {:.2} dB", frames.len() / vadpcm::FRAME_BYTE_COUNT, stats.snr_db());

    write_vadpcm(output, sample_rate, &codebook, &frames)?;
    info!("wrote {}", output.display());
    Ok(())
}

pub fn run_decode(input: &Path, output: &Path) -> CliResult<()> {
    let decoded = read_any(input)?;
    let (sample_rate, codebook, frames) = match decoded {
        DecodedInput::Vadpcm { sample_rate, codebook, frames } => (sample_rate, codebook, frames),
        DecodedInput::Pcm { .. } => {
            return Err(CliError::Usage(format!("{}: not a VADPCM stream", input.display())))
        }
    };

    let mut state = CarryState::ZERO;
    let samples = vadpcm::decode(&codebook, &mut state, &frames)?;
    info!("decoded {} samples at {} Hz", samples.len(), sample_rate);

    write_pcm(output, sample_rate, &samples)?;
    info!("wrote {}", output.display());
    Ok(())
}

/// Mean-square signal power and mean-square error between a decoded stream
/// and a PCM reference of the same length, on the 32768-normalized scale
/// `vadpcm::EncodeStats` uses.
fn snr_db(decoded: &[i16], reference: &[i16]) -> CliResult<f64> {
    if decoded.len() != reference.len() {
        return Err(CliError::MismatchedLength { input: decoded.len(), reference: reference.len() });
    }
    let scale = 32768.0f64 * 32768.0;
    let n = decoded.len() as f64;
    let signal_ms: f64 = reference.iter().map(|&s| (s as f64) * (s as f64)).sum::<f64>() / n / scale;
    let error_ms: f64 = decoded
        .iter()
        .zip(reference)
        .map(|(&d, &r)| {
            let e = d as f64 - r as f64;
            e * e
        })
        .sum::<f64>()
        / n
        / scale;
    Ok(if error_ms == 0.0 { f64::INFINITY } else { 10.0 * (signal_ms / error_ms).log10() })
}

pub fn run_stats(input: &Path, reference: &Path) -> CliResult<f64> {
    let decoded_input = read_any(input)?;
    let (codebook, frames) = match decoded_input {
        DecodedInput::Vadpcm { codebook, frames, .. } => (codebook, frames),
        DecodedInput::Pcm { .. } => {
            return Err(CliError::Usage(format!("{}: not a VADPCM stream", input.display())))
        }
    };
    let mut state = CarryState::ZERO;
    let decoded = vadpcm::decode(&codebook, &mut state, &frames)?;

    let reference_samples = match read_any(reference)? {
        DecodedInput::Pcm { samples, .. } => samples,
        DecodedInput::Vadpcm { .. } => {
            return Err(CliError::Usage(format!("{}: reference must be PCM", reference.display())))
        }
    };

    snr_db(&decoded, &reference_samples)
}

/// Reference path for `input` under the `batch-stats` adjacent-file
/// convention: the same path with `.orig` appended.
fn orig_reference_path(input: &Path) -> PathBuf {
    let mut name = input.as_os_str().to_owned();
    name.push(".orig");
    PathBuf::from(name)
}

pub fn run_batch_stats(inputs: &[PathBuf], jobs: usize) -> CliResult<()> {
    let remaining = Mutex::new(inputs.to_vec());
    let results: Mutex<Vec<(PathBuf, CliResult<f64>)>> = Mutex::new(Vec::with_capacity(inputs.len()));

    std::thread::scope(|scope| {
        for worker in 0..jobs.max(1) {
            let remaining = &remaining;
            let results = &results;
            scope.spawn(move || loop {
                let next = remaining.lock().unwrap().pop();
                let Some(path) = next else { break };
                debug!("worker {worker} processing {}", path.display());
                let reference = orig_reference_path(&path);
                let outcome = std::panic::catch_unwind(|| run_stats(&path, &reference))
                    .unwrap_or_else(|_| Err(CliError::WorkerPanic(path.clone())));
                results.lock().unwrap().push((path, outcome));
            });
        }
    });

    let mut results = results.into_inner().unwrap();
    results.sort_by(|a, b| a.0.cmp(&b.0));

    let mut failures = 0usize;
    let mut total_snr = 0.0f64;
    let mut finite_count = 0usize;
    for (path, outcome) in &results {
        match outcome {
            Ok(snr) => {
                println!("{}: {:.2} dB", path.display(), snr);
                if snr.is_finite() {
                    total_snr += snr;
                    finite_count += 1;
                }
            }
            Err(e) => {
                warn!("{}: {e}", path.display());
                println!("{}: error ({e})", path.display());
                failures += 1;
            }
        }
    }

    if finite_count > 0 {
        println!("average: {:.2} dB over {} file(s)", total_snr / finite_count as f64, finite_count);
    }
    if failures > 0 {
        return Err(CliError::BatchFailures { failed: failures, total: results.len() });
    }
    Ok(())
}
