// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::fmt;
use std::io;
use std::path::PathBuf;

use vadpcm::VadpcmError;
use vadpcm_format::FormatError;

/// Errors the CLI surfaces to the user. Distinct from `Usage`, every variant
/// here maps to exit code 1; `Usage` maps to exit code 2.
#[derive(Debug)]
pub enum CliError {
    Io(PathBuf, io::Error),
    Format(PathBuf, FormatError),
    Codec(VadpcmError),
    Usage(String),
    MismatchedLength { input: usize, reference: usize },
    BatchFailures { failed: usize, total: usize },
    WorkerPanic(PathBuf),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Io(path, e) => write!(f, "{}: {e}", path.display()),
            CliError::Format(path, e) => write!(f, "{}: {e}", path.display()),
            CliError::Codec(e) => write!(f, "{e}"),
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::MismatchedLength { input, reference } => {
                write!(f, "sample count mismatch: input has {input}, reference has {reference}")
            }
            CliError::BatchFailures { failed, total } => write!(f, "{failed} of {total} file(s) failed"),
            CliError::WorkerPanic(path) => write!(f, "{}: worker panicked", path.display()),
        }
    }
}

impl std::error::Error for CliError {}

impl From<VadpcmError> for CliError {
    fn from(e: VadpcmError) -> Self {
        CliError::Codec(e)
    }
}

/// Exit code this error should produce: 2 for usage errors, 1 otherwise.
impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) => 2,
            _ => 1,
        }
    }
}

pub type CliResult<T> = std::result::Result<T, CliError>;
