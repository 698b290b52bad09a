// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::error::Error as StdError;
use std::fmt;
use std::io;

use vadpcm::VadpcmError;

/// Errors that can occur while reading or writing an AIFF, AIFF-C, or WAVE
/// container.
#[derive(Debug)]
pub enum FormatError {
    /// Underlying I/O failure.
    Io(io::Error),
    /// A chunk's tag, length, or nesting did not match the container's
    /// conventions (e.g. a chunk's declared size exceeds its parent's).
    InvalidChunk(&'static str),
    /// The stream ended before a required chunk was fully read.
    Truncated(&'static str),
    /// The stream ended earlier than expected while reading raw bytes.
    UnexpectedEof,
    /// A COMM chunk named a compression type this crate does not read.
    UnsupportedCodec,
    /// A codebook blob failed to parse.
    Codebook(VadpcmError),
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::Io(e) => write!(f, "vadpcm-format: i/o error: {e}"),
            FormatError::InvalidChunk(msg) => write!(f, "vadpcm-format: invalid chunk: {msg}"),
            FormatError::Truncated(msg) => write!(f, "vadpcm-format: truncated stream: {msg}"),
            FormatError::UnexpectedEof => write!(f, "vadpcm-format: unexpected end of stream"),
            FormatError::UnsupportedCodec => write!(f, "vadpcm-format: unsupported codec"),
            FormatError::Codebook(e) => write!(f, "vadpcm-format: bad codebook: {e}"),
        }
    }
}

impl StdError for FormatError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            FormatError::Io(e) => Some(e),
            FormatError::Codebook(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for FormatError {
    fn from(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            FormatError::UnexpectedEof
        }
        else {
            FormatError::Io(e)
        }
    }
}

impl From<VadpcmError> for FormatError {
    fn from(e: VadpcmError) -> Self {
        FormatError::Codebook(e)
    }
}

pub type Result<T> = std::result::Result<T, FormatError>;
