// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! AIFF encodes sample rate as an 80-bit IEEE-754 extended float rather than
//! a plain integer; this wraps the `extended` crate's codec and truncates to
//! the `u32` rate the rest of this crate works with.

use std::io::{Read, Write};

use extended::Extended;

use crate::error::Result;

pub fn read_sample_rate<R: Read>(reader: &mut R) -> Result<u32> {
    let mut buf = [0u8; 10];
    reader.read_exact(&mut buf)?;
    Ok(Extended::from_be_bytes(buf).to_f64() as u32)
}

pub fn write_sample_rate<W: Write>(writer: &mut W, rate: u32) -> Result<()> {
    let extended = Extended::from(rate as f64);
    writer.write_all(&extended.to_be_bytes())?;
    Ok(())
}
