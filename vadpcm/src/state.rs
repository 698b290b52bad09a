// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Explicit carry-state carried across frame boundaries by the decoder and
//! encoder. There is no module-level or thread-local state anywhere in this
//! crate: every call that needs history takes it as an argument and returns
//! the updated value, so independent streams can be driven concurrently by
//! holding disjoint state values.

/// The two most recently decoded (or encoded) samples, needed to predict the
/// next frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CarryState {
    /// `s[-2]`, the older of the two prior samples.
    pub prev2: i16,
    /// `s[-1]`, the most recent prior sample.
    pub prev1: i16,
}

impl CarryState {
    /// The all-zero initial state used at the start of a stream.
    pub const ZERO: CarryState = CarryState { prev2: 0, prev1: 0 };

    pub fn new(prev2: i16, prev1: i16) -> Self {
        CarryState { prev2, prev1 }
    }
}

/// Multiplier and increment of the dither LCG used by the encoder's shift
/// search (§4.8). Matches the reference generator bit for bit.
const RNG_MULTIPLIER: u32 = 0xd9f5;
const RNG_INCREMENT: u32 = 0x6487_ed51;

/// The encoder's dither pseudo-random generator.
///
/// `advance` is the only operation: there is no seeding beyond the initial
/// state, and the generator is reset to a saved value at the start of each
/// shift-search trial (§4.8) rather than left running continuously.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rng(pub u32);

impl Rng {
    pub const ZERO: Rng = Rng(0);

    /// Advance the generator one step, returning the new state.
    pub fn advance(self) -> Rng {
        Rng(self.0.wrapping_mul(RNG_MULTIPLIER).wrapping_add(RNG_INCREMENT))
    }

    /// The dither bias for shift `shift`, derived from the generator's current
    /// state before advancing.
    pub fn bias(self, shift: u8) -> i32 {
        ((self.0 >> 16) >> (16 - shift as u32)) as i32
    }
}

/// Full encoder carry-state: sample history plus dither generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EncoderState {
    pub samples: CarryState,
    pub rng: Rng,
}

impl EncoderState {
    pub const ZERO: EncoderState = EncoderState { samples: CarryState::ZERO, rng: Rng::ZERO };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rng_matches_reference_sequence() {
        // First three outputs of state <- state*0xd9f5 + 0x6487ed51 starting from 0.
        let r0 = Rng::ZERO;
        let r1 = r0.advance();
        assert_eq!(r1.0, 0x6487_ed51);
        let r2 = r1.advance();
        assert_eq!(r2.0, (0x6487_ed51u32).wrapping_mul(0xd9f5).wrapping_add(0x6487_ed51));
    }

    #[test]
    fn bias_shifts_high_bits() {
        let r = Rng(0xffff_0000);
        assert_eq!(r.bias(1), (0xffffu32 >> 15) as i32);
    }
}
