//! Transition rules: what a cell becomes given its live neighbor count.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// A transition rule. Implementations must be pure and must not depend on
/// where the cell is, so the engine can apply them to every cell alike.
pub trait Rule {
    /// The next state of a cell with `live_neighbors` live neighbors
    /// (`0..=8`) that is currently `alive`.
    fn next_state(&self, live_neighbors: u8, alive: bool) -> bool;
}

impl<F> Rule for F
where
    F: Fn(u8, bool) -> bool,
{
    #[inline]
    fn next_state(&self, live_neighbors: u8, alive: bool) -> bool {
        self(live_neighbors, alive)
    }
}

/// Conway's rule, B3/S23.
pub fn conway(live_neighbors: u8, alive: bool) -> bool {
    match live_neighbors {
        n if n > 3 => false, // overpopulation
        3 => true,           // survives, or is born
        n if n < 2 => false, // underpopulation
        _ => alive,
    }
}

/// Outer-totalistic rule given as birth and survival neighbor counts.
///
/// Bit `n` of `birth` set means a dead cell with `n` live neighbors becomes
/// alive; bit `n` of `survival` set means a live cell with `n` live
/// neighbors stays alive. Only bits `0..=8` are used.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LifeLike {
    birth: u16,
    survival: u16,
}

const fn mask(counts: &[u8]) -> u16 {
    let mut bits = 0;
    let mut i = 0;
    while i < counts.len() {
        bits |= 1 << counts[i];
        i += 1;
    }
    bits
}

impl LifeLike {
    pub const CONWAY: Self = Self::from_masks(mask(&[3]), mask(&[2, 3]));
    /// B36/S23, known for its replicator.
    pub const HIGHLIFE: Self = Self::from_masks(mask(&[3, 6]), mask(&[2, 3]));
    /// B2/S, nothing survives.
    pub const SEEDS: Self = Self::from_masks(mask(&[2]), 0);
    /// B3678/S34678, symmetric under on/off inversion.
    pub const DAY_AND_NIGHT: Self =
        Self::from_masks(mask(&[3, 6, 7, 8]), mask(&[3, 4, 6, 7, 8]));
    /// B3/S012345678, nothing dies.
    pub const LIFE_WITHOUT_DEATH: Self = Self::from_masks(mask(&[3]), 0x1ff);

    const fn from_masks(birth: u16, survival: u16) -> Self {
        Self { birth, survival }
    }

    /// Builds a rule from neighbor counts. Counts above 8 are rejected.
    pub fn new(birth: &[u8], survival: &[u8]) -> Result<Self> {
        let check = |counts: &[u8]| {
            if counts.iter().all(|&n| n <= 8) {
                Ok(mask(counts))
            } else {
                Err(Error::InvalidRule(format!("{:?}/{:?}", birth, survival)))
            }
        };
        Ok(Self::from_masks(check(birth)?, check(survival)?))
    }

    pub fn births_on(&self, live_neighbors: u8) -> bool {
        live_neighbors <= 8 && self.birth & (1 << live_neighbors) != 0
    }

    pub fn survives_on(&self, live_neighbors: u8) -> bool {
        live_neighbors <= 8 && self.survival & (1 << live_neighbors) != 0
    }
}

impl Default for LifeLike {
    fn default() -> Self {
        Self::CONWAY
    }
}

impl Rule for LifeLike {
    #[inline]
    fn next_state(&self, live_neighbors: u8, alive: bool) -> bool {
        if alive {
            self.survives_on(live_neighbors)
        } else {
            self.births_on(live_neighbors)
        }
    }
}

/// Parses B/S notation such as `B3/S23`, case-insensitive, in either order.
impl FromStr for LifeLike {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidRule(s.to_owned());
        let (first, second) = s.trim().split_once('/').ok_or_else(invalid)?;

        let mut birth = None;
        let mut survival = None;
        for part in [first, second] {
            let mut chars = part.chars();
            let slot = match chars.next().map(|c| c.to_ascii_uppercase()) {
                Some('B') => &mut birth,
                Some('S') => &mut survival,
                _ => return Err(invalid()),
            };
            if slot.is_some() {
                return Err(invalid());
            }
            let mut bits = 0u16;
            for c in chars {
                match c.to_digit(10) {
                    Some(n) if n <= 8 => bits |= 1 << n,
                    _ => return Err(invalid()),
                }
            }
            *slot = Some(bits);
        }

        match (birth, survival) {
            (Some(birth), Some(survival)) => Ok(Self::from_masks(birth, survival)),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for LifeLike {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("B")?;
        for n in (0..=8).filter(|&n| self.births_on(n)) {
            write!(f, "{n}")?;
        }
        f.write_str("/S")?;
        for n in (0..=8).filter(|&n| self.survives_on(n)) {
            write!(f, "{n}")?;
        }
        Ok(())
    }
}
