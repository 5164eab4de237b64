//! Dice types, random sources, and rolling.
//!
//! Every roll in the engine goes through a [`DiceSource`]. Production code
//! passes an RNG from `rand`; tests and tables using physical dice pass a
//! [`FixedDice`] that replays known values.

pub mod expr;
pub mod roll;

pub use expr::{Amount, DiceExpr, parse_dice_expression, roll_expression};
pub use roll::DiceRoll;

use rand::Rng;
use rand::rngs::{StdRng, ThreadRng};
use serde::{Deserialize, Serialize};

/// A polyhedral die type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Die {
    /// Four-sided die.
    D4,
    /// Six-sided die.
    D6,
    /// Eight-sided die.
    D8,
    /// Ten-sided die.
    D10,
    /// Twelve-sided die.
    D12,
    /// Twenty-sided die.
    D20,
    /// Percentile die (1-100).
    D100,
    /// A die with any other number of sides.
    Custom(u32),
}

impl Die {
    /// Returns the number of sides on this die.
    pub fn sides(self) -> u32 {
        match self {
            Self::D4 => 4,
            Self::D6 => 6,
            Self::D8 => 8,
            Self::D10 => 10,
            Self::D12 => 12,
            Self::D20 => 20,
            Self::D100 => 100,
            Self::Custom(n) => n,
        }
    }

    /// The die with the given number of sides.
    pub fn from_sides(sides: u32) -> Self {
        match sides {
            4 => Self::D4,
            6 => Self::D6,
            8 => Self::D8,
            10 => Self::D10,
            12 => Self::D12,
            20 => Self::D20,
            100 => Self::D100,
            n => Self::Custom(n),
        }
    }
}

impl std::fmt::Display for Die {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "d{}", self.sides())
    }
}

/// A source of die results.
pub trait DiceSource {
    /// Roll a die with `sides` faces, returning a value in `[1, sides]`.
    ///
    /// A zero-sided die is treated as a one-sided die.
    fn roll_die(&mut self, sides: u32) -> u32;

    /// Roll one die of the given type.
    fn roll(&mut self, die: Die) -> u32 {
        self.roll_die(die.sides())
    }
}

impl DiceSource for StdRng {
    fn roll_die(&mut self, sides: u32) -> u32 {
        self.random_range(1..=sides.max(1))
    }
}

impl DiceSource for ThreadRng {
    fn roll_die(&mut self, sides: u32) -> u32 {
        self.random_range(1..=sides.max(1))
    }
}

/// Roll a single die with the thread-local RNG.
pub fn roll_die(sides: u32) -> u32 {
    rand::rng().roll_die(sides)
}

/// Replays a fixed sequence of results, cycling when exhausted.
///
/// Each value is clamped into the range of the die being rolled, so a
/// scripted 20 rolled on a d4 comes out as 4.
#[derive(Debug, Clone, Default)]
pub struct FixedDice {
    values: Vec<u32>,
    next: usize,
}

impl FixedDice {
    /// Create a source that yields `values` in order.
    pub fn new(values: impl Into<Vec<u32>>) -> Self {
        Self {
            values: values.into(),
            next: 0,
        }
    }

    /// How many values have been consumed so far.
    pub fn consumed(&self) -> usize {
        self.next
    }
}

impl DiceSource for FixedDice {
    fn roll_die(&mut self, sides: u32) -> u32 {
        let sides = sides.max(1);
        if self.values.is_empty() {
            return 1;
        }
        let value = self.values[self.next % self.values.len()];
        self.next += 1;
        value.clamp(1, sides)
    }
}
