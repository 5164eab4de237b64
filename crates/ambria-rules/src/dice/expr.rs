//! Dice expressions of the form `NdS`, `NdS+M` and `NdS-M`.

use serde::{Deserialize, Serialize};

use super::{DiceRoll, DiceSource, Die};

/// Most dice a single expression may roll.
pub const MAX_DICE: u32 = 100;

/// Most sides a die in an expression may have.
pub const MAX_SIDES: u32 = 1000;

/// A parsed dice expression like `2d6+3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceExpr {
    /// Number of dice to roll (N in NdS).
    pub count: u32,
    /// Sides on each die (S in NdS).
    pub sides: u32,
    /// Signed modifier added after summing.
    pub modifier: i32,
}

impl DiceExpr {
    /// Parse an expression. Case and whitespace are ignored.
    ///
    /// Returns `None` for malformed input, a zero or missing count, zero
    /// sides, more than [`MAX_DICE`] dice, or more than [`MAX_SIDES`] sides.
    pub fn parse(input: &str) -> Option<Self> {
        let compact: String = input
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();

        let (count_str, rest) = compact.split_once('d')?;
        let count = parse_digits(count_str)?;

        let (sides_str, modifier) = match rest.find(['+', '-']) {
            Some(pos) => {
                let magnitude = i32::try_from(parse_digits(&rest[pos + 1..])?).ok()?;
                let modifier = if rest[pos..].starts_with('-') {
                    -magnitude
                } else {
                    magnitude
                };
                (&rest[..pos], modifier)
            }
            None => (rest, 0),
        };
        let sides = parse_digits(sides_str)?;

        if !(1..=MAX_DICE).contains(&count) || !(1..=MAX_SIDES).contains(&sides) {
            return None;
        }

        Some(Self {
            count,
            sides,
            modifier,
        })
    }

    /// The die rolled by this expression.
    pub fn die(&self) -> Die {
        Die::from_sides(self.sides)
    }

    /// Roll every die and apply the modifier.
    pub fn roll<D: DiceSource + ?Sized>(&self, dice: &mut D) -> DiceRoll {
        let rolls = (0..self.count).map(|_| dice.roll_die(self.sides)).collect();
        DiceRoll::from_parts(rolls, self.modifier)
    }

    /// Smallest possible total.
    pub fn min_total(&self) -> i64 {
        i64::from(self.count) + i64::from(self.modifier)
    }

    /// Largest possible total.
    pub fn max_total(&self) -> i64 {
        i64::from(self.count) * i64::from(self.sides) + i64::from(self.modifier)
    }
}

impl std::fmt::Display for DiceExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}d{}", self.count, self.sides)?;
        match self.modifier {
            0 => Ok(()),
            m if m > 0 => write!(f, "+{m}"),
            m => write!(f, "{m}"),
        }
    }
}

/// Parse a dice expression, returning `None` when it is malformed or out of bounds.
pub fn parse_dice_expression(expr: &str) -> Option<DiceExpr> {
    DiceExpr::parse(expr)
}

/// Parse and roll a dice expression in one step.
pub fn roll_expression<D: DiceSource + ?Sized>(expr: &str, dice: &mut D) -> Option<DiceRoll> {
    DiceExpr::parse(expr).map(|e| e.roll(dice))
}

/// A quantity written on a sheet as either a flat number or a dice expression.
///
/// Corruption costs, weapon damage, and armor protection all use this form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Amount {
    /// A fixed integer such as `"2"`.
    Fixed(i32),
    /// A dice expression such as `"1d4"`.
    Dice(DiceExpr),
}

impl Amount {
    /// Parse an amount, or `None` if it is neither an integer nor a dice expression.
    pub fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return None;
        }
        if let Ok(n) = trimmed.parse::<i32>() {
            return Some(Self::Fixed(n));
        }
        DiceExpr::parse(trimmed).map(Self::Dice)
    }

    /// Evaluate the amount, rolling dice if needed.
    pub fn roll<D: DiceSource + ?Sized>(&self, dice: &mut D) -> DiceRoll {
        match self {
            Self::Fixed(n) => DiceRoll::flat(*n),
            Self::Dice(expr) => expr.roll(dice),
        }
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fixed(n) => write!(f, "{n}"),
            Self::Dice(expr) => write!(f, "{expr}"),
        }
    }
}

fn parse_digits(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}
