//! Dice expression results.

use serde::{Deserialize, Serialize};

/// The result of evaluating a dice expression or a fixed amount.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DiceRoll {
    /// Individual die values, in roll order. Empty for fixed amounts.
    pub rolls: Vec<u32>,
    /// Signed modifier applied after summing the dice.
    pub modifier: i32,
    /// Sum of the dice plus the modifier.
    pub total: i32,
}

impl DiceRoll {
    /// A roll with no dice, only a flat value.
    pub fn flat(value: i32) -> Self {
        Self {
            rolls: Vec::new(),
            modifier: value,
            total: value,
        }
    }

    /// Build a roll from die values and a modifier, computing the total.
    pub fn from_parts(rolls: Vec<u32>, modifier: i32) -> Self {
        let dice: i64 = rolls.iter().map(|&v| i64::from(v)).sum();
        let total = (dice + i64::from(modifier)).clamp(i64::from(i32::MIN), i64::from(i32::MAX));
        Self {
            rolls,
            modifier,
            total: total as i32,
        }
    }

    /// Sum of the dice alone.
    pub fn dice_total(&self) -> i32 {
        self.total.saturating_sub(self.modifier)
    }

    /// Return a copy with an extra modifier folded in.
    pub fn with_bonus(mut self, bonus: i32) -> Self {
        self.modifier = self.modifier.saturating_add(bonus);
        self.total = self.total.saturating_add(bonus);
        self
    }
}

impl std::fmt::Display for DiceRoll {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let values: Vec<String> = self.rolls.iter().map(|v| v.to_string()).collect();
        write!(f, "[{}]", values.join(", "))?;
        if self.modifier > 0 {
            write!(f, " +{}", self.modifier)?;
        } else if self.modifier < 0 {
            write!(f, " {}", self.modifier)?;
        }
        write!(f, " = {}", self.total)
    }
}
