//! Roll-under attribute tests.
//!
//! Roll a d20 and compare it against `attribute + modifier`; lower is
//! better. With advantage a d4 is rolled as well and subtracted from the
//! d20. A natural 1 always succeeds and a natural 20 always fails, whatever
//! the target or the advantage die.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::dice::{DiceSource, Die};
use crate::resolution::Outcome;

/// Parameters for a single attribute test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeTest {
    /// The (effective) attribute value being tested.
    pub attribute_value: i32,
    /// Situational modifier added to the target.
    pub modifier: i32,
    /// Roll a d4 advantage die and subtract it from the d20.
    pub with_advantage: bool,
}

impl AttributeTest {
    /// A test against `attribute_value` with no modifier or advantage.
    pub fn new(attribute_value: i32) -> Self {
        Self {
            attribute_value,
            ..Self::default()
        }
    }

    /// Set the situational modifier.
    pub fn with_modifier(mut self, modifier: i32) -> Self {
        self.modifier = modifier;
        self
    }

    /// Roll with the advantage die.
    pub fn with_advantage(mut self, advantage: bool) -> Self {
        self.with_advantage = advantage;
        self
    }

    /// The number the adjusted roll must be at or under.
    pub fn target(&self) -> i32 {
        self.attribute_value.saturating_add(self.modifier)
    }

    /// Resolve the test from already-rolled dice.
    pub fn resolve(&self, main: u32, advantage: Option<u32>) -> AttributeTestResult {
        let target = self.target();
        let total_roll = main as i32 - advantage.unwrap_or(0) as i32;
        let is_fumble = main == 20;
        let is_crit = main == 1;
        let is_success = is_crit || (total_roll <= target && !is_fumble);
        AttributeTestResult {
            main,
            advantage,
            target,
            total_roll,
            is_crit,
            is_fumble,
            is_success,
        }
    }
}

/// The full record of an attribute test.
///
/// Serialized records also carry `rolls`, every die in roll order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeTestResult {
    /// The d20 result.
    pub main: u32,
    /// The d4 advantage result, if advantage was used.
    pub advantage: Option<u32>,
    /// Attribute plus modifier.
    pub target: i32,
    /// The d20 minus the advantage die.
    pub total_roll: i32,
    /// True on a natural 1.
    pub is_crit: bool,
    /// True on a natural 20.
    pub is_fumble: bool,
    /// Whether the test succeeded.
    pub is_success: bool,
}

impl AttributeTestResult {
    /// All dice rolled, d20 first.
    pub fn rolls(&self) -> Vec<u32> {
        std::iter::once(self.main).chain(self.advantage).collect()
    }

    /// The result expressed as an [`Outcome`].
    pub fn outcome(&self) -> Outcome {
        match (self.is_success, self.is_crit, self.is_fumble) {
            (true, true, _) => Outcome::CriticalSuccess,
            (true, false, _) => Outcome::Success,
            (false, _, true) => Outcome::CriticalFailure,
            (false, _, false) => Outcome::Failure,
        }
    }
}

impl Serialize for AttributeTestResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("AttributeTestResult", 8)?;
        state.serialize_field("main", &self.main)?;
        state.serialize_field("advantage", &self.advantage)?;
        state.serialize_field("target", &self.target)?;
        state.serialize_field("totalRoll", &self.total_roll)?;
        state.serialize_field("isCrit", &self.is_crit)?;
        state.serialize_field("isFumble", &self.is_fumble)?;
        state.serialize_field("isSuccess", &self.is_success)?;
        state.serialize_field("rolls", &self.rolls())?;
        state.end()
    }
}

/// Roll an attribute test.
pub fn roll_attribute_test<D: DiceSource + ?Sized>(
    test: &AttributeTest,
    dice: &mut D,
) -> AttributeTestResult {
    let main = dice.roll(Die::D20);
    let advantage = test.with_advantage.then(|| dice.roll(Die::D4));
    test.resolve(main, advantage)
}
