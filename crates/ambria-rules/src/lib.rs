//! Rules engine for Symbaroum-style tabletop play.
//!
//! Provides dice rolling and expression parsing, the roll-under d20
//! attribute test, character and NPC sheets with lenient decoding, derived
//! statistics, equip/unequip transitions between inventory and loadout, and
//! a resolver for named checks (attributes, abilities, attacks, defense,
//! damage and protection).
//!
//! The engine works on in-memory data only. Randomness is injected through
//! [`DiceSource`], so every operation can be replayed with [`FixedDice`] or a
//! seeded RNG.

pub mod config;
pub mod dice;
pub mod error;
pub mod loadout;
pub mod resolution;
pub mod rules;
pub mod sheet;
pub mod stats;

pub use config::RulesConfig;
pub use dice::{
    Amount, DiceExpr, DiceRoll, DiceSource, Die, FixedDice, parse_dice_expression, roll_die,
    roll_expression,
};
pub use error::{ListName, RulesError, RulesResult};
pub use loadout::{Equipped, LoadoutKind, equip_item, unequip_item};
pub use resolution::{AttributeTest, AttributeTestResult, Outcome, roll_attribute_test};
pub use rules::{CheckEffect, CheckKind, CheckRequest, CheckResult, Resolution, resolve_check};
pub use sheet::{
    Ability, AbilityEffect, AbilityLevel, Armor, Attribute, AttributeSlot, Attributes, Corruption,
    Experience, InventoryItem, ItemId, Projectile, Sheet, SheetKind, StatBlock, Toughness, Weapon,
};
pub use stats::{DerivedStats, Encumbrance, EncumbranceStatus, derive_stats, recompute};
