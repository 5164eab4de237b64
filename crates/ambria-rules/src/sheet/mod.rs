//! Character and NPC sheets.
//!
//! A [`Sheet`] is the in-memory form of the structured document the
//! persistence layer stores. Decoding is deliberately forgiving: numeric
//! fields tolerate blanks and text, and every object keeps the fields it
//! does not recognise so a decode/encode cycle never loses data.
//!
//! Rule code reads sheets through the [`StatBlock`] trait so that character
//! and NPC sheets share one implementation of every formula.

pub mod ability;
pub mod attribute;
pub mod item;
pub(crate) mod lenient;

pub use ability::{Ability, AbilityEffect, AbilityLevel};
pub use attribute::{Attribute, AttributeSlot, Attributes};
pub use item::{Armor, InventoryItem, ItemId, Projectile, Weapon};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Which kind of sheet this is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SheetKind {
    /// A player character.
    #[default]
    Character,
    /// A non-player character.
    Npc,
}

impl<'de> Deserialize<'de> for SheetKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(
            if lenient::coerce_string(&value).trim().eq_ignore_ascii_case("npc") {
                Self::Npc
            } else {
                Self::Character
            },
        )
    }
}

/// Vitality bookkeeping. The maximum itself is derived, not stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Toughness {
    /// Current toughness.
    #[serde(default, deserialize_with = "lenient::int")]
    pub current: i32,
    /// Permanent adjustment to the derived maximum.
    #[serde(default, deserialize_with = "lenient::int")]
    pub max_modifier: i32,
    /// Temporary bonus toughness.
    #[serde(default, deserialize_with = "lenient::int")]
    pub temporary: i32,
    /// Unrecognised fields, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Accumulated corruption.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Corruption {
    /// Temporary corruption; ability costs land here.
    #[serde(default, deserialize_with = "lenient::int")]
    pub temporary: i32,
    /// Permanent corruption.
    #[serde(default, deserialize_with = "lenient::int")]
    pub permanent: i32,
    /// Free-text stigma notes.
    #[serde(default, deserialize_with = "lenient::string")]
    pub stigma: String,
    /// Unrecognised fields, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Corruption {
    /// Temporary plus permanent corruption.
    pub fn total(&self) -> i32 {
        self.temporary.saturating_add(self.permanent)
    }
}

/// Experience points.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    /// Experience earned.
    #[serde(default, deserialize_with = "lenient::int")]
    pub total: i32,
    /// Experience spent.
    #[serde(default, deserialize_with = "lenient::int")]
    pub spent: i32,
    /// Unrecognised fields, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Experience {
    /// Experience left to spend.
    pub fn available(&self) -> i32 {
        self.total.saturating_sub(self.spent)
    }
}

/// A character or NPC sheet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sheet {
    /// Character or NPC.
    #[serde(default)]
    pub kind: SheetKind,
    /// Display name.
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    /// The eight attributes.
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub attributes: Attributes,
    /// Vitality.
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub toughness: Toughness,
    /// Corruption pools.
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub corruption: Corruption,
    /// Flat adjustment to the derived pain threshold.
    #[serde(default, deserialize_with = "lenient::int")]
    pub pain_threshold_bonus: i32,
    /// Experience; only meaningful for characters.
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub experience: Experience,
    /// Equipped weapons.
    #[serde(default, deserialize_with = "lenient::list")]
    pub weapons: Vec<Weapon>,
    /// Armor in the loadout.
    #[serde(default, deserialize_with = "lenient::list")]
    pub armors: Vec<Armor>,
    /// Unequipped items.
    #[serde(default, deserialize_with = "lenient::list")]
    pub inventory: Vec<InventoryItem>,
    /// Ammunition stacks.
    #[serde(default, deserialize_with = "lenient::list")]
    pub projectiles: Vec<Projectile>,
    /// Abilities.
    #[serde(default, deserialize_with = "lenient::list")]
    pub abilities: Vec<Ability>,
    /// Unrecognised fields, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Sheet {
    /// Create an empty sheet of the given kind.
    pub fn new(kind: SheetKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            ..Self::default()
        }
    }

    /// Create an empty character sheet.
    pub fn character(name: impl Into<String>) -> Self {
        Self::new(SheetKind::Character, name)
    }

    /// Create an empty NPC sheet.
    pub fn npc(name: impl Into<String>) -> Self {
        Self::new(SheetKind::Npc, name)
    }

    /// Decode a sheet document and tag any untagged abilities.
    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        let mut sheet: Self = serde_json::from_value(value)?;
        sheet.resolve_ability_effects();
        Ok(sheet)
    }

    /// Decode a sheet from JSON text and tag any untagged abilities.
    pub fn from_json_str(text: &str) -> serde_json::Result<Self> {
        let mut sheet: Self = serde_json::from_str(text)?;
        sheet.resolve_ability_effects();
        Ok(sheet)
    }

    /// Encode the sheet, including every preserved unknown field.
    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }

    /// Tag abilities that were stored without an effect tag.
    pub fn resolve_ability_effects(&mut self) {
        for ability in &mut self.abilities {
            ability.resolve_effect();
        }
    }

    /// Builder: set an attribute value.
    pub fn with_attribute(mut self, attribute: Attribute, value: i32) -> Self {
        self.attributes.set(attribute, value);
        self
    }

    /// Builder: add an ability.
    pub fn with_ability(mut self, ability: Ability) -> Self {
        self.abilities.push(ability);
        self
    }
}

/// Read access to everything the rule formulas need from a sheet.
pub trait StatBlock {
    /// Character or NPC.
    fn kind(&self) -> SheetKind;
    /// Base value of an attribute, before ability bonuses.
    fn base_attribute(&self, attribute: Attribute) -> i32;
    /// Vitality bookkeeping.
    fn toughness(&self) -> &Toughness;
    /// Corruption pools.
    fn corruption(&self) -> &Corruption;
    /// Flat pain threshold adjustment.
    fn pain_threshold_bonus(&self) -> i32;
    /// Experience, for sheet kinds that track it.
    fn experience(&self) -> Option<&Experience>;
    /// Abilities in list order.
    fn abilities(&self) -> &[Ability];
    /// Equipped weapons.
    fn weapons(&self) -> &[Weapon];
    /// Armor in the loadout.
    fn armors(&self) -> &[Armor];
    /// Unequipped items.
    fn inventory(&self) -> &[InventoryItem];
    /// Ammunition stacks.
    fn projectiles(&self) -> &[Projectile];
}

impl StatBlock for Sheet {
    fn kind(&self) -> SheetKind {
        self.kind
    }

    fn base_attribute(&self, attribute: Attribute) -> i32 {
        self.attributes.get(attribute)
    }

    fn toughness(&self) -> &Toughness {
        &self.toughness
    }

    fn corruption(&self) -> &Corruption {
        &self.corruption
    }

    fn pain_threshold_bonus(&self) -> i32 {
        self.pain_threshold_bonus
    }

    fn experience(&self) -> Option<&Experience> {
        match self.kind {
            SheetKind::Character => Some(&self.experience),
            SheetKind::Npc => None,
        }
    }

    fn abilities(&self) -> &[Ability] {
        &self.abilities
    }

    fn weapons(&self) -> &[Weapon] {
        &self.weapons
    }

    fn armors(&self) -> &[Armor] {
        &self.armors
    }

    fn inventory(&self) -> &[InventoryItem] {
        &self.inventory
    }

    fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }
}
