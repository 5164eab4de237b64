//! Equipment: loadout records, inventory items, and ammunition.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::attribute::{Attribute, attribute_ref};
use super::lenient;

/// Identifier of a list entry on a sheet.
///
/// Ids loaded from a document are kept as opaque text; new ids are random
/// UUIDs. A missing id decodes as a freshly generated one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl ItemId {
    /// Generate a new random id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// The id as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::generate()
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for ItemId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let text = lenient::coerce_string(&value);
        Ok(if text.is_empty() {
            Self::generate()
        } else {
            Self(text)
        })
    }
}

/// Decode an optional id reference where `null` and `""` mean "none".
fn optional_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<ItemId>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    let text = lenient::coerce_string(&value);
    Ok((!text.is_empty()).then_some(ItemId(text)))
}

/// Decode an optional flag where unreadable values mean "true" and `null`
/// means unset.
fn optional_flag<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<bool>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok((!value.is_null()).then(|| lenient::coerce_bool(&value, true)))
}

/// An equipped weapon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Weapon {
    /// Unique id.
    #[serde(default)]
    pub id: ItemId,
    /// Display name.
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    /// Damage: a dice expression or a flat number.
    #[serde(default, deserialize_with = "lenient::string")]
    pub damage: String,
    /// Attribute used for attack tests; `None` means Accurate.
    #[serde(
        default,
        with = "attribute_ref",
        skip_serializing_if = "Option::is_none"
    )]
    pub attack_attribute: Option<Attribute>,
    /// Free-text qualities (e.g. "Precise, Balanced").
    #[serde(default, deserialize_with = "lenient::string")]
    pub quality: String,
    /// Carried weight.
    #[serde(default, deserialize_with = "lenient::float")]
    pub weight: f64,
    /// Ammunition consumed on each attack, if any.
    #[serde(
        default,
        deserialize_with = "optional_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub projectile_id: Option<ItemId>,
    /// Unrecognised fields, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Weapon {
    /// Create a weapon with a fresh id.
    pub fn new(name: impl Into<String>, damage: impl Into<String>) -> Self {
        Self {
            id: ItemId::generate(),
            name: name.into(),
            damage: damage.into(),
            attack_attribute: None,
            quality: String::new(),
            weight: 0.0,
            projectile_id: None,
            extra: Map::new(),
        }
    }

    /// Set the weight.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Set the attack attribute.
    pub fn with_attack_attribute(mut self, attribute: Attribute) -> Self {
        self.attack_attribute = Some(attribute);
        self
    }

    /// Link the weapon to a projectile stack.
    pub fn with_projectile(mut self, projectile: ItemId) -> Self {
        self.projectile_id = Some(projectile);
        self
    }
}

/// An armor in the loadout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Armor {
    /// Unique id.
    #[serde(default)]
    pub id: ItemId,
    /// Display name.
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    /// Protection: a dice expression or a flat number.
    #[serde(default, deserialize_with = "lenient::string")]
    pub protection: String,
    /// Free-text qualities.
    #[serde(default, deserialize_with = "lenient::string")]
    pub quality: String,
    /// Carried weight.
    #[serde(default, deserialize_with = "lenient::float")]
    pub weight: f64,
    /// Whether the armor is worn; absent means worn. See [`Armor::is_worn`].
    #[serde(
        default,
        deserialize_with = "optional_flag",
        skip_serializing_if = "Option::is_none"
    )]
    pub equipped: Option<bool>,
    /// Defense penalty while worn. The sign is ignored.
    #[serde(default, deserialize_with = "lenient::int")]
    pub obstructive: i32,
    /// Unrecognised fields, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Armor {
    /// Create a worn armor with a fresh id.
    pub fn new(name: impl Into<String>, protection: impl Into<String>) -> Self {
        Self {
            id: ItemId::generate(),
            name: name.into(),
            protection: protection.into(),
            quality: String::new(),
            weight: 0.0,
            equipped: None,
            obstructive: 0,
            extra: Map::new(),
        }
    }

    /// Set the obstructive penalty.
    pub fn with_obstructive(mut self, obstructive: i32) -> Self {
        self.obstructive = obstructive;
        self
    }

    /// Set the weight.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Set whether the armor is worn.
    pub fn worn(mut self, equipped: bool) -> Self {
        self.equipped = Some(equipped);
        self
    }

    /// Whether the armor is worn. Only worn armor hinders defense.
    pub fn is_worn(&self) -> bool {
        self.equipped.unwrap_or(true)
    }
}

/// An unequipped item.
///
/// `data` carries the category-specific fields (damage, protection, and so
/// on) that seed a loadout record when the item is equipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    /// Unique id.
    #[serde(default)]
    pub id: ItemId,
    /// Display name.
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    /// Free-form category such as "weapon", "armor", or "gear".
    #[serde(default, deserialize_with = "lenient::string")]
    pub category: String,
    /// Stack size.
    #[serde(
        default = "lenient::default_quantity",
        deserialize_with = "lenient::quantity"
    )]
    pub quantity: u32,
    /// Weight of one unit.
    #[serde(default, deserialize_with = "lenient::float")]
    pub weight: f64,
    /// Category-specific fields.
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub data: Map<String, Value>,
    /// Unrecognised fields, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl InventoryItem {
    /// Create a single item with a fresh id.
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: ItemId::generate(),
            name: name.into(),
            category: category.into(),
            quantity: 1,
            weight: 0.0,
            data: Map::new(),
            extra: Map::new(),
        }
    }

    /// Set the stack size.
    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    /// Set the unit weight.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Add a field to the data bag.
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }
}

/// A stack of ammunition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Projectile {
    /// Unique id.
    #[serde(default)]
    pub id: ItemId,
    /// Display name.
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    /// Rounds remaining.
    #[serde(default, deserialize_with = "lenient::quantity")]
    pub quantity: u32,
    /// Weight of one round.
    #[serde(default, deserialize_with = "lenient::float")]
    pub weight: f64,
    /// Unrecognised fields, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Projectile {
    /// Create a projectile stack with a fresh id.
    pub fn new(name: impl Into<String>, quantity: u32) -> Self {
        Self {
            id: ItemId::generate(),
            name: name.into(),
            quantity,
            weight: 0.0,
            extra: Map::new(),
        }
    }

    /// Set the weight of one round.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }
}
