//! The eight attributes and their sheet slots.

use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use super::lenient;

/// One of the eight attributes every sheet carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Attribute {
    /// Precision with weapons and tools.
    Accurate,
    /// Wits and learning.
    Cunning,
    /// Stealth and subtlety.
    Discreet,
    /// Charm and influence.
    Persuasive,
    /// Agility and reflexes; the basis of defense.
    Quick,
    /// Willpower; the basis of the corruption threshold.
    Resolute,
    /// Physique; the basis of toughness, pain threshold, and carrying capacity.
    Strong,
    /// Awareness and perception.
    Vigilant,
}

impl Attribute {
    /// All attributes in sheet order.
    pub const ALL: [Self; 8] = [
        Self::Accurate,
        Self::Cunning,
        Self::Discreet,
        Self::Persuasive,
        Self::Quick,
        Self::Resolute,
        Self::Strong,
        Self::Vigilant,
    ];

    /// The document key for this attribute.
    pub fn key(self) -> &'static str {
        match self {
            Self::Accurate => "accurate",
            Self::Cunning => "cunning",
            Self::Discreet => "discreet",
            Self::Persuasive => "persuasive",
            Self::Quick => "quick",
            Self::Resolute => "resolute",
            Self::Strong => "strong",
            Self::Vigilant => "vigilant",
        }
    }

    /// Look up an attribute by key, ignoring case and surrounding whitespace.
    ///
    /// `"None"`, the empty string, and unknown names all yield `None`.
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|a| a.key().eq_ignore_ascii_case(name))
    }
}

impl std::fmt::Display for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let key = self.key();
        let (first, rest) = key.split_at(1);
        write!(f, "{}{rest}", first.to_ascii_uppercase())
    }
}

/// Serde adapter for optional attribute references such as
/// `associatedAttribute`, which store `"None"` when unset.
pub(crate) mod attribute_ref {
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    use super::Attribute;
    use crate::sheet::lenient;

    pub(crate) fn serialize<S: Serializer>(
        value: &Option<Attribute>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(value.map_or("None", Attribute::key))
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Attribute>, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Attribute::parse(&lenient::coerce_string(&value)))
    }
}

/// The value stored for one attribute.
///
/// Characters store a bare number; NPC sheets store an object holding the
/// value, usually with a free-text note.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeSlot {
    /// A bare value.
    Scalar(i32),
    /// A value stored as an object.
    Annotated {
        /// The attribute value.
        value: i32,
        /// Free-text note, if the object has one.
        note: Option<String>,
        /// Other keys of the object, preserved verbatim.
        extra: Map<String, Value>,
    },
}

impl AttributeSlot {
    /// The numeric value, whatever the slot shape.
    pub fn value(&self) -> i32 {
        match self {
            Self::Scalar(v) | Self::Annotated { value: v, .. } => *v,
        }
    }

    /// The note, if this slot carries one.
    pub fn note(&self) -> Option<&str> {
        match self {
            Self::Scalar(_) => None,
            Self::Annotated { note, .. } => note.as_deref(),
        }
    }

    /// Replace the value, keeping any note.
    pub fn set_value(&mut self, new_value: i32) {
        match self {
            Self::Scalar(v) | Self::Annotated { value: v, .. } => *v = new_value,
        }
    }
}

impl Default for AttributeSlot {
    fn default() -> Self {
        Self::Scalar(0)
    }
}

impl Serialize for AttributeSlot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Scalar(v) => serializer.serialize_i32(*v),
            Self::Annotated { value, note, extra } => {
                let mut map = serializer.serialize_map(None)?;
                map.serialize_entry("value", value)?;
                if let Some(note) = note {
                    map.serialize_entry("note", note)?;
                }
                for (key, v) in extra {
                    map.serialize_entry(key, v)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for AttributeSlot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::Object(mut extra) => Self::Annotated {
                value: extra.remove("value").map_or(0, |v| lenient::coerce_int(&v)),
                note: extra.remove("note").map(|v| lenient::coerce_string(&v)),
                extra,
            },
            other => Self::Scalar(lenient::coerce_int(&other)),
        })
    }
}

/// All attribute slots on a sheet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Attributes {
    /// Accurate.
    pub accurate: AttributeSlot,
    /// Cunning.
    pub cunning: AttributeSlot,
    /// Discreet.
    pub discreet: AttributeSlot,
    /// Persuasive.
    pub persuasive: AttributeSlot,
    /// Quick.
    pub quick: AttributeSlot,
    /// Resolute.
    pub resolute: AttributeSlot,
    /// Strong.
    pub strong: AttributeSlot,
    /// Vigilant.
    pub vigilant: AttributeSlot,
    /// Unrecognised keys, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Attributes {
    /// The slot for an attribute.
    pub fn slot(&self, attribute: Attribute) -> &AttributeSlot {
        match attribute {
            Attribute::Accurate => &self.accurate,
            Attribute::Cunning => &self.cunning,
            Attribute::Discreet => &self.discreet,
            Attribute::Persuasive => &self.persuasive,
            Attribute::Quick => &self.quick,
            Attribute::Resolute => &self.resolute,
            Attribute::Strong => &self.strong,
            Attribute::Vigilant => &self.vigilant,
        }
    }

    /// Mutable access to the slot for an attribute.
    pub fn slot_mut(&mut self, attribute: Attribute) -> &mut AttributeSlot {
        match attribute {
            Attribute::Accurate => &mut self.accurate,
            Attribute::Cunning => &mut self.cunning,
            Attribute::Discreet => &mut self.discreet,
            Attribute::Persuasive => &mut self.persuasive,
            Attribute::Quick => &mut self.quick,
            Attribute::Resolute => &mut self.resolute,
            Attribute::Strong => &mut self.strong,
            Attribute::Vigilant => &mut self.vigilant,
        }
    }

    /// The value of an attribute.
    pub fn get(&self, attribute: Attribute) -> i32 {
        self.slot(attribute).value()
    }

    /// Set an attribute's value, keeping any note.
    pub fn set(&mut self, attribute: Attribute, value: i32) {
        self.slot_mut(attribute).set_value(value);
    }

    /// Builder form of [`Attributes::set`].
    pub fn with(mut self, attribute: Attribute, value: i32) -> Self {
        self.set(attribute, value);
        self
    }
}
