//! Abilities and the rule effects they switch on.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::attribute::{Attribute, attribute_ref};
use super::lenient;
use crate::dice::Amount;

/// Mastery level of an ability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub enum AbilityLevel {
    /// First level.
    #[default]
    Novice,
    /// Second level.
    Adept,
    /// Third level.
    Master,
}

impl AbilityLevel {
    /// Parse a level name, ignoring case. Unknown names yield `None`.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "novice" => Some(Self::Novice),
            "adept" => Some(Self::Adept),
            "master" => Some(Self::Master),
            _ => None,
        }
    }

    /// The attribute bonus an exceptional-attribute ability grants at this level.
    pub fn attribute_bonus(self) -> i32 {
        match self {
            Self::Novice => 1,
            Self::Adept => 2,
            Self::Master => 3,
        }
    }
}

impl<'de> Deserialize<'de> for AbilityLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::parse(&lenient::coerce_string(&value)).unwrap_or_default())
    }
}

impl std::fmt::Display for AbilityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Novice => write!(f, "Novice"),
            Self::Adept => write!(f, "Adept"),
            Self::Master => write!(f, "Master"),
        }
    }
}

/// A rule effect carried by an ability.
///
/// Tagged once when the ability is entered. An ability stored without a
/// readable tag falls back to the effect named by its display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AbilityEffect {
    /// No mechanical effect on derived stats.
    #[default]
    None,
    /// Raises the associated attribute by the level bonus.
    ExceptionalAttribute,
    /// Fighting stance that fixes defensive Quick below Master level.
    Berserk,
    /// Raises the toughness base to Strong + 5.
    FeatOfStrength,
}

impl AbilityEffect {
    /// Infer the effect from an ability name.
    pub fn from_name(name: &str) -> Self {
        let name = name.to_lowercase().replace('-', " ");
        if name.contains("berserk") {
            Self::Berserk
        } else if name.contains("feat of strength") || name.contains("feats of strength") {
            Self::FeatOfStrength
        } else if name.contains("exceptional") {
            Self::ExceptionalAttribute
        } else {
            Self::None
        }
    }

    /// Parse a stored tag, ignoring case and separators. Unknown tags yield `None`.
    pub fn parse(tag: &str) -> Option<Self> {
        let tag: String = tag
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match tag.as_str() {
            "none" => Some(Self::None),
            "exceptionalattribute" => Some(Self::ExceptionalAttribute),
            "berserk" => Some(Self::Berserk),
            "featofstrength" => Some(Self::FeatOfStrength),
            _ => None,
        }
    }
}

/// Decode a stored effect tag. Unreadable tags count as missing, so the
/// effect is inferred from the ability name instead.
fn effect_tag<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<AbilityEffect>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(AbilityEffect::parse(&lenient::coerce_string(&value)))
}

/// An ability on a sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ability {
    /// Display name.
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    /// Mastery level.
    #[serde(default)]
    pub level: AbilityLevel,
    /// Attribute tested when the ability is used, if any.
    #[serde(default, with = "attribute_ref")]
    pub associated_attribute: Option<Attribute>,
    /// Corruption gained on use: an integer or a dice expression.
    #[serde(default, deserialize_with = "lenient::string")]
    pub corruption_cost: String,
    /// Whether the ability is currently in effect.
    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_active: bool,
    /// Rule effect tag. Absent only on documents written before tagging.
    #[serde(
        default,
        deserialize_with = "effect_tag",
        skip_serializing_if = "Option::is_none"
    )]
    pub effect: Option<AbilityEffect>,
    /// Unrecognised fields, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Ability {
    /// Create an inactive ability, tagging its effect from the name.
    pub fn new(name: impl Into<String>, level: AbilityLevel) -> Self {
        let name = name.into();
        let effect = AbilityEffect::from_name(&name);
        Self {
            name,
            level,
            associated_attribute: None,
            corruption_cost: String::new(),
            is_active: false,
            effect: Some(effect),
            extra: Map::new(),
        }
    }

    /// Mark the ability active.
    pub fn active(mut self) -> Self {
        self.is_active = true;
        self
    }

    /// Set the associated attribute.
    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.associated_attribute = Some(attribute);
        self
    }

    /// Set the corruption cost.
    pub fn with_corruption_cost(mut self, cost: impl Into<String>) -> Self {
        self.corruption_cost = cost.into();
        self
    }

    /// Override the effect tag.
    pub fn with_effect(mut self, effect: AbilityEffect) -> Self {
        self.effect = Some(effect);
        self
    }

    /// The effect tag, or the effect inferred from the name when untagged.
    pub fn effect(&self) -> AbilityEffect {
        self.effect.unwrap_or_else(|| AbilityEffect::from_name(&self.name))
    }

    /// Tag the effect from the name if it has not been tagged yet.
    pub fn resolve_effect(&mut self) {
        if self.effect.is_none() {
            self.effect = Some(AbilityEffect::from_name(&self.name));
        }
    }

    /// The parsed corruption cost, or `None` if it is blank or malformed.
    pub fn corruption_amount(&self) -> Option<Amount> {
        Amount::parse(&self.corruption_cost)
    }
}
