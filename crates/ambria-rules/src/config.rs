//! House-rule configuration for the rules engine.

use serde::Deserialize;

/// Tunable rule constants.
///
/// The defaults are the rules as written: at most two equipped weapons, with
/// `1d6` damage and `1d4` protection as equip fallbacks. Any other value is a
/// house rule.
///
/// Every field has a default, so a partial JSON document (or none at all)
/// yields a usable configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// How many weapons may be equipped at once. The rules cap this at 2.
    pub max_equipped_weapons: usize,
    /// Damage expression used when an equipped weapon's data has none.
    pub default_weapon_damage: String,
    /// Protection expression used when an equipped armor's data has none.
    pub default_armor_protection: String,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            max_equipped_weapons: 2,
            default_weapon_damage: "1d6".to_string(),
            default_armor_protection: "1d4".to_string(),
        }
    }
}

impl RulesConfig {
    /// Set the weapon loadout limit.
    pub fn with_max_equipped_weapons(mut self, limit: usize) -> Self {
        self.max_equipped_weapons = limit;
        self
    }

    /// Set the fallback weapon damage expression.
    pub fn with_default_weapon_damage(mut self, expr: impl Into<String>) -> Self {
        self.default_weapon_damage = expr.into();
        self
    }

    /// Set the fallback armor protection expression.
    pub fn with_default_armor_protection(mut self, expr: impl Into<String>) -> Self {
        self.default_armor_protection = expr.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let cfg = RulesConfig::default();
        assert_eq!(cfg.max_equipped_weapons, 2);
        assert_eq!(cfg.default_weapon_damage, "1d6");
        assert_eq!(cfg.default_armor_protection, "1d4");
    }

    #[test]
    fn builder_methods() {
        let cfg = RulesConfig::default()
            .with_max_equipped_weapons(3)
            .with_default_weapon_damage("1d8")
            .with_default_armor_protection("1d6");
        assert_eq!(cfg.max_equipped_weapons, 3);
        assert_eq!(cfg.default_weapon_damage, "1d8");
        assert_eq!(cfg.default_armor_protection, "1d6");
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: RulesConfig = serde_json::from_str(r#"{"max_equipped_weapons": 1}"#).unwrap();
        assert_eq!(cfg.max_equipped_weapons, 1);
        assert_eq!(cfg.default_weapon_damage, "1d6");
    }

    #[test]
    fn empty_json_is_the_rules_as_written() {
        let cfg: RulesConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, RulesConfig::default());
        assert_eq!(cfg.max_equipped_weapons, 2);
    }
}
