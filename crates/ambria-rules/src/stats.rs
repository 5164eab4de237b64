//! Derived statistics.
//!
//! [`derive_stats`] is a pure function of a sheet: effective attributes,
//! defense, toughness, thresholds, encumbrance, and experience. It never
//! fails; every missing or malformed input has already been read as zero.
//!
//! [`recompute`] is the one place the calculator touches the sheet: if
//! current toughness exceeds the newly derived maximum it is clamped down.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::sheet::{AbilityEffect, AbilityLevel, Attribute, Sheet, StatBlock};

/// Floor for maximum toughness and carrying capacity.
pub const MIN_BASE: i32 = 10;

/// Defensive Quick while a berserk stance below Master level is active.
pub const BERSERK_DEFENSIVE_QUICK: i32 = 5;

/// Toughness bonus over Strong granted by Feat of Strength.
pub const FEAT_OF_STRENGTH_BONUS: i32 = 5;

/// How heavily loaded a character is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EncumbranceStatus {
    /// At most half the carrying capacity.
    Light,
    /// More than half the carrying capacity.
    Heavy,
    /// More than the carrying capacity.
    Overloaded,
}

impl std::fmt::Display for EncumbranceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Light => write!(f, "Light"),
            Self::Heavy => write!(f, "Heavy"),
            Self::Overloaded => write!(f, "Overloaded"),
        }
    }
}

/// Carried weight against capacity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Encumbrance {
    /// Total counted weight.
    pub weight: f64,
    /// Carrying capacity.
    pub max_load: i32,
    /// Load status.
    pub status: EncumbranceStatus,
}

/// Everything derived from a sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedStats {
    /// Attribute values after exceptional-attribute bonuses.
    pub attributes: BTreeMap<Attribute, i32>,
    /// Level of the active berserk ability, if any.
    pub berserk: Option<AbilityLevel>,
    /// Whether a feat-of-strength ability is active.
    pub feat_of_strength: bool,
    /// Quick as used for defense.
    pub defensive_quick: i32,
    /// Sum of obstructive penalties on worn armor.
    pub total_obstructive: i32,
    /// Defense value.
    pub defense: i32,
    /// Maximum toughness.
    pub toughness_max: i32,
    /// Current toughness, capped at the maximum.
    pub toughness_current: i32,
    /// At or below half of maximum toughness.
    pub is_bloodied: bool,
    /// Pain threshold.
    pub pain_threshold: i32,
    /// Corruption threshold.
    pub corruption_threshold: i32,
    /// Temporary plus permanent corruption.
    pub total_corruption: i32,
    /// Carrying status.
    pub encumbrance: Encumbrance,
    /// Unspent experience; `None` for sheets that do not track it.
    pub experience_available: Option<i32>,
}

impl DerivedStats {
    /// Effective value of an attribute.
    pub fn attribute(&self, attribute: Attribute) -> i32 {
        self.attributes.get(&attribute).copied().unwrap_or(0)
    }
}

/// Compute derived statistics for any sheet.
pub fn derive_stats<S: StatBlock + ?Sized>(sheet: &S) -> DerivedStats {
    let attributes = effective_attributes(sheet);
    let attr = |a: Attribute| attributes.get(&a).copied().unwrap_or(0);
    let strong = attr(Attribute::Strong);

    let active = move |effect: AbilityEffect| {
        sheet
            .abilities()
            .iter()
            .find(|a| a.is_active && a.effect() == effect)
    };
    let berserk = active(AbilityEffect::Berserk).map(|a| a.level);
    let feat_of_strength = active(AbilityEffect::FeatOfStrength).is_some();

    // Defense
    let defensive_quick = match berserk {
        Some(level) if level != AbilityLevel::Master => BERSERK_DEFENSIVE_QUICK,
        _ => attr(Attribute::Quick),
    };
    let total_obstructive: i32 = sheet
        .armors()
        .iter()
        .filter(|a| a.is_worn())
        .map(|a| a.obstructive.saturating_abs())
        .fold(0, i32::saturating_add);
    let defense = defensive_quick.saturating_sub(total_obstructive);

    // Vitality
    let max_hp_base = if feat_of_strength {
        strong.saturating_add(FEAT_OF_STRENGTH_BONUS).max(MIN_BASE)
    } else {
        strong.max(MIN_BASE)
    };
    let toughness_max = max_hp_base.saturating_add(sheet.toughness().max_modifier);
    let toughness_current = sheet.toughness().current.min(toughness_max);
    let is_bloodied = i64::from(toughness_current) * 2 <= i64::from(toughness_max);

    let pain_threshold = half_rounded_up(strong)
        .saturating_add(sheet.pain_threshold_bonus())
        .max(1);
    let corruption_threshold = half_rounded_up(attr(Attribute::Resolute));

    DerivedStats {
        berserk,
        feat_of_strength,
        defensive_quick,
        total_obstructive,
        defense,
        toughness_max,
        toughness_current,
        is_bloodied,
        pain_threshold,
        corruption_threshold,
        total_corruption: sheet.corruption().total(),
        encumbrance: encumbrance(sheet, strong),
        experience_available: sheet.experience().map(|xp| xp.available()),
        attributes,
    }
}

/// Derive stats and clamp current toughness to the new maximum.
///
/// Running this repeatedly, or after any sequence of edits, leaves the sheet
/// in the same state as running it once.
pub fn recompute(sheet: &mut Sheet) -> DerivedStats {
    let stats = derive_stats(&*sheet);
    if sheet.toughness.current > stats.toughness_max {
        debug!(
            sheet = %sheet.name,
            from = sheet.toughness.current,
            to = stats.toughness_max,
            "clamping toughness to maximum"
        );
        sheet.toughness.current = stats.toughness_max;
    }
    stats
}

fn effective_attributes<S: StatBlock + ?Sized>(sheet: &S) -> BTreeMap<Attribute, i32> {
    let mut values: BTreeMap<Attribute, i32> = Attribute::ALL
        .into_iter()
        .map(|a| (a, sheet.base_attribute(a)))
        .collect();

    let exceptional = sheet
        .abilities()
        .iter()
        .filter(|a| a.is_active && a.effect() == AbilityEffect::ExceptionalAttribute);
    for ability in exceptional {
        if let Some(target) = ability.associated_attribute {
            let value = values.entry(target).or_insert(0);
            *value = value.saturating_add(ability.level.attribute_bonus());
        }
    }
    values
}

/// Armor weight is not counted; only inventory, ammunition, and weapons are.
fn encumbrance<S: StatBlock + ?Sized>(sheet: &S, strong: i32) -> Encumbrance {
    let inventory: f64 = sheet
        .inventory()
        .iter()
        .map(|i| i.weight * f64::from(i.quantity))
        .sum();
    let projectiles: f64 = sheet
        .projectiles()
        .iter()
        .map(|p| p.weight * f64::from(p.quantity))
        .sum();
    let weapons: f64 = sheet.weapons().iter().map(|w| w.weight).sum();
    let weight = inventory + projectiles + weapons;

    let max_load = strong.max(MIN_BASE);
    let status = if weight > f64::from(max_load) {
        EncumbranceStatus::Overloaded
    } else if weight > f64::from(max_load) / 2.0 {
        EncumbranceStatus::Heavy
    } else {
        EncumbranceStatus::Light
    };

    Encumbrance {
        weight,
        max_load,
        status,
    }
}

/// `ceil(n / 2)` for any sign.
fn half_rounded_up(n: i32) -> i32 {
    n.div_euclid(2) + n.rem_euclid(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::{Ability, Armor, InventoryItem, Projectile, Weapon};
    use proptest::prelude::*;

    fn sheet_with(attrs: &[(Attribute, i32)]) -> Sheet {
        attrs
            .iter()
            .fold(Sheet::character("Test"), |s, &(a, v)| s.with_attribute(a, v))
    }

    #[test]
    fn strong_sixteen_scenario() {
        let mut sheet = sheet_with(&[(Attribute::Strong, 16)]);
        sheet.toughness.max_modifier = 2;
        let stats = derive_stats(&sheet);
        assert_eq!(stats.toughness_max, 18);
        assert_eq!(stats.pain_threshold, 8);
    }

    #[test]
    fn toughness_floor_applies_to_weak_and_blank_sheets() {
        let stats = derive_stats(&Sheet::default());
        assert_eq!(stats.toughness_max, 10);
        assert_eq!(stats.encumbrance.max_load, 10);
        assert_eq!(stats.pain_threshold, 1);
    }

    #[test]
    fn corruption_threshold_rounds_up() {
        let seven = derive_stats(&sheet_with(&[(Attribute::Resolute, 7)]));
        assert_eq!(seven.corruption_threshold, 4);
        let eight = derive_stats(&sheet_with(&[(Attribute::Resolute, 8)]));
        assert_eq!(eight.corruption_threshold, 4);
    }

    #[test]
    fn half_rounded_up_handles_negatives() {
        assert_eq!(half_rounded_up(7), 4);
        assert_eq!(half_rounded_up(8), 4);
        assert_eq!(half_rounded_up(0), 0);
        assert_eq!(half_rounded_up(-3), -1);
        assert_eq!(half_rounded_up(-4), -2);
    }

    #[test]
    fn pain_threshold_bonus_and_floor() {
        let mut sheet = sheet_with(&[(Attribute::Strong, 11)]);
        sheet.pain_threshold_bonus = 2;
        assert_eq!(derive_stats(&sheet).pain_threshold, 8);
        sheet.pain_threshold_bonus = -20;
        assert_eq!(derive_stats(&sheet).pain_threshold, 1);
    }

    #[test]
    fn exceptional_attribute_bonus_scales_with_level() {
        for (level, expected) in [
            (AbilityLevel::Novice, 12),
            (AbilityLevel::Adept, 13),
            (AbilityLevel::Master, 14),
        ] {
            let sheet = sheet_with(&[(Attribute::Quick, 11)]).with_ability(
                Ability::new("Exceptional Attribute", level)
                    .with_attribute(Attribute::Quick)
                    .active(),
            );
            let stats = derive_stats(&sheet);
            assert_eq!(stats.attribute(Attribute::Quick), expected);
            assert_eq!(stats.defense, expected);
        }
    }

    #[test]
    fn inactive_or_unattached_exceptional_ability_does_nothing() {
        let sheet = sheet_with(&[(Attribute::Strong, 12)])
            .with_ability(
                Ability::new("Exceptional Attribute", AbilityLevel::Master)
                    .with_attribute(Attribute::Strong),
            )
            .with_ability(Ability::new("Exceptional Attribute", AbilityLevel::Master).active());
        assert_eq!(derive_stats(&sheet).attribute(Attribute::Strong), 12);
    }

    #[test]
    fn exceptional_strong_feeds_toughness_and_pain() {
        let sheet = sheet_with(&[(Attribute::Strong, 15)]).with_ability(
            Ability::new("Exceptional Attribute", AbilityLevel::Adept)
                .with_attribute(Attribute::Strong)
                .active(),
        );
        let stats = derive_stats(&sheet);
        assert_eq!(stats.toughness_max, 17);
        assert_eq!(stats.pain_threshold, 9);
    }

    #[test]
    fn berserk_below_master_fixes_defensive_quick() {
        let sheet = sheet_with(&[(Attribute::Quick, 14)])
            .with_ability(Ability::new("Berserker", AbilityLevel::Adept).active());
        let stats = derive_stats(&sheet);
        assert_eq!(stats.berserk, Some(AbilityLevel::Adept));
        assert_eq!(stats.defensive_quick, 5);
        assert_eq!(stats.defense, 5);
    }

    #[test]
    fn master_berserk_keeps_quick() {
        let sheet = sheet_with(&[(Attribute::Quick, 14)])
            .with_ability(Ability::new("Berserker", AbilityLevel::Master).active());
        assert_eq!(derive_stats(&sheet).defense, 14);
    }

    #[test]
    fn only_first_active_berserk_counts() {
        let sheet = sheet_with(&[(Attribute::Quick, 14)])
            .with_ability(Ability::new("Berserker", AbilityLevel::Novice))
            .with_ability(Ability::new("Berserker", AbilityLevel::Master).active())
            .with_ability(Ability::new("Berserker", AbilityLevel::Novice).active());
        let stats = derive_stats(&sheet);
        assert_eq!(stats.berserk, Some(AbilityLevel::Master));
        assert_eq!(stats.defense, 14);
    }

    #[test]
    fn effect_tag_wins_over_name() {
        let sheet = sheet_with(&[(Attribute::Quick, 14)]).with_ability(
            Ability::new("Battle Fury", AbilityLevel::Novice)
                .with_effect(AbilityEffect::Berserk)
                .active(),
        );
        assert_eq!(derive_stats(&sheet).defense, 5);
    }

    #[test]
    fn obstructive_counts_worn_armor_only_and_ignores_sign() {
        let mut sheet = sheet_with(&[(Attribute::Quick, 13)]);
        sheet.armors.push(Armor::new("Chain", "1d6").with_obstructive(-3));
        sheet.armors.push(Armor::new("Helm", "1").with_obstructive(1));
        sheet
            .armors
            .push(Armor::new("Spare", "1d4").with_obstructive(4).worn(false));
        let stats = derive_stats(&sheet);
        assert_eq!(stats.total_obstructive, 4);
        assert_eq!(stats.defense, 9);
    }

    #[test]
    fn feat_of_strength_raises_toughness_base() {
        let sheet = sheet_with(&[(Attribute::Strong, 13)])
            .with_ability(Ability::new("Feat of Strength", AbilityLevel::Novice).active());
        let stats = derive_stats(&sheet);
        assert!(stats.feat_of_strength);
        assert_eq!(stats.toughness_max, 18);
    }

    #[test]
    fn feat_of_strength_keeps_floor() {
        let sheet = sheet_with(&[(Attribute::Strong, 3)])
            .with_ability(Ability::new("Feat of Strength", AbilityLevel::Novice).active());
        assert_eq!(derive_stats(&sheet).toughness_max, 10);
    }

    #[test]
    fn bloodied_at_half() {
        let mut sheet = sheet_with(&[(Attribute::Strong, 12)]);
        sheet.toughness.current = 6;
        assert!(derive_stats(&sheet).is_bloodied);
        sheet.toughness.current = 7;
        assert!(!derive_stats(&sheet).is_bloodied);
    }

    #[test]
    fn bloodied_uses_odd_half_without_truncation() {
        // 11 / 2 = 5.5, so 5 is bloodied and 6 is not.
        let mut sheet = sheet_with(&[(Attribute::Strong, 11)]);
        sheet.toughness.current = 5;
        assert!(derive_stats(&sheet).is_bloodied);
        sheet.toughness.current = 6;
        assert!(!derive_stats(&sheet).is_bloodied);
    }

    #[test]
    fn total_corruption_and_experience() {
        let mut sheet = Sheet::character("Test");
        sheet.corruption.temporary = 2;
        sheet.corruption.permanent = 3;
        sheet.experience.total = 40;
        sheet.experience.spent = 15;
        let stats = derive_stats(&sheet);
        assert_eq!(stats.total_corruption, 5);
        assert_eq!(stats.experience_available, Some(25));
    }

    #[test]
    fn npc_has_no_experience_figure() {
        let mut sheet = Sheet::npc("Guard");
        sheet.experience.total = 40;
        assert_eq!(derive_stats(&sheet).experience_available, None);
    }

    #[test]
    fn encumbrance_excludes_armor_weight() {
        let mut sheet = sheet_with(&[(Attribute::Strong, 12)]);
        sheet
            .inventory
            .push(InventoryItem::new("Rations", "gear").with_quantity(4).with_weight(0.5));
        sheet
            .projectiles
            .push(Projectile::new("Arrows", 10).with_weight(0.1));
        sheet.weapons.push(Weapon::new("Sword", "1d8").with_weight(2.0));
        sheet.armors.push(Armor::new("Plate", "1d8").with_weight(30.0));
        let enc = derive_stats(&sheet).encumbrance;
        assert!((enc.weight - 5.0).abs() < 1e-9);
        assert_eq!(enc.max_load, 12);
        assert_eq!(enc.status, EncumbranceStatus::Light);
    }

    #[test]
    fn encumbrance_status_thresholds() {
        let mut sheet = sheet_with(&[(Attribute::Strong, 10)]);
        sheet
            .inventory
            .push(InventoryItem::new("Stones", "gear").with_quantity(5).with_weight(1.0));
        assert_eq!(derive_stats(&sheet).encumbrance.status, EncumbranceStatus::Light);
        sheet.inventory[0].quantity = 6;
        assert_eq!(derive_stats(&sheet).encumbrance.status, EncumbranceStatus::Heavy);
        sheet.inventory[0].quantity = 10;
        assert_eq!(derive_stats(&sheet).encumbrance.status, EncumbranceStatus::Heavy);
        sheet.inventory[0].quantity = 11;
        assert_eq!(
            derive_stats(&sheet).encumbrance.status,
            EncumbranceStatus::Overloaded
        );
    }

    #[test]
    fn recompute_clamps_current_toughness_once() {
        let mut sheet = sheet_with(&[(Attribute::Strong, 12)]);
        sheet.toughness.current = 20;
        let stats = recompute(&mut sheet);
        assert_eq!(stats.toughness_max, 12);
        assert_eq!(sheet.toughness.current, 12);

        let before = sheet.clone();
        let again = recompute(&mut sheet);
        assert_eq!(sheet, before);
        assert_eq!(again, stats);
    }

    #[test]
    fn recompute_never_raises_toughness() {
        let mut sheet = sheet_with(&[(Attribute::Strong, 12)]);
        sheet.toughness.current = 3;
        recompute(&mut sheet);
        assert_eq!(sheet.toughness.current, 3);
    }

    #[test]
    fn derive_is_pure() {
        let mut sheet = sheet_with(&[(Attribute::Strong, 12)]);
        sheet.toughness.current = 20;
        let before = sheet.clone();
        let stats = derive_stats(&sheet);
        assert_eq!(sheet, before);
        assert_eq!(stats.toughness_current, 12);
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(derive_stats(&Sheet::default())).unwrap();
        assert_eq!(json["toughnessMax"], 10);
        assert_eq!(json["encumbrance"]["status"], "light");
        assert_eq!(json["attributes"]["strong"], 0);
    }

    proptest! {
        #[test]
        fn toughness_max_never_below_floor(
            strong in -50i32..50,
            max_modifier in 0i32..10,
            feat in any::<bool>(),
        ) {
            let mut sheet = sheet_with(&[(Attribute::Strong, strong)]);
            sheet.toughness.max_modifier = max_modifier;
            if feat {
                sheet = sheet.with_ability(
                    Ability::new("Feat of Strength", AbilityLevel::Novice).active(),
                );
            }
            prop_assert!(derive_stats(&sheet).toughness_max >= MIN_BASE);
        }

        #[test]
        fn recompute_is_idempotent(strong in -5i32..30, current in -10i32..60) {
            let mut sheet = sheet_with(&[(Attribute::Strong, strong)]);
            sheet.toughness.current = current;
            let first = recompute(&mut sheet);
            let snapshot = sheet.clone();
            let second = recompute(&mut sheet);
            prop_assert_eq!(first, second);
            prop_assert_eq!(sheet, snapshot);
        }
    }
}
