//! Resolving named checks against a sheet.
//!
//! A [`CheckRequest`] names what is being checked (an attribute, an
//! ability, an attack, defense, or a damage/protection roll). The resolver
//! reads the current derived values, rolls the dice, applies any state
//! changes the check implies (corruption gained, ammunition spent), and
//! returns a [`CheckResult`] for the caller to present.

use serde::Serialize;
use tracing::{debug, trace};

use crate::config::RulesConfig;
use crate::dice::{Amount, DiceRoll, DiceSource};
use crate::error::{ListName, RulesError, RulesResult};
use crate::resolution::{AttributeTest, AttributeTestResult, Outcome, roll_attribute_test};
use crate::sheet::{Attribute, Sheet};
use crate::stats::derive_stats;

/// What a check is made against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckKind {
    /// A plain test of an (effective) attribute.
    Attribute(Attribute),
    /// Use the ability at this index; pays its corruption cost.
    Ability(usize),
    /// Attack with the equipped weapon at this index.
    Attack(usize),
    /// A test against derived defense.
    Defense,
    /// Roll damage for the equipped weapon at this index.
    Damage(usize),
    /// Roll protection for the armor at this index.
    Protection(usize),
}

impl std::fmt::Display for CheckKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Attribute(attribute) => write!(f, "{attribute}"),
            Self::Ability(i) => write!(f, "ability #{i}"),
            Self::Attack(i) => write!(f, "attack #{i}"),
            Self::Defense => write!(f, "defense"),
            Self::Damage(i) => write!(f, "damage #{i}"),
            Self::Protection(i) => write!(f, "protection #{i}"),
        }
    }
}

/// A request to perform a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckRequest {
    /// What is being checked.
    pub kind: CheckKind,
    /// Added to the target of a test, or to the total of a flat roll.
    pub modifier: i32,
    /// Roll the advantage die on tests.
    pub with_advantage: bool,
}

impl CheckRequest {
    /// A request with no modifier and no advantage.
    pub fn new(kind: CheckKind) -> Self {
        Self {
            kind,
            modifier: 0,
            with_advantage: false,
        }
    }

    /// Set the modifier.
    pub fn with_modifier(mut self, modifier: i32) -> Self {
        self.modifier = modifier;
        self
    }

    /// Set whether the advantage die is rolled.
    pub fn with_advantage(mut self, advantage: bool) -> Self {
        self.with_advantage = advantage;
        self
    }
}

/// How a check was resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Resolution {
    /// A roll-under test.
    Test(AttributeTestResult),
    /// An ability with no associated attribute: used without a roll.
    Use,
    /// A flat roll with no target (damage, protection).
    Flat(DiceRoll),
    /// The weapon's ammunition is exhausted; nothing was rolled.
    OutOfAmmunition {
        /// Name of the empty projectile stack.
        projectile: String,
    },
}

impl Resolution {
    /// The test outcome, for resolutions that involved a test.
    pub fn outcome(&self) -> Option<Outcome> {
        match self {
            Self::Test(result) => Some(result.outcome()),
            _ => None,
        }
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Test(result) => {
                write!(f, "{}", result.main)?;
                if let Some(advantage) = result.advantage {
                    write!(f, " - {advantage} = {}", result.total_roll)?;
                }
                write!(f, " vs {}: {}", result.target, result.outcome())
            }
            Self::Use => write!(f, "used"),
            Self::Flat(roll) => write!(f, "{roll}"),
            Self::OutOfAmmunition { projectile } => write!(f, "out of {projectile}"),
        }
    }
}

/// A state change applied to the sheet by a check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CheckEffect {
    /// Temporary corruption was added.
    CorruptionGained {
        /// Corruption added.
        amount: i32,
        /// The dice behind the amount, when the cost was a dice expression.
        roll: Option<DiceRoll>,
    },
    /// One round of ammunition was used.
    AmmunitionSpent {
        /// Name of the projectile stack.
        projectile: String,
        /// Rounds left afterwards.
        remaining: u32,
    },
}

impl std::fmt::Display for CheckEffect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CorruptionGained { amount, roll } => {
                write!(f, "Corruption +{amount}")?;
                if let Some(roll) = roll {
                    write!(f, " {roll}")?;
                }
                Ok(())
            }
            Self::AmmunitionSpent {
                projectile,
                remaining,
            } => write!(f, "{projectile} -1 ({remaining} left)"),
        }
    }
}

/// The result of a check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    /// How the check resolved.
    pub resolution: Resolution,
    /// State changes applied to the sheet.
    pub effects: Vec<CheckEffect>,
}

impl CheckResult {
    fn new(resolution: Resolution) -> Self {
        Self {
            resolution,
            effects: Vec::new(),
        }
    }

    /// Returns true if the check was a test that succeeded.
    pub fn is_success(&self) -> bool {
        self.resolution.outcome().is_some_and(Outcome::is_success)
    }
}

/// Resolve a check, applying its effects to `sheet`.
///
/// Corruption from an ability is added whether or not its test succeeded.
/// A blank damage or protection value uses the configured default.
///
/// # Errors
///
/// [`RulesError::NoSuchItem`] when the request indexes a missing ability,
/// weapon or armor. The sheet is unchanged and no dice are rolled.
pub fn resolve_check<D: DiceSource + ?Sized>(
    sheet: &mut Sheet,
    request: &CheckRequest,
    dice: &mut D,
    config: &RulesConfig,
) -> RulesResult<CheckResult> {
    let stats = derive_stats(&*sheet);
    let test = |value: i32| {
        AttributeTest::new(value)
            .with_modifier(request.modifier)
            .with_advantage(request.with_advantage)
    };

    match request.kind {
        CheckKind::Attribute(attribute) => {
            let result = roll_attribute_test(&test(stats.attribute(attribute)), dice);
            Ok(CheckResult::new(Resolution::Test(result)))
        }
        CheckKind::Defense => {
            let result = roll_attribute_test(&test(stats.defense), dice);
            Ok(CheckResult::new(Resolution::Test(result)))
        }
        CheckKind::Ability(index) => {
            let ability = sheet
                .abilities
                .get(index)
                .ok_or(RulesError::NoSuchItem {
                    list: ListName::Abilities,
                    index,
                })?;
            let cost = ability.corruption_amount();
            if cost.is_none() && !ability.corruption_cost.trim().is_empty() {
                trace!(
                    ability = %ability.name,
                    cost = %ability.corruption_cost,
                    "unreadable corruption cost"
                );
            }

            let resolution = match ability.associated_attribute {
                Some(attribute) => {
                    Resolution::Test(roll_attribute_test(&test(stats.attribute(attribute)), dice))
                }
                None => Resolution::Use,
            };

            let mut result = CheckResult::new(resolution);
            if let Some(effect) = pay_corruption(sheet, cost, dice) {
                result.effects.push(effect);
            }
            Ok(result)
        }
        CheckKind::Attack(index) => {
            let weapon = sheet.weapons.get(index).ok_or(RulesError::NoSuchItem {
                list: ListName::Weapons,
                index,
            })?;
            let attribute = weapon.attack_attribute.unwrap_or(Attribute::Accurate);
            let ammo = weapon
                .projectile_id
                .as_ref()
                .and_then(|id| sheet.projectiles.iter().position(|p| &p.id == id));

            if let Some(slot) = ammo {
                let projectile = &sheet.projectiles[slot];
                if projectile.quantity == 0 {
                    debug!(projectile = %projectile.name, "attack blocked, out of ammunition");
                    return Ok(CheckResult::new(Resolution::OutOfAmmunition {
                        projectile: projectile.name.clone(),
                    }));
                }
            }

            let outcome = roll_attribute_test(&test(stats.attribute(attribute)), dice);
            let mut result = CheckResult::new(Resolution::Test(outcome));
            if let Some(slot) = ammo {
                let projectile = &mut sheet.projectiles[slot];
                projectile.quantity -= 1;
                debug!(
                    projectile = %projectile.name,
                    remaining = projectile.quantity,
                    "ammunition spent"
                );
                result.effects.push(CheckEffect::AmmunitionSpent {
                    projectile: projectile.name.clone(),
                    remaining: projectile.quantity,
                });
            }
            Ok(result)
        }
        CheckKind::Damage(index) => {
            let weapon = sheet.weapons.get(index).ok_or(RulesError::NoSuchItem {
                list: ListName::Weapons,
                index,
            })?;
            let damage = or_default(&weapon.damage, &config.default_weapon_damage);
            let roll = flat_roll(damage, dice).with_bonus(request.modifier);
            Ok(CheckResult::new(Resolution::Flat(roll)))
        }
        CheckKind::Protection(index) => {
            let armor = sheet.armors.get(index).ok_or(RulesError::NoSuchItem {
                list: ListName::Armors,
                index,
            })?;
            let protection = or_default(&armor.protection, &config.default_armor_protection);
            let roll = flat_roll(protection, dice).with_bonus(request.modifier);
            Ok(CheckResult::new(Resolution::Flat(roll)))
        }
    }
}

fn or_default<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}

/// Evaluate a damage or protection value; unreadable values count as zero.
fn flat_roll<D: DiceSource + ?Sized>(text: &str, dice: &mut D) -> DiceRoll {
    match Amount::parse(text) {
        Some(amount) => amount.roll(dice),
        None => {
            trace!(value = %text, "unreadable amount, using 0");
            DiceRoll::flat(0)
        }
    }
}

/// Roll a corruption cost and add it to temporary corruption.
fn pay_corruption<D: DiceSource + ?Sized>(
    sheet: &mut Sheet,
    cost: Option<Amount>,
    dice: &mut D,
) -> Option<CheckEffect> {
    let (amount, roll) = match cost? {
        Amount::Fixed(n) => (n, None),
        Amount::Dice(expr) => {
            let roll = expr.roll(dice);
            (roll.total, Some(roll))
        }
    };
    if amount <= 0 {
        return None;
    }
    sheet.corruption.temporary = sheet.corruption.temporary.saturating_add(amount);
    debug!(
        sheet = %sheet.name,
        amount,
        temporary = sheet.corruption.temporary,
        "corruption gained"
    );
    Some(CheckEffect::CorruptionGained { amount, roll })
}
