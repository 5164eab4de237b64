//! Moving items between the inventory and the active loadout.
//!
//! Equipping builds a weapon or armor record from an inventory item's `data`
//! bag and appends it to the loadout; unequipping does the reverse. Every
//! precondition is checked and the new record is fully built before the
//! sheet is touched, so a failed call leaves the sheet exactly as it was.
//!
//! Ids are not carried across a transition: each side gets a fresh id.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::config::RulesConfig;
use crate::error::{ListName, RulesError, RulesResult};
use crate::sheet::lenient::{coerce_bool, coerce_int, coerce_string};
use crate::sheet::{Armor, Attribute, InventoryItem, ItemId, Sheet, Weapon};

const WEAPON_FIELDS: [&str; 7] = [
    "id",
    "name",
    "weight",
    "damage",
    "attackAttribute",
    "quality",
    "projectileId",
];

const ARMOR_FIELDS: [&str; 7] = [
    "id",
    "name",
    "weight",
    "protection",
    "quality",
    "obstructive",
    "equipped",
];

/// Which loadout list a transition targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadoutKind {
    /// The weapon list.
    Weapon,
    /// The armor list.
    Armor,
}

impl LoadoutKind {
    /// Parse `"weapon"` or `"armor"` (also `"armour"`), ignoring case.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weapon" | "weapons" => Some(Self::Weapon),
            "armor" | "armors" | "armour" => Some(Self::Armor),
            _ => None,
        }
    }

    /// The inventory category given to items unequipped from this list.
    pub fn category(self) -> &'static str {
        match self {
            Self::Weapon => "weapon",
            Self::Armor => "armor",
        }
    }
}

impl std::fmt::Display for LoadoutKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.category())
    }
}

/// What an equip transition did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Equipped {
    /// The list the record was added to.
    pub kind: LoadoutKind,
    /// Id of the new loadout record.
    pub id: ItemId,
    /// Units left in the source inventory stack (0 if it was removed).
    pub remaining: u32,
}

enum Record {
    Weapon(Weapon),
    Armor(Armor),
}

/// Equip the inventory item at `inventory_index` as a weapon or armor.
///
/// A stacked item (`quantity > 1`) loses one unit and stays in the
/// inventory; a single item is removed.
///
/// # Errors
///
/// [`RulesError::NoSuchItem`] for a stale index and
/// [`RulesError::WeaponLimitReached`] when the weapon list is full. The
/// sheet is unchanged in both cases.
pub fn equip_item(
    sheet: &mut Sheet,
    inventory_index: usize,
    kind: LoadoutKind,
    config: &RulesConfig,
) -> RulesResult<Equipped> {
    let item = sheet
        .inventory
        .get(inventory_index)
        .ok_or(RulesError::NoSuchItem {
            list: ListName::Inventory,
            index: inventory_index,
        })?;

    if kind == LoadoutKind::Weapon && sheet.weapons.len() >= config.max_equipped_weapons {
        warn!(
            sheet = %sheet.name,
            item = %item.name,
            limit = config.max_equipped_weapons,
            "weapon limit reached, not equipping"
        );
        return Err(RulesError::WeaponLimitReached {
            limit: config.max_equipped_weapons,
        });
    }

    let record = match kind {
        LoadoutKind::Weapon => Record::Weapon(weapon_from_item(item, config)),
        LoadoutKind::Armor => Record::Armor(armor_from_item(item, config)),
    };

    let remaining = if item.quantity > 1 {
        let stack = &mut sheet.inventory[inventory_index];
        stack.quantity -= 1;
        stack.quantity
    } else {
        sheet.inventory.remove(inventory_index);
        0
    };

    let id = match record {
        Record::Weapon(weapon) => {
            let id = weapon.id.clone();
            debug!(sheet = %sheet.name, item = %weapon.name, remaining, "equipped weapon");
            sheet.weapons.push(weapon);
            id
        }
        Record::Armor(armor) => {
            let id = armor.id.clone();
            debug!(sheet = %sheet.name, item = %armor.name, remaining, "equipped armor");
            sheet.armors.push(armor);
            id
        }
    };

    Ok(Equipped {
        kind,
        id,
        remaining,
    })
}

/// Move the loadout entry at `loadout_index` back to the inventory.
///
/// Returns the id of the new inventory item.
///
/// # Errors
///
/// [`RulesError::NoSuchItem`] for a stale index; the sheet is unchanged.
pub fn unequip_item(
    sheet: &mut Sheet,
    loadout_index: usize,
    kind: LoadoutKind,
) -> RulesResult<ItemId> {
    let missing = RulesError::NoSuchItem {
        list: kind.into(),
        index: loadout_index,
    };

    let item = match kind {
        LoadoutKind::Weapon => {
            if loadout_index >= sheet.weapons.len() {
                return Err(missing);
            }
            item_from_weapon(sheet.weapons.remove(loadout_index))
        }
        LoadoutKind::Armor => {
            if loadout_index >= sheet.armors.len() {
                return Err(missing);
            }
            item_from_armor(sheet.armors.remove(loadout_index))
        }
    };

    debug!(sheet = %sheet.name, item = %item.name, %kind, "unequipped item");
    let id = item.id.clone();
    sheet.inventory.push(item);
    Ok(id)
}

fn weapon_from_item(item: &InventoryItem, config: &RulesConfig) -> Weapon {
    let mut data = item.data.clone();
    let damage =
        take_text(&mut data, "damage").unwrap_or_else(|| config.default_weapon_damage.clone());
    let attack_attribute =
        take_text(&mut data, "attackAttribute").and_then(|s| Attribute::parse(&s));
    let quality = take_text(&mut data, "quality").unwrap_or_default();
    let projectile_id = take_text(&mut data, "projectileId").map(ItemId);

    Weapon {
        id: ItemId::generate(),
        name: item.name.clone(),
        damage,
        attack_attribute,
        quality,
        weight: item.weight,
        projectile_id,
        extra: leftover(data, &WEAPON_FIELDS),
    }
}

fn armor_from_item(item: &InventoryItem, config: &RulesConfig) -> Armor {
    let mut data = item.data.clone();
    let protection = take_text(&mut data, "protection")
        .unwrap_or_else(|| config.default_armor_protection.clone());
    let quality = take_text(&mut data, "quality").unwrap_or_default();
    let obstructive = data.remove("obstructive").map_or(0, |v| coerce_int(&v));
    let equipped = data
        .remove("equipped")
        .filter(|v| !v.is_null())
        .map(|v| coerce_bool(&v, true));

    Armor {
        id: ItemId::generate(),
        name: item.name.clone(),
        protection,
        quality,
        weight: item.weight,
        equipped,
        obstructive,
        extra: leftover(data, &ARMOR_FIELDS),
    }
}

fn item_from_weapon(weapon: Weapon) -> InventoryItem {
    let mut data = weapon.extra;
    data.insert("damage".to_string(), Value::String(weapon.damage));
    if let Some(attribute) = weapon.attack_attribute {
        data.insert(
            "attackAttribute".to_string(),
            Value::String(attribute.key().to_string()),
        );
    }
    data.insert("quality".to_string(), Value::String(weapon.quality));
    if let Some(projectile) = weapon.projectile_id {
        data.insert("projectileId".to_string(), Value::String(projectile.0));
    }
    inventory_item(weapon.name, LoadoutKind::Weapon, weapon.weight, data)
}

fn item_from_armor(armor: Armor) -> InventoryItem {
    let mut data = armor.extra;
    data.insert("protection".to_string(), Value::String(armor.protection));
    data.insert("quality".to_string(), Value::String(armor.quality));
    data.insert("obstructive".to_string(), Value::from(armor.obstructive));
    inventory_item(armor.name, LoadoutKind::Armor, armor.weight, data)
}

fn inventory_item(
    name: String,
    kind: LoadoutKind,
    weight: f64,
    data: Map<String, Value>,
) -> InventoryItem {
    InventoryItem {
        id: ItemId::generate(),
        name,
        category: kind.category().to_string(),
        quantity: 1,
        weight,
        data,
        extra: Map::new(),
    }
}

/// Remove a text field, treating blanks as absent.
fn take_text(data: &mut Map<String, Value>, key: &str) -> Option<String> {
    data.remove(key)
        .map(|v| coerce_string(&v))
        .filter(|s| !s.trim().is_empty())
}

/// Drop keys that would collide with the record's own fields.
fn leftover(mut data: Map<String, Value>, reserved: &[&str]) -> Map<String, Value> {
    for key in reserved {
        data.remove(*key);
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sword(quantity: u32) -> InventoryItem {
        InventoryItem::new("Sword", "weapon")
            .with_quantity(quantity)
            .with_weight(2.0)
            .with_data("damage", "1d8")
            .with_data("attackAttribute", "quick")
            .with_data("quality", "Balanced")
    }

    fn config() -> RulesConfig {
        RulesConfig::default()
    }

    #[test]
    fn equip_stacked_item_splits_stack() {
        let mut sheet = Sheet::character("Test");
        sheet.inventory.push(sword(3));

        let equipped = equip_item(&mut sheet, 0, LoadoutKind::Weapon, &config()).unwrap();
        assert_eq!(equipped.remaining, 2);
        assert_eq!(sheet.inventory.len(), 1);
        assert_eq!(sheet.inventory[0].quantity, 2);
        assert_eq!(sheet.weapons.len(), 1);

        let weapon = &sheet.weapons[0];
        assert_eq!(weapon.id, equipped.id);
        assert!((weapon.weight - 2.0).abs() < f64::EPSILON);
        assert_eq!(weapon.damage, "1d8");
        assert_eq!(weapon.attack_attribute, Some(Attribute::Quick));
        assert_eq!(weapon.quality, "Balanced");
    }

    #[test]
    fn equip_single_item_removes_it() {
        let mut sheet = Sheet::character("Test");
        sheet.inventory.push(InventoryItem::new("Rope", "gear"));
        sheet.inventory.push(sword(1));

        let equipped = equip_item(&mut sheet, 1, LoadoutKind::Weapon, &config()).unwrap();
        assert_eq!(equipped.remaining, 0);
        assert_eq!(sheet.inventory.len(), 1);
        assert_eq!(sheet.inventory[0].name, "Rope");
        assert_eq!(sheet.weapons[0].name, "Sword");
    }

    #[test]
    fn equip_weapon_uses_fallbacks() {
        let mut sheet = Sheet::character("Test");
        sheet.inventory.push(InventoryItem::new("Stick", "gear"));
        equip_item(&mut sheet, 0, LoadoutKind::Weapon, &config()).unwrap();
        let weapon = &sheet.weapons[0];
        assert_eq!(weapon.damage, "1d6");
        assert_eq!(weapon.attack_attribute, None);
        assert_eq!(weapon.quality, "");
        assert_eq!(weapon.projectile_id, None);
    }

    #[test]
    fn equip_armor_reads_data_and_defaults() {
        let mut sheet = Sheet::character("Test");
        sheet.inventory.push(
            InventoryItem::new("Chainmail", "armor")
                .with_weight(12.0)
                .with_data("protection", "1d6")
                .with_data("obstructive", "-3"),
        );
        sheet.inventory.push(InventoryItem::new("Cloak", "armor"));

        equip_item(&mut sheet, 0, LoadoutKind::Armor, &config()).unwrap();
        equip_item(&mut sheet, 0, LoadoutKind::Armor, &config()).unwrap();

        let chain = &sheet.armors[0];
        assert_eq!(chain.protection, "1d6");
        assert_eq!(chain.obstructive, -3);
        assert!(chain.is_worn());
        assert!((chain.weight - 12.0).abs() < f64::EPSILON);

        let cloak = &sheet.armors[1];
        assert_eq!(cloak.protection, "1d4");
        assert_eq!(cloak.obstructive, 0);
        assert!(cloak.is_worn());
    }

    #[test]
    fn configured_fallbacks_are_used() {
        let mut sheet = Sheet::character("Test");
        sheet.inventory.push(InventoryItem::new("Stick", "gear"));
        let cfg = config().with_default_weapon_damage("1d4");
        equip_item(&mut sheet, 0, LoadoutKind::Weapon, &cfg).unwrap();
        assert_eq!(sheet.weapons[0].damage, "1d4");
    }

    #[test]
    fn third_weapon_is_rejected_without_mutation() {
        let mut sheet = Sheet::character("Test");
        sheet.weapons.push(Weapon::new("Sword", "1d8"));
        sheet.weapons.push(Weapon::new("Dagger", "1d6"));
        sheet.inventory.push(sword(1));
        let before = sheet.clone();

        let err = equip_item(&mut sheet, 0, LoadoutKind::Weapon, &config()).unwrap_err();
        assert_eq!(err, RulesError::WeaponLimitReached { limit: 2 });
        assert_eq!(sheet, before);
    }

    #[test]
    fn weapon_limit_does_not_apply_to_armor() {
        let mut sheet = Sheet::character("Test");
        sheet.weapons.push(Weapon::new("Sword", "1d8"));
        sheet.weapons.push(Weapon::new("Dagger", "1d6"));
        sheet.inventory.push(InventoryItem::new("Leather", "armor"));
        assert!(equip_item(&mut sheet, 0, LoadoutKind::Armor, &config()).is_ok());
    }

    #[test]
    fn stale_index_is_a_no_op() {
        let mut sheet = Sheet::character("Test");
        sheet.inventory.push(sword(1));
        let before = sheet.clone();

        let err = equip_item(&mut sheet, 5, LoadoutKind::Weapon, &config()).unwrap_err();
        assert_eq!(
            err,
            RulesError::NoSuchItem {
                list: ListName::Inventory,
                index: 5
            }
        );
        let err = unequip_item(&mut sheet, 0, LoadoutKind::Armor).unwrap_err();
        assert_eq!(
            err,
            RulesError::NoSuchItem {
                list: ListName::Armors,
                index: 0
            }
        );
        assert_eq!(sheet, before);
    }

    #[test]
    fn round_trip_keeps_counts_but_not_identity() {
        let mut sheet = Sheet::character("Test");
        sheet.inventory.push(InventoryItem::new("Rope", "gear"));
        sheet.inventory.push(sword(1));
        let original_id = sheet.inventory[1].id.clone();

        equip_item(&mut sheet, 1, LoadoutKind::Weapon, &config()).unwrap();
        let new_id = unequip_item(&mut sheet, 0, LoadoutKind::Weapon).unwrap();

        assert_eq!(sheet.inventory.len(), 2);
        assert!(sheet.weapons.is_empty());
        assert_ne!(new_id, original_id);

        let back = &sheet.inventory[1];
        assert_eq!(back.id, new_id);
        assert_eq!(back.name, "Sword");
        assert_eq!(back.category, "weapon");
        assert_eq!(back.quantity, 1);
        assert_eq!(back.data.get("damage"), Some(&json!("1d8")));
        assert_eq!(back.data.get("attackAttribute"), Some(&json!("quick")));
    }

    #[test]
    fn unequip_armor_rebuilds_data() {
        let mut sheet = Sheet::character("Test");
        sheet
            .armors
            .push(Armor::new("Plate", "1d8").with_obstructive(-4).with_weight(20.0));
        unequip_item(&mut sheet, 0, LoadoutKind::Armor).unwrap();

        let item = &sheet.inventory[0];
        assert_eq!(item.category, "armor");
        assert_eq!(item.data.get("protection"), Some(&json!("1d8")));
        assert_eq!(item.data.get("obstructive"), Some(&json!(-4)));
        assert!((item.weight - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn unknown_data_survives_equip_and_unequip() {
        let mut sheet = Sheet::character("Test");
        sheet.inventory.push(
            sword(1)
                .with_data("rune", "ember")
                .with_data("name", "Shadow copy"),
        );

        equip_item(&mut sheet, 0, LoadoutKind::Weapon, &config()).unwrap();
        let weapon = &sheet.weapons[0];
        assert_eq!(weapon.extra.get("rune"), Some(&json!("ember")));
        assert!(!weapon.extra.contains_key("name"));
        assert_eq!(weapon.name, "Sword");

        unequip_item(&mut sheet, 0, LoadoutKind::Weapon).unwrap();
        assert_eq!(sheet.inventory[0].data.get("rune"), Some(&json!("ember")));
    }

    #[test]
    fn projectile_link_carries_over() {
        let mut sheet = Sheet::character("Test");
        sheet.inventory.push(
            InventoryItem::new("Longbow", "weapon")
                .with_data("damage", "1d8")
                .with_data("projectileId", "arrows-1"),
        );
        equip_item(&mut sheet, 0, LoadoutKind::Weapon, &config()).unwrap();
        assert_eq!(sheet.weapons[0].projectile_id, Some(ItemId::from("arrows-1")));
    }

    #[test]
    fn kind_parse_and_display() {
        assert_eq!(LoadoutKind::parse("Weapon"), Some(LoadoutKind::Weapon));
        assert_eq!(LoadoutKind::parse("armour"), Some(LoadoutKind::Armor));
        assert_eq!(LoadoutKind::parse("shield"), None);
        assert_eq!(LoadoutKind::Armor.to_string(), "armor");
    }
}
