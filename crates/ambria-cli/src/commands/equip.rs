use std::path::Path;

use ambria_rules::{LoadoutKind, equip_item, unequip_item};
use colored::Colorize;

fn parse_kind(raw: &str) -> Result<LoadoutKind, String> {
    LoadoutKind::parse(raw)
        .ok_or_else(|| format!("unknown loadout \"{raw}\" (expected weapon or armor)"))
}

pub fn equip(path: &Path, config: Option<&Path>, index: usize, kind: &str) -> Result<(), String> {
    let kind = parse_kind(kind)?;
    let config = super::load_config(config)?;
    let mut sheet = super::load_sheet(path)?;

    let equipped = equip_item(&mut sheet, index, kind, &config).map_err(|e| e.to_string())?;
    super::save_sheet(path, &sheet)?;

    let name = match kind {
        LoadoutKind::Weapon => sheet.weapons.last().map(|w| w.name.as_str()),
        LoadoutKind::Armor => sheet.armors.last().map(|a| a.name.as_str()),
    }
    .unwrap_or_default();
    println!("  Equipped {} as {kind}", name.bold());
    if equipped.remaining > 0 {
        println!("  {}", format!("{} left in inventory", equipped.remaining).dimmed());
    }
    Ok(())
}

pub fn unequip(path: &Path, index: usize, kind: &str) -> Result<(), String> {
    let kind = parse_kind(kind)?;
    let mut sheet = super::load_sheet(path)?;

    unequip_item(&mut sheet, index, kind).map_err(|e| e.to_string())?;
    super::save_sheet(path, &sheet)?;

    let name = sheet
        .inventory
        .last()
        .map(|item| item.name.as_str())
        .unwrap_or_default();
    println!("  Moved {} to inventory", name.bold());
    Ok(())
}
