use std::path::Path;

use ambria_rules::{Attribute, DerivedStats, Sheet, SheetKind, derive_stats, recompute};
use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

pub fn run(path: &Path, json: bool, write: bool) -> Result<(), String> {
    let mut sheet = super::load_sheet(path)?;

    let stats = if write {
        let stats = recompute(&mut sheet);
        super::save_sheet(path, &sheet)?;
        stats
    } else {
        derive_stats(&sheet)
    };

    if json {
        let text = serde_json::to_string_pretty(&stats)
            .map_err(|e| format!("cannot encode stats: {e}"))?;
        println!("{text}");
        return Ok(());
    }

    print_header(&sheet);
    print_attributes(&stats);
    print_derived(&stats);
    Ok(())
}

fn print_header(sheet: &Sheet) {
    let kind = match sheet.kind {
        SheetKind::Character => "character",
        SheetKind::Npc => "npc",
    };
    let name = if sheet.name.is_empty() {
        "(unnamed)"
    } else {
        sheet.name.as_str()
    };
    println!("  {} [{}]", name.bold(), kind.dimmed());
    println!();
}

fn print_attributes(stats: &DerivedStats) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Attribute", "Value"]);
    for attribute in Attribute::ALL {
        table.add_row(vec![attribute.to_string(), stats.attribute(attribute).to_string()]);
    }
    println!("{table}");
    println!();
}

fn print_derived(stats: &DerivedStats) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Stat", "Value"]);

    let mut toughness = format!("{}/{}", stats.toughness_current, stats.toughness_max);
    if stats.is_bloodied {
        toughness.push_str(" (bloodied)");
    }
    let defense = match stats.berserk {
        Some(level) => format!("{} (berserk, {level})", stats.defense),
        None => stats.defense.to_string(),
    };
    let load = &stats.encumbrance;

    table.add_row(vec!["Toughness".to_string(), toughness]);
    table.add_row(vec!["Pain threshold".to_string(), stats.pain_threshold.to_string()]);
    table.add_row(vec!["Defense".to_string(), defense]);
    table.add_row(vec![
        "Corruption".to_string(),
        format!("{}/{}", stats.total_corruption, stats.corruption_threshold),
    ]);
    table.add_row(vec![
        "Encumbrance".to_string(),
        format!("{}/{} ({})", load.weight, load.max_load, load.status),
    ]);
    if let Some(xp) = stats.experience_available {
        table.add_row(vec!["Experience".to_string(), xp.to_string()]);
    }

    println!("{table}");
}
