use std::path::Path;

use ambria_rules::{Attribute, CheckKind, CheckRequest, Resolution, resolve_check};
use colored::Colorize;

/// Parsed `check` arguments.
pub struct CheckArgs<'a> {
    pub target: &'a str,
    pub arg: Option<&'a str>,
    pub modifier: i32,
    pub advantage: bool,
    pub dry_run: bool,
    pub seed: Option<u64>,
    pub dice: &'a [u32],
}

pub fn run(path: &Path, config: Option<&Path>, args: &CheckArgs<'_>) -> Result<(), String> {
    let mut sheet = super::load_sheet(path)?;
    let config = super::load_config(config)?;
    let kind = parse_kind(args.target, args.arg)?;

    let request = CheckRequest::new(kind)
        .with_modifier(args.modifier)
        .with_advantage(args.advantage);
    let mut dice = super::dice_source(args.seed, args.dice);
    let result =
        resolve_check(&mut sheet, &request, dice.as_mut(), &config).map_err(|e| e.to_string())?;

    println!("  {} {}", "Check".bold(), kind.to_string().dimmed());
    match &result.resolution {
        Resolution::Test(test) => super::print_test(test),
        Resolution::Use => println!("  Used (no roll)"),
        Resolution::Flat(roll) => println!("  Roll:    {roll}"),
        Resolution::OutOfAmmunition { projectile } => {
            println!("  {}", format!("Out of ammunition: {projectile}").red());
        }
    }
    for effect in &result.effects {
        println!("  {} {effect}", "→".dimmed());
    }

    if !result.effects.is_empty() {
        if args.dry_run {
            println!("  {}", "(dry run, sheet not saved)".dimmed());
        } else {
            super::save_sheet(path, &sheet)?;
        }
    }
    Ok(())
}

fn parse_kind(target: &str, arg: Option<&str>) -> Result<CheckKind, String> {
    let index = || -> Result<usize, String> {
        let raw = arg.ok_or_else(|| format!("'{target}' needs an index"))?;
        raw.parse().map_err(|_| format!("invalid index: \"{raw}\""))
    };

    match target.to_ascii_lowercase().as_str() {
        "attribute" | "attr" => {
            let name = arg.ok_or("'attribute' needs an attribute name")?;
            Attribute::parse(name)
                .map(CheckKind::Attribute)
                .ok_or_else(|| format!("unknown attribute: \"{name}\""))
        }
        "ability" => index().map(CheckKind::Ability),
        "attack" => index().map(CheckKind::Attack),
        "defense" | "defence" => Ok(CheckKind::Defense),
        "damage" => index().map(CheckKind::Damage),
        "protection" => index().map(CheckKind::Protection),
        other => Err(format!(
            "unknown check \"{other}\" \
             (expected attribute, ability, attack, defense, damage or protection)"
        )),
    }
}
