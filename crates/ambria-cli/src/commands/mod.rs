pub mod check;
pub mod equip;
pub mod roll;
pub mod stats;

use std::fs;
use std::path::Path;

use ambria_rules::{AttributeTestResult, DiceSource, FixedDice, Outcome, RulesConfig, Sheet};
use colored::Colorize;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::debug;

/// Read and decode a sheet document.
fn load_sheet(path: &Path) -> Result<Sheet, String> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    let sheet = Sheet::from_json_str(&text)
        .map_err(|e| format!("invalid sheet {}: {e}", path.display()))?;
    debug!(path = %path.display(), name = %sheet.name, "loaded sheet");
    Ok(sheet)
}

/// Encode a sheet and write it back, unknown fields included.
fn save_sheet(path: &Path, sheet: &Sheet) -> Result<(), String> {
    let value = sheet
        .to_value()
        .map_err(|e| format!("cannot encode sheet: {e}"))?;
    let mut text =
        serde_json::to_string_pretty(&value).map_err(|e| format!("cannot encode sheet: {e}"))?;
    text.push('\n');
    fs::write(path, text).map_err(|e| format!("cannot write {}: {e}", path.display()))?;
    debug!(path = %path.display(), "saved sheet");
    Ok(())
}

/// Load house rules, or the defaults when no file is given.
fn load_config(path: Option<&Path>) -> Result<RulesConfig, String> {
    let Some(path) = path else {
        return Ok(RulesConfig::default());
    };
    let text = fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    serde_json::from_str(&text).map_err(|e| format!("invalid config {}: {e}", path.display()))
}

/// Pick the dice: scripted values first, then a seeded RNG, then OS entropy.
fn dice_source(seed: Option<u64>, scripted: &[u32]) -> Box<dyn DiceSource> {
    if !scripted.is_empty() {
        return Box::new(FixedDice::new(scripted.to_vec()));
    }
    match seed {
        Some(seed) => Box::new(StdRng::seed_from_u64(seed)),
        None => Box::new(StdRng::from_os_rng()),
    }
}

fn colored_outcome(outcome: Outcome) -> String {
    let label = outcome.to_string();
    match outcome {
        Outcome::CriticalSuccess => label.green().bold().to_string(),
        Outcome::Success => label.green().to_string(),
        Outcome::Failure => label.red().to_string(),
        Outcome::CriticalFailure => label.red().bold().to_string(),
    }
}

/// Print the three lines describing an attribute test.
fn print_test(result: &AttributeTestResult) {
    match result.advantage {
        Some(advantage) => println!(
            "  Roll:    {} - {advantage} = {}",
            result.main, result.total_roll
        ),
        None => println!("  Roll:    {}", result.main),
    }
    println!("  Target:  {}", result.target);
    println!("  Result:  {}", colored_outcome(result.outcome()));
}
