use ambria_rules::parse_dice_expression;
use colored::Colorize;

pub fn run(expr: &str, seed: Option<u64>, scripted: &[u32]) -> Result<(), String> {
    let parsed =
        parse_dice_expression(expr).ok_or_else(|| format!("invalid dice expression: \"{expr}\""))?;

    let mut dice = super::dice_source(seed, scripted);
    let roll = parsed.roll(dice.as_mut());

    println!("  {} {roll}", format!("{parsed}:").bold());
    Ok(())
}
