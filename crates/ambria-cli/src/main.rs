//! CLI frontend for the Ambria rules engine.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "ambria",
    about = "Ambria: character sheets and rule checks for Symbaroum-style play",
    version,
    propagate_version = true
)]
struct Cli {
    /// JSON file with house-rule settings
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log engine decisions to stderr (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Dice options shared by every rolling command.
#[derive(clap::Args)]
struct DiceArgs {
    /// RNG seed for a repeatable roll
    #[arg(long)]
    seed: Option<u64>,

    /// Use these die results instead of rolling (comma-separated)
    #[arg(long, value_delimiter = ',', conflicts_with = "seed")]
    dice: Vec<u32>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the derived statistics of a sheet
    Stats {
        /// Sheet JSON file
        sheet: PathBuf,

        /// Print the statistics as JSON
        #[arg(long)]
        json: bool,

        /// Save the sheet back with toughness capped at its maximum
        #[arg(long)]
        write: bool,
    },

    /// Roll a dice expression such as 2d6+3
    Roll {
        /// Dice expression
        expr: String,

        #[command(flatten)]
        dice: DiceArgs,
    },

    /// Roll a bare d20 attribute test
    Test {
        /// Attribute value to roll under
        #[arg(allow_negative_numbers = true)]
        value: i32,

        /// Situational modifier added to the target
        #[arg(short, long, default_value = "0", allow_negative_numbers = true)]
        modifier: i32,

        /// Roll the d4 advantage die
        #[arg(short, long)]
        advantage: bool,

        #[command(flatten)]
        dice: DiceArgs,
    },

    /// Resolve a check against a sheet and save its effects
    Check {
        /// Sheet JSON file
        sheet: PathBuf,

        /// What to check: attribute, ability, attack, defense, damage, protection
        target: String,

        /// Attribute name or list index, depending on the target
        arg: Option<String>,

        /// Situational modifier
        #[arg(short, long, default_value = "0", allow_negative_numbers = true)]
        modifier: i32,

        /// Roll the d4 advantage die
        #[arg(short, long)]
        advantage: bool,

        /// Do not save corruption or ammunition changes
        #[arg(long)]
        dry_run: bool,

        #[command(flatten)]
        dice: DiceArgs,
    },

    /// Move an inventory item into the loadout
    Equip {
        /// Sheet JSON file
        sheet: PathBuf,

        /// Inventory index
        index: usize,

        /// Loadout list: weapon or armor
        #[arg(long = "as", value_name = "KIND")]
        kind: String,
    },

    /// Move a weapon or armor back to the inventory
    Unequip {
        /// Sheet JSON file
        sheet: PathBuf,

        /// Index in the weapon or armor list
        index: usize,

        /// Loadout list: weapon or armor
        #[arg(long = "from", value_name = "KIND")]
        kind: String,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = cli.config.as_deref();
    let result = match cli.command {
        Commands::Stats { sheet, json, write } => commands::stats::run(&sheet, json, write),
        Commands::Roll { expr, dice } => commands::roll::run(&expr, dice.seed, &dice.dice),
        Commands::Test {
            value,
            modifier,
            advantage,
            dice,
        } => commands::test::run(value, modifier, advantage, dice.seed, &dice.dice),
        Commands::Check {
            sheet,
            target,
            arg,
            modifier,
            advantage,
            dry_run,
            dice,
        } => commands::check::run(
            &sheet,
            config,
            &commands::check::CheckArgs {
                target: &target,
                arg: arg.as_deref(),
                modifier,
                advantage,
                dry_run,
                seed: dice.seed,
                dice: &dice.dice,
            },
        ),
        Commands::Equip { sheet, index, kind } => {
            commands::equip::equip(&sheet, config, index, &kind)
        }
        Commands::Unequip { sheet, index, kind } => commands::equip::unequip(&sheet, index, &kind),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
