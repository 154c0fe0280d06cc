use clap::Parser;
use gridfill::{
    build_slots, find_fill, parse_structure, render_grid, FillOptions, FillOutcome, GridError,
    WordList,
};
use log::{error, info};
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;

/// Fill a crossword structure with words from a word list.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Grid structure file: `_` marks a fillable cell, anything else a block
    structure: PathBuf,

    /// Word list file with one word per line
    words: PathBuf,

    /// Also write the filled grid to this file
    output: Option<PathBuf>,

    /// Only check choices against assigned slots instead of maintaining arc consistency
    #[clap(long)]
    no_inference: bool,

    /// Log solver progress and statistics (`RUST_LOG` takes precedence)
    #[clap(short, long)]
    verbose: bool,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Grid(#[from] GridError),
}

fn read_file(path: &PathBuf) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::Read { path: path.clone(), source })
}

fn run(args: &Args) -> Result<(), CliError> {
    let config = build_slots(&parse_structure(&read_file(&args.structure)?))?;
    let word_list = WordList::from_text(&read_file(&args.words)?);
    info!(
        "Loaded {} slots from {} and {} words from {}",
        config.slot_count(),
        args.structure.display(),
        word_list.len(),
        args.words.display(),
    );

    let options = FillOptions { maintain_arc_consistency: !args.no_inference };
    let result = find_fill(&config, &word_list, &options);
    info!("{:?}", result.statistics);

    match &result.outcome {
        FillOutcome::Solved(assignment) => {
            let display_grid = render_grid(&config, &word_list, assignment);
            println!("{}", display_grid);

            if let Some(output) = &args.output {
                fs::write(output, display_grid + "\n")
                    .map_err(|source| CliError::Write { path: output.clone(), source })?;
                info!("Wrote {}", output.display());
            }
        }
        FillOutcome::NoSolution => println!("No solution."),
    }

    Ok(())
}

fn configure_logging(verbose: bool) {
    let level_filter = if verbose { "debug" } else { "warn" };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level_filter))
        .format(|buf, record| writeln!(buf, "{}: {}", record.level(), record.args()))
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    configure_logging(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
