//! Command dispatch for the kiwi CLI.

use std::{env, fs, path::Path};

use anyhow::{Context, Result};
use colored::Colorize;

use super::args::{Arguments, Command, ExtractCommand};
use super::exit_status::ExitStatus;
use crate::config::{CONFIG_FILE_NAME, default_config_json, load_config};
use crate::pipeline::{ExtractOptions, run_extract};

pub fn run(Arguments { command }: Arguments) -> Result<ExitStatus> {
    match command {
        Command::Extract(cmd) => extract(cmd),
        Command::Init => init(),
    }
}

fn extract(cmd: ExtractCommand) -> Result<ExitStatus> {
    let cwd = env::current_dir().context("Failed to resolve the working directory")?;
    let loaded = load_config(&cwd)?;
    if !loaded.from_file && cmd.verbose {
        eprintln!(
            "{} No {} found; using defaults",
            "note:".bold(),
            CONFIG_FILE_NAME
        );
    }

    let options = ExtractOptions {
        target: cmd.target.clone(),
        prefix: cmd.normalized_prefix(),
        include_html: cmd.html,
        verbose: cmd.verbose,
    };
    let summary = run_extract(&loaded.config, &cwd, &options)?;

    if summary.files_rewritten == 0 && summary.files_failed == 0 {
        println!(
            "{} across {} file(s).",
            "No Chinese literals found".green().bold(),
            summary.files_scanned
        );
    } else {
        println!(
            "{} {} literal(s) in {} file(s); {} catalog entr(ies) written.",
            "Replaced".green().bold(),
            summary.literals_replaced,
            summary.files_rewritten,
            summary.entries_written
        );
        if summary.files_failed > 0 {
            println!("{} {} file(s) skipped.", "Note:".yellow().bold(), summary.files_failed);
        }
    }

    Ok(ExitStatus::Success)
}

fn init() -> Result<ExitStatus> {
    let config_path = Path::new(CONFIG_FILE_NAME);
    if config_path.exists() {
        eprintln!("{} {} already exists", "error:".bold().red(), CONFIG_FILE_NAME);
        return Ok(ExitStatus::Failure);
    }

    fs::write(config_path, default_config_json()?)?;
    println!("{} {}", "Created".green().bold(), CONFIG_FILE_NAME);
    Ok(ExitStatus::Success)
}
