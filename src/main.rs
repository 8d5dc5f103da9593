mod app;
mod cli;
mod color;
mod config;
mod data;
mod snapshot;
mod state;
mod ui;

use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use cli::{Cli, Command, PlotArgs, ReformatArgs, SignalsArgs};
use config::{ConfigFile, Leniency};
use data::chart::Chart;
use data::loader::load_signal_table;
use data::reformat::reformat;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    ExitCode::from(exit_status(run(&cli)))
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Command::Reformat(args) => run_reformat(args),
        Command::Plot(args) => run_plot(args),
        Command::Signals(args) => run_signals(args),
    }
}

/// 0 on success; any reported error is printed and gives 1.
fn exit_status(outcome: anyhow::Result<()>) -> u8 {
    match outcome {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("Error: {err:#}");
            1
        }
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ConfigFile> {
    match path {
        Some(path) => ConfigFile::load(path)
            .with_context(|| format!("reading config {}", path.display())),
        None => Ok(ConfigFile::default()),
    }
}

fn run_reformat(args: &ReformatArgs) -> anyhow::Result<()> {
    let file = load_config(args.config.as_deref())?;
    let config = args.section().or(file.reformat).into_config()?;
    let summary = reformat(&config)?;
    println!(
        "Formatted {} numbers into {} rows in {}.",
        summary.values,
        summary.rows,
        config.output.display()
    );
    Ok(())
}

fn run_plot(args: &PlotArgs) -> anyhow::Result<()> {
    let file = load_config(args.config.as_deref())?;
    let config = args.section().or(file.plot).into_config()?;

    let table = load_signal_table(&config.input, config.delimiter, config.leniency)?;
    let chart = Chart::build(&table, &config)?;

    match &config.save {
        Some(path) => snapshot::save_chart_png(&chart, path)
            .with_context(|| format!("saving chart to {}", path.display()))?,
        None => app::show(chart, &config.input.display().to_string())?,
    }
    Ok(())
}

fn run_signals(args: &SignalsArgs) -> anyhow::Result<()> {
    let leniency = args.leniency.value().unwrap_or(Leniency::Lenient);
    let table = load_signal_table(&args.input, args.delimiter, leniency)?;
    for signal in table.signals() {
        println!("{signal}");
    }
    Ok(())
}
