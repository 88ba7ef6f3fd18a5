//! Main entry point for the imx-mkimage CLI tool

use clap::Parser;
use colored::Colorize;
use mkimage::cli::{Args, run_cli};

fn main() {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(args.log_level()))
        .format_timestamp(None)
        .format_target(false)
        .init();

    if let Err(e) = run_cli(args) {
        eprintln!("{} {:#}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}
