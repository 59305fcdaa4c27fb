use clap::Parser;

mod cli;
mod commands;

use cli::{Args, Commands};
use unionfs_cow::error;

fn main() {
    match run() {
        Ok(code) => {
            std::process::exit(code);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn run() -> error::Result<i32> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("UNIONFS_COW_LOG").unwrap_or_else(|_| "info".to_string()))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let open = || commands::open_union(args.config.as_deref(), args.branches.as_deref());

    match args.command {
        Commands::Hash { input } => commands::print_hash(&input),
        Commands::Check { path, branch } => commands::check_path(&open()?, &path, branch),
        Commands::Resolve { path } => commands::resolve_path(&open()?, &path),
        Commands::Hide { path, branch, dir } => {
            commands::hide_path(&open()?, &path, branch, dir)
        }
        Commands::Unhide { path, max_branch } => {
            commands::unhide_path(&open()?, &path, max_branch)
        }
        Commands::List { branch, json } => commands::list_whiteouts(&open()?, branch, json),
    }
}
