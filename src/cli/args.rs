use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "unionfs-cow")]
#[command(about = "Inspect and manage copy-on-write whiteouts of a union filesystem")]
pub struct Args {
    #[arg(long, global = true, help = "Config file (default: config.toml in the config dir)")]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        help = "Branch list as dir1=RW:dir2=RO, overrides the configured branches"
    )]
    pub branches: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(about = "Show whether a union path is hidden in each branch")]
    Check {
        #[arg(help = "Union path, e.g. /dir/file")]
        path: String,

        #[arg(short, long, help = "Only check this branch")]
        branch: Option<usize>,
    },
    #[command(about = "Print the branch that backs a union path")]
    Resolve {
        #[arg(help = "Union path")]
        path: String,
    },
    #[command(about = "Create a whiteout marker for a union path")]
    Hide {
        #[arg(help = "Union path")]
        path: String,

        #[arg(short, long, help = "Branch to place the marker in")]
        branch: usize,

        #[arg(long, help = "Create a directory marker instead of a file marker")]
        dir: bool,
    },
    #[command(about = "Remove whiteout markers for a union path")]
    Unhide {
        #[arg(help = "Union path")]
        path: String,

        #[arg(long, help = "Highest branch to clean (default: all branches)")]
        max_branch: Option<usize>,
    },
    #[command(about = "List whiteout markers")]
    List {
        #[arg(short, long, help = "Only list this branch")]
        branch: Option<usize>,

        #[arg(long, help = "JSON output")]
        json: bool,
    },
    #[command(about = "Print the 32-bit ELF hash of a string")]
    Hash {
        #[arg(help = "String to hash")]
        input: String,
    },
}
