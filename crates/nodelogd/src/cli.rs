//! CLI argument definitions

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "nodelogd")]
#[command(version, about = "Rotates and prunes per-node log directories")]
pub struct Cli {
    /// Config file (default: nodelog.{toml,yaml,yml,json} in the working
    /// directory, then ~/.nodelog/config.toml)
    #[arg(short, long, env = "NODELOG_CONFIG")]
    pub config: Option<PathBuf>,

    /// Run a single rotation pass and exit
    #[arg(long)]
    pub once: bool,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
