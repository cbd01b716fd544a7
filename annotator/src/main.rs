use clap::Parser;
use std::path::PathBuf;
use workflow::command::Command;
use workflow::config::SessionConfig;
use workflow::session::Session;

mod report;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Edit grouped image clicks stored as CSV")]
struct Args {
    /// CSV file holding the clicks
    #[arg(long, short, global = true)]
    file: Option<PathBuf>,
    /// Load session defaults from YAML
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Group to work on; created when it does not exist
    #[arg(long, short, global = true)]
    group: Option<String>,
    #[command(subcommand)]
    command: Command,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = if let Some(path) = args.config {
        SessionConfig::load(path)?
    } else {
        SessionConfig::default()
    }
    .with_overrides(args.file, args.group);

    let mut session = Session::open(&config)?;
    let message = session.apply(&args.command)?;
    println!("{}", message.trim_end());
    session.commit()?;

    Ok(())
}
