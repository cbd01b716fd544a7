use clap::Subcommand;
use std::path::PathBuf;

/// One controller action against the session's current group.
#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Command {
    /// Print the current group's clicks, or every group as JSON
    Show {
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// List group names in file order, marking the current one
    Groups,
    /// Record a primary click at image coordinates (rounded to pixels)
    Click {
        #[arg(allow_negative_numbers = true)]
        x: f64,
        #[arg(allow_negative_numbers = true)]
        y: f64,
    },
    /// Record a secondary click: a placeholder without coordinates
    Placeholder,
    /// Print the click at a 0-based index
    Get { index: usize },
    /// Remove the click at a 0-based index
    Remove { index: usize },
    /// Remove the most recent click
    Undo,
    /// Remove every click from the current group
    Clear,
    /// Rename a group, keeping its clicks and position
    Rename { old: String, new: String },
    /// Delete a group (the current one when no name is given)
    RemoveGroup { name: Option<String> },
    /// Write the session to another CSV file
    Export { path: PathBuf },
}

impl Command {
    /// Whether a successful run changes what is stored on disk.
    pub fn mutates(&self) -> bool {
        matches!(
            self,
            Command::Click { .. }
                | Command::Placeholder
                | Command::Remove { .. }
                | Command::Undo
                | Command::Clear
                | Command::Rename { .. }
                | Command::RemoveGroup { .. }
        )
    }
}
