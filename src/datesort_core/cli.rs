use clap::Parser;
use simplelog::LevelFilter;
use std::path::PathBuf;

use crate::datesort_core::organize::OrganizeOptions;
use crate::datesort_core::placement::TransferMode;

#[derive(Parser, Debug)]
#[command(author, version, about = "Organize photos into folders by date")]
pub struct Cli {
    /// Directory containing photos to organize
    #[arg(required = true)]
    pub source_dir: PathBuf,

    /// Destination directory for organized photos (defaults to the current directory)
    #[arg(long, visible_alias = "dest_dir")]
    pub dest_dir: Option<PathBuf>,

    /// Copy files instead of moving them
    #[arg(long)]
    pub copy: bool,

    /// Show where each photo would go without making changes
    #[arg(long)]
    pub dry_run: bool,

    /// Read dates with exiftool instead of the built-in decoders
    #[arg(long)]
    pub exiftool: bool,

    /// Enable file logging to datesort.log
    #[arg(long = "log")]
    pub log: bool,

    /// Log level for file logging (debug, info, warn, error)
    #[arg(long, default_value_t = LevelFilter::Debug)]
    pub log_level: LevelFilter,
}

impl Cli {
    pub fn organize_options(&self) -> OrganizeOptions {
        OrganizeOptions {
            base_dir: self.dest_dir.clone(),
            mode: if self.copy {
                TransferMode::Copy
            } else {
                TransferMode::Move
            },
            dry_run: self.dry_run,
        }
    }
}
