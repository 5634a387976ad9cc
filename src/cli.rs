use crate::config::Settings;
use crate::logging::LogFormat;
use crate::translate::Language;
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "codeglyph")]
#[command(about = "Commit activity heatmaps for a registry of git repositories")]
#[command(version)]
pub struct Cli {
    #[clap(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Clone)]
pub struct CommonArgs {
    #[arg(long, env = "GIT_REPOS_BASE", default_value = "/repos", help = "Directory tracked repository paths are relative to")]
    pub base: PathBuf,

    #[arg(long, env = "CODEGLYPH_DATA_DIR", default_value = "data", help = "Directory holding repos.json")]
    pub data_dir: PathBuf,

    #[arg(
        long,
        env = "CODEGLYPH_BOOTSTRAP",
        value_delimiter = ',',
        help = "Repository paths to register when no registry exists yet"
    )]
    pub bootstrap: Vec<String>,

    #[arg(long, env = "CODEGLYPH_GIT", default_value = "git", help = "git executable to run")]
    pub git: String,

    #[arg(long, value_parser = humantime::parse_duration, default_value = "30s", help = "Time limit for reading history")]
    pub log_timeout: Duration,

    #[arg(long, value_parser = humantime::parse_duration, default_value = "10s", help = "Time limit for finding the first commit")]
    pub first_commit_timeout: Duration,

    #[arg(short, long, action = clap::ArgAction::Count, global = true, help = "Increase log verbosity (-v, -vv, -vvv)")]
    pub verbose: u8,

    #[arg(long, value_enum, default_value_t = LogFormat::Text, help = "Log record format")]
    pub log_format: LogFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage the repository registry
    Repos {
        #[command(subcommand)]
        action: ReposAction,
    },
    /// Hour-by-hour commit heatmap and statistics for one repository
    Heat {
        #[arg(help = "Registry id of the repository")]
        id: String,

        #[arg(long, help = "Only count commits from this day on (YYYY-MM-DD)")]
        since: Option<String>,

        #[arg(long, default_value = "fr", help = "Language of the busiest day name (fr or en)")]
        lang: String,

        #[arg(long, help = "Output as JSON")]
        json: bool,
    },
    /// Serve the registry and heatmaps over HTTP
    Serve {
        #[arg(long, env = "CODEGLYPH_BIND", default_value = "127.0.0.1:5000", help = "Address to listen on")]
        bind: SocketAddr,
    },
}

#[derive(Subcommand)]
pub enum ReposAction {
    /// List live repositories, default first
    List {
        #[arg(long, help = "Output as JSON")]
        json: bool,
    },
    /// Find unregistered repositories under the base directory
    Discover {
        #[arg(long, help = "Output as JSON")]
        json: bool,
    },
    /// Register a repository by its path relative to the base directory
    Add {
        path: String,

        #[arg(long, help = "Name to show instead of the directory name")]
        name: Option<String>,

        #[arg(long, help = "Output as JSON")]
        json: bool,
    },
    /// Remove a repository from the registry
    Remove {
        id: String,

        #[arg(long, help = "Output as JSON")]
        json: bool,
    },
    /// Make a repository the default one
    Default {
        id: String,

        #[arg(long, help = "Output as JSON")]
        json: bool,
    },
    /// Edit display name, description or URL; an empty value clears the field
    Update {
        id: String,

        #[arg(long)]
        display_name: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        url: Option<String>,

        #[arg(long, default_value = "fr", help = "Language the description is written in (fr or en)")]
        source_lang: String,

        #[arg(long, help = "Output as JSON")]
        json: bool,
    },
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub async fn execute(self) -> Result<()> {
        let settings = Settings::from(&self.common);
        match self.command {
            Commands::Repos { action } => crate::repos::exec(&settings, action),
            Commands::Heat { id, since, lang, json } => {
                let lang = Language::parse_or_default(Some(lang.as_str()));
                crate::heat::exec(&settings, &id, since.as_deref(), lang, json).await
            }
            Commands::Serve { bind } => crate::server::serve(&settings, bind).await,
        }
    }
}
