//! NovelRT CLI - create, build and publish NovelRT projects

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use log::Level;
use novelrt_sdk::tui;
use novelrt_sdk::{
    NewProjectOptions, PipelineContext, SdkConfig, SdkError, VersionSelector,
};
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "novelrt")]
#[command(about = "CLI for creating, building and publishing NovelRT projects")]
#[command(version)]
pub struct Args {
    /// Show debug output, including raw build tool output
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a new NovelRT project
    New(NewArgs),
    /// Create a release build and deploy it to a directory
    Publish(PublishArgs),
    /// Install dependencies, configure and build an existing project
    Build(BuildArgs),
    /// List the NovelRT versions available locally
    Versions,
}

#[derive(Parser, Debug)]
pub struct NewArgs {
    /// Directory to generate the project in; its name becomes the project name
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Path of a NovelRT source checkout to build from source. ONLY USE IF BUILDING NOVELRT!
    #[arg(short, long = "engine-location")]
    pub engine_location: Option<PathBuf>,

    /// NovelRT release tag to use, e.g. v0.1.0. Prompts if not provided
    #[arg(short = 'v', long = "engine-version")]
    pub engine_version: Option<String>,

    /// Configure CMake after generation
    #[arg(short, long)]
    pub configure: bool,

    /// Build the project after configuration
    #[arg(short, long)]
    pub build: bool,
}

impl From<NewArgs> for NewProjectOptions {
    fn from(args: NewArgs) -> Self {
        NewProjectOptions {
            output_dir: args.output,
            engine_location: args.engine_location,
            version: VersionSelector::from_option(args.engine_version),
            configure: args.configure,
            build: args.build,
        }
    }
}

#[derive(Parser, Debug)]
pub struct PublishArgs {
    /// Directory to store the release build in
    pub output: PathBuf,

    /// Project directory to publish from
    #[arg(short, long, default_value = ".")]
    pub project: PathBuf,
}

#[derive(Parser, Debug)]
pub struct BuildArgs {
    /// Project directory containing project.json
    #[arg(short, long, default_value = ".")]
    pub project: PathBuf,
}

fn init_logging(verbose: bool) {
    use env_logger::{Builder, Env};

    let default_level = if verbose { "debug" } else { "info" };
    let mut builder = Builder::from_env(Env::default().default_filter_or(default_level));
    builder.filter_module("reqwest", log::LevelFilter::Warn);

    builder.format(move |buf, record| {
        let message = match record.level() {
            Level::Error => record.args().to_string().red().to_string(),
            Level::Warn => record.args().to_string().yellow().to_string(),
            _ => record.args().to_string(),
        };
        if verbose {
            writeln!(
                buf,
                "[{} {:<5}] {}",
                buf.timestamp_millis(),
                record.level(),
                message
            )
        } else {
            writeln!(buf, "{}", message)
        }
    });

    builder.init();
}

async fn dispatch(ctx: &PipelineContext, command: Command) -> novelrt_sdk::Result<()> {
    match command {
        Command::New(args) => tui::new_project(ctx, args.into()).await.map(|_| ()),
        Command::Publish(args) => tui::publish(ctx, &args.project, &args.output)
            .await
            .map(|_| ()),
        Command::Build(args) => tui::build(ctx, &args.project).await.map(|_| ()),
        Command::Versions => tui::versions(ctx).map(|_| ()),
    }
}

fn report(error: &SdkError, verbose: bool) {
    if matches!(error, SdkError::UserCancelled) {
        log::info!("Exiting...");
        return;
    }

    log::error!("{}", error);
    if verbose {
        let mut source = std::error::Error::source(error);
        while let Some(cause) = source {
            log::debug!("  caused by: {}", cause);
            source = cause.source();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tui::install_terminal_guards();

    let args = Args::parse();
    init_logging(args.verbose);

    let ctx = PipelineContext::new(SdkConfig::from_env()?, args.verbose);
    let result = dispatch(&ctx, args.command).await;

    // Ensure cursor is visible on normal exit
    tui::restore_cursor();

    if let Err(error) = result {
        report(&error, args.verbose);
        std::process::exit(error.exit_code());
    }
    Ok(())
}
