use anyhow::Result;
use clap::Parser;
use lip::application::{InstallOptions, ReinstallMode};
use lip::commands;
use lip::context::LipContext;
use std::path::PathBuf;

/// lip - a package installer for tooths
///
/// Resolves tooths through a Go module proxy, installs them and their
/// dependencies into a workspace and keeps track of what each one owns.
///
/// Environment:
///   GOPROXY        proxy to fetch tooths from (default https://goproxy.io)
///   LIP_CACHE_DIR  where downloaded archives are kept
///
/// Examples:
///   lip install github.com/tooth-hub/example
///   lip install github.com/tooth-hub/example@>=1.0.0,<2.0.0
///   lip install ./example.tth
#[derive(Parser, Debug)]
#[command(author, version = env!("LIP_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Workspace to install into (defaults to the current directory)
    #[arg(
        long = "workspace",
        short = 'w',
        env = "LIP_WORKSPACE",
        value_name = "PATH",
        global = true
    )]
    pub workspace: Option<PathBuf>,

    /// Show debug output
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only show errors
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Install tooths and their dependencies
    Install(InstallArgs),

    /// Uninstall tooths
    Uninstall(UninstallArgs),

    /// Uninstall dependencies no installed tooth requires
    Autoremove(AutoremoveArgs),

    /// List installed tooths
    List,

    /// Show details of an installed tooth
    Show(ShowArgs),

    /// Inspect or clear the archive cache
    #[command(subcommand)]
    Cache(CacheCommands),
}

#[derive(clap::Args, Debug)]
pub struct InstallArgs {
    /// Tooth paths with optional version ranges, archive URLs or local .tth files
    #[arg(value_name = "SPECIFIER", required = true)]
    pub specs: Vec<String>,

    /// Replace installed tooths when a newer version resolves
    #[arg(long)]
    pub upgrade: bool,

    /// Reinstall requested tooths even if already installed
    #[arg(long)]
    pub force_reinstall: bool,

    /// Skip confirmation prompt
    #[arg(short = 'y', long = "yes")]
    pub yes: bool,
}

#[derive(clap::Args, Debug)]
pub struct UninstallArgs {
    /// Tooth paths to uninstall
    #[arg(value_name = "TOOTH", required = true)]
    pub tooths: Vec<String>,

    /// Skip confirmation prompt
    #[arg(short = 'y', long = "yes")]
    pub yes: bool,
}

#[derive(clap::Args, Debug)]
pub struct AutoremoveArgs {
    /// Skip confirmation prompt
    #[arg(short = 'y', long = "yes")]
    pub yes: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Tooth path
    #[arg(value_name = "TOOTH")]
    pub tooth: String,
}

#[derive(clap::Subcommand, Debug)]
enum CacheCommands {
    /// Show cache location and size
    Info,

    /// Delete all cached archives
    Purge {
        /// Skip confirmation prompt
        #[arg(short = 'y', long = "yes")]
        yes: bool,
    },
}

impl Cli {
    fn log_filter(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "info"
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_filter()))
        .init();

    let runtime = lip::runtime::RealRuntime;
    let ctx = LipContext::from_runtime(&runtime, cli.workspace)?;

    match cli.command {
        Commands::Install(args) => {
            let options = InstallOptions {
                mode: ReinstallMode::from_flags(args.upgrade, args.force_reinstall),
            };
            commands::install(runtime, &args.specs, options, args.yes, ctx).await?
        }
        Commands::Uninstall(args) => commands::uninstall(runtime, &args.tooths, args.yes, ctx)?,
        Commands::Autoremove(args) => commands::autoremove(runtime, args.yes, ctx)?,
        Commands::List => commands::list(runtime, ctx)?,
        Commands::Show(args) => commands::show(runtime, &args.tooth, ctx)?,
        Commands::Cache(CacheCommands::Info) => commands::cache_info(runtime, ctx)?,
        Commands::Cache(CacheCommands::Purge { yes }) => commands::cache_purge(runtime, yes, ctx)?,
    }
    Ok(())
}
