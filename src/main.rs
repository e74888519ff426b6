use anyhow::Result;
use clap::Parser;
use qapkg::commands::{self, config::Config};
use qapkg::runtime::{RealRuntime, Runtime};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

/// qapkg - QuickApps package inspector
///
/// Answer questions about the plugins and libraries of a CMS installation:
/// which plugin directories exist, what version each package is, and which
/// enabled plugins depend on a given one.
///
/// The installation is described by a JSON config file, looked up from
/// --config, then QAPKG_CONFIG, then the user config directory, then
/// ./qapkg.json.
///
/// Examples:
///   qapkg list                 # Registered plugins with versions
///   qapkg version ext-intl     # Version of a host library
///   qapkg dependents blog      # Enabled plugins requiring Blog
#[derive(Parser, Debug)]
#[command(author, version = env!("QAPKG_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file of the CMS installation
    #[arg(long = "config", short = 'c', value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// List plugin directories found under the plugin roots
    Scan(ScanArgs),

    /// List registered plugins with version and state
    List,

    /// Show a plugin's information
    Show(ShowArgs),

    /// Print the resolved version of a package
    Version(VersionArgs),

    /// Validate a plugin manifest file
    Validate(ValidateArgs),

    /// List enabled plugins that depend on a plugin
    Dependents(DependentsArgs),
}

#[derive(clap::Args, Debug)]
pub struct ScanArgs {
    /// Leave out theme directories
    #[arg(long)]
    pub ignore_themes: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Plugin name
    pub plugin: String,

    /// Dotted path into the info mapping, e.g. settings.per_page
    #[arg(long, value_name = "PATH")]
    pub key: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct VersionArgs {
    /// Package name: plugin, `author/package`, `ext-*`, `lib-*` or the runtime
    pub package: String,
}

#[derive(clap::Args, Debug)]
pub struct ValidateArgs {
    /// Path to a composer.json file
    pub path: PathBuf,
}

#[derive(clap::Args, Debug)]
pub struct DependentsArgs {
    /// Plugin name
    pub plugin: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let runtime: Arc<dyn Runtime> = Arc::new(RealRuntime);
    let config_path = Config::locate(runtime.as_ref(), cli.config)?;
    let config = Config::load(runtime.as_ref(), &config_path)?;
    let registry = config.registry(runtime)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Scan(args) => commands::scan(&registry, args.ignore_themes, &mut out)?,
        Commands::List => commands::list(&registry, &mut out)?,
        Commands::Show(args) => {
            commands::show(&registry, &args.plugin, args.key.as_deref(), &mut out)?
        }
        Commands::Version(args) => commands::version(&registry, &args.package, &mut out)?,
        Commands::Validate(args) => commands::validate(&registry, &args.path, &mut out)?,
        Commands::Dependents(args) => commands::dependents(&registry, &args.plugin, &mut out)?,
    }
    out.flush()?;
    Ok(())
}
