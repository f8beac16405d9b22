use clap::{CommandFactory, Parser, Subcommand};
use libscanner::client::DEFAULT_TAG;
use libscanner::config::ColorChoice;
use log::{debug, warn};
use std::path::PathBuf;

mod commands;
mod config;
mod context;
mod format;
mod image;

/// ublue-scanner - Container Image Scanner
///
/// Lists the container images of a GitHub organization and renders their
/// registry metadata as tables, badges and rebase instructions.
#[derive(Parser, Debug)]
#[command(name = "ublue-scanner")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Control colored output: auto, always, never
    #[arg(long, global = true)]
    color: Option<String>,

    /// Path to the YAML config file
    #[arg(long, global = true, env = config::CONFIG_ENV)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List an organization's images with their repository details
    Scan {
        /// GitHub organization
        #[arg(long)]
        org: String,
        /// GitHub token used for the API
        #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
        token: Option<String>,
        /// Output format: table, json, yaml, markdown
        #[arg(short, long)]
        format: Option<String>,
    },
    /// Render Markdown tag badges for an organization's images
    Badges {
        /// GitHub organization
        #[arg(long)]
        org: String,
        /// GitHub token used for the API
        #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
        token: Option<String>,
        /// Keep tags matching this regex (repeatable)
        #[arg(long)]
        include: Vec<String>,
        /// Drop tags matching this regex (repeatable)
        #[arg(long)]
        exclude: Vec<String>,
    },
    /// Print Markdown instructions for rebasing onto an image
    Rebase {
        /// Image reference, e.g. ghcr.io/ublue-os/bazzite
        image: String,
        /// Tag to rebase onto
        #[arg(short, long, default_value = DEFAULT_TAG)]
        tag: String,
        /// Keep listed tags matching this regex (repeatable)
        #[arg(long)]
        include: Vec<String>,
        /// Drop listed tags matching this regex (repeatable)
        #[arg(long)]
        exclude: Vec<String>,
    },
    /// Show tags and labels of an image
    Meta {
        /// Image reference, e.g. ghcr.io/ublue-os/bluefin
        image: String,
        /// Tag whose config labels are shown
        #[arg(short, long, default_value = DEFAULT_TAG)]
        tag: String,
        /// Output format: table, json, yaml, markdown
        #[arg(short, long)]
        format: Option<String>,
    },
    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completion for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Display version information
    Version,
}

/// Exit code for an unrecognized `--format`
const EXIT_USAGE: i32 = 2;

fn output_format(ctx: &context::AppContext, flag: Option<&str>) -> format::OutputFormat {
    match format::resolve_format(ctx, flag) {
        Ok(fmt) => fmt,
        Err(e) => {
            format::error(ctx, &e.to_string());
            std::process::exit(EXIT_USAGE);
        }
    }
}

fn main() {
    // Read .env before parsing so `env = "GITHUB_TOKEN"` can see its values
    let env_file = std::env::current_dir().map(|dir| config::load_env_file(&dir));

    let cli = Cli::parse();
    let verbosity = context::VerbosityLevel::from_count(cli.verbose);

    // RUST_LOG, when set, takes precedence over -v
    env_logger::Builder::new()
        .filter_level(verbosity.log_level())
        .parse_default_env()
        .init();

    match env_file {
        Ok(Ok(Some(path))) => debug!("Loaded environment from {}", path.display()),
        Ok(Err(e)) => warn!("Ignoring .env file: {}", e),
        _ => {}
    }

    // Build context with precedence: defaults > config file > env vars > CLI flags
    let config_path = config::get_config_path(cli.config);
    let ctx = match context::AppContext::build(
        cli.color.as_deref().map(ColorChoice::from),
        verbosity,
        config_path.as_deref(),
    ) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("✗ {}", e);
            std::process::exit(1);
        }
    };

    match cli.command {
        Commands::Scan { org, token, format } => {
            let fmt = output_format(&ctx, format.as_deref());
            commands::scan::handle_scan(&ctx, &org, token, fmt);
        }
        Commands::Badges {
            org,
            token,
            include,
            exclude,
        } => {
            commands::badges::handle_badges(&ctx, &org, token, &include, &exclude);
        }
        Commands::Rebase {
            image,
            tag,
            include,
            exclude,
        } => {
            commands::rebase::handle_rebase(&ctx, &image, &tag, &include, &exclude);
        }
        Commands::Meta { image, tag, format } => {
            let fmt = output_format(&ctx, format.as_deref());
            commands::meta::handle_meta(&ctx, &image, &tag, fmt);
        }
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let bin_name = cmd.get_name().to_string();
            clap_complete::generate(shell, &mut cmd, bin_name, &mut std::io::stdout());
        }
        Commands::Version => {
            commands::version::print_version();
        }
    }
}
