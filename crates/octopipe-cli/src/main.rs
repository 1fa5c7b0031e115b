mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "octopipe",
    about = "Keep an Octopus Deploy project as a local octopipe.yaml and debug its scripts",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: nearest directory containing octopipe.yaml)
    #[arg(long, global = true, env = "OCTOPIPE_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// Log progress at info level (RUST_LOG overrides)
    #[arg(long, global = true, short = 'v')]
    verbose: bool,

    /// Octopus server URI, e.g. https://octopus.example.com
    #[arg(long, global = true, env = "OCTOPUS_URI")]
    uri: Option<String>,

    /// Octopus API key
    #[arg(long, global = true, env = "OCTOPUS_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a skeleton octopipe.yaml, or import an existing project
    Create {
        /// Name of an existing server project to import
        #[arg(short = 'i', long)]
        import: Option<String>,
    },

    /// Push octopipe.yaml to the server
    Put,

    /// Substitute #{name} tokens in the files of a directory
    Sub {
        /// Report unresolved tokens without writing anything
        #[arg(short = 'c', long)]
        check_only: bool,

        /// Only these files (comma separated), relative to the directory
        #[arg(short = 'f', long, value_delimiter = ',')]
        filenames: Option<Vec<String>>,

        /// Directory holding the scripts
        directory: PathBuf,

        /// Scope filter, e.g. Environment=Dev,Role=web
        scope: String,
    },

    /// Delete the backups created by `sub`
    Clear {
        /// Directory holding the scripts
        directory: PathBuf,
    },

    /// Check octopipe.yaml for mistakes without contacting the server
    Validate,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Create { import } => match import {
            Some(name) => cmd::create::import(&root, &name, cli.uri, cli.api_key, cli.json),
            None => cmd::create::skeleton(&root, cli.json),
        },
        Commands::Put => cmd::put::run(&root, cli.uri, cli.api_key, cli.json),
        Commands::Sub {
            check_only,
            filenames,
            directory,
            scope,
        } => cmd::sub::run(
            &root,
            &directory,
            &scope,
            filenames.as_deref(),
            check_only,
            cli.json,
        ),
        Commands::Clear { directory } => cmd::clear::run(&directory, cli.json),
        Commands::Validate => cmd::validate::run(&root, cli.json),
    };

    if let Err(e) = result {
        println!("error: {e:#}");
        std::process::exit(1);
    }
}
