use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::debug;

use ascend_core::config::{ConfigLoader, ConfigSystemError, ConfigValidator};
use ascend_core::kernel::bootstrap::Application;
use ascend_core::kernel::constants;

/// Ascend: a configuration-driven plugin framework
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Inspect plugins
    Plugin {
        #[command(subcommand)]
        command: PluginCommand,
    },
    /// Work with configuration files
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum PluginCommand {
    /// List discoverable plugins
    List {
        /// Configuration file supplying plugin search paths
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate a configuration file and report every problem found
    Check {
        /// The configuration file to check
        path: PathBuf,
        /// Fail on the first structural violation instead of accumulating
        #[arg(long)]
        strict: bool,
    },
    /// Write a default configuration file
    Init {
        /// Destination path (.json, .yaml or .yml)
        path: PathBuf,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let args = CliArgs::parse();

    match args.command {
        Commands::Plugin {
            command: PluginCommand::List { config },
        } => plugin_list(config),
        Commands::Config {
            command: ConfigCommand::Check { path, strict },
        } => config_check(&path, strict),
        Commands::Config {
            command: ConfigCommand::Init { path },
        } => config_init(&path),
    }
}

fn plugin_list(config: Option<PathBuf>) -> ExitCode {
    let mut app = match config {
        Some(path) => match Application::with_config(&path) {
            Ok(app) => app,
            Err(e) => {
                eprintln!("Failed to load configuration: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => Application::new(),
    };

    let names = app.manager_mut().discover_plugins(true);
    if names.is_empty() {
        println!("No plugins found.");
        println!("Search paths:");
        for path in app.manager().discovery().search_paths() {
            println!("  - {}", path.display());
        }
        return ExitCode::SUCCESS;
    }

    println!("Available plugins:");
    for name in names {
        match app.manager().discovery().get_info(&name) {
            Some(descriptor) if !descriptor.version.is_empty() => {
                println!("  - {} ({})", descriptor.name, descriptor.version);
            }
            _ => println!("  - {name}"),
        }
    }
    ExitCode::SUCCESS
}

fn config_check(path: &PathBuf, strict: bool) -> ExitCode {
    let loader = ConfigLoader::default();
    let doc = match loader.load(path, false, false) {
        Ok(doc) => doc,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    debug!("loaded {} for checking", path.display());

    let mut validator = ConfigValidator::new();
    let valid = match validator.validate(&doc, strict) {
        Ok(valid) => valid,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    for warning in validator.warnings() {
        println!("warning: {warning}");
    }
    if valid {
        println!("{} is valid.", path.display());
        ExitCode::SUCCESS
    } else {
        for error in validator.errors() {
            eprintln!("error: {error}");
        }
        eprintln!(
            "{} is invalid ({} error(s)).",
            path.display(),
            validator.errors().len()
        );
        ExitCode::FAILURE
    }
}

fn config_init(path: &PathBuf) -> ExitCode {
    let loader = ConfigLoader::default();
    if let Err(e) = loader.save_default(path) {
        match e {
            ConfigSystemError::UnsupportedFormat { .. } => eprintln!("{e}"),
            other => eprintln!("Failed to write default configuration: {other}"),
        }
        return ExitCode::FAILURE;
    }
    println!(
        "Wrote default {} configuration to {}.",
        constants::FRAMEWORK_NAME,
        path.display()
    );
    ExitCode::SUCCESS
}
