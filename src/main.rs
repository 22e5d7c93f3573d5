use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use clipstack::clipboard;
use clipstack::config::{Config, ConfigStorage, TomlConfigStorage, ensure_config_dir};
use clipstack::models::ClipEntry;
use clipstack::{Coordinator, logging};

#[derive(Parser)]
#[command(name = "clipstack")]
#[command(about = "Clipboard history with loop-free write-back", long_about = None)]
struct Cli {
    /// Config file (default: $XDG_CONFIG_HOME/clipstack/clipstack.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch the clipboard and manage history from stdin (default)
    Watch,

    /// Print the effective configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let storage = config_storage(cli.config)?;
    let config = storage.load()?;
    init_logging(&config)?;
    log::debug!("Using configuration file {:?}", storage.path());

    match cli.command.unwrap_or(Commands::Watch) {
        Commands::Watch => cmd_watch(&config),
        Commands::Config => cmd_config(&config, storage.path()),
    }
}

fn config_storage(path: Option<PathBuf>) -> Result<TomlConfigStorage> {
    let path = match path {
        Some(path) => path,
        None => ensure_config_dir()?.join("clipstack.toml"),
    };
    Ok(TomlConfigStorage::new(path))
}

fn init_logging(config: &Config) -> Result<()> {
    let level = if config.general.debug_logging { "debug" } else { "info" };

    match &config.general.log_file {
        Some(path) => logging::init_logger(path.clone(), level, "warn"),
        None => {
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
                .init();
            Ok(())
        }
    }
}

fn cmd_config(config: &Config, path: &Path) -> Result<()> {
    let toml_str = toml::to_string_pretty(config).context("Failed to serialize configuration")?;
    println!("# {}", path.display());
    print!("{}", toml_str);
    Ok(())
}

/// Run the clipboard watcher with a small line-oriented command prompt
fn cmd_watch(config: &Config) -> Result<()> {
    let backend = clipboard::create_backend(config.general.max_image_size_bytes)?;
    let coordinator = Coordinator::new(backend, &config.general);
    coordinator
        .start()
        .context("Failed to start clipboard polling")?;

    println!(
        "Watching {} clipboard (max {} clips). Type 'help' for commands.",
        coordinator.backend_name(),
        config.general.max_items
    );

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("Failed to read command")?;
        let (command, arg) = match line.trim().split_once(' ') {
            Some((command, arg)) => (command, arg.trim()),
            None => (line.trim(), ""),
        };

        match command {
            "" => {}
            "list" | "ls" => print_entries(&coordinator.items()),
            "search" | "/" => print_entries(&coordinator.search(arg)),
            "copy" | "cp" => match parse_id(arg) {
                Some(id) => match coordinator.copy_back(id) {
                    Ok(()) => println!("Copied clip {}", id),
                    Err(e) => println!("{}", e),
                },
                None => println!("usage: copy <id>"),
            },
            "pin" => match parse_id(arg) {
                Some(id) if coordinator.toggle_pin(id) => println!("Toggled pin on clip {}", id),
                Some(id) => println!("No clip {}", id),
                None => println!("usage: pin <id>"),
            },
            "rm" | "delete" => match parse_id(arg) {
                Some(id) if coordinator.remove(id) => println!("Removed clip {}", id),
                Some(id) => println!("No clip {}", id),
                None => println!("usage: rm <id>"),
            },
            "clear" => {
                if coordinator.clear_unpinned() {
                    println!("Cleared unpinned clips");
                } else {
                    println!("Nothing to clear");
                }
            }
            "help" | "?" => print_help(),
            "quit" | "exit" | "q" => break,
            other => println!("Unknown command '{}'. Type 'help' for commands.", other),
        }
        io::stdout().flush().ok();
    }

    coordinator.stop();
    Ok(())
}

fn parse_id(arg: &str) -> Option<u64> {
    arg.parse().ok()
}

fn print_entries(entries: &[ClipEntry]) {
    if entries.is_empty() {
        println!("(empty - no clipboard history yet)");
        return;
    }

    for entry in entries {
        let pinned_mark = if entry.is_pinned() { " 📌" } else { "" };
        println!(
            "{:4} {} [{}]{} {}",
            entry.id(),
            entry
                .captured_at()
                .with_timezone(&chrono::Local)
                .format("%H:%M:%S"),
            entry.kind().label(),
            pinned_mark,
            entry.preview(60)
        );
    }
}

fn print_help() {
    println!("Commands:");
    println!("  list              show history (pinned first, newest first)");
    println!("  search <query>    case-insensitive substring search");
    println!("  copy <id>         write a clip back to the clipboard");
    println!("  pin <id>          pin or unpin a clip");
    println!("  rm <id>           delete a clip");
    println!("  clear             delete all unpinned clips");
    println!("  quit              stop watching");
}
