mod config;
mod host;
mod miniapp;
mod tui;

use anyhow::{Context, Result, bail};
use clap::{Command, CommandFactory, Parser, Subcommand};
use clap_complete::{Generator, Shell, generate};
use config::{CONFIG_KEYS, Config, ConfigError};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use env_logger::{Env, Target};
use host::ProcessChannel;
use log::{error, info};
use miniapp::form::FormController;
use miniapp::shortcuts::{ConfirmOutcome, ShortcutStore, display_safe};
use miniapp::storage::FileStorage;
use ratatui::{
    Terminal,
    backend::{Backend, CrosstermBackend},
};
use std::fs::{self, OpenOptions};
use std::io::{self, BufRead, Write};
use std::time::Duration;
use tui::{app::App, theme::Theme, ui};

const TICK: Duration = Duration::from_millis(100);

#[derive(Parser)]
#[command(name = "postcopy")]
#[command(about = "Copy posts from a VK community to a Telegram chat")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Configuration management")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    #[command(about = "Manage saved community shortcuts")]
    Shortcuts {
        #[command(subcommand)]
        action: ShortcutsAction,
    },
    #[command(about = "Generate shell completion scripts")]
    Completion {
        #[arg(help = "Shell to generate completions for")]
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    #[command(about = "Set a configuration value")]
    Set {
        #[arg(help = "Configuration key (host_command, target_chat or user_id)")]
        key: String,
        #[arg(
            help = "Configuration value. host_command is split on whitespace; use a TOML array such as '[\"/opt/my host/run\", \"--fast\"]' when parts contain spaces"
        )]
        value: String,
    },
    #[command(about = "Get a configuration value")]
    Get {
        #[arg(help = "Configuration key")]
        key: String,
    },
    #[command(about = "List all configuration values")]
    List,
    #[command(about = "Remove a configuration value")]
    Unset {
        #[arg(help = "Configuration key")]
        key: String,
    },
}

#[derive(Subcommand)]
enum ShortcutsAction {
    #[command(about = "List saved shortcuts")]
    List {
        #[arg(long, help = "Print the list as an HTML fragment")]
        html: bool,
    },
    #[command(about = "Save a shortcut")]
    Add {
        #[arg(help = "Display name")]
        name: String,
        #[arg(help = "Community ID or short name")]
        id: String,
    },
    #[command(about = "Delete a shortcut")]
    Remove {
        #[arg(help = "Position as shown by 'shortcuts list'")]
        index: usize,
        #[arg(short, long, help = "Do not ask for confirmation")]
        yes: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging() {
        eprintln!("Warning: logging disabled: {:#}", e);
    }

    let result = match cli.command {
        Some(Commands::Config { action }) => {
            handle_config_command(action).map_err(anyhow::Error::from)
        }
        Some(Commands::Shortcuts { action }) => handle_shortcuts_command(action),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            print_completions(shell, &mut cmd);
            Ok(())
        }
        None => run_main_app(),
    };

    if let Err(e) = result {
        error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Logs go to a file because the terminal belongs to the UI.
fn init_logging() -> Result<()> {
    let dir = config::data_dir()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    let path = dir.join("postcopy.log");
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open {}", path.display()))?;

    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn handle_config_command(action: ConfigAction) -> Result<(), ConfigError> {
    match action {
        ConfigAction::Set { key, value } => {
            let mut config = Config::load_or_default()?;
            config.set(&key, &value)?;
            config.save()?;
            info!("Config {} updated", key);
            println!("Configuration saved successfully.");
        }
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            match config.get(&key)? {
                Some(value) => println!("{}", value),
                None => println!("(not set)"),
            }
        }
        ConfigAction::List => {
            let config = Config::load()?;
            for key in CONFIG_KEYS {
                let value = config.get(key)?.unwrap_or_else(|| "(not set)".to_string());
                println!("{} = {}", key, value);
            }
        }
        ConfigAction::Unset { key } => {
            let mut config = Config::load()?;
            config.unset(&key)?;
            config.save()?;
            info!("Config {} cleared", key);
            println!("Configuration saved successfully.");
        }
    }
    Ok(())
}

fn handle_shortcuts_command(action: ShortcutsAction) -> Result<()> {
    let mut store = open_shortcut_store()?;

    match action {
        ShortcutsAction::List { html } => {
            if html {
                print!("{}", store.render_html());
            } else if store.is_empty() {
                println!("No shortcuts saved.");
            } else {
                for (position, shortcut) in store.items().iter().enumerate() {
                    println!(
                        "{}. {} ({})",
                        position + 1,
                        display_safe(&shortcut.name),
                        display_safe(&shortcut.id)
                    );
                }
            }
        }
        ShortcutsAction::Add { name, id } => {
            store.add(&name, &id)?;
            println!("Shortcut saved.");
        }
        ShortcutsAction::Remove { index, yes } => {
            let Some(pending) = index.checked_sub(1).and_then(|i| store.request_delete(i)) else {
                bail!("No shortcut at position {}", index);
            };

            let outcome = if yes {
                ConfirmOutcome::Confirmed
            } else {
                print!("{} [y/N] ", display_safe(&pending.prompt()));
                io::stdout().flush()?;
                read_confirmation(io::stdin().lock())?
            };

            if store.complete_delete(pending, outcome)? {
                println!("Shortcut deleted.");
            } else {
                println!("Nothing deleted.");
            }
        }
    }
    Ok(())
}

fn read_confirmation(mut input: impl BufRead) -> Result<ConfirmOutcome> {
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(match answer.trim() {
        "y" | "Y" | "yes" | "Yes" => ConfirmOutcome::Confirmed,
        _ => ConfirmOutcome::Declined,
    })
}

fn open_shortcut_store() -> Result<ShortcutStore> {
    let dir = config::data_dir()?;
    Ok(ShortcutStore::load(Box::new(FileStorage::new(dir))))
}

fn run_main_app() -> Result<()> {
    let config = Config::load_or_default()
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;
    if config.host_command.is_empty() {
        return Err(ConfigError::HostCommandMissing.into());
    }

    let shortcuts = open_shortcut_store()?;
    let form = FormController::new(config.user_id, config.target_chat.clone());
    let channel = ProcessChannel::spawn(&config.host_command)?;
    let theme = Theme::from_config(&config.theme);
    let mut app = App::new(form, shortcuts, Box::new(channel), theme);

    info!("Starting form with {} saved shortcuts", app.shortcuts.len());
    run_tui(&mut app)
}

fn run_tui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        // Poll so host notifications are picked up without a key press.
        if event::poll(TICK)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key_event(key)?;
                }
            }
        }
        app.drain_host_messages();

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

fn print_completions<G: Generator>(generator: G, cmd: &mut Command) {
    generate(generator, cmd, cmd.get_name().to_string(), &mut io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_shortcut_remove() {
        let cli = Cli::try_parse_from(["postcopy", "shortcuts", "remove", "2", "--yes"]).unwrap();
        match cli.command {
            Some(Commands::Shortcuts {
                action: ShortcutsAction::Remove { index, yes },
            }) => {
                assert_eq!(index, 2);
                assert!(yes);
            }
            _ => panic!("expected shortcuts remove"),
        }
    }

    #[test]
    fn test_cli_without_subcommand_runs_form() {
        let cli = Cli::try_parse_from(["postcopy"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_read_confirmation() {
        assert_eq!(read_confirmation("y\n".as_bytes()).unwrap(), ConfirmOutcome::Confirmed);
        assert_eq!(read_confirmation("yes\n".as_bytes()).unwrap(), ConfirmOutcome::Confirmed);
        assert_eq!(read_confirmation("\n".as_bytes()).unwrap(), ConfirmOutcome::Declined);
        assert_eq!(read_confirmation("nope\n".as_bytes()).unwrap(), ConfirmOutcome::Declined);
    }
}
