//! Weave - interactive shell on top of the weave line editor
//!
//! Usage:
//!   weave                  Interactive shell
//!   weave -h, --help       Show help
//!   weave -v, --version    Show version

use std::env;
use std::io::{self, Stdin, Stdout, Write};

use anyhow::{Context, Result};
use colored::Colorize;
use tracing::{debug, info};

use weave_shell::completer::{ShellCompleter, COMMANDS};
use weave_shell::config::ShellConfig;
use weave_shell::history_file::HistoryStore;
use weave_shell::{logging, LineEditor};

type Editor = LineEditor<Stdin, Stdout>;

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() > 1 {
        match args[1].as_str() {
            "-h" | "--help" => {
                print_help();
                return Ok(());
            }
            "-v" | "--version" => {
                println!("Weave v{}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            _ => {
                eprintln!("weave: unknown option: {}", args[1]);
                std::process::exit(1);
            }
        }
    }

    let config = ShellConfig::from_env();
    if let Err(e) = logging::init(&config) {
        eprintln!("weave: logging disabled: {e:#}");
    }
    if !config.color {
        colored::control::set_override(false);
    }

    run_repl(&config)
}

fn print_help() {
    println!("{}", "Weave - interactive shell".bold());
    println!();
    println!("Usage:");
    println!("  weave                  Start interactive shell");
    println!("  weave -h, --help       Show this help");
    println!("  weave -v, --version    Show version");
    println!();
    println!("Environment:");
    println!("  WEAVE_HISTORY          History file (default ~/.weave_history)");
    println!("  WEAVE_HISTORY_MAX      Entries kept in the history file (default 5000)");
    println!("  WEAVE_LOG              Log filter, e.g. weave_shell=debug");
    println!("  WEAVE_LOG_FILE         Log file location");
    println!("  NO_COLOR               Disable colors");
}

fn print_banner() {
    println!(
        "{} {}",
        "Weave".bold().cyan(),
        format!("v{}", env!("CARGO_PKG_VERSION")).bright_black()
    );
    println!(
        "  {} for help, {} to exit, {} for completion",
        "/help".green(),
        "/exit".green(),
        "Tab".yellow()
    );
    println!();
}

fn print_commands(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "Commands:")?;
    writeln!(out, "  /help        Show this list")?;
    writeln!(out, "  /history     Show command history")?;
    writeln!(out, "  /exit        Leave the shell (also /quit)")?;
    writeln!(out)?;
    writeln!(out, "Keys: Ctrl-A/E home/end, Ctrl-K/U kill, Ctrl-W delete word,")?;
    writeln!(out, "      Up/Down history, Tab complete, Ctrl-L clear, Ctrl-D quit")?;
    writeln!(out, "Completes: {}", COMMANDS.join(" "))?;
    Ok(())
}

fn prompt(color: bool) -> String {
    if color {
        format!("{}{} ", "weave".bold().cyan(), ">".bright_black())
    } else {
        "weave> ".to_string()
    }
}

/// Ask a yes/no question. End of input counts as yes.
fn confirm(editor: &mut Editor, question: &str) -> Result<bool> {
    editor.set_prompt(&format!("{question} [y/N] "));
    match editor.read_simple_line() {
        Ok(answer) => Ok(matches!(answer.trim(), "y" | "Y" | "yes" | "Yes")),
        Err(e) if e.is_eof() => Ok(true),
        Err(e) => Err(e).context("failed to read confirmation"),
    }
}

fn run_repl(config: &ShellConfig) -> Result<()> {
    let mut editor = LineEditor::with_config(io::stdin(), io::stdout(), config.editor_config());
    if editor.is_tty() {
        print_banner();
    }

    let mut history = match HistoryStore::open(&config.history_path, config.history_max) {
        Ok(store) => Some(store),
        Err(e) => {
            eprintln!("{}: {:#}", "warning".yellow(), e);
            None
        }
    };

    let cwd = env::current_dir().context("failed to read current directory")?;
    editor.set_completer(ShellCompleter::new(cwd));
    info!("shell started");

    loop {
        editor.set_prompt(&prompt(config.color));
        if let Some(store) = history.as_ref() {
            editor.set_history(store.entries().to_vec());
        }

        let line = match editor.read_line() {
            Ok(line) => line,
            Err(e) if e.is_eof() => {
                debug!("end of input");
                break;
            }
            Err(e) => {
                eprintln!("{}: {}", "error".red(), e);
                break;
            }
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(store) = history.as_mut() {
            if let Err(e) = store.add(line) {
                eprintln!("{}: {:#}", "warning".yellow(), e);
            }
        }

        let command = line.split_whitespace().next().unwrap_or_default();
        match command {
            "/help" => print_commands(editor.output_mut())?,
            "/history" => {
                let entries = editor.history().to_vec();
                let out = editor.output_mut();
                for (i, entry) in entries.iter().enumerate() {
                    writeln!(out, "{:>5}  {}", i + 1, entry)?;
                }
            }
            "/exit" | "/quit" => {
                if confirm(&mut editor, "Really exit?")? {
                    break;
                }
            }
            _ => {
                eprintln!("{}: unknown command: {}", "error".red(), command);
            }
        }
        editor.output_mut().flush()?;
    }

    if let Some(store) = history.as_mut() {
        if let Err(e) = store.compact() {
            eprintln!("{}: {:#}", "warning".yellow(), e);
        }
    }

    println!("Goodbye!");
    Ok(())
}
