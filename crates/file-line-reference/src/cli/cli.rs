use anyhow::Context;
use clap::{Parser, Subcommand};
use file_line_reference::config::ConfigManager;
use file_line_reference::sdk::services::{StdoutClipboard, SystemClipboard};
use file_line_reference::utils::{ensure_absolute_path, logging, to_lsp_position};
use file_line_reference::{
    Clipboard, Document, EditorState, FileLineReference, ReferenceCommand, Selection,
};
use lsp_types::Position;
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "flref", version)]
#[command(about = "Copy a file:line:function reference for a selection to the clipboard")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Copy file name + line reference
    CopyFileLine(SelectionArgs),
    /// Copy file name + enclosing function
    CopyFileFunction(SelectionArgs),
    /// Copy file name + line + enclosing function
    CopyFileLineFunction(SelectionArgs),
}

impl Commands {
    fn split(self) -> (ReferenceCommand, SelectionArgs) {
        match self {
            Commands::CopyFileLine(args) => (ReferenceCommand::CopyFileLine, args),
            Commands::CopyFileFunction(args) => (ReferenceCommand::CopyFileFunction, args),
            Commands::CopyFileLineFunction(args) => (ReferenceCommand::CopyFileLineFunction, args),
        }
    }
}

#[derive(clap::Args)]
struct SelectionArgs {
    /// File open in the "editor"; without it there is nothing to copy
    file: Option<PathBuf>,
    /// Selection anchor as LINE[:COLUMN] (1-based)
    #[arg(long, default_value = "1")]
    at: CliPosition,
    /// Active end of the selection as LINE[:COLUMN] (1-based); defaults to --at
    #[arg(long)]
    to: Option<CliPosition>,
    /// Language identifier (c, cpp, objective-c, objective-cpp, java, ...)
    #[arg(short, long)]
    language: Option<String>,
    /// Workspace root handed to the language server
    #[arg(long)]
    workspace_root: Option<PathBuf>,
    /// Directory holding languages.json
    #[arg(long)]
    config_dir: Option<PathBuf>,
    /// Language server timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,
    /// Print the reference to stdout instead of copying it
    #[arg(long)]
    print: bool,
    /// Linux: stop serving the clipboard after N seconds even if no other
    /// application has taken it over
    #[arg(long, conflicts_with = "print")]
    hold_secs: Option<u64>,
    /// Append logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

/// 1-based LINE[:COLUMN]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CliPosition {
    line: u32,
    column: u32,
}

impl FromStr for CliPosition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (line, column) = match s.split_once(':') {
            Some((line, column)) => (line, Some(column)),
            None => (s, None),
        };
        let parse = |part: &str| {
            part.trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n >= 1)
                .ok_or_else(|| format!("expected LINE[:COLUMN] with 1-based numbers, got '{s}'"))
        };
        Ok(Self {
            line: parse(line)?,
            column: column.map(parse).transpose()?.unwrap_or(1),
        })
    }
}

/// Where the finished reference goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClipboardTarget {
    Stdout,
    System { hold: Option<Duration> },
}

impl ClipboardTarget {
    fn from_args(args: &SelectionArgs) -> Self {
        if args.print {
            ClipboardTarget::Stdout
        } else {
            ClipboardTarget::System {
                hold: args.hold_secs.map(Duration::from_secs),
            }
        }
    }

    fn into_clipboard(self) -> Arc<dyn Clipboard> {
        match self {
            ClipboardTarget::Stdout => Arc::new(StdoutClipboard),
            ClipboardTarget::System { hold: Some(hold) } => {
                Arc::new(SystemClipboard::holding_for(hold))
            }
            ClipboardTarget::System { hold: None } => Arc::new(SystemClipboard::new()),
        }
    }
}

impl From<CliPosition> for Position {
    fn from(position: CliPosition) -> Self {
        to_lsp_position(position.line, position.column)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let (command, args) = cli.command.split();

    if let Err(e) = logging::init_logging(args.log_file.as_deref()) {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    match run(command, args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("flref: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: ReferenceCommand, args: SelectionArgs) -> anyhow::Result<()> {
    let clipboard = ClipboardTarget::from_args(&args).into_clipboard();
    if copy_reference(command, args, clipboard).await?.is_none() {
        tracing::info!("Nothing to copy");
    }
    Ok(())
}

/// Build the editor state from the arguments and run the command against `clipboard`
async fn copy_reference(
    command: ReferenceCommand,
    args: SelectionArgs,
    clipboard: Arc<dyn Clipboard>,
) -> anyhow::Result<Option<String>> {
    let config_root = args.config_dir.unwrap_or_else(ConfigManager::default_root);
    let config_manager = ConfigManager::new(config_root);

    let editor = match &args.file {
        Some(file) => {
            let path = ensure_absolute_path(file)?;
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let language_id = args
                .language
                .clone()
                .or_else(|| config_manager.get_language_for_path(&path))
                .unwrap_or_else(|| "plaintext".to_string());
            let anchor = Position::from(args.at);
            let active = args.to.map_or(anchor, Position::from);
            Some(EditorState::new(
                Document::new(path, language_id, text),
                Selection::new(anchor, active),
            ))
        }
        None => None,
    };

    let mut builder = FileLineReference::builder()
        .config(config_manager.get_config()?.clone())
        .clipboard(clipboard);
    if let Some(root) = args.workspace_root {
        builder = builder.workspace_root(ensure_absolute_path(root)?);
    }
    if let Some(secs) = args.timeout_secs {
        builder = builder.request_timeout_secs(secs);
    }
    let copier = builder.build()?;

    let result = copier.execute(command, editor.as_ref()).await;
    copier.shutdown().await;
    Ok(result?)
}
