use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use gemini_console_cli::{Console, Overrides};
use gemini_console_core::ConsoleConfig;

#[derive(Parser)]
#[command(name = "gemini-console")]
#[command(about = "Gemini Console - chat with Gemini models from the terminal")]
#[command(version)]
struct Cli {
    /// Model to use for this run (overrides the saved selection)
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// API key for this run (overrides the saved key and the environment)
    #[arg(long, global = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// List available models
    Models,
    /// Manage the saved API key
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },
    /// Select and save the active model
    Model { id: String },
    /// Show or update generation parameters
    Params {
        #[arg(long)]
        temperature: Option<f32>,
        #[arg(long)]
        top_p: Option<f32>,
        #[arg(long)]
        top_k: Option<u32>,
        #[arg(long)]
        max_tokens: Option<u32>,
    },
    /// Show or set the theme preference
    Theme { mode: Option<ThemeMode> },
    /// Send a single prompt and print the reply
    Ask {
        #[arg(required = true)]
        prompt: Vec<String>,
    },
    /// Start an interactive chat (default)
    Chat,
    /// Browse saved conversations
    History {
        #[command(subcommand)]
        action: Option<HistoryAction>,
    },
    /// Remove every saved setting and conversation
    Reset,
}

#[derive(Subcommand)]
enum KeyAction {
    Set { key: String },
    Show,
    Clear,
}

#[derive(Subcommand)]
enum HistoryAction {
    List,
    Show { id: String },
    Delete { id: String },
    Clear,
}

#[derive(Clone, Copy, ValueEnum)]
enum ThemeMode {
    Dark,
    Light,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = ConsoleConfig::load();
    let store = config.open_store();
    let console = Console::new(
        config,
        store,
        Overrides {
            model: cli.model,
            api_key: cli.api_key,
        },
    );

    match cli.command.unwrap_or(Command::Chat) {
        Command::Models => console.show_models(),
        Command::Key { action } => match action {
            KeyAction::Set { key } => console.set_key(&key)?,
            KeyAction::Show => console.show_key(),
            KeyAction::Clear => console.clear_key()?,
        },
        Command::Model { id } => {
            let model = console.select_model(&id)?;
            println!("Selected {} ({})", model.name, model.id);
        }
        Command::Params {
            temperature,
            top_p,
            top_k,
            max_tokens,
        } => {
            if temperature.is_none() && top_p.is_none() && top_k.is_none() && max_tokens.is_none() {
                console.show_params();
            } else {
                console.update_params(temperature, top_p, top_k, max_tokens)?;
            }
        }
        Command::Theme { mode } => match mode {
            Some(ThemeMode::Dark) => console.set_theme(true)?,
            Some(ThemeMode::Light) => console.set_theme(false)?,
            None => console.show_theme(),
        },
        Command::Ask { prompt } => console.ask(&prompt.join(" ")).await?,
        Command::Chat => console.run_chat().await?,
        Command::History { action } => match action.unwrap_or(HistoryAction::List) {
            HistoryAction::List => console.list_history(),
            HistoryAction::Show { id } => console.show_conversation(&id)?,
            HistoryAction::Delete { id } => console.delete_conversation(&id)?,
            HistoryAction::Clear => console.clear_history()?,
        },
        Command::Reset => console.reset()?,
    }

    Ok(())
}
