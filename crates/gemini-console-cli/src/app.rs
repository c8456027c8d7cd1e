use anyhow::{anyhow, bail, Result};
use gemini_console_core::llm::{find_model, require_model, ModelDescriptor};
use gemini_console_core::{
    list_models, with_rate_limit_retry, ConsoleConfig, Conversation, ConversationStore,
    GenerationClient, GenerationParameters, Message, RetryPolicy,
};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::commands::{handle_command, CommandResult};

/// Per-run overrides taken from the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub model: Option<String>,
    pub api_key: Option<String>,
}

/// Everything a command needs: configuration, the store, and run overrides.
pub struct Console {
    pub config: ConsoleConfig,
    pub store: ConversationStore,
    pub overrides: Overrides,
}

impl Console {
    pub fn new(config: ConsoleConfig, store: ConversationStore, overrides: Overrides) -> Self {
        if !store.is_available() {
            eprintln!("Warning: local storage is unavailable; settings and history will not be saved.");
        }
        Self {
            config,
            store,
            overrides,
        }
    }

    /// `--api-key`, then the stored key, then the configured environment variable.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.overrides
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| self.store.get_credential())
            .or_else(|| self.config.api_key_from_env())
    }

    pub fn resolve_model(&self) -> Option<String> {
        self.overrides
            .model
            .clone()
            .or_else(|| self.store.get_selected_model())
    }

    fn retry_policy(&self) -> RetryPolicy {
        self.config.retry_policy()
    }

    fn require_session(&self) -> Result<(Box<dyn GenerationClient>, String)> {
        let api_key = self.resolve_api_key().ok_or_else(|| {
            anyhow!(
                "No API key configured. Run `gemini-console key set <KEY>` or set {}",
                self.config.api.api_key_env
            )
        })?;
        let model = self.resolve_model().ok_or_else(|| {
            anyhow!("No model selected. Run `gemini-console model <ID>` (see `gemini-console models`)")
        })?;
        let client = self.config.build_client(api_key)?;
        Ok((Box::new(client), model))
    }

    // ─── Settings commands ───────────────────────────────────────────────────

    pub fn show_models(&self) {
        let selected = self.resolve_model();
        print!("{}", format_model_list(&list_models(), selected.as_deref()));
    }

    pub fn select_model(&self, id: &str) -> Result<ModelDescriptor> {
        let model = require_model(id)?;
        self.store.save_selected_model(&model.id)?;
        Ok(model)
    }

    pub fn set_key(&self, key: &str) -> Result<()> {
        self.store.save_credential(key)?;
        println!("API key saved.");
        Ok(())
    }

    pub fn clear_key(&self) -> Result<()> {
        self.store.clear_credential()?;
        println!("Saved API key removed.");
        Ok(())
    }

    pub fn show_key(&self) {
        match self.resolve_api_key() {
            Some(key) => println!("{}", mask_key(&key)),
            None => println!("No API key configured."),
        }
    }

    pub fn show_params(&self) {
        print!("{}", format_params(&self.store.get_parameters()));
    }

    pub fn update_params(
        &self,
        temperature: Option<f32>,
        top_p: Option<f32>,
        top_k: Option<u32>,
        max_tokens: Option<u32>,
    ) -> Result<()> {
        let mut params = self.store.get_parameters();
        if let Some(v) = temperature {
            params.temperature = v;
        }
        if let Some(v) = top_p {
            params.top_p = v;
        }
        if let Some(v) = top_k {
            params.top_k = v;
        }
        if let Some(v) = max_tokens {
            params.max_tokens = v;
        }
        let params = params.sanitized();
        self.store.save_parameters(&params)?;
        print!("{}", format_params(&params));
        Ok(())
    }

    pub fn set_theme(&self, dark: bool) -> Result<()> {
        self.store.save_theme_flag(dark)?;
        println!("Theme set to {}.", if dark { "dark" } else { "light" });
        Ok(())
    }

    pub fn show_theme(&self) {
        println!("{}", if self.store.get_theme_flag() { "dark" } else { "light" });
    }

    pub fn reset(&self) -> Result<()> {
        self.store.clear_all()?;
        println!("All stored settings and conversations removed.");
        Ok(())
    }

    // ─── History commands ────────────────────────────────────────────────────

    pub fn list_history(&self) {
        let conversations = self.store.get_conversations();
        if conversations.is_empty() {
            println!("No conversations yet. Start chatting to see your history here.");
            return;
        }
        for conversation in conversations.iter().rev() {
            println!("{}", format_conversation_line(conversation));
        }
    }

    pub fn show_conversation(&self, id: &str) -> Result<()> {
        let conversation = self
            .store
            .get_conversation_by_id(id)
            .ok_or_else(|| anyhow!("Conversation not found: {id}"))?;
        println!("{}", format_conversation_line(&conversation));
        for message in &conversation.messages {
            println!("\n[{}]\n{}", role_label(message), message.content);
        }
        Ok(())
    }

    /// Fetch a saved conversation to continue, switching `model` to the one it
    /// was held with when that model is still in the catalog.
    pub fn load_conversation(&self, id: &str, model: &mut String) -> Result<Conversation> {
        let conversation = self
            .store
            .get_conversation_by_id(id)
            .ok_or_else(|| anyhow!("Conversation not found: {id}"))?;
        match find_model(&conversation.model) {
            Some(descriptor) => *model = descriptor.id,
            None => tracing::debug!(
                saved = %conversation.model,
                "saved model not in catalog, keeping current model"
            ),
        }
        Ok(conversation)
    }

    pub fn delete_conversation(&self, id: &str) -> Result<()> {
        self.store.delete_conversation(id)?;
        println!("Deleted {id}.");
        Ok(())
    }

    pub fn clear_history(&self) -> Result<()> {
        self.store.clear_conversations()?;
        println!("Conversation history cleared.");
        Ok(())
    }

    // ─── Generation ──────────────────────────────────────────────────────────

    /// Single-turn generation; the exchange is saved to history.
    pub async fn ask(&self, prompt: &str) -> Result<()> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            bail!("Prompt must not be empty");
        }
        let (client, model) = self.require_session()?;
        let params = self.store.get_parameters();

        let reply = with_rate_limit_retry(&self.retry_policy(), || {
            client.generate(&model, prompt, &params)
        })
        .await?;

        println!("{reply}");
        self.save_exchange(prompt, &reply, &model);
        Ok(())
    }

    /// Interactive chat with accumulated history.
    pub async fn run_chat(&self) -> Result<()> {
        let (client, mut model) = self.require_session()?;
        let mut history: Vec<Message> = Vec::new();
        tracing::debug!(model = %model, "starting chat session");

        println!("Gemini Console - chatting with {model}. Type /help for commands.");
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            print!("you> ");
            std::io::stdout().flush()?;

            let Some(line) = lines.next_line().await? else {
                println!();
                break;
            };
            let input = line.trim();
            if input.is_empty() {
                continue;
            }

            match handle_command(input) {
                CommandResult::NotACommand => {}
                CommandResult::Quit => break,
                other => {
                    self.apply_chat_command(other, &mut model, &mut history)?;
                    continue;
                }
            }

            let params = self.store.get_parameters();
            let result = with_rate_limit_retry(&self.retry_policy(), || {
                client.chat(&model, &history, input, &params)
            })
            .await;

            match result {
                Ok(reply) => {
                    println!("\n{reply}\n");
                    history.push(Message::user(input));
                    history.push(Message::assistant(reply.clone()));
                    self.save_exchange(input, &reply, &model);
                }
                Err(e) => eprintln!("Error: {e}"),
            }
        }

        Ok(())
    }

    fn apply_chat_command(
        &self,
        command: CommandResult,
        model: &mut String,
        history: &mut Vec<Message>,
    ) -> Result<()> {
        match command {
            CommandResult::Message(msg) => println!("{msg}"),
            CommandResult::NewConversation => {
                history.clear();
                println!("Started a new conversation.");
            }
            CommandResult::ModelChanged(id) => match self.select_model(&id) {
                Ok(descriptor) => {
                    *model = descriptor.id;
                    println!("Switched to {} - {}", descriptor.name, descriptor.description);
                }
                Err(e) => eprintln!("Error: {e}"),
            },
            CommandResult::ListModels => print!(
                "{}",
                format_model_list(&list_models(), Some(model.as_str()))
            ),
            CommandResult::ListConversations => self.list_history(),
            CommandResult::LoadConversation(id) => match self.load_conversation(&id, model) {
                Ok(conversation) => {
                    *history = conversation.messages;
                    println!(
                        "Loaded \"{}\" ({} messages), continuing on {model}.",
                        conversation.title,
                        history.len()
                    );
                }
                Err(e) => eprintln!("Error: {e}"),
            },
            CommandResult::DeleteConversation(id) => {
                if let Err(e) = self.delete_conversation(&id) {
                    eprintln!("Error: {e}");
                }
            }
            CommandResult::ClearHistory => {
                if let Err(e) = self.clear_history() {
                    eprintln!("Error: {e}");
                }
            }
            CommandResult::ShowParams => self.show_params(),
            CommandResult::ShowStatus => {
                let params = self.store.get_parameters();
                println!(
                    "Model: {model}\nTemperature: {}\nMax tokens: {}\nTurns in context: {}\nSaved conversations: {}",
                    params.temperature,
                    params.max_tokens,
                    history.len() / 2,
                    self.store.get_conversations().len()
                );
            }
            CommandResult::Quit | CommandResult::NotACommand => {}
        }
        Ok(())
    }

    fn save_exchange(&self, prompt: &str, reply: &str, model: &str) {
        let conversation = Conversation::from_exchange(prompt, reply, model);
        match self.store.append_conversation(conversation) {
            Ok(saved) => tracing::debug!(id = %saved.id, "conversation saved"),
            Err(e) => eprintln!("Warning: conversation not saved: {e}"),
        }
    }
}

fn role_label(message: &Message) -> &'static str {
    match message.role {
        gemini_console_core::Role::User => "you",
        gemini_console_core::Role::Assistant => "gemini",
    }
}

/// Show the first and last four characters of a key.
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}{}{tail}", "*".repeat(chars.len() - 8))
}

pub fn format_model_list(models: &[ModelDescriptor], selected: Option<&str>) -> String {
    let mut out = String::new();
    for model in models {
        let marker = if Some(model.id.as_str()) == selected { "*" } else { " " };
        out.push_str(&format!(
            "{marker} {:<26} {:<26} v{:<4} {}\n",
            model.id, model.name, model.version, model.description
        ));
    }
    out
}

pub fn format_params(params: &GenerationParameters) -> String {
    format!(
        "temperature: {}\ntop_p: {}\ntop_k: {}\nmax_tokens: {}\n",
        params.temperature, params.top_p, params.top_k, params.max_tokens
    )
}

pub fn format_conversation_line(conversation: &Conversation) -> String {
    format!(
        "{}  {}  [{}]  {}",
        conversation.id, conversation.timestamp, conversation.model, conversation.title
    )
}
