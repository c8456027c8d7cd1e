/// Result of processing a slash command in the chat REPL.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandResult {
    /// Display a message to the user.
    Message(String),
    /// Leave the REPL.
    Quit,
    /// Drop the in-memory history and start a fresh conversation.
    NewConversation,
    /// Switch (and persist) the active model.
    ModelChanged(String),
    /// Print the model catalog.
    ListModels,
    /// Print saved conversations.
    ListConversations,
    /// Continue from a saved conversation.
    LoadConversation(String),
    /// Delete a saved conversation.
    DeleteConversation(String),
    /// Delete every saved conversation.
    ClearHistory,
    /// Print the generation parameters.
    ShowParams,
    /// Show model, parameters and history size.
    ShowStatus,
    /// Not a command - treat as a prompt.
    NotACommand,
}

pub fn handle_command(input: &str) -> CommandResult {
    let input = input.trim();
    if !input.starts_with('/') {
        return CommandResult::NotACommand;
    }

    let parts: Vec<&str> = input.splitn(2, ' ').collect();
    let cmd = parts[0];
    let arg = parts.get(1).map(|s| s.trim()).unwrap_or("");

    match cmd {
        "/help" | "/h" => show_help(),
        "/exit" | "/quit" | "/q" => CommandResult::Quit,
        "/new" => CommandResult::NewConversation,

        "/model" => {
            if arg.is_empty() {
                CommandResult::Message("Usage: /model <model-id>  (see /models)".into())
            } else {
                CommandResult::ModelChanged(arg.to_string())
            }
        }
        "/models" => CommandResult::ListModels,

        "/history" | "/conversations" => CommandResult::ListConversations,
        "/load" => {
            if arg.is_empty() {
                CommandResult::Message("Usage: /load <conversation-id>".into())
            } else {
                CommandResult::LoadConversation(arg.to_string())
            }
        }
        "/delete" => {
            if arg.is_empty() {
                CommandResult::Message("Usage: /delete <conversation-id>".into())
            } else {
                CommandResult::DeleteConversation(arg.to_string())
            }
        }
        "/clear-history" => CommandResult::ClearHistory,

        "/params" => CommandResult::ShowParams,
        "/status" => CommandResult::ShowStatus,

        _ => CommandResult::Message(format!(
            "Unknown command: {cmd}. Type /help for available commands."
        )),
    }
}

fn show_help() -> CommandResult {
    CommandResult::Message(
        "Gemini Console Commands:
  /help, /h            Show this help
  /quit, /exit, /q     Leave the chat
  /new                 Start a fresh conversation
  /model <id>          Switch model
  /models              List available models
  /history             List saved conversations
  /load <id>           Continue a saved conversation
  /delete <id>         Delete a saved conversation
  /clear-history       Delete all saved conversations
  /params              Show generation parameters
  /status              Show model, parameters and history size"
            .into(),
    )
}
