//! Chat screen input commands

/// What a line typed on the chat screen asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Send the text as a message
    Send(String),
    NewConversation,
    ListConversations,
    /// Open the conversation at this 1-based position in the list
    Open(usize),
    SignOut,
    Help,
    Quit,
    /// Blank line
    Nothing,
    Unknown(String),
}

pub fn parse(line: &str) -> Command {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Command::Nothing;
    }
    // "//text" sends "/text"
    if let Some(rest) = trimmed.strip_prefix("//") {
        return Command::Send(format!("/{rest}"));
    }
    let Some(command) = trimmed.strip_prefix('/') else {
        return Command::Send(line.trim_end_matches(['\r', '\n']).to_string());
    };

    let mut words = command.split_whitespace();
    let name = words.next().unwrap_or_default();
    let arg = words.next();
    match (name, arg) {
        ("new", None) => Command::NewConversation,
        ("list" | "ls", None) => Command::ListConversations,
        ("open", Some(index)) => match index.parse::<usize>() {
            Ok(index) if index > 0 => Command::Open(index),
            _ => Command::Unknown(trimmed.to_string()),
        },
        ("signout" | "logout", None) => Command::SignOut,
        ("help" | "?", None) => Command::Help,
        ("quit" | "exit", None) => Command::Quit,
        _ => Command::Unknown(trimmed.to_string()),
    }
}
