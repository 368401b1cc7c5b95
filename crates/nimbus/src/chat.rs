// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `nimbus chat` command implementation.
//!
//! A readline REPL over `ChatAgent::send_message`, with in-session history.
//! All turns of one invocation share a conversation.

use colored::Colorize;
use nimbus_config::NimbusConfig;
use nimbus_core::{MessageType, NimbusError};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::runtime::{build_agent, init_tracing};

pub async fn run_chat(config: NimbusConfig, conversation: Option<String>) -> Result<(), NimbusError> {
    init_tracing(&config.agent.log_level);
    let agent = build_agent(&config).await?;

    let mut rl = DefaultEditor::new()
        .map_err(|e| NimbusError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", config.agent.name.bold().cyan());
    println!("Type {} to exit.\n", "/quit".yellow());

    let prompt = format!("{} ", ">".green().bold());
    let mut conversation_id = conversation;
    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if matches!(trimmed, "/quit" | "/exit") {
                    break;
                }
                if trimmed.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(&line);

                let exchange = agent.send_message(conversation_id.as_deref(), trimmed).await;
                conversation_id = Some(exchange.bot_message.conversation_id.clone());
                print_reply(&exchange.bot_message.content, exchange.bot_message.message_type);
            }
            // Ctrl+C / Ctrl+D
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        }
    }

    if let Some(id) = conversation_id {
        println!("{}", format!("conversation {id}").dimmed());
    }
    Ok(())
}

fn print_reply(content: &str, kind: MessageType) {
    let label = match kind {
        MessageType::Weather => "weather".yellow(),
        MessageType::Knowledge => "knowledge".magenta(),
        MessageType::Text => "nimbus".cyan(),
    };
    println!("{} {content}\n", format!("[{label}]").bold());
}
