//! `drivethru chat` — interactive REPL command.
//!
//! Opens a readline-based loop that sends each line through one turn of
//! the pipeline and prints the spoken response back.

use std::sync::Arc;

use crate::bootstrap;
use crate::config::AppConfig;
use crate::turn;

/// Run the interactive chat REPL.
///
/// Boots the full app state (including background sweeps), then enters a
/// readline loop that accepts user input and prints each turn's response.
pub async fn chat(config: AppConfig, mut session_id: String, restaurant_id: i64) -> anyhow::Result<()> {
    let state = Arc::new(bootstrap::build_app_state(config)?);
    bootstrap::spawn_background_tasks(&state);

    let history_path = dirs::home_dir().unwrap_or_default().join(".drivethru").join("chat_history.txt");
    if let Some(parent) = history_path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let mut rl = rustyline::DefaultEditor::new()?;
    let _ = rl.load_history(&history_path);

    eprintln!("drivethru interactive chat");
    eprintln!("Session: {session_id}  |  Type /help for commands, Ctrl+D to exit");
    eprintln!();

    loop {
        let readline = rl.readline("you> ");

        match readline {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }

                rl.add_history_entry(&line).ok();

                if trimmed.starts_with('/') {
                    if handle_slash_command(trimmed, &mut session_id) {
                        break;
                    }
                    continue;
                }

                let out = turn::process_turn(&state, &session_id, restaurant_id, trimmed).await;
                println!("agent> {}", out.response_text);
                if let Some(url) = &out.audio_url {
                    eprintln!("\x1B[2m(audio: {url})\x1B[0m");
                }
                if let Some(err) = &out.error {
                    eprintln!("\x1B[31merror [{}]: {}\x1B[0m", err.category, err.message);
                }
                println!();
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                eprintln!("(Use Ctrl+D or /exit to quit)");
                continue;
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                break;
            }
            Err(e) => {
                eprintln!("\x1B[31mreadline error: {e}\x1B[0m");
                break;
            }
        }
    }

    rl.save_history(&history_path).ok();
    eprintln!("Goodbye!");
    Ok(())
}

/// Process a slash command. Returns `true` if the REPL should exit.
fn handle_slash_command(input: &str, session_id: &mut String) -> bool {
    let parts: Vec<&str> = input.splitn(2, ' ').collect();
    let cmd = parts[0];
    let arg = parts.get(1).map(|s| s.trim());

    match cmd {
        "/exit" | "/quit" => return true,

        "/session" => {
            if let Some(name) = arg.filter(|s| !s.is_empty()) {
                *session_id = name.to_string();
                eprintln!("Session switched to: {session_id}");
            } else {
                eprintln!("Current session: {session_id}");
                eprintln!("Usage: /session <name>");
            }
        }

        "/clear" => {
            eprint!("\x1B[2J\x1B[1;1H");
        }

        "/reset" => {
            let ts = chrono::Utc::now().timestamp();
            *session_id = format!("{session_id}:{ts}");
            eprintln!("Session reset. New session key: {session_id}");
        }

        "/help" => {
            eprintln!("Commands:");
            eprintln!("  /session <name>  Switch to a named session");
            eprintln!("  /clear           Clear the screen");
            eprintln!("  /reset           Start a fresh session (new key)");
            eprintln!("  /exit, /quit     Exit the chat");
            eprintln!("  /help            Show this help");
        }

        other => {
            eprintln!("Unknown command: {other}  (type /help for a list)");
        }
    }

    false
}
