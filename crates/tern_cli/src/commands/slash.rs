//! Slash commands available at the chat prompt.

use std::path::Path;

use anyhow::{Context, Result};
use tern_core::Transcript;
use tern_runtime::Runtime;

use crate::output;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    Clear,
    Exit,
    Help,
    Save(Option<String>),
    Load(Option<String>),
    Unknown(String),
}

/// What the chat loop does after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

impl SlashCommand {
    /// Parse a prompt line. Returns `None` for anything that is not a command.
    ///
    /// The command word is case-insensitive; the first argument is taken as the
    /// filename and anything after it is ignored.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if !line.starts_with('/') {
            return None;
        }

        let mut parts = line.split_whitespace();
        let command = parts.next()?.to_lowercase();
        let argument = parts.next().map(str::to_string);

        Some(match command.as_str() {
            "/clear" => SlashCommand::Clear,
            "/exit" => SlashCommand::Exit,
            "/help" => SlashCommand::Help,
            "/save" => SlashCommand::Save(argument),
            "/load" => SlashCommand::Load(argument),
            _ => SlashCommand::Unknown(command),
        })
    }

    pub fn execute(self, runtime: &mut Runtime) -> Flow {
        match self {
            SlashCommand::Exit => {
                println!("Exiting...");
                return Flow::Exit;
            }
            SlashCommand::Clear => {
                runtime.clear();
                println!("Chat history cleared.");
            }
            SlashCommand::Help => output::banner(),
            SlashCommand::Save(None) => {
                output::chat_error("Please provide a filename to save to.");
            }
            SlashCommand::Save(Some(path)) => match save_transcript(runtime.transcript(), &path) {
                Ok(()) => println!("Conversation saved to {}", path),
                Err(e) => output::chat_error(&format!("saving conversation: {:#}", e)),
            },
            SlashCommand::Load(None) => {
                output::chat_error("Please provide a filename to load from.");
            }
            SlashCommand::Load(Some(path)) => match load_transcript(&path) {
                Ok(transcript) => {
                    runtime.replace_transcript(transcript);
                    println!("Conversation loaded from {}", path);
                }
                Err(e) => output::chat_error(&format!("loading conversation: {:#}", e)),
            },
            SlashCommand::Unknown(command) => {
                output::chat_error(&format!("Unknown command: {}", command));
            }
        }
        Flow::Continue
    }
}

pub fn save_transcript(transcript: &Transcript, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let json = transcript.to_json_string()?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

pub fn load_transcript(path: impl AsRef<Path>) -> Result<Transcript> {
    let path = path.as_ref();
    let json =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(Transcript::from_json_str(&json)?)
}
