//! The conversation transcript and its saved-file format.
//!
//! A saved transcript is a JSON array of `{ "role": ..., "content": ... }` records.
//! `content` is a plain string when the message is exactly one text block and a
//! list of blocks otherwise. Files written by older clients stored lists as a
//! JSON-encoded string; those are decoded on load.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::message::{ContentBlock, Message, Role};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_messages(messages: Vec<Message>) -> Self {
        Self { messages }
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Message> {
        self.messages.iter_mut()
    }

    pub fn to_json_string(&self) -> Result<String> {
        let records: Vec<PersistedMessage> = self.messages.iter().map(PersistedMessage::from).collect();
        Ok(serde_json::to_string_pretty(&records)?)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        if !value.is_array() {
            return Err(CoreError::InvalidTranscript(
                "expected a JSON array of messages".to_string(),
            ));
        }
        let records: Vec<PersistedMessage> = serde_json::from_value(value)?;
        let messages = records
            .into_iter()
            .map(Message::try_from)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { messages })
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedMessage {
    role: String,
    content: PersistedContent,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum PersistedContent {
    Raw(String),
    Blocks(Vec<ContentBlock>),
}

/// Parse text that looks like a serialized block list.
fn parse_block_list(text: &str) -> Option<Vec<ContentBlock>> {
    if !text.trim_start().starts_with('[') {
        return None;
    }
    serde_json::from_str(text).ok()
}

impl From<&Message> for PersistedMessage {
    fn from(message: &Message) -> Self {
        let content = match message.content.as_slice() {
            // Text that would read back as blocks must be stored structured to stay lossless.
            [ContentBlock::Text { text }] if parse_block_list(text).is_none() => {
                PersistedContent::Raw(text.clone())
            }
            blocks => PersistedContent::Blocks(blocks.to_vec()),
        };
        Self {
            role: message.role.as_str().to_string(),
            content,
        }
    }
}

impl TryFrom<PersistedMessage> for Message {
    type Error = CoreError;

    fn try_from(record: PersistedMessage) -> Result<Self> {
        let role: Role = record.role.parse()?;
        let content = match record.content {
            PersistedContent::Raw(text) => match parse_block_list(&text) {
                Some(blocks) => blocks,
                None => vec![ContentBlock::text(text)],
            },
            PersistedContent::Blocks(blocks) => blocks,
        };
        Ok(Message::new(role, content))
    }
}
