pub mod error;
pub mod event;
pub mod message;
pub mod session;
pub mod tool_call;
pub mod transcript;

pub use error::{CoreError, Result};
pub use event::SessionEvent;
pub use message::{ContentBlock, ImageSource, Message, Role, ToolResultContent};
pub use session::{SessionId, TokenUsage};
pub use tool_call::ToolOutcome;
pub use transcript::Transcript;
