//! External completion capability: OpenAI-compatible chat client and the review prompt templates.

mod llm;
#[cfg(feature = "test-util")]
pub mod mock;
mod prompt;

pub use llm::{CompletionClient, LLMError, Message, OpenAiCompletionClient};
pub use prompt::{OutputFormat, PromptTemplate};

#[cfg(feature = "test-util")]
pub use mock::MockCompletionClient;
