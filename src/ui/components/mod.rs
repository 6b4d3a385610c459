mod input;
mod item_prompt;
mod key_result;

pub use item_prompt::{ItemPrompt, PromptEvent, PromptTarget};
pub use key_result::KeyResult;
