pub mod gemini;
pub mod prompt;

use async_trait::async_trait;

use crate::error::GeneratorError;

pub use gemini::{GeminiClient, NO_TEXT_SENTINEL};
pub use prompt::{PlaylistRequest, build_prompt};

/// A text model that turns a prompt into a song list.
///
/// A response with no usable text is returned as [`NO_TEXT_SENTINEL`]
/// rather than an error; only transport failures are `Err`.
#[async_trait]
pub trait SongGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GeneratorError>;
}
