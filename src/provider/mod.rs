//! Provider module - the generation capability and its Gemini client

pub mod gemini;
pub mod traits;

pub use gemini::GeminiProvider;
pub use traits::{
    Candidate, Content, GenerationProvider, InlineData, ProviderResponse, ResponsePart,
};
