pub mod error;
pub mod ollama;
pub mod traits;
pub mod util;

pub use error::AiError;
pub use ollama::{detect_gpu_layers, Ollama, DEFAULT_GPU_LAYERS};
pub use traits::{Completion, CompletionOptions, TextCompletion, TokenUsage};
pub use util::{extract_json_object, truncate_to_char_boundary};
