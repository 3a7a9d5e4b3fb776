mod card;
mod catalog;
pub mod gemini;
mod generator;
mod prompt;

pub use card::{CardDescriptor, FallbackLocation, Layout, DEFAULT_LOCATION};
pub use catalog::{card_info, CardInfo, CARD_CATALOG};
pub use gemini::{GeminiClient, GenerativeModel, DEFAULT_GEMINI_MODEL, DEFAULT_GEMINI_URL};
pub use generator::{extract_function_args, LayoutGenerator};
pub use prompt::{build_prompt, layout_function, LAYOUT_FUNCTION_NAME};
