pub mod gemini;

pub use gemini::{enhance_description, generate_structured};
