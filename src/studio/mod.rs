pub mod builder;
pub mod options;
pub mod result;
pub mod schema;

pub use builder::{build_prompt_plan, GenerationRequest, PromptPlan};
pub use options::{CameraStyle, DesignStyle, DetailLevel, LightingStyle, Mode, SiteType};
pub use result::{normalize, GeneratedPrompt, NormalizeError};
