pub(crate) mod extract;
pub(crate) mod health;

pub use extract::extract_text;
pub use health::{health_check, root, test_gemini};
