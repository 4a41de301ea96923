pub mod ai_json;

pub use ai_json::{extract_json, parse_ai_json};
