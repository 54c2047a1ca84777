//! Screen classification

pub mod fallback;
pub mod parser;
pub mod ports;
pub mod prompt;
pub mod service;

pub use fallback::KeywordClassifier;
pub use parser::parse_model_output;
pub use ports::FocusJudge;
pub use prompt::build_judge_prompt;
pub use service::ScoreClassifier;
