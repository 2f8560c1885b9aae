mod assessment;
mod claude;

pub use assessment::{parse_assessment, Assessment};
pub use claude::ClaudeAgent;
