pub mod blocks;
pub mod config_parser;
pub mod syntax;
pub mod task_parser;

pub use blocks::{Block, classify_blocks};
pub use config_parser::parse_config;
pub use syntax::Syntax;
pub use task_parser::{parse_tasks, parse_tasks_with};
