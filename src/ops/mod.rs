pub mod board;
pub mod format;
pub mod identity;
pub mod search;
pub mod suggest;
pub mod task_ops;
pub mod token_ops;

pub use board::{Column, board_columns};
pub use format::format_task_script;
pub use identity::IdReconciler;
pub use search::{Filters, SearchFields, matches_filters, matches_search, search_tasks};
pub use suggest::{Completion, Suggestions, suggest};
pub use task_ops::{TaskBlock, TaskOpError, find_task_block, move_task_as_subtask, toggle_checkbox};
pub use token_ops::{add_token, remove_token, update_task_state};
