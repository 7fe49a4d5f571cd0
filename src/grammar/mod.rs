pub mod analysis;
pub mod eliminate_left_recursion;
pub mod error;
pub mod grammar;
pub mod ll1_parsing_table;
pub mod lr_dfa;
pub mod nullable_first_follow;
pub mod parse;
pub mod pretty_print;
pub mod slr1_parsing_table;
pub use analysis::Analysis;
pub use error::{GrammarError, TableError};
pub use grammar::Grammar;

pub const EPSILON: &str = "ϵ";
pub const END_MARK: &str = "$";

pub const EPSILON_IDX: usize = 0;
pub const END_MARK_IDX: usize = 1;
