//! The two containers the resolver and the AST are built on.
pub mod ordered_tree;
pub mod symbol_table;

pub use ordered_tree::{Keyed, OrderedTree};
pub use symbol_table::SymbolTable;
