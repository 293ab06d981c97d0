/// Leading-keyword statement classification.
pub mod classifier;
/// Identifier quoting, case folding and schema/relation splitting.
pub mod names;
/// Count and row-window query builders plus page arithmetic.
pub mod pager;
/// Default-schema injection for the first unqualified table reference.
pub mod schema_rewrite;
