pub mod commission;
pub mod filter;
pub mod pagination;
pub mod tree_builder;
