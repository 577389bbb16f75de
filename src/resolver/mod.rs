//! Resolver module for turning input text into commands
//!
//! Input is matched against an ordered keyword list. Text that matches no
//! keyword is normalized and routed to the knowledge lookup.

mod normalize;
mod resolve;

pub use normalize::normalize_query;
pub use resolve::{resolve, Resolution};
