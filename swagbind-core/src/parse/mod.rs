mod document;
pub mod path;

pub use document::*;
