mod error;
mod primitive;
mod registry;
mod spec;
mod types;

#[cfg(test)]
mod tests;

pub use error::IrError;
pub use primitive::Resolver;
pub use registry::Registry;
pub use spec::{IrSpec, OperationGroup};
pub use types::*;
