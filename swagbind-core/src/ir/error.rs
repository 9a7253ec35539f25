use crate::parse::{BadRef, Method, path::BadPath};

#[derive(Debug, miette::Diagnostic, thiserror::Error)]
pub enum IrError {
    #[error("can't generate code for `{method} {path}` without an operation ID")]
    NoOperationId { path: String, method: Method },
    #[error("operation ID `{0}` is used by more than one operation")]
    DuplicateOperationId(String),
    #[error("operation `{operation}` has a parameter without a name")]
    NoParameterName { operation: String },
    #[error("parameter `{parameter}` of operation `{operation}` doesn't say where it goes")]
    NoParameterPosition { operation: String, parameter: String },
    #[error("parameter `{parameter}` of operation `{operation}` has unknown position `{position}`")]
    UnknownPosition {
        operation: String,
        parameter: String,
        position: String,
    },
    #[error("unrecognized type `{0}`")]
    UnknownType(String),
    #[error("unrecognized format `{0}`")]
    UnknownFormat(String),
    #[error(transparent)]
    BadRef(#[from] BadRef),
    #[error("operation `{operation}` has a malformed path")]
    BadOperationPath {
        operation: String,
        #[source]
        #[diagnostic_source]
        source: BadPath,
    },
}
