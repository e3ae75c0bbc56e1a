use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

/// Numeric failures shared by every crate in the workspace.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },
}
