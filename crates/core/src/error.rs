/// Errors raised while reading external inputs into core types
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid user mapping: {0}")]
    UserMapping(String),

    #[error("Invalid webhook payload: {0}")]
    Payload(String),
}
