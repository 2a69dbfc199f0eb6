#[derive(thiserror::Error, Debug, serde::Deserialize, serde::Serialize)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("User mapping {path}: {reason}")]
    UserMapping { path: String, reason: String },
}
