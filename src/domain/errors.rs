use derive_more::Display;

/// Flat error set shared by actions, collaborators and stream channels.
#[derive(Debug, Clone, PartialEq, Display)]
pub enum AppError {
    #[display(fmt = "Network Error: {}", _0)]
    Network(String),
    #[display(fmt = "HTTP Error: {} returned {}", url, status)]
    Http { url: String, status: u16 },
    #[display(fmt = "Decode Error: {}", _0)]
    Decode(String),
    #[display(fmt = "Stream Error: {}", _0)]
    Stream(String),
    #[display(fmt = "Timeout: {}", _0)]
    Timeout(String),
    #[display(fmt = "Invalid Symbol: {:?}", _0)]
    InvalidSymbol(String),
    #[display(fmt = "Unknown Stock: {}", _0)]
    UnknownStock(String),
    #[display(fmt = "Stream {} gave up after {} reconnect attempts", topic, attempts)]
    StreamExhausted { topic: String, attempts: u32 },
}

impl std::error::Error for AppError {}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Decode(err.to_string())
    }
}

impl AppError {
    /// Transport-level failures that a later retry could plausibly fix.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            AppError::Network(_) | AppError::Timeout(_) | AppError::Stream(_)
        ) || matches!(self, AppError::Http { status, .. } if *status >= 500)
    }
}

pub type AppResult<T> = Result<T, AppError>;
