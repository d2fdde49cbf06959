use std::time::Duration;

/// Failure of an external collaborator. Callers convert these into fallbacks;
/// none of them ever reaches the map session.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ServiceError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("{service} returned HTTP {status}")]
    Status { service: &'static str, status: u16 },
    #[error("response did not match the expected schema: {0}")]
    Schema(String),
    #[error("no API key configured for {0}")]
    MissingCredentials(&'static str),
    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        ServiceError::Transport(err.to_string())
    }
}

/// Run `fut` with a deadline.
pub async fn with_timeout<T, F>(timeout: Duration, fut: F) -> Result<T, ServiceError>
where
    F: std::future::Future<Output = Result<T, ServiceError>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(ServiceError::Timeout(timeout)),
    }
}
