use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("{0}")]
    Validation(String),
    #[error("handle already taken")]
    HandleTaken,
    #[error("unauthorized")]
    Unauthorized,
    #[error("forbidden")]
    Forbidden,
    /// Also covers reads the server refused: a denied draft is served as
    /// 404, so "not available" is all a client can know.
    #[error("not available")]
    NotFound,
    #[error("server error {status}: {message}")]
    Api { status: u16, message: String },
}

impl ClientError {
    pub async fn from_http_response(resp: reqwest::Response) -> Self {
        let status = resp.status().as_u16();
        let message = match resp.json::<serde_json::Value>().await {
            Ok(body) => body
                .get("error")
                .and_then(|e| e.as_str())
                .unwrap_or("unknown error")
                .to_string(),
            Err(_) => "unknown error".to_string(),
        };

        match status {
            401 => ClientError::Unauthorized,
            403 => ClientError::Forbidden,
            404 => ClientError::NotFound,
            409 => ClientError::HandleTaken,
            422 => ClientError::Validation(message),
            _ => ClientError::Api { status, message },
        }
    }

    /// Recoverable inline errors: the form keeps its input and shows the
    /// message next to the offending field.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ClientError::Validation(_) | ClientError::HandleTaken)
    }
}
