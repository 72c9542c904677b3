use serde::Deserialize;
use thiserror::Error;

/// Error type for WordPress REST API operations.
///
/// - `RequestFailed` — network/transport errors (wraps `reqwest::Error`)
/// - `Authentication` — HTTP 401
/// - `PermissionDenied` — HTTP 403
/// - `NotFound` — HTTP 404
/// - `Api` — any other non-2xx status code
/// - `Decode` — a 2xx body that could not be parsed as the requested type
/// - `Serialize` — an entity that could not be encoded as JSON
/// - `InvalidToken` — a bearer token that is not a valid header value
#[derive(Debug, Error)]
pub enum WordPressError {
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    #[error("Permission denied: {message}")]
    PermissionDenied { message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("API error {status}: {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("Error deserializing JSON to type '{type_name}'\n{body}")]
    Decode {
        type_name: &'static str,
        body: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Serialization error: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Invalid token header value: {0}")]
    InvalidToken(#[from] reqwest::header::InvalidHeaderValue),
}

pub type Result<T> = std::result::Result<T, WordPressError>;

/// Body WordPress sends alongside error statuses, e.g.
/// `{"code":"rest_post_invalid_id","message":"Invalid post ID.","data":{"status":404}}`.
#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl WordPressError {
    /// Map a non-2xx status and its raw body to a typed error.
    pub(crate) fn from_status(status: u16, body: &str) -> Self {
        let parsed: Option<ErrorBody> = serde_json::from_str(body).ok();
        let code = parsed.as_ref().and_then(|b| b.code.clone());
        let msg = parsed
            .and_then(|b| b.message)
            .unwrap_or_else(|| body.trim().to_string());

        match status {
            401 => WordPressError::Authentication {
                message: if msg.is_empty() {
                    "Unauthenticated".into()
                } else {
                    msg
                },
            },
            403 => WordPressError::PermissionDenied {
                message: if msg.is_empty() {
                    "Permission denied".into()
                } else {
                    msg
                },
            },
            404 => WordPressError::NotFound {
                message: if msg.is_empty() {
                    "Not found".into()
                } else {
                    msg
                },
            },
            _ => WordPressError::Api {
                status,
                code,
                message: if msg.is_empty() {
                    format!("HTTP {status}")
                } else {
                    msg
                },
            },
        }
    }

    /// HTTP status carried by this error, if it came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            WordPressError::Authentication { .. } => Some(401),
            WordPressError::PermissionDenied { .. } => Some(403),
            WordPressError::NotFound { .. } => Some(404),
            WordPressError::Api { status, .. } => Some(*status),
            WordPressError::RequestFailed(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
