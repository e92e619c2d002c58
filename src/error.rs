use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Clone, Debug, Serialize, strum_macros::AsRefStr)]
#[serde(tag = "type", content = "data")]
pub enum Error {
    // -- Auth errors.
    AuthFailNoAuthToken,
    AuthFailTokenWrongFormat,

    // -- Lookup errors.
    SongNotFound { id: String },
    UserNotFound { id: String },

    // -- Input errors.
    InvalidObjectId { id: String },
    InvalidInput { reason: String },
    Conflict { reason: String },

    // -- Write errors.
    PlaybackLogCreateFail,
    RatingUpsertFail,

    // -- Config errors.
    ConfigMissing { name: String },
    ConfigInvalid { name: String, reason: String },

    DbError(String),
}

impl core::fmt::Display for Error {
    fn fmt(&self, fmt: &mut core::fmt::Formatter) -> core::result::Result<(), core::fmt::Error> {
        match self {
            Self::SongNotFound { .. } => write!(fmt, "Song not found"),
            Self::PlaybackLogCreateFail => write!(fmt, "Failed to create playback log"),
            Self::RatingUpsertFail => write!(fmt, "Failed to upsert rating"),
            _ => write!(fmt, "{self:?}"),
        }
    }
}

impl std::error::Error for Error {}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status_code, client_error) = self.client_status_and_error();

        if status_code.is_server_error() {
            tracing::error!(error = ?self, "request failed");
        }

        let response_body = serde_json::json!({
            "error": client_error.as_ref(),
            "details": self.to_string()
        });

        (status_code, Json(response_body)).into_response()
    }
}

impl Error {
    pub fn client_status_and_error(&self) -> (StatusCode, ClientError) {
        match self {
            Self::AuthFailNoAuthToken | Self::AuthFailTokenWrongFormat => {
                (StatusCode::UNAUTHORIZED, ClientError::NO_AUTH)
            }

            Self::SongNotFound { .. } | Self::UserNotFound { .. } => {
                (StatusCode::NOT_FOUND, ClientError::RESOURCE_NOT_FOUND)
            }

            Self::InvalidObjectId { .. } | Self::InvalidInput { .. } => {
                (StatusCode::BAD_REQUEST, ClientError::INVALID_PARAMS)
            }

            Self::Conflict { .. } => (StatusCode::CONFLICT, ClientError::CONFLICT),

            Self::PlaybackLogCreateFail
            | Self::RatingUpsertFail
            | Self::ConfigMissing { .. }
            | Self::ConfigInvalid { .. }
            | Self::DbError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ClientError::SERVICE_ERROR,
            ),
        }
    }
}

#[derive(Debug, strum_macros::AsRefStr)]
#[allow(non_camel_case_types)]
pub enum ClientError {
    NO_AUTH,
    INVALID_PARAMS,
    CONFLICT,
    SERVICE_ERROR,
    RESOURCE_NOT_FOUND,
}

impl From<surrealdb::Error> for Error {
    fn from(err: surrealdb::Error) -> Self {
        match err {
            surrealdb::Error::Db(surrealdb::error::Db::IndexExists { index, value, .. }) => {
                Error::Conflict {
                    reason: format!("index '{index}' already holds {value}"),
                }
            }
            other => Error::DbError(other.to_string()),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for Error {
    fn from(_: jsonwebtoken::errors::Error) -> Self {
        Error::AuthFailTokenWrongFormat
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::DbError(format!("io: {err}"))
    }
}
