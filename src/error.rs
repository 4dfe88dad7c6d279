use std::io;

use axum::{extract::multipart::MultipartError, response::IntoResponse};
use reqwest::StatusCode;

pub type Result<T> = core::result::Result<T, Error>;

/// 后端 REST 接口返回的业务错误
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Not Found")]
    NotFound,

    /// 非 2xx 响应，`detail` 为后端返回的说明
    #[error("backend responded {status}: {detail}")]
    Status { status: StatusCode, detail: String },
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    #[error(transparent)]
    ApiError(#[from] ApiError),

    #[error(transparent)]
    Template(#[from] askama::Error),

    #[error(transparent)]
    Multipart(#[from] MultipartError),

    #[error(transparent)]
    Config(#[from] toml::de::Error),

    #[error("{0}")]
    FormatError(&'static str),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    /// 后端返回 404
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::ApiError(ApiError::NotFound))
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        match self {
            Error::Reqwest(e) => {
                tracing::error!(%e, "backend request error");
                (StatusCode::BAD_GATEWAY, "Bad Gateway")
            }
            .into_response(),
            Error::ApiError(api_error) => match api_error {
                ApiError::NotFound => (StatusCode::NOT_FOUND, "NOT FOUND").into_response(),
                ApiError::Status { status, detail } => {
                    tracing::error!(%status, detail, "backend error");
                    (StatusCode::BAD_GATEWAY, "Bad Gateway").into_response()
                }
            },
            Error::Template(e) => {
                tracing::error!(%e, "template render error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            }
            .into_response(),
            Error::Multipart(e) => (e.status(), e.body_text()).into_response(),
            Error::FormatError(s) => (StatusCode::BAD_REQUEST, s.to_string()).into_response(),
            Error::Config(e) => (StatusCode::BAD_REQUEST, e.message().to_string()).into_response(),
            Error::Io(e) => {
                tracing::error!(%e, "file io error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            }
            .into_response(),
        }
    }
}
