//! The response body handed back to the HTTP layer.
//!
//! ```json
//! {"thumbnail": "data:image/avif;base64,AAAA..."}
//! {"error": "Main image is required"}
//! ```
//!
//! Client errors (missing or undecodable main image) carry their own message.
//! Every other failure is reported with a generic message; the detail is
//! logged, not returned.

use crate::imaging::EncodedResult;
use crate::pipeline::PipelineError;
use serde::{Deserialize, Serialize};
use tracing::error;

/// Message returned for any server-side failure.
pub const GENERIC_ERROR: &str = "Failed to generate thumbnail";

/// Response status class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    ClientError,
    ServerError,
}

impl Status {
    pub fn http_code(self) -> u16 {
        match self {
            Status::Ok => 200,
            Status::ClientError => 400,
            Status::ServerError => 500,
        }
    }
}

/// JSON body: exactly one of `thumbnail` or `error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ThumbnailResponse {
    Success { thumbnail: String },
    Failure { error: String },
}

impl ThumbnailResponse {
    pub fn success(result: &EncodedResult) -> Self {
        ThumbnailResponse::Success {
            thumbnail: result.to_data_uri(),
        }
    }

    pub fn failure(err: &PipelineError) -> Self {
        let message = match err {
            PipelineError::MissingInput | PipelineError::Decode(_) => err.to_string(),
            _ => {
                error!(error = %err, "thumbnail generation failed");
                GENERIC_ERROR.to_string()
            }
        };
        ThumbnailResponse::Failure { error: message }
    }

    pub fn from_result(result: &Result<EncodedResult, PipelineError>) -> (Status, Self) {
        match result {
            Ok(encoded) => (Status::Ok, Self::success(encoded)),
            Err(e) if e.is_client_error() => (Status::ClientError, Self::failure(e)),
            Err(e) => (Status::ServerError, Self::failure(e)),
        }
    }

    pub fn to_json(&self) -> String {
        // Both variants are a single string field; serialization cannot fail.
        serde_json::to_string(self).unwrap_or_else(|_| format!(r#"{{"error":"{GENERIC_ERROR}"}}"#))
    }
}
