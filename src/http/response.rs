//! Response mapping for pipeline outcomes.
//!
//! # Design Decisions
//! - Bodies are short fixed strings; callers never see internal error text
//! - Every rejection is a 500, whatever stage failed

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::ingest::{Rejection, RequestId};

pub const DONE_BODY: &str = "done";
pub const SERVER_ERROR_BODY: &str = "server error";
pub const UP_BODY: &str = "up";

/// A request that was stored and whose reference was published.
#[derive(Debug)]
pub struct Accepted(pub RequestId);

impl IntoResponse for Accepted {
    fn into_response(self) -> Response {
        (StatusCode::OK, DONE_BODY).into_response()
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR_BODY).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::{IngestError, Stage, StoreWriteError};

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn accepted_is_ok_done() {
        let response = Accepted(RequestId::generate()).into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "done");
    }

    #[tokio::test]
    async fn rejection_hides_error_detail() {
        let rejection = Rejection {
            request_id: RequestId::generate(),
            stage: Stage::Storing,
            error: IngestError::StoreWrite(StoreWriteError::Backend {
                bucket: "secret-bucket".into(),
                key: "k".into(),
                message: "AccessDenied".into(),
            }),
        };

        let response = rejection.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(response).await, "server error");
    }
}
