use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use super::error::SyncError;
use super::transport::{HttpRequest, Transport, Verb};
use crate::kernel::segment::{Direction, FieldValue, SegmentField, SegmentId};

pub const CSRF_HEADER: &str = "X-CSRFToken";
pub const SEGMENTS_PATH: &str = "/api/segments/";
/// Form field the edit page embeds its anti-forgery token in.
pub const CSRF_FORM_FIELD: &str = "csrfmiddlewaretoken";

const JSON_CONTENT_TYPE: &str = "application/json";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Raw outcome of a request. Callers branch on `status`.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Option<String>,
}

impl ApiResponse {
    pub fn new(status: u16, body: Option<String>) -> Self {
        Self { status, body }
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, SyncError> {
        let body = self.body.as_deref().unwrap_or("");
        Ok(serde_json::from_str(body)?)
    }
}

/// Every request the editor knows how to make.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiRequest {
    UpdateTitle {
        transcription_id: i64,
        value: String,
    },
    UpdateTranscriptionField {
        transcription_id: i64,
        field: String,
        value: String,
    },
    UpdateSegmentField {
        segment_id: SegmentId,
        field: SegmentField,
        value: FieldValue,
    },
    InsertSegment {
        segment_id: SegmentId,
        other_id: SegmentId,
        direction: Direction,
    },
    DeleteSegment {
        segment_id: SegmentId,
    },
    /// Bulk rename submitted through the edit page's own form.
    RenameSpeaker {
        transcription_id: i64,
        old: String,
        new: String,
    },
}

impl ApiRequest {
    pub fn path(&self) -> String {
        match self {
            ApiRequest::UpdateTitle { transcription_id, .. }
            | ApiRequest::UpdateTranscriptionField { transcription_id, .. } => {
                format!("/api/transcriptions/{}", transcription_id)
            }
            ApiRequest::UpdateSegmentField { segment_id, .. }
            | ApiRequest::DeleteSegment { segment_id } => format!("/api/segments/{}", segment_id),
            ApiRequest::InsertSegment { .. } => SEGMENTS_PATH.to_string(),
            ApiRequest::RenameSpeaker { transcription_id, .. } => {
                format!("/edit/{}", transcription_id)
            }
        }
    }

    /// Every store mutation goes out as POST.
    pub fn verb(&self) -> Verb {
        Verb::Post
    }

    /// JSON body sent on the wire.
    pub fn payload(&self) -> serde_json::Value {
        match self {
            ApiRequest::UpdateTitle { value, .. } => serde_json::json!({ "value": value }),
            ApiRequest::UpdateTranscriptionField { field, value, .. } => {
                serde_json::json!({ "field": field, "value": value })
            }
            ApiRequest::UpdateSegmentField { field, value, .. } => {
                serde_json::json!({ "field": field, "value": value })
            }
            ApiRequest::InsertSegment {
                segment_id,
                other_id,
                direction,
            } => serde_json::json!({
                "segmentId": segment_id,
                "otherId": other_id,
                "where": direction.as_where(),
            }),
            // The store only accepts POST; deletes ride along as a marker.
            ApiRequest::DeleteSegment { .. } => serde_json::json!({ "method": "DELETE" }),
            ApiRequest::RenameSpeaker { old, new, .. } => {
                serde_json::json!({ "speaker-old": old, "speaker-new": new })
            }
        }
    }

    /// Fields for requests that go out form-encoded instead of as JSON.
    pub fn form_fields(&self) -> Option<Vec<(&'static str, String)>> {
        match self {
            ApiRequest::RenameSpeaker { old, new, .. } => Some(vec![
                ("speaker-old", old.clone()),
                ("speaker-new", new.clone()),
            ]),
            _ => None,
        }
    }

    /// Status the server answers with when the operation took effect.
    pub fn success_status(&self) -> u16 {
        match self {
            ApiRequest::DeleteSegment { .. } => 204,
            ApiRequest::RenameSpeaker { .. } => 302,
            _ => 200,
        }
    }

    /// The form post redirects back to the page; a client that follows
    /// the redirect sees the page itself.
    pub fn is_success(&self, status: u16) -> bool {
        match self {
            ApiRequest::RenameSpeaker { .. } => matches!(status, 200 | 302),
            _ => status == self.success_status(),
        }
    }
}

/// Client for the remote segment/transcription store.
pub struct SyncClient<T> {
    transport: Arc<T>,
    csrf_token: Option<String>,
}

impl<T> Clone for SyncClient<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            csrf_token: self.csrf_token.clone(),
        }
    }
}

impl<T: Transport> SyncClient<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport: Arc::new(transport),
            csrf_token: None,
        }
    }

    pub fn with_csrf_token(mut self, token: impl Into<String>) -> Self {
        self.csrf_token = Some(token.into());
        self
    }

    pub fn set_csrf_token(&mut self, token: Option<String>) {
        self.csrf_token = token;
    }

    pub fn csrf_token(&self) -> Option<&str> {
        self.csrf_token.as_deref()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Issue one request. Non-2xx statuses come back as `Ok`.
    #[instrument(level = "debug", skip(self, payload), fields(verb = verb.as_str()))]
    pub async fn request<P>(
        &self,
        path: &str,
        payload: Option<&P>,
        verb: Verb,
    ) -> Result<ApiResponse, SyncError>
    where
        P: Serialize + ?Sized,
    {
        let body = match payload {
            Some(payload) => Some(serde_json::to_vec(payload)?),
            None => None,
        };
        self.transmit(path, verb, JSON_CONTENT_TYPE, body).await
    }

    /// POST url-encoded form fields, the way the page's own forms submit.
    /// The anti-forgery token rides in the body as well as the header.
    #[instrument(level = "debug", skip(self, fields))]
    pub async fn submit_form(
        &self,
        path: &str,
        fields: &[(&str, String)],
    ) -> Result<ApiResponse, SyncError> {
        let mut pairs: Vec<String> = fields
            .iter()
            .map(|(name, value)| {
                format!("{}={}", urlencoding::encode(name), urlencoding::encode(value))
            })
            .collect();
        if let Some(token) = &self.csrf_token {
            pairs.push(format!("{}={}", CSRF_FORM_FIELD, urlencoding::encode(token)));
        }

        let body = pairs.join("&").into_bytes();
        self.transmit(path, Verb::Post, FORM_CONTENT_TYPE, Some(body)).await
    }

    async fn transmit(
        &self,
        path: &str,
        verb: Verb,
        content_type: &str,
        body: Option<Vec<u8>>,
    ) -> Result<ApiResponse, SyncError> {
        let mut headers = vec![
            ("Content-Type".to_string(), content_type.to_string()),
            ("X-Requested-With".to_string(), "XMLHttpRequest".to_string()),
        ];
        if verb.is_mutating() {
            match &self.csrf_token {
                Some(token) => headers.push((CSRF_HEADER.to_string(), token.clone())),
                None => warn!(path, "mutating request without an anti-forgery token"),
            }
        }

        let response = self
            .transport
            .send(HttpRequest {
                verb,
                path: path.to_string(),
                headers,
                body,
            })
            .await?;

        debug!(status = response.status, "response received");

        let body = if response.body.is_empty() {
            None
        } else {
            Some(String::from_utf8_lossy(&response.body).into_owned())
        };

        Ok(ApiResponse::new(response.status, body))
    }

    pub async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, SyncError> {
        if let Some(fields) = request.form_fields() {
            return self.submit_form(&request.path(), &fields).await;
        }
        let payload = request.payload();
        self.request(&request.path(), Some(&payload), request.verb())
            .await
    }
}
