//! Document HTTP request handlers

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::BytesRejection,
        Multipart, State,
    },
    http::StatusCode,
    routing::{delete, post},
    Router,
};
use bytes::Bytes;
use docgate_core::{ApiError, ApiResponse};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::policy::UploadPolicy;
use crate::storage::{DocumentStorage, StorageError};

const UPLOADED: &str = "File uploaded successfully";
const ALREADY_EXISTS: &str = "File already exists in the S3 bucket.";
const UPLOAD_CHECK_FAILED: &str = "Failed to check if file exists in S3.";
const DELETED: &str = "File deleted successfully";
const NOT_FOUND: &str = "File not found in S3.";
const DELETE_CHECK_FAILED: &str = "Failed to check file in S3.";
const DOCUMENT_NAME_REQUIRED: &str = "document_name is required in the request body.";
const FILE_REQUIRED: &str = "A file is required in the 'file' form field.";
const FILE_NAME_REQUIRED: &str = "The uploaded file must have a file name.";

/// Content type assumed when a file part does not declare one
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Shared state for document handlers
pub struct DocumentState {
    pub storage: Arc<dyn DocumentStorage>,
    pub policy: UploadPolicy,
}

impl DocumentState {
    pub fn new(storage: Arc<dyn DocumentStorage>, policy: UploadPolicy) -> Self {
        Self { storage, policy }
    }
}

/// Routes for the upload and delete endpoints
pub fn routes(state: Arc<DocumentState>) -> Router {
    Router::new()
        .route("/api/upload", post(upload_document))
        .route("/api/delete", delete(delete_document))
        .with_state(state)
}

/// Fields read from an upload form
#[derive(Debug)]
struct UploadRequest {
    file_name: String,
    mime_type: String,
    content: Bytes,
    tenant: Option<String>,
}

/// JSON body of a delete request
#[derive(Debug, Deserialize)]
struct DeleteRequest {
    document_name: Option<String>,
}

// === Upload ===

/// `POST /api/upload`
pub async fn upload_document(
    State(state): State<Arc<DocumentState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<ApiResponse, ApiError> {
    let multipart = multipart.map_err(|rejection| {
        body_failure(rejection.status(), rejection.body_text())
    })?;
    let upload = read_upload(multipart).await?;

    info!(
        file_name = %upload.file_name,
        tenant = upload.tenant.as_deref().unwrap_or("-"),
        mime_type = %upload.mime_type,
        size = upload.content.len(),
        "Uploading document"
    );

    if !state.policy.is_allowed(&upload.mime_type) {
        warn!(file_name = %upload.file_name, mime_type = %upload.mime_type, "Rejected file type");
        return Err(ApiError::Validation(state.policy.rejection_message()));
    }

    let key = state
        .policy
        .object_key(&upload.file_name, upload.tenant.as_deref())?;

    match state.storage.exists(&key).await {
        Ok(true) => return Err(already_exists(state.storage.as_ref(), &key)),
        Ok(false) | Err(StorageError::NotFound(_)) => {}
        Err(e) => {
            error!(key = %key, error = %e, "Failed to check if file exists");
            return Err(ApiError::StorageBackend(UPLOAD_CHECK_FAILED.to_string()));
        }
    }

    match state
        .storage
        .put(&key, upload.content, &upload.mime_type)
        .await
    {
        Ok(file_url) => {
            info!(key = %key, file_url = %file_url, "Document uploaded");
            Ok(ApiResponse::ok(UPLOADED).with_file_url(file_url))
        }
        Err(StorageError::AlreadyExists(_)) => {
            warn!(key = %key, "Lost a concurrent upload race");
            Err(already_exists(state.storage.as_ref(), &key))
        }
        Err(e) => {
            error!(key = %key, error = %e, "Failed to upload document");
            Err(storage_failure(e))
        }
    }
}

async fn read_upload(mut multipart: Multipart) -> Result<UploadRequest, ApiError> {
    let mut file: Option<(String, String, Bytes)> = None;
    let mut tenant = None;

    while let Some(field) = multipart.next_field().await.map_err(field_failure)? {
        let field_name = field.name().unwrap_or_default().to_string();

        match field_name.as_str() {
            "file" => {
                let file_name = field
                    .file_name()
                    .map(str::to_string)
                    .filter(|name| !name.trim().is_empty())
                    .ok_or_else(|| ApiError::Validation(FILE_NAME_REQUIRED.to_string()))?;
                let mime_type = field
                    .content_type()
                    .unwrap_or(FALLBACK_CONTENT_TYPE)
                    .to_string();
                let content = field.bytes().await.map_err(field_failure)?;
                file = Some((file_name, mime_type, content));
            }
            "company_name" => {
                tenant = Some(field.text().await.map_err(field_failure)?);
            }
            _ => {}
        }
    }

    let (file_name, mime_type, content) =
        file.ok_or_else(|| ApiError::Validation(FILE_REQUIRED.to_string()))?;

    Ok(UploadRequest {
        file_name,
        mime_type,
        content,
        tenant,
    })
}

fn already_exists(storage: &dyn DocumentStorage, key: &str) -> ApiError {
    ApiError::Conflict {
        message: ALREADY_EXISTS.to_string(),
        file_url: storage.object_url(key),
    }
}

// === Delete ===

/// `DELETE /api/delete`
pub async fn delete_document(
    State(state): State<Arc<DocumentState>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<ApiResponse, ApiError> {
    let body = body.map_err(|rejection| body_failure(rejection.status(), rejection.body_text()))?;
    let document_name = serde_json::from_slice::<DeleteRequest>(&body)
        .ok()
        .and_then(|request| request.document_name)
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| ApiError::Validation(DOCUMENT_NAME_REQUIRED.to_string()))?;

    info!(document_name = %document_name, "Deleting document");

    match state.storage.exists(&document_name).await {
        Ok(true) => {}
        Ok(false) | Err(StorageError::NotFound(_)) => {
            return Err(ApiError::NotFound(NOT_FOUND.to_string()));
        }
        Err(e) => {
            error!(document_name = %document_name, error = %e, "Failed to check file");
            return Err(ApiError::StorageBackend(DELETE_CHECK_FAILED.to_string()));
        }
    }

    match state.storage.delete(&document_name).await {
        Ok(()) => {
            info!(document_name = %document_name, "Document deleted");
            Ok(ApiResponse::ok(DELETED).with_document_name(document_name))
        }
        Err(StorageError::NotFound(_)) => Err(ApiError::NotFound(NOT_FOUND.to_string())),
        Err(e) => {
            error!(document_name = %document_name, error = %e, "Failed to delete document");
            Err(storage_failure(e))
        }
    }
}

// === Error mapping ===

fn storage_failure(error: StorageError) -> ApiError {
    match error {
        StorageError::Unauthorized(_) => ApiError::Credential,
        StorageError::NotFound(detail) | StorageError::Other(detail) => {
            ApiError::StorageBackend(detail)
        }
        StorageError::AlreadyExists(key) => ApiError::StorageBackend(format!(
            "Object already exists: {}",
            key
        )),
    }
}

fn field_failure(error: MultipartError) -> ApiError {
    body_failure(error.status(), error.body_text())
}

/// Map an extractor rejection onto the JSON error envelope
fn body_failure(status: StatusCode, detail: String) -> ApiError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(detail)
    } else {
        ApiError::Validation(format!("Invalid request body: {}", detail))
    }
}
