//! Amazon S3 storage backend

use super::traits::*;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::operation::head_object::HeadObjectError;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use bytes::Bytes;
use tracing::debug;

/// Error codes S3 returns when the request was signed with bad or expired credentials.
/// `AccessDenied` is a permissions failure on valid credentials and is not listed.
const CREDENTIAL_ERROR_CODES: &[&str] = &[
    "InvalidAccessKeyId",
    "SignatureDoesNotMatch",
    "ExpiredToken",
    "InvalidToken",
];

/// Connection settings for [`S3Storage`]
#[derive(Clone)]
pub struct S3Config {
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
    /// Custom endpoint for S3-compatible stores; forces path-style addressing
    pub endpoint_url: Option<String>,
    pub public_host: String,
    pub conditional_writes: bool,
}

impl std::fmt::Debug for S3Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Config")
            .field("bucket", &self.bucket)
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("region", &self.region)
            .field("endpoint_url", &self.endpoint_url)
            .field("public_host", &self.public_host)
            .field("conditional_writes", &self.conditional_writes)
            .finish()
    }
}

/// Storage backend writing to a single S3 bucket
pub struct S3Storage {
    client: Client,
    bucket: String,
    public_host: String,
    conditional_writes: bool,
}

impl S3Storage {
    /// Build an SDK client from static credentials
    pub async fn connect(config: S3Config) -> Self {
        let credentials = Credentials::new(
            config.access_key.clone(),
            config.secret_key.clone(),
            None,
            None,
            "docgate",
        );

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .credentials_provider(credentials)
            .region(Region::new(config.region.clone()));
        if let Some(endpoint) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint.clone());
        }
        let sdk_config = loader.load().await;

        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(config.endpoint_url.is_some())
            .build();

        Self::with_client(Client::from_conf(s3_config), config)
    }

    /// Wrap an already configured SDK client
    pub fn with_client(client: Client, config: S3Config) -> Self {
        Self {
            client,
            bucket: config.bucket,
            public_host: config.public_host,
            conditional_writes: config.conditional_writes,
        }
    }
}

#[async_trait]
impl DocumentStorage for S3Storage {
    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        let result = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(err) if err.as_service_error().is_some_and(HeadObjectError::is_not_found) => {
                Ok(false)
            }
            Err(err) => match classify_sdk_error(key, &err) {
                StorageError::NotFound(_) => Ok(false),
                other => Err(other),
            },
        }
    }

    async fn put(
        &self,
        key: &str,
        content: Bytes,
        content_type: &str,
    ) -> Result<String, StorageError> {
        debug!(bucket = %self.bucket, key = %key, size = content.len(), "PutObject");

        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(content))
            .content_type(content_type);
        if self.conditional_writes {
            request = request.if_none_match("*");
        }

        request
            .send()
            .await
            .map_err(|err| classify_sdk_error(key, &err))?;

        Ok(self.object_url(key))
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        debug!(bucket = %self.bucket, key = %key, "DeleteObject");

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| classify_sdk_error(key, &err))?;

        Ok(())
    }

    fn object_url(&self, key: &str) -> String {
        public_url(&self.bucket, &self.public_host, key)
    }
}

fn classify_sdk_error<E>(key: &str, err: &SdkError<E, HttpResponse>) -> StorageError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
{
    let status = err.raw_response().map(|response| response.status().as_u16());
    let service_error = err.as_service_error();
    let code = service_error.and_then(|e| e.code());

    let detail = match (code, service_error.and_then(|e| e.message())) {
        (Some(code), Some(message)) => format!("{}: {}", code, message),
        _ => DisplayErrorContext(err).to_string(),
    };

    classify(key, code, status, detail)
}

/// Map an S3 error code and HTTP status onto a [`StorageError`]
fn classify(key: &str, code: Option<&str>, status: Option<u16>, detail: String) -> StorageError {
    match (code, status) {
        (Some("NoSuchBucket"), _) => StorageError::Other(detail),
        (Some("NoSuchKey" | "NotFound"), _) | (None, Some(404)) => {
            StorageError::NotFound(key.to_string())
        }
        (Some("PreconditionFailed" | "ConditionalRequestConflict"), _) | (None, Some(412)) => {
            StorageError::AlreadyExists(key.to_string())
        }
        (Some(code), _) if CREDENTIAL_ERROR_CODES.contains(&code) => {
            StorageError::Unauthorized(detail)
        }
        (None, Some(401)) => StorageError::Unauthorized(detail),
        _ => StorageError::Other(detail),
    }
}
