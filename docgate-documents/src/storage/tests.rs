//! Tests for the in-memory storage backend

use super::*;
use bytes::Bytes;
use std::sync::Arc;

/// Test helper to create storage
fn storage() -> EphemeralStorage {
    EphemeralStorage::new("docs")
}

// =============================================================================
// EXISTENCE CHECKS
// =============================================================================

mod exists_tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_key_does_not_exist() {
        let s = storage();
        assert!(!s.exists("report.pdf").await.unwrap());
    }

    #[tokio::test]
    async fn test_key_exists_after_put() {
        let s = storage();
        s.put("report.pdf", Bytes::from("%PDF-1.7"), "application/pdf")
            .await
            .unwrap();
        assert!(s.exists("report.pdf").await.unwrap());
    }

    #[tokio::test]
    async fn test_keys_are_exact() {
        let s = storage();
        s.put("acme/report.pdf", Bytes::from("a"), "application/pdf")
            .await
            .unwrap();
        assert!(!s.exists("report.pdf").await.unwrap());
        assert!(!s.exists("acme").await.unwrap());
        assert!(s.exists("acme/report.pdf").await.unwrap());
    }
}

// =============================================================================
// WRITES
// =============================================================================

mod put_tests {
    use super::*;

    #[tokio::test]
    async fn test_put_returns_public_url() {
        let s = storage();
        let url = s
            .put("report.pdf", Bytes::from("%PDF-1.7"), "application/pdf")
            .await
            .unwrap();
        assert_eq!(url, "https://docs.s3.amazonaws.com/report.pdf");
    }

    #[tokio::test]
    async fn test_put_keeps_content_and_type() {
        let s = storage();
        s.put("report.pdf", Bytes::from("%PDF-1.7"), "application/pdf")
            .await
            .unwrap();

        let (data, content_type) = s.get("report.pdf").unwrap();
        assert_eq!(data, Bytes::from("%PDF-1.7"));
        assert_eq!(content_type, "application/pdf");
    }

    #[tokio::test]
    async fn test_conditional_put_refuses_existing_key() {
        let s = storage();
        s.put("report.pdf", Bytes::from("first"), "application/pdf")
            .await
            .unwrap();

        let result = s
            .put("report.pdf", Bytes::from("second"), "application/pdf")
            .await;
        assert_eq!(
            result,
            Err(StorageError::AlreadyExists("report.pdf".to_string()))
        );
        assert_eq!(s.get("report.pdf").unwrap().0, Bytes::from("first"));
    }

    #[tokio::test]
    async fn test_unconditional_put_overwrites() {
        let s = storage().with_conditional_writes(false);
        s.put("report.pdf", Bytes::from("first"), "application/pdf")
            .await
            .unwrap();
        s.put("report.pdf", Bytes::from("second"), "application/pdf")
            .await
            .unwrap();
        assert_eq!(s.get("report.pdf").unwrap().0, Bytes::from("second"));
    }

    #[tokio::test]
    async fn test_concurrent_puts_to_same_key_have_one_winner() {
        let s = Arc::new(storage());

        let mut handles = Vec::new();
        for i in 0..16 {
            let s = s.clone();
            handles.push(tokio::spawn(async move {
                s.put("race.pdf", Bytes::from(format!("{}", i)), "application/pdf")
                    .await
            }));
        }

        let mut winners = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => winners += 1,
                Err(e) => assert!(matches!(e, StorageError::AlreadyExists(_))),
            }
        }
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn test_custom_public_host() {
        let s = storage().with_public_host("s3.eu-west-1.amazonaws.com");
        assert_eq!(
            s.object_url("acme/report.pdf"),
            "https://docs.s3.eu-west-1.amazonaws.com/acme/report.pdf"
        );
    }
}

// =============================================================================
// DELETES
// =============================================================================

mod delete_tests {
    use super::*;

    #[tokio::test]
    async fn test_delete_removes_object() {
        let s = storage();
        s.put("report.pdf", Bytes::from("a"), "application/pdf")
            .await
            .unwrap();
        s.delete("report.pdf").await.unwrap();
        assert!(!s.exists("report.pdf").await.unwrap());
        assert!(s.get("report.pdf").is_none());
    }

    #[tokio::test]
    async fn test_delete_missing_key_is_not_found() {
        let s = storage();
        let result = s.delete("missing.pdf").await;
        assert_eq!(
            result,
            Err(StorageError::NotFound("missing.pdf".to_string()))
        );
    }

    #[tokio::test]
    async fn test_second_delete_is_not_found() {
        let s = storage();
        s.put("report.pdf", Bytes::from("a"), "application/pdf")
            .await
            .unwrap();
        s.delete("report.pdf").await.unwrap();
        assert!(matches!(
            s.delete("report.pdf").await,
            Err(StorageError::NotFound(_))
        ));
    }
}

#[test]
fn test_public_url_format() {
    assert_eq!(
        public_url("my-bucket", DEFAULT_STORAGE_HOST, "report.pdf"),
        "https://my-bucket.s3.amazonaws.com/report.pdf"
    );
}
