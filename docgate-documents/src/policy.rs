//! Upload policy: which MIME types are accepted and how object keys are built

use docgate_core::ApiError;
use std::str::FromStr;

/// MIME type of `.docx` documents
pub const DOCX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// How the object key of an upload is derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyRule {
    /// Key is the uploaded file name
    #[default]
    Plain,
    /// Key is `{company_name}/{file name}`; the form must carry `company_name`
    TenantPrefixed,
}

impl FromStr for KeyRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "plain" => Ok(Self::Plain),
            "tenant_prefixed" | "tenant" => Ok(Self::TenantPrefixed),
            other => Err(format!(
                "unknown key rule '{}', expected 'plain' or 'tenant_prefixed'",
                other
            )),
        }
    }
}

/// Accepted MIME types plus the key rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPolicy {
    allowed_mime_types: Vec<String>,
    pub key_rule: KeyRule,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self::new(
            [mime::APPLICATION_PDF.essence_str(), DOCX_MIME_TYPE],
            KeyRule::Plain,
        )
    }
}

impl UploadPolicy {
    pub fn new<I, S>(allowed_mime_types: I, key_rule: KeyRule) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut allowed: Vec<String> = Vec::new();
        for mime_type in allowed_mime_types {
            if let Some(essence) = essence(mime_type.as_ref()) {
                if !allowed.contains(&essence) {
                    allowed.push(essence);
                }
            }
        }
        Self {
            allowed_mime_types: allowed,
            key_rule,
        }
    }

    /// Parse a comma-separated allow-list such as `application/pdf,application/msword`
    pub fn from_list(list: &str, key_rule: KeyRule) -> Result<Self, String> {
        let policy = Self::new(list.split(','), key_rule);
        if policy.allowed_mime_types.is_empty() {
            return Err(format!("no valid MIME types in '{}'", list));
        }
        Ok(policy)
    }

    pub fn with_key_rule(mut self, key_rule: KeyRule) -> Self {
        self.key_rule = key_rule;
        self
    }

    pub fn allowed_mime_types(&self) -> &[String] {
        &self.allowed_mime_types
    }

    /// Whether a declared content type is on the allow-list; parameters are ignored
    pub fn is_allowed(&self, mime_type: &str) -> bool {
        essence(mime_type).is_some_and(|essence| self.allowed_mime_types.contains(&essence))
    }

    /// Message returned for a disallowed upload, e.g.
    /// `Invalid file type. Only PDF and DOCX files are allowed.`
    pub fn rejection_message(&self) -> String {
        let labels: Vec<&str> = self.allowed_mime_types.iter().map(|m| label(m)).collect();
        let listed = match labels.as_slice() {
            [] => String::from("no"),
            [only] => (*only).to_string(),
            [init @ .., last] => format!("{} and {}", init.join(", "), last),
        };
        format!("Invalid file type. Only {} files are allowed.", listed)
    }

    /// Object key for an upload under this policy
    ///
    /// Tenant-prefixed keys must stay under the tenant's prefix, so neither
    /// part may contain a path separator or be a dot segment.
    pub fn object_key(&self, file_name: &str, tenant: Option<&str>) -> Result<String, ApiError> {
        match self.key_rule {
            KeyRule::Plain => Ok(file_name.to_string()),
            KeyRule::TenantPrefixed => match tenant.map(str::trim) {
                Some(tenant) if !tenant.is_empty() => {
                    if !is_single_segment(tenant) {
                        return Err(ApiError::Validation(INVALID_COMPANY_NAME.to_string()));
                    }
                    if !is_single_segment(file_name) {
                        return Err(ApiError::Validation(INVALID_FILE_NAME.to_string()));
                    }
                    Ok(format!("{}/{}", tenant, file_name))
                }
                _ => Err(ApiError::Validation(
                    "company_name is required in the form data.".to_string(),
                )),
            },
        }
    }
}

const INVALID_COMPANY_NAME: &str = "company_name must not contain path segments.";
const INVALID_FILE_NAME: &str = "File name must not contain path segments.";

fn is_single_segment(part: &str) -> bool {
    !part.contains(['/', '\\']) && part != "." && part != ".."
}

/// Lowercased `type/subtype` of a MIME string, without parameters
fn essence(mime_type: &str) -> Option<String> {
    mime_type
        .trim()
        .parse::<mime::Mime>()
        .ok()
        .map(|m| m.essence_str().to_ascii_lowercase())
}

fn label(mime_type: &str) -> &str {
    match mime_type {
        "application/pdf" => "PDF",
        DOCX_MIME_TYPE => "DOCX",
        "application/msword" => "DOC",
        "text/plain" => "TXT",
        other => other,
    }
}
