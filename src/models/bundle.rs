use serde::{Deserialize, Serialize};

use super::item::ReturnItem;

/// Provenance literal stamped into every export. A bundle whose signature
/// does not match is rejected without touching stored data. This is not a
/// tamper-evidence mechanism, only a format marker.
pub const BUNDLE_SIGNATURE: &str = "ReturnOS-Secure-Backup";
pub const APP_VERSION: &str = "1.0.0";

/// Portable snapshot of one user's full item + trash state.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBundle {
    // Import only consults signature, items, and trash; the provenance
    // fields may be absent from hand-edited bundles.
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub export_date: String,
    pub items: Vec<ReturnItem>,
    #[serde(default)]
    pub trash: Vec<ReturnItem>,
    #[serde(default)]
    pub app_version: String,
    pub signature: String,
}

/// Soft result of an import attempt. `success: false` means the attempt
/// was a full no-op.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResponse {
    pub success: bool,
    pub count: usize,
    pub message: String,
}

impl ImportResponse {
    pub fn parse_failure() -> Self {
        Self {
            success: false,
            count: 0,
            message: "Failed to parse backup file.".into(),
        }
    }

    pub fn invalid_format() -> Self {
        Self {
            success: false,
            count: 0,
            message: "Invalid backup file format.".into(),
        }
    }

    pub fn restored(count: usize) -> Self {
        Self {
            success: true,
            count,
            message: format!("Successfully restored {count} items."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundle_roundtrip_keeps_signature() {
        let bundle = ExportBundle {
            email: "jane@x.com".into(),
            export_date: "2026-08-30T12:00:00Z".into(),
            items: vec![],
            trash: vec![],
            app_version: APP_VERSION.into(),
            signature: BUNDLE_SIGNATURE.into(),
        };
        let encoded = serde_json::to_string(&bundle).unwrap();
        let decoded: ExportBundle = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded.signature, BUNDLE_SIGNATURE);
        assert_eq!(decoded.app_version, "1.0.0");
    }

    #[test]
    fn test_minimal_signed_bundle_accepted() {
        let raw = r#"{"items":[],"signature":"ReturnOS-Secure-Backup"}"#;
        let decoded: ExportBundle = serde_json::from_str(raw).unwrap();
        assert_eq!(decoded.signature, BUNDLE_SIGNATURE);
        assert!(decoded.email.is_empty());
        assert!(decoded.export_date.is_empty());
        assert!(decoded.app_version.is_empty());
    }

    #[test]
    fn test_missing_trash_defaults_empty() {
        let raw = r#"{"email":"a@b.c","exportDate":"2026-01-01T00:00:00Z",
            "items":[],"appVersion":"1.0.0","signature":"ReturnOS-Secure-Backup"}"#;
        let decoded: ExportBundle = serde_json::from_str(raw).unwrap();
        assert!(decoded.trash.is_empty());
    }
}
