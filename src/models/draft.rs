use serde::{Deserialize, Serialize};

/// Transient, unkeyed, single-slot in-progress submission state. One slot
/// per user, overwritten on every save, never merged.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_preview: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_data: Option<String>,
}

impl Draft {
    /// Approximate persisted size, used for the storage-capacity guard.
    pub fn byte_len(&self) -> usize {
        self.title.as_deref().map_or(0, str::len)
            + self.description.as_deref().map_or(0, str::len)
            + self.image_preview.as_deref().map_or(0, str::len)
            + self.image_data.as_deref().map_or(0, str::len)
    }
}

#[derive(Debug, Serialize)]
pub struct DraftSaveResponse {
    pub saved: bool,
}
