use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub users: UserMetrics,
    pub items: ItemMetrics,
    pub storage: StorageMetrics,
    pub collected_at: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserMetrics {
    pub total: i64,
    pub sessions: i64,
    pub drafts: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemMetrics {
    pub total: i64,
    pub active: i64,
    pub trashed: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageMetrics {
    pub total_image_bytes: i64,
}
