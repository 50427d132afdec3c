use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct PendingRecordRow {
    pub id: i64,
    pub kind: String,
    pub payload: String,
    pub synced: bool,
    pub queued_at: i64,
    pub synced_at: Option<i64>,
}

#[derive(Debug, Clone, FromRow)]
pub struct ReferenceRow {
    pub cache_key: String,
    pub payload: String,
    pub cached_at: i64,
    pub expires_at: Option<i64>,
}
