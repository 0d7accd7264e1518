use time::OffsetDateTime;

/// Auth context for one logical partition of the document store, produced by
/// the external token exchange. Read-only here; refreshing it is the token
/// collaborator's job.
#[derive(Clone, Debug)]
pub struct TokenResult {
    /// Bearer token presented in the `Authorization` header.
    pub token: String,
    /// Instant after which the token is no longer valid.
    pub expires_on: OffsetDateTime,
    /// Database account; becomes the endpoint host prefix.
    pub db_account: String,
    pub db_name: String,
    pub db_collection: String,
    /// Partition key routing documents to their logical shard.
    pub partition: String,
}

impl TokenResult {
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        self.expires_on <= now
    }
}
