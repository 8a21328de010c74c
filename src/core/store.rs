use crate::domain::model::{UserIdentity, UserRecordSet};
use crate::domain::ports::Storage;
use crate::utils::error::{Result, StatsError};

/// Persists one JSON document per user, keyed by uid, through the storage
/// boundary between the fetch and report phases.
pub struct RecordStore<S: Storage> {
    storage: S,
}

impl<S: Storage> RecordStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn document_name(uid: u64) -> String {
        format!("{}.json", uid)
    }

    pub async fn save(&self, set: &UserRecordSet) -> Result<String> {
        let path = Self::document_name(set.identity.uid);
        let data = serde_json::to_vec_pretty(set)?;
        self.storage.write_file(&path, &data).await?;
        tracing::debug!(uid = set.identity.uid, records = set.records.len(), "record document saved");
        Ok(path)
    }

    /// Returns `None` when no document exists for the user, which is how a
    /// failed fetch presents itself to the report phase. A document that does
    /// exist but fails to decode is unrecoverable for the run.
    pub async fn load(&self, identity: &UserIdentity) -> Result<Option<UserRecordSet>> {
        let path = Self::document_name(identity.uid);
        let data = match self.storage.read_file(&path).await {
            Ok(data) => data,
            Err(StatsError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };

        let set: UserRecordSet = serde_json::from_slice(&data).map_err(|e| StatsError::Input {
            message: format!("malformed record document {}: {}", path, e),
        })?;
        Ok(Some(set))
    }

    /// Loads the documents present for the roster, preserving roster order.
    /// Users without a document are skipped.
    pub async fn load_roster(&self, roster: &[UserIdentity]) -> Result<Vec<UserRecordSet>> {
        let mut sets = Vec::with_capacity(roster.len());
        for identity in roster {
            match self.load(identity).await? {
                Some(set) => sets.push(set),
                None => {
                    tracing::warn!(uid = identity.uid, name = %identity.name, "no record document, skipping user")
                }
            }
        }
        Ok(sets)
    }
}
