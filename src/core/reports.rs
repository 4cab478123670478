use crate::core::KeyValueStore;
use crate::domain::sentiment::ReportMeta;
use crate::utils::error::Result;
use serde_json::{Map, Value};

pub const REPORTS_KEY: &str = "bt:reports";

/// Locally kept list of generated reports.
pub struct ReportBook<'a, K: KeyValueStore> {
    store: &'a K,
}

impl<'a, K: KeyValueStore> ReportBook<'a, K> {
    pub fn new(store: &'a K) -> Self {
        Self { store }
    }

    /// Reports in the order they were saved. Missing or unreadable data reads as empty.
    pub fn list(&self) -> Result<Vec<ReportMeta>> {
        let Some(raw) = self.store.get(REPORTS_KEY)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&raw) {
            Ok(reports) => Ok(reports),
            Err(e) => {
                tracing::warn!("⚠️ Ignoring unreadable report list: {}", e);
                Ok(Vec::new())
            }
        }
    }

    pub fn save(&self, title: &str, extra: Map<String, Value>) -> Result<ReportMeta> {
        let mut reports = self.list()?;
        let meta = ReportMeta {
            id: format!("r_{}", &uuid::Uuid::new_v4().simple().to_string()[..10]),
            title: title.to_string(),
            created_at: chrono::Utc::now().timestamp_millis(),
            extra,
        };
        reports.push(meta.clone());
        self.store
            .set(REPORTS_KEY, &serde_json::to_string(&reports)?)?;

        tracing::info!("🗂️ Saved report '{}' ({})", meta.title, meta.id);
        Ok(meta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryKeyValueStore;

    #[test]
    fn test_empty_book() {
        let store = MemoryKeyValueStore::new();
        assert!(ReportBook::new(&store).list().unwrap().is_empty());
    }

    #[test]
    fn test_save_appends_in_order() {
        let store = MemoryKeyValueStore::new();
        let book = ReportBook::new(&store);

        let first = book.save("Monthly Sentiment Report", Map::new()).unwrap();
        let mut extra = Map::new();
        extra.insert("brand".to_string(), Value::String("Aurora".to_string()));
        let second = book.save("Aurora deep dive", extra).unwrap();

        let reports = book.list().unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].id, first.id);
        assert_eq!(reports[1].extra.get("brand"), Some(&Value::String("Aurora".to_string())));
        assert_ne!(first.id, second.id);
        assert!(first.id.starts_with("r_"));
        assert!(reports[1].created_at >= reports[0].created_at);
    }

    #[test]
    fn test_stored_shape_uses_created_at_key() {
        let store = MemoryKeyValueStore::new();
        ReportBook::new(&store).save("Weekly", Map::new()).unwrap();

        let raw: Value = serde_json::from_str(&store.get(REPORTS_KEY).unwrap().unwrap()).unwrap();
        assert!(raw[0]["createdAt"].is_i64());
        assert_eq!(raw[0]["title"], "Weekly");
    }

    #[test]
    fn test_corrupt_list_reads_empty() {
        let store = MemoryKeyValueStore::new();
        store.set(REPORTS_KEY, "[{").unwrap();
        assert!(ReportBook::new(&store).list().unwrap().is_empty());
    }
}
