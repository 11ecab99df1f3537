use async_trait::async_trait;
use model::{LanguageScore, TextRecord};
use store::StoreErrorReason::{BackendFailure, MissingEntry};
use store::StoreOperation::{GetText, PutText, UpdateLanguage};
use store::{StoreError, StoreOperation, TextStore};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// A `TextStore` held in process memory, for tests and local runs.
#[derive(Clone, Default)]
pub struct InMemoryTextStore {
    records: Arc<Mutex<HashMap<String, TextRecord>>>,
}

impl InMemoryTextStore {
    fn records(
        &self,
        key: &str,
        operation: StoreOperation,
    ) -> Result<MutexGuard<'_, HashMap<String, TextRecord>>, StoreError> {
        self.records.lock().map_err(|err| {
            StoreError::new(key, operation, BackendFailure(err.to_string().into()))
        })
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|records| records.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl TextStore for InMemoryTextStore {
    async fn put_text(&self, key: &str) -> Result<(), StoreError> {
        self.records(key, PutText)?
            .insert(key.to_string(), TextRecord::new(key));

        Ok(())
    }

    async fn update_language(&self, key: &str, score: &LanguageScore) -> Result<(), StoreError> {
        let mut records = self.records(key, UpdateLanguage)?;
        let record: &mut TextRecord = records
            .get_mut(key)
            .ok_or_else(|| StoreError::new(key, UpdateLanguage, MissingEntry))?;

        record
            .languages
            .insert(score.language_code.clone(), score.formatted_score());

        Ok(())
    }

    async fn get_text(&self, key: &str) -> Result<Option<TextRecord>, StoreError> {
        Ok(self.records(key, GetText)?.get(key).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_creates_key_only_record() {
        let store = InMemoryTextStore::default();

        store.put_text("hello world").await.expect("put should succeed");

        let record: TextRecord = store
            .get_text("hello world")
            .await
            .expect("get should succeed")
            .expect("record should exist");

        assert_eq!(TextRecord::new("hello world"), record);
    }

    #[tokio::test]
    async fn put_overwrites_existing_languages() {
        let store = InMemoryTextStore::default();

        store.put_text("olá").await.unwrap();
        store
            .update_language("olá", &LanguageScore::new("pt", 0.91))
            .await
            .unwrap();
        store.put_text("olá").await.unwrap();

        let record: TextRecord = store.get_text("olá").await.unwrap().unwrap();

        assert!(record.languages.is_empty());
        assert_eq!(1, store.len());
    }

    #[tokio::test]
    async fn update_sets_formatted_score_by_language_code() {
        let store = InMemoryTextStore::default();

        store.put_text("hello world").await.unwrap();
        store
            .update_language("hello world", &LanguageScore::new("en", 0.9812))
            .await
            .unwrap();
        store
            .update_language("hello world", &LanguageScore::new("en", 0.5))
            .await
            .unwrap();

        let record: TextRecord = store.get_text("hello world").await.unwrap().unwrap();

        assert_eq!(Some("0.50"), record.score("en"));
        assert_eq!(1, record.languages.len());
    }

    #[tokio::test]
    async fn update_fails_without_put() {
        let store = InMemoryTextStore::default();

        let err: StoreError = store
            .update_language("never stored", &LanguageScore::new("en", 0.98))
            .await
            .expect_err("update should fail");

        assert!(err.is_missing_entry());
        assert!(store.is_empty());
    }
}
