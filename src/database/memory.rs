use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{DatabaseError, StudentStore};
use crate::student::{Student, StudentFields, StudentId};

#[derive(Debug)]
struct Inner {
    records: BTreeMap<StudentId, Student>,
    next_id: StudentId,
}

/// Process-local store. Ids start at 1 and are never reused after delete.
#[derive(Debug)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                records: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    /// Number of stored records
    pub async fn len(&self) -> usize {
        self.inner.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl StudentStore for MemoryStore {
    async fn get(&self, id: StudentId) -> Result<Option<Student>, DatabaseError> {
        Ok(self.inner.read().await.records.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Student>, DatabaseError> {
        Ok(self.inner.read().await.records.values().cloned().collect())
    }

    async fn create(&self, fields: StudentFields) -> Result<Student, DatabaseError> {
        let mut inner = self.inner.write().await;
        let id = inner.next_id;
        inner.next_id += 1;

        let student = Student::from_fields(id, fields);
        inner.records.insert(id, student.clone());
        Ok(student)
    }

    async fn update(&self, id: StudentId, fields: StudentFields) -> Result<Option<Student>, DatabaseError> {
        let mut inner = self.inner.write().await;
        Ok(inner.records.get_mut(&id).map(|record| {
            *record = Student::from_fields(id, fields);
            record.clone()
        }))
    }

    async fn delete(&self, id: StudentId) -> Result<bool, DatabaseError> {
        Ok(self.inner.write().await.records.remove(&id).is_some())
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(name: &str, roll: i64) -> StudentFields {
        StudentFields {
            name: name.to_string(),
            roll,
            city: "lahore".to_string(),
        }
    }

    #[tokio::test]
    async fn assigns_sequential_ids() {
        let store = MemoryStore::new();
        let a = store.create(fields("rahim", 1)).await.unwrap();
        let b = store.create(fields("rafay", 2)).await.unwrap();
        assert_eq!((a.id, b.id), (1, 2));
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let store = MemoryStore::new();
        let a = store.create(fields("rahim", 1)).await.unwrap();
        assert!(store.delete(a.id).await.unwrap());
        let b = store.create(fields("rafay", 2)).await.unwrap();
        assert_eq!(b.id, 2);
    }

    #[tokio::test]
    async fn delete_leaves_other_records() {
        let store = MemoryStore::new();
        let a = store.create(fields("rahim", 1)).await.unwrap();
        let b = store.create(fields("rafay", 2)).await.unwrap();
        assert!(store.delete(a.id).await.unwrap());
        assert!(!store.delete(a.id).await.unwrap());
        assert_eq!(store.list().await.unwrap(), vec![b]);
    }

    #[tokio::test]
    async fn update_unknown_id_is_none() {
        let store = MemoryStore::new();
        assert!(store.update(5, fields("rahim", 1)).await.unwrap().is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn update_replaces_fields_in_place() {
        let store = MemoryStore::new();
        let a = store.create(fields("rahim", 1)).await.unwrap();
        let updated = store.update(a.id, fields("rahim", 9)).await.unwrap().unwrap();
        assert_eq!(updated.roll, 9);
        assert_eq!(store.get(a.id).await.unwrap(), Some(updated));
    }
}
