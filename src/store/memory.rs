//! Reader/writer-locked student table.

use super::StoreError;
use crate::student::{Student, StudentInput, validate};
use std::collections::HashMap;
use tokio::sync::RwLock;

const FIRST_ID: u64 = 1;

/// Process-lifetime owner of every [`Student`] record.
///
/// A single [`RwLock`] guards both the table and the id counter: reads share the lock, and every
/// mutation takes it exclusively. Validation runs before the lock is acquired so rejected
/// candidates never contend with other requests. Construct one per process (or per test) and
/// share it through an `Arc`.
pub struct StudentStore {
    inner: RwLock<Inner>,
}

struct Inner {
    records: HashMap<u64, Student>,
    next_id: u64,
}

impl StudentStore {
    /// Create an empty store whose first assigned id is `1`.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                records: HashMap::new(),
                next_id: FIRST_ID,
            }),
        }
    }

    /// Validate and insert a new record under the next identifier.
    ///
    /// Identifiers are strictly increasing and never reused, even after deletion.
    pub async fn create(&self, candidate: StudentInput) -> Result<Student, StoreError> {
        ensure_valid(&candidate)?;

        let mut inner = self.inner.write().await;
        let id = inner.next_id;
        let student = candidate.into_student(id);
        inner.records.insert(id, student.clone());
        inner.next_id += 1;
        drop(inner);

        tracing::debug!(id, "Stored new student");
        Ok(student)
    }

    /// Snapshot every stored record, ordered by id.
    ///
    /// The returned vector owns its records; later writes never show through it.
    pub async fn list(&self) -> Vec<Student> {
        let mut students: Vec<Student> = {
            let inner = self.inner.read().await;
            inner.records.values().cloned().collect()
        };
        students.sort_unstable_by_key(|student| student.id);
        students
    }

    /// Fetch a single record.
    pub async fn get(&self, id: u64) -> Result<Student, StoreError> {
        self.inner
            .read()
            .await
            .records
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    /// Replace every field of the record at `id`.
    ///
    /// The candidate is validated before existence is checked, so an invalid body for a missing
    /// id reports validation errors. The stored id is always `id`.
    pub async fn update(&self, id: u64, candidate: StudentInput) -> Result<Student, StoreError> {
        ensure_valid(&candidate)?;

        let mut inner = self.inner.write().await;
        let slot = inner.records.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        *slot = candidate.into_student(id);
        let student = slot.clone();
        drop(inner);

        tracing::debug!(id, "Replaced student");
        Ok(student)
    }

    /// Remove the record at `id`.
    pub async fn delete(&self, id: u64) -> Result<(), StoreError> {
        let removed = self.inner.write().await.records.remove(&id);
        match removed {
            Some(_) => {
                tracing::debug!(id, "Removed student");
                Ok(())
            }
            None => Err(StoreError::NotFound(id)),
        }
    }

    /// Number of records currently stored.
    pub async fn len(&self) -> usize {
        self.inner.read().await.records.len()
    }

    /// Whether the store holds no records.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for StudentStore {
    fn default() -> Self {
        Self::new()
    }
}

fn ensure_valid(candidate: &StudentInput) -> Result<(), StoreError> {
    let errors = validate(candidate);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(StoreError::Validation(errors))
    }
}
