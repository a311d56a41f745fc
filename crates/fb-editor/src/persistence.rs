//! Persistence boundary.
//!
//! The editor never talks to a backend directly. It hands the schema to a
//! [`FormStore`], which creates the form when it has no id and updates it
//! otherwise, and returns the stored copy with its assigned id.

use async_trait::async_trait;
use fb_core::id::FormId;
use fb_core::model::{DEFAULT_TITLE, FormSchema};
use parking_lot::Mutex;
use std::collections::HashMap;

/// Store failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("form {0} not found")]
    NotFound(FormId),

    #[error("persistence failed: {0}")]
    Persistence(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Whether a save created a new form or updated an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    Create,
    Update,
}

impl SaveMode {
    pub fn of(schema: &FormSchema) -> Self {
        if schema.id.is_some() {
            Self::Update
        } else {
            Self::Create
        }
    }
}

#[async_trait]
pub trait FormStore: Send + Sync {
    /// Fetch a form by id.
    async fn load(&self, id: &FormId) -> StoreResult<FormSchema>;

    /// Create (no id) or update (id present). Returns the stored schema.
    async fn save(&self, schema: &FormSchema) -> StoreResult<FormSchema>;

    async fn delete(&self, id: &FormId) -> StoreResult<()>;
}

// ─── In-memory store ─────────────────────────────────────────────────────

/// In-memory store for tests and embedding. Forms are kept as JSON so every
/// save and load crosses the same wire format a remote backend would.
/// Ids are sequential numbers starting at 1.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    forms: HashMap<FormId, String>,
    next_id: u64,
    history: Vec<(SaveMode, FormId)>,
    fail_next: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next call fail with a persistence error carrying `message`.
    pub fn fail_next(&self, message: impl Into<String>) {
        self.inner.lock().fail_next = Some(message.into());
    }

    /// Every successful save, oldest first.
    pub fn history(&self) -> Vec<(SaveMode, FormId)> {
        self.inner.lock().history.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().forms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Store a schema as-is (including its id), bypassing save semantics.
    pub fn insert(&self, schema: &FormSchema) -> StoreResult<()> {
        let id = schema
            .id
            .clone()
            .ok_or_else(|| StoreError::Persistence("cannot insert a form without an id".into()))?;
        let json = encode(schema)?;
        let mut inner = self.inner.lock();
        if let Ok(n) = id.as_str().parse::<u64>() {
            inner.next_id = inner.next_id.max(n);
        }
        inner.forms.insert(id, json);
        Ok(())
    }
}

fn encode(schema: &FormSchema) -> StoreResult<String> {
    serde_json::to_string(schema).map_err(|e| StoreError::Persistence(e.to_string()))
}

fn decode(json: &str) -> StoreResult<FormSchema> {
    serde_json::from_str(json).map_err(|e| StoreError::Persistence(e.to_string()))
}

impl Inner {
    /// Next sequential id no stored form uses.
    fn fresh_id(&mut self) -> FormId {
        loop {
            self.next_id += 1;
            let id = FormId::new(self.next_id.to_string());
            if !self.forms.contains_key(&id) {
                return id;
            }
        }
    }

    fn take_failure(&mut self) -> StoreResult<()> {
        match self.fail_next.take() {
            Some(message) => Err(StoreError::Persistence(message)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl FormStore for MemoryStore {
    async fn load(&self, id: &FormId) -> StoreResult<FormSchema> {
        let mut inner = self.inner.lock();
        inner.take_failure()?;
        let json = inner
            .forms
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        decode(json)
    }

    async fn save(&self, schema: &FormSchema) -> StoreResult<FormSchema> {
        let mut inner = self.inner.lock();
        inner.take_failure()?;

        let mode = SaveMode::of(schema);
        let mut stored = schema.clone();
        if stored.title.trim().is_empty() {
            stored.title = DEFAULT_TITLE.to_string();
        }
        let id = match mode {
            SaveMode::Create => {
                let id = inner.fresh_id();
                stored.id = Some(id.clone());
                id
            }
            SaveMode::Update => {
                let id = stored.id.clone().ok_or_else(|| {
                    StoreError::Persistence("update without an id".into())
                })?;
                if !inner.forms.contains_key(&id) {
                    return Err(StoreError::NotFound(id));
                }
                id
            }
        };

        let json = encode(&stored)?;
        inner.forms.insert(id.clone(), json);
        log::debug!("store: {mode:?} form {id}");
        inner.history.push((mode, id));
        Ok(stored)
    }

    async fn delete(&self, id: &FormId) -> StoreResult<()> {
        let mut inner = self.inner.lock();
        inner.take_failure()?;
        inner
            .forms
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }
}
