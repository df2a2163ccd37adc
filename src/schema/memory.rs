//! In-memory schema registry
//!
//! Mirrors the registry semantics the producer relies on, without a
//! network: ids are global and keyed by definition text, versions are per
//! subject. Useful for tests and for running the pipeline without a
//! registry service.

use super::{subject_name, SchemaFormat, SchemaHandle, SchemaResolver};
use crate::codec::AvroCodec;
use crate::error::{EventError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Debug, Clone)]
struct StoredVersion {
    id: u32,
    version: u32,
    definition: String,
    format: SchemaFormat,
}

#[derive(Debug, Default)]
struct RegistryState {
    /// subject → versions in registration order
    subjects: HashMap<String, Vec<StoredVersion>>,
    /// definition text → global id; survives subject deletion
    ids: HashMap<String, u32>,
    /// wider than an id so that `u32::MAX` itself can still be issued
    next_id: u64,
    /// highest version ever issued per subject, so deleted versions are not reused
    version_high_water: HashMap<String, u32>,
}

/// In-memory schema registry for development and testing
///
/// Stores schemas in a `HashMap` protected by `RwLock`.
/// Schemas are lost on process restart.
pub struct MemorySchemaRegistry {
    state: RwLock<RegistryState>,
}

impl MemorySchemaRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            state: RwLock::new(RegistryState {
                next_id: 1,
                ..Default::default()
            }),
        }
    }

    /// Create a registry whose id counter starts at `first_id`
    pub fn with_first_id(first_id: u32) -> Self {
        let registry = Self::new();
        if let Ok(mut state) = registry.state.write() {
            state.next_id = u64::from(first_id.max(1));
        }
        registry
    }

    /// All subjects that currently hold at least one version, sorted
    pub fn subjects(&self) -> Result<Vec<String>> {
        let state = self.read()?;
        let mut subjects: Vec<String> = state
            .subjects
            .iter()
            .filter(|(_, versions)| !versions.is_empty())
            .map(|(s, _)| s.clone())
            .collect();
        subjects.sort();
        Ok(subjects)
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, RegistryState>> {
        self.state.read().map_err(|e| {
            EventError::RegistryUnavailable(format!("Schema registry lock poisoned: {}", e))
        })
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, RegistryState>> {
        self.state.write().map_err(|e| {
            EventError::RegistryUnavailable(format!("Schema registry lock poisoned: {}", e))
        })
    }
}

impl Default for MemorySchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn to_handle(subject: &str, stored: &StoredVersion) -> Result<SchemaHandle> {
    SchemaHandle::new(
        stored.id,
        subject,
        stored.version,
        stored.definition.clone(),
        stored.format,
    )
}

#[async_trait]
impl SchemaResolver for MemorySchemaRegistry {
    async fn delete_subject(&self, subject: &str, permanent: bool) -> Result<()> {
        let mut state = self.write()?;
        match state.subjects.remove(subject) {
            Some(versions) if !versions.is_empty() => {
                if permanent {
                    state.version_high_water.remove(subject);
                }
                tracing::debug!(
                    subject = subject,
                    versions = versions.len(),
                    permanent = permanent,
                    "Subject deleted"
                );
                Ok(())
            }
            _ => Err(EventError::NotFound(format!("Subject '{}' not found", subject))),
        }
    }

    async fn get_latest_schema(
        &self,
        subject_base: &str,
        is_key: bool,
    ) -> Result<Option<SchemaHandle>> {
        let subject = subject_name(subject_base, is_key);
        let state = self.read()?;
        match state.subjects.get(&subject).and_then(|v| v.last()) {
            Some(stored) => to_handle(&subject, stored).map(Some),
            None => Ok(None),
        }
    }

    async fn create_schema(
        &self,
        subject_base: &str,
        definition: &str,
        format: SchemaFormat,
        is_key: bool,
    ) -> Result<SchemaHandle> {
        let subject = subject_name(subject_base, is_key);

        if let Err(e) = AvroCodec::parse(definition) {
            return Err(EventError::SchemaRejected {
                subject,
                reason: format!("Invalid {} schema: {}", format.as_str(), e),
            });
        }

        let mut state = self.write()?;

        // Re-registering a definition the subject already holds reuses that version
        if let Some(existing) = state
            .subjects
            .get(&subject)
            .and_then(|versions| versions.iter().find(|v| v.definition == definition))
        {
            return to_handle(&subject, existing);
        }

        let id = match state.ids.get(definition) {
            Some(id) => *id,
            None => {
                let id = u32::try_from(state.next_id).map_err(|_| {
                    EventError::RegistryUnavailable(format!(
                        "Schema id space exhausted while registering under '{}'",
                        subject
                    ))
                })?;
                state.next_id += 1;
                state.ids.insert(definition.to_string(), id);
                id
            }
        };

        let version = state
            .version_high_water
            .get(&subject)
            .copied()
            .unwrap_or(0)
            + 1;
        state.version_high_water.insert(subject.clone(), version);

        let stored = StoredVersion {
            id,
            version,
            definition: definition.to_string(),
            format,
        };
        state
            .subjects
            .entry(subject.clone())
            .or_default()
            .push(stored.clone());

        tracing::debug!(subject = %subject, id = id, version = version, "Schema registered");

        to_handle(&subject, &stored)
    }

    fn name(&self) -> &str {
        "memory"
    }
}
