use crate::error::StoreError;
use crate::store::{ParkingSession, SessionStore, SlotId, SlotRegistry, TimeWindow};
use serde::Deserialize;
use std::path::Path;
use std::sync::RwLock;
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::debug;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read session seed file: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to parse session seed file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid timestamp {value:?} in session seed: {source}")]
    Timestamp {
        value: String,
        source: time::error::Parse,
    },
}

#[derive(Debug, Deserialize)]
struct SeedFile {
    sessions: Vec<SeedSession>,
}

#[derive(Debug, Deserialize)]
struct SeedSession {
    slot_id: SlotId,
    entry_time: String,
    #[serde(default)]
    exit_time: Option<String>,
}

fn parse_timestamp(value: &str) -> Result<OffsetDateTime, SeedError> {
    OffsetDateTime::parse(value, &Rfc3339).map_err(|source| SeedError::Timestamp {
        value: value.to_string(),
        source,
    })
}

pub fn parse_seed(contents: &str) -> Result<Vec<ParkingSession>, SeedError> {
    let seed: SeedFile = serde_json::from_str(contents)?;
    seed.sessions
        .into_iter()
        .map(|session| {
            Ok(ParkingSession {
                slot_id: session.slot_id,
                entry_time: parse_timestamp(&session.entry_time)?,
                exit_time: session
                    .exit_time
                    .as_deref()
                    .map(parse_timestamp)
                    .transpose()?,
            })
        })
        .collect()
}

#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<Vec<ParkingSession>>,
}

impl InMemorySessionStore {
    pub fn new(sessions: Vec<ParkingSession>) -> Self {
        Self {
            sessions: RwLock::new(sessions),
        }
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, SeedError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(Self::new(parse_seed(&contents)?))
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        let guard = self.sessions.read().map_err(|_| StoreError::Lock)?;
        Ok(guard.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    fn overlapping(&self, window: &TimeWindow) -> Result<Vec<ParkingSession>, StoreError> {
        let guard = self.sessions.read().map_err(|_| StoreError::Lock)?;
        Ok(guard
            .iter()
            .filter(|session| session.overlaps(window))
            .cloned()
            .collect())
    }
}

impl SessionStore for InMemorySessionStore {
    async fn fetch_sessions(&self, window: TimeWindow) -> Result<Vec<ParkingSession>, StoreError> {
        let sessions = self.overlapping(&window)?;
        debug!(
            count = sessions.len(),
            window_start = %window.start(),
            window_end = %window.end(),
            "Fetched sessions from memory store"
        );
        Ok(sessions)
    }
}

/// Registry reporting a fixed, configured slot count.
#[derive(Debug, Clone, Copy)]
pub struct FixedCapacityRegistry {
    capacity: u32,
}

impl FixedCapacityRegistry {
    pub fn new(capacity: u32) -> Self {
        Self { capacity }
    }
}

impl SlotRegistry for FixedCapacityRegistry {
    async fn total_capacity(&self) -> Result<u32, StoreError> {
        Ok(self.capacity)
    }
}
