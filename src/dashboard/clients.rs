//! Per-visitor state.
//!
//! Each browser tab gets its own `Viewer` (featured carousel, demo player,
//! workflow builder) and each chat widget its own transcript. Both are kept
//! in a `ClientMap` keyed by a server-minted id that the client echoes
//! back. Entries expire after a period of inactivity and the map never
//! grows past its capacity.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::builder::WorkflowBuilder;
use crate::carousel::CarouselHandle;
use crate::simulator::DemoPlayerHandle;

struct Client<T> {
    value: Arc<T>,
    last_seen: DateTime<Utc>,
}

pub struct ClientMap<T> {
    idle_ttl: Duration,
    capacity: usize,
    entries: HashMap<Uuid, Client<T>>,
}

impl<T> ClientMap<T> {
    pub fn new(idle_ttl: Duration, capacity: usize) -> Self {
        Self {
            idle_ttl,
            capacity: capacity.max(1),
            entries: HashMap::new(),
        }
    }

    /// Look up a client and mark it as seen.
    pub fn get(&mut self, id: Uuid) -> Option<Arc<T>> {
        self.get_at(id, Utc::now())
    }

    pub fn get_at(&mut self, id: Uuid, now: DateTime<Utc>) -> Option<Arc<T>> {
        let client = self.entries.get_mut(&id)?;
        client.last_seen = now;
        Some(client.value.clone())
    }

    /// Track a new client under a fresh id.
    pub fn insert(&mut self, value: T) -> (Uuid, Arc<T>) {
        self.insert_at(value, Utc::now())
    }

    pub fn insert_at(&mut self, value: T, now: DateTime<Utc>) -> (Uuid, Arc<T>) {
        if self.entries.len() >= self.capacity {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|(_, c)| c.last_seen)
                .map(|(id, _)| *id);
            if let Some(oldest) = oldest {
                self.entries.remove(&oldest);
                debug!(%oldest, capacity = self.capacity, "Client map full, evicted oldest");
            }
        }
        let id = Uuid::new_v4();
        let value = Arc::new(value);
        self.entries.insert(
            id,
            Client {
                value: value.clone(),
                last_seen: now,
            },
        );
        (id, value)
    }

    /// Return the client for `id` if it is known, otherwise build a new one
    /// with `make`. Unknown ids are never adopted; the new client gets a
    /// fresh id.
    pub fn get_or_insert_with<E>(
        &mut self,
        id: Option<Uuid>,
        make: impl FnOnce() -> Result<T, E>,
    ) -> Result<(Uuid, Arc<T>), E> {
        if let Some(id) = id {
            if let Some(value) = self.get(id) {
                return Ok((id, value));
            }
        }
        Ok(self.insert(make()?))
    }

    pub fn remove(&mut self, id: Uuid) -> Option<Arc<T>> {
        self.entries.remove(&id).map(|c| c.value)
    }

    /// Drop clients idle for longer than the ttl. Returns how many went.
    pub fn purge_idle(&mut self) -> usize {
        self.purge_idle_at(Utc::now())
    }

    pub fn purge_idle_at(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        let ttl = self.idle_ttl;
        self.entries.retain(|_, c| now - c.last_seen <= ttl);
        before - self.entries.len()
    }

    pub fn drain(&mut self) -> Vec<Arc<T>> {
        self.entries.drain().map(|(_, c)| c.value).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One open landing page.
pub struct Viewer {
    pub carousel: CarouselHandle,
    pub demos: DemoPlayerHandle,
    pub builder: Mutex<WorkflowBuilder>,
}

impl Viewer {
    pub fn new(carousel: CarouselHandle, demos: DemoPlayerHandle) -> Self {
        Self {
            carousel,
            demos,
            builder: Mutex::new(WorkflowBuilder::default()),
        }
    }

    /// Stop both driver tasks and wait for them.
    pub async fn shutdown(self) {
        self.carousel.shutdown().await;
        self.demos.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map() -> ClientMap<String> {
        ClientMap::new(Duration::minutes(30), 3)
    }

    #[test]
    fn test_insert_and_get() {
        let mut m = map();
        let (id, value) = m.insert("a".to_string());
        assert_eq!(*value, "a");
        assert_eq!(m.get(id).as_deref().map(String::as_str), Some("a"));
        assert!(m.get(Uuid::new_v4()).is_none());
        assert_eq!(m.len(), 1);
    }

    #[test]
    fn test_unknown_id_gets_fresh_client() {
        let mut m = map();
        let made_up = Uuid::new_v4();
        let (id, _) = m
            .get_or_insert_with(Some(made_up), || Ok::<_, ()>("x".to_string()))
            .unwrap();
        assert_ne!(id, made_up);

        let (again, _) = m
            .get_or_insert_with(Some(id), || Ok::<_, ()>("y".to_string()))
            .unwrap();
        assert_eq!(again, id);
        assert_eq!(m.len(), 1);
    }

    #[test]
    fn test_purge_idle() {
        let mut m = map();
        let t0 = Utc::now();
        let (stale, _) = m.insert_at("stale".to_string(), t0);
        let (busy, _) = m.insert_at("busy".to_string(), t0);
        m.get_at(busy, t0 + Duration::minutes(20));

        assert_eq!(m.purge_idle_at(t0 + Duration::minutes(31)), 1);
        assert!(m.get(stale).is_none());
        assert!(m.get(busy).is_some());
    }

    #[test]
    fn test_capacity_evicts_least_recent() {
        let mut m = map();
        let t0 = Utc::now();
        let (a, _) = m.insert_at("a".to_string(), t0);
        let (b, _) = m.insert_at("b".to_string(), t0 + Duration::seconds(1));
        let (c, _) = m.insert_at("c".to_string(), t0 + Duration::seconds(2));
        m.get_at(a, t0 + Duration::seconds(3));

        let (d, _) = m.insert_at("d".to_string(), t0 + Duration::seconds(4));
        assert_eq!(m.len(), 3);
        assert!(m.get(b).is_none());
        for id in [a, c, d] {
            assert!(m.get(id).is_some());
        }
    }

    #[test]
    fn test_drain_empties() {
        let mut m = map();
        m.insert("a".to_string());
        m.insert("b".to_string());
        assert_eq!(m.drain().len(), 2);
        assert!(m.is_empty());
    }
}
