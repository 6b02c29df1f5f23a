//! Scripted gateway for tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::oneshot;

use super::{CatalogGateway, RemoteFetchError};
use crate::models::{WireDetail, WireEntry};

/// Kinds of gateway call, for failure injection and call counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockCall {
    Catalog,
    Group(u32),
    Detail,
    Bytes,
}

/// Gateway that serves predetermined data.
///
/// Detail and byte fetches can be held back per URL with [`MockGateway::gate`]
/// until the returned sender fires, which lets tests choose completion order.
#[derive(Default)]
pub struct MockGateway {
    catalog: Mutex<Vec<WireEntry>>,
    groups: Mutex<HashMap<u32, Vec<WireEntry>>>,
    details: Mutex<HashMap<String, WireDetail>>,
    bytes: Mutex<HashMap<String, Vec<u8>>>,
    failing: Mutex<HashSet<MockCall>>,
    panicking: Mutex<HashSet<MockCall>>,
    gates: Mutex<HashMap<String, oneshot::Receiver<()>>>,
    calls: Mutex<Vec<MockCall>>,
}

pub fn pokemon_url(id: i64) -> String {
    format!("https://pokeapi.co/api/v2/pokemon/{}/", id)
}

pub fn sprite_url(id: i64) -> String {
    format!("https://img.example/sprites/{}.png", id)
}

pub fn wire(id: i64, name: &str) -> WireEntry {
    WireEntry::new(name, pokemon_url(id))
}

pub fn wire_detail(id: i64, name: &str, height: i64, weight: i64) -> WireDetail {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "name": name,
        "height": height,
        "weight": weight,
        "sprites": { "front_default": sprite_url(id) },
    }))
    .expect("valid detail json")
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// The three starters with squirtle male and charmander female.
    pub fn starters() -> Self {
        Self::new()
            .with_catalog(vec![wire(1, "bulbasaur"), wire(4, "charmander"), wire(7, "squirtle")])
            .with_group(2, vec![wire(7, "squirtle")])
            .with_group(1, vec![wire(4, "charmander")])
            .with_detail(wire_detail(1, "bulbasaur", 7, 69))
            .with_detail(wire_detail(4, "charmander", 6, 85))
            .with_detail(wire_detail(7, "squirtle", 5, 90))
    }

    pub fn with_catalog(self, entries: Vec<WireEntry>) -> Self {
        self.set_catalog(entries);
        self
    }

    pub fn with_group(self, group_id: u32, entries: Vec<WireEntry>) -> Self {
        lock(&self.groups).insert(group_id, entries);
        self
    }

    pub fn with_detail(self, detail: WireDetail) -> Self {
        lock(&self.details).insert(pokemon_url(detail.id), detail);
        self
    }

    pub fn with_bytes(self, url: impl Into<String>, data: Vec<u8>) -> Self {
        lock(&self.bytes).insert(url.into(), data);
        self
    }

    pub fn set_catalog(&self, entries: Vec<WireEntry>) {
        *lock(&self.catalog) = entries;
    }

    pub fn fail(&self, call: MockCall) {
        lock(&self.failing).insert(call);
    }

    pub fn recover(&self, call: MockCall) {
        lock(&self.failing).remove(&call);
    }

    /// Panic inside the call instead of returning, like a crashed task.
    pub fn panic_on(&self, call: MockCall) {
        lock(&self.panicking).insert(call);
    }

    /// Hold the next fetch of `url` until the returned sender fires (or drops).
    pub fn gate(&self, url: impl Into<String>) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        lock(&self.gates).insert(url.into(), rx);
        tx
    }

    pub fn call_count(&self, call: MockCall) -> usize {
        lock(&self.calls).iter().filter(|c| **c == call).count()
    }

    fn record(&self, call: MockCall) -> Result<(), RemoteFetchError> {
        lock(&self.calls).push(call);
        if lock(&self.panicking).contains(&call) {
            panic!("mock panic: {:?}", call);
        }
        if lock(&self.failing).contains(&call) {
            Err(RemoteFetchError::ServerError(format!("mock failure: {:?}", call)))
        } else {
            Ok(())
        }
    }

    async fn wait_gate(&self, url: &str) {
        let gate = lock(&self.gates).remove(url);
        if let Some(rx) = gate {
            let _ = rx.await;
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl CatalogGateway for MockGateway {
    async fn fetch_catalog_page(&self) -> Result<Vec<WireEntry>, RemoteFetchError> {
        self.record(MockCall::Catalog)?;
        Ok(lock(&self.catalog).clone())
    }

    async fn fetch_classification_group(&self, group_id: u32) -> Result<Vec<WireEntry>, RemoteFetchError> {
        self.record(MockCall::Group(group_id))?;
        Ok(lock(&self.groups).get(&group_id).cloned().unwrap_or_default())
    }

    async fn fetch_detail_record(&self, url: &str) -> Result<WireDetail, RemoteFetchError> {
        self.wait_gate(url).await;
        self.record(MockCall::Detail)?;
        lock(&self.details)
            .get(url)
            .cloned()
            .ok_or_else(|| RemoteFetchError::NotFound(url.to_string()))
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, RemoteFetchError> {
        self.wait_gate(url).await;
        self.record(MockCall::Bytes)?;
        lock(&self.bytes)
            .get(url)
            .cloned()
            .ok_or_else(|| RemoteFetchError::NotFound(url.to_string()))
    }
}
