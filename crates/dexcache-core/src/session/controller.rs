//! The browse session controller.
//!
//! This module contains `BrowseSession`, which owns the in-memory catalog,
//! its gender classification, the filtered view, the current selection and
//! the image state for that selection.
//!
//! Selection uses generation-based cancellation: every selection change bumps
//! `selection_generation`, and a background detail result is applied only if
//! it carries the current generation. The previous detail task is also
//! aborted, but the generation check is what keeps late results out.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use super::events::{FetchOperation, ImageSource, SessionEvent};
use crate::api::RemoteFetchError;
use crate::cache::ImageCache;
use crate::models::{CatalogEntry, ClassificationSet, DetailedEntry, FilterMode};
use crate::service::{CatalogService, FEMALE_GROUP_ID, MALE_GROUP_ID};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background detail result channel.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Buffer size for the state-change broadcast channel.
const EVENT_BUFFER_SIZE: usize = 64;

// ============================================================================
// Background Task Results
// ============================================================================

/// Result of a background detail fetch, tagged with the selection
/// generation that started it.
#[derive(Debug)]
struct DetailOutcome {
    generation: u64,
    entry_id: i64,
    result: Result<DetailedEntry, RemoteFetchError>,
}

/// Raises the downloading flag for its lifetime.
///
/// Dropping the guard lowers the flag on every exit path, including when
/// the owning future is dropped mid-download.
struct DownloadFlag<'a> {
    flag: &'a mut bool,
    events: &'a broadcast::Sender<SessionEvent>,
}

impl<'a> DownloadFlag<'a> {
    fn raise(flag: &'a mut bool, events: &'a broadcast::Sender<SessionEvent>) -> Self {
        *flag = true;
        let _ = events.send(SessionEvent::DownloadStateChanged(true));
        Self { flag, events }
    }
}

impl Drop for DownloadFlag<'_> {
    fn drop(&mut self) {
        *self.flag = false;
        let _ = self.events.send(SessionEvent::DownloadStateChanged(false));
    }
}

// ============================================================================
// Browse Session
// ============================================================================

/// Owner of all browse state.
///
/// Every mutation happens through `&mut self`, on whichever task owns the
/// session. `select` must be called from within a tokio runtime since it
/// spawns the detail fetch.
pub struct BrowseSession {
    // Services
    service: Arc<CatalogService>,
    images: ImageCache,

    // Catalog state
    catalog: Vec<CatalogEntry>,
    filtered: Vec<CatalogEntry>,
    classification: ClassificationSet,
    filter_mode: FilterMode,

    // Selection state
    selection: Option<DetailedEntry>,
    selection_generation: u64,
    image: Option<Vec<u8>>,
    is_downloading: bool,

    /// In-memory mirror of the image cache, keyed by entry id
    image_mirror: HashMap<i64, Vec<u8>>,

    // Background task channel
    detail_task: Option<JoinHandle<()>>,
    detail_tx: mpsc::Sender<DetailOutcome>,
    detail_rx: mpsc::Receiver<DetailOutcome>,

    events: broadcast::Sender<SessionEvent>,
}

impl BrowseSession {
    pub fn new(service: Arc<CatalogService>, images: ImageCache) -> Self {
        let (detail_tx, detail_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let (events, _) = broadcast::channel(EVENT_BUFFER_SIZE);

        Self {
            service,
            images,
            catalog: Vec::new(),
            filtered: Vec::new(),
            classification: ClassificationSet::default(),
            filter_mode: FilterMode::All,
            selection: None,
            selection_generation: 0,
            image: None,
            is_downloading: false,
            image_mirror: HashMap::new(),
            detail_task: None,
            detail_tx,
            detail_rx,
            events,
        }
    }

    /// Subscribe to state-change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    // =========================================================================
    // Observable State
    // =========================================================================

    pub fn catalog(&self) -> &[CatalogEntry] {
        &self.catalog
    }

    pub fn filtered(&self) -> &[CatalogEntry] {
        &self.filtered
    }

    pub fn classification(&self) -> &ClassificationSet {
        &self.classification
    }

    pub fn filter_mode(&self) -> FilterMode {
        self.filter_mode
    }

    pub fn selection(&self) -> Option<&DetailedEntry> {
        self.selection.as_ref()
    }

    pub fn selection_generation(&self) -> u64 {
        self.selection_generation
    }

    pub fn image(&self) -> Option<&[u8]> {
        self.image.as_deref()
    }

    pub fn is_downloading(&self) -> bool {
        self.is_downloading
    }

    /// Mirrored image for a list row, if one has been loaded.
    pub fn cached_image(&self, id: i64) -> Option<&[u8]> {
        self.image_mirror.get(&id).map(Vec::as_slice)
    }

    /// Whether a detail fetch for the current selection is still outstanding.
    pub fn has_pending_detail(&self) -> bool {
        self.detail_task.is_some()
    }

    /// Look up a catalog entry by numeric id or case-insensitive name.
    pub fn find(&self, key: &str) -> Option<&CatalogEntry> {
        match key.parse::<i64>() {
            Ok(id) => self.catalog.iter().find(|e| e.id == id),
            Err(_) => self.catalog.iter().find(|e| e.name.eq_ignore_ascii_case(key)),
        }
    }

    // =========================================================================
    // Catalog Loading
    // =========================================================================

    /// Load catalog and classification once. No-op if already loaded.
    pub async fn load_initial(&mut self) {
        if !self.catalog.is_empty() {
            debug!("Catalog already loaded");
            return;
        }
        self.load_catalog(false).await;
    }

    /// Reload from the remote service, keeping the active filter mode.
    pub async fn refresh(&mut self) {
        self.load_catalog(true).await;
    }

    async fn load_catalog(&mut self, refresh: bool) {
        info!(refresh, "Loading catalog");
        let service = &self.service;

        let catalog = async {
            if refresh {
                service.refresh_catalog().await
            } else {
                service.fetch_catalog().await
            }
        };

        let joined = tokio::try_join!(
            catalog,
            service.fetch_classification(MALE_GROUP_ID),
            service.fetch_classification(FEMALE_GROUP_ID),
        );

        match joined {
            Ok((catalog, male, female)) => {
                let classification = ClassificationSet::from_groups(&male, &female);
                let mode = if refresh { self.filter_mode } else { FilterMode::All };
                self.publish_catalog(catalog, classification, mode);
            }
            Err(e) => {
                error!(error = %e, refresh, "Failed to load catalog");
                self.emit(SessionEvent::FetchFailed {
                    operation: FetchOperation::Catalog,
                    message: e.to_string(),
                });
            }
        }
    }

    fn publish_catalog(
        &mut self,
        catalog: Vec<CatalogEntry>,
        classification: ClassificationSet,
        mode: FilterMode,
    ) {
        self.catalog = catalog;
        self.classification = classification;
        self.filter_mode = mode;
        self.filtered = self.classification.apply(&self.catalog, mode);
        self.mirror_cached_images();

        info!(
            count = self.catalog.len(),
            male = self.classification.male_names.len(),
            female = self.classification.female_names.len(),
            "Catalog published"
        );
        self.emit(SessionEvent::CatalogLoaded {
            count: self.catalog.len(),
        });
    }

    /// Probe the image cache for every catalog entry not yet mirrored.
    fn mirror_cached_images(&mut self) {
        let mut mirrored = 0;
        for entry in &self.catalog {
            if self.image_mirror.contains_key(&entry.id) {
                continue;
            }
            if let Some(data) = self.images.load(entry.id) {
                self.image_mirror.insert(entry.id, data);
                mirrored += 1;
            }
        }
        debug!(mirrored, "Cached images mirrored");
    }

    // =========================================================================
    // Filtering
    // =========================================================================

    pub fn apply_filter(&mut self, mode: FilterMode) {
        self.filter_mode = mode;
        self.filtered = self.classification.apply(&self.catalog, mode);
        debug!(mode = %mode, count = self.filtered.len(), "Filter applied");
        self.emit(SessionEvent::FilterApplied {
            mode,
            count: self.filtered.len(),
        });
    }

    // =========================================================================
    // Selection
    // =========================================================================

    pub fn select(&mut self, entry: CatalogEntry) {
        self.set_selection(Some(entry));
    }

    pub fn clear_selection(&mut self) {
        self.set_selection(None);
    }

    fn set_selection(&mut self, entry: Option<CatalogEntry>) {
        self.selection_generation += 1;
        let generation = self.selection_generation;

        if let Some(task) = self.detail_task.take() {
            task.abort();
        }
        self.image = None;
        self.selection = entry.clone();
        self.emit(SessionEvent::SelectionChanged {
            id: entry.as_ref().map(|e| e.id),
            generation,
        });

        let Some(entry) = entry else {
            return;
        };

        if entry.is_detail_complete() {
            if let Some(data) = self.image_mirror.get(&entry.id) {
                self.image = Some(data.clone());
                self.emit(SessionEvent::ImageResolved {
                    id: entry.id,
                    source: ImageSource::Memory,
                });
            }
            return;
        }

        self.spawn_detail_fetch(generation, entry);
    }

    fn spawn_detail_fetch(&mut self, generation: u64, entry: CatalogEntry) {
        debug!(id = entry.id, generation, "Fetching detail");
        let service = Arc::clone(&self.service);
        let tx = self.detail_tx.clone();

        self.detail_task = Some(tokio::spawn(async move {
            let result = service.fetch_detail(&entry).await;
            let outcome = DetailOutcome {
                generation,
                entry_id: entry.id,
                result,
            };
            if tx.send(outcome).await.is_err() {
                debug!(id = entry.id, "Session dropped before detail fetch completed");
            }
        }));
    }

    // =========================================================================
    // Background Task Results
    // =========================================================================

    /// Apply every detail result that has already arrived. Returns how many
    /// results were taken off the channel.
    pub fn check_background_tasks(&mut self) -> usize {
        let mut processed = 0;
        while let Ok(outcome) = self.detail_rx.try_recv() {
            self.apply_detail_outcome(outcome);
            processed += 1;
        }
        processed
    }

    /// Wait for the outstanding detail fetch and apply its result. Returns
    /// `false` immediately when no fetch is outstanding and nothing is queued.
    ///
    /// A task that ends without reporting (panic or abort) also ends the
    /// wait; it is reported as a failed detail fetch.
    pub async fn wait_background_task(&mut self) -> bool {
        let Some(task) = self.detail_task.as_mut() else {
            return self.check_background_tasks() > 0;
        };

        tokio::select! {
            outcome = self.detail_rx.recv() => match outcome {
                Some(outcome) => {
                    self.apply_detail_outcome(outcome);
                    true
                }
                None => false,
            },
            joined = task => {
                self.detail_task = None;
                if let Err(e) = joined {
                    error!(error = %e, "Detail fetch ended without a result");
                    self.emit(SessionEvent::FetchFailed {
                        operation: FetchOperation::Detail,
                        message: e.to_string(),
                    });
                }
                // A task that finished normally queued its outcome first
                self.check_background_tasks();
                true
            }
        }
    }

    fn apply_detail_outcome(&mut self, outcome: DetailOutcome) {
        if outcome.generation != self.selection_generation {
            debug!(
                id = outcome.entry_id,
                generation = outcome.generation,
                current = self.selection_generation,
                "Discarding stale detail result"
            );
            return;
        }
        self.detail_task = None;

        match outcome.result {
            Ok(detailed) => {
                for list in [&mut self.catalog, &mut self.filtered] {
                    if let Some(entry) = list.iter_mut().find(|e| e.id == detailed.id) {
                        entry.merge_detail(&detailed);
                    }
                }
                self.emit(SessionEvent::DetailApplied { id: detailed.id });
                self.set_selection(Some(detailed));
            }
            Err(e) => {
                error!(id = outcome.entry_id, error = %e, "Failed to fetch detail");
                self.emit(SessionEvent::FetchFailed {
                    operation: FetchOperation::Detail,
                    message: e.to_string(),
                });
            }
        }
    }

    // =========================================================================
    // Image Resolution
    // =========================================================================

    /// Resolve the image for the current selection: memory mirror, then disk
    /// cache, then network. No-op unless the selection is detail-complete
    /// and has no image yet.
    pub async fn load_image(&mut self) {
        let Some(selection) = self.selection.as_ref() else {
            return;
        };
        if !selection.is_detail_complete() || self.image.is_some() {
            return;
        }
        let id = selection.id;
        let image_url = selection.image_url.clone();

        if let Some(data) = self.image_mirror.get(&id) {
            self.image = Some(data.clone());
            self.emit(SessionEvent::ImageResolved {
                id,
                source: ImageSource::Memory,
            });
            return;
        }

        if let Some(data) = self.images.load(id) {
            self.image_mirror.insert(id, data.clone());
            self.image = Some(data);
            self.emit(SessionEvent::ImageResolved {
                id,
                source: ImageSource::Disk,
            });
            return;
        }

        let Some(url) = image_url else {
            debug!(id, "Selection has no image URL");
            return;
        };

        let result = {
            let _downloading = DownloadFlag::raise(&mut self.is_downloading, &self.events);
            self.service.download_image(&url).await
        };

        match result {
            Ok(data) => {
                debug!(id, bytes = data.len(), "Image downloaded");
                self.images.save(&data, id);
                self.image_mirror.insert(id, data.clone());
                self.image = Some(data);
                self.emit(SessionEvent::ImageResolved {
                    id,
                    source: ImageSource::Network,
                });
            }
            Err(e) => {
                error!(id, error = %e, "Failed to download image");
                self.emit(SessionEvent::FetchFailed {
                    operation: FetchOperation::Image,
                    message: e.to_string(),
                });
            }
        }
    }
}

impl Drop for BrowseSession {
    fn drop(&mut self) {
        if let Some(task) = self.detail_task.take() {
            task.abort();
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
