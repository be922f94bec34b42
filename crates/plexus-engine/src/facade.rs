//! The assembled engine: query entry point, feedback entry point, the
//! trace registry that connects them, and the decay sweeper lifecycle.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use dashmap::DashMap;
use tracing::warn;

use plexus_authority::AuthorityCalculator;
use plexus_bridge::BridgeIndex;
use plexus_core::config::PlexusConfig;
use plexus_core::errors::{LearningError, PlexusResult};
use plexus_core::feedback::{FeedbackEvent, ValidationOutcome};
use plexus_core::types::{
    FeedbackLevel, NodeId, ParameterSnapshot, RetrievalTrace, TraceId, UserId,
};
use plexus_decay::{DecayManager, DecaySweeper};
use plexus_learning::store::ParameterStore;
use plexus_learning::{FeedbackAck, LearningEngine};
use plexus_retrieval::{RetrievalEngine, RetrievalOutput};
use plexus_storage::StorageEngine;

pub struct Plexus {
    config: PlexusConfig,
    retrieval: RetrievalEngine,
    learning: LearningEngine,
    store: Arc<ParameterStore>,
    authority: Arc<AuthorityCalculator>,
    bridge: Arc<BridgeIndex>,
    traces: DashMap<TraceId, RetrievalTrace>,
    /// Insertion order of pending traces, for bounded eviction.
    trace_order: Mutex<VecDeque<TraceId>>,
    storage: Option<Arc<StorageEngine>>,
}

impl Plexus {
    pub(crate) fn assemble(
        config: PlexusConfig,
        retrieval: RetrievalEngine,
        learning: LearningEngine,
        store: Arc<ParameterStore>,
        authority: Arc<AuthorityCalculator>,
        bridge: Arc<BridgeIndex>,
        storage: Option<Arc<StorageEngine>>,
    ) -> Self {
        Self {
            config,
            retrieval,
            learning,
            store,
            authority,
            bridge,
            traces: DashMap::new(),
            trace_order: Mutex::new(VecDeque::new()),
            storage,
        }
    }

    /// Run one query. The trace is registered so later feedback can be
    /// credited against exactly the parameters this query used.
    pub async fn retrieve(
        &self,
        query_embedding: &[f32],
        anchors: &[NodeId],
        domain: &str,
        top_k: usize,
    ) -> PlexusResult<RetrievalOutput> {
        let snapshot = Arc::new(self.store.snapshot());
        let output = self
            .retrieval
            .retrieve(query_embedding, anchors, domain, top_k, snapshot)
            .await?;
        self.traces
            .insert(output.trace.trace_id.clone(), output.trace.clone());
        self.note_trace(output.trace.trace_id.clone());
        Ok(output)
    }

    /// Ingest one feedback event against a registered trace and mirror
    /// the resulting state to storage when configured. A successfully
    /// applied event consumes its trace.
    pub fn ingest_feedback(&self, event: &FeedbackEvent) -> PlexusResult<FeedbackAck> {
        let trace = self
            .traces
            .get(&event.trace_id)
            .map(|t| t.clone())
            .ok_or_else(|| LearningError::UnknownTrace(event.trace_id.to_string()))?;
        let ack = self.learning.ingest(event, &trace)?;
        self.traces.remove(&event.trace_id);
        self.mirror_to_storage();
        Ok(ack)
    }

    /// Record a consensus outcome for a user's past feedback.
    pub fn resolve_consensus(
        &self,
        user: &UserId,
        level: FeedbackLevel,
        domain: &str,
        outcome: ValidationOutcome,
    ) {
        self.learning.resolve_consensus(user, level, domain, outcome);
        if let Some(storage) = &self.storage {
            if let Err(e) = storage.save_authority_records(&self.authority.all_records()) {
                warn!(error = %e, "authority records not persisted");
            }
        }
    }

    /// Set a user's externally assigned baseline credential.
    pub fn set_baseline_credential(&self, user: &UserId, credential: f64) {
        self.authority.set_baseline_credential(user, credential);
    }

    /// Authority score a user currently carries for (level, domain).
    pub fn get_authority(&self, user: &UserId, level: FeedbackLevel, domain: &str) -> f64 {
        self.authority.get_authority(user, level, domain)
    }

    /// Point-in-time copy of every learnable parameter.
    pub fn parameter_snapshot(&self) -> ParameterSnapshot {
        self.store.snapshot()
    }

    /// A registered trace, if the engine still holds it.
    pub fn trace(&self, trace_id: &TraceId) -> Option<RetrievalTrace> {
        self.traces.get(trace_id).map(|t| t.clone())
    }

    /// Run one decay sweep immediately.
    pub fn run_decay_sweep(&self) -> PlexusResult<plexus_decay::SweepReport> {
        let manager = DecayManager::new(Arc::clone(&self.store), self.config.decay.clone());
        let report = manager.sweep()?;
        self.mirror_to_storage();
        Ok(report)
    }

    /// Spawn the scheduled decay task. The returned sweeper is the
    /// cancellation handle; dropping it does not stop the task, calling
    /// [`DecaySweeper::shutdown`] does.
    pub fn spawn_decay_sweeper(&self) -> DecaySweeper {
        let manager = Arc::new(DecayManager::new(
            Arc::clone(&self.store),
            self.config.decay.clone(),
        ));
        DecaySweeper::spawn(
            manager,
            Duration::from_secs(self.config.decay.sweep_interval_secs),
        )
    }

    /// Record insertion order and hold the registry to its configured
    /// bound, oldest first. A trace consumed by feedback has already left
    /// the map; popping its id here is a no-op.
    fn note_trace(&self, trace_id: TraceId) {
        let mut order = self
            .trace_order
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        order.push_back(trace_id);
        while order.len() > self.config.learning.max_pending_traces {
            if let Some(oldest) = order.pop_front() {
                self.traces.remove(&oldest);
            }
        }
    }

    /// Mirror parameters, bridge weights, and the change log to disk.
    /// The in-memory state stays authoritative; a failed change-log batch
    /// is requeued and drained again at the next write.
    fn mirror_to_storage(&self) {
        let Some(storage) = &self.storage else {
            return;
        };
        let changes = self.store.drain_log();
        if !changes.is_empty() {
            if let Err(e) = storage.append_change_log(&changes) {
                warn!(error = %e, pending = changes.len(), "change log not persisted, requeued");
                self.store.requeue_log(changes);
            }
        }
        let snapshot = self.store.snapshot();
        let ages = self.store.traversal_ages();
        if let Err(e) = storage.save_parameters(&snapshot, &ages) {
            warn!(error = %e, "parameters not persisted");
        }
        if let Err(e) = storage.save_bridge_mappings(&self.bridge.all_mappings()) {
            warn!(error = %e, "bridge mappings not persisted");
        }
    }
}
