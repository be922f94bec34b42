//! Builder: loads externally produced content, graph structure, and
//! bridge mappings, then assembles the engine. When a storage path is
//! given, persisted parameters, mappings, and authority records are
//! restored over the priors at build time.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use plexus_authority::AuthorityCalculator;
use plexus_bridge::BridgeIndex;
use plexus_core::config::PlexusConfig;
use plexus_core::errors::PlexusResult;
use plexus_core::traits::IBridgeIndex;
use plexus_core::types::{BridgeMapping, Chunk, GraphNode, ParamKey};
use plexus_learning::store::{ParamValue, ParameterStore};
use plexus_learning::{LearningEngine, PolicyGradientUpdater};
use plexus_retrieval::{GraphStore, InMemoryVectorIndex, RetrievalEngine};
use plexus_storage::StorageEngine;

use crate::facade::Plexus;

pub struct PlexusBuilder {
    config: PlexusConfig,
    embedding_dim: usize,
    vector: InMemoryVectorIndex,
    graph: GraphStore,
    bridge: Arc<BridgeIndex>,
    mappings: Vec<BridgeMapping>,
    storage_path: Option<PathBuf>,
}

impl PlexusBuilder {
    pub fn new(config: PlexusConfig, embedding_dim: usize) -> Self {
        Self {
            config,
            embedding_dim,
            vector: InMemoryVectorIndex::new(),
            graph: GraphStore::new(),
            bridge: Arc::new(BridgeIndex::new()),
            mappings: Vec::new(),
            storage_path: None,
        }
    }

    /// Persist to and restore from a SQLite file at this path.
    pub fn with_storage(mut self, path: impl Into<PathBuf>) -> Self {
        self.storage_path = Some(path.into());
        self
    }

    pub fn add_chunk(mut self, chunk: Chunk) -> Self {
        self.bridge.register_chunk(chunk.id.clone());
        self.vector.insert(&chunk);
        self
    }

    pub fn add_node(mut self, node: GraphNode) -> Self {
        self.bridge.register_node(node.id.clone());
        self.graph.insert(&node);
        self
    }

    /// Queue a chunk-to-node mapping. Applied at build, after every chunk
    /// and node is registered.
    pub fn add_mapping(mut self, mapping: BridgeMapping) -> Self {
        self.mappings.push(mapping);
        self
    }

    pub fn build(self) -> PlexusResult<Plexus> {
        self.config.validate()?;

        for mapping in &self.mappings {
            self.bridge.upsert_mapping(mapping.clone())?;
        }

        let store = Arc::new(ParameterStore::from_priors(
            self.embedding_dim,
            &self.config.learning,
        ));
        let authority = Arc::new(AuthorityCalculator::new(self.config.authority.clone()));

        let storage = match &self.storage_path {
            Some(path) => {
                let storage = Arc::new(StorageEngine::open(path)?);
                restore_state(&storage, &store, &self.bridge, &authority)?;
                Some(storage)
            }
            None => None,
        };

        let retrieval = RetrievalEngine::new(
            Arc::new(self.vector),
            Arc::clone(&self.bridge) as Arc<dyn IBridgeIndex>,
            Arc::new(self.graph),
            self.config.retrieval.clone(),
        );
        let updater = PolicyGradientUpdater::new(
            Arc::clone(&store),
            Arc::clone(&self.bridge) as Arc<dyn IBridgeIndex>,
            self.config.learning.clone(),
        );
        let learning = LearningEngine::new(updater, Arc::clone(&authority));

        info!(
            embedding_dim = self.embedding_dim,
            persistent = storage.is_some(),
            "engine assembled"
        );
        Ok(Plexus::assemble(
            self.config,
            retrieval,
            learning,
            store,
            authority,
            self.bridge,
            storage,
        ))
    }
}

/// Overlay persisted state onto the freshly seeded components.
fn restore_state(
    storage: &StorageEngine,
    store: &ParameterStore,
    bridge: &BridgeIndex,
    authority: &AuthorityCalculator,
) -> PlexusResult<()> {
    let params = storage.load_parameters()?;
    for (strategy, relation, weight, updated_at) in params.traversals {
        store.restore_traversal(strategy, relation, weight, updated_at);
    }
    for (strategy, value) in params.alphas {
        store.restore(ParamKey::Alpha(strategy), ParamValue::Scalar(value));
    }
    for (strategy, weights, bias) in params.gating_rows {
        store.restore(
            ParamKey::GatingRow(strategy),
            ParamValue::GatingRow { weights, bias },
        );
    }
    if let Some(weights) = params.rerank {
        store.restore(ParamKey::Rerank, ParamValue::Rerank(weights));
    }

    // Mappings referencing content that was not re-ingested are kept on
    // disk but not resurrected in memory.
    for mapping in storage.load_bridge_mappings()? {
        if let Err(e) = bridge.upsert_mapping(mapping.clone()) {
            warn!(
                chunk = %mapping.chunk_id,
                node = %mapping.node_id,
                error = %e,
                "persisted mapping skipped"
            );
            continue;
        }
        // upsert preserves a live learned weight; force the persisted one.
        let current = bridge
            .get_nodes_for_chunk(&mapping.chunk_id)?
            .into_iter()
            .find(|l| l.node_id == mapping.node_id && l.relation == mapping.relation);
        if let Some(link) = current {
            let delta = mapping.weight.value() - link.weight.value();
            if delta != 0.0 {
                bridge.update_weight(
                    &mapping.chunk_id,
                    &mapping.node_id,
                    mapping.relation,
                    delta,
                )?;
            }
        }
    }

    for record in storage.load_authority_records()? {
        authority.restore(record);
    }
    Ok(())
}
