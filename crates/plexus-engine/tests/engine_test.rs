use chrono::Utc;

use plexus_core::config::PlexusConfig;
use plexus_core::errors::{LearningError, PlexusError};
use plexus_core::feedback::{FeedbackEvent, LayerJudgments, RetrievalJudgment, SynthesisJudgment};
use plexus_core::types::{
    BridgeMapping, Chunk, ContentType, FeedbackLevel, GraphNode, NodeType, RelationType,
    StrategyId, Weight,
};
use plexus_engine::PlexusBuilder;

const DIM: usize = 4;

fn builder() -> PlexusBuilder {
    builder_with(PlexusConfig::default())
}

fn builder_with(config: PlexusConfig) -> PlexusBuilder {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    PlexusBuilder::new(config, DIM)
        .add_chunk(Chunk::new(
            "chunk-def",
            vec![1.0, 0.0, 0.0, 0.0],
            ContentType::Definition,
        ))
        .add_chunk(Chunk::new(
            "chunk-far",
            vec![0.0, 1.0, 0.0, 0.0],
            ContentType::Narrative,
        ))
        .add_node(GraphNode::new("node-root", NodeType::Concept).with_edge(
            "node-leaf",
            RelationType::Defines,
        ))
        .add_node(GraphNode::new("node-leaf", NodeType::Entity))
        .add_mapping(BridgeMapping::new(
            "chunk-def",
            "node-leaf",
            RelationType::Defines,
            Weight::new(0.8),
            Weight::new(0.9),
        ))
}

fn feedback(trace_id: &str, id: &str) -> FeedbackEvent {
    FeedbackEvent {
        id: id.into(),
        trace_id: trace_id.into(),
        user_id: "reviewer".into(),
        domain: "physics".into(),
        judgments: LayerJudgments {
            retrieval: RetrievalJudgment {
                sources_relevant: Some(true),
                sources_complete: Some(true),
                ranking_quality: Some(0.9),
            },
            synthesis: SynthesisJudgment {
                answer_correct: Some(true),
                ranking_correct: Some(0.8),
            },
            ..Default::default()
        },
        iterations_from_final: 0,
        timestamp: Utc::now(),
    }
}

#[tokio::test]
async fn query_feedback_loop_moves_parameters() {
    let plexus = builder().build().unwrap();
    let before = plexus.parameter_snapshot();

    let output = plexus
        .retrieve(&[1.0, 0.0, 0.0, 0.0], &["node-root".into()], "physics", 5)
        .await
        .unwrap();
    assert!(!output.combined.is_empty());
    assert_eq!(output.combined[0].chunk_id.as_str(), "chunk-def");

    let ack = plexus
        .ingest_feedback(&feedback(output.trace.trace_id.as_str(), "fb-1"))
        .unwrap();
    assert!(ack.updates_applied > 0);

    let after = plexus.parameter_snapshot();
    assert!(after.version > before.version);
    let w_before = before.strategies[&StrategyId::Semantic].traversal_weights
        [&RelationType::Defines]
        .value();
    let w_after = after.strategies[&StrategyId::Semantic].traversal_weights
        [&RelationType::Defines]
        .value();
    assert!(w_after > w_before);
}

#[tokio::test]
async fn feedback_against_unknown_trace_is_rejected() {
    let plexus = builder().build().unwrap();
    let err = plexus
        .ingest_feedback(&feedback("no-such-trace", "fb-x"))
        .unwrap_err();
    assert!(matches!(err, PlexusError::Learning(_)));
}

#[tokio::test]
async fn learned_state_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plexus.db");

    let version_after_learning;
    {
        let plexus = builder().with_storage(&path).build().unwrap();
        let output = plexus
            .retrieve(&[1.0, 0.0, 0.0, 0.0], &["node-root".into()], "physics", 5)
            .await
            .unwrap();
        plexus
            .ingest_feedback(&feedback(output.trace.trace_id.as_str(), "fb-persist"))
            .unwrap();
        version_after_learning = plexus.parameter_snapshot();
    }

    let reopened = builder().with_storage(&path).build().unwrap();
    let restored = reopened.parameter_snapshot();
    let learned = version_after_learning.strategies[&StrategyId::Semantic].traversal_weights
        [&RelationType::Defines]
        .value();
    let recovered = restored.strategies[&StrategyId::Semantic].traversal_weights
        [&RelationType::Defines]
        .value();
    assert!((learned - recovered).abs() < 1e-9);
    assert!(
        (version_after_learning.alpha(StrategyId::Semantic, 0.0)
            - restored.alpha(StrategyId::Semantic, 0.0))
        .abs()
            < 1e-9
    );
}

#[tokio::test]
async fn consensus_shapes_authority_weighting() {
    let plexus = builder().build().unwrap();
    let user: plexus_core::types::UserId = "reviewer".into();

    let neutral = plexus.get_authority(&user, FeedbackLevel::Retrieval, "physics");
    assert!((neutral - 0.5).abs() < 1e-12);

    for _ in 0..10 {
        plexus.resolve_consensus(
            &user,
            FeedbackLevel::Retrieval,
            "physics",
            plexus_core::feedback::ValidationOutcome::Confirmed,
        );
    }
    let raised = plexus.get_authority(&user, FeedbackLevel::Retrieval, "physics");
    assert!(raised > neutral);

    plexus.set_baseline_credential(&user, 1.0);
    let credentialed = plexus.get_authority(&user, FeedbackLevel::Retrieval, "physics");
    assert!(credentialed > raised);
}

#[tokio::test]
async fn ingested_feedback_consumes_the_trace() {
    let plexus = builder().build().unwrap();
    let output = plexus
        .retrieve(&[1.0, 0.0, 0.0, 0.0], &["node-root".into()], "physics", 5)
        .await
        .unwrap();
    let trace_id = output.trace.trace_id.clone();

    plexus
        .ingest_feedback(&feedback(trace_id.as_str(), "fb-consume"))
        .unwrap();
    assert!(plexus.trace(&trace_id).is_none());

    // A later event against the consumed trace no longer resolves.
    let err = plexus
        .ingest_feedback(&feedback(trace_id.as_str(), "fb-late"))
        .unwrap_err();
    assert!(matches!(
        err,
        PlexusError::Learning(LearningError::UnknownTrace(_))
    ));
}

#[tokio::test]
async fn trace_registry_is_bounded() {
    let mut config = PlexusConfig::default();
    config.learning.max_pending_traces = 2;
    let plexus = builder_with(config).build().unwrap();

    let mut ids = Vec::new();
    for _ in 0..3 {
        let output = plexus
            .retrieve(&[1.0, 0.0, 0.0, 0.0], &["node-root".into()], "physics", 5)
            .await
            .unwrap();
        ids.push(output.trace.trace_id.clone());
    }

    // The oldest trace was evicted; the newer two are still pending.
    assert!(plexus.trace(&ids[0]).is_none());
    assert!(plexus.trace(&ids[1]).is_some());
    assert!(plexus.trace(&ids[2]).is_some());
}

#[tokio::test]
async fn manual_decay_sweep_reports() {
    let plexus = builder().build().unwrap();
    // Everything was just initialized, so nothing is stale.
    let report = plexus.run_decay_sweep().unwrap();
    assert_eq!(report.decayed, 0);
    assert!(report.examined > 0);
}

#[tokio::test]
async fn scheduled_sweeper_starts_and_stops() {
    let plexus = builder().build().unwrap();
    let sweeper = plexus.spawn_decay_sweeper();
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    sweeper.shutdown().await;
}

#[tokio::test]
async fn duplicate_feedback_is_counted_once() {
    let plexus = builder().build().unwrap();
    let output = plexus
        .retrieve(&[1.0, 0.0, 0.0, 0.0], &["node-root".into()], "physics", 5)
        .await
        .unwrap();
    let event = feedback(output.trace.trace_id.as_str(), "fb-once");
    plexus.ingest_feedback(&event).unwrap();
    let version = plexus.parameter_snapshot().version;
    assert!(plexus.ingest_feedback(&event).is_err());
    assert_eq!(plexus.parameter_snapshot().version, version);
}
