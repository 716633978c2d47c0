//! End-to-end synthesis scenarios over small analysis pools.

use chrono::{DateTime, Duration, TimeZone, Utc};
use pretty_assertions::assert_eq;
use weave_config::WeaveConfig;
use weave_core::enums::{ConflictType, GapType, Methodology, Severity};
use weave_core::findings::{ResolutionMethod, ResolvedValue};
use weave_core::metrics::SynthesisMetrics;
use weave_core::records::{Control, Entity, Relationship, Risk, StandardizedAnalysis, Threat};
use weave_engine::{
    AnalysisStore, ConflictResolver, RiskScorer, Synthesizer, detect_gaps,
};

fn as_of() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 1, 9, 0, 0).unwrap()
}

fn analysis(methodology: Methodology, source: &str) -> StandardizedAnalysis {
    StandardizedAnalysis::new(methodology, source, as_of() - Duration::days(3))
}

/// A mixed pool touching every engine pass.
fn mixed_pool() -> AnalysisStore {
    let stride = analysis(Methodology::Stride, "payments-review")
        .with_confidence(0.9)
        .with_entity(
            Entity::new("e1", "Payment API", "process")
                .with_criticality("critical")
                .with_exposure("internet-facing"),
        )
        .with_entity(Entity::new("e2", "Card Vault", "datastore").with_classification("pci"))
        .with_relationship(Relationship::new("r1", "e1", "e2", "data-flow"))
        .with_threat(
            Threat::new("t1", "Card data exfiltration", "information disclosure", "critical")
                .affecting("e2"),
        )
        .with_threat(Threat::new("t2", "Token replay", "spoofing", "high").affecting("e1"))
        .with_control(
            Control::new("c1", "Mutual TLS")
                .with_state("implemented")
                .protecting("e1")
                .mitigating("t2"),
        )
        .with_risk(Risk::new("k1", "Card breach", 9.0).on_entity("e2"));

    let pasta = analysis(Methodology::Pasta, "business-impact")
        .with_confidence(0.5)
        .with_entity(Entity::new("p1", "card vault", "database"))
        .with_entity(Entity::new("p2", "Payment API", "process"))
        .with_relationship(Relationship::new("pr1", "p2", "p1", "data-flow"))
        .with_entity(Entity::new("p3", "Fraud Engine", "service"))
        .with_relationship(Relationship::new("pr2", "p2", "p3", "calls"))
        .with_threat(
            Threat::new("x1", "Card data exfiltration", "data leak", "low").affecting("p1"),
        )
        .with_control(Control::new("m1", "Mutual TLS control").with_effectiveness("low"))
        .with_risk(Risk::new("k9", "Card breach", 3.0).on_entity("p1"));

    let dread = analysis(Methodology::Dread, "scoring")
        .with_threat(Threat::new("d1", "Token replay", "spoofing", "medium"))
        .with_control(Control::new("m2", "mutual tls").with_effectiveness("high"));

    [stride, pasta, dread].into_iter().collect()
}

#[test]
fn scenario_unmitigated_critical_threat_without_privacy_analysis() {
    let pool = vec![
        analysis(Methodology::Stride, "single")
            .with_entity(
                Entity::new("e1", "Customer DB", "datastore")
                    .with_criticality("critical")
                    .with_personal_data(true),
            )
            .with_threat(
                Threat::new("t1", "SQL injection", "tampering", "critical").affecting("e1"),
            ),
    ];
    let gaps = detect_gaps(&pool);

    let unmitigated: Vec<_> = gaps
        .iter()
        .filter(|g| g.gap_type == GapType::UnmitigatedThreat)
        .collect();
    assert_eq!(unmitigated.len(), 1);
    assert_eq!(unmitigated[0].severity, Severity::Critical);
    assert_eq!(unmitigated[0].affected_entities, vec!["Customer DB"]);

    let privacy: Vec<_> = gaps
        .iter()
        .filter(|g| g.gap_type == GapType::MissingPrivacyAnalysis)
        .collect();
    assert_eq!(privacy.len(), 1);
    assert_eq!(privacy[0].severity, Severity::High);
    assert_eq!(privacy[0].suggested_methodology, Some(Methodology::Linddun));
}

#[test]
fn scenario_split_risk_scores_average_with_low_confidence() {
    let pool = vec![
        analysis(Methodology::Stride, "a")
            .with_entity(Entity::new("e1", "Ledger", "datastore"))
            .with_risk(Risk::new("r1", "Ledger compromise", 9.0).on_entity("e1")),
        analysis(Methodology::Pasta, "b")
            .with_entity(Entity::new("e1", "Ledger", "datastore"))
            .with_risk(Risk::new("r1", "Ledger compromise", 3.0).on_entity("e1")),
    ];
    let config = WeaveConfig::default();
    let resolutions = ConflictResolver::new(&config, as_of()).resolve_all(&pool);

    let scores: Vec<_> = resolutions
        .iter()
        .filter(|r| r.conflict.conflict_type == ConflictType::RiskScoreMismatch)
        .collect();
    assert_eq!(scores.len(), 1);
    assert_eq!(scores[0].method, ResolutionMethod::WeightedAverage);
    assert_eq!(scores[0].resolved_value, ResolvedValue::Score(6.0));
    assert!((scores[0].confidence - 0.6).abs() < 1e-9);
}

#[test]
fn scenario_empty_pool() {
    let result = Synthesizer::default().synthesize_at(&AnalysisStore::new(), as_of());

    assert!(result.analyses.is_empty());
    assert!(result.gaps.is_empty());
    assert!(result.conflicts.is_empty());
    assert!(result.insights.is_empty());
    assert!(result.recommendations.is_empty());
    assert_eq!(result.metrics, SynthesisMetrics::default());
    assert_eq!(result.metrics.executive.overall_risk_score, 0.0);
    assert_eq!(result.metrics.executive.compliance_score, 0.0);
    assert_eq!(result.metrics.executive.coverage_score, 0.0);
}

#[test]
fn scenario_unanimous_critical_rating_is_not_a_conflict() {
    let threat = Threat::new("t1", "Privilege escalation via admin API", "eop", "critical")
        .affecting("Admin API");
    let pool: Vec<_> = [Methodology::Stride, Methodology::Pasta, Methodology::Dread]
        .into_iter()
        .map(|m| analysis(m, "run").with_threat(threat.clone()))
        .collect();
    let config = WeaveConfig::default();
    let resolutions = ConflictResolver::new(&config, as_of()).resolve_all(&pool);

    assert!(
        resolutions
            .iter()
            .all(|r| r.conflict.conflict_type != ConflictType::SeverityRatingConflict)
    );
}

#[test]
fn scenario_hub_entity_raises_systemic_risk() {
    let hub = |edges: usize| {
        let mut analysis = analysis(Methodology::Stride, "hub")
            .with_entity(Entity::new("h", "Message Bus", "process"));
        for n in 0..edges {
            analysis = analysis.with_relationship(Relationship::new(
                format!("r{n}"),
                "h",
                format!("Consumer {n}"),
                "publishes",
            ));
        }
        vec![analysis]
    };
    let config = WeaveConfig::default();
    let scorer = RiskScorer::new(&config, as_of());

    let connected = scorer.score(&hub(6), &[]);
    let isolated = scorer.score(&hub(0), &[]);
    assert!(connected.breakdown.systemic > isolated.breakdown.systemic);
}

#[test]
fn synthesis_is_idempotent_for_a_fixed_instant() {
    let store = mixed_pool();
    let synthesizer = Synthesizer::default();

    let first = serde_json::to_string(&synthesizer.synthesize_at(&store, as_of())).unwrap();
    let second = serde_json::to_string(&synthesizer.synthesize_at(&store, as_of())).unwrap();
    assert_eq!(first, second);
}

#[test]
fn scores_stay_in_range() {
    let result = Synthesizer::default().synthesize_at(&mixed_pool(), as_of());
    let executive = &result.metrics.executive;

    assert!((0.0..=10.0).contains(&executive.overall_risk_score));
    assert!((0.0..=1.0).contains(&executive.compliance_score));
    assert!((0.0..=1.0).contains(&executive.coverage_score));
    assert!((0.0..=1.0).contains(&result.metrics.completeness_score));
    assert!((0.0..=1.0).contains(&result.metrics.confidence_level));
    assert_eq!(result.metrics.unified_risk_score, executive.overall_risk_score);
    for resolution in &result.conflicts {
        assert!((0.0..=1.0).contains(&resolution.confidence));
    }
}

#[test]
fn mixed_pool_exercises_every_pass() {
    let result = Synthesizer::default().synthesize_at(&mixed_pool(), as_of());

    let conflict_types: Vec<ConflictType> = result
        .conflicts
        .iter()
        .map(|r| r.conflict.conflict_type)
        .collect();
    assert!(conflict_types.contains(&ConflictType::RiskScoreMismatch));
    assert!(conflict_types.contains(&ConflictType::ControlEffectivenessDisagreement));
    assert!(conflict_types.contains(&ConflictType::EntityClassificationConflict));
    assert!(conflict_types.contains(&ConflictType::SeverityRatingConflict));

    // Payment API -> Fraud Engine is only modelled by PASTA.
    assert!(result.insights.iter().any(|i| {
        i.affected_entities == vec!["Payment API".to_string(), "Fraud Engine".to_string()]
    }));

    let ids: Vec<&str> = result.conflicts.iter().map(|r| r.conflict.id.as_str()).collect();
    let expected: Vec<String> = (1..=ids.len()).map(|n| format!("CONF-{n:03}")).collect();
    assert_eq!(ids, expected);
    assert_eq!(result.analyses.len(), 3);
    assert!(!result.metrics.coverage_map.is_empty());
}

#[test]
fn duplicate_gaps_keep_the_most_severe() {
    let pool = vec![
        analysis(Methodology::Stride, "a")
            .with_entity(Entity::new("e1", "Gateway", "process"))
            .with_threat(Threat::new("t1", "Replay", "spoofing", "low").affecting("e1"))
            .with_threat(Threat::new("t2", "Forgery", "spoofing", "critical").affecting("e1")),
    ];
    let gaps = detect_gaps(&pool);

    let mut keys: Vec<_> = gaps.iter().map(|g| g.dedupe_key()).collect();
    let total = keys.len();
    keys.sort();
    keys.dedup();
    assert_eq!(keys.len(), total);

    let unmitigated: Vec<_> = gaps
        .iter()
        .filter(|g| g.gap_type == GapType::UnmitigatedThreat)
        .collect();
    assert_eq!(unmitigated.len(), 1);
    assert_eq!(unmitigated[0].severity, Severity::Critical);
}

#[test]
fn wider_score_spread_never_raises_confidence() {
    let pair = |low: f64, high: f64| {
        vec![
            analysis(Methodology::Stride, "a").with_risk(Risk::new("r", "Outage", high).on_entity("Core")),
            analysis(Methodology::Pasta, "b").with_risk(Risk::new("r", "Outage", low).on_entity("Core")),
        ]
    };
    let config = WeaveConfig::default();
    let resolver = ConflictResolver::new(&config, as_of());

    let narrow = resolver.resolve_all(&pair(4.0, 7.5));
    let wide = resolver.resolve_all(&pair(1.0, 9.0));
    assert_eq!(narrow.len(), 1);
    assert_eq!(wide.len(), 1);
    assert!(wide[0].confidence <= narrow[0].confidence);
}

#[test]
fn oversized_day_windows_saturate() {
    let mut config = WeaveConfig::default();
    config.calibration.recency_window_days = 200_000_000_000;
    config.calibration.stale_risk_days = i64::MAX;

    let result = Synthesizer::new(config).synthesize_at(&mixed_pool(), as_of());
    let effectiveness = result
        .conflicts
        .iter()
        .find(|r| r.conflict.conflict_type == ConflictType::ControlEffectivenessDisagreement)
        .unwrap();
    assert_eq!(effectiveness.method, ResolutionMethod::WeightedAverage);
    assert_eq!(result.analyses.len(), 3);
}

#[test]
fn non_specialist_majority_confirms_a_threat() {
    let raiser = |methodology: Methodology, source: &str| {
        analysis(methodology, source)
            .with_entity(Entity::new("e1", "Billing Service", "process"))
            .with_threat(
                Threat::new("t1", "Invoice tampering", "tampering", "high").affecting("e1"),
            )
    };
    let pool = vec![
        raiser(Methodology::Pasta, "finance-review"),
        raiser(Methodology::Octave, "ops-review"),
        analysis(Methodology::Hazop, "deviation-study")
            .with_entity(Entity::new("h1", "Billing Service", "process")),
    ];
    let config = WeaveConfig::default();
    let resolutions = ConflictResolver::new(&config, as_of()).resolve_all(&pool);

    let existence: Vec<_> = resolutions
        .iter()
        .filter(|r| r.conflict.conflict_type == ConflictType::ThreatExistenceConflict)
        .collect();
    assert_eq!(existence.len(), 1);
    assert_eq!(existence[0].method, ResolutionMethod::MajorityVote);
    assert_eq!(existence[0].resolved_value, ResolvedValue::Exists(true));
    assert!((existence[0].confidence - 2.0 / 3.0).abs() < 1e-9);
    assert_eq!(existence[0].conflict.subject, "tampering on Billing Service");
}

#[test]
fn effectiveness_inside_the_recency_window_averages_everything() {
    let pool = vec![
        analysis(Methodology::Stride, "a")
            .with_control(Control::new("c1", "Rate limiting").with_effectiveness("high")),
        analysis(Methodology::Pasta, "b")
            .with_control(Control::new("c1", "Rate limiting").with_effectiveness("low")),
    ];
    let config = WeaveConfig::default();
    let resolutions = ConflictResolver::new(&config, as_of()).resolve_all(&pool);

    let effectiveness: Vec<_> = resolutions
        .iter()
        .filter(|r| r.conflict.conflict_type == ConflictType::ControlEffectivenessDisagreement)
        .collect();
    assert_eq!(effectiveness.len(), 1);
    assert_eq!(effectiveness[0].method, ResolutionMethod::WeightedAverage);
    assert_eq!(
        effectiveness[0].resolved_value,
        ResolvedValue::Label("medium".to_string())
    );
    assert!(effectiveness[0].rationale.contains("all 2 assessments"));
}
