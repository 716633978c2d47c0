//! Synthesis orchestration: one pass over a store producing gaps, conflict
//! resolutions, insights, recommendations and metrics.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use weave_config::WeaveConfig;
use weave_core::enums::Methodology;
use weave_core::metrics::SynthesisMetrics;
use weave_core::result::{AnalysisSummary, SynthesisResult};

use crate::conflicts::ConflictResolver;
use crate::gaps::GapDetector;
use crate::insights;
use crate::pool::PoolIndex;
use crate::recommendations::{PlanningContext, prioritize};
use crate::scoring::{RiskScorer, coverage_map};
use crate::stats::{mean, ratio};
use crate::store::AnalysisStore;

/// Methodologies every assessment is expected to include.
const CORE_METHODOLOGIES: [Methodology; 3] =
    [Methodology::Stride, Methodology::StpaSec, Methodology::Pasta];

const REQUIRED_SHARE: f64 = 0.7;
const RECOMMENDED_SHARE: f64 = 0.3;

const DECLARED_SHARE: f64 = 0.4;
const OVERLAP_SHARE: f64 = 0.3;
const RECENCY_SHARE: f64 = 0.3;

const FRESH_DAYS: f64 = 30.0;
const EXPIRED_DAYS: f64 = 365.0;
const SECONDS_PER_DAY: f64 = 86_400.0;

/// Recency of data imported at `imported_at`: 1.0 up to 30 days old,
/// falling linearly to 0 at 365 days. Future timestamps count as fresh.
#[must_use]
pub fn data_recency(imported_at: DateTime<Utc>, as_of: DateTime<Utc>) -> f64 {
    let age_days = as_of.signed_duration_since(imported_at).num_seconds() as f64 / SECONDS_PER_DAY;
    if age_days <= FRESH_DAYS {
        1.0
    } else if age_days >= EXPIRED_DAYS {
        0.0
    } else {
        1.0 - (age_days - FRESH_DAYS) / (EXPIRED_DAYS - FRESH_DAYS)
    }
}

/// Runs every engine pass over a store with one configuration.
#[derive(Debug, Clone, Default)]
pub struct Synthesizer {
    config: WeaveConfig,
}

impl Synthesizer {
    #[must_use]
    pub const fn new(config: WeaveConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &WeaveConfig {
        &self.config
    }

    /// Synthesize against the current time.
    #[must_use]
    pub fn synthesize(&self, store: &AnalysisStore) -> SynthesisResult {
        self.synthesize_at(store, Utc::now())
    }

    /// Synthesize against a fixed instant. Two calls with the same instant on
    /// an unmodified store produce identical results.
    #[must_use]
    pub fn synthesize_at(&self, store: &AnalysisStore, as_of: DateTime<Utc>) -> SynthesisResult {
        let analyses = store.analyses();
        if analyses.is_empty() {
            tracing::debug!("empty store, returning empty synthesis");
            return SynthesisResult {
                generated_at: as_of,
                analyses: Vec::new(),
                gaps: Vec::new(),
                conflicts: Vec::new(),
                insights: Vec::new(),
                recommendations: Vec::new(),
                metrics: SynthesisMetrics::default(),
            };
        }

        let index = PoolIndex::build(analyses);
        let calibration = &self.config.calibration;

        let gaps = GapDetector::new(calibration).detect_in(&index);
        let conflicts = ConflictResolver::new(&self.config, as_of).resolve_in(&index);
        let executive = RiskScorer::new(&self.config, as_of).score_in(&index, &gaps);
        let insights = insights::detect_in(&index);

        let recency = mean(
            &analyses
                .iter()
                .map(|a| data_recency(a.metadata.imported_at, as_of))
                .collect::<Vec<_>>(),
        );
        let recommendations = prioritize(
            calibration,
            &PlanningContext {
                gaps: &gaps,
                insights: &insights,
                resolutions: &conflicts,
                data_recency: recency,
                methodology_count: index.methodologies.len(),
            },
        );

        let metrics = SynthesisMetrics {
            unified_risk_score: executive.overall_risk_score,
            completeness_score: completeness(&index),
            confidence_level: confidence_level(&index, recency),
            coverage_map: coverage_map(index.methodologies.iter().copied()),
            executive,
        };

        tracing::info!(
            analyses = analyses.len(),
            gaps = gaps.len(),
            conflicts = conflicts.len(),
            insights = insights.len(),
            recommendations = recommendations.len(),
            risk = metrics.unified_risk_score,
            "synthesis complete"
        );

        SynthesisResult {
            generated_at: as_of,
            analyses: analyses.iter().map(AnalysisSummary::from).collect(),
            gaps,
            conflicts,
            insights,
            recommendations,
            metrics,
        }
    }
}

/// Required methodologies grow with the data the pool describes.
fn required_methodologies(index: &PoolIndex<'_>) -> BTreeSet<Methodology> {
    let mut required: BTreeSet<Methodology> = CORE_METHODOLOGIES.into_iter().collect();
    if index
        .entities
        .values()
        .any(|record| record.any(|e| e.properties.holds_personal_data()))
    {
        required.insert(Methodology::Linddun);
    }
    if index
        .entities
        .values()
        .any(|record| record.any(|e| e.is_ai_component()))
    {
        required.insert(Methodology::Maestro);
    }
    required
}

fn completeness(index: &PoolIndex<'_>) -> f64 {
    let required = required_methodologies(index);
    let recommended: BTreeSet<Methodology> = Methodology::NAMED
        .into_iter()
        .filter(|m| !required.contains(m))
        .collect();

    let present = |set: &BTreeSet<Methodology>| {
        ratio(set.intersection(&index.methodologies).count(), set.len())
    };
    REQUIRED_SHARE * present(&required) + RECOMMENDED_SHARE * present(&recommended)
}

fn confidence_level(index: &PoolIndex<'_>, recency: f64) -> f64 {
    let declared = mean(
        &index
            .analyses
            .iter()
            .map(weave_core::records::StandardizedAnalysis::confidence)
            .collect::<Vec<_>>(),
    );
    let overlap = if index.entities.is_empty() {
        1.0
    } else {
        ratio(
            index
                .entities
                .values()
                .filter(|record| record.methodologies.len() >= 2)
                .count(),
            index.entities.len(),
        )
    };
    DECLARED_SHARE * declared + OVERLAP_SHARE * overlap + RECENCY_SHARE * recency
}
