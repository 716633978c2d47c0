//! Prioritized recommendations.
//!
//! Priority 1 remediates every critical gap, priority 2 acts on insights that
//! are both actionable and cheap, and priority 3 carries strategic advice
//! about the analysis program itself.

use std::collections::BTreeSet;

use weave_config::CalibrationConfig;
use weave_core::enums::{Effort, Severity};
use weave_core::findings::{
    ConflictResolution, Gap, Insight, Recommendation, RecommendationOrigin,
};

const GAP_PRIORITY: u8 = 1;
const INSIGHT_PRIORITY: u8 = 2;
const STRATEGIC_PRIORITY: u8 = 3;
const ACTIONABLE_INSIGHT: f64 = 0.7;

/// Everything the planner reads from one synthesis run.
#[derive(Debug, Clone, Copy)]
pub struct PlanningContext<'a> {
    pub gaps: &'a [Gap],
    pub insights: &'a [Insight],
    pub resolutions: &'a [ConflictResolution],
    /// Mean data recency of the pool (0–1).
    pub data_recency: f64,
    pub methodology_count: usize,
}

/// Recommendations in priority order, ids `REC-001`, ... An empty pool gets
/// none.
#[must_use]
pub fn prioritize(calibration: &CalibrationConfig, context: &PlanningContext<'_>) -> Vec<Recommendation> {
    if context.methodology_count == 0 {
        return Vec::new();
    }

    let mut recommendations: Vec<Recommendation> = context
        .gaps
        .iter()
        .filter(|gap| gap.severity == Severity::Critical)
        .map(from_gap)
        .collect();
    recommendations.extend(
        context
            .insights
            .iter()
            .filter(|i| i.actionability >= ACTIONABLE_INSIGHT && i.effort == Effort::Low)
            .map(from_insight),
    );
    recommendations.extend(strategic(calibration, context));

    for (position, recommendation) in recommendations.iter_mut().enumerate() {
        recommendation.id = format!("REC-{:03}", position + 1);
    }
    tracing::debug!(
        recommendations = recommendations.len(),
        "recommendation planning complete"
    );
    recommendations
}

fn from_gap(gap: &Gap) -> Recommendation {
    Recommendation {
        id: String::new(),
        priority: GAP_PRIORITY,
        title: format!("Resolve critical {} gap", gap.gap_type),
        description: gap.recommendation.clone(),
        rationale: format!("{}: {}", gap.id, gap.description),
        origin: RecommendationOrigin::Gap {
            gap_id: gap.id.clone(),
        },
        effort: gap.effort,
        affected_entities: gap.affected_entities.clone(),
    }
}

fn from_insight(insight: &Insight) -> Recommendation {
    Recommendation {
        id: String::new(),
        priority: INSIGHT_PRIORITY,
        title: insight.title.clone(),
        description: insight.recommendation.clone(),
        rationale: format!(
            "{}: actionability {:.1} at {} effort",
            insight.id, insight.actionability, insight.effort
        ),
        origin: RecommendationOrigin::Insight {
            insight_id: insight.id.clone(),
        },
        effort: insight.effort,
        affected_entities: insight.affected_entities.clone(),
    }
}

fn strategic(calibration: &CalibrationConfig, context: &PlanningContext<'_>) -> Vec<Recommendation> {
    let mut out = Vec::new();

    if context.data_recency < calibration.monitoring_recency_threshold {
        out.push(strategic_recommendation(
            "Add continuous monitoring",
            "Re-run or re-import the stale analyses on a schedule so synthesis reflects the current system"
                .to_string(),
            format!(
                "Average data recency is {:.2}, below {:.2}",
                context.data_recency, calibration.monitoring_recency_threshold
            ),
            Effort::Medium,
            Vec::new(),
        ));
    }

    if context.methodology_count > calibration.consolidation_threshold {
        out.push(strategic_recommendation(
            "Consolidate methodologies",
            "Merge overlapping methodologies into a smaller set with a shared entity vocabulary"
                .to_string(),
            format!(
                "{} methodologies are in use, more than {}",
                context.methodology_count, calibration.consolidation_threshold
            ),
            Effort::High,
            Vec::new(),
        ));
    }

    let contested: Vec<&ConflictResolution> = context
        .resolutions
        .iter()
        .filter(|r| r.confidence < calibration.revalidation_confidence_threshold)
        .collect();
    if !contested.is_empty() {
        let ids: Vec<&str> = contested.iter().map(|r| r.conflict.id.as_str()).collect();
        let subjects: BTreeSet<String> = contested
            .iter()
            .map(|r| r.conflict.subject.clone())
            .collect();
        out.push(strategic_recommendation(
            "Revalidate contested findings",
            format!(
                "Review the inputs behind {} with the teams that produced them",
                ids.join(", ")
            ),
            format!(
                "{} resolution(s) have confidence below {:.2}",
                contested.len(),
                calibration.revalidation_confidence_threshold
            ),
            Effort::Medium,
            subjects.into_iter().collect(),
        ));
    }
    out
}

fn strategic_recommendation(
    title: &str,
    description: String,
    rationale: String,
    effort: Effort,
    affected_entities: Vec<String>,
) -> Recommendation {
    Recommendation {
        id: String::new(),
        priority: STRATEGIC_PRIORITY,
        title: title.to_string(),
        description,
        rationale,
        origin: RecommendationOrigin::Strategic,
        effort,
        affected_entities,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use weave_core::enums::{GapType, InsightType, Methodology};

    fn gap(id: &str, severity: Severity) -> Gap {
        Gap {
            id: id.into(),
            gap_type: GapType::UnmitigatedThreat,
            category: GapType::UnmitigatedThreat.category(),
            severity,
            description: "Threat has no mitigating control".into(),
            affected_entities: vec!["Vault".into()],
            recommendation: "Add a control".into(),
            effort: Effort::Medium,
            business_impact: String::new(),
            compliance_impact: Vec::new(),
            suggested_methodology: None,
            sources: Vec::new(),
        }
    }

    fn insight(id: &str, actionability: f64, effort: Effort) -> Insight {
        Insight {
            id: id.into(),
            insight_type: InsightType::HiddenDependency,
            severity: Severity::Medium,
            title: "Dependency A -> B".into(),
            description: String::new(),
            methodologies: vec![Methodology::Stride],
            affected_entities: vec!["A".into(), "B".into()],
            recommendation: "Validate it".into(),
            actionability,
            effort,
            sources: Vec::new(),
        }
    }

    fn context<'a>(gaps: &'a [Gap], insights: &'a [Insight]) -> PlanningContext<'a> {
        PlanningContext {
            gaps,
            insights,
            resolutions: &[],
            data_recency: 1.0,
            methodology_count: 2,
        }
    }

    #[test]
    fn critical_gaps_then_cheap_insights() {
        let gaps = [gap("GAP-001", Severity::Critical), gap("GAP-002", Severity::High)];
        let insights = [
            insight("INS-001", 0.8, Effort::Low),
            insight("INS-002", 0.8, Effort::Medium),
            insight("INS-003", 0.4, Effort::Low),
        ];
        let recommendations = prioritize(&CalibrationConfig::default(), &context(&gaps, &insights));

        let summary: Vec<(&str, u8, &RecommendationOrigin)> = recommendations
            .iter()
            .map(|r| (r.id.as_str(), r.priority, &r.origin))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("REC-001", 1, &RecommendationOrigin::Gap { gap_id: "GAP-001".into() }),
                ("REC-002", 2, &RecommendationOrigin::Insight { insight_id: "INS-001".into() }),
            ]
        );
    }

    #[test]
    fn stale_data_and_many_methodologies_get_strategic_advice() {
        let mut ctx = context(&[], &[]);
        ctx.data_recency = 0.2;
        ctx.methodology_count = 6;
        let titles: Vec<String> = prioritize(&CalibrationConfig::default(), &ctx)
            .into_iter()
            .inspect(|r| assert_eq!(r.priority, 3))
            .map(|r| r.title)
            .collect();
        assert_eq!(
            titles,
            vec!["Add continuous monitoring", "Consolidate methodologies"]
        );
    }

    #[test]
    fn empty_pool_gets_nothing() {
        let mut ctx = context(&[], &[]);
        ctx.methodology_count = 0;
        ctx.data_recency = 0.0;
        assert!(prioritize(&CalibrationConfig::default(), &ctx).is_empty());
    }
}
