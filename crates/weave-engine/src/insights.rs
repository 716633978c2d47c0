//! Cross-methodology insights: asymmetries worth acting on that are not
//! disagreements.

use std::collections::{BTreeMap, BTreeSet};

use weave_core::enums::{Effort, InsightType, Methodology, Severity};
use weave_core::findings::Insight;
use weave_core::records::StandardizedAnalysis;

use crate::pool::{PoolIndex, ThreatRef};

const HIDDEN_DEPENDENCY_ACTIONABILITY: f64 = 0.8;
const CORROBORATED_ACTIONABILITY: f64 = 0.5;
const SINGLE_SOURCE_ACTIONABILITY: f64 = 0.4;
const SINGLE_SOURCE_MIN_METHODOLOGIES: usize = 3;

/// Insights over `analyses`, ids `INS-001`, ...
#[must_use]
pub fn detect_insights(analyses: &[StandardizedAnalysis]) -> Vec<Insight> {
    detect_in(&PoolIndex::build(analyses))
}

pub(crate) fn detect_in(index: &PoolIndex<'_>) -> Vec<Insight> {
    let mut insights = hidden_dependencies(index);
    insights.extend(corroborated_threats(index));
    insights.extend(single_source_entities(index));
    for (position, insight) in insights.iter_mut().enumerate() {
        insight.id = format!("INS-{:03}", position + 1);
    }
    tracing::debug!(insights = insights.len(), "insight detection complete");
    insights
}

fn methodology_list(methodologies: &BTreeSet<Methodology>) -> String {
    methodologies
        .iter()
        .map(|m| m.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Edges reported by exactly one methodology. Needs at least two
/// methodologies in the pool, otherwise every edge would qualify.
fn hidden_dependencies(index: &PoolIndex<'_>) -> Vec<Insight> {
    if index.methodologies.len() < 2 {
        return Vec::new();
    }
    index
        .edges
        .values()
        .filter(|edge| edge.methodologies.len() == 1)
        .map(|edge| {
            let source = index.display_name(&edge.source);
            let target = index.display_name(&edge.target);
            let seen_by = methodology_list(&edge.methodologies);
            Insight {
                id: String::new(),
                insight_type: InsightType::HiddenDependency,
                severity: Severity::Medium,
                title: format!("Dependency {source} -> {target} seen only by {seen_by}"),
                description: format!(
                    "{seen_by} reports a relationship from {source} to {target} that no other methodology models"
                ),
                methodologies: edge.methodologies.iter().copied().collect(),
                affected_entities: vec![source.clone(), target.clone()],
                recommendation: format!(
                    "Validate the {source} -> {target} dependency and add it to the other models if it exists"
                ),
                actionability: HIDDEN_DEPENDENCY_ACTIONABILITY,
                effort: Effort::Low,
                sources: edge.sources.iter().cloned().collect(),
            }
        })
        .collect()
}

/// Threat keys raised by every methodology in a pool of two or more.
fn corroborated_threats(index: &PoolIndex<'_>) -> Vec<Insight> {
    if index.methodologies.len() < 2 {
        return Vec::new();
    }
    let mut groups: BTreeMap<(String, String), Vec<&ThreatRef<'_>>> = BTreeMap::new();
    for threat_ref in &index.threats {
        let category = threat_ref.threat.category_key();
        if category.is_empty() {
            continue;
        }
        groups
            .entry((category, threat_ref.target.clone()))
            .or_default()
            .push(threat_ref);
    }

    groups
        .into_iter()
        .filter_map(|((category, _), threats)| {
            let raised_by: BTreeSet<Methodology> =
                threats.iter().map(|t| t.analysis.methodology).collect();
            if raised_by != index.methodologies {
                return None;
            }
            let target = threats[0].entity.as_deref().map_or_else(
                || threats[0].target.clone(),
                |key| index.display_name(key),
            );
            let severity = threats
                .iter()
                .map(|t| t.threat.severity())
                .max()
                .unwrap_or_default();
            let sources: BTreeSet<String> = threats.iter().map(|t| t.analysis_id.clone()).collect();
            Some(Insight {
                id: String::new(),
                insight_type: InsightType::CorroboratedThreat,
                severity: Severity::Low,
                title: format!(
                    "{category} on {target} corroborated by all {} methodologies",
                    raised_by.len()
                ),
                description: format!(
                    "Every methodology in the pool ({}) identifies {category} against {target}, rated up to {severity}",
                    methodology_list(&raised_by)
                ),
                methodologies: raised_by.into_iter().collect(),
                affected_entities: threats[0].entity.as_ref().map(|_| target.clone()).into_iter().collect(),
                recommendation: format!(
                    "Treat {category} on {target} as confirmed and prioritise its mitigation"
                ),
                actionability: CORROBORATED_ACTIONABILITY,
                effort: Effort::Medium,
                sources: sources.into_iter().collect(),
            })
        })
        .collect()
}

/// Entities only one methodology reports while several are present.
fn single_source_entities(index: &PoolIndex<'_>) -> Vec<Insight> {
    if index.methodologies.len() < SINGLE_SOURCE_MIN_METHODOLOGIES {
        return Vec::new();
    }
    index
        .entities
        .values()
        .filter(|record| record.methodologies.len() == 1)
        .map(|record| {
            let seen_by = methodology_list(&record.methodologies);
            Insight {
                id: String::new(),
                insight_type: InsightType::SingleSourceEntity,
                severity: Severity::Low,
                title: format!("{} reported only by {seen_by}", record.name),
                description: format!(
                    "{} of {} methodologies do not model {}",
                    index.methodologies.len() - 1,
                    index.methodologies.len(),
                    record.name
                ),
                methodologies: record.methodologies.iter().copied().collect(),
                affected_entities: vec![record.name.clone()],
                recommendation: format!(
                    "Confirm whether {} is in scope and reconcile its name across models",
                    record.name
                ),
                actionability: SINGLE_SOURCE_ACTIONABILITY,
                effort: Effort::Low,
                sources: record.sources.iter().cloned().collect(),
            }
        })
        .collect()
}
