//! Unified risk scoring.
//!
//! Three 0–10 axes (technical, systemic, business) are computed per
//! analysis and averaged with per-methodology weights, then blended into
//! one score that leans towards the worst axis. Compliance, coverage,
//! trend, the top risks and a return-on-investment estimate complete the
//! executive view.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use weave_config::WeaveConfig;
use weave_core::enums::{CoverageDomain, GapCategory, Methodology, RiskTrend, Severity};
use weave_core::findings::Gap;
use weave_core::metrics::{
    ExecutiveMetrics, RankedRisk, RiskBreakdown, RoiEstimate, SystemicFactors,
};
use weave_core::records::StandardizedAnalysis;

use crate::pool::{PoolIndex, ThreatRef};
use crate::stats::{cap, day_window, mean, ratio, weighted_mean};

const MAX_SCORE: f64 = 10.0;
const TECHNICAL_SHARE: f64 = 0.35;
const SYSTEMIC_SHARE: f64 = 0.35;
const BUSINESS_SHARE: f64 = 0.30;
const DOMINANT_AXIS_BOOST: f64 = 0.2;

const HUB_WEIGHT: f64 = 2.5;
const SINGLE_POINT_WEIGHT: f64 = 1.5;
const DENSITY_WEIGHT: f64 = 2.5;
const EMERGENT_BASELINE: f64 = 3.0;
const EMERGENT_UNGUARDED_SLOPE: f64 = 0.7;
const EMERGENT_GUARDED_SLOPE: f64 = 0.3;
const IMPACT_PER_ITEM: f64 = 2.0;

const CONTROL_SHARE: f64 = 0.6;
const REGULATION_SHARE: f64 = 0.4;
const DEPTH_BONUS: f64 = 0.2;
const TREND_THRESHOLD: f64 = 0.5;

/// Compliance-score deduction per compliance gap.
const fn compliance_penalty(severity: Severity) -> f64 {
    match severity {
        Severity::Low => 0.05,
        Severity::Medium => 0.10,
        Severity::High => 0.15,
        Severity::Critical => 0.20,
    }
}

/// Multiplier applied to the unit value when pricing a mitigated threat or
/// a remediated gap.
const fn value_weight(severity: Severity) -> f64 {
    match severity {
        Severity::Low => 1.0,
        Severity::Medium => 2.0,
        Severity::High => 4.0,
        Severity::Critical => 8.0,
    }
}

/// Score a pool with the default configuration, judging staleness against
/// the current time.
#[must_use]
pub fn calculate_unified_risk(analyses: &[StandardizedAnalysis], gaps: &[Gap]) -> ExecutiveMetrics {
    let config = WeaveConfig::default();
    RiskScorer::new(&config, Utc::now()).score(analyses, gaps)
}

/// Domain → the methodologies (sorted, distinct) covering it. Uncovered
/// domains are absent.
#[must_use]
pub fn coverage_map(
    methodologies: impl IntoIterator<Item = Methodology>,
) -> BTreeMap<CoverageDomain, Vec<Methodology>> {
    let distinct: BTreeSet<Methodology> = methodologies.into_iter().collect();
    let mut map: BTreeMap<CoverageDomain, Vec<Methodology>> = BTreeMap::new();
    for methodology in distinct {
        for domain in CoverageDomain::covered_by(methodology) {
            map.entry(*domain).or_default().push(methodology);
        }
    }
    map
}

#[derive(Debug, Clone, Copy)]
pub struct RiskScorer<'c> {
    config: &'c WeaveConfig,
    as_of: DateTime<Utc>,
}

impl<'c> RiskScorer<'c> {
    #[must_use]
    pub const fn new(config: &'c WeaveConfig, as_of: DateTime<Utc>) -> Self {
        Self { config, as_of }
    }

    /// Executive metrics for `analyses`. `gaps` feed the compliance penalty
    /// and the potential ROI. An empty pool scores zero everywhere.
    #[must_use]
    pub fn score(&self, analyses: &[StandardizedAnalysis], gaps: &[Gap]) -> ExecutiveMetrics {
        self.score_in(&PoolIndex::build(analyses), gaps)
    }

    pub(crate) fn score_in(&self, index: &PoolIndex<'_>, gaps: &[Gap]) -> ExecutiveMetrics {
        if index.is_empty() {
            return ExecutiveMetrics::default();
        }

        let technical_by_analysis = self.technical_by_analysis(index);
        let systemic_factors = self.systemic_factors(index);
        let breakdown = RiskBreakdown {
            technical: self.technical_risk(index, &technical_by_analysis),
            systemic: self.systemic_risk(index, &systemic_factors),
            business: self.business_risk(index),
        };

        let blended = TECHNICAL_SHARE * breakdown.technical
            + SYSTEMIC_SHARE * breakdown.systemic
            + BUSINESS_SHARE * breakdown.business;
        let scaling = 1.0 + (breakdown.max() / MAX_SCORE) * DOMINANT_AXIS_BOOST;
        let overall_risk_score = cap(blended * scaling, MAX_SCORE);

        let metrics = ExecutiveMetrics {
            overall_risk_score,
            risk_display_score: overall_risk_score * 10.0,
            breakdown,
            systemic_factors,
            compliance_score: compliance_score(index, gaps),
            coverage_score: self.coverage_score(index),
            trend: trend(index, &technical_by_analysis),
            top_risks: self.top_risks(index),
            roi: self.roi(index, gaps),
        };
        tracing::debug!(
            overall = metrics.overall_risk_score,
            technical = breakdown.technical,
            systemic = breakdown.systemic,
            business = breakdown.business,
            "risk scoring complete"
        );
        metrics
    }

    // -----------------------------------------------------------------------
    // Technical axis
    // -----------------------------------------------------------------------

    /// Per-analysis technical risk, `None` for analyses with neither risks
    /// nor threats.
    fn technical_by_analysis(&self, index: &PoolIndex<'_>) -> Vec<Option<f64>> {
        let inflation = self.config.calibration.unmitigated_threat_inflation;
        index
            .analyses
            .iter()
            .map(|analysis| {
                let base = if analysis.risks.is_empty() {
                    let equivalents: Vec<f64> = analysis
                        .threats
                        .iter()
                        .map(|t| t.severity().risk_equivalent())
                        .collect();
                    if equivalents.is_empty() {
                        return None;
                    }
                    mean(&equivalents)
                } else {
                    let scores: Vec<f64> = analysis.risks.iter().map(|r| r.score).collect();
                    mean(&scores)
                };
                let unmitigated = threats_of(index, analysis)
                    .filter(|t| t.is_unmitigated())
                    .count();
                Some(cap(
                    base * (1.0 + inflation * unmitigated as f64),
                    MAX_SCORE,
                ))
            })
            .collect()
    }

    fn technical_risk(&self, index: &PoolIndex<'_>, per_analysis: &[Option<f64>]) -> f64 {
        let weighted: Vec<(f64, f64)> = index
            .analyses
            .iter()
            .zip(per_analysis)
            .filter_map(|(analysis, value)| {
                value.map(|v| (v, self.config.weights.get(analysis.methodology).technical))
            })
            .collect();
        cap(weighted_mean(&weighted), MAX_SCORE)
    }

    // -----------------------------------------------------------------------
    // Systemic axis
    // -----------------------------------------------------------------------

    fn systemic_factors(&self, index: &PoolIndex<'_>) -> SystemicFactors {
        let calibration = &self.config.calibration;
        let hubs = index
            .degree
            .values()
            .filter(|degree| **degree > calibration.hub_connection_threshold)
            .count();
        let single_points = index
            .protecting
            .values()
            .filter(|controls| controls.len() == 1)
            .count();
        let interdependency = cap(
            ratio(index.edges.len(), index.node_count()) * DENSITY_WEIGHT,
            MAX_SCORE,
        );
        let guarded = index.has_methodology(Methodology::is_control_theoretic_or_deviation);
        let emergent_behavior = if guarded {
            EMERGENT_GUARDED_SLOPE * interdependency
        } else {
            EMERGENT_BASELINE + EMERGENT_UNGUARDED_SLOPE * interdependency
        };

        SystemicFactors {
            cascading_failure: cap(hubs as f64 * HUB_WEIGHT, MAX_SCORE),
            single_points_of_failure: cap(single_points as f64 * SINGLE_POINT_WEIGHT, MAX_SCORE),
            interdependency,
            emergent_behavior: cap(emergent_behavior, MAX_SCORE),
        }
    }

    fn systemic_risk(&self, index: &PoolIndex<'_>, factors: &SystemicFactors) -> f64 {
        let weighted: Vec<(f64, f64)> = index
            .analyses
            .iter()
            .map(|analysis| {
                let strength = self.config.systemic_strength.get(analysis.methodology);
                let total = strength.total();
                let combined = if total > 0.0 {
                    (factors.cascading_failure * strength.cascading
                        + factors.single_points_of_failure * strength.single_point
                        + factors.interdependency * strength.interdependency
                        + factors.emergent_behavior * strength.emergent)
                        / total
                } else {
                    0.0
                };
                (combined, self.config.weights.get(analysis.methodology).systemic)
            })
            .collect();
        cap(weighted_mean(&weighted), MAX_SCORE)
    }

    // -----------------------------------------------------------------------
    // Business axis
    // -----------------------------------------------------------------------

    fn business_risk(&self, index: &PoolIndex<'_>) -> f64 {
        let weighted: Vec<(f64, f64)> = index
            .analyses
            .iter()
            .map(|analysis| {
                let entities = analysis.entities.as_slice();
                let threats: Vec<&ThreatRef<'_>> = threats_of(index, analysis).collect();

                let financial = count(entities, |e| e.properties.is_high_value())
                    + count(&threats, |t| {
                        t.is_unmitigated() && t.threat.severity() == Severity::Critical
                    });
                let reputational = count(&threats, |t| t.threat.is_privacy_related())
                    + count(entities, |e| e.properties.is_externally_exposed());
                let operational = count(&threats, |t| t.threat.is_availability_related())
                    + count(entities, |e| e.is_process() && e.properties.is_high_criticality());
                let regulatory = count(entities, |e| e.properties.holds_regulated_data())
                    + count(&threats, |t| t.is_unmitigated() && t.threat.is_compliance_related());

                let impact = mean(
                    &[financial, reputational, operational, regulatory]
                        .map(|count| cap(count as f64 * IMPACT_PER_ITEM, MAX_SCORE)),
                );
                (impact, self.config.weights.get(analysis.methodology).business)
            })
            .collect();
        cap(weighted_mean(&weighted), MAX_SCORE)
    }

    // -----------------------------------------------------------------------
    // Coverage, top risks, ROI
    // -----------------------------------------------------------------------

    fn coverage_score(&self, index: &PoolIndex<'_>) -> f64 {
        let map = coverage_map(index.methodologies.iter().copied());
        if map.is_empty() {
            return 0.0;
        }
        let breadth = ratio(map.len(), CoverageDomain::ALL.len());
        let overlaps: Vec<f64> = map
            .values()
            .map(|methodologies| {
                let weights: Vec<f64> = methodologies
                    .iter()
                    .map(|m| self.config.weights.get(*m).coverage)
                    .collect();
                let total: f64 = weights.iter().sum();
                let heaviest = weights.iter().copied().fold(0.0, f64::max);
                if total > 0.0 { 1.0 - heaviest / total } else { 0.0 }
            })
            .collect();
        cap(breadth + DEPTH_BONUS * mean(&overlaps), 1.0)
    }

    fn top_risks(&self, index: &PoolIndex<'_>) -> Vec<RankedRisk> {
        let calibration = &self.config.calibration;
        let stale_after = day_window(calibration.stale_risk_days);

        let mut ranked: Vec<RankedRisk> = Vec::new();
        for (at, analysis) in index.analyses.iter().enumerate() {
            let stale = self.as_of.signed_duration_since(analysis.metadata.imported_at) > stale_after;
            for risk in &analysis.risks {
                let mitigated = risk.is_mitigated();
                let mut adjusted = risk.score * analysis.confidence();
                if mitigated {
                    adjusted *= calibration.mitigated_risk_factor;
                }
                if stale {
                    adjusted *= calibration.stale_risk_factor;
                }
                ranked.push(RankedRisk {
                    risk_id: risk.id.clone(),
                    name: risk.name.clone(),
                    entity: risk
                        .entity
                        .as_deref()
                        .filter(|r| !r.trim().is_empty())
                        .map(|r| index.display_name(&index.resolve(at, r))),
                    methodology: analysis.methodology,
                    analysis_id: index.analysis_ids[at].clone(),
                    score: risk.score,
                    adjusted_score: adjusted,
                    mitigated,
                });
            }
        }
        ranked.sort_by(|a, b| b.adjusted_score.total_cmp(&a.adjusted_score));
        ranked.truncate(calibration.top_risk_limit);
        ranked
    }

    fn roi(&self, index: &PoolIndex<'_>, gaps: &[Gap]) -> RoiEstimate {
        let calibration = &self.config.calibration;
        let implemented_controls = index
            .analyses
            .iter()
            .flat_map(|a| &a.controls)
            .filter(|c| c.is_implemented())
            .count();
        let investment = implemented_controls as f64 * calibration.control_unit_cost;
        let risk_reduction_value: f64 = index
            .threats
            .iter()
            .filter(|t| !t.is_unmitigated())
            .map(|t| value_weight(t.threat.severity()) * calibration.threat_unit_value)
            .sum();

        let potential_investment = gaps.len() as f64 * calibration.control_unit_cost;
        let potential_value: f64 = gaps
            .iter()
            .map(|g| value_weight(g.severity) * calibration.threat_unit_value)
            .sum();

        RoiEstimate {
            implemented_controls,
            investment,
            risk_reduction_value,
            roi: return_on(investment, risk_reduction_value),
            remediation_items: gaps.len(),
            potential_investment,
            potential_value,
            potential_roi: return_on(potential_investment, potential_value),
        }
    }
}

fn threats_of<'i, 'a>(
    index: &'i PoolIndex<'a>,
    analysis: &'i StandardizedAnalysis,
) -> impl Iterator<Item = &'i ThreatRef<'a>> {
    index
        .threats
        .iter()
        .filter(move |t| std::ptr::eq(t.analysis, analysis))
}

fn count<T>(items: &[T], predicate: impl Fn(&T) -> bool) -> usize {
    items.iter().filter(|item| predicate(item)).count()
}

fn return_on(investment: f64, value: f64) -> f64 {
    if investment > 0.0 {
        (value - investment) / investment
    } else {
        0.0
    }
}

/// Methodologies a regulation expects given the data held in the pool.
fn required_by_regulation(index: &PoolIndex<'_>) -> BTreeSet<Methodology> {
    let mut required = BTreeSet::new();
    for record in index.entities.values() {
        if record.any(|e| e.properties.holds_personal_data() || e.properties.holds_health_data()) {
            required.insert(Methodology::Linddun);
        }
        if record.any(|e| e.is_ai_component()) {
            required.insert(Methodology::Maestro);
        }
        if record.any(|e| e.properties.holds_payment_data()) {
            required.insert(Methodology::Stride);
        }
    }
    required
}

fn compliance_score(index: &PoolIndex<'_>, gaps: &[Gap]) -> f64 {
    let controls: Vec<_> = index.analyses.iter().flat_map(|a| &a.controls).collect();
    let effective = controls.iter().filter(|c| c.is_effective()).count();
    let control_fraction = ratio(effective, controls.len());

    let required = required_by_regulation(index);
    let regulation_fraction = if required.is_empty() {
        1.0
    } else {
        ratio(
            required.intersection(&index.methodologies).count(),
            required.len(),
        )
    };

    let penalty: f64 = gaps
        .iter()
        .filter(|g| g.category == GapCategory::Compliance)
        .map(|g| compliance_penalty(g.severity))
        .sum();

    cap(
        CONTROL_SHARE * control_fraction + REGULATION_SHARE * regulation_fraction - penalty,
        1.0,
    )
}

/// Newer half of the scored analyses against the older half, ordered by
/// import time.
fn trend(index: &PoolIndex<'_>, per_analysis: &[Option<f64>]) -> RiskTrend {
    let mut scored: Vec<(DateTime<Utc>, &str, f64)> = index
        .analyses
        .iter()
        .zip(&index.analysis_ids)
        .zip(per_analysis)
        .filter_map(|((analysis, id), value)| {
            value.map(|v| (analysis.metadata.imported_at, id.as_str(), v))
        })
        .collect();
    if scored.len() < 2 {
        return RiskTrend::Stable;
    }
    scored.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)));

    let (older, newer) = scored.split_at(scored.len() / 2);
    let older = mean(&older.iter().map(|s| s.2).collect::<Vec<_>>());
    let newer = mean(&newer.iter().map(|s| s.2).collect::<Vec<_>>());
    if newer > older + TREND_THRESHOLD {
        RiskTrend::Worsening
    } else if newer < older - TREND_THRESHOLD {
        RiskTrend::Improving
    } else {
        RiskTrend::Stable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;
    use weave_core::records::{Control, Entity, Relationship, Risk, Threat};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 9, 1, 0, 0, 0).unwrap()
    }

    fn analysis(methodology: Methodology, source: &str, days_old: i64) -> StandardizedAnalysis {
        StandardizedAnalysis::new(methodology, source, now() - Duration::days(days_old))
    }

    fn score(analyses: &[StandardizedAnalysis], gaps: &[Gap]) -> ExecutiveMetrics {
        let config = WeaveConfig::default();
        RiskScorer::new(&config, now()).score(analyses, gaps)
    }

    #[test]
    fn empty_pool_scores_zero() {
        assert_eq!(score(&[], &[]), ExecutiveMetrics::default());
    }

    #[test]
    fn unmitigated_threats_inflate_technical_risk() {
        let pool = vec![
            analysis(Methodology::Stride, "a", 1)
                .with_risk(Risk::new("r1", "Breach", 5.0))
                .with_threat(Threat::new("t1", "Replay", "spoofing", "low"))
                .with_threat(Threat::new("t2", "Forgery", "tampering", "low")),
        ];
        let metrics = score(&pool, &[]);
        assert!((metrics.breakdown.technical - 6.0).abs() < 1e-9);
    }

    #[test]
    fn threats_stand_in_for_missing_risks() {
        let pool = vec![
            analysis(Methodology::Stride, "a", 1)
                .with_threat(Threat::new("t1", "Replay", "spoofing", "high"))
                .with_control(Control::new("c1", "Nonce").mitigating("t1")),
        ];
        let metrics = score(&pool, &[]);
        assert!((metrics.breakdown.technical - 7.5).abs() < 1e-9);
    }

    #[test]
    fn overall_blends_axes_and_boosts_the_dominant_one() {
        let pool = vec![analysis(Methodology::Stride, "a", 1).with_risk(Risk::new("r1", "Breach", 5.0))];
        let metrics = score(&pool, &[]);

        // No edges and no control-theoretic methodology: only emergent
        // exposure (3.0) contributes, at STRIDE's 0.2 strength.
        assert!((metrics.breakdown.systemic - 0.6).abs() < 1e-9);
        assert_eq!(metrics.breakdown.business, 0.0);
        let expected = (0.35 * 5.0 + 0.35 * 0.6) * 1.1;
        assert!((metrics.overall_risk_score - expected).abs() < 1e-9);
        assert!((metrics.risk_display_score - expected * 10.0).abs() < 1e-9);
    }

    fn hub_pool(edges: usize, methodology: Methodology) -> Vec<StandardizedAnalysis> {
        let mut analysis = analysis(methodology, "a", 1)
            .with_entity(Entity::new("hub", "Hub", "process"));
        for n in 0..edges {
            let id = format!("leaf-{n}");
            analysis = analysis
                .with_entity(Entity::new(id.clone(), id.clone(), "component"))
                .with_relationship(Relationship::new(format!("r{n}"), "hub", id, "data-flow"));
        }
        vec![analysis]
    }

    #[test]
    fn hub_entities_raise_systemic_risk() {
        let with_edges = score(&hub_pool(6, Methodology::Stride), &[]);
        let without = score(&hub_pool(0, Methodology::Stride), &[]);

        assert!((with_edges.systemic_factors.cascading_failure - 2.5).abs() < 1e-9);
        assert!(with_edges.breakdown.systemic > without.breakdown.systemic);
    }

    #[test]
    fn control_theoretic_methodology_dampens_emergent_exposure() {
        let unguarded = score(&hub_pool(6, Methodology::Stride), &[]);
        let guarded = score(&hub_pool(6, Methodology::StpaSec), &[]);
        assert!(
            guarded.systemic_factors.emergent_behavior
                < unguarded.systemic_factors.emergent_behavior
        );
    }

    #[test]
    fn business_factors_count_items_per_analysis() {
        let pool = vec![
            analysis(Methodology::Pasta, "a", 1)
                .with_entity(Entity::new("e1", "Vault", "datastore").with_criticality("critical"))
                .with_threat(Threat::new("t1", "Exfil", "information disclosure", "critical")),
        ];
        let metrics = score(&pool, &[]);
        // financial: 1 high-value entity + 1 unmitigated critical = 4.0
        // reputational: 1 disclosure threat = 2.0
        assert!((metrics.breakdown.business - 1.5).abs() < 1e-9);
    }

    #[test]
    fn compliance_combines_controls_regulation_and_penalties() {
        let pool = vec![
            analysis(Methodology::Stride, "a", 1)
                .with_entity(Entity::new("e1", "Users", "datastore").with_personal_data(true))
                .with_control(Control::new("c1", "MFA").with_state("implemented"))
                .with_control(Control::new("c2", "WAF").with_state("planned")),
        ];
        // 0.6 * 0.5 + 0.4 * 0 (LINDDUN missing)
        assert!((score(&pool, &[]).compliance_score - 0.3).abs() < 1e-9);

        let gap = Gap {
            id: "GAP-001".into(),
            gap_type: weave_core::enums::GapType::MissingAuditLogging,
            category: GapCategory::Compliance,
            severity: Severity::High,
            description: String::new(),
            affected_entities: Vec::new(),
            recommendation: String::new(),
            effort: weave_core::enums::Effort::Low,
            business_impact: String::new(),
            compliance_impact: Vec::new(),
            suggested_methodology: None,
            sources: Vec::new(),
        };
        assert!((score(&pool, &[gap.clone()]).compliance_score - 0.15).abs() < 1e-9);
        assert_eq!(score(&pool, &[gap.clone(), gap.clone(), gap]).compliance_score, 0.0);
    }

    #[test]
    fn compliance_without_regulated_data_counts_regulation_as_met() {
        let pool = vec![analysis(Methodology::Stride, "a", 1)];
        assert!((score(&pool, &[]).compliance_score - 0.4).abs() < 1e-9);
    }

    #[test]
    fn coverage_rewards_breadth_and_overlap() {
        let stride = score(&[analysis(Methodology::Stride, "a", 1)], &[]);
        assert!((stride.coverage_score - 0.125).abs() < 1e-9);

        let pair = score(
            &[
                analysis(Methodology::Stride, "a", 1),
                analysis(Methodology::Dread, "b", 1),
            ],
            &[],
        );
        let expected = 0.125 + 0.2 * (1.0 - 0.8 / 1.4);
        assert!((pair.coverage_score - expected).abs() < 1e-9);
    }

    #[test]
    fn coverage_map_lists_covering_methodologies() {
        let map = coverage_map([Methodology::Pasta, Methodology::Stride, Methodology::Stride]);
        assert_eq!(
            map[&CoverageDomain::Technical],
            vec![Methodology::Stride, Methodology::Pasta]
        );
        assert!(!map.contains_key(&CoverageDomain::Privacy));
    }

    #[test]
    fn top_risks_are_adjusted_and_ranked() {
        let pool = vec![
            analysis(Methodology::Stride, "fresh", 1)
                .with_confidence(1.0)
                .with_risk(Risk::new("r1", "Breach", 8.0).with_mitigated(true))
                .with_risk(Risk::new("r2", "Outage", 5.0)),
            analysis(Methodology::Pasta, "old", 400)
                .with_confidence(1.0)
                .with_risk(Risk::new("r3", "Fraud", 7.0)),
        ];
        let metrics = score(&pool, &[]);
        let ids: Vec<&str> = metrics.top_risks.iter().map(|r| r.risk_id.as_str()).collect();
        assert_eq!(ids, vec!["r3", "r2", "r1"]);
        assert!((metrics.top_risks[0].adjusted_score - 5.6).abs() < 1e-9);
        assert!((metrics.top_risks[2].adjusted_score - 2.4).abs() < 1e-9);
    }

    #[test]
    fn roi_prices_controls_against_mitigated_threats() {
        let pool = vec![
            analysis(Methodology::Stride, "a", 1)
                .with_threat(Threat::new("t1", "Replay", "spoofing", "high"))
                .with_control(Control::new("c1", "Nonce").with_state("implemented").mitigating("t1")),
        ];
        let roi = score(&pool, &[]).roi;
        assert_eq!(roi.implemented_controls, 1);
        assert!((roi.investment - 10_000.0).abs() < 1e-9);
        assert!((roi.risk_reduction_value - 100_000.0).abs() < 1e-9);
        assert!((roi.roi - 9.0).abs() < 1e-9);
        assert_eq!(roi.potential_roi, 0.0);
    }

    #[test]
    fn rising_scores_read_as_worsening() {
        let pool = vec![
            analysis(Methodology::Stride, "old", 100).with_risk(Risk::new("r1", "A", 2.0)),
            analysis(Methodology::Pasta, "new", 1).with_risk(Risk::new("r2", "B", 8.0)),
        ];
        assert_eq!(score(&pool, &[]).trend, RiskTrend::Worsening);

        let single = vec![analysis(Methodology::Stride, "only", 1).with_risk(Risk::new("r", "A", 9.0))];
        assert_eq!(score(&single, &[]).trend, RiskTrend::Stable);
    }
}
