//! Conflict detection and resolution.
//!
//! Detection groups comparable records from different methodologies under
//! a matching key and flags groups whose values diverge past a threshold.
//! Every group must span at least two methodologies. Resolution is
//! type-specific and deterministic; its confidence falls as the inputs
//! spread further apart.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use weave_config::WeaveConfig;
use weave_core::enums::{ConflictType, Effectiveness, Methodology, Severity};
use weave_core::findings::{
    ClassificationInput, Conflict, ConflictDetails, ConflictResolution, EffectivenessInput,
    ResolutionMethod, ResolvedValue, ScoreInput, SeverityInput,
};
use weave_core::normalize::canonical_name;
use weave_core::records::StandardizedAnalysis;

use crate::pool::{PoolIndex, ThreatRef};
use crate::stats::{day_window, mean, min_max, ratio, spread, std_dev, weighted_mean};
use crate::text::{compact, control_key, keywords};

/// Methodologies whose risk scores override a lower consensus.
const SPECIALISED_SCORERS: [Methodology; 3] =
    [Methodology::Dread, Methodology::Linddun, Methodology::Maestro];

/// Methodologies whose identification of a threat settles its existence.
const AUTHORITATIVE: [Methodology; 2] = [Methodology::Stride, Methodology::StpaSec];

const IDENTICAL_CONFIDENCE: f64 = 0.95;
const ADJACENT_CONFIDENCE: f64 = 0.8;
const WIDE_CONFIDENCE: f64 = 0.6;
const ADJACENT_STD_DEV: f64 = 1.5;
const SPECIALIST_CONFIDENCE_FLOOR: f64 = 0.75;
const MAJORITY_CONFIDENCE: f64 = 0.8;
const SEVERITY_KEYWORDS: usize = 3;

/// Methodologies specialised in a normalized threat category.
#[must_use]
pub fn category_specialists(category: &str) -> &'static [Methodology] {
    match category {
        "information-disclosure" | "privacy" | "linkability" | "identifiability" => {
            &[Methodology::Linddun]
        }
        "spoofing" | "tampering" | "repudiation" | "elevation-of-privilege" => {
            &[Methodology::Stride]
        }
        "denial-of-service" => &[Methodology::Stride, Methodology::StpaSec, Methodology::Hazop],
        "supply-chain" => &[Methodology::Pasta],
        "prompt-injection" | "model-poisoning" | "data-poisoning" | "model-theft"
        | "adversarial-input" => &[Methodology::Maestro],
        _ => &[],
    }
}

/// Detect conflicts with the default calibration.
#[must_use]
pub fn detect_conflicts(analyses: &[StandardizedAnalysis]) -> Vec<Conflict> {
    let config = WeaveConfig::default();
    ConflictResolver::new(&config, Utc::now()).detect(analyses)
}

/// Detect and resolve conflicts with the default calibration, judging
/// recency against the current time.
#[must_use]
pub fn resolve_conflicts(analyses: &[StandardizedAnalysis]) -> Vec<ConflictResolution> {
    let config = WeaveConfig::default();
    ConflictResolver::new(&config, Utc::now()).resolve_all(analyses)
}

/// Detects and adjudicates cross-methodology disagreements.
#[derive(Debug, Clone, Copy)]
pub struct ConflictResolver<'c> {
    config: &'c WeaveConfig,
    as_of: DateTime<Utc>,
}

impl<'c> ConflictResolver<'c> {
    #[must_use]
    pub const fn new(config: &'c WeaveConfig, as_of: DateTime<Utc>) -> Self {
        Self { config, as_of }
    }

    /// Conflicts in detection order with ids `CONF-001`, ...
    #[must_use]
    pub fn detect(&self, analyses: &[StandardizedAnalysis]) -> Vec<Conflict> {
        self.detect_in(&PoolIndex::build(analyses))
    }

    #[must_use]
    pub fn resolve_all(&self, analyses: &[StandardizedAnalysis]) -> Vec<ConflictResolution> {
        self.resolve_in(&PoolIndex::build(analyses))
    }

    pub(crate) fn resolve_in(&self, index: &PoolIndex<'_>) -> Vec<ConflictResolution> {
        self.detect_in(index)
            .into_iter()
            .map(|conflict| self.resolve(conflict))
            .collect()
    }

    pub(crate) fn detect_in(&self, index: &PoolIndex<'_>) -> Vec<Conflict> {
        let mut conflicts = self.risk_score_conflicts(index);
        conflicts.extend(effectiveness_conflicts(index));
        conflicts.extend(existence_conflicts(index));
        conflicts.extend(classification_conflicts(index));
        conflicts.extend(severity_conflicts(index));

        for (position, conflict) in conflicts.iter_mut().enumerate() {
            conflict.id = format!("CONF-{:03}", position + 1);
        }
        tracing::debug!(conflicts = conflicts.len(), "conflict detection complete");
        conflicts
    }

    /// Adjudicate one conflict.
    #[must_use]
    pub fn resolve(&self, conflict: Conflict) -> ConflictResolution {
        let (method, resolved_value, confidence, rationale) = match &conflict.details {
            ConflictDetails::RiskScore { scores, .. } => self.resolve_scores(scores),
            ConflictDetails::ControlEffectiveness { assessments } => {
                self.resolve_effectiveness(assessments)
            }
            ConflictDetails::ThreatExistence {
                category,
                identified_by,
                missing_from,
                ..
            } => resolve_existence(category, identified_by, missing_from),
            ConflictDetails::EntityClassification { classifications } => {
                resolve_classification(classifications)
            }
            ConflictDetails::SeverityRating { ratings, .. } => self.resolve_severity(ratings),
        };
        ConflictResolution {
            conflict,
            method,
            resolved_value,
            confidence,
            rationale,
        }
    }

    // -----------------------------------------------------------------------
    // Detection
    // -----------------------------------------------------------------------

    fn risk_score_conflicts(&self, index: &PoolIndex<'_>) -> Vec<Conflict> {
        let calibration = &self.config.calibration;
        let mut groups: BTreeMap<String, Vec<ScoreInput>> = BTreeMap::new();

        for (at, analysis) in index.analyses.iter().enumerate() {
            for risk in &analysis.risks {
                let key = match risk.entity.as_deref().filter(|r| !r.trim().is_empty()) {
                    Some(reference) => index.resolve(at, reference),
                    None => canonical_name(&risk.name),
                };
                if key.is_empty() {
                    continue;
                }
                groups.entry(key).or_default().push(ScoreInput {
                    methodology: analysis.methodology,
                    analysis_id: index.analysis_ids[at].clone(),
                    score: risk.score,
                    confidence: analysis.confidence(),
                });
            }
        }

        groups
            .into_iter()
            .filter(|(_, scores)| distinct_methodologies(scores.iter().map(|s| s.methodology)) >= 2)
            .filter_map(|(key, scores)| {
                let values: Vec<f64> = scores.iter().map(|s| s.score).collect();
                let spread = spread(&values);
                let std_dev = std_dev(&values);
                if spread <= calibration.risk_spread_threshold
                    && std_dev <= calibration.risk_std_dev_threshold
                {
                    return None;
                }
                let (_, max) = min_max(&values);
                let severity = if max >= 7.0 {
                    Severity::High
                } else {
                    Severity::Medium
                };
                let methodologies: Vec<Methodology> = scores.iter().map(|s| s.methodology).collect();
                let sources: Vec<String> = scores.iter().map(|s| s.analysis_id.clone()).collect();
                Some(conflict(
                    ConflictType::RiskScoreMismatch,
                    index.display_name(&key),
                    methodologies,
                    sources,
                    severity,
                    ConflictDetails::RiskScore {
                        scores,
                        spread,
                        std_dev,
                    },
                ))
            })
            .collect()
    }

    // -----------------------------------------------------------------------
    // Resolution
    // -----------------------------------------------------------------------

    fn resolve_scores(&self, scores: &[ScoreInput]) -> Resolved {
        let values: Vec<f64> = scores.iter().map(|s| s.score).collect();
        let weighted: Vec<(f64, f64)> = scores.iter().map(|s| (s.score, s.confidence)).collect();
        let average = if scores.iter().any(|s| s.confidence > 0.0) {
            weighted_mean(&weighted)
        } else {
            mean(&values)
        };
        let confidence = score_confidence(&values);

        let ratio = self.config.calibration.specialist_override_ratio;
        let specialist = scores
            .iter()
            .filter(|s| SPECIALISED_SCORERS.contains(&s.methodology))
            .filter(|s| average > 0.0 && s.score >= average * ratio)
            .max_by(|a, b| a.score.total_cmp(&b.score));

        match specialist {
            Some(input) => (
                ResolutionMethod::SpecialistOverride,
                ResolvedValue::Score(input.score),
                confidence,
                format!(
                    "{} specialises in this risk and scored {:.1}, at least {ratio}x the weighted average of {average:.1}",
                    input.methodology, input.score
                ),
            ),
            None => (
                ResolutionMethod::WeightedAverage,
                ResolvedValue::Score(average),
                confidence,
                format!(
                    "Confidence-weighted average of {} scores ranging {:.1}-{:.1}",
                    values.len(),
                    min_max(&values).0,
                    min_max(&values).1
                ),
            ),
        }
    }

    fn resolve_effectiveness(&self, assessments: &[EffectivenessInput]) -> Resolved {
        let all_levels: Vec<f64> = assessments.iter().map(|a| a.effectiveness.level()).collect();
        let window = day_window(self.config.calibration.recency_window_days);
        let recent: Vec<f64> = assessments
            .iter()
            .filter(|a| self.as_of.signed_duration_since(a.imported_at) <= window)
            .map(|a| a.effectiveness.level())
            .collect();

        let (method, levels, basis) = if !recent.is_empty() && recent.len() < all_levels.len() {
            (
                ResolutionMethod::RecencyWeightedAverage,
                &recent,
                format!(
                    "{} of {} assessments fall within the last {} days",
                    recent.len(),
                    all_levels.len(),
                    self.config.calibration.recency_window_days
                ),
            )
        } else {
            (
                ResolutionMethod::WeightedAverage,
                &all_levels,
                format!("all {} assessments", all_levels.len()),
            )
        };
        let average = mean(levels);
        let label = Effectiveness::from_level(average);
        (
            method,
            ResolvedValue::Label(label.as_str().to_string()),
            label_confidence(&all_levels),
            format!("Average effectiveness level {average:.2} over {basis}"),
        )
    }

    fn resolve_severity(&self, ratings: &[SeverityInput]) -> Resolved {
        let scales: Vec<f64> = ratings.iter().map(|r| r.severity.scale()).collect();
        // Each vote counts methodology trust times the analysis' own confidence.
        let votes: Vec<(f64, f64)> = ratings
            .iter()
            .map(|r| {
                let trust = *self.config.severity_trust.get(r.methodology);
                (r.severity.scale(), trust * clamp_unit(r.confidence))
            })
            .collect();
        let average = if votes.iter().any(|(_, w)| *w > 0.0) {
            weighted_mean(&votes)
        } else {
            mean(&scales)
        };
        let weighted = Severity::from_scale(average);
        let confidence = label_confidence(&scales);

        let any_critical = ratings.iter().any(|r| r.severity == Severity::Critical);
        if any_critical && weighted < Severity::High {
            (
                ResolutionMethod::ConservativeEscalation,
                ResolvedValue::Label(Severity::High.as_str().to_string()),
                confidence,
                format!(
                    "Weighted severity {average:.2} reads as {weighted}; raised to high because at least one methodology rated it critical"
                ),
            )
        } else {
            (
                ResolutionMethod::TrustWeightedSeverity,
                ResolvedValue::Label(weighted.as_str().to_string()),
                confidence,
                format!(
                    "Confidence and trust weighted severity {average:.2} over {} ratings",
                    ratings.len()
                ),
            )
        }
    }
}

type Resolved = (ResolutionMethod, ResolvedValue, f64, String);

fn conflict(
    conflict_type: ConflictType,
    subject: String,
    methodologies: impl IntoIterator<Item = Methodology>,
    sources: impl IntoIterator<Item = String>,
    severity: Severity,
    details: ConflictDetails,
) -> Conflict {
    Conflict {
        id: String::new(),
        conflict_type,
        subject,
        methodologies: methodologies
            .into_iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect(),
        details,
        severity,
        sources: sources
            .into_iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect(),
    }
}

fn distinct_methodologies(methodologies: impl Iterator<Item = Methodology>) -> usize {
    methodologies.collect::<BTreeSet<_>>().len()
}

fn category_of(threat_ref: &ThreatRef<'_>) -> String {
    let category = threat_ref.threat.category_key();
    if category.is_empty() {
        "uncategorized".to_string()
    } else {
        category
    }
}

fn target_display(index: &PoolIndex<'_>, threat_ref: &ThreatRef<'_>) -> String {
    threat_ref
        .entity
        .as_deref()
        .map_or_else(|| threat_ref.target.clone(), |key| index.display_name(key))
}

fn effectiveness_conflicts(index: &PoolIndex<'_>) -> Vec<Conflict> {
    let mut groups: BTreeMap<String, Vec<EffectivenessInput>> = BTreeMap::new();
    for (at, analysis) in index.analyses.iter().enumerate() {
        for control in &analysis.controls {
            let key = control_key(&control.name);
            let Some(label) = control.effectiveness_label() else {
                continue;
            };
            if key.is_empty() {
                continue;
            }
            groups.entry(key).or_default().push(EffectivenessInput {
                methodology: analysis.methodology,
                analysis_id: index.analysis_ids[at].clone(),
                control_name: control.name.trim().to_string(),
                label: label.to_string(),
                effectiveness: Effectiveness::from_label(label),
                imported_at: analysis.metadata.imported_at,
            });
        }
    }

    groups
        .into_values()
        .filter(|inputs| distinct_methodologies(inputs.iter().map(|i| i.methodology)) >= 2)
        .filter(|inputs| {
            inputs
                .iter()
                .any(|i| i.effectiveness != inputs[0].effectiveness)
        })
        .map(|assessments| {
            let lowest = assessments.iter().map(|a| a.effectiveness).min();
            let highest = assessments.iter().map(|a| a.effectiveness).max();
            let severity = if lowest == Some(Effectiveness::Ineffective)
                && highest == Some(Effectiveness::High)
            {
                Severity::High
            } else {
                Severity::Medium
            };
            conflict(
                ConflictType::ControlEffectivenessDisagreement,
                assessments[0].control_name.clone(),
                assessments.iter().map(|a| a.methodology).collect::<Vec<_>>(),
                assessments.iter().map(|a| a.analysis_id.clone()).collect::<Vec<_>>(),
                severity,
                ConflictDetails::ControlEffectiveness { assessments },
            )
        })
        .collect()
}

fn existence_conflicts(index: &PoolIndex<'_>) -> Vec<Conflict> {
    let mut groups: BTreeMap<(String, String), Vec<&ThreatRef<'_>>> = BTreeMap::new();
    for threat_ref in &index.threats {
        groups
            .entry((category_of(threat_ref), threat_ref.target.clone()))
            .or_default()
            .push(threat_ref);
    }

    let mut conflicts = Vec::new();
    for ((category, _), threats) in groups {
        let identified_by: BTreeSet<Methodology> =
            threats.iter().map(|t| t.analysis.methodology).collect();
        let missing_from: Vec<Methodology> = index
            .methodologies
            .difference(&identified_by)
            .copied()
            .collect();
        if missing_from.is_empty() {
            continue;
        }
        let Some(highest_severity) = threats.iter().map(|t| t.threat.severity()).max() else {
            continue;
        };
        if !highest_severity.is_elevated() {
            continue;
        }

        let target = target_display(index, threats[0]);
        conflicts.push(conflict(
            ConflictType::ThreatExistenceConflict,
            format!("{category} on {target}"),
            identified_by.iter().chain(&missing_from).copied().collect::<Vec<_>>(),
            threats.iter().map(|t| t.analysis_id.clone()).collect::<Vec<_>>(),
            highest_severity,
            ConflictDetails::ThreatExistence {
                category,
                target,
                identified_by: identified_by.into_iter().collect(),
                missing_from,
                highest_severity,
            },
        ));
    }
    conflicts
}

fn classification_conflicts(index: &PoolIndex<'_>) -> Vec<Conflict> {
    index
        .entities
        .values()
        .filter(|record| record.methodologies.len() >= 2)
        .filter_map(|record| {
            let types: BTreeSet<String> = record
                .occurrences
                .iter()
                .map(|o| compact(&o.entity.entity_type))
                .filter(|t| !t.is_empty())
                .collect();
            if types.len() < 2 {
                return None;
            }
            let classifications: Vec<ClassificationInput> = record
                .occurrences
                .iter()
                .filter(|o| !compact(&o.entity.entity_type).is_empty())
                .map(|o| ClassificationInput {
                    methodology: o.analysis.methodology,
                    analysis_id: o.analysis.id(),
                    entity_type: o.entity.entity_type.trim().to_string(),
                    confidence: clamp_unit(o.entity.confidence),
                })
                .collect();
            Some(conflict(
                ConflictType::EntityClassificationConflict,
                record.name.clone(),
                record.methodologies.iter().copied(),
                record.sources.iter().cloned(),
                Severity::Low,
                ConflictDetails::EntityClassification { classifications },
            ))
        })
        .collect()
}

fn severity_conflicts(index: &PoolIndex<'_>) -> Vec<Conflict> {
    type SeverityKey = (String, String, Vec<String>);
    let mut groups: BTreeMap<SeverityKey, Vec<&ThreatRef<'_>>> = BTreeMap::new();
    for threat_ref in &index.threats {
        let threat = threat_ref.threat;
        let words = keywords(
            &format!("{} {}", threat.name, threat.description),
            SEVERITY_KEYWORDS,
        );
        groups
            .entry((category_of(threat_ref), threat_ref.target.clone(), words))
            .or_default()
            .push(threat_ref);
    }

    groups
        .into_iter()
        .filter(|(_, threats)| {
            distinct_methodologies(threats.iter().map(|t| t.analysis.methodology)) >= 2
        })
        .filter_map(|((_, _, words), threats)| {
            let ratings: Vec<SeverityInput> = threats
                .iter()
                .map(|t| SeverityInput {
                    methodology: t.analysis.methodology,
                    analysis_id: t.analysis_id.clone(),
                    threat_name: t.threat.name.trim().to_string(),
                    severity: t.threat.severity(),
                    confidence: t.analysis.confidence(),
                })
                .collect();
            let has_low = ratings.iter().any(|r| !r.severity.is_elevated());
            let has_high = ratings.iter().any(|r| r.severity.is_elevated());
            if !(has_low && has_high) {
                return None;
            }
            let severity = if ratings.iter().any(|r| r.severity == Severity::Critical) {
                Severity::High
            } else {
                Severity::Medium
            };
            Some(conflict(
                ConflictType::SeverityRatingConflict,
                ratings[0].threat_name.clone(),
                ratings.iter().map(|r| r.methodology).collect::<Vec<_>>(),
                ratings.iter().map(|r| r.analysis_id.clone()).collect::<Vec<_>>(),
                severity,
                ConflictDetails::SeverityRating {
                    ratings,
                    keywords: words,
                },
            ))
        })
        .collect()
}

fn resolve_existence(
    category: &str,
    identified_by: &[Methodology],
    missing_from: &[Methodology],
) -> Resolved {
    let identified = identified_by.len();
    let total = identified + missing_from.len();
    let share = ratio(identified, total);

    let specialist = category_specialists(category)
        .iter()
        .find(|m| identified_by.contains(m));
    let authority = AUTHORITATIVE.iter().find(|m| identified_by.contains(m));

    match (specialist, authority) {
        (Some(methodology), _) => (
            ResolutionMethod::SpecialistIdentification,
            ResolvedValue::Exists(true),
            share.max(SPECIALIST_CONFIDENCE_FLOOR),
            format!("Identified by {methodology}, which specialises in {category} threats"),
        ),
        (None, Some(methodology)) => (
            ResolutionMethod::AuthoritativeSource,
            ResolvedValue::Exists(true),
            share.max(SPECIALIST_CONFIDENCE_FLOOR),
            format!("Identified by {methodology}, an authoritative threat enumeration"),
        ),
        (None, None) => (
            ResolutionMethod::MajorityVote,
            ResolvedValue::Exists(identified > missing_from.len()),
            share,
            format!("{identified} of {total} methodologies identified the threat"),
        ),
    }
}

fn resolve_classification(classifications: &[ClassificationInput]) -> Resolved {
    let mut counts: BTreeMap<String, (usize, &str)> = BTreeMap::new();
    for input in classifications {
        counts
            .entry(compact(&input.entity_type))
            .or_insert((0, input.entity_type.as_str()))
            .0 += 1;
    }
    let total = classifications.len();
    let majority = counts
        .values()
        .find(|(count, _)| count * 2 > total)
        .map(|(count, label)| (*count, *label));

    if let Some((count, label)) = majority {
        return (
            ResolutionMethod::MajorityClassification,
            ResolvedValue::Label(label.to_string()),
            MAJORITY_CONFIDENCE,
            format!("{count} of {total} methodologies classify it as {label}"),
        );
    }

    let best = classifications
        .iter()
        .reduce(|best, next| if next.confidence > best.confidence { next } else { best });
    match best {
        Some(input) => (
            ResolutionMethod::HighestConfidence,
            ResolvedValue::Label(input.entity_type.clone()),
            input.confidence,
            format!(
                "No majority; {} reported {} with the highest confidence ({:.2})",
                input.methodology, input.entity_type, input.confidence
            ),
        ),
        None => (
            ResolutionMethod::HighestConfidence,
            ResolvedValue::Label(String::new()),
            0.0,
            "No classifications to compare".to_string(),
        ),
    }
}

/// Confidence from the spread of numeric scores.
fn score_confidence(values: &[f64]) -> f64 {
    if spread(values) <= f64::EPSILON {
        IDENTICAL_CONFIDENCE
    } else if std_dev(values) <= ADJACENT_STD_DEV {
        ADJACENT_CONFIDENCE
    } else {
        WIDE_CONFIDENCE
    }
}

/// Confidence from the spread of ordinal label levels (one step = 1.0).
fn label_confidence(levels: &[f64]) -> f64 {
    let range = spread(levels);
    if range <= f64::EPSILON {
        IDENTICAL_CONFIDENCE
    } else if range <= 1.0 {
        ADJACENT_CONFIDENCE
    } else {
        WIDE_CONFIDENCE
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}
