//! Read-only cross-analysis index built once per synthesis run.
//!
//! Entity references inside an analysis are resolved to the canonical
//! (lower-cased) entity name: an id declared by the same analysis wins,
//! anything else is taken as a name. Every derived map is ordered so that
//! detection output does not depend on hashing.

use std::collections::{BTreeMap, BTreeSet};

use weave_core::enums::Methodology;
use weave_core::normalize::canonical_name;
use weave_core::records::{Entity, StandardizedAnalysis, Threat};

use crate::text::control_key;

/// Target key used for threats that name neither an entity nor a relationship.
pub(crate) const SYSTEM_TARGET: &str = "system";

/// One analysis' view of an entity.
#[derive(Debug, Clone, Copy)]
pub(crate) struct EntityOccurrence<'a> {
    pub analysis: &'a StandardizedAnalysis,
    pub entity: &'a Entity,
}

/// A distinct entity across the pool.
#[derive(Debug, Clone)]
pub(crate) struct EntityRecord<'a> {
    /// First-seen display name.
    pub name: String,
    pub occurrences: Vec<EntityOccurrence<'a>>,
    pub methodologies: BTreeSet<Methodology>,
    pub sources: BTreeSet<String>,
}

impl EntityRecord<'_> {
    pub fn any(&self, predicate: impl Fn(&Entity) -> bool) -> bool {
        self.occurrences.iter().any(|o| predicate(o.entity))
    }

    pub fn is_high_criticality(&self) -> bool {
        self.any(|e| e.properties.is_high_criticality())
    }
}

/// A directed edge between two canonical entity names.
#[derive(Debug, Clone)]
pub(crate) struct EdgeRecord {
    pub source: String,
    pub target: String,
    pub methodologies: BTreeSet<Methodology>,
    pub sources: BTreeSet<String>,
}

/// A threat with its resolved target and mitigation count.
#[derive(Debug, Clone)]
pub(crate) struct ThreatRef<'a> {
    pub analysis: &'a StandardizedAnalysis,
    pub analysis_id: String,
    pub threat: &'a Threat,
    /// Canonical entity name, `relationship:<id>` or [`SYSTEM_TARGET`].
    pub target: String,
    /// Set when the target is an entity.
    pub entity: Option<String>,
    pub mitigators: usize,
}

impl ThreatRef<'_> {
    pub fn is_unmitigated(&self) -> bool {
        self.mitigators == 0
    }
}

#[derive(Debug)]
pub(crate) struct PoolIndex<'a> {
    pub analyses: &'a [StandardizedAnalysis],
    pub analysis_ids: Vec<String>,
    pub methodologies: BTreeSet<Methodology>,
    pub entities: BTreeMap<String, EntityRecord<'a>>,
    pub threats: Vec<ThreatRef<'a>>,
    /// Entity → distinct protecting control keys.
    pub protecting: BTreeMap<String, BTreeSet<String>>,
    /// Entity → distinct canonical names of threats that reference it.
    pub threats_on: BTreeMap<String, BTreeSet<String>>,
    pub edges: BTreeMap<(String, String), EdgeRecord>,
    /// Entity → number of distinct edges touching it.
    pub degree: BTreeMap<String, usize>,
    entity_ids: Vec<BTreeMap<&'a str, String>>,
}

impl<'a> PoolIndex<'a> {
    pub fn build(analyses: &'a [StandardizedAnalysis]) -> Self {
        let analysis_ids: Vec<String> = analyses.iter().map(StandardizedAnalysis::id).collect();
        let methodologies = analyses.iter().map(|a| a.methodology).collect();

        let mut entities: BTreeMap<String, EntityRecord<'a>> = BTreeMap::new();
        let mut entity_ids = Vec::with_capacity(analyses.len());
        for (analysis, analysis_id) in analyses.iter().zip(&analysis_ids) {
            let mut ids = BTreeMap::new();
            for entity in &analysis.entities {
                let key = entity.canonical_name();
                if key.is_empty() {
                    continue;
                }
                ids.insert(entity.id.as_str(), key.clone());
                let record = entities.entry(key).or_insert_with(|| EntityRecord {
                    name: entity.name.trim().to_string(),
                    occurrences: Vec::new(),
                    methodologies: BTreeSet::new(),
                    sources: BTreeSet::new(),
                });
                record.occurrences.push(EntityOccurrence { analysis, entity });
                record.methodologies.insert(analysis.methodology);
                record.sources.insert(analysis_id.clone());
            }
            entity_ids.push(ids);
        }

        let mut index = Self {
            analyses,
            analysis_ids,
            methodologies,
            entities,
            threats: Vec::new(),
            protecting: BTreeMap::new(),
            threats_on: BTreeMap::new(),
            edges: BTreeMap::new(),
            degree: BTreeMap::new(),
            entity_ids,
        };
        index.index_controls();
        index.index_threats();
        index.index_relationships();
        index
    }

    /// Canonical entity name for a reference made inside analysis `at`.
    pub fn resolve(&self, at: usize, reference: &str) -> String {
        self.entity_ids
            .get(at)
            .and_then(|ids| ids.get(reference))
            .cloned()
            .unwrap_or_else(|| canonical_name(reference))
    }

    /// Display name for a canonical entity key.
    pub fn display_name(&self, key: &str) -> String {
        self.entities
            .get(key)
            .map_or_else(|| key.to_string(), |record| record.name.clone())
    }

    pub fn is_empty(&self) -> bool {
        self.analyses.is_empty()
    }

    pub fn has_methodology(&self, predicate: impl Fn(Methodology) -> bool) -> bool {
        self.methodologies.iter().any(|m| predicate(*m))
    }

    /// Entities (and relationship endpoints) known to the pool.
    pub fn node_count(&self) -> usize {
        let mut nodes: BTreeSet<&str> = self.entities.keys().map(String::as_str).collect();
        for (source, target) in self.edges.keys() {
            nodes.insert(source);
            nodes.insert(target);
        }
        nodes.len()
    }

    /// Controls protecting an entity, zero when unknown.
    pub fn protection(&self, key: &str) -> usize {
        self.protecting.get(key).map_or(0, BTreeSet::len)
    }

    fn index_controls(&mut self) {
        let analyses = self.analyses;
        let mut protecting: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for (at, analysis) in analyses.iter().enumerate() {
            for control in &analysis.controls {
                let Some(reference) = control.protects_entity.as_deref() else {
                    continue;
                };
                let mut key = control_key(&control.name);
                if key.is_empty() {
                    key = canonical_name(&control.id);
                }
                protecting
                    .entry(self.resolve(at, reference))
                    .or_default()
                    .insert(key);
            }
        }
        self.protecting = protecting;
    }

    fn index_threats(&mut self) {
        let analyses = self.analyses;
        // A control mitigates a threat named by id in its own analysis, or by
        // name in any analysis.
        let mut by_id: Vec<BTreeMap<&str, BTreeSet<(usize, usize)>>> =
            vec![BTreeMap::new(); analyses.len()];
        let mut by_name: BTreeMap<String, BTreeSet<(usize, usize)>> = BTreeMap::new();
        for (at, analysis) in analyses.iter().enumerate() {
            for (position, control) in analysis.controls.iter().enumerate() {
                if let Some(reference) = control.mitigates_threat.as_deref() {
                    by_id[at].entry(reference).or_default().insert((at, position));
                    by_name
                        .entry(canonical_name(reference))
                        .or_default()
                        .insert((at, position));
                }
            }
        }

        let mut threats = Vec::new();
        let mut threats_on: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for (at, analysis) in analyses.iter().enumerate() {
            for threat in &analysis.threats {
                let mut mitigators: BTreeSet<(usize, usize)> =
                    by_id[at].get(threat.id.as_str()).cloned().unwrap_or_default();
                if let Some(named) = by_name.get(&canonical_name(&threat.name)) {
                    mitigators.extend(named.iter().copied());
                }

                let entity = threat
                    .affected_entity
                    .as_deref()
                    .filter(|r| !r.trim().is_empty())
                    .map(|r| self.resolve(at, r));
                let target = match (&entity, threat.affected_relationship.as_deref()) {
                    (Some(key), _) => key.clone(),
                    (None, Some(relationship)) if !relationship.trim().is_empty() => {
                        format!("relationship:{}", canonical_name(relationship))
                    }
                    _ => SYSTEM_TARGET.to_string(),
                };
                if let Some(key) = &entity {
                    threats_on
                        .entry(key.clone())
                        .or_default()
                        .insert(canonical_name(&threat.name));
                }

                threats.push(ThreatRef {
                    analysis,
                    analysis_id: self.analysis_ids[at].clone(),
                    threat,
                    target,
                    entity,
                    mitigators: mitigators.len(),
                });
            }
        }
        self.threats = threats;
        self.threats_on = threats_on;
    }

    fn index_relationships(&mut self) {
        let analyses = self.analyses;
        let mut edges: BTreeMap<(String, String), EdgeRecord> = BTreeMap::new();
        for (at, analysis) in analyses.iter().enumerate() {
            for relationship in &analysis.relationships {
                let source = self.resolve(at, &relationship.source);
                let target = self.resolve(at, &relationship.target);
                if source.is_empty() || target.is_empty() {
                    continue;
                }
                let edge = edges
                    .entry((source.clone(), target.clone()))
                    .or_insert_with(|| EdgeRecord {
                        source,
                        target,
                        methodologies: BTreeSet::new(),
                        sources: BTreeSet::new(),
                    });
                edge.methodologies.insert(analysis.methodology);
                edge.sources.insert(self.analysis_ids[at].clone());
            }
        }

        let mut degree: BTreeMap<String, usize> = BTreeMap::new();
        for (source, target) in edges.keys() {
            *degree.entry(source.clone()).or_default() += 1;
            if source != target {
                *degree.entry(target.clone()).or_default() += 1;
            }
        }
        self.edges = edges;
        self.degree = degree;
    }
}
