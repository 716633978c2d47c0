//! Reads analysis files into memory. The only async code in the workspace.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde_json::Value;
use weave_core::records::StandardizedAnalysis;
use weave_engine::AnalysisStore;

/// Read every file, then insert the analyses into one store in file order.
pub async fn load_store(paths: &[PathBuf], strict: bool) -> anyhow::Result<AnalysisStore> {
    let mut store = AnalysisStore::new();
    for path in paths {
        store.extend(load_file(path, strict).await?);
    }
    Ok(store)
}

async fn load_file(path: &Path, strict: bool) -> anyhow::Result<Vec<StandardizedAnalysis>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let analyses = parse_analyses(&content)
        .with_context(|| format!("failed to parse analyses in {}", path.display()))?;

    if strict {
        for analysis in &analyses {
            analysis
                .validate()
                .with_context(|| format!("invalid analysis in {}", path.display()))?;
        }
    }

    tracing::debug!(
        path = %path.display(),
        analyses = analyses.len(),
        "loaded analysis file"
    );
    Ok(analyses)
}

/// A file holds either one analysis object or an array of them.
fn parse_analyses(content: &str) -> anyhow::Result<Vec<StandardizedAnalysis>> {
    let value: Value = serde_json::from_str(content).context("file is not valid JSON")?;
    match value {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(position, item)| {
                serde_json::from_value(item)
                    .with_context(|| format!("analysis at index {position} has the wrong shape"))
            })
            .collect(),
        object @ Value::Object(_) => Ok(vec![
            serde_json::from_value(object).context("analysis has the wrong shape")?,
        ]),
        _ => anyhow::bail!("expected an analysis object or an array of analyses"),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;
    use tempfile::NamedTempFile;
    use weave_core::enums::Methodology;

    use super::*;

    const STRIDE: &str = r#"{
        "methodology": "STRIDE",
        "metadata": { "source": "workshop", "imported_at": "2026-09-01T10:00:00Z", "confidence": 0.9 },
        "entities": [ { "id": "e1", "name": "Payment API", "type": "process" } ],
        "threats": [
            { "id": "t1", "name": "Token replay", "category": "spoofing", "severity": "high", "affected_entity": "e1" }
        ]
    }"#;

    fn write_temp(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(content.as_bytes()).expect("write temp file");
        file
    }

    #[test]
    fn single_object_is_one_analysis() {
        let analyses = parse_analyses(STRIDE).expect("should parse");
        assert_eq!(analyses.len(), 1);
        assert_eq!(analyses[0].methodology, Methodology::Stride);
        assert_eq!(analyses[0].entities[0].name, "Payment API");
    }

    #[test]
    fn array_holds_several_analyses() {
        let content = format!(
            r#"[{STRIDE}, {{ "methodology": "pasta", "metadata": {{ "source": "bia", "imported_at": "2026-09-02T10:00:00Z" }} }}]"#
        );
        let analyses = parse_analyses(&content).expect("should parse");
        let methodologies: Vec<Methodology> = analyses.iter().map(|a| a.methodology).collect();
        assert_eq!(methodologies, vec![Methodology::Stride, Methodology::Pasta]);
        assert_eq!(analyses[1].metadata.confidence, 0.5);
    }

    #[test]
    fn scalar_json_is_rejected() {
        let error = parse_analyses("42").expect_err("scalar should fail");
        assert!(error.to_string().contains("expected an analysis object"));
    }

    #[test]
    fn wrong_shape_names_the_index() {
        let content = format!(r#"[{STRIDE}, {{ "methodology": "STRIDE" }}]"#);
        let error = parse_analyses(&content).expect_err("missing metadata should fail");
        assert!(format!("{error:#}").contains("index 1"));
    }

    #[tokio::test]
    async fn files_are_merged_into_one_store() {
        let first = write_temp(STRIDE);
        let second = write_temp(
            r#"{ "methodology": "DREAD", "metadata": { "source": "scoring", "imported_at": "2026-09-03T10:00:00Z" } }"#,
        );
        let store = load_store(&[first.path().to_path_buf(), second.path().to_path_buf()], false)
            .await
            .expect("should load");
        assert_eq!(store.analyses().len(), 2);
    }

    #[tokio::test]
    async fn missing_file_reports_its_path() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("absent.json");
        let error = load_store(&[path.clone()], false)
            .await
            .expect_err("missing file should fail");
        assert!(error.to_string().contains(&path.display().to_string()));
    }

    #[tokio::test]
    async fn strict_mode_rejects_out_of_range_confidence() {
        let file = write_temp(
            r#"{ "methodology": "STRIDE", "metadata": { "source": "x", "imported_at": "2026-09-01T10:00:00Z", "confidence": 1.7 } }"#,
        );
        let paths = [file.path().to_path_buf()];

        assert!(load_store(&paths, true).await.is_err());
        let lenient = load_store(&paths, false).await.expect("lenient load");
        assert_eq!(lenient.analyses().len(), 1);
    }
}
