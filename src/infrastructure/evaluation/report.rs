//! CSV persistence of evaluation records

use std::collections::BTreeSet;
use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Serialize};

use crate::domain::evaluation::{summarize, BackendSummary, EvaluationRecord, TestCase};
use crate::domain::DomainError;

/// Separator used for list-valued columns
const LIST_SEPARATOR: &str = "|";

/// Flat CSV row; list columns are joined with `|`, missing scores are empty
#[derive(Debug, Serialize, Deserialize)]
struct ReportRow {
    backend: String,
    question: String,
    gold_source: String,
    hit_at_k: u8,
    faithfulness: Option<u8>,
    helpfulness: Option<u8>,
    #[serde(default)]
    judge_notes: String,
    latency_retrieval_ms: f64,
    latency_llm_ms: f64,
    overlap_percent: f64,
    #[serde(default)]
    api_only_in_answer: String,
    #[serde(default)]
    answer: String,
    #[serde(default)]
    retrieved_sources: String,
}

fn split_list(value: &str) -> impl Iterator<Item = String> + '_ {
    value
        .split(LIST_SEPARATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl From<&EvaluationRecord> for ReportRow {
    fn from(record: &EvaluationRecord) -> Self {
        Self {
            backend: record.backend.clone(),
            question: record.question.clone(),
            gold_source: record.gold_source.clone(),
            hit_at_k: record.hit_at_k,
            faithfulness: record.faithfulness,
            helpfulness: record.helpfulness,
            judge_notes: record.judge_notes.clone(),
            latency_retrieval_ms: record.latency_retrieval_ms,
            latency_llm_ms: record.latency_llm_ms,
            overlap_percent: record.overlap_percent,
            api_only_in_answer: record
                .api_only_in_answer
                .iter()
                .cloned()
                .collect::<Vec<_>>()
                .join(LIST_SEPARATOR),
            answer: record.answer.clone(),
            retrieved_sources: record.retrieved_sources.join(LIST_SEPARATOR),
        }
    }
}

impl From<ReportRow> for EvaluationRecord {
    fn from(row: ReportRow) -> Self {
        Self {
            api_only_in_answer: split_list(&row.api_only_in_answer).collect::<BTreeSet<_>>(),
            retrieved_sources: split_list(&row.retrieved_sources).collect(),
            backend: row.backend,
            question: row.question,
            gold_source: row.gold_source,
            hit_at_k: row.hit_at_k,
            faithfulness: row.faithfulness,
            helpfulness: row.helpfulness,
            judge_notes: row.judge_notes,
            latency_retrieval_ms: row.latency_retrieval_ms,
            latency_llm_ms: row.latency_llm_ms,
            overlap_percent: row.overlap_percent,
            answer: row.answer,
        }
    }
}

/// Ordered evaluation records of one or more backends
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvaluationReport {
    records: Vec<EvaluationRecord>,
}

impl EvaluationReport {
    pub fn new(records: Vec<EvaluationRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[EvaluationRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<EvaluationRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Concatenate reports, e.g. a local and a hosted run, keeping order
    pub fn concat(reports: impl IntoIterator<Item = EvaluationReport>) -> Self {
        Self {
            records: reports.into_iter().flat_map(|r| r.records).collect(),
        }
    }

    pub fn summary(&self) -> Vec<BackendSummary> {
        summarize(&self.records)
    }

    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<(), DomainError> {
        let path = path.as_ref();
        if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .map_err(|e| DomainError::storage(format!("Cannot create {}: {}", dir.display(), e)))?;
        }

        let mut writer = WriterBuilder::new()
            .from_path(path)
            .map_err(|e| DomainError::storage(format!("Cannot write {}: {}", path.display(), e)))?;

        for record in &self.records {
            writer
                .serialize(ReportRow::from(record))
                .map_err(|e| DomainError::storage(format!("Cannot write report row: {}", e)))?;
        }

        writer
            .flush()
            .map_err(|e| DomainError::storage(format!("Cannot flush {}: {}", path.display(), e)))
    }

    pub fn read_csv(path: impl AsRef<Path>) -> Result<Self, DomainError> {
        let path = path.as_ref();
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)
            .map_err(|e| DomainError::not_found(format!("Cannot read report {}: {}", path.display(), e)))?;

        let records = reader
            .deserialize::<ReportRow>()
            .map(|row| {
                row.map(EvaluationRecord::from).map_err(|e| {
                    DomainError::validation(format!("Malformed report row in {}: {}", path.display(), e))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { records })
    }
}

/// Load a JSON array of `{question, gold_source}` objects
pub fn load_test_set(path: impl AsRef<Path>) -> Result<Vec<TestCase>, DomainError> {
    let path = path.as_ref();
    let data = std::fs::read_to_string(path)
        .map_err(|e| DomainError::not_found(format!("Test set {}: {}", path.display(), e)))?;

    serde_json::from_str(&data)
        .map_err(|e| DomainError::validation(format!("Malformed test set {}: {}", path.display(), e)))
}
