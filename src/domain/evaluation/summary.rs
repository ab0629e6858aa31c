use serde::Serialize;

use super::EvaluationRecord;

/// Aggregate metrics for one backend label
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackendSummary {
    pub backend: String,
    pub questions: usize,
    pub hit_rate: f64,
    pub mean_faithfulness: Option<f64>,
    pub mean_helpfulness: Option<f64>,
    pub mean_overlap_percent: f64,
    /// Records with at least one API symbol absent from the context
    pub suspect_api_answers: usize,
    pub mean_latency_retrieval_ms: f64,
    pub mean_latency_llm_ms: f64,
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Per-backend summaries, in order of first appearance
pub fn summarize(records: &[EvaluationRecord]) -> Vec<BackendSummary> {
    let mut backends: Vec<&str> = Vec::new();
    for record in records {
        if !backends.contains(&record.backend.as_str()) {
            backends.push(&record.backend);
        }
    }

    backends
        .into_iter()
        .map(|backend| {
            let rows: Vec<&EvaluationRecord> =
                records.iter().filter(|r| r.backend == backend).collect();

            BackendSummary {
                backend: backend.to_string(),
                questions: rows.len(),
                hit_rate: mean(rows.iter().map(|r| f64::from(r.hit_at_k))).unwrap_or(0.0),
                mean_faithfulness: mean(rows.iter().filter_map(|r| r.faithfulness.map(f64::from))),
                mean_helpfulness: mean(rows.iter().filter_map(|r| r.helpfulness.map(f64::from))),
                mean_overlap_percent: mean(rows.iter().map(|r| r.overlap_percent)).unwrap_or(0.0),
                suspect_api_answers: rows.iter().filter(|r| r.has_suspect_api()).count(),
                mean_latency_retrieval_ms: mean(rows.iter().map(|r| r.latency_retrieval_ms))
                    .unwrap_or(0.0),
                mean_latency_llm_ms: mean(rows.iter().map(|r| r.latency_llm_ms)).unwrap_or(0.0),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn record(backend: &str, hit: u8, faithfulness: Option<u8>, suspect: bool) -> EvaluationRecord {
        EvaluationRecord {
            backend: backend.to_string(),
            question: "q".into(),
            gold_source: "dates.md".into(),
            hit_at_k: hit,
            faithfulness,
            helpfulness: None,
            judge_notes: String::new(),
            latency_retrieval_ms: 10.0,
            latency_llm_ms: 100.0,
            overlap_percent: 80.0,
            api_only_in_answer: if suspect {
                BTreeSet::from(["ql.Made".to_string()])
            } else {
                BTreeSet::new()
            },
            answer: "a".into(),
            retrieved_sources: vec![],
        }
    }

    #[test]
    fn test_summarize_groups_by_backend_in_order() {
        let records = vec![
            record("local", 1, None, false),
            record("cloud", 1, Some(5), false),
            record("local", 0, None, true),
            record("cloud", 0, Some(3), false),
        ];

        let summaries = summarize(&records);

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].backend, "local");
        assert_eq!(summaries[0].questions, 2);
        assert_eq!(summaries[0].hit_rate, 0.5);
        assert_eq!(summaries[0].mean_faithfulness, None);
        assert_eq!(summaries[0].suspect_api_answers, 1);
        assert_eq!(summaries[1].backend, "cloud");
        assert_eq!(summaries[1].mean_faithfulness, Some(4.0));
        assert_eq!(summaries[1].mean_latency_llm_ms, 100.0);
    }

    #[test]
    fn test_summarize_empty() {
        assert!(summarize(&[]).is_empty());
    }
}
