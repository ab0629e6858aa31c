//! Offline evaluation of the answer pipeline against a labelled test set

use std::sync::Arc;
use std::time::Instant;

use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use super::answer_pipeline::AnswerPipeline;
use crate::domain::answer::{build_context, CONTEXT_SEPARATOR};
use crate::domain::evaluation::{
    analyze_answer, hit_at_k, AnswerScorer, ApiSymbolPattern, EvaluationRecord, RubricScores,
    TestCase, JUDGE_DISABLED, JUDGE_SKIPPED,
};
use crate::domain::retrieval::RetrievedPassage;
use crate::domain::DomainError;
use crate::infrastructure::observability::record_judge;

/// Characters of each passage shown to the rubric judge
pub const JUDGE_PASSAGE_CHARS: usize = 800;

#[derive(Debug, Clone)]
pub struct Evaluator {
    pipeline: Arc<AnswerPipeline>,
    scorer: Option<Arc<dyn AnswerScorer>>,
    backend_label: String,
    api_pattern: ApiSymbolPattern,
}

impl Evaluator {
    pub fn new(
        pipeline: Arc<AnswerPipeline>,
        backend_label: impl Into<String>,
        api_pattern: ApiSymbolPattern,
    ) -> Self {
        Self {
            pipeline,
            scorer: None,
            backend_label: backend_label.into(),
            api_pattern,
        }
    }

    pub fn with_scorer(mut self, scorer: Arc<dyn AnswerScorer>) -> Self {
        self.scorer = Some(scorer);
        self
    }

    pub fn backend_label(&self) -> &str {
        &self.backend_label
    }

    pub fn has_scorer(&self) -> bool {
        self.scorer.is_some()
    }

    /// Evaluate one question
    ///
    /// Retrieval runs once; the same passages feed the answer (on a cache
    /// miss), hit@k, the hallucination analysis and the judge.
    pub async fn evaluate_single(
        &self,
        question: &str,
        gold_source: &str,
        k: usize,
        use_judge: bool,
    ) -> Result<EvaluationRecord, DomainError> {
        let t0 = Instant::now();
        let passages = self.pipeline.inspect_retrieval(question, k).await?;
        let t1 = Instant::now();

        let config = self.pipeline.config();
        let result = self
            .pipeline
            .answer_with_passages(question, k, config.max_chars_per_passage, passages.clone())
            .await?;
        let t2 = Instant::now();

        let retrieved_sources: Vec<String> = passages
            .iter()
            .map(|p| p.source_basename().to_string())
            .collect();
        let hit = hit_at_k(gold_source, &retrieved_sources);

        let scores = if use_judge {
            self.score(question, &passages, &result.answer_text).await
        } else {
            RubricScores::unscored(JUDGE_SKIPPED)
        };

        let analysis = analyze_answer(&result.answer_text, &full_context(&passages), &self.api_pattern);

        Ok(EvaluationRecord {
            backend: self.backend_label.clone(),
            question: question.to_string(),
            gold_source: gold_source.to_string(),
            hit_at_k: hit,
            faithfulness: scores.faithfulness,
            helpfulness: scores.helpfulness,
            judge_notes: scores.notes,
            latency_retrieval_ms: millis(t1 - t0),
            latency_llm_ms: millis(t2 - t1),
            overlap_percent: analysis.overlap_percent,
            api_only_in_answer: analysis.api_only_in_answer,
            answer: result.answer_text,
            retrieved_sources,
        })
    }

    /// Evaluate every case with up to `concurrency` questions in flight
    ///
    /// Records come back in input order. The first pipeline error aborts the
    /// run; judge failures are recorded per row instead.
    pub async fn evaluate_dataset(
        &self,
        cases: &[TestCase],
        k: usize,
        use_judge: bool,
        concurrency: usize,
    ) -> Result<Vec<EvaluationRecord>, DomainError> {
        info!(
            backend = %self.backend_label,
            cases = cases.len(),
            k = k,
            use_judge = use_judge,
            "Starting evaluation"
        );

        let results: Vec<Result<EvaluationRecord, DomainError>> = stream::iter(cases)
            .map(|case| self.evaluate_single(&case.question, &case.gold_source, k, use_judge))
            .buffered(concurrency.max(1))
            .collect()
            .await;

        let records = results.into_iter().collect::<Result<Vec<_>, _>>()?;

        let hits = records.iter().filter(|r| r.hit_at_k == 1).count();
        info!(
            backend = %self.backend_label,
            questions = records.len(),
            hits = hits,
            "Evaluation finished"
        );

        Ok(records)
    }

    /// Score answers produced by an earlier run that skipped the judge
    ///
    /// Each question is retrieved again to rebuild the judge context. Without
    /// a scorer the records are returned with `judge_disabled` notes where no
    /// note was recorded yet.
    pub async fn judge_existing_answers(
        &self,
        records: Vec<EvaluationRecord>,
        k: usize,
    ) -> Result<Vec<EvaluationRecord>, DomainError> {
        if self.scorer.is_none() {
            warn!("No judge configured, leaving scores empty");
            return Ok(records
                .into_iter()
                .map(|mut record| {
                    if record.judge_notes.is_empty() {
                        record.judge_notes = JUDGE_DISABLED.to_string();
                    }
                    record
                })
                .collect());
        }

        let mut judged = Vec::with_capacity(records.len());
        for mut record in records {
            let passages = self.pipeline.inspect_retrieval(&record.question, k).await?;
            let scores = self.score(&record.question, &passages, &record.answer).await;

            record.faithfulness = scores.faithfulness;
            record.helpfulness = scores.helpfulness;
            record.judge_notes = scores.notes;
            judged.push(record);
        }

        Ok(judged)
    }

    async fn score(&self, question: &str, passages: &[RetrievedPassage], answer: &str) -> RubricScores {
        let Some(ref scorer) = self.scorer else {
            return RubricScores::unscored(JUDGE_DISABLED);
        };

        let context = build_context(passages, JUDGE_PASSAGE_CHARS);
        match scorer.score(question, &context, answer).await {
            Ok(scores) => {
                record_judge("scored");
                scores
            }
            Err(e) => {
                warn!(classification = e.classification(), "Rubric judge failed: {}", e);
                record_judge(e.classification());
                RubricScores::from_error(&e)
            }
        }
    }
}

fn full_context(passages: &[RetrievedPassage]) -> String {
    passages
        .iter()
        .map(|p| p.content.as_str())
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}

fn millis(elapsed: std::time::Duration) -> f64 {
    elapsed.as_secs_f64() * 1000.0
}
