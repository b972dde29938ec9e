use crate::error::EvalError;

use super::result::EvaluationResult;

/// Receives the completed fraction of a batch, a value in `[0, 1]`.
pub type ProgressSink = Box<dyn FnMut(f64) + Send>;

/// Puts results back into request order and reports progress.
///
/// Every slot is written exactly once; `completed()` always equals the number
/// of filled slots.
pub struct Collector {
    slots: Vec<Option<EvaluationResult>>,
    completed: usize,
    progress: Option<ProgressSink>,
}

impl Collector {
    /// Creates a collector with `total` empty slots.
    pub fn new(total: usize) -> Self {
        Self {
            slots: vec![None; total],
            completed: 0,
            progress: None,
        }
    }

    pub fn with_progress(mut self, sink: ProgressSink) -> Self {
        self.progress = Some(sink);
        self
    }

    pub fn total(&self) -> usize {
        self.slots.len()
    }

    pub fn completed(&self) -> usize {
        self.completed
    }

    pub fn is_complete(&self) -> bool {
        self.completed == self.slots.len()
    }

    /// Completed fraction; an empty batch counts as done.
    pub fn progress(&self) -> f64 {
        if self.slots.is_empty() {
            1.0
        } else {
            self.completed as f64 / self.slots.len() as f64
        }
    }

    /// Stores `result` in its slot and notifies the progress sink.
    pub fn record(&mut self, result: EvaluationResult) -> Result<(), EvalError> {
        let total = self.slots.len();
        let index = result.index();
        let slot = self.slots.get_mut(index).ok_or_else(|| {
            EvalError::Batch(format!("result index {index} outside batch of {total}"))
        })?;
        if slot.is_some() {
            return Err(EvalError::Batch(format!(
                "result index {index} delivered twice"
            )));
        }
        *slot = Some(result);
        self.completed += 1;

        let fraction = self.progress();
        if let Some(sink) = self.progress.as_mut() {
            sink(fraction);
        }
        Ok(())
    }

    /// Returns the results in request order. Fails if any slot is still empty.
    pub fn finish(self) -> Result<Vec<EvaluationResult>, EvalError> {
        if !self.is_complete() {
            return Err(EvalError::Batch(format!(
                "batch finished with {} of {} results",
                self.completed,
                self.slots.len()
            )));
        }
        Ok(self.slots.into_iter().flatten().collect())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use super::*;
    use crate::evaluator::Outcome;

    fn result(index: usize) -> EvaluationResult {
        EvaluationResult::new(
            index,
            Outcome::Completed(format!("r{index}")),
            Duration::ZERO,
        )
    }

    fn recording_sink() -> (ProgressSink, Arc<Mutex<Vec<f64>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink_seen = Arc::clone(&seen);
        let sink: ProgressSink = Box::new(move |fraction| {
            sink_seen.lock().expect("progress lock").push(fraction)
        });
        (sink, seen)
    }

    #[test]
    fn restores_index_order() {
        let mut collector = Collector::new(3);
        for index in [2, 0, 1] {
            collector.record(result(index)).expect("record");
        }

        let texts: Vec<_> = collector
            .finish()
            .expect("complete")
            .iter()
            .map(|r| r.text())
            .collect();
        assert_eq!(texts, vec!["r0", "r1", "r2"]);
    }

    #[test]
    fn progress_is_reported_once_per_result() {
        let (sink, seen) = recording_sink();
        let mut collector = Collector::new(4).with_progress(sink);
        for index in [3, 1, 0, 2] {
            collector.record(result(index)).expect("record");
        }

        let seen = seen.lock().expect("progress lock").clone();
        assert_eq!(seen, vec![0.25, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn rejects_duplicates_and_out_of_range() {
        let mut collector = Collector::new(2);
        collector.record(result(0)).expect("first write");

        assert!(matches!(
            collector.record(result(0)),
            Err(EvalError::Batch(_))
        ));
        assert!(matches!(
            collector.record(result(2)),
            Err(EvalError::Batch(_))
        ));
        assert_eq!(collector.completed(), 1);
    }

    #[test]
    fn finish_requires_every_slot() {
        let mut collector = Collector::new(2);
        collector.record(result(1)).expect("record");
        assert!(!collector.is_complete());
        assert!(collector.finish().is_err());
    }

    #[test]
    fn empty_collector_is_complete() {
        let collector = Collector::new(0);
        assert!(collector.is_complete());
        assert_eq!(collector.progress(), 1.0);
        assert!(collector.finish().expect("empty").is_empty());
    }
}
