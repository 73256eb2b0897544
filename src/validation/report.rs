use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// Min/max/total of a series of request durations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TimingSummary {
    pub requests: u64,
    pub min_ms: f64,
    pub max_ms: f64,
    pub total_ms: f64,
}

impl TimingSummary {
    pub fn record(&mut self, duration: Duration) {
        let ms = duration.as_secs_f64() * 1000.0;
        if self.requests == 0 {
            self.min_ms = ms;
            self.max_ms = ms;
        } else {
            self.min_ms = self.min_ms.min(ms);
            self.max_ms = self.max_ms.max(ms);
        }
        self.requests += 1;
        self.total_ms += ms;
    }

    pub fn merge(&mut self, other: &TimingSummary) {
        if other.requests == 0 {
            return;
        }
        if self.requests == 0 {
            *self = *other;
            return;
        }
        self.min_ms = self.min_ms.min(other.min_ms);
        self.max_ms = self.max_ms.max(other.max_ms);
        self.requests += other.requests;
        self.total_ms += other.total_ms;
    }

    pub fn avg_ms(&self) -> f64 {
        if self.requests == 0 {
            0.0
        } else {
            self.total_ms / self.requests as f64
        }
    }
}

/// Outcome of one held-out fold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoldResult {
    pub fold: usize,
    pub training_nodes: usize,
    pub test_nodes: usize,
    pub tests: u64,
    pub passed: u64,
    /// `rank_hits[r]` counts linked neighbours found at rank `r`.
    pub rank_hits: Vec<u64>,
    pub timing: TimingSummary,
}

impl FoldResult {
    pub fn new(fold: usize, suggestions_per_test: usize) -> Self {
        Self {
            fold,
            training_nodes: 0,
            test_nodes: 0,
            tests: 0,
            passed: 0,
            rank_hits: vec![0; suggestions_per_test],
            timing: TimingSummary::default(),
        }
    }

    pub fn precision(&self) -> f64 {
        ratio(self.passed, self.tests)
    }
}

/// Aggregated cross-validation results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KFoldReport {
    pub generated_at: DateTime<Utc>,
    pub folds: usize,
    pub suggestions_per_test: usize,
    pub fold_order: String,
    pub fold_results: Vec<FoldResult>,
    pub tests: u64,
    pub passed: u64,
    pub rank_hits: Vec<u64>,
    pub timing: TimingSummary,
}

impl KFoldReport {
    pub fn new(folds: usize, suggestions_per_test: usize, fold_order: impl Into<String>) -> Self {
        Self {
            generated_at: Utc::now(),
            folds,
            suggestions_per_test,
            fold_order: fold_order.into(),
            fold_results: Vec::with_capacity(folds),
            tests: 0,
            passed: 0,
            rank_hits: vec![0; suggestions_per_test],
            timing: TimingSummary::default(),
        }
    }

    /// Fold `result` into the totals.
    pub fn push_fold(&mut self, result: FoldResult) {
        self.tests += result.tests;
        self.passed += result.passed;
        for (total, hits) in self.rank_hits.iter_mut().zip(&result.rank_hits) {
            *total += hits;
        }
        self.timing.merge(&result.timing);
        self.fold_results.push(result);
    }

    /// Passed over tests. Can exceed 1 when held-out connectors carry
    /// several links.
    pub fn precision(&self) -> f64 {
        ratio(self.passed, self.tests)
    }

    pub fn rank_rate(&self, rank: usize) -> f64 {
        ratio(self.rank_hits.get(rank).copied().unwrap_or(0), self.tests)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// One row per fold plus a `total` row.
    pub fn write_csv(&self, output_path: &Path) -> Result<(), csv::Error> {
        let mut writer = csv::Writer::from_path(output_path)?;

        let mut header = vec![
            "fold".to_string(),
            "training_nodes".to_string(),
            "test_nodes".to_string(),
            "tests".to_string(),
            "passed".to_string(),
            "precision".to_string(),
        ];
        header.extend((0..self.suggestions_per_test).map(|r| format!("rank_{r}")));
        header.extend(
            ["min_ms", "max_ms", "avg_ms", "total_ms"]
                .iter()
                .map(|s| s.to_string()),
        );
        writer.write_record(&header)?;

        for fold in &self.fold_results {
            let mut row = vec![
                fold.fold.to_string(),
                fold.training_nodes.to_string(),
                fold.test_nodes.to_string(),
                fold.tests.to_string(),
                fold.passed.to_string(),
                format!("{:.4}", fold.precision()),
            ];
            row.extend(fold.rank_hits.iter().map(|h| h.to_string()));
            row.extend(timing_columns(&fold.timing));
            writer.write_record(&row)?;
        }

        let mut total = vec![
            "total".to_string(),
            String::new(),
            String::new(),
            self.tests.to_string(),
            self.passed.to_string(),
            format!("{:.4}", self.precision()),
        ];
        total.extend(self.rank_hits.iter().map(|h| h.to_string()));
        total.extend(timing_columns(&self.timing));
        writer.write_record(&total)?;

        writer.flush()?;
        Ok(())
    }
}

impl fmt::Display for KFoldReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}-fold cross validation ({} order, top {}) at {}",
            self.folds,
            self.fold_order,
            self.suggestions_per_test,
            self.generated_at.to_rfc3339()
        )?;
        for fold in &self.fold_results {
            writeln!(
                f,
                "  fold {:>2}: {:>6} tests, {:>6} passed ({:.1}%)",
                fold.fold,
                fold.tests,
                fold.passed,
                fold.precision() * 100.0
            )?;
        }
        writeln!(
            f,
            "Total: {} tests, {} passed, precision {:.1}%",
            self.tests,
            self.passed,
            self.precision() * 100.0
        )?;
        for (rank, hits) in self.rank_hits.iter().enumerate() {
            writeln!(
                f,
                "  rank {}: {} hits ({:.1}%)",
                rank,
                hits,
                self.rank_rate(rank) * 100.0
            )?;
        }
        write!(
            f,
            "Timing: {} requests, min {:.3} ms, max {:.3} ms, avg {:.3} ms, total {:.1} ms",
            self.timing.requests,
            self.timing.min_ms,
            self.timing.max_ms,
            self.timing.avg_ms(),
            self.timing.total_ms
        )
    }
}

fn timing_columns(timing: &TimingSummary) -> Vec<String> {
    vec![
        format!("{:.3}", timing.min_ms),
        format!("{:.3}", timing.max_ms),
        format!("{:.3}", timing.avg_ms()),
        format!("{:.3}", timing.total_ms),
    ]
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}
