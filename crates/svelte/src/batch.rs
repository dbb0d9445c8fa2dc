//! Parallel processing of many documents.

use crate::processor::{Jana, TransformOutput, is_markdown};
use rayon::prelude::*;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;

/// A single document to transform.
#[derive(Debug, Clone)]
pub struct BatchInput {
    /// File identifier (typically the file path).
    pub id: String,
    /// Markdown source.
    pub source: String,
}

impl BatchInput {
    /// Creates an input from an identifier and its source.
    pub fn new(id: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
        }
    }
}

/// Result for a single document in a batch.
#[derive(Debug, Clone)]
pub struct BatchResult {
    /// File identifier matching the input.
    pub id: String,
    /// Transform output (present on success).
    pub output: Option<TransformOutput>,
    /// Error message (present on failure).
    pub error: Option<String>,
}

/// Statistics for batch processing.
#[derive(Debug, Clone, Default)]
pub struct BatchStats {
    /// Total number of inputs.
    pub total: u32,
    /// Number of documents transformed.
    pub succeeded: u32,
    /// Number of documents that failed.
    pub failed: u32,
    /// Number of inputs skipped because they are not markdown.
    pub skipped: u32,
    /// Wall time in milliseconds.
    pub processing_time_ms: f64,
}

/// Options for batch processing.
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    /// Maximum number of threads to use. Defaults to the rayon global pool.
    pub max_threads: Option<u32>,
}

/// All results of a batch, in input order, plus statistics.
#[derive(Debug, Clone)]
pub struct BatchProcessingResult {
    /// Individual results for each input.
    pub results: Vec<BatchResult>,
    /// Processing statistics.
    pub stats: BatchStats,
}

impl Jana {
    /// Transforms many documents in parallel.
    ///
    /// A failing or panicking document never affects the others. Non-markdown inputs
    /// yield a result with neither output nor error.
    pub fn transform_batch(
        &self,
        inputs: Vec<BatchInput>,
        options: &BatchOptions,
    ) -> BatchProcessingResult {
        let start = Instant::now();

        let pool = options.max_threads.and_then(|max_threads| {
            rayon::ThreadPoolBuilder::new()
                .num_threads(max_threads as usize)
                .build()
                .map_err(|err| log::warn!("Falling back to the global thread pool: {}", err))
                .ok()
        });

        let total = inputs.len() as u32;
        let succeeded = AtomicU32::new(0);
        let failed = AtomicU32::new(0);
        let skipped = AtomicU32::new(0);

        let process_input = |input: BatchInput| -> BatchResult {
            if !is_markdown(&input.id) {
                skipped.fetch_add(1, Ordering::Relaxed);
                return BatchResult {
                    id: input.id,
                    output: None,
                    error: None,
                };
            }

            match self.process_contained(&input.source, &input.id) {
                Ok(code) => {
                    succeeded.fetch_add(1, Ordering::Relaxed);
                    BatchResult {
                        id: input.id,
                        output: Some(TransformOutput { code, map: None }),
                        error: None,
                    }
                }
                Err(err) => {
                    failed.fetch_add(1, Ordering::Relaxed);
                    log::error!("Failed to process Markdown file \"{}\": {}", input.id, err);
                    BatchResult {
                        id: input.id,
                        output: None,
                        error: Some(err.to_string()),
                    }
                }
            }
        };

        let results: Vec<BatchResult> = match pool {
            Some(pool) => pool.install(|| inputs.into_par_iter().map(process_input).collect()),
            None => inputs.into_par_iter().map(process_input).collect(),
        };

        BatchProcessingResult {
            results,
            stats: BatchStats {
                total,
                succeeded: succeeded.load(Ordering::Relaxed),
                failed: failed.load(Ordering::Relaxed),
                skipped: skipped.load(Ordering::Relaxed),
                processing_time_ms: start.elapsed().as_secs_f64() * 1000.0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hast::Node;
    use crate::processor::{JanaBuilder, JanaOptions};
    use jana_core::{JanaError, ProcessingContext};

    fn failing_on(marker: &'static str) -> Jana {
        let options = JanaOptions::default().with_component("p", "$lib/P.svelte");
        JanaBuilder::new("/nonexistent/root", options)
            .add_markup_pass(
                move |tree: &mut Node, _ctx: &mut ProcessingContext| -> Result<(), JanaError> {
                    let html = crate::hast::to_html(tree);
                    if html.contains(marker) {
                        return Err(JanaError::pass("guard", format!("found {}", marker)));
                    }
                    Ok(())
                },
            )
            .build()
            .unwrap()
    }

    #[test]
    fn keeps_input_order_and_counts() {
        let jana = failing_on("BOOM");
        let inputs = vec![
            BatchInput::new("a.md", "# A"),
            BatchInput::new("b.md", "BOOM"),
            BatchInput::new("c.ts", "export {}"),
            BatchInput::new("d.md", "Hello"),
        ];

        let result = jana.transform_batch(inputs, &BatchOptions::default());
        let ids: Vec<&str> = result.results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a.md", "b.md", "c.ts", "d.md"]);

        assert_eq!(result.stats.total, 4);
        assert_eq!(result.stats.succeeded, 2);
        assert_eq!(result.stats.failed, 1);
        assert_eq!(result.stats.skipped, 1);

        assert!(result.results[1].error.as_deref().unwrap().contains("guard"));
        assert!(result.results[2].output.is_none() && result.results[2].error.is_none());
        let d = result.results[3].output.as_ref().unwrap();
        assert!(d.code.contains("<P><p>Hello</p></P>"));
    }

    #[test]
    fn panicking_document_is_counted_as_failed() {
        let jana = JanaBuilder::new("/nonexistent/root", JanaOptions::default())
            .add_markup_pass(
                |tree: &mut Node, _ctx: &mut ProcessingContext| -> Result<(), JanaError> {
                    if crate::hast::to_html(tree).contains("BOOM") {
                        panic!("cannot handle BOOM");
                    }
                    Ok(())
                },
            )
            .build()
            .unwrap();
        let inputs = vec![
            BatchInput::new("bad.md", "BOOM"),
            BatchInput::new("good.md", "Fine"),
        ];

        let result = jana.transform_batch(inputs, &BatchOptions::default());
        assert_eq!(result.stats.total, 2);
        assert_eq!(result.stats.failed, 1);
        assert_eq!(result.stats.succeeded, 1);

        let error = result.results[0].error.as_deref().unwrap();
        assert!(error.contains("cannot handle BOOM"));
        assert!(result.results[1].output.as_ref().unwrap().code.contains("<p>Fine</p>"));
    }

    #[test]
    fn respects_thread_limit() {
        let jana = failing_on("never present");
        let inputs = (0..8)
            .map(|i| BatchInput::new(format!("doc{}.md", i), format!("# Title {}", i)))
            .collect();

        let result = jana.transform_batch(
            inputs,
            &BatchOptions {
                max_threads: Some(2),
            },
        );
        assert_eq!(result.stats.succeeded, 8);
        assert!(
            result
                .results
                .iter()
                .all(|r| r.output.as_ref().is_some_and(|o| o.code.contains("<h1>")))
        );
    }
}
