#![deny(missing_docs)]
//! Node.js bindings that surface the neohome transform pipeline.
//!
//! Syntax highlighting goes through an optional JavaScript
//! `highlight(source, language)` callback that returns markup or `null`.
//! Trees are returned as hast JSON.

use napi::bindgen_prelude::*;
use napi_derive::napi;
use neohome_astro::{Highlight, Highlighter, Options, Pipeline};
use neohome_core::{HighlightError, PipelineError, extract_frontmatter};
use serde_json::Value as JsonValue;
use std::path::Path;
use std::sync::Arc;

/// Batch processing types.
pub mod batch;
/// Bridge from a calling-thread highlighter to the pipeline.
pub mod highlight;
/// NAPI-exposed data structures.
pub mod types;
pub use batch::*;
pub use types::*;

fn empty_frontmatter() -> JsonValue {
    JsonValue::Object(Default::default())
}

/// Extracts YAML frontmatter without transforming the document.
#[napi]
pub fn parse_frontmatter(content: String) -> napi::Result<FrontmatterResult> {
    match extract_frontmatter(&content) {
        Ok(result) => Ok(FrontmatterResult {
            frontmatter: result.value,
            errors: Vec::new(),
        }),
        Err(err) => Ok(FrontmatterResult {
            frontmatter: empty_frontmatter(),
            errors: vec![err.to_string()],
        }),
    }
}

const WORKER_PANICKED: &str = "Transform worker panicked";

/// Runs the full pipeline over one document.
fn run_transform(
    source: &str,
    filepath: &str,
    options: Options,
    highlighter: Option<Arc<dyn Highlighter>>,
) -> std::result::Result<TransformResult, String> {
    let mut pipeline = Pipeline::new(options);
    if let Some(highlighter) = highlighter {
        pipeline = pipeline.with_highlighter(highlighter);
    }
    let output = pipeline
        .transform(source, Path::new(filepath))
        .map_err(|err: PipelineError| err.to_string())?;
    TransformResult::try_from(output).map_err(|err| format!("Failed to serialize tree: {err}"))
}

/// Transforms one document, serving `highlight` from the current thread.
fn transform_one<H>(
    source: &str,
    filepath: &str,
    options: Options,
    highlight: Option<H>,
) -> std::result::Result<TransformResult, String>
where
    H: FnMut(&str, &str) -> std::result::Result<Highlight, HighlightError>,
{
    match highlight {
        None => run_transform(source, filepath, options, None),
        Some(highlight) => highlight::with_local_highlighter(highlight, |highlighter| {
            run_transform(source, filepath, options, Some(highlighter))
        })
        .unwrap_or_else(|_| Err(WORKER_PANICKED.to_string())),
    }
}

fn js_highlighter<'a>(
    callback: &'a Function<'_, FnArgs<(String, String)>, Option<String>>,
) -> impl FnMut(&str, &str) -> std::result::Result<Highlight, HighlightError> + 'a {
    move |source, language| {
        let args = (source.to_string(), language.to_string());
        highlight::highlight_from_js(callback.call(args.into()))
    }
}

/// Transforms a markdown document into an enriched hast tree.
///
/// # Arguments
///
/// * `source` - Markdown text including its frontmatter block
/// * `filepath` - Absolute path of the document; `file` includes resolve against it
/// * `config` - Optional `{ highlightTimeoutMs, includeRoot, allowRawHtml, lazyImages }`
/// * `highlight` - Optional `(source, language) => string | null`; `null`
///   means no grammar for the language and leaves the block as text
///
/// # Example (JavaScript)
///
/// ```javascript
/// const { transformDocument } = require('neohome-napi');
///
/// const path = '/site/src/content/post/hello.md';
/// const { tree, headings, frontmatter } = transformDocument(source, path, null, highlight);
/// console.log(frontmatter.estimation.text); // "3 min read"
/// ```
#[napi(js_name = "transformDocument")]
pub fn transform_document(
    source: String,
    filepath: String,
    config: Option<TransformConfig>,
    highlight: Option<Function<FnArgs<(String, String)>, Option<String>>>,
) -> napi::Result<TransformResult> {
    let options = config.unwrap_or_default().to_options();
    let highlight = highlight.as_ref().map(js_highlighter);
    transform_one(&source, &filepath, options, highlight).map_err(Error::from_reason)
}

/// Transforms many documents in parallel using Rayon.
///
/// Documents are independent; results come back in input order.
///
/// # Example (JavaScript)
///
/// ```javascript
/// const { transformBatch } = require('neohome-napi');
///
/// const result = transformBatch(entries, { continueOnError: true }, highlight);
/// const { total, processingTimeMs } = result.stats;
/// console.log(`Processed ${total} posts in ${processingTimeMs}ms`);
/// ```
#[napi(js_name = "transformBatch")]
pub fn transform_batch(
    inputs: Vec<BatchInput>,
    options: Option<BatchOptions>,
    highlight: Option<Function<FnArgs<(String, String)>, Option<String>>>,
) -> napi::Result<BatchProcessingResult> {
    let options = options.unwrap_or_default();
    let result = match highlight.as_ref().map(js_highlighter) {
        None => process_batch(inputs, options, None),
        Some(highlight) => highlight::with_local_highlighter(highlight, |highlighter| {
            process_batch(inputs, options, Some(highlighter))
        })
        .map_err(|_| Error::from_reason(WORKER_PANICKED))?,
    };
    Ok(result)
}

fn process_batch(
    inputs: Vec<BatchInput>,
    opts: BatchOptions,
    highlighter: Option<Arc<dyn Highlighter>>,
) -> BatchProcessingResult {
    use rayon::prelude::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Instant;

    let start = Instant::now();
    let continue_on_error = opts.continue_on_error.unwrap_or(true);
    let pipeline_options = opts.config.clone().unwrap_or_default().to_options();

    // Configure thread pool if max_threads is specified
    let pool = if let Some(max_threads) = opts.max_threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(max_threads as usize)
            .build()
            .ok()
    } else {
        None
    };

    let total = inputs.len() as u32;
    let succeeded = AtomicU32::new(0);
    let failed = AtomicU32::new(0);

    let process_input = |input: BatchInput| -> BatchResult {
        let filepath = input.filepath.clone().unwrap_or_else(|| input.id.clone());
        let options = pipeline_options.clone();
        match run_transform(&input.source, &filepath, options, highlighter.clone()) {
            Ok(result) => {
                succeeded.fetch_add(1, Ordering::Relaxed);
                BatchResult {
                    id: input.id,
                    result: Some(result),
                    error: None,
                }
            }
            Err(error) => {
                failed.fetch_add(1, Ordering::Relaxed);
                BatchResult {
                    id: input.id,
                    result: None,
                    error: Some(error),
                }
            }
        }
    };

    let results: Vec<BatchResult> = if continue_on_error {
        if let Some(pool) = pool {
            pool.install(|| inputs.into_par_iter().map(process_input).collect())
        } else {
            inputs.into_par_iter().map(process_input).collect()
        }
    } else {
        // Stop on first error, sequentially so the cut-off is deterministic
        let mut results = Vec::with_capacity(inputs.len());
        for input in inputs {
            let result = process_input(input);
            let had_error = result.error.is_some();
            results.push(result);
            if had_error {
                break;
            }
        }
        results
    };

    let elapsed = start.elapsed();

    BatchProcessingResult {
        results,
        stats: BatchStats {
            total,
            succeeded: succeeded.load(Ordering::Relaxed),
            failed: failed.load(Ordering::Relaxed),
            processing_time_ms: elapsed.as_secs_f64() * 1000.0,
        },
    }
}
