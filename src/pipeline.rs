//! End-to-end orchestration of one extraction run.
//!
//! Files are processed strictly in sequence: extract → normalize → translate
//! the forward literal list → synthesize keys → rewrite in memory → persist
//! bytes → commit the staged catalog entries. Every failure is recovered at
//! the file boundary; the run continues with the next file.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use colored::Colorize;

use crate::catalog::CatalogStore;
use crate::config::Config;
use crate::extract::{self, SpanRecord};
use crate::keygen::KeySynthesizer;
use crate::rewrite::{self, Substitution};
use crate::translate::{self, KeyTranslator};
use crate::walker::{self, WalkOptions};

pub struct ExtractOptions {
    /// Comma-separated target: one directory, or explicit file paths.
    pub target: String,
    /// Key prefix overriding the path-derived suggestion.
    pub prefix: Option<String>,
    pub include_html: bool,
    pub verbose: bool,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub files_scanned: usize,
    pub files_rewritten: usize,
    pub literals_replaced: usize,
    pub entries_written: usize,
    pub files_failed: usize,
}

/// Run the extract pipeline over the target tree.
pub fn run_extract(config: &Config, cwd: &Path, opts: &ExtractOptions) -> Result<RunSummary> {
    let translator = translate::make_translator(config);
    run_extract_with(config, cwd, opts, translator.as_ref())
}

/// Pipeline entry with an injected translator, used directly by tests.
pub fn run_extract_with(
    config: &Config,
    cwd: &Path,
    opts: &ExtractOptions,
    translator: &dyn KeyTranslator,
) -> Result<RunSummary> {
    let catalog_dir = config.catalog_dir(cwd);
    let mut store = CatalogStore::load(&catalog_dir, &config.file_type)
        .context("Failed to load the catalog")?;

    let files = walker::collect_files(
        &opts.target,
        &WalkOptions {
            ignore_dir: &config.ignore_dir,
            ignore_file: &config.ignore_file,
            catalog_dir: &catalog_dir,
            include_html: opts.include_html,
            verbose: opts.verbose,
        },
    );

    let mut summary = RunSummary {
        files_scanned: files.len(),
        ..Default::default()
    };

    for file in &files {
        match process_file(config, opts, translator, &mut store, file) {
            Ok(Some(stats)) => {
                summary.files_rewritten += 1;
                summary.literals_replaced += stats.replaced;
                summary.entries_written += stats.written;
                if opts.verbose {
                    println!(
                        "{} {} ({} literal(s), {} new key(s))",
                        "rewrote".green().bold(),
                        file.display(),
                        stats.replaced,
                        stats.written
                    );
                }
            }
            Ok(None) => {}
            Err(err) => {
                store.discard_pending();
                summary.files_failed += 1;
                eprintln!(
                    "{} {}: {:#}",
                    "skipped".yellow().bold(),
                    file.display(),
                    err
                );
            }
        }
    }

    Ok(summary)
}

struct FileStats {
    replaced: usize,
    written: usize,
}

fn process_file(
    config: &Config,
    opts: &ExtractOptions,
    translator: &dyn KeyTranslator,
    store: &mut CatalogStore,
    file: &Path,
) -> Result<Option<FileStats>> {
    let source = fs::read_to_string(file).context("Failed to read file")?;

    let spans = extract::extract_file(file, &source, config.vue_version)?;
    let spans = extract::normalize(spans);
    if spans.is_empty() {
        return Ok(None);
    }

    // The normalizer hands back reverse order; translation and key
    // assignment run over the forward list.
    let forward: Vec<&SpanRecord> = spans.iter().rev().collect();
    let fragments: Vec<String> = forward
        .iter()
        .map(|s| translate::prepare_fragment(&s.text))
        .collect();
    let tokens = translator
        .translate_batch(&fragments)
        .context("Translator failed")?;
    if tokens.len() != forward.len() {
        bail!(
            "Translator returned {} token(s) for {} literal(s)",
            tokens.len(),
            forward.len()
        );
    }

    let mut synthesizer = KeySynthesizer::new(store, file, opts.prefix.as_deref());
    let mut keys_by_start: HashMap<usize, String> = HashMap::new();
    for (span, token) in forward.iter().zip(&tokens) {
        let assignment = synthesizer.assign(&span.text, token);
        keys_by_start.insert(span.start, assignment.key);
    }

    let substitutions: Vec<Substitution> = spans
        .iter()
        .map(|span| Substitution {
            span: span.clone(),
            key: keys_by_start[&span.start].clone(),
        })
        .collect();

    let outcome = rewrite::rewrite_file(&source, file, &substitutions, &config.import_i18n)?;
    fs::write(file, &outcome.content).context("Failed to write rewritten file")?;

    // Catalog entries land only after the bytes are safely on disk.
    let written = store
        .commit_pending(true)
        .context("Failed to persist catalog entries")?;

    Ok(Some(FileStats {
        replaced: outcome.replaced,
        written,
    }))
}
