//! File walker: enumerates candidate source files for extraction.
//!
//! The target is a comma-separated string: either one directory (walked
//! recursively) or an explicit list of files. Files under the catalog
//! directory are always excluded, and the result is filtered to the
//! supported source extensions.

use std::path::{Path, PathBuf};

use colored::Colorize;
use glob::Pattern;
use walkdir::WalkDir;

/// Extensions handled without opt-in.
const SCRIPT_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx", "vue"];

pub struct WalkOptions<'a> {
    /// Directory names to skip, glob-matched against each path component.
    pub ignore_dir: &'a [String],
    /// File names to skip, glob-matched against the file name.
    pub ignore_file: &'a [String],
    /// Absolute catalog directory; files beneath it are never candidates.
    pub catalog_dir: &'a Path,
    /// Also accept `.html` files.
    pub include_html: bool,
    pub verbose: bool,
}

/// Enumerate candidate files for a comma-separated target.
///
/// If the first token names a directory, the directory is walked recursively;
/// otherwise every token is treated as an explicit file path. Missing files
/// are skipped without error.
pub fn collect_files(target: &str, opts: &WalkOptions) -> Vec<PathBuf> {
    let tokens: Vec<&str> = target
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect();

    let mut files = match tokens.first() {
        Some(first) if Path::new(first).is_dir() => walk_dir(Path::new(first), opts),
        _ => tokens
            .iter()
            .map(PathBuf::from)
            .filter(|p| p.is_file())
            .collect(),
    };

    files.retain(|path| !under_catalog(path, opts.catalog_dir));
    files.retain(|path| has_candidate_extension(path, opts.include_html));
    files.sort();
    files
}

fn walk_dir(root: &Path, opts: &WalkOptions) -> Vec<PathBuf> {
    let dir_patterns = compile_patterns(opts.ignore_dir, "ignoreDir", opts.verbose);
    let file_patterns = compile_patterns(opts.ignore_file, "ignoreFile", opts.verbose);

    let mut files = Vec::new();
    let walker = WalkDir::new(root).into_iter().filter_entry(|entry| {
        if entry.file_type().is_dir() {
            let name = entry.file_name().to_string_lossy();
            !dir_patterns.iter().any(|p| p.matches(&name))
        } else {
            true
        }
    });

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                if opts.verbose {
                    eprintln!("{} Cannot access path: {}", "warning:".bold().yellow(), e);
                }
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if file_patterns.iter().any(|p| p.matches(&name)) {
            continue;
        }
        files.push(entry.into_path());
    }
    files
}

fn compile_patterns(patterns: &[String], label: &str, verbose: bool) -> Vec<Pattern> {
    patterns
        .iter()
        .filter_map(|p| match Pattern::new(p) {
            Ok(pattern) => Some(pattern),
            Err(e) => {
                if verbose {
                    eprintln!(
                        "{} Invalid {} pattern '{}': {}",
                        "warning:".bold().yellow(),
                        label,
                        p,
                        e
                    );
                }
                None
            }
        })
        .collect()
}

/// Whether `path` resolves beneath the catalog directory.
fn under_catalog(path: &Path, catalog_dir: &Path) -> bool {
    let absolute = match path.canonicalize() {
        Ok(p) => p,
        Err(_) => match std::env::current_dir() {
            Ok(cwd) => cwd.join(path),
            Err(_) => path.to_path_buf(),
        },
    };
    let catalog = catalog_dir
        .canonicalize()
        .unwrap_or_else(|_| catalog_dir.to_path_buf());
    absolute.starts_with(&catalog)
}

fn has_candidate_extension(path: &Path, include_html: bool) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if SCRIPT_EXTENSIONS.contains(&ext) => true,
        Some("html") => include_html,
        _ => false,
    }
}
