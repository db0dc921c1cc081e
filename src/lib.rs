//! Kiwi - Chinese-literal extraction and rewrite for front-end sources
//!
//! Kiwi walks a front-end source tree, locates every Chinese-language
//! literal in script and markup dialects, assigns each one a stable lookup
//! key, rewrites the source to reference that key, and maintains the
//! corresponding resource catalog on disk.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer
//! - `config`: Configuration file loading and parsing
//! - `walker`: Candidate-file enumeration
//! - `extract`: Per-dialect literal extractors and span normalization
//! - `catalog`: Catalog store, writer and module-file codec
//! - `translate`: Key-translation providers
//! - `keygen`: Key synthesis and collision avoidance
//! - `rewrite`: Context-sensitive source rewriting and import injection
//! - `pipeline`: End-to-end orchestration
//! - `utils`: Shared utility functions

pub mod catalog;
pub mod cli;
pub mod config;
pub mod extract;
pub mod keygen;
pub mod pipeline;
pub mod rewrite;
pub mod translate;
pub mod utils;
pub mod walker;
