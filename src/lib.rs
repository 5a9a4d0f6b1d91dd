//! # Downstream Dependents
//!
//! A Rust library for discovering repositories that depend on a module by
//! searching GitHub for manifest files that mention it.
//!
//! ## Main Components
//!
//! - [`DependentsSearcher`]: Issues the search request and deduplicates the hits
//! - [`SearchConfig`]: Token, API base URL, manifest filename and timeout
//! - [`Args`]: Command line argument structure for the CLI
//! - [`write_repositories`] / [`write_json`]: Render the results
//!
//! ## Example
//!
//! ```no_run
//! use downstream_dependents_lib::{DependentsSearcher, SearchConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let config = SearchConfig::new(std::env::var("GITHUB_TOKEN").ok());
//!     let searcher = DependentsSearcher::new(config)?;
//!
//!     for repo in searcher.fetch("go.opentelemetry.io/otel", 20).await? {
//!         println!("- {} ({})", repo.full_name, repo.url);
//!     }
//!
//!     Ok(())
//! }
//! ```

mod args;
mod dependents;
mod error;
mod output;

pub use crate::args::Args;
pub use crate::dependents::{
    build_query, dedup_repositories, DependentsSearcher, Repository, RepositoryDescriptor,
    SearchConfig, SearchItem, SearchResponse, DEFAULT_MANIFEST, DEFAULT_TIMEOUT, GITHUB_API_BASE,
};
pub use crate::error::DependentsError;
pub use crate::output::{write_json, write_repositories};
