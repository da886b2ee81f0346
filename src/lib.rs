//! domlens
//!
//! Structural analysis for HTML documents: node counts, nesting depth,
//! hidden-element detection with reversible highlighting, accessibility and
//! SEO heuristics, and performance smells, plus a bounded per-URL run
//! history for trend comparison.
//!
//! Two independent tools share the same DOM model:
//!
//! - **Scanner**: classifies hidden elements by cause (display, visibility,
//!   opacity), highlights hidden roots, and restores them after a delay.
//! - **Profiler**: one recursive pass accumulating a statistics snapshot
//!   that is rendered as console tables and persisted for comparison.
//!
//! # Example
//!
//! ```
//! use domlens::{scanner, DomTree};
//!
//! let mut tree = DomTree::parse(
//!     "<html><body><div style=\"display:none\"><span>a</span></div></body></html>",
//! );
//! let body = tree.body().expect("body");
//! let scan = scanner::reveal_hidden(&mut tree, body);
//! assert_eq!(scan.highlighted.len(), 1);
//! assert_eq!(scan.tally.display_none, 2);
//! ```

use std::path::PathBuf;

pub mod dom;
pub mod error;
pub mod history;
pub mod profiler;
pub mod report;
pub mod scanner;

#[cfg(feature = "fetch")]
pub mod fetch;

pub use dom::DomTree;
pub use error::{Error, Result};

/// Configuration shared by both analysis tools.
///
/// The defaults reproduce the fixed constants of the original console
/// tools: elements deeper than 6 levels or with more than 20 direct
/// children are flagged, highlights are restored after two minutes, and
/// the per-URL history keeps the 10 most recent runs.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// User agent sent when fetching documents over HTTP
    pub user_agent: String,
    /// Fetch timeout in milliseconds
    pub timeout_ms: u64,
    /// Elements nested deeper than this are flagged as deeply nested
    pub deep_nesting_threshold: u64,
    /// Elements with more direct element children than this are flagged heavy
    pub heavy_child_threshold: usize,
    /// Row bound for the attribute frequency table
    pub attribute_table_limit: usize,
    /// Delay before highlighted elements are restored, in milliseconds
    pub restore_delay_ms: u64,
    /// Maximum retained history entries per URL
    pub history_cap: usize,
    /// Location of the history store
    pub history_path: PathBuf,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) domlens/0.1".to_string(),
            timeout_ms: 30000,
            deep_nesting_threshold: 6,
            heavy_child_threshold: 20,
            attribute_table_limit: 10,
            restore_delay_ms: 120_000,
            history_cap: 10,
            history_path: PathBuf::from("dom_stats_by_url.json"),
        }
    }
}

/// Load a document from a file path or an `http(s)` URL and parse it.
///
/// URL targets require the `fetch` feature; without it they return a
/// configuration error rather than silently reading a path of that name.
pub fn load_document(target: &str, config: &AnalysisConfig) -> Result<DomTree> {
    let html = read_target(target, config)?;
    Ok(DomTree::parse(&html))
}

fn read_target(target: &str, config: &AnalysisConfig) -> Result<String> {
    if target.starts_with("http://") || target.starts_with("https://") {
        #[cfg(feature = "fetch")]
        {
            return fetch::fetch_document(target, config);
        }
        #[cfg(not(feature = "fetch"))]
        {
            let _ = config;
            return Err(Error::ConfigError(format!(
                "built without the `fetch` feature; cannot load {}",
                target
            )));
        }
    }
    std::fs::read_to_string(target)
        .map_err(|e| Error::LoadError(format!("read {}: {}", target, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnalysisConfig::default();
        assert_eq!(config.deep_nesting_threshold, 6);
        assert_eq!(config.heavy_child_threshold, 20);
        assert_eq!(config.restore_delay_ms, 120_000);
        assert_eq!(config.history_cap, 10);
        assert!(config.user_agent.contains("domlens"));
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let err = load_document("definitely-not-here.html", &AnalysisConfig::default());
        assert!(matches!(err, Err(Error::LoadError(_))));
    }
}
