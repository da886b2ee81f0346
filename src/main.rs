use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};

use domlens::dom::serialize::to_html;
use domlens::history::{compare_latest, HistoryStore};
use domlens::{profiler, report, scanner, AnalysisConfig};

#[derive(Parser)]
#[command(
    name = "domlens",
    version,
    about = "DOM structure profiler and hidden-element scanner"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Report nesting depth and hidden elements, highlighting hidden roots
    Scan {
        /// File path or http(s) URL of the document
        target: String,
        /// Write the highlighted document here; it is rewritten in place
        /// once the restore delay has elapsed
        #[arg(long)]
        annotate: Option<PathBuf>,
        /// Seconds before highlights are restored
        #[arg(long)]
        restore_after: Option<u64>,
    },
    /// Collect full-tree statistics, persist them, and compare with the previous run
    Profile {
        /// File path or http(s) URL of the document
        target: String,
        /// History store location
        #[arg(long)]
        history_file: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Scan {
            target,
            annotate,
            restore_after,
        } => run_scan(&target, annotate, restore_after),
        Command::Profile {
            target,
            history_file,
        } => run_profile(&target, history_file),
    }
}

fn run_scan(
    target: &str,
    annotate: Option<PathBuf>,
    restore_after: Option<u64>,
) -> anyhow::Result<()> {
    let mut config = AnalysisConfig::default();
    if let Some(secs) = restore_after {
        config.restore_delay_ms = secs.saturating_mul(1000);
    }
    let delay = Duration::from_millis(config.restore_delay_ms);

    let mut tree =
        domlens::load_document(target, &config).with_context(|| format!("loading {}", target))?;
    let root = tree
        .body()
        .or_else(|| tree.document_element())
        .context("document has no elements")?;

    let depth = scanner::max_depth(&tree, Some(root), 0);
    let total_elements = tree.descendant_elements(root).len() + 1;
    let scan = scanner::reveal_hidden(&mut tree, root);
    println!(
        "{}",
        report::render_scan_report(total_elements, depth, &scan, delay)
    );

    if let Some(path) = annotate {
        fs::write(&path, to_html(&tree)).with_context(|| format!("writing {}", path.display()))?;
        println!("Annotated document written to {}", path.display());

        let shared = Arc::new(Mutex::new(tree));
        let task = scanner::schedule_restore(shared.clone(), scan.highlighted.clone(), delay);
        let restored = task.wait();

        let restored_tree = shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        fs::write(&path, to_html(&restored_tree))
            .with_context(|| format!("writing {}", path.display()))?;
        println!("Original styles restored ({} elements).", restored);
    }

    Ok(())
}

fn run_profile(target: &str, history_file: Option<PathBuf>) -> anyhow::Result<()> {
    let mut config = AnalysisConfig::default();
    if let Some(path) = history_file {
        config.history_path = path;
    }

    let tree =
        domlens::load_document(target, &config).with_context(|| format!("loading {}", target))?;
    let root = tree
        .body()
        .or_else(|| tree.document_element())
        .context("document has no elements")?;

    let stats = profiler::profile(&tree, root, &config);

    println!("{}", report::render_summary(&stats));
    println!();
    println!("{}", report::render_tag_table(&stats.tag_counts));
    println!();
    println!(
        "{}",
        report::render_attribute_table(&stats.attributes, config.attribute_table_limit)
    );
    println!();
    println!("{}", report::render_accessibility_table(&stats.accessibility));
    println!();
    println!("{}", report::render_seo_table(&stats.seo));
    println!();
    println!("{}", report::render_performance_report(&stats.performance));
    println!();

    let store = HistoryStore::new(config.history_path.clone(), config.history_cap);
    store
        .record(target, &stats)
        .context("recording run history")?;
    match compare_latest(&store.entries(target)) {
        Some(cmp) => println!("{}", report::render_comparison(target, &cmp)),
        None => println!("{}", report::render_no_previous(target)),
    }

    Ok(())
}
