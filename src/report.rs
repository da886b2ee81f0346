//! Console report rendering.
//!
//! Pure formatting: every function takes computed statistics and returns a
//! string, no I/O and no business logic. Frequency tables sort by count
//! descending (name ascending on ties) so output is deterministic.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::history::{Comparison, Direction};
use crate::profiler::{AccessibilityStats, DomStats, PerformanceStats, SeoStats};
use crate::scanner::HiddenScan;

// Advice thresholds for the performance recommendations block.
const INLINE_STYLE_ADVICE_THRESHOLD: u64 = 10;
const INLINE_SCRIPT_ADVICE_THRESHOLD: u64 = 5;

const CHART_WIDTH: usize = 8;

/// Headline counters for a profile run.
pub fn render_summary(stats: &DomStats) -> String {
    [
        "DOM analysis of <body>:".to_string(),
        format!("  Total nodes: {}", stats.total_nodes),
        format!("  Element nodes: {}", stats.element_nodes),
        format!("  Text nodes: {}", stats.text_nodes),
        format!("  Comment nodes: {}", stats.comment_nodes),
        format!("  Max nesting depth: {}", stats.max_depth),
        format!("  Average nodes per level: {:.2}", stats.avg_nodes_per_level()),
    ]
    .join("\n")
}

/// Tag frequency as a fixed-width table with a proportional bar column.
pub fn render_tag_table(tag_counts: &BTreeMap<String, u64>) -> String {
    frequency_table("HTML tag distribution:", "Tag", tag_counts, None)
}

/// The most frequently used attribute names, bounded to `limit` rows.
pub fn render_attribute_table(attributes: &BTreeMap<String, u64>, limit: usize) -> String {
    frequency_table("Most used attributes:", "Attribute", attributes, Some(limit))
}

fn frequency_table(
    title: &str,
    key_header: &str,
    counts: &BTreeMap<String, u64>,
    limit: Option<usize>,
) -> String {
    let mut rows: Vec<(&String, u64)> = counts.iter().map(|(k, &v)| (k, v)).collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    if let Some(limit) = limit {
        rows.truncate(limit);
    }
    if rows.is_empty() {
        return format!("{}\n  (none)", title);
    }

    let key_w = rows
        .iter()
        .map(|(k, _)| k.chars().count())
        .max()
        .unwrap_or(0)
        .max(key_header.chars().count());
    let count_w = rows
        .iter()
        .map(|(_, v)| v.to_string().len())
        .max()
        .unwrap_or(0)
        .max("Count".len());
    let max_count = rows.iter().map(|(_, v)| *v).max().unwrap_or(1).max(1);

    let mut out = vec![title.to_string()];
    out.push(rule('╔', '╦', '╗', &[key_w, count_w, CHART_WIDTH]));
    out.push(format!(
        "║ {} ║ {} ║ {} ║",
        pad_right(key_header, key_w),
        pad_left("Count", count_w),
        pad_right("Chart", CHART_WIDTH)
    ));
    out.push(rule('╠', '╬', '╣', &[key_w, count_w, CHART_WIDTH]));
    for (key, count) in rows {
        let bar = "█".repeat(bar_len(count, max_count));
        out.push(format!(
            "║ {} ║ {} ║ {} ║",
            pad_right(key, key_w),
            pad_left(&count.to_string(), count_w),
            pad_right(&bar, CHART_WIDTH)
        ));
    }
    out.push(rule('╚', '╩', '╝', &[key_w, count_w, CHART_WIDTH]));
    out.join("\n")
}

/// Accessibility counters as a two-column table.
pub fn render_accessibility_table(stats: &AccessibilityStats) -> String {
    indicator_table(
        "Accessibility:",
        &[
            ("Images missing alt", stats.missing_alt),
            ("Fields missing label", stats.missing_labels),
            ("Roles missing aria-label", stats.missing_aria_labels),
            ("Interactive elements", stats.interactive_elements),
        ],
    )
}

/// SEO counters as a two-column table.
pub fn render_seo_table(stats: &SeoStats) -> String {
    let mut rows: Vec<(String, u64)> = stats
        .headings
        .iter()
        .map(|(tag, &count)| (format!("Headings {}", tag.to_uppercase()), count))
        .collect();
    rows.push(("Meta tags".to_string(), stats.meta_tags));
    rows.push(("Links without text".to_string(), stats.links_without_text));
    rows.push(("Images without alt".to_string(), stats.images_without_alt));
    let rows: Vec<(&str, u64)> = rows.iter().map(|(k, v)| (k.as_str(), *v)).collect();
    indicator_table("SEO:", &rows)
}

/// Performance counters, warnings, inline sizes, and recommendations.
pub fn render_performance_report(perf: &PerformanceStats) -> String {
    let mut out = vec![indicator_table(
        "Performance:",
        &[
            ("Deeply nested elements", perf.deeply_nested.len() as u64),
            ("Heavy elements", perf.heavy_elements.len() as u64),
            ("Inline styles", perf.inline_styles),
            ("Inline scripts", perf.inline_scripts),
        ],
    )];

    if !perf.deeply_nested.is_empty() {
        out.push(format!(
            "Warning: {} deeply nested elements found. Deep trees are slower to style and harder to maintain.",
            perf.deeply_nested.len()
        ));
    }
    if !perf.heavy_elements.is_empty() {
        out.push(format!(
            "Warning: {} elements with many direct children found. Wide nodes can slow down rendering.",
            perf.heavy_elements.len()
        ));
    }

    if perf.total_style_size > 0 || perf.total_script_size > 0 {
        out.push("Inline code size:".to_string());
        if perf.total_style_size > 0 {
            out.push(format!("  styles: {:.2}KB", perf.total_style_size as f64 / 1024.0));
        }
        if perf.total_script_size > 0 {
            out.push(format!("  scripts: {:.2}KB", perf.total_script_size as f64 / 1024.0));
        }
    }

    let mut advice = Vec::new();
    if !perf.deeply_nested.is_empty() {
        advice.push("  - Flatten deeply nested structures");
    }
    if !perf.heavy_elements.is_empty() {
        advice.push("  - Split elements with many direct children into smaller pieces");
    }
    if perf.inline_styles > INLINE_STYLE_ADVICE_THRESHOLD {
        advice.push("  - Move inline styles into a stylesheet");
    }
    if perf.inline_scripts > INLINE_SCRIPT_ADVICE_THRESHOLD {
        advice.push("  - Move inline scripts into external files");
    }
    if !advice.is_empty() {
        out.push("Recommendations:".to_string());
        out.extend(advice.into_iter().map(String::from));
    }

    out.join("\n")
}

/// Scan results: totals, per-cause counts, highlight legend, restore notice.
pub fn render_scan_report(
    total_elements: usize,
    depth: usize,
    scan: &HiddenScan,
    restore_delay: Duration,
) -> String {
    let percentage = if total_elements > 0 {
        scan.counted as f64 / total_elements as f64 * 100.0
    } else {
        0.0
    };
    [
        format!("Total elements inside <body>: {}", total_elements),
        format!("Maximum DOM depth: {}", depth),
        format!("Hidden nodes: {}", scan.counted),
        format!("  - display:none: {}", scan.tally.display_none),
        format!("  - visibility:hidden: {}", scan.tally.visibility_hidden),
        format!("  - opacity:0: {}", scan.tally.opacity_zero),
        format!("Hidden node percentage: {:.2}%", percentage),
        "Hidden elements are temporarily highlighted:".to_string(),
        "  - red: display:none".to_string(),
        "  - blue: visibility:hidden".to_string(),
        "  - green: opacity:0".to_string(),
        format!(
            "Original styles will be restored in {}s.",
            restore_delay.as_secs()
        ),
    ]
    .join("\n")
}

/// Informational notice when a target has no prior runs to compare against.
pub fn render_no_previous(url: &str) -> String {
    format!("No previous data to compare for {}", url)
}

/// Deltas against the previous run, tag changes, and the retained-run trend.
pub fn render_comparison(url: &str, cmp: &Comparison) -> String {
    let mut out = vec![format!("Comparison with the previous run of {}:", url)];
    out.push(delta_line("Total nodes", &cmp.total_nodes));
    out.push(delta_line("Element nodes", &cmp.element_nodes));
    out.push(delta_line("Text nodes", &cmp.text_nodes));
    out.push(delta_line("Comment nodes", &cmp.comment_nodes));
    out.push(delta_line("Max nesting depth", &cmp.max_depth));

    out.push("Tag changes:".to_string());
    if cmp.tag_changes.is_empty() {
        out.push("  (no tag frequency changes)".to_string());
    } else {
        for change in &cmp.tag_changes {
            let delta = crate::history::Delta {
                previous: change.previous,
                current: change.current,
            };
            out.push(format!(
                "  {} <{}>: {} -> {} ({})",
                direction_marker(delta.direction()),
                change.tag,
                change.previous,
                change.current,
                signed(delta.diff())
            ));
        }
    }

    out.push("Total nodes across retained runs:".to_string());
    for (timestamp, total) in &cmp.totals_over_time {
        out.push(format!("  {}: {} nodes", display_timestamp(timestamp), total));
    }
    out.join("\n")
}

fn delta_line(label: &str, delta: &crate::history::Delta) -> String {
    format!(
        "  {} {}: {} -> {} ({})",
        direction_marker(delta.direction()),
        label,
        delta.previous,
        delta.current,
        signed(delta.diff())
    )
}

fn direction_marker(direction: Direction) -> &'static str {
    match direction {
        Direction::Increased => "↑",
        Direction::Decreased => "↓",
        Direction::Unchanged => "=",
    }
}

fn signed(diff: i64) -> String {
    if diff >= 0 {
        format!("+{}", diff)
    } else {
        diff.to_string()
    }
}

fn display_timestamp(raw: &str) -> String {
    match chrono::DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => ts.format("%Y-%m-%d %H:%M:%S").to_string(),
        Err(_) => raw.to_string(),
    }
}

fn indicator_table(title: &str, rows: &[(&str, u64)]) -> String {
    let label_w = rows
        .iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or(0)
        .max("Indicator".len());
    let value_w = rows
        .iter()
        .map(|(_, value)| value.to_string().len())
        .max()
        .unwrap_or(0)
        .max("Value".len());

    let mut out = vec![title.to_string()];
    out.push(rule('╔', '╦', '╗', &[label_w, value_w]));
    out.push(format!(
        "║ {} ║ {} ║",
        pad_right("Indicator", label_w),
        pad_left("Value", value_w)
    ));
    out.push(rule('╠', '╬', '╣', &[label_w, value_w]));
    for (label, value) in rows {
        out.push(format!(
            "║ {} ║ {} ║",
            pad_right(label, label_w),
            pad_left(&value.to_string(), value_w)
        ));
    }
    out.push(rule('╚', '╩', '╝', &[label_w, value_w]));
    out.join("\n")
}

fn rule(left: char, mid: char, right: char, widths: &[usize]) -> String {
    let mut out = String::new();
    out.push(left);
    for (i, w) in widths.iter().enumerate() {
        if i > 0 {
            out.push(mid);
        }
        out.push_str(&"═".repeat(w + 2));
    }
    out.push(right);
    out
}

fn bar_len(count: u64, max: u64) -> usize {
    ((count as f64 / max as f64) * CHART_WIDTH as f64).round() as usize
}

fn pad_right(s: &str, width: usize) -> String {
    let len = s.chars().count();
    let mut out = s.to_string();
    out.push_str(&" ".repeat(width.saturating_sub(len)));
    out
}

fn pad_left(s: &str, width: usize) -> String {
    let len = s.chars().count();
    let mut out = " ".repeat(width.saturating_sub(len));
    out.push_str(s);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::compare_latest;
    use crate::history::HistoryEntry;

    #[test]
    fn tag_table_renders_fixed_width_rows() {
        let mut counts = BTreeMap::new();
        counts.insert("div".to_string(), 3);
        counts.insert("a".to_string(), 1);
        let rendered = render_tag_table(&counts);
        let expected = "\
HTML tag distribution:
╔═════╦═══════╦══════════╗
║ Tag ║ Count ║ Chart    ║
╠═════╬═══════╬══════════╣
║ div ║     3 ║ ████████ ║
║ a   ║     1 ║ ███      ║
╚═════╩═══════╩══════════╝";
        assert_eq!(rendered, expected);
    }

    #[test]
    fn attribute_table_is_bounded_and_sorted() {
        let mut counts = BTreeMap::new();
        for (name, n) in [("href", 4), ("class", 9), ("id", 4), ("style", 1)] {
            counts.insert(name.to_string(), n);
        }
        let rendered = render_attribute_table(&counts, 3);
        // class first, then the tie on 4 broken alphabetically, style cut off.
        let order: Vec<usize> = ["class", "href", "id"]
            .iter()
            .map(|name| rendered.find(&format!("║ {}", name)).expect("row present"))
            .collect();
        assert!(order[0] < order[1] && order[1] < order[2]);
        assert!(!rendered.contains("style"));
    }

    #[test]
    fn empty_frequency_table_degrades_gracefully() {
        let counts = BTreeMap::new();
        assert_eq!(render_tag_table(&counts), "HTML tag distribution:\n  (none)");
    }

    #[test]
    fn comparison_renders_directions_and_trend() {
        let mut old = DomStats::default();
        old.total_nodes = 10;
        let mut new = DomStats::default();
        new.total_nodes = 12;
        new.tag_counts.insert("div".into(), 1);
        let entries = vec![
            HistoryEntry { timestamp: "2026-01-01T00:00:00Z".into(), stats: old },
            HistoryEntry { timestamp: "2026-01-02T00:00:00Z".into(), stats: new },
        ];
        let cmp = compare_latest(&entries).expect("comparison");
        let rendered = render_comparison("https://example.com/", &cmp);
        assert!(rendered.contains("↑ Total nodes: 10 -> 12 (+2)"));
        assert!(rendered.contains("= Max nesting depth: 0 -> 0 (+0)"));
        assert!(rendered.contains("↑ <div>: 0 -> 1 (+1)"));
        assert!(rendered.contains("2026-01-01 00:00:00: 10 nodes"));
    }

    #[test]
    fn scan_report_includes_percentage_and_legend() {
        let scan = HiddenScan {
            counted: 3,
            highlighted: vec![],
            tally: crate::scanner::CauseTally {
                display_none: 3,
                visibility_hidden: 0,
                opacity_zero: 0,
            },
        };
        let rendered = render_scan_report(12, 4, &scan, Duration::from_secs(120));
        assert!(rendered.contains("Hidden nodes: 3"));
        assert!(rendered.contains("Hidden node percentage: 25.00%"));
        assert!(rendered.contains("restored in 120s."));
    }

    #[test]
    fn recommendations_appear_only_over_thresholds() {
        let mut perf = PerformanceStats::default();
        perf.inline_styles = 11;
        let rendered = render_performance_report(&perf);
        assert!(rendered.contains("Move inline styles"));
        assert!(!rendered.contains("inline scripts into external"));

        let quiet = render_performance_report(&PerformanceStats::default());
        assert!(!quiet.contains("Recommendations"));
    }
}
