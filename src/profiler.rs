//! Full-tree statistics profiler.
//!
//! One recursive descent over every node under a root, threading a mutable
//! [`DomStats`] accumulator. Elements feed the tag/attribute frequency maps
//! and the accessibility, SEO, and performance counters; every node kind
//! updates the depth and per-level counts.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::dom::{DomTree, ElementData, NodeId, NodeKind};
use crate::AnalysisConfig;

/// One complete statistics snapshot for a single run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DomStats {
    pub total_nodes: u64,
    pub element_nodes: u64,
    pub text_nodes: u64,
    pub comment_nodes: u64,
    pub max_depth: u64,
    /// Node count per nesting level, root level 0 included.
    pub levels: BTreeMap<u64, u64>,
    pub tag_counts: BTreeMap<String, u64>,
    /// Attribute-name frequency across all elements.
    pub attributes: BTreeMap<String, u64>,
    pub accessibility: AccessibilityStats,
    pub seo: SeoStats,
    pub performance: PerformanceStats,
}

impl DomStats {
    /// Mean node count per populated nesting level.
    pub fn avg_nodes_per_level(&self) -> f64 {
        if self.levels.is_empty() {
            return 0.0;
        }
        self.total_nodes as f64 / self.levels.len() as f64
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccessibilityStats {
    /// Images with no alt attribute.
    pub missing_alt: u64,
    /// Inputs and textareas carrying neither a label nor an aria-label.
    pub missing_labels: u64,
    /// Elements with an explicit role but no aria-label.
    pub missing_aria_labels: u64,
    /// Buttons, anchors, inputs, and selects.
    pub interactive_elements: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeoStats {
    /// Count per heading level, h1 through h6, always all six keys.
    pub headings: BTreeMap<String, u64>,
    pub meta_tags: u64,
    /// Anchors whose trimmed text content is empty.
    pub links_without_text: u64,
    pub images_without_alt: u64,
}

impl Default for SeoStats {
    fn default() -> Self {
        let headings = (1..=6).map(|n| (format!("h{}", n), 0)).collect();
        Self {
            headings,
            meta_tags: 0,
            links_without_text: 0,
            images_without_alt: 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceStats {
    pub deeply_nested: Vec<DeeplyNested>,
    pub heavy_elements: Vec<HeavyElement>,
    /// Elements carrying an inline style attribute.
    pub inline_styles: u64,
    /// Script tags without a src attribute.
    pub inline_scripts: u64,
    /// Character total across inline script bodies.
    pub total_script_size: u64,
    /// Character total across inline style attributes.
    pub total_style_size: u64,
}

/// An element nested beyond the configured depth threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeeplyNested {
    pub tag: String,
    pub depth: u64,
    pub path: String,
}

/// An element with more direct element children than the threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeavyElement {
    pub tag: String,
    pub child_count: u64,
    pub path: String,
}

/// Profile the subtree rooted at `root` (root itself at depth 0).
pub fn profile(tree: &DomTree, root: NodeId, config: &AnalysisConfig) -> DomStats {
    let mut stats = DomStats::default();
    walk(tree, root, 0, config, &mut stats);
    stats
}

fn walk(tree: &DomTree, id: NodeId, depth: u64, config: &AnalysisConfig, stats: &mut DomStats) {
    stats.total_nodes += 1;

    match tree.kind(id) {
        NodeKind::Element(el) => {
            stats.element_nodes += 1;
            let tag = el.tag().to_string();
            *stats.tag_counts.entry(tag.clone()).or_insert(0) += 1;

            for (name, _) in el.attrs() {
                *stats.attributes.entry(name.to_string()).or_insert(0) += 1;
            }

            inspect_accessibility(el, &tag, stats);
            inspect_seo(tree, id, &tag, stats);
            inspect_performance(tree, id, &tag, depth, config, stats);
        }
        NodeKind::Text(_) => stats.text_nodes += 1,
        NodeKind::Comment(_) => stats.comment_nodes += 1,
        NodeKind::Document => {}
    }

    stats.max_depth = stats.max_depth.max(depth);
    *stats.levels.entry(depth).or_insert(0) += 1;

    for &child in tree.children(id) {
        walk(tree, child, depth + 1, config, stats);
    }
}

fn inspect_accessibility(el: &ElementData, tag: &str, stats: &mut DomStats) {
    if tag == "img" && !el.has_attr("alt") {
        stats.accessibility.missing_alt += 1;
        stats.seo.images_without_alt += 1;
    }
    if (tag == "input" || tag == "textarea") && !el.has_attr("label") && !el.has_attr("aria-label") {
        stats.accessibility.missing_labels += 1;
    }
    if el.has_attr("role") && !el.has_attr("aria-label") {
        stats.accessibility.missing_aria_labels += 1;
    }
    if matches!(tag, "button" | "a" | "input" | "select") {
        stats.accessibility.interactive_elements += 1;
    }
}

fn inspect_seo(tree: &DomTree, id: NodeId, tag: &str, stats: &mut DomStats) {
    if let Some(count) = stats.seo.headings.get_mut(tag) {
        *count += 1;
    }
    if tag == "meta" {
        stats.seo.meta_tags += 1;
    }
    if tag == "a" && tree.text_content(id).trim().is_empty() {
        stats.seo.links_without_text += 1;
    }
}

fn inspect_performance(
    tree: &DomTree,
    id: NodeId,
    tag: &str,
    depth: u64,
    config: &AnalysisConfig,
    stats: &mut DomStats,
) {
    let el = match tree.element(id) {
        Some(el) => el,
        None => return,
    };

    if depth > config.deep_nesting_threshold {
        stats.performance.deeply_nested.push(DeeplyNested {
            tag: tag.to_string(),
            depth,
            path: node_path(tree, id),
        });
    }

    let child_count = tree.element_children(id).len();
    if child_count > config.heavy_child_threshold {
        stats.performance.heavy_elements.push(HeavyElement {
            tag: tag.to_string(),
            child_count: child_count as u64,
            path: node_path(tree, id),
        });
    }

    if let Some(style) = el.attr("style") {
        stats.performance.inline_styles += 1;
        stats.performance.total_style_size += style.len() as u64;
    }

    if tag == "script" && !el.has_attr("src") {
        stats.performance.inline_scripts += 1;
        stats.performance.total_script_size += tree.text_content(id).len() as u64;
    }
}

/// Human-readable ancestor path for a node, root-to-node order.
///
/// Each step renders as `tag`, `tag#id`, or `tag.firstClass` (class token
/// only when no id is present), joined by `" > "`.
pub fn node_path(tree: &DomTree, id: NodeId) -> String {
    let mut path = Vec::new();
    let mut cur = Some(id);
    while let Some(n) = cur {
        let Some(el) = tree.element(n) else { break };
        let mut selector = el.tag().to_string();
        if let Some(id_attr) = el.attr("id").filter(|s| !s.is_empty()) {
            selector.push('#');
            selector.push_str(id_attr);
        } else if let Some(class) = el
            .attr("class")
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .and_then(|s| s.split_whitespace().next())
        {
            selector.push('.');
            selector.push_str(class);
        }
        path.push(selector);
        cur = tree.parent(n);
    }
    path.reverse();
    path.join(" > ")
}
