//! Depth and visibility scanner.
//!
//! Walks the element tree once to find the maximum nesting depth, classifies
//! every hidden element by cause, and reversibly overrides hidden roots so
//! they become visible with a cause-colored highlight. A single deferred
//! task restores the original presentation after a configurable delay.

use std::collections::HashSet;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crate::dom::{DomTree, ElementData, NodeId};

// Temporary attributes carried by a highlighted root until restoration.
const DATA_HIDDEN_CAUSE: &str = "data-hidden-cause";
const DATA_ORIGINAL_BORDER: &str = "data-original-border";
const DATA_ORIGINAL_BG: &str = "data-original-bg";

/// Why an element is hidden. Checked in this order; first match wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HiddenCause {
    DisplayNone,
    VisibilityHidden,
    OpacityZero,
}

impl HiddenCause {
    /// CSS property the cause lives on.
    pub fn property(self) -> &'static str {
        match self {
            HiddenCause::DisplayNone => "display",
            HiddenCause::VisibilityHidden => "visibility",
            HiddenCause::OpacityZero => "opacity",
        }
    }

    /// Value that hides the element.
    pub fn hidden_value(self) -> &'static str {
        match self {
            HiddenCause::DisplayNone => "none",
            HiddenCause::VisibilityHidden => "hidden",
            HiddenCause::OpacityZero => "0",
        }
    }

    /// Override applied while the element is revealed.
    pub fn reveal_value(self) -> &'static str {
        match self {
            HiddenCause::DisplayNone => "block",
            HiddenCause::VisibilityHidden => "visible",
            HiddenCause::OpacityZero => "1",
        }
    }

    /// Highlight border marking the cause.
    pub fn highlight_border(self) -> &'static str {
        match self {
            HiddenCause::DisplayNone => "2px solid red",
            HiddenCause::VisibilityHidden => "2px solid blue",
            HiddenCause::OpacityZero => "2px solid green",
        }
    }

    /// Translucent highlight background marking the cause.
    pub fn highlight_background(self) -> &'static str {
        match self {
            HiddenCause::DisplayNone => "rgba(255, 0, 0, 0.2)",
            HiddenCause::VisibilityHidden => "rgba(0, 0, 255, 0.2)",
            HiddenCause::OpacityZero => "rgba(0, 255, 0, 0.2)",
        }
    }

    fn as_str(self) -> &'static str {
        self.property()
    }

    fn from_str(s: &str) -> Option<Self> {
        match s {
            "display" => Some(HiddenCause::DisplayNone),
            "visibility" => Some(HiddenCause::VisibilityHidden),
            "opacity" => Some(HiddenCause::OpacityZero),
            _ => None,
        }
    }
}

/// Per-cause hidden tallies.
///
/// Display suppression is cumulative: every descendant of a display-hidden
/// root is added to its tally, while the other two causes count roots only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CauseTally {
    pub display_none: usize,
    pub visibility_hidden: usize,
    pub opacity_zero: usize,
}

impl CauseTally {
    pub fn total(&self) -> usize {
        self.display_none + self.visibility_hidden + self.opacity_zero
    }

    fn bump(&mut self, cause: HiddenCause) {
        match cause {
            HiddenCause::DisplayNone => self.display_none += 1,
            HiddenCause::VisibilityHidden => self.visibility_hidden += 1,
            HiddenCause::OpacityZero => self.opacity_zero += 1,
        }
    }
}

/// Result of one visibility scan.
#[derive(Debug, Clone)]
pub struct HiddenScan {
    /// Distinct nodes attributed to hidden subtrees.
    pub counted: usize,
    /// Hidden roots that received a highlight, in document order.
    pub highlighted: Vec<NodeId>,
    pub tally: CauseTally,
}

/// Maximum element-nesting depth reachable from `node` via element children.
/// An absent node yields the depth passed in.
pub fn max_depth(tree: &DomTree, node: Option<NodeId>, depth: usize) -> usize {
    let Some(id) = node else { return depth };
    let mut max = depth;
    for child in tree.element_children(id) {
        max = max.max(max_depth(tree, Some(child), depth + 1));
    }
    max
}

/// Classify an element's hidden cause from its inline style declarations.
pub fn classify(el: &ElementData) -> Option<HiddenCause> {
    if el
        .style_property("display")
        .is_some_and(|v| v.eq_ignore_ascii_case("none"))
    {
        return Some(HiddenCause::DisplayNone);
    }
    if el
        .style_property("visibility")
        .is_some_and(|v| v.eq_ignore_ascii_case("hidden"))
    {
        return Some(HiddenCause::VisibilityHidden);
    }
    // Opacity compares the string form: exactly "0", not "0.0".
    if el.style_property("opacity").is_some_and(|v| v.trim() == "0") {
        return Some(HiddenCause::OpacityZero);
    }
    None
}

/// Scan `root` and everything beneath it, highlighting each hidden root.
///
/// Elements are visited in document order, so an ancestor is always handled
/// before its descendants; the counted set is what prevents a hidden
/// subtree from being attributed twice. Descendants of a display-hidden
/// root are marked counted wholesale, since display suppression removes the
/// entire subtree from layout in one stroke.
pub fn reveal_hidden(tree: &mut DomTree, root: NodeId) -> HiddenScan {
    let mut order = vec![root];
    order.extend(tree.descendant_elements(root));

    let mut counted: HashSet<NodeId> = HashSet::new();
    let mut highlighted = Vec::new();
    let mut tally = CauseTally::default();

    for id in order {
        if counted.contains(&id) {
            continue;
        }
        let Some(cause) = tree.element(id).and_then(classify) else {
            continue;
        };
        tally.bump(cause);

        let mut ancestor_counted = false;
        let mut cur = tree.parent(id);
        while let Some(p) = cur {
            if counted.contains(&p) {
                ancestor_counted = true;
                break;
            }
            cur = tree.parent(p);
        }

        if !ancestor_counted {
            if let Some(el) = tree.element_mut(id) {
                if let Some(border) = el.style_property("border") {
                    el.set_attr(DATA_ORIGINAL_BORDER, &border);
                }
                if let Some(bg) = el.style_property("background-color") {
                    el.set_attr(DATA_ORIGINAL_BG, &bg);
                }
                el.set_attr(DATA_HIDDEN_CAUSE, cause.as_str());
                el.set_style_property(cause.property(), cause.reveal_value());
                el.set_style_property("border", cause.highlight_border());
                el.set_style_property("background-color", cause.highlight_background());
                highlighted.push(id);
            }
        }

        counted.insert(id);
        if cause == HiddenCause::DisplayNone {
            for descendant in tree.descendant_elements(id) {
                counted.insert(descendant);
                tally.display_none += 1;
            }
        }
    }

    HiddenScan {
        counted: counted.len(),
        highlighted,
        tally,
    }
}

/// Re-hide every highlighted root and put its saved presentation back.
///
/// Best-effort: roots detached from the tree since the scan are skipped.
/// Returns how many elements were restored.
pub fn restore_highlights(tree: &mut DomTree, roots: &[NodeId]) -> usize {
    let mut restored = 0;
    for &id in roots {
        if !tree.is_attached(id) {
            log::debug!("skipping restoration of detached node {}", id);
            continue;
        }
        let Some(el) = tree.element_mut(id) else { continue };
        let Some(cause) = el.remove_attr(DATA_HIDDEN_CAUSE).and_then(|s| HiddenCause::from_str(&s))
        else {
            continue;
        };

        el.set_style_property(cause.property(), cause.hidden_value());
        match el.remove_attr(DATA_ORIGINAL_BORDER) {
            Some(border) => el.set_style_property("border", &border),
            None => el.remove_style_property("border"),
        }
        match el.remove_attr(DATA_ORIGINAL_BG) {
            Some(bg) => el.set_style_property("background-color", &bg),
            None => el.remove_style_property("background-color"),
        }
        restored += 1;
    }
    restored
}

/// Handle to a scheduled restoration task.
///
/// Dropping the handle does not cancel the task: the timer thread sleeps out
/// the remaining delay and still fires. Process exit discards it.
pub struct RestoreTask {
    cancel_tx: mpsc::Sender<()>,
    handle: thread::JoinHandle<usize>,
}

impl RestoreTask {
    /// Cancel the pending restoration. Highlights stay applied.
    pub fn cancel(self) {
        let _ = self.cancel_tx.send(());
        let _ = self.handle.join();
    }

    /// Block until the task fires; returns how many elements were restored.
    pub fn wait(self) -> usize {
        self.handle.join().unwrap_or(0)
    }
}

/// Schedule a single deferred restoration of `roots` after `delay`.
pub fn schedule_restore(
    tree: Arc<Mutex<DomTree>>,
    roots: Vec<NodeId>,
    delay: Duration,
) -> RestoreTask {
    let (cancel_tx, cancel_rx) = mpsc::channel::<()>();
    let handle = thread::spawn(move || {
        let started = Instant::now();
        match cancel_rx.recv_timeout(delay) {
            Ok(()) => return 0,
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                // Handle was dropped without cancelling; sleep out the rest.
                let elapsed = started.elapsed();
                if elapsed < delay {
                    thread::sleep(delay - elapsed);
                }
            }
        }
        let Ok(mut tree) = tree.lock() else { return 0 };
        restore_highlights(&mut tree, &roots)
    });
    RestoreTask { cancel_tx, handle }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(html: &str) -> (DomTree, NodeId) {
        let tree = DomTree::parse(html);
        let body = tree.body().expect("body");
        (tree, body)
    }

    #[test]
    fn depth_of_empty_body_is_zero() {
        let (tree, body) = parse("<html><body></body></html>");
        assert_eq!(max_depth(&tree, Some(body), 0), 0);
    }

    #[test]
    fn depth_counts_element_children_only() {
        let (tree, body) =
            parse("<html><body><div><span>deep<b>er</b></span></div>text</body></html>");
        assert_eq!(max_depth(&tree, Some(body), 0), 3);
    }

    #[test]
    fn absent_root_returns_given_depth() {
        let (tree, _) = parse("<html><body></body></html>");
        assert_eq!(max_depth(&tree, None, 5), 5);
    }

    #[test]
    fn classification_order_is_display_then_visibility_then_opacity() {
        let (tree, body) = parse(
            "<html><body>\
             <div style=\"display: none; opacity: 0\"></div>\
             <div style=\"visibility: hidden; opacity: 0\"></div>\
             <div style=\"opacity: 0\"></div>\
             <div style=\"opacity: 0.0\"></div>\
             </body></html>",
        );
        let causes: Vec<_> = tree
            .element_children(body)
            .into_iter()
            .map(|id| classify(tree.element(id).unwrap()))
            .collect();
        assert_eq!(
            causes,
            vec![
                Some(HiddenCause::DisplayNone),
                Some(HiddenCause::VisibilityHidden),
                Some(HiddenCause::OpacityZero),
                None,
            ]
        );
    }

    #[test]
    fn tally_total_matches_counted() {
        let (mut tree, body) = parse(
            "<html><body>\
             <div style=\"display: none\"><span></span></div>\
             <p style=\"visibility: hidden\"></p>\
             <p style=\"opacity: 0\"></p>\
             </body></html>",
        );
        let scan = reveal_hidden(&mut tree, body);
        assert_eq!(scan.tally.total(), scan.counted);
        assert_eq!(scan.counted, 4);
    }

    #[test]
    fn highlight_overrides_and_tags_the_root() {
        let (mut tree, body) =
            parse("<html><body><div style=\"display: none\"></div></body></html>");
        let scan = reveal_hidden(&mut tree, body);
        let root = scan.highlighted[0];
        let el = tree.element(root).unwrap();
        assert_eq!(el.style_property("display").as_deref(), Some("block"));
        assert_eq!(el.style_property("border").as_deref(), Some("2px solid red"));
        assert_eq!(
            el.style_property("background-color").as_deref(),
            Some("rgba(255, 0, 0, 0.2)")
        );
        assert_eq!(el.attr("data-hidden-cause"), Some("display"));
    }
}
