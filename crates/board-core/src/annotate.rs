//! Inline id badges
//!
//! Three kinds of host elements get a small badge showing an id the page
//! otherwise hides. A marker attribute on the host element records that it
//! was processed, which makes repeated sweeps idempotent. Stripping removes
//! every badge and every marker and reverts any container positioning,
//! returning the page to its prior state.

use crate::scan::column_id_from_classes;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref ITEM_TEST_ID: Regex = Regex::new(r"^item-(\d+)").unwrap();
}

/// Classes whose appearance on a node makes a class mutation worth a sweep
pub const WATCHED_CLASSES: &[&str] = &["column-header", "pulse-card-row"];

/// An added node matching (or containing) one of these triggers a sweep
pub const RELEVANT_SELECTORS: &[&str] = &[
    ".column-header",
    ".pulse-card-row",
    "div[data-testid^=\"item-\"]",
];

/// Set on containers that were given `position: relative` for a badge
pub const POSITIONED_ATTRIBUTE: &str = "data-dev-positioned";

/// Headers registered with the intersection observer
pub const INTERSECTION_TARGET_SELECTOR: &str = ".column-header";

const HEADER_BADGE_STYLE: &str = "margin: 4px 0px 0px; font-size: 11px; color: #8d6b00; \
     font-style: italic; position: absolute; bottom: -2px; left: 5px; pointer-events: none;";

const PULSE_CARD_CSS: &str = "
.dev-pulse-card-suffix {
  display: block;
  font-size: 11px;
  color: #0073ea;
  font-style: italic;
  margin-top: 4px;
  order: -1;
}
";

const ITEM_ID_CSS: &str = "
.dev-itemid-suffix {
  font-size: 11px;
  color: #0073ea;
  font-style: italic;
  position: absolute;
  bottom: -10px;
  left: 5px;
  pointer-events: none;
}
";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BadgeKind {
    /// Column headers of the board grid, id taken from the class list
    ColumnHeader,
    /// Rows of an item card, id taken from `data-column-id`
    PulseCard,
    /// Item rows, id taken from `data-testid="item-<digits>"`
    ItemRow,
}

impl BadgeKind {
    pub const ALL: [BadgeKind; 3] = [
        BadgeKind::ColumnHeader,
        BadgeKind::PulseCard,
        BadgeKind::ItemRow,
    ];

    /// Host elements that may carry a badge
    pub fn candidate_selector(self) -> &'static str {
        match self {
            BadgeKind::ColumnHeader => "[class*=\"col-identifier-\"].column-header",
            BadgeKind::PulseCard => ".pulse-card-row",
            BadgeKind::ItemRow => "div[data-testid^=\"item-\"]",
        }
    }

    /// Attribute set on a host element once it has been processed
    pub fn marker_attribute(self) -> &'static str {
        match self {
            BadgeKind::ColumnHeader => "data-suffix-added",
            BadgeKind::PulseCard => "data-pulse-id-added",
            BadgeKind::ItemRow => "data-itemid-added",
        }
    }

    /// Where inside the host element the badge goes
    pub fn label_container(self) -> &'static str {
        match self {
            BadgeKind::ColumnHeader => ".title-wrapper",
            BadgeKind::PulseCard => ".title-text",
            BadgeKind::ItemRow => ".name-cell-text",
        }
    }

    pub fn badge_class(self) -> &'static str {
        match self {
            BadgeKind::ColumnHeader => "dev-column-suffix",
            BadgeKind::PulseCard => "dev-pulse-card-suffix",
            BadgeKind::ItemRow => "dev-itemid-suffix",
        }
    }

    pub fn badge_selector(self) -> String {
        format!(".{}", self.badge_class())
    }

    pub fn marker_selector(self) -> String {
        format!("[{}]", self.marker_attribute())
    }

    pub fn badge_tag(self) -> &'static str {
        match self {
            BadgeKind::ColumnHeader => "p",
            BadgeKind::PulseCard | BadgeKind::ItemRow => "span",
        }
    }

    pub fn badge_text(self, id: &str) -> String {
        match self {
            BadgeKind::ItemRow => format!("#{}", id),
            BadgeKind::ColumnHeader | BadgeKind::PulseCard => id.to_string(),
        }
    }

    /// Absolutely positioned badges need a positioned container
    pub fn needs_positioned_container(self) -> bool {
        matches!(self, BadgeKind::ColumnHeader | BadgeKind::ItemRow)
    }

    /// Inline `style` for the badge node, when it carries its own styling
    pub fn inline_style(self) -> Option<&'static str> {
        match self {
            BadgeKind::ColumnHeader => Some(HEADER_BADGE_STYLE),
            BadgeKind::PulseCard | BadgeKind::ItemRow => None,
        }
    }

    /// Shared `<style>` block (element id, css) the badges rely on
    pub fn stylesheet(self) -> Option<(&'static str, &'static str)> {
        match self {
            BadgeKind::ColumnHeader => None,
            BadgeKind::PulseCard => Some(("pulse-card-custom-styles", PULSE_CARD_CSS)),
            BadgeKind::ItemRow => Some(("dev-itemid-custom-styles", ITEM_ID_CSS)),
        }
    }

    /// Identifier carried by a host element, if its markup has one
    pub fn extract_id<D: BadgeDom>(self, dom: &D, node: &D::Node) -> Option<String> {
        match self {
            BadgeKind::ColumnHeader => column_id_from_classes(dom.class_names(node)),
            BadgeKind::PulseCard => dom
                .attribute(node, "data-column-id")
                .filter(|id| !id.is_empty()),
            BadgeKind::ItemRow => dom
                .attribute(node, "data-testid")
                .and_then(|test_id| item_id_from_test_id(&test_id)),
        }
    }
}

/// `item-123...` -> `123`
pub fn item_id_from_test_id(test_id: &str) -> Option<String> {
    ITEM_TEST_ID
        .captures(test_id)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// True when a class list contains one of `WATCHED_CLASSES`
pub fn is_watched_class_list<I, C>(classes: I) -> bool
where
    I: IntoIterator<Item = C>,
    C: AsRef<str>,
{
    classes
        .into_iter()
        .any(|class| WATCHED_CLASSES.contains(&class.as_ref()))
}

/// The slice of a document tree the sweeper needs
pub trait BadgeDom {
    type Node;
    type Error;

    /// Every element of the document matching `selector`, in document order
    fn query_all(&self, selector: &str) -> Result<Vec<Self::Node>, Self::Error>;

    /// First descendant of `node` matching `selector`
    fn find_within(
        &self,
        node: &Self::Node,
        selector: &str,
    ) -> Result<Option<Self::Node>, Self::Error>;

    fn class_names(&self, node: &Self::Node) -> Vec<String>;

    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;

    fn set_attribute(
        &mut self,
        node: &Self::Node,
        name: &str,
        value: &str,
    ) -> Result<(), Self::Error>;

    fn remove_attribute(&mut self, node: &Self::Node, name: &str) -> Result<(), Self::Error>;

    /// Append a badge node of `kind` with `text` to `container`
    fn attach_badge(
        &mut self,
        container: &Self::Node,
        kind: BadgeKind,
        text: &str,
    ) -> Result<(), Self::Error>;

    /// Detach `node` from the tree
    fn remove(&mut self, node: &Self::Node) -> Result<(), Self::Error>;

    /// Drop the inline positioning `attach_badge` gave a container
    fn clear_position(&mut self, node: &Self::Node) -> Result<(), Self::Error>;
}

/// What one sweep of one kind did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Badges created
    pub attached: usize,
    /// Hosts newly marked (with or without a new badge)
    pub marked: usize,
    /// Hosts skipped because they were already marked
    pub already_marked: usize,
    /// Hosts left unmarked for a later retry (no id or no label container)
    pub deferred: usize,
}

/// Badge every eligible, unmarked host element of `kind`
pub fn sweep<D: BadgeDom>(dom: &mut D, kind: BadgeKind) -> Result<SweepReport, D::Error> {
    let mut report = SweepReport::default();
    let marker = kind.marker_attribute();
    let badge_selector = kind.badge_selector();

    for node in dom.query_all(kind.candidate_selector())? {
        if dom.attribute(&node, marker).is_some() {
            report.already_marked += 1;
            continue;
        }

        let Some(id) = kind.extract_id(&*dom, &node) else {
            report.deferred += 1;
            continue;
        };
        let Some(container) = dom.find_within(&node, kind.label_container())? else {
            report.deferred += 1;
            continue;
        };

        if dom.find_within(&container, &badge_selector)?.is_none() {
            dom.attach_badge(&container, kind, &kind.badge_text(&id))?;
            report.attached += 1;
        }
        dom.set_attribute(&node, marker, "true")?;
        report.marked += 1;
    }

    Ok(report)
}

/// Sweep every kind, in `BadgeKind::ALL` order
pub fn sweep_all<D: BadgeDom>(dom: &mut D) -> Result<SweepReport, D::Error> {
    let mut total = SweepReport::default();
    for kind in BadgeKind::ALL {
        let report = sweep(dom, kind)?;
        total.attached += report.attached;
        total.marked += report.marked;
        total.already_marked += report.already_marked;
        total.deferred += report.deferred;
    }
    Ok(total)
}

/// Counts removed by `strip_all`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StripReport {
    pub badges: usize,
    pub markers: usize,
    /// Containers whose inline positioning was reverted
    pub positioned: usize,
}

/// Remove every badge and every marker attribute of every kind, then undo
/// container positioning
pub fn strip_all<D: BadgeDom>(dom: &mut D) -> Result<StripReport, D::Error> {
    let mut report = StripReport::default();
    for kind in BadgeKind::ALL {
        for badge in dom.query_all(&kind.badge_selector())? {
            dom.remove(&badge)?;
            report.badges += 1;
        }
        for node in dom.query_all(&kind.marker_selector())? {
            dom.remove_attribute(&node, kind.marker_attribute())?;
            report.markers += 1;
        }
    }
    for node in dom.query_all(&format!("[{}]", POSITIONED_ATTRIBUTE))? {
        dom.clear_position(&node)?;
        dom.remove_attribute(&node, POSITIONED_ATTRIBUTE)?;
        report.positioned += 1;
    }
    Ok(report)
}

/// Annotator lifecycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AnnotatorState {
    #[default]
    Disabled,
    Enabled,
}

/// Work the caller must do after a toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Attach observers, start sweeping
    Enable,
    /// Detach observers, then strip badges and markers
    Disable,
}

impl AnnotatorState {
    pub fn is_enabled(self) -> bool {
        self == AnnotatorState::Enabled
    }

    /// Move to the requested state; `None` when already there
    pub fn set_enabled(&mut self, enabled: bool) -> Option<Transition> {
        match (*self, enabled) {
            (AnnotatorState::Disabled, true) => {
                *self = AnnotatorState::Enabled;
                Some(Transition::Enable)
            }
            (AnnotatorState::Enabled, false) => {
                *self = AnnotatorState::Disabled;
                Some(Transition::Disable)
            }
            _ => None,
        }
    }
}
