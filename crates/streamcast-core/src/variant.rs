//! Quality variant resolution
//!
//! Stream URLs follow the packager's `<base>/index_<N>.m3u8[?query]` naming.
//! The supplied URL is the highest rendition; lower ones are reached by
//! swapping the `_<N>.m3u8` part while keeping the original query string.

use crate::{config::QualityVariant, types::StreamLocator};
use nom::{
    bytes::complete::tag,
    character::complete::digit1,
    combinator::{all_consuming, map_res},
    sequence::{preceded, terminated},
    IResult, Parser,
};
use serde::Serialize;
use tracing::{debug, warn};

const INDEX_MARKER: &str = "/index";

/// Locator split along the naming convention
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLocator {
    /// Everything up to and including `/index`
    pub base: String,
    /// Rendition number `N`
    pub index: u32,
    /// Literal `_<N>.m3u8[?query]` as supplied
    pub suffix: String,
    /// `?query` as supplied, possibly empty
    pub query: String,
}

/// `_<N>.m3u8`
fn index_suffix(input: &str) -> IResult<&str, u32> {
    terminated(
        preceded(tag("_"), map_res(digit1, |n: &str| n.parse::<u32>())),
        tag(".m3u8"),
    )
    .parse(input)
}

/// Split a locator along the naming convention, `None` when it doesn't follow it
pub fn parse_locator(raw: &str) -> Option<ParsedLocator> {
    let query_start = raw.find('?').unwrap_or(raw.len());
    let (path, query) = raw.split_at(query_start);

    let marker = path.rfind("/index_")?;
    let base_end = marker + INDEX_MARKER.len();
    let (_, index) = all_consuming(index_suffix).parse(&path[base_end..]).ok()?;

    Some(ParsedLocator {
        base: raw[..base_end].to_string(),
        index,
        suffix: raw[base_end..].to_string(),
        query: query.to_string(),
    })
}

/// Outcome of a quality selection request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchPlan {
    /// Requested label is already active
    AlreadyActive,
    /// No locator could be derived for the label
    Rejected,
    /// Load this locator, then commit the label
    Switch {
        label: String,
        locator: StreamLocator,
    },
}

/// Entry of the quality menu as shown to the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QualityOption {
    pub label: String,
    pub active: bool,
}

/// Derives selectable variants for one locator and tracks the active label
#[derive(Debug, Clone)]
pub struct VariantResolver {
    original: StreamLocator,
    parsed: Option<ParsedLocator>,
    ladder: Vec<QualityVariant>,
    active: String,
}

impl VariantResolver {
    /// Build the resolver for a freshly bound locator.
    ///
    /// `ladder` must start with the highest (suffix-less) variant.
    pub fn new(original: StreamLocator, ladder: Vec<QualityVariant>) -> Self {
        let parsed = parse_locator(original.as_str());
        let highest = ladder
            .first()
            .map(|v| v.label.clone())
            .unwrap_or_default();

        let active = match &parsed {
            Some(p) => {
                let supplied = format!("_{}.m3u8", p.index);
                ladder
                    .iter()
                    .find(|v| v.file_suffix.as_deref() == Some(supplied.as_str()))
                    .map(|v| v.label.clone())
                    .unwrap_or_else(|| highest.clone())
            }
            None => {
                warn!(
                    locator = %original,
                    "Locator does not follow index_<N>.m3u8 naming, quality switching disabled"
                );
                highest.clone()
            }
        };

        debug!(locator = %original, active = %active, "Quality variants resolved");

        Self {
            original,
            parsed,
            ladder,
            active,
        }
    }

    /// Label of the active variant
    pub fn active_label(&self) -> &str {
        &self.active
    }

    pub fn parsed(&self) -> Option<&ParsedLocator> {
        self.parsed.as_ref()
    }

    /// Whether lower variants can be derived at all
    pub fn can_switch(&self) -> bool {
        self.parsed.is_some()
    }

    pub fn options(&self) -> Vec<QualityOption> {
        self.ladder
            .iter()
            .map(|v| QualityOption {
                label: v.label.clone(),
                active: v.label == self.active,
            })
            .collect()
    }

    /// Locator for a variant label, `None` when it cannot be derived
    pub fn locator_for(&self, label: &str) -> Option<StreamLocator> {
        let variant = self.ladder.iter().find(|v| v.label == label)?;

        match (&variant.file_suffix, &self.parsed) {
            (None, _) => Some(self.original.clone()),
            (Some(suffix), Some(parsed)) => {
                // Reject ladder entries that don't look like `_<N>.m3u8`
                all_consuming(index_suffix).parse(suffix.as_str()).ok()?;
                Some(StreamLocator::derived(format!(
                    "{}{}{}",
                    parsed.base, suffix, parsed.query
                )))
            }
            (Some(_), None) => None,
        }
    }

    /// Decide what selecting `label` means; does not change the active label
    pub fn plan(&self, label: &str) -> SwitchPlan {
        if label == self.active {
            return SwitchPlan::AlreadyActive;
        }

        match self.locator_for(label) {
            Some(locator) => SwitchPlan::Switch {
                label: label.to_string(),
                locator,
            },
            None => SwitchPlan::Rejected,
        }
    }

    /// Record a completed switch
    pub fn commit(&mut self, label: String) {
        self.active = label;
    }
}
