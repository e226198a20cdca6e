//! Specificity ordering of all rules of a document.

use wcss_common::url::resolve_url;

use crate::properties::Property;
use crate::selector::{SelectorId, SelectorNode, SelectorTree};
use crate::values::css_url;

/// A selector node in one of the sorted sheets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SelectorRef {
    /// Index of the sheet.
    pub sheet: usize,
    /// Node within the sheet.
    pub id: SelectorId,
}

/// The rules of every sheet, ordered by ascending specificity. Rules of
/// equal specificity keep sheet order, then source order.
#[derive(Debug, Clone, Default)]
pub struct SortedSelectors {
    sheets: Vec<SelectorTree>,
    rules: Vec<SelectorRef>,
}

impl SortedSelectors {
    /// Sort the rules of `sheets`, given in cascade order (external sheets
    /// first). Relative `url(...)` values of external sheets are made
    /// absolute against the sheet's own URL.
    #[must_use]
    pub fn new(mut sheets: Vec<SelectorTree>) -> Self {
        for sheet in &mut sheets {
            absolutize_urls(sheet);
        }
        let mut rules: Vec<(u32, SelectorRef)> = sheets
            .iter()
            .enumerate()
            .flat_map(|(index, sheet)| {
                sheet.roots().iter().map(move |&id| {
                    (sheet.specificity(id), SelectorRef { sheet: index, id })
                })
            })
            .collect();
        rules.sort_by_key(|&(specificity, _)| specificity);
        Self {
            sheets,
            rules: rules.into_iter().map(|(_, rule)| rule).collect(),
        }
    }

    /// The rules, lowest specificity first.
    #[must_use]
    pub fn rules(&self) -> &[SelectorRef] {
        &self.rules
    }

    /// The sheets.
    #[must_use]
    pub fn sheets(&self) -> &[SelectorTree] {
        &self.sheets
    }

    /// The sheet holding `selector`.
    #[must_use]
    pub fn tree(&self, selector: SelectorRef) -> &SelectorTree {
        &self.sheets[selector.sheet]
    }

    /// Borrow a selector node.
    #[must_use]
    pub fn node(&self, selector: SelectorRef) -> &SelectorNode {
        self.sheets[selector.sheet].get(selector.id)
    }

    /// Chain specificity of the selector starting at `selector`.
    #[must_use]
    pub fn specificity(&self, selector: SelectorRef) -> u32 {
        self.sheets[selector.sheet].specificity(selector.id)
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True when there are no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn absolutize_urls(sheet: &mut SelectorTree) {
    let Some(page_url) = sheet.page_url().map(str::to_string) else {
        return;
    };
    for node in sheet.nodes_mut() {
        for property in [Property::BackgroundImage, Property::ListStyleImage] {
            let absolute = node
                .values
                .raw(property)
                .and_then(css_url)
                .and_then(|url| resolve_url(url, Some(&page_url)));
            if let Some(url) = absolute {
                node.values.set_raw(property, format!("url({url})"));
            }
        }
    }
}
