//! Listing filters and paginated results.

use serde::{Deserialize, Serialize};

use crate::{common::TransactionKind, rule::RecurrenceRule};

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuleFilter {
    #[serde(default)]
    pub kind: Option<TransactionKind>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default = "RuleFilter::default_page")]
    pub page: u32,
    #[serde(default = "RuleFilter::default_per_page")]
    pub per_page: u32,
}

impl Default for RuleFilter {
    fn default() -> Self {
        Self {
            kind: None,
            is_active: None,
            page: Self::default_page(),
            per_page: Self::default_per_page(),
        }
    }
}

impl RuleFilter {
    fn default_page() -> u32 {
        1
    }

    fn default_per_page() -> u32 {
        DEFAULT_PAGE_SIZE
    }

    pub fn matches(&self, rule: &RecurrenceRule) -> bool {
        self.kind.map_or(true, |kind| rule.kind == kind)
            && self.is_active.map_or(true, |active| rule.is_active == active)
    }

    /// Page and page size pulled into their valid ranges.
    pub fn normalized(&self) -> (u32, u32) {
        let page = self.page.max(1);
        let per_page = match self.per_page {
            0 => DEFAULT_PAGE_SIZE,
            n => n.min(MAX_PAGE_SIZE),
        };
        (page, per_page)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: usize,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
}

impl<T> Page<T> {
    /// Cuts the requested page out of the full, already ordered result set.
    pub fn slice(items: Vec<T>, page: u32, per_page: u32) -> Self {
        let total = items.len();
        let per_page = per_page.max(1);
        let total_pages = total.div_ceil(per_page as usize) as u32;
        let skip = (page.saturating_sub(1) as usize).saturating_mul(per_page as usize);
        let data = items
            .into_iter()
            .skip(skip)
            .take(per_page as usize)
            .collect();
        Self {
            data,
            total,
            page,
            per_page,
            total_pages,
        }
    }
}
