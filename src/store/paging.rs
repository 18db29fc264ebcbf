use serde::Serialize;

use crate::error::{AppError, AppResult};

/// One page of an ordered listing.
#[derive(Debug, Clone, Serialize)]
pub struct PagedResult<T> {
    pub items: Vec<T>,
    pub current_page: i64,
    pub total_pages: i64,
    pub total_count: i64,
}

impl<T> PagedResult<T> {
    /// An in-range page with its items.
    pub fn page(items: Vec<T>, page: i64, total_count: i64, page_size: u32) -> Self {
        PagedResult {
            items,
            current_page: page,
            total_pages: total_pages(total_count, page_size),
            total_count,
        }
    }

    /// An out-of-range page: no items, totals still correct.
    pub fn out_of_range(page: i64, total_count: i64, page_size: u32) -> Self {
        Self::page(Vec::new(), page, total_count, page_size)
    }
}

pub fn total_pages(total_count: i64, page_size: u32) -> i64 {
    (total_count + page_size as i64 - 1) / page_size as i64
}

/// Offset of a 1-indexed page, or None when the page is out of range.
/// Out-of-range pages are served as empty listings, never as errors.
pub fn page_offset(page: i64, total_count: i64, page_size: u32) -> Option<i64> {
    if page < 1 || page > total_pages(total_count, page_size) {
        return None;
    }
    Some((page - 1) * page_size as i64)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Latest,
    Oldest,
    MostViewed,
}

impl SortKey {
    /// Unrecognized or absent sort keys fall back to `latest`.
    pub fn parse(s: Option<&str>) -> Self {
        match s {
            Some("oldest") => SortKey::Oldest,
            Some("most-viewed") => SortKey::MostViewed,
            _ => SortKey::Latest,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    Title,
    Username,
}

impl FilterField {
    pub fn parse(s: &str) -> AppResult<Self> {
        match s {
            "title" => Ok(FilterField::Title),
            "username" => Ok(FilterField::Username),
            _ => Err(AppError::Validation(format!("Unknown filter field: {}", s))),
        }
    }
}

/// Case-insensitive substring filter over one review field.
#[derive(Debug, Clone)]
pub struct ReviewFilter {
    pub field: FilterField,
    pub term: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(95, 10), 10);
    }

    #[test]
    fn test_page_offset() {
        assert_eq!(page_offset(1, 25, 10), Some(0));
        assert_eq!(page_offset(3, 25, 10), Some(20));
        assert_eq!(page_offset(0, 25, 10), None);
        assert_eq!(page_offset(-2, 25, 10), None);
        assert_eq!(page_offset(4, 25, 10), None);
        assert_eq!(page_offset(1, 0, 10), None);
    }

    #[test]
    fn test_sort_key_fallback() {
        assert_eq!(SortKey::parse(Some("latest")), SortKey::Latest);
        assert_eq!(SortKey::parse(Some("oldest")), SortKey::Oldest);
        assert_eq!(SortKey::parse(Some("most-viewed")), SortKey::MostViewed);
        assert_eq!(SortKey::parse(Some("hottest")), SortKey::Latest);
        assert_eq!(SortKey::parse(None), SortKey::Latest);
    }

    #[test]
    fn test_filter_field_parse() {
        assert_eq!(FilterField::parse("title").unwrap(), FilterField::Title);
        assert_eq!(FilterField::parse("username").unwrap(), FilterField::Username);
        assert!(FilterField::parse("content").is_err());
    }
}
