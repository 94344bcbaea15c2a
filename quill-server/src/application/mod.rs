pub mod auth_service;
pub mod identity;
pub mod post_service;
pub mod profile_service;

/// One page of an ordered listing. Pages are 1-based; `has_more` is derived
/// from the page coming back full, so the last exactly-full page still
/// offers one further (empty) page.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub page_size: usize,
    pub has_more: bool,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, page: u32, page_size: usize) -> Self {
        let has_more = items.len() == page_size;
        Self {
            items,
            page,
            page_size,
            has_more,
        }
    }
}

/// Clamps a 1-based page index and turns it into a row offset.
pub(crate) fn page_offset(page: u32, page_size: usize) -> usize {
    (page.max(1) as usize - 1) * page_size
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_is_zero_based_from_page_one() {
        assert_eq!(page_offset(1, 10), 0);
        assert_eq!(page_offset(2, 10), 10);
        assert_eq!(page_offset(5, 10), 40);
        // page 0 is treated as page 1, not an underflow
        assert_eq!(page_offset(0, 10), 0);
    }

    #[test]
    fn has_more_only_on_full_pages() {
        assert!(Page::new(vec![0u8; 10], 1, 10).has_more);
        assert!(!Page::new(vec![0u8; 9], 1, 10).has_more);
        assert!(!Page::new(Vec::<u8>::new(), 3, 10).has_more);
    }
}
