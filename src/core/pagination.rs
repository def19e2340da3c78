// src/core/pagination.rs

/// One page of a larger result set
#[derive(Debug, Clone)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
}

impl<T> Paginated<T> {
    /// Row offset for a 1-based page number, `None` when it does not fit in an i64
    pub fn offset(page: i64, per_page: i64) -> Option<i64> {
        page.max(1).checked_sub(1)?.checked_mul(per_page)
    }

    pub fn pages(&self) -> i64 {
        if self.total == 0 || self.per_page <= 0 {
            0
        } else {
            (self.total + self.per_page - 1) / self.per_page
        }
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.pages()
    }

    /// Page numbers below 1 and empty pages past the first do not exist
    pub fn is_out_of_range(&self) -> bool {
        self.page < 1 || (self.items.is_empty() && self.page != 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(page: i64, items: usize, total: i64) -> Paginated<u8> {
        Paginated {
            items: vec![0; items],
            page,
            per_page: 10,
            total,
        }
    }

    #[test]
    fn test_offsets() {
        assert_eq!(Paginated::<u8>::offset(1, 10), Some(0));
        assert_eq!(Paginated::<u8>::offset(3, 10), Some(20));
        assert_eq!(Paginated::<u8>::offset(0, 10), Some(0));
        assert_eq!(Paginated::<u8>::offset(i64::MAX, 10), None);
        assert_eq!(Paginated::<u8>::offset(i64::MAX, 1), Some(i64::MAX - 1));
    }

    #[test]
    fn test_page_counts() {
        assert_eq!(page(1, 0, 0).pages(), 0);
        assert_eq!(page(1, 10, 10).pages(), 1);
        assert_eq!(page(1, 10, 11).pages(), 2);

        let middle = page(2, 10, 25);
        assert!(middle.has_prev());
        assert!(middle.has_next());

        let last = page(3, 5, 25);
        assert!(!last.has_next());
    }

    #[test]
    fn test_out_of_range() {
        assert!(!page(1, 0, 0).is_out_of_range());
        assert!(page(2, 0, 5).is_out_of_range());
        assert!(page(0, 0, 5).is_out_of_range());
        assert!(!page(2, 3, 13).is_out_of_range());
    }
}
