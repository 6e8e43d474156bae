//! Page descriptors returned by paginated ESI routes

/// One page of a paginated response.
///
/// `max_pages` mirrors the `X-Pages` header ESI sends on page-number routes.
/// Routes without the header (or loaders that don't know) leave it `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Elements on this page, in server order
    pub elements: Vec<T>,
    /// Total number of pages, if the server declared it
    pub max_pages: Option<u32>,
}

impl<T> Page<T> {
    /// A page with no declared page count
    pub fn new(elements: Vec<T>) -> Self {
        Self {
            elements,
            max_pages: None,
        }
    }

    /// Attach the declared total page count
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = Some(max_pages);
        self
    }

    /// Number of elements on the page
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// True when the page carries no elements
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl<T> From<Vec<T>> for Page<T> {
    fn from(elements: Vec<T>) -> Self {
        Self::new(elements)
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_vec_has_no_page_count() {
        let page: Page<u8> = vec![1, 2, 3].into();
        assert_eq!(page.len(), 3);
        assert_eq!(page.max_pages, None);
    }

    #[test]
    fn page_count_can_be_attached() {
        let page = Page::new(vec!["a"]).with_max_pages(4);
        assert_eq!(page.max_pages, Some(4));
        assert!(!page.is_empty());
        assert!(Page::<u8>::default().is_empty());
    }
}
