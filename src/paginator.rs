use crate::query_string::PageParam;

/// Pagination over a row count held by the database. Pages are 1-based and
/// there is always at least one page, even for an empty result set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paginator {
    item_count: u64,
    page_size: u32,
    page_count: u32,
}

/// A resolved page: its number and the LIMIT/OFFSET to fetch it with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Page {
    pub number: u32,
    pub limit: i64,
    pub offset: i64,
}

impl Paginator {
    pub fn new(item_count: u64, page_size: u32) -> Self {
        let page_size = page_size.max(1);
        let page_count = if item_count == 0 {
            1
        } else {
            let upper_bound = item_count - 1;
            ((upper_bound / page_size as u64) + 1) as u32
        };

        Paginator {
            item_count,
            page_size,
            page_count,
        }
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    pub fn item_count(&self) -> u64 {
        self.item_count
    }

    /// Never fails: a missing or non-numeric page gives the first page, a
    /// number out of range gives the last one.
    pub fn resolve(&self, param: &PageParam) -> Page {
        let number = match param {
            PageParam::Missing | PageParam::NotAnInteger => 1,
            PageParam::Number(n) if *n < 1 || *n > self.page_count as i64 => self.page_count,
            PageParam::Number(n) => *n as u32,
        };
        self.get_page(number)
    }

    fn get_page(&self, number: u32) -> Page {
        Page {
            number,
            limit: self.page_size as i64,
            offset: ((number - 1) as i64) * (self.page_size as i64),
        }
    }

    pub fn has_previous(&self, page: &Page) -> bool {
        page.number > 1
    }

    pub fn has_next(&self, page: &Page) -> bool {
        page.number < self.page_count
    }
}
