use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct Pagination {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl Pagination {
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100);
        let offset = page.saturating_sub(1).saturating_mul(per_page);
        (page, per_page, offset)
    }

    /// Cuts one page out of an already loaded list. Returns the page and the
    /// `(page, per_page, total)` triple for [`Meta::paged`](crate::response::Meta::paged).
    pub fn slice<T>(&self, mut items: Vec<T>) -> (Vec<T>, (i64, i64, i64)) {
        let (page, per_page, offset) = self.normalize();
        let total = i64::try_from(items.len()).unwrap_or(i64::MAX);
        let start = usize::try_from(offset).unwrap_or(usize::MAX).min(items.len());
        let end = start
            .saturating_add(usize::try_from(per_page).unwrap_or(usize::MAX))
            .min(items.len());
        let page_items = items.drain(start..end).collect();
        (page_items, (page, per_page, total))
    }
}
