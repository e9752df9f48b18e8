// Grid query builder
//
// Grid endpoints mirror the request shape of the dashboard's data grids:
// `take`/`pageSize`/`page`/`skip` paging, indexed `sort[i][...]` keys and an
// optional `filter[...]` block. Parameter order is stable on the wire.

use strum::{Display, IntoStaticStr};

use crate::session::Request;

/// Sort direction for a grid column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum SortDir {
    Asc,
    Desc,
}

/// Query parameters for a grid or detail endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridQuery {
    device: Option<String>,
    take: Option<u64>,
    page_size: Option<u64>,
    skip: u64,
    sort: Vec<(String, SortDir)>,
    filters: Vec<(String, String)>,
}

impl GridQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Page one with the given `take` and `pageSize`.
    pub fn page(take: u64, page_size: u64) -> Self {
        Self {
            take: Some(take),
            page_size: Some(page_size),
            ..Self::default()
        }
    }

    /// Restrict a detail or per-client grid to one station.
    pub fn device(mut self, mac: impl Into<String>) -> Self {
        self.device = Some(mac.into());
        self
    }

    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = skip;
        self
    }

    /// Append a sort key. Earlier keys take precedence.
    pub fn sort_by(mut self, field: impl Into<String>, dir: SortDir) -> Self {
        self.sort.push((field.into(), dir));
        self
    }

    /// Add a server-side equality filter. Filters are joined with `and`.
    pub fn filter_eq(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((field.into(), value.into()));
        self
    }

    /// Render as ordered query parameters.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(ref mac) = self.device {
            params.push(("deviceMacAddress".to_owned(), mac.clone()));
        }
        if let (Some(take), Some(page_size)) = (self.take, self.page_size) {
            params.push(("take".to_owned(), take.to_string()));
            params.push(("pageSize".to_owned(), page_size.to_string()));
            params.push(("page".to_owned(), "1".to_owned()));
            params.push(("skip".to_owned(), self.skip.to_string()));
        }
        for (i, (field, dir)) in self.sort.iter().enumerate() {
            params.push((format!("sort[{i}][field]"), field.clone()));
            params.push((format!("sort[{i}][dir]"), dir.to_string()));
        }
        if !self.filters.is_empty() {
            params.push(("filter[logic]".to_owned(), "and".to_owned()));
            for (i, (field, value)) in self.filters.iter().enumerate() {
                params.push((format!("filter[filters][{i}][field]"), field.clone()));
                params.push((format!("filter[filters][{i}][operator]"), "eq".to_owned()));
                params.push((format!("filter[filters][{i}][value]"), value.clone()));
            }
        }
        params
    }

    /// Build a GET request for `path` carrying these parameters.
    pub fn into_request(self, path: &str) -> Request {
        Request::get(path).with_params(self.to_params())
    }
}
