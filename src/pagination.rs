//! Page-number pagination: `{count, next, previous, results}`.

use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub number: u64,
    pub size: usize,
}

impl PageRequest {
    pub fn new(number: u64, size: usize) -> Self {
        Self {
            number: number.max(1),
            size: size.max(1),
        }
    }

    /// Reads `page` from tool arguments. Missing, non-integer or < 1 means page 1.
    pub fn from_arguments(arguments: &Map<String, Value>, size: usize) -> Self {
        let number = arguments
            .get("page")
            .and_then(|page| match page {
                Value::Number(n) => n.as_u64(),
                Value::String(s) => s.trim().parse::<u64>().ok(),
                _ => None,
            })
            .filter(|n| *n >= 1)
            .unwrap_or(1);
        Self::new(number, size)
    }

    pub fn limit(&self) -> i64 {
        i64::try_from(self.size).unwrap_or(i64::MAX)
    }

    /// Row offset of the first item, or `None` when it does not fit in SQLite's
    /// integer range. Such a page is always past the end.
    pub fn offset(&self) -> Option<i64> {
        i64::try_from(self.number - 1)
            .ok()
            .and_then(|skipped| skipped.checked_mul(self.limit()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub count: i64,
    pub next: Option<u64>,
    pub previous: Option<u64>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(results: Vec<T>, count: i64, request: PageRequest) -> Self {
        let has_more = request
            .offset()
            .is_some_and(|offset| offset.saturating_add(request.limit()) < count);
        Self {
            count,
            next: request.number.checked_add(1).filter(|_| has_more),
            previous: (request.number > 1).then_some(request.number - 1),
            results,
        }
    }
}
