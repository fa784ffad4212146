//! Page assembly shared by the bundled store clients.
//!
//! # Invariants
//! - Candidates arrive ordered by partition key in the requested direction.
//! - `limit` bounds the number of evaluated items; filters run afterwards.
//! - `last_evaluated_key` is set only when evaluation stopped at the limit
//!   and at least one more candidate exists. A page that ends exactly on the
//!   last candidate carries no resume key.
//! - A limit of zero is a validation error.

use super::native::NativeDocument;
use super::request::Condition;
use super::{Page, ServiceError, ServiceErrorKind, StoreResult};

/// Upper bound on items evaluated for one page.
pub const MAX_PAGE_ITEMS: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    Forward,
    Backward,
}

impl Direction {
    fn is_after(self, key: &str, start: &str) -> bool {
        match self {
            Self::Forward => key > start,
            Self::Backward => key < start,
        }
    }
}

/// Rejects a zero limit the way the store service does.
pub(crate) fn validate_limit(limit: Option<u32>) -> StoreResult<()> {
    if limit == Some(0) {
        return Err(ServiceError::new(
            ServiceErrorKind::Validation,
            "limit must be at least 1",
        )
        .into());
    }
    Ok(())
}

/// Items evaluated for one page: the requested limit capped at
/// [`MAX_PAGE_ITEMS`], or the cap itself when unset.
///
/// Zero is rejected earlier by [`validate_limit`]; it is raised to 1 here so
/// page assembly always makes progress.
pub(crate) fn effective_limit(limit: Option<u32>) -> usize {
    limit
        .map(|value| value as usize)
        .unwrap_or(MAX_PAGE_ITEMS)
        .clamp(1, MAX_PAGE_ITEMS)
}

pub(crate) fn collect_page<I>(
    candidates: I,
    direction: Direction,
    exclusive_start_key: Option<&str>,
    limit: Option<u32>,
    filter: &[Condition],
) -> Page
where
    I: IntoIterator<Item = (String, NativeDocument)>,
{
    let limit = effective_limit(limit);
    let mut remaining = candidates
        .into_iter()
        .filter(|(key, _)| exclusive_start_key.map_or(true, |start| direction.is_after(key, start)))
        .peekable();

    let mut items = Vec::new();
    let mut last_key = None;
    let mut evaluated = 0;
    while evaluated < limit {
        let Some((key, document)) = remaining.next() else {
            break;
        };
        evaluated += 1;
        if filter.iter().all(|condition| condition.matches(&document)) {
            items.push(document);
        }
        last_key = Some(key);
    }

    let last_evaluated_key = if remaining.peek().is_some() {
        last_key
    } else {
        None
    };

    Page {
        items,
        last_evaluated_key,
    }
}
