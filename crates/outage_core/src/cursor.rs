use thiserror::Error;

/// Number of rows requested per page. The backend only accepts four values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct ItemsPerPage(u64);

/// Rejected page size.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("items per page must be one of 10, 25, 50, 100 (got {0})")]
pub struct PageSizeError(pub u64);

impl ItemsPerPage {
    const DOMAIN: [u64; 4] = [10, 25, 50, 100];

    pub fn new(value: u64) -> Result<Self, PageSizeError> {
        if Self::DOMAIN.contains(&value) {
            Ok(Self(value))
        } else {
            Err(PageSizeError(value))
        }
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl Default for ItemsPerPage {
    fn default() -> Self {
        Self(100)
    }
}

impl TryFrom<u64> for ItemsPerPage {
    type Error = PageSizeError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ItemsPerPage> for u64 {
    fn from(value: ItemsPerPage) -> u64 {
        value.0
    }
}

/// The server returned an empty page before the declared total was reached.
///
/// Without this guard the fetch loop would re-request the same offset forever.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("pagination stalled: server returned no new rows at offset {offset} of {total}")]
pub struct StalledPagination {
    pub offset: u64,
    pub total: u64,
}

/// Outcome of one cursor advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Request the next page starting at `next_offset`.
    Continue { next_offset: u64 },
    /// The loop is finished; all wanted rows are accounted for.
    Done,
}

/// Tracks offset / have-count / server total for one paginated query.
///
/// The offset only ever increases. The loop ends when the accumulated count
/// reaches the server-declared total, or the optional stop offset if that
/// comes first.
#[derive(Debug, Clone)]
pub struct PageCursor {
    have: u64,
    total: Option<u64>,
    stop_offset: Option<u64>,
    items_per_page: ItemsPerPage,
}

impl PageCursor {
    pub fn new(items_per_page: ItemsPerPage) -> Self {
        Self {
            have: 0,
            total: None,
            stop_offset: None,
            items_per_page,
        }
    }

    /// Starts the cursor at a nonzero offset (used to skip already-elapsed
    /// series points). Rows before `offset` count as already satisfied.
    pub fn starting_at(mut self, offset: u64) -> Self {
        self.have = offset;
        self
    }

    /// Caps the loop at `stop_offset` even if the server holds more rows.
    pub fn with_stop_offset(mut self, stop_offset: u64) -> Self {
        self.stop_offset = Some(stop_offset);
        self
    }

    /// The offset the next page request should carry.
    pub fn offset(&self) -> u64 {
        self.have
    }

    pub fn items_per_page(&self) -> ItemsPerPage {
        self.items_per_page
    }

    /// Server-declared total, once a page has been seen.
    pub fn total(&self) -> Option<u64> {
        self.total
    }

    /// Fraction of wanted rows fetched so far. Defined as 0.0 when the total
    /// is unknown or zero, never a division error.
    pub fn progress(&self) -> f64 {
        match self.effective_goal() {
            Some(goal) if goal > 0 => (self.have.min(goal)) as f64 / goal as f64,
            _ => 0.0,
        }
    }

    fn effective_goal(&self) -> Option<u64> {
        let total = self.total?;
        Some(match self.stop_offset {
            Some(stop) => total.min(stop),
            None => total,
        })
    }

    /// Records one page result and decides whether to keep going.
    ///
    /// A zero `server_total` ends the loop immediately with no rows. An empty
    /// page while rows are still outstanding is a stalled server, reported as
    /// an error rather than looping.
    pub fn advance(
        &mut self,
        rows_returned: u64,
        server_total: u64,
    ) -> Result<Step, StalledPagination> {
        self.total = Some(server_total);
        self.have += rows_returned;

        let goal = match self.stop_offset {
            Some(stop) => server_total.min(stop),
            None => server_total,
        };

        if self.have >= goal {
            return Ok(Step::Done);
        }
        if rows_returned == 0 {
            return Err(StalledPagination {
                offset: self.have,
                total: server_total,
            });
        }
        Ok(Step::Continue {
            next_offset: self.have,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_size_domain() {
        assert!(ItemsPerPage::new(25).is_ok());
        assert_eq!(ItemsPerPage::new(42), Err(PageSizeError(42)));
    }

    #[test]
    fn offset_never_decreases() {
        let mut cursor = PageCursor::new(ItemsPerPage::default());
        let mut last = cursor.offset();
        for _ in 0..3 {
            cursor.advance(100, 350).unwrap();
            assert!(cursor.offset() > last);
            last = cursor.offset();
        }
    }
}
