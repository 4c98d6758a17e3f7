//! Overlay state seeded from the record it was opened for.

/// Returned after a successful submission; the parent list should re-run its
/// current query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshIntent;

#[derive(Debug, Clone, PartialEq)]
pub enum Modal<R, D> {
    Closed,
    Open {
        record: R,
        draft: D,
    },
}

impl<R, D> Default for Modal<R, D> {
    fn default() -> Self {
        Modal::Closed
    }
}

impl<R, D> Modal<R, D> {
    pub fn open<F>(record: R, seed: F) -> Self
    where
        F: FnOnce(&R) -> D,
    {
        let draft = seed(&record);
        Modal::Open { record, draft }
    }

    /// Clears the record and the draft so the next open starts clean.
    pub fn close(&mut self) {
        *self = Modal::Closed;
    }

    pub fn is_open(&self) -> bool {
        matches!(self, Modal::Open { .. })
    }

    pub fn record(&self) -> Option<&R> {
        match self {
            Modal::Open { record, .. } => Some(record),
            Modal::Closed => None,
        }
    }

    pub fn draft(&self) -> Option<&D> {
        match self {
            Modal::Open { draft, .. } => Some(draft),
            Modal::Closed => None,
        }
    }

    pub fn draft_mut(&mut self) -> Option<&mut D> {
        match self {
            Modal::Open { draft, .. } => Some(draft),
            Modal::Closed => None,
        }
    }

    /// Close after the backend accepted the submission.
    pub fn submitted(&mut self) -> Option<RefreshIntent> {
        if !self.is_open() {
            return None;
        }
        self.close();
        Some(RefreshIntent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Loan {
        id: u64,
        status: &'static str,
    }

    #[test]
    fn open_seeds_draft_from_record() {
        let modal = Modal::open(Loan { id: 3, status: "menunggu" }, |loan| loan.status.to_string());
        assert!(modal.is_open());
        assert_eq!(modal.draft().map(String::as_str), Some("menunggu"));
        assert_eq!(modal.record().map(|loan| loan.id), Some(3));
    }

    #[test]
    fn close_clears_record_and_draft() {
        let mut modal = Modal::open(Loan { id: 3, status: "menunggu" }, |loan| loan.status.to_string());
        if let Some(draft) = modal.draft_mut() {
            *draft = "disetujui".to_string();
        }
        modal.close();
        assert!(modal.record().is_none());
        assert!(modal.draft().is_none());
    }

    #[test]
    fn successful_submit_requests_refresh() {
        let mut modal = Modal::open(Loan { id: 1, status: "dipinjam" }, |loan| loan.status);
        assert_eq!(modal.submitted(), Some(RefreshIntent));
        assert!(!modal.is_open());
        assert_eq!(modal.submitted(), None);
    }
}
