//! Journal and debit-note entry form session

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use templeweb_client::{AccountsApi, DrCr, Entry, EntryCreated, EntryItems, EntryKind, EntryRequest};

use crate::balance::{compute_totals, validate, LineItem, Totals};
use crate::error::{CoreError, CoreResult};

/// Fewest lines a double-entry form can have
pub const MIN_ROWS: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryHeader {
    pub date: NaiveDate,
    pub fund_id: Option<i64>,
    pub entry_code: String,
    pub narration: String,
}

impl EntryHeader {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            fund_id: None,
            entry_code: String::new(),
            narration: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntryForm {
    kind: EntryKind,
    header: EntryHeader,
    rows: Vec<LineItem>,
    min_rows: usize,
}

impl EntryForm {
    /// Empty form with two blank lines
    pub fn new(kind: EntryKind, date: NaiveDate) -> Self {
        Self::with_min_rows(kind, date, MIN_ROWS)
    }

    /// Empty form with at least `min_rows` blank lines (never fewer than two)
    pub fn with_min_rows(kind: EntryKind, date: NaiveDate, min_rows: usize) -> Self {
        Self::from_parts(kind, EntryHeader::new(date), Vec::new(), min_rows)
    }

    /// Rebuild a form from posted fields, padding with blank lines
    pub fn from_parts(kind: EntryKind, header: EntryHeader, mut rows: Vec<LineItem>, min_rows: usize) -> Self {
        let min_rows = min_rows.max(MIN_ROWS);
        if rows.len() < min_rows {
            rows.resize(min_rows, LineItem::default());
        }
        Self { kind, header, rows, min_rows }
    }

    /// Prefill from a stored entry
    ///
    /// The entry code is left blank; the copy is a new entry and gets its
    /// own code.
    pub fn from_entry(kind: EntryKind, entry: &Entry) -> Self {
        let rows = entry
            .entry_items
            .iter()
            .map(|item| match item.dc {
                DrCr::Debit => LineItem::debit(item.ledger_id, item.amount),
                DrCr::Credit => LineItem::credit(item.ledger_id, item.amount),
            })
            .collect();

        let header = EntryHeader {
            date: entry.date,
            fund_id: entry.fund_id,
            entry_code: String::new(),
            narration: entry.narration.clone().unwrap_or_default(),
        };
        log::debug!(target: "templeweb::entry", "prefilled {} from entry {}", kind, entry.id);
        Self::from_parts(kind, header, rows, MIN_ROWS)
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn header(&self) -> &EntryHeader {
        &self.header
    }

    pub fn header_mut(&mut self) -> &mut EntryHeader {
        &mut self.header
    }

    pub fn rows(&self) -> &[LineItem] {
        &self.rows
    }

    pub fn min_rows(&self) -> usize {
        self.min_rows
    }

    /// Append a blank line; returns its index
    pub fn add_row(&mut self) -> usize {
        self.rows.push(LineItem::default());
        self.rows.len() - 1
    }

    pub fn remove_row(&mut self, index: usize) -> CoreResult<LineItem> {
        if index >= self.rows.len() {
            return Err(CoreError::RowOutOfRange { index });
        }
        if self.rows.len() <= self.min_rows {
            return Err(CoreError::TooFewRows { min: self.min_rows });
        }
        Ok(self.rows.remove(index))
    }

    pub fn set_ledger(&mut self, index: usize, ledger_id: Option<i64>) -> CoreResult<()> {
        self.row_mut(index)?.ledger_id = ledger_id;
        Ok(())
    }

    pub fn set_debit(&mut self, index: usize, amount: Decimal) -> CoreResult<()> {
        self.row_mut(index)?.set_debit(amount);
        Ok(())
    }

    pub fn set_credit(&mut self, index: usize, amount: Decimal) -> CoreResult<()> {
        self.row_mut(index)?.set_credit(amount);
        Ok(())
    }

    /// Live totals over every line on the form
    pub fn totals(&self) -> CoreResult<Totals> {
        Ok(compute_totals(&self.rows)?)
    }

    /// Validate and build the request body
    pub fn submission(&self) -> CoreResult<EntryRequest> {
        let valid = validate(&self.rows)?;
        Ok(EntryRequest {
            date: self.header.date,
            fund_id: self.header.fund_id,
            entry_code: self.header.entry_code.trim().to_string(),
            narration: self.header.narration.trim().to_string(),
            items: EntryItems::new(self.kind, valid.requests()),
        })
    }

    /// Validate, then post to the endpoint for this form's kind
    pub async fn submit(&self, api: &dyn AccountsApi) -> CoreResult<EntryCreated> {
        let request = self.submission()?;
        let created = api.create_entry(&request).await?;
        log::info!(
            target: "templeweb::entry",
            "{} saved with {} lines (id {:?})",
            self.kind,
            request.items.items().len(),
            created.id
        );
        Ok(created)
    }

    fn row_mut(&mut self, index: usize) -> CoreResult<&mut LineItem> {
        self.rows.get_mut(index).ok_or(CoreError::RowOutOfRange { index })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::testing::FakeApi;
    use std::str::FromStr;
    use templeweb_client::EntryItem;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, 14).unwrap()
    }

    fn balanced_form(kind: EntryKind) -> EntryForm {
        let mut form = EntryForm::new(kind, date());
        form.set_ledger(0, Some(10)).unwrap();
        form.set_debit(0, dec("250")).unwrap();
        form.set_ledger(1, Some(11)).unwrap();
        form.set_credit(1, dec("250")).unwrap();
        form.header_mut().narration = "  Vaisakhi offerings ".to_string();
        form
    }

    #[test]
    fn test_new_form_has_two_rows() {
        let form = EntryForm::new(EntryKind::Journal, date());
        assert_eq!(form.rows().len(), 2);
        assert!(form.totals().unwrap().balanced);
        assert_eq!(form.totals().unwrap().total_debit, Decimal::ZERO);

        let form = EntryForm::with_min_rows(EntryKind::Journal, date(), 0);
        assert_eq!(form.min_rows(), MIN_ROWS);
        let form = EntryForm::with_min_rows(EntryKind::Journal, date(), 4);
        assert_eq!(form.rows().len(), 4);
    }

    #[test]
    fn test_remove_row_keeps_minimum() {
        let mut form = EntryForm::new(EntryKind::Journal, date());
        let err = form.remove_row(0).unwrap_err();
        assert_eq!(err.code(), ErrorCode::TooFewRows);

        assert_eq!(form.add_row(), 2);
        form.set_debit(2, dec("5")).unwrap();
        let removed = form.remove_row(2).unwrap();
        assert_eq!(removed.debit, dec("5"));
        assert_eq!(form.rows().len(), 2);

        let err = form.remove_row(7).unwrap_err();
        assert_eq!(err.code(), ErrorCode::RowOutOfRange);
    }

    #[test]
    fn test_out_of_range_edit() {
        let mut form = EntryForm::new(EntryKind::Journal, date());
        assert!(matches!(form.set_debit(5, dec("1")), Err(CoreError::RowOutOfRange { index: 5 })));
    }

    #[test]
    fn test_submission_uses_kind_field() {
        let request = balanced_form(EntryKind::DebitNote).submission().unwrap();
        assert_eq!(request.narration, "Vaisakhi offerings");
        assert!(matches!(request.items, EntryItems::DebitNote(_)));
        assert_eq!(request.items.items().len(), 2);
        assert_eq!(request.items.items()[0].dr_amount, dec("250"));
        assert_eq!(request.items.items()[1].cr_amount, dec("250"));

        let request = balanced_form(EntryKind::Journal).submission().unwrap();
        assert!(matches!(request.items, EntryItems::Journal(_)));
    }

    #[test]
    fn test_submission_blocks_unbalanced() {
        let mut form = balanced_form(EntryKind::Journal);
        form.set_credit(1, dec("249.50")).unwrap();
        assert!(!form.totals().unwrap().balanced);
        let err = form.submission().unwrap_err();
        assert_eq!(err.code(), ErrorCode::Unbalanced);
    }

    #[test]
    fn test_overflowing_lines_block_submission() {
        let mut form = balanced_form(EntryKind::Journal);
        form.set_debit(0, Decimal::MAX).unwrap();
        form.add_row();
        form.set_ledger(2, Some(12)).unwrap();
        form.set_debit(2, Decimal::MAX).unwrap();
        assert_eq!(form.totals().unwrap_err().code(), ErrorCode::AmountTooLarge);
        assert_eq!(form.submission().unwrap_err().code(), ErrorCode::AmountTooLarge);
    }

    #[test]
    fn test_submission_blocks_empty() {
        let form = EntryForm::new(EntryKind::Journal, date());
        let err = form.submission().unwrap_err();
        assert_eq!(err.code(), ErrorCode::NoValidItems);
    }

    #[test]
    fn test_from_entry() {
        let entry = Entry {
            id: 42,
            date: date(),
            entry_code: Some("JOR00042".to_string()),
            narration: Some("Festival".to_string()),
            fund_id: Some(3),
            entry_items: vec![
                EntryItem { ledger_id: 10, dc: DrCr::Debit, amount: dec("100") },
                EntryItem { ledger_id: 11, dc: DrCr::Credit, amount: dec("60") },
                EntryItem { ledger_id: 12, dc: DrCr::Credit, amount: dec("40") },
            ],
        };
        let form = EntryForm::from_entry(EntryKind::Journal, &entry);

        assert_eq!(form.rows().len(), 3);
        assert_eq!(form.rows()[0], LineItem::debit(10, dec("100")));
        assert_eq!(form.rows()[2], LineItem::credit(12, dec("40")));
        assert_eq!(form.header().fund_id, Some(3));
        assert_eq!(form.header().narration, "Festival");
        assert!(form.header().entry_code.is_empty());
        assert!(form.totals().unwrap().balanced);
    }

    #[test]
    fn test_from_entry_pads_rows() {
        let entry = Entry {
            id: 1,
            date: date(),
            entry_code: None,
            narration: None,
            fund_id: None,
            entry_items: vec![],
        };
        let form = EntryForm::from_entry(EntryKind::DebitNote, &entry);
        assert_eq!(form.rows().len(), MIN_ROWS);
        assert_eq!(form.kind(), EntryKind::DebitNote);
    }

    #[tokio::test]
    async fn test_submit_posts_request() {
        let api = FakeApi::default();
        let created = balanced_form(EntryKind::Journal).submit(&api).await.unwrap();
        assert_eq!(created.id, Some(1));

        let state = api.state.lock().unwrap();
        assert_eq!(state.submitted.len(), 1);
        assert_eq!(state.submitted[0].items.kind(), EntryKind::Journal);
    }

    #[tokio::test]
    async fn test_submit_does_not_post_invalid() {
        let api = FakeApi::default();
        let form = EntryForm::new(EntryKind::Journal, date());
        assert!(form.submit(&api).await.is_err());
        assert!(api.state.lock().unwrap().submitted.is_empty());
    }

    #[tokio::test]
    async fn test_submit_reports_rejection() {
        let api = FakeApi::default();
        api.state.lock().unwrap().fail_writes = Some("Entry code already used".to_string());
        let err = balanced_form(EntryKind::Journal).submit(&api).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::Upstream);
    }
}
