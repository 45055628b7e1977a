//! Entry form HTMX partials and submission

use crate::{ApiError, AppState};
use axum::extract::Path;
use axum::response::{Html, IntoResponse, Response};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::{BTreeSet, HashMap};
use std::str::FromStr;
use templeweb_client::EntryKind;
use templeweb_config::Config;
use templeweb_core::{build_tree, EntryForm, EntryHeader, ErrorContext, LineItem};

use super::page::{render_rows, render_totals};

/// Ledger choices for line pickers: `(ledger id, "code - name")`
pub(crate) type LedgerOptions = Vec<(i64, String)>;

pub(crate) fn parse_kind(kind: &str) -> Result<EntryKind, ApiError> {
    kind.parse().map_err(|_| ApiError::not_found(format!("entry type '{}'", kind)))
}

pub(crate) async fn load_ledgers(state: &AppState) -> Result<LedgerOptions, ApiError> {
    let response = state.api.chart_tree().await?;
    let tree = build_tree(&response.tree);
    Ok(tree
        .ledgers()
        .filter_map(|n| n.ledger_id().map(|id| (id, n.label())))
        .collect())
}

fn parse_optional_id(value: Option<&String>, field: &str) -> Result<Option<i64>, ApiError> {
    match value.map(|s| s.trim()) {
        None | Some("") => Ok(None),
        Some(s) => s
            .parse()
            .map(Some)
            .map_err(|_| ApiError::bad_request(format!("Invalid {}: {}", field, s))),
    }
}

/// Parse a typed amount; blank is zero and `,` grouping is ignored
fn parse_amount(value: Option<&String>, line: usize) -> Result<Decimal, ApiError> {
    let text: String = value
        .map(|s| s.chars().filter(|c| !c.is_whitespace() && *c != ',').collect())
        .unwrap_or_default();
    if text.is_empty() {
        return Ok(Decimal::ZERO);
    }
    let amount = Decimal::from_str(&text)
        .map_err(|_| ApiError::bad_request(format!("Invalid amount on line {}: {}", line, text)))?;
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(ApiError::bad_request(format!("Negative amount on line {}: {}", line, text)));
    }
    Ok(amount)
}

/// Rebuild an entry form from posted fields
///
/// Lines are `row_<n>_ledger`, `row_<n>_debit`, `row_<n>_credit`, taken in
/// index order. A line with both sides filled keeps the debit.
pub(crate) fn form_from_params(kind: EntryKind, params: &HashMap<String, String>, config: &Config) -> Result<EntryForm, ApiError> {
    let date = match params.get("date").map(|s| s.trim()).filter(|s| !s.is_empty()) {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| ApiError::bad_request(format!("Invalid date: {}", s)))?,
        None => chrono::Local::now().date_naive(),
    };
    let header = EntryHeader {
        date,
        fund_id: parse_optional_id(params.get("fund_id"), "fund")?,
        entry_code: params.get("entry_code").cloned().unwrap_or_default(),
        narration: params.get("narration").cloned().unwrap_or_default(),
    };

    let indices: BTreeSet<usize> = params
        .keys()
        .filter_map(|key| key.strip_prefix("row_")?.split('_').next()?.parse().ok())
        .collect();

    let mut rows = Vec::with_capacity(indices.len());
    for (line, index) in indices.into_iter().enumerate() {
        let mut item = LineItem {
            ledger_id: parse_optional_id(params.get(&format!("row_{}_ledger", index)), "ledger")?,
            ..LineItem::default()
        };
        let debit = parse_amount(params.get(&format!("row_{}_debit", index)), line + 1)?;
        let credit = parse_amount(params.get(&format!("row_{}_credit", index)), line + 1)?;
        if debit > Decimal::ZERO {
            item.set_debit(debit);
        } else {
            item.set_credit(credit);
        }
        rows.push(item);
    }

    Ok(EntryForm::from_parts(kind, header, rows, config.entries.min_rows))
}

fn parse_request(kind: &str, body: &str, config: &Config) -> Result<EntryForm, ApiError> {
    let kind = parse_kind(kind)?;
    form_from_params(kind, &crate::parse_form(body), config)
}

fn toast_oob(content: &str) -> String {
    format!(r#"<div id="toast" hx-swap-oob="true" class="fixed bottom-4 right-4 w-96 z-50">{}</div>"#, content)
}

/// Show a toast and leave the swap target as it is
fn keep_target(toast: String) -> Response {
    ([("hx-reswap", "none")], Html(toast_oob(&toast))).into_response()
}

pub async fn htmx_entry_totals(
    state: axum::extract::State<AppState>,
    path: Path<String>,
    body: String,
) -> Response {
    match parse_request(&path.0, &body, &state.config) {
        Ok(form) => Html(render_totals(form.kind(), &form.totals(), &state.config.currency)).into_response(),
        Err(e) => keep_target(e.report(&ErrorContext::new("entries.totals").with_target(&path.0))),
    }
}

pub async fn htmx_entry_row_add(
    state: axum::extract::State<AppState>,
    path: Path<String>,
    body: String,
) -> Response {
    let context = ErrorContext::new("entries.add_row").with_target(&path.0);
    let mut form = match parse_request(&path.0, &body, &state.config) {
        Ok(form) => form,
        Err(e) => return keep_target(e.report(&context)),
    };
    let ledgers = match load_ledgers(&state).await {
        Ok(ledgers) => ledgers,
        Err(e) => return keep_target(e.report(&context)),
    };
    form.add_row();
    Html(render_rows(&form, &ledgers)).into_response()
}

pub async fn htmx_entry_row_remove(
    state: axum::extract::State<AppState>,
    path: Path<(String, usize)>,
    body: String,
) -> Response {
    let (kind, index) = path.0;
    let context = ErrorContext::new("entries.remove_row").with_target(&kind);
    let mut form = match parse_request(&kind, &body, &state.config) {
        Ok(form) => form,
        Err(e) => return keep_target(e.report(&context)),
    };
    let ledgers = match load_ledgers(&state).await {
        Ok(ledgers) => ledgers,
        Err(e) => return keep_target(e.report(&context)),
    };
    let notice = match form.remove_row(index) {
        Ok(_) => String::new(),
        Err(e) => toast_oob(&ApiError::from(e).report(&context)),
    };
    let totals = render_totals(form.kind(), &form.totals(), &state.config.currency)
        .replacen(r#"<div id="entry-totals""#, r#"<div id="entry-totals" hx-swap-oob="true""#, 1);
    Html(format!("{}{}{}", render_rows(&form, &ledgers), totals, notice)).into_response()
}

pub async fn htmx_entry_store(
    state: axum::extract::State<AppState>,
    path: Path<String>,
    body: String,
) -> Html<String> {
    let context = ErrorContext::new("entries.store").with_target(&path.0);
    let form = match parse_request(&path.0, &body, &state.config) {
        Ok(form) => form,
        Err(e) => return Html(e.report(&context)),
    };
    match form.submit(state.api.as_ref()).await {
        Ok(created) => {
            let message = match (&created.entry_code, created.id) {
                (Some(code), _) => format!("Saved as {}", code),
                (None, Some(id)) => format!("Saved with id {}", id),
                (None, None) => "Saved".to_string(),
            };
            Html(format!(
                "{}<script>setTimeout(() => window.location.reload(), 1500);</script>",
                crate::toast_success(&format!("{} saved", form.kind().label()), &message)
            ))
        }
        Err(e) => Html(ApiError::from(e).report(&context)),
    }
}
