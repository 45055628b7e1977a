//! Entry form page rendering

use crate::{ApiError, AppState};
use axum::extract::{Path, Query};
use axum::response::Html;
use rust_decimal::Decimal;
use std::collections::HashMap;
use templeweb_client::EntryKind;
use templeweb_config::CurrencyConfig;
use templeweb_core::{CoreResult, EntryForm, ErrorContext, Totals};
use templeweb_utils::escape_html;

use super::api::{load_ledgers, parse_kind, LedgerOptions};

fn amount_value(amount: Decimal) -> String {
    if amount.is_zero() {
        String::new()
    } else {
        amount.to_string()
    }
}

fn ledger_options(ledgers: &LedgerOptions, selected: Option<i64>) -> String {
    let mut html = String::from(r#"<option value="">Select ledger</option>"#);
    let mut found = false;
    for (id, label) in ledgers {
        let is_selected = selected == Some(*id);
        found |= is_selected;
        html.push_str(&format!(
            r#"<option value="{}"{}>{}</option>"#,
            id,
            if is_selected { " selected" } else { "" },
            escape_html(label)
        ));
    }
    // keep a ledger that has since left the chart
    if let (Some(id), false) = (selected, found) {
        html.push_str(&format!(r#"<option value="{}" selected>Ledger {}</option>"#, id, id));
    }
    html
}

/// Line block, swapped as a whole when lines are added or removed
pub fn render_rows(form: &EntryForm, ledgers: &LedgerOptions) -> String {
    let path = form.kind().path();
    let at_minimum = form.rows().len() <= form.min_rows();
    let rows: String = form
        .rows()
        .iter()
        .enumerate()
        .map(|(i, row)| {
            format!(
                r##"<div class="entry-row grid grid-cols-12 gap-2 items-center py-1">
    <select name="row_{i}_ledger" class="col-span-6 px-3 py-2 border border-gray-300 rounded-lg">{options}</select>
    <input type="text" inputmode="decimal" name="row_{i}_debit" value="{debit}" placeholder="0.00" class="debit col-span-2 px-3 py-2 border border-gray-300 rounded-lg text-right font-mono" oninput="if (this.value) this.closest('.entry-row').querySelector('.credit').value = ''">
    <input type="text" inputmode="decimal" name="row_{i}_credit" value="{credit}" placeholder="0.00" class="credit col-span-2 px-3 py-2 border border-gray-300 rounded-lg text-right font-mono" oninput="if (this.value) this.closest('.entry-row').querySelector('.debit').value = ''">
    <button type="button" class="col-span-2 text-sm text-red-600 hover:text-red-800 disabled:text-gray-300"{disabled} hx-post="/entries/{path}/rows/{i}/delete" hx-include="#entry-form" hx-target="#entry-rows" hx-swap="outerHTML">Remove</button>
</div>"##,
                i = i,
                options = ledger_options(ledgers, row.ledger_id),
                debit = amount_value(row.debit),
                credit = amount_value(row.credit),
                disabled = if at_minimum { " disabled" } else { "" },
                path = path,
            )
        })
        .collect();
    format!(r#"<div id="entry-rows">{}</div>"#, rows)
}

/// Totals box; reposts the form on every edit to refresh itself
///
/// A balanced entry shows a zero difference even when the raw difference
/// would round up to the smallest displayed unit.
pub fn render_totals(kind: EntryKind, totals: &CoreResult<Totals>, currency: &CurrencyConfig) -> String {
    let (badge, debit, credit, difference_class, difference) = match totals {
        Ok(totals) => {
            let shown_difference = if totals.balanced { Decimal::ZERO } else { totals.difference };
            (
                if totals.balanced {
                    r#"<span class="px-2 py-1 text-xs rounded-full bg-green-100 text-green-700">Balanced</span>"#
                } else {
                    r#"<span class="px-2 py-1 text-xs rounded-full bg-red-100 text-red-700">Unbalanced</span>"#
                },
                crate::format_money(currency, totals.total_debit),
                crate::format_money(currency, totals.total_credit),
                if totals.balanced { "text-gray-500" } else { "text-red-600" },
                format!("Difference {}", crate::format_money(currency, shown_difference)),
            )
        }
        Err(e) => (
            r#"<span class="px-2 py-1 text-xs rounded-full bg-red-100 text-red-700">Invalid</span>"#,
            "-".to_string(),
            "-".to_string(),
            "text-red-600",
            e.to_string(),
        ),
    };
    format!(
        r##"<div id="entry-totals" hx-post="/entries/{path}/totals" hx-trigger="input delay:300ms from:#entry-form, change from:#entry-form" hx-include="#entry-form" hx-swap="outerHTML" class="grid grid-cols-12 gap-2 items-center py-3 border-t border-gray-200 mt-2">
    <div class="col-span-6 text-right font-medium">Total {badge}</div>
    <div class="col-span-2 text-right font-mono">{debit}</div>
    <div class="col-span-2 text-right font-mono">{credit}</div>
    <div class="col-span-2 text-sm {difference_class}">{difference}</div>
</div>"##,
        path = kind.path(),
        badge = badge,
        debit = escape_html(&debit),
        credit = escape_html(&credit),
        difference_class = difference_class,
        difference = escape_html(&difference),
    )
}

/// Whole entry form
pub fn render_entry_form(form: &EntryForm, ledgers: &LedgerOptions, currency: &CurrencyConfig) -> String {
    let header = form.header();
    let fund = header.fund_id.map(|id| id.to_string()).unwrap_or_default();
    format!(
        r##"<form id="entry-form" hx-post="/entries/{path}" hx-target="#toast" class="bg-white rounded-xl shadow-sm border border-gray-200 p-6 space-y-6">
    <div class="grid grid-cols-1 md:grid-cols-3 gap-4">
        <label class="block"><span class="text-sm font-medium text-gray-700">Date</span>
            <input type="date" name="date" value="{date}" required class="mt-1 w-full px-3 py-2 border border-gray-300 rounded-lg"></label>
        <label class="block"><span class="text-sm font-medium text-gray-700">Fund</span>
            <input type="number" name="fund_id" value="{fund}" class="mt-1 w-full px-3 py-2 border border-gray-300 rounded-lg"></label>
        <label class="block"><span class="text-sm font-medium text-gray-700">Entry code</span>
            <input type="text" name="entry_code" value="{code}" placeholder="Assigned on save if blank" class="mt-1 w-full px-3 py-2 border border-gray-300 rounded-lg font-mono"></label>
    </div>
    <label class="block"><span class="text-sm font-medium text-gray-700">Narration</span>
        <textarea name="narration" rows="2" class="mt-1 w-full px-3 py-2 border border-gray-300 rounded-lg">{narration}</textarea></label>
    <div>
        <div class="grid grid-cols-12 gap-2 text-xs font-semibold text-gray-500 uppercase pb-2 border-b border-gray-200">
            <div class="col-span-6">Ledger</div><div class="col-span-2 text-right">Debit</div><div class="col-span-2 text-right">Credit</div><div class="col-span-2"></div>
        </div>
        {rows}
        <button type="button" class="mt-2 text-sm text-amber-700 hover:text-amber-900" hx-post="/entries/{path}/rows" hx-include="#entry-form" hx-target="#entry-rows" hx-swap="outerHTML">+ Add line</button>
        {totals}
    </div>
    <div class="flex justify-end">
        <button type="submit" class="px-6 py-2.5 bg-amber-600 text-white rounded-lg hover:bg-amber-700">Save {label}</button>
    </div>
</form>"##,
        path = form.kind().path(),
        date = header.date.format("%Y-%m-%d"),
        fund = fund,
        code = escape_html(&header.entry_code),
        narration = escape_html(&header.narration),
        rows = render_rows(form, ledgers),
        totals = render_totals(form.kind(), &form.totals(), currency),
        label = form.kind().label(),
    )
}

async fn initial_form(state: &AppState, kind: &str, query: &HashMap<String, String>) -> Result<(EntryForm, LedgerOptions), ApiError> {
    let kind = parse_kind(kind)?;
    let form = match query.get("from").map(|s| s.trim()).filter(|s| !s.is_empty()) {
        Some(from) => {
            let id: i64 = from
                .parse()
                .map_err(|_| ApiError::bad_request(format!("Invalid entry id: {}", from)))?;
            let entry = state.api.entry(id).await?;
            EntryForm::from_entry(kind, &entry)
        }
        None => {
            let today = chrono::Local::now().date_naive();
            let mut form = EntryForm::with_min_rows(kind, today, state.config.entries.min_rows);
            form.header_mut().fund_id = state.config.entries.default_fund_id;
            form
        }
    };
    let ledgers = load_ledgers(state).await?;
    Ok((form, ledgers))
}

pub async fn page_entry_new(
    state: axum::extract::State<AppState>,
    headers: axum::http::HeaderMap,
    path: Path<String>,
    query: Query<HashMap<String, String>>,
) -> Html<String> {
    let kind = path.0;
    let current_path = format!("/entries/{}/new", kind);

    match initial_form(&state, &kind, &query.0).await {
        Ok((form, ledgers)) => {
            let label = form.kind().label();
            let copied = if query.0.contains_key("from") {
                r#"<p class="text-sm text-gray-500 mt-1">Copied from an earlier entry</p>"#
            } else {
                ""
            };
            let inner_content = format!(
                r#"<div class="mb-6"><h2 class="text-2xl font-bold">New {}</h2>{}</div>{}"#,
                label,
                copied,
                render_entry_form(&form, &ledgers, &state.config.currency)
            );
            Html(crate::page_response(&headers, label, &current_path, &inner_content))
        }
        Err(e) => {
            let toast = e.report(&ErrorContext::new("entries.page").with_target(&kind));
            let inner_content = format!(r#"<div class="mb-6"><h2 class="text-2xl font-bold">New entry</h2></div>{}"#, toast);
            Html(crate::page_response(&headers, "New entry", &current_path, &inner_content))
        }
    }
}
