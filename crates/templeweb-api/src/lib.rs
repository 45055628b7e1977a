//! HTTP admin server with HTMX support
//!
//! Routes are organized into modules:
//! - routes::chart: Chart of accounts tree, node detail, group create / edit / delete
//! - routes::entries: Journal and debit-note forms with live totals
//! - routes::settings: Configuration display

pub mod error;
pub mod routes;

use axum::{
    routing::{get, post},
    Router,
};
use rust_decimal::Decimal;
use std::collections::HashMap;
use templeweb_client::ApiRef;
use templeweb_config::{Config, CurrencyConfig, SymbolPosition};
use templeweb_utils::{escape_html, format_amount};
use tokio::net::TcpListener;

pub use error::ApiError;

/// Application state
///
/// Holds no page state: every request builds its own session from `api`.
#[derive(Clone)]
pub struct AppState {
    pub api: ApiRef,
    pub config: Config,
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::chart::{
        htmx_chart_node, htmx_chart_tree, htmx_code_range, htmx_group_create, htmx_group_delete,
        htmx_group_edit_form, htmx_group_new_form, htmx_group_update, page_chart,
    };
    use routes::entries::{htmx_entry_row_add, htmx_entry_row_remove, htmx_entry_store, htmx_entry_totals, page_entry_new};
    use routes::settings::{api_settings, page_settings};

    Router::new()
        // API endpoints
        .route("/api/health", get(health_check))
        .route("/api/settings", get(api_settings))
        // HTMX page routes
        .route("/", get(index_page))
        .route("/accounts/chart", get(page_chart))
        .route("/entries/:kind/new", get(page_entry_new))
        .route("/settings", get(page_settings))
        // HTMX partial routes
        .route("/accounts/chart/tree", get(htmx_chart_tree))
        .route("/accounts/chart/nodes/:id", get(htmx_chart_node))
        .route("/accounts/chart/code-range", get(htmx_code_range))
        .route("/accounts/chart/groups/new", get(htmx_group_new_form))
        .route("/accounts/chart/groups/:id/edit", get(htmx_group_edit_form))
        .route("/accounts/chart/groups", post(htmx_group_create))
        .route("/accounts/chart/groups/:id", post(htmx_group_update))
        .route("/accounts/chart/groups/:id/delete", post(htmx_group_delete))
        .route("/entries/:kind/totals", post(htmx_entry_totals))
        .route("/entries/:kind/rows", post(htmx_entry_row_add))
        .route("/entries/:kind/rows/:index/delete", post(htmx_entry_row_remove))
        .route("/entries/:kind", post(htmx_entry_store))
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

// ==================== Form Helpers ====================

/// Decode an `application/x-www-form-urlencoded` body
///
/// Later duplicates of a key overwrite earlier ones.
pub fn parse_form(body: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();
    for pair in body.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let key = urlencoding::decode(&key.replace('+', " ")).map(|s| s.into_owned()).unwrap_or_default();
        let value = urlencoding::decode(&value.replace('+', " ")).map(|s| s.into_owned()).unwrap_or_default();
        params.insert(key, value);
    }
    params
}

/// Money amount with the configured symbol, decimals and separator
pub fn format_money(currency: &CurrencyConfig, value: Decimal) -> String {
    let amount = format_amount(value, currency.decimal_places, &currency.thousands_separator);
    match currency.symbol_position {
        SymbolPosition::Before => format!("{} {}", currency.symbol, amount),
        SymbolPosition::After => format!("{} {}", amount, currency.symbol),
    }
}

// ==================== Template Functions ====================

/// Base HTML template
pub fn base_html(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{} - Temple Accounts</title>
    <script src="https://unpkg.com/htmx.org@1.9.10"></script>
    <script src="https://cdn.tailwindcss.com"></script>
    <style>
        .htmx-indicator {{ opacity: 0; transition: opacity 0.3s; }}
        .htmx-request .htmx-indicator {{ opacity: 1; }}
        .htmx-request.htmx-indicator {{ opacity: 1; }}
    </style>
</head>
<body class="bg-gray-50 text-gray-900">
    {}
    <div id="toast" class="fixed bottom-4 right-4 w-96 z-50"></div>
</body>
</html>"#,
        escape_html(title),
        content
    )
}

/// Navigation sidebar
pub fn nav_sidebar(current_path: &str) -> String {
    let links = [
        ("/", "Dashboard", "dashboard"),
        ("/accounts/chart", "Chart of Accounts", "chart"),
        ("/entries/journal/new", "Journal Entry", "journal"),
        ("/entries/debit-note/new", "Debit Note", "debit-note"),
        ("/settings", "Settings", "settings"),
    ];

    let mut nav = String::from("<div class='bg-white border-r h-screen flex flex-col'><div class='p-4 border-b'><h1 class='text-xl font-bold text-amber-700'>Temple Accounts</h1></div><ul class='flex-1 py-2 space-y-1 px-2'>");

    for (path, label, id) in &links {
        let is_active = match *id {
            "dashboard" => current_path == "/",
            "journal" => current_path.starts_with("/entries/journal"),
            "debit-note" => current_path.starts_with("/entries/debit-note"),
            _ => current_path.starts_with(path),
        };
        let active_class = if is_active { "bg-amber-50 text-amber-700" } else { "text-gray-600 hover:bg-gray-50" };
        let icon = match *id {
            "dashboard" => "🏠",
            "chart" => "🗂️",
            "journal" => "📒",
            "debit-note" => "🧾",
            "settings" => "⚙️",
            _ => "📄",
        };
        nav.push_str(&format!(
            r#"<li><a href='{}' class='flex items-center gap-2 px-3 py-2 rounded-lg {}'>{}<span>{}</span></a></li>"#,
            path, active_class, icon, label
        ));
    }
    nav.push_str("</ul></div>");
    nav
}

/// Check if request is from HTMX (partial page update)
pub fn is_htmx_request(headers: &axum::http::HeaderMap) -> bool {
    headers.get("hx-request").is_some()
}

/// Wrap content for full page or HTMX partial
pub fn page_response(headers: &axum::http::HeaderMap, title: &str, current_path: &str, inner_content: &str) -> String {
    if is_htmx_request(headers) {
        format!(r#"<main class='flex-1 overflow-auto bg-gray-50 p-6'>{}</main>"#, inner_content)
    } else {
        base_html(title, &format!(r#"<div class='flex flex-col h-screen'>
    <div class='flex flex-1 overflow-hidden'>
        <aside class='w-64 flex-shrink-0'>{}</aside>
        <main class='flex-1 overflow-auto bg-gray-50 p-6'>{}</main>
    </div>
</div>"#,
            nav_sidebar(current_path), inner_content))
    }
}

/// Green confirmation box
pub fn toast_success(title: &str, message: &str) -> String {
    format!(
        r#"<div class='bg-green-50 border border-green-200 rounded-lg p-4'><div class='flex items-center gap-2'><span class='text-green-600'>✓</span><span class='font-medium text-green-800'>{}</span></div><p class='text-sm text-green-600 mt-1'>{}</p></div>"#,
        escape_html(title),
        escape_html(message)
    )
}

/// Red failure box with optional suggestions
pub fn toast_error(title: &str, message: &str, suggestions: &[String]) -> String {
    let hints: String = suggestions
        .iter()
        .map(|s| format!("<li>{}</li>", escape_html(s)))
        .collect();
    let hints = if hints.is_empty() {
        String::new()
    } else {
        format!("<ul class='text-xs text-red-500 mt-2 list-disc pl-4'>{}</ul>", hints)
    };
    format!(
        r#"<div class='bg-red-50 border border-red-200 rounded-lg p-4'><div class='flex items-center gap-2'><span class='text-red-600'>✗</span><span class='font-medium text-red-800'>{}</span></div><p class='text-sm text-red-600 mt-1'>{}</p>{}</div>"#,
        escape_html(title),
        escape_html(message),
        hints
    )
}

/// Index page with navigation
async fn index_page(headers: axum::http::HeaderMap) -> axum::response::Html<String> {
    let cards = [
        ("/accounts/chart", "Chart of Accounts", "Browse, search and maintain account groups"),
        ("/entries/journal/new", "Journal Entry", "Record a balanced journal entry"),
        ("/entries/debit-note/new", "Debit Note", "Record a debit note"),
        ("/settings", "Settings", "Server and display configuration"),
    ];
    let cards_html: String = cards
        .iter()
        .map(|(href, title, text)| {
            format!(
                r#"<a href='{}' class='block bg-white rounded-xl shadow-sm p-6 hover:shadow-md border border-gray-100'><h3 class='text-lg font-semibold mb-1'>{}</h3><p class='text-sm text-gray-500'>{}</p></a>"#,
                href, title, text
            )
        })
        .collect();

    let inner_content = format!(
        r#"<div class='mb-6'><h2 class='text-2xl font-bold'>Dashboard</h2></div>
        <div class='grid grid-cols-1 md:grid-cols-2 gap-4'>{}</div>"#,
        cards_html
    );

    axum::response::Html(page_response(&headers, "Dashboard", "/", &inner_content))
}

/// Start the HTTP server
///
/// Binds the configured address and serves until Ctrl-C.
pub async fn start_server(config: Config, api: ApiRef) -> std::io::Result<()> {
    let addr = config.bind_address();
    let state = AppState { api, config };

    let router = create_router(state);

    let listener = TcpListener::bind(&addr).await?;
    log::info!("Starting templeweb server on http://{}", addr);
    log::info!("Available routes:");
    log::info!("  - / (Dashboard)");
    log::info!("  - /accounts/chart (Chart of accounts)");
    log::info!("  - /entries/journal/new, /entries/debit-note/new (Entry forms)");
    log::info!("  - /settings (Configuration)");
    log::info!("  - /api/* (JSON API endpoints)");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("Server stopped gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
    }
}

#[cfg(test)]
pub(crate) mod testing;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{body_text, get, post_form, test_state};
    use tower::ServiceExt;

    #[test]
    fn test_parse_form() {
        let params = parse_form("name=Temple+Fund&code=1200&parent_id=g_1&empty=&note=a%26b");
        assert_eq!(params.get("name").unwrap(), "Temple Fund");
        assert_eq!(params.get("code").unwrap(), "1200");
        assert_eq!(params.get("empty").unwrap(), "");
        assert_eq!(params.get("note").unwrap(), "a&b");
        assert!(parse_form("").is_empty());
    }

    #[test]
    fn test_format_money() {
        let mut currency = CurrencyConfig::default();
        assert_eq!(format_money(&currency, Decimal::new(123456789, 2)), "RM 1,234,567.89");
        currency.symbol_position = SymbolPosition::After;
        assert_eq!(format_money(&currency, Decimal::ZERO), "0.00 RM");
    }

    #[test]
    fn test_page_response_htmx_partial() {
        let mut headers = axum::http::HeaderMap::new();
        let full = page_response(&headers, "Chart", "/accounts/chart", "<p>body</p>");
        assert!(full.starts_with("<!DOCTYPE html>"));
        assert!(full.contains("Chart of Accounts"));

        headers.insert("hx-request", "true".parse().unwrap());
        let partial = page_response(&headers, "Chart", "/accounts/chart", "<p>body</p>");
        assert!(!partial.contains("<!DOCTYPE html>"));
        assert!(partial.contains("<p>body</p>"));
    }

    #[test]
    fn test_toasts_escape_text() {
        let html = toast_error("Failed", "<script>", &["Reload".to_string()]);
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("<li>Reload</li>"));
        assert!(!toast_success("Saved", "ok").contains("<ul"));
    }

    #[tokio::test]
    async fn test_health_and_index() {
        let (_, state) = test_state();
        let router = create_router(state);

        let response = router.clone().oneshot(get("/api/health")).await.unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(body_text(response).await, "OK");

        let response = router.oneshot(get("/")).await.unwrap();
        assert!(body_text(response).await.contains("/accounts/chart"));
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let (_, state) = test_state();
        let response = create_router(state).oneshot(post_form("/nope", "")).await.unwrap();
        assert_eq!(response.status(), 404);
    }
}
