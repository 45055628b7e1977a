//! Settings page rendering - Full page endpoints

use crate::AppState;
use templeweb_utils::escape_html;

fn section(title: &str, fields: &[(&str, String)]) -> String {
    let items: String = fields
        .iter()
        .map(|(label, value)| {
            format!(
                "<div><p class='text-sm text-gray-500'>{}</p><p class='font-medium'>{}</p></div>",
                label,
                escape_html(value)
            )
        })
        .collect();
    format!(
        "<div class='bg-white rounded-xl shadow-sm p-6 mb-6'><h3 class='text-lg font-semibold mb-4'>{}</h3><div class='grid grid-cols-2 gap-4'>{}</div></div>",
        title, items
    )
}

fn on_off(flag: bool) -> String {
    let text = if flag { "Enabled" } else { "Disabled" };
    text.to_string()
}

pub async fn page_settings(
    state: axum::extract::State<AppState>,
    headers: axum::http::HeaderMap,
) -> axum::response::Html<String> {
    let config = &state.config;

    let sections = [
        section("Server", &[
            ("Host", config.server.host.clone()),
            ("Port", config.server.port.to_string()),
        ]),
        section("Accounts API", &[
            ("Base URL", config.upstream.base_url.clone()),
            ("Timeout", format!("{} s", config.upstream.timeout_secs)),
        ]),
        section("Entry forms", &[
            ("Starting lines", config.entries.min_rows.to_string()),
            (
                "Default fund",
                config.entries.default_fund_id.map(|id| id.to_string()).unwrap_or_else(|| "None".to_string()),
            ),
        ]),
        section("Chart tree", &[
            ("Expand on load", on_off(config.tree.expand_on_load)),
            ("Show codes", on_off(config.tree.show_codes)),
        ]),
        section("Currency", &[
            ("Symbol", config.currency.symbol.clone()),
            ("Symbol position", config.currency.symbol_position.to_string()),
            ("Decimal places", config.currency.decimal_places.to_string()),
            ("Thousands separator", format!("\"{}\"", config.currency.thousands_separator)),
        ]),
        section("Logging", &[("Level", config.logging.level.clone())]),
    ];

    let inner_content = format!(
        "<div class='mb-6'><h2 class='text-2xl font-bold'>Settings</h2><p class='text-sm text-gray-500 mt-1'>Read from the configuration file at startup</p></div>{}",
        sections.concat()
    );

    axum::response::Html(crate::page_response(&headers, "Settings", "/settings", &inner_content))
}

#[cfg(test)]
mod tests {
    use crate::create_router;
    use crate::testing::{body_text, get, test_state};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_settings_page() {
        let (_, mut state) = test_state();
        state.config.entries.default_fund_id = Some(3);
        state.config.upstream.base_url = "https://accounts.example.org/api/v1".to_string();

        let html = body_text(create_router(state).oneshot(get("/settings")).await.unwrap()).await;
        assert!(html.contains("<!DOCTYPE html>"));
        assert!(html.contains("https://accounts.example.org/api/v1"));
        assert!(html.contains("8081"));
        assert!(html.contains("<p class='font-medium'>3</p>"));
        assert!(html.contains("&quot;,&quot;"));
        assert!(html.contains("before"));
    }
}
