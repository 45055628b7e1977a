//! Chart-of-accounts HTMX partials and group actions

use crate::{ApiError, AppState};
use axum::extract::{Path, Query};
use axum::response::Html;
use std::collections::HashMap;
use templeweb_core::{ChartOfAccounts, CoreError, ErrorContext, GroupDraft};

use super::page::{render_code_range, render_group_form, render_node_detail, render_tree, render_tree_oob};

pub(crate) async fn load_chart(state: &AppState) -> Result<ChartOfAccounts, ApiError> {
    Ok(ChartOfAccounts::init(state.api.clone()).await?)
}

/// Apply `expand`, `open` and `search` from the query string
///
/// The filter runs last so the path to every match is open whatever the
/// other parameters say.
pub(crate) fn apply_view(chart: &mut ChartOfAccounts, params: &HashMap<String, String>, expand_on_load: bool) {
    let tree = chart.tree_mut();
    match params.get("expand").map(String::as_str) {
        Some("all") => tree.expand_all(),
        Some("none") => tree.collapse_all(),
        _ if expand_on_load && !params.contains_key("open") => tree.expand_all(),
        _ => {}
    }
    if let Some(open) = params.get("open") {
        for id in open.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            tree.set_expanded(id, true);
        }
    }
    if let Some(search) = params.get("search") {
        tree.filter_by_substring(search);
    }
}

/// Open `id` and every group above it so it shows after a re-render
fn reveal(chart: &mut ChartOfAccounts, id: &str) {
    let path: Vec<String> = chart
        .tree()
        .ancestors(id)
        .iter()
        .map(|n| n.id.clone())
        .chain(std::iter::once(id.to_string()))
        .collect();
    for id in path {
        chart.tree_mut().set_expanded(&id, true);
    }
}

fn draft_from_form(body: &str) -> GroupDraft {
    let params = crate::parse_form(body);
    GroupDraft {
        name: params.get("name").cloned().unwrap_or_default(),
        code: params.get("code").cloned().unwrap_or_default(),
        parent_id: params.get("parent_id").filter(|s| !s.trim().is_empty()).cloned(),
    }
}

fn check_draft(draft: &GroupDraft) -> Result<(), ApiError> {
    if draft.name.trim().is_empty() {
        return Err(ApiError::bad_request("Group name is required"));
    }
    if !templeweb_core::is_valid_code(&draft.code) {
        return Err(ApiError::bad_request("Group code must be 4 digits"));
    }
    Ok(())
}

/// Toast plus the refreshed tree, swapped out of band
fn write_response(chart: &ChartOfAccounts, title: &str, message: &str, show_codes: bool) -> Html<String> {
    Html(format!(
        r#"{}{}<div id="node-detail" hx-swap-oob="true"></div><div id="group-form" hx-swap-oob="true"></div>"#,
        crate::toast_success(title, message),
        render_tree_oob(chart.tree(), show_codes)
    ))
}

pub async fn htmx_chart_tree(
    state: axum::extract::State<AppState>,
    query: Query<HashMap<String, String>>,
) -> Html<String> {
    let mut chart = match load_chart(&state).await {
        Ok(chart) => chart,
        Err(e) => return Html(e.report(&ErrorContext::new("chart.tree"))),
    };
    apply_view(&mut chart, &query.0, state.config.tree.expand_on_load);
    log::debug!(target: "templeweb::chart", "tree partial: {} visible of {}", chart.tree().visible_count(), chart.tree().len());
    Html(render_tree(chart.tree(), state.config.tree.show_codes))
}

pub async fn htmx_chart_node(
    state: axum::extract::State<AppState>,
    path: Path<String>,
) -> Html<String> {
    let id = path.0;
    let context = ErrorContext::new("chart.node").with_target(&id);
    let mut chart = match load_chart(&state).await {
        Ok(chart) => chart,
        Err(e) => return Html(e.report(&context)),
    };
    match chart.select(&id) {
        Ok(_) => {}
        Err(e) => return Html(ApiError::from(e).report(&context)),
    }
    match chart.selected() {
        Some(node) => Html(render_node_detail(&chart, node)),
        None => Html(ApiError::from(CoreError::NodeNotFound { id }).report(&context)),
    }
}

pub async fn htmx_code_range(
    state: axum::extract::State<AppState>,
    query: Query<HashMap<String, String>>,
) -> Html<String> {
    let parent_id = query.0.get("parent_id").map(|s| s.trim()).filter(|s| !s.is_empty());
    if parent_id.is_none() {
        return Html(render_code_range(None));
    }
    match load_chart(&state).await {
        Ok(chart) => Html(render_code_range(chart.code_range_for_parent(parent_id))),
        Err(e) => Html(e.report(&ErrorContext::new("chart.code_range"))),
    }
}

pub async fn htmx_group_new_form(
    state: axum::extract::State<AppState>,
    query: Query<HashMap<String, String>>,
) -> Html<String> {
    let context = ErrorContext::new("chart.new_group_form");
    let chart = match load_chart(&state).await {
        Ok(chart) => chart,
        Err(e) => return Html(e.report(&context)),
    };
    if !chart.permissions().can_create {
        let error = CoreError::PermissionDenied { action: "create groups".to_string() };
        return Html(ApiError::from(error).report(&context));
    }
    let draft = GroupDraft {
        parent_id: query.0.get("parent_id").filter(|s| !s.is_empty()).cloned(),
        ..GroupDraft::default()
    };
    Html(render_group_form(&chart, "/accounts/chart/groups", "New group", &draft, None))
}

pub async fn htmx_group_edit_form(
    state: axum::extract::State<AppState>,
    path: Path<String>,
) -> Html<String> {
    let id = path.0;
    let context = ErrorContext::new("chart.edit_group_form").with_target(&id);
    let chart = match load_chart(&state).await {
        Ok(chart) => chart,
        Err(e) => return Html(e.report(&context)),
    };
    let group = match chart.load_group(&id).await {
        Ok(group) => group,
        Err(e) => return Html(ApiError::from(e).report(&context)),
    };
    let draft = GroupDraft {
        name: group.name,
        code: group.code,
        parent_id: group.parent_id.map(|p| format!("g_{}", p)),
    };
    let action = format!("/accounts/chart/groups/{}", urlencoding::encode(&id));
    Html(render_group_form(&chart, &action, "Edit group", &draft, Some(&id)))
}

pub async fn htmx_group_create(
    state: axum::extract::State<AppState>,
    body: String,
) -> Html<String> {
    let draft = draft_from_form(&body);
    let context = ErrorContext::new("chart.create_group").with_target(&draft.name);
    if let Err(e) = check_draft(&draft) {
        return Html(e.report(&context));
    }
    let mut chart = match load_chart(&state).await {
        Ok(chart) => chart,
        Err(e) => return Html(e.report(&context)),
    };
    if let Err(e) = chart.create_group(&draft).await {
        return Html(ApiError::from(e).report(&context));
    }
    if let Some(parent) = &draft.parent_id {
        reveal(&mut chart, parent);
    }
    log::info!(target: "templeweb::chart", "group {} ({}) created", draft.name.trim(), draft.code.trim());
    write_response(&chart, "Group created", &format!("{} - {}", draft.code.trim(), draft.name.trim()), state.config.tree.show_codes)
}

pub async fn htmx_group_update(
    state: axum::extract::State<AppState>,
    path: Path<String>,
    body: String,
) -> Html<String> {
    let id = path.0;
    let draft = draft_from_form(&body);
    let context = ErrorContext::new("chart.update_group").with_target(&id);
    if let Err(e) = check_draft(&draft) {
        return Html(e.report(&context));
    }
    let mut chart = match load_chart(&state).await {
        Ok(chart) => chart,
        Err(e) => return Html(e.report(&context)),
    };
    if let Err(e) = chart.update_group(&id, &draft).await {
        return Html(ApiError::from(e).report(&context));
    }
    reveal(&mut chart, &id);
    log::info!(target: "templeweb::chart", "group {} updated", id);
    write_response(&chart, "Group updated", &format!("{} - {}", draft.code.trim(), draft.name.trim()), state.config.tree.show_codes)
}

pub async fn htmx_group_delete(
    state: axum::extract::State<AppState>,
    path: Path<String>,
) -> Html<String> {
    let id = path.0;
    let context = ErrorContext::new("chart.delete_group").with_target(&id);
    let mut chart = match load_chart(&state).await {
        Ok(chart) => chart,
        Err(e) => return Html(e.report(&context)),
    };
    let parent = chart.tree().parent(&id).map(|p| p.id.clone());
    let name = chart.tree().get(&id).map(|n| n.label()).unwrap_or_else(|| id.clone());
    if let Err(e) = chart.delete_group(&id).await {
        return Html(ApiError::from(e).report(&context));
    }
    if let Some(parent) = parent {
        reveal(&mut chart, &parent);
    }
    log::info!(target: "templeweb::chart", "group {} deleted", id);
    write_response(&chart, "Group deleted", &name, state.config.tree.show_codes)
}
