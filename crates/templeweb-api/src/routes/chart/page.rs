//! Chart-of-accounts page rendering

use crate::AppState;
use axum::extract::Query;
use std::collections::{BTreeSet, HashMap};
use templeweb_core::{AccountNode, AccountTree, ChartOfAccounts, CodeRange, ErrorContext, GroupDraft};
use templeweb_utils::escape_html;

/// Query string that reproduces the current tree view with `id` toggled
fn toggle_query(tree: &AccountTree, id: &str) -> String {
    let mut open: BTreeSet<&str> = tree.expanded_ids().into_iter().collect();
    if !open.remove(id) {
        open.insert(id);
    }
    let open: Vec<&str> = open.into_iter().collect();
    let mut query = format!("open={}", urlencoding::encode(&open.join(",")));
    if !tree.filter().is_empty() {
        query.push_str(&format!("&search={}", urlencoding::encode(tree.filter())));
    }
    query
}

fn render_row(tree: &AccountTree, node: &AccountNode, depth: usize, has_children: bool, show_codes: bool) -> String {
    let indent_html = if depth > 0 {
        format!(r#"<span class="inline-block" style="width: {}px"></span>"#, depth * 24)
    } else {
        String::new()
    };
    let toggle_html = if has_children {
        let rotate = if node.expanded { " rotate-90" } else { "" };
        format!(
            r##"<button class="mr-1 flex-shrink-0" hx-get="/accounts/chart/tree?{}" hx-target="#chart-tree" hx-swap="outerHTML"><svg class="w-4 h-4 text-gray-400{}" fill="none" stroke="currentColor" viewBox="0 0 24 24"><path stroke-linecap="round" stroke-linejoin="round" stroke-width="2" d="M9 5l7 7-7 7"/></svg></button>"##,
            toggle_query(tree, &node.id),
            rotate
        )
    } else {
        r#"<span class="w-4 h-4 mr-1 flex-shrink-0"></span>"#.to_string()
    };
    let icon = if node.is_group() { "📁" } else { "📄" };
    let code_html = if show_codes {
        format!(r#"<span class="font-mono text-xs text-gray-500 mr-2">{}</span>"#, escape_html(&node.data.code))
    } else {
        String::new()
    };
    let name_class = if node.is_group() { "font-medium text-gray-800" } else { "text-gray-700" };
    let fixed_badge = if node.data.fixed {
        r#"<span class="ml-2 px-2 py-0.5 text-xs border rounded text-gray-500">System</span>"#
    } else {
        ""
    };

    format!(
        r##"<div class="flex items-center py-2 px-3 hover:bg-gray-50 border-b border-gray-100" data-id="{id}">{indent}{toggle}<span class="mr-2">{icon}</span><a class="cursor-pointer flex items-center" hx-get="/accounts/chart/nodes/{id_enc}" hx-target="#node-detail">{code}<span class="{name_class}">{name}</span></a>{fixed}</div>"##,
        id = escape_html(&node.id),
        id_enc = urlencoding::encode(&node.id),
        indent = indent_html,
        toggle = toggle_html,
        icon = icon,
        code = code_html,
        name_class = name_class,
        name = escape_html(&node.data.name),
        fixed = fixed_badge,
    )
}

/// Rows of the tree, without the container
pub fn render_tree_rows(tree: &AccountTree, show_codes: bool) -> String {
    if tree.is_empty() {
        return String::from(r#"<div class="text-center py-12 text-gray-500"><p>No accounts yet</p></div>"#);
    }
    let rows = tree.rows();
    if rows.is_empty() {
        return String::from(r#"<div class="text-center py-12 text-gray-500"><p>No matching accounts</p></div>"#);
    }
    rows.iter()
        .map(|row| render_row(tree, row.node, row.depth, row.has_children, show_codes))
        .collect()
}

/// Tree container, swapped as a whole by the tree partial
pub fn render_tree(tree: &AccountTree, show_codes: bool) -> String {
    format!(
        r#"<div id="chart-tree" class="divide-y divide-gray-100">{}</div>"#,
        render_tree_rows(tree, show_codes)
    )
}

/// Tree container for an out-of-band swap after a write
pub fn render_tree_oob(tree: &AccountTree, show_codes: bool) -> String {
    format!(
        r#"<div id="chart-tree" hx-swap-oob="true" class="divide-y divide-gray-100">{}</div>"#,
        render_tree_rows(tree, show_codes)
    )
}

pub fn render_code_range(range: Option<CodeRange>) -> String {
    match range {
        Some(range) => format!(
            r#"<p id="code-range-help" class="text-xs text-gray-500 mt-1">Suggested code range: {}</p>"#,
            range.help_text()
        ),
        None => r#"<p id="code-range-help" class="text-xs text-gray-500 mt-1">Any 4-digit code</p>"#.to_string(),
    }
}

/// Detail panel for the selected node
pub fn render_node_detail(chart: &ChartOfAccounts, node: &AccountNode) -> String {
    let tree = chart.tree();
    let permissions = chart.permissions();

    let mut trail: Vec<String> = tree
        .ancestors(&node.id)
        .iter()
        .rev()
        .map(|a| escape_html(&a.data.name))
        .collect();
    trail.push(format!("<span class='text-gray-900'>{}</span>", escape_html(&node.data.name)));

    let kind = if node.is_group() { "Group" } else { "Ledger" };
    let id_enc = urlencoding::encode(&node.id);

    let mut actions = Vec::new();
    if node.is_group() && permissions.can_create {
        actions.push(format!(
            r##"<button class="px-3 py-1.5 text-sm border rounded-lg hover:bg-gray-50" hx-get="/accounts/chart/groups/new?parent_id={}" hx-target="#group-form">Add sub-group</button>"##,
            id_enc
        ));
    }
    if node.is_group() && !node.data.fixed {
        if permissions.can_edit {
            actions.push(format!(
                r##"<button class="px-3 py-1.5 text-sm border rounded-lg hover:bg-gray-50" hx-get="/accounts/chart/groups/{}/edit" hx-target="#group-form">Edit</button>"##,
                id_enc
            ));
        }
        if permissions.can_delete {
            actions.push(format!(
                r##"<button class="px-3 py-1.5 text-sm border border-red-200 text-red-600 rounded-lg hover:bg-red-50" hx-post="/accounts/chart/groups/{}/delete" hx-target="#toast" hx-confirm="Delete group {}?">Delete</button>"##,
                id_enc,
                escape_html(&node.data.name)
            ));
        }
    }
    let fixed_note = if node.data.fixed {
        r#"<p class="text-xs text-gray-500 mt-3">System group: it cannot be edited or deleted.</p>"#
    } else {
        ""
    };
    let range_html = if node.is_group() {
        render_code_range(chart.code_range_for_parent(Some(&node.id)))
    } else {
        String::new()
    };

    format!(
        r#"<div class="bg-white rounded-xl shadow-sm p-6">
            <p class="text-xs text-gray-500 mb-2">{trail}</p>
            <h3 class="text-lg font-semibold mb-4">{code} - {name}</h3>
            <div class="grid grid-cols-2 gap-4 mb-4">
                <div><p class="text-sm text-gray-500">Type</p><p class="font-medium">{kind}</p></div>
                <div><p class="text-sm text-gray-500">Code</p><p class="font-medium font-mono">{code}</p></div>
                <div><p class="text-sm text-gray-500">Children</p><p class="font-medium">{children}</p></div>
                <div><p class="text-sm text-gray-500">Ledgers</p><p class="font-medium">{ledgers}</p></div>
            </div>
            {range}
            <div class="flex gap-2 mt-4">{actions}</div>
            {fixed_note}
        </div>"#,
        trail = trail.join(" / "),
        code = escape_html(&node.data.code),
        name = escape_html(&node.data.name),
        kind = kind,
        children = node.data.children_count,
        ledgers = node.data.ledgers_count,
        range = range_html,
        actions = actions.join(""),
        fixed_note = fixed_note,
    )
}

/// Create / edit form for a group
pub fn render_group_form(chart: &ChartOfAccounts, action: &str, title: &str, draft: &GroupDraft, exclude: Option<&str>) -> String {
    let parent = draft.parent_id.as_deref().unwrap_or("");
    let mut options = vec![format!(
        r#"<option value=""{}>(top level)</option>"#,
        if parent.is_empty() { " selected" } else { "" }
    )];
    for group in chart.tree().groups() {
        if Some(group.id.as_str()) == exclude {
            continue;
        }
        options.push(format!(
            r#"<option value="{}"{}>{}</option>"#,
            escape_html(&group.id),
            if group.id == parent { " selected" } else { "" },
            escape_html(&group.label())
        ));
    }
    let range_html = render_code_range(chart.code_range_for_parent(draft.parent_id.as_deref()));

    format!(
        r##"<form hx-post="{action}" hx-target="#toast" class="bg-white rounded-xl shadow-sm p-6 space-y-4">
            <h3 class="text-lg font-semibold">{title}</h3>
            <div>
                <label class="block text-sm font-medium text-gray-700 mb-1">Parent group</label>
                <select name="parent_id" class="w-full px-3 py-2.5 border rounded-lg" hx-get="/accounts/chart/code-range" hx-target="#code-range-help" hx-swap="outerHTML" hx-trigger="change">{options}</select>
            </div>
            <div>
                <label class="block text-sm font-medium text-gray-700 mb-1">Name</label>
                <input type="text" name="name" value="{name}" required class="w-full px-3 py-2.5 border rounded-lg">
            </div>
            <div>
                <label class="block text-sm font-medium text-gray-700 mb-1">Code</label>
                <input type="text" name="code" value="{code}" required maxlength="4" pattern="\d{{4}}" class="w-full px-3 py-2.5 border rounded-lg font-mono">
                {range}
            </div>
            <div class="flex items-center gap-4 pt-2">
                <button type="submit" class="px-4 py-2 bg-amber-600 text-white rounded-lg hover:bg-amber-700">Save</button>
            </div>
        </form>"##,
        action = escape_html(action),
        title = escape_html(title),
        options = options.join(""),
        name = escape_html(&draft.name),
        code = escape_html(&draft.code),
        range = range_html,
    )
}

pub async fn page_chart(
    state: axum::extract::State<AppState>,
    headers: axum::http::HeaderMap,
    query: Query<HashMap<String, String>>,
) -> axum::response::Html<String> {
    let header_html = r#"<div class="mb-6"><h2 class="text-2xl font-bold">Chart of Accounts</h2></div>"#;

    let mut chart = match super::api::load_chart(&state).await {
        Ok(chart) => chart,
        Err(e) => {
            let toast = e.report(&ErrorContext::new("chart.page"));
            let inner = format!("{}{}", header_html, toast);
            return axum::response::Html(crate::page_response(&headers, "Chart of Accounts", "/accounts/chart", &inner));
        }
    };
    super::api::apply_view(&mut chart, &query.0, state.config.tree.expand_on_load);

    let search_value = escape_html(chart.tree().filter());
    let tree_html = render_tree(chart.tree(), state.config.tree.show_codes);

    let new_group_button = if chart.permissions().can_create {
        r##"<button class="px-4 py-2.5 bg-amber-600 text-white rounded-lg hover:bg-amber-700" hx-get="/accounts/chart/groups/new" hx-target="#group-form">New group</button>"##
    } else {
        ""
    };

    let inner_content = format!(
        r##"{header}
        <div class="grid grid-cols-1 lg:grid-cols-3 gap-6">
            <div class="lg:col-span-2 bg-white rounded-xl shadow-sm border border-gray-200 overflow-hidden">
                <div class="p-4 border-b border-gray-200 bg-gray-50 flex flex-col sm:flex-row sm:items-center gap-4">
                    <input type="text" name="search" value="{search}" placeholder="Search by name or code..."
                        class="flex-1 px-4 py-2.5 border border-gray-300 rounded-lg focus:ring-2 focus:ring-amber-500"
                        hx-get="/accounts/chart/tree" hx-trigger="keyup changed delay:300ms" hx-target="#chart-tree" hx-swap="outerHTML">
                    <button class="px-4 py-2.5 border border-gray-300 rounded-lg hover:bg-gray-50" hx-get="/accounts/chart/tree?expand=all" hx-include="[name='search']" hx-target="#chart-tree" hx-swap="outerHTML">Expand all</button>
                    <button class="px-4 py-2.5 border border-gray-300 rounded-lg hover:bg-gray-50" hx-get="/accounts/chart/tree?expand=none" hx-include="[name='search']" hx-target="#chart-tree" hx-swap="outerHTML">Collapse all</button>
                    {new_group}
                </div>
                {tree}
            </div>
            <div class="space-y-6">
                <div id="node-detail"><div class="bg-white rounded-xl shadow-sm p-6 text-sm text-gray-500">Select an account to see its details</div></div>
                <div id="group-form"></div>
            </div>
        </div>"##,
        header = header_html,
        search = search_value,
        new_group = new_group_button,
        tree = tree_html,
    );

    axum::response::Html(crate::page_response(&headers, "Chart of Accounts", "/accounts/chart", &inner_content))
}
