//! Pure markup rendering: every function takes a view model and returns an
//! HTML string. Text from users or the backend always goes through [`escape`].

use crate::models::{
    CitizenReport, Dashboard, EnergyStatus, NewReport, ReportsSummary, TrafficStatus, WasteStatus,
};
use crate::reports::{self, ReportFilter, ReportStats, ISSUE_TYPES, STATUSES};
use crate::session::Session;
use std::fmt::Write;

const RECENT_REPORTS_SHOWN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Ok,
    Error,
}

/// One-line status message shown above the page content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Ok,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

pub fn render_page(
    title: &str,
    session: Option<&Session>,
    notice: Option<&Notice>,
    content: &str,
) -> String {
    let title = escape(title);
    let nav = render_navbar(session);
    let notice = notice.map(render_notice).unwrap_or_default();

    fill_layout(LAYOUT_HTML, |name| match name {
        "TITLE" => Some(title.as_str()),
        "NAV" => Some(nav.as_str()),
        "NOTICE" => Some(notice.as_str()),
        "CONTENT" => Some(content),
        _ => None,
    })
}

// Single pass over the template, so substituted text is never rescanned.
fn fill_layout<'a>(template: &str, lookup: impl Fn(&str) -> Option<&'a str>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}").and_then(|end| lookup(&after[..end]).map(|value| (end, value))) {
            Some((end, value)) => {
                out.push_str(value);
                rest = &after[end + 2..];
            }
            None => {
                out.push_str("{{");
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

pub fn render_navbar(session: Option<&Session>) -> String {
    let auth = match session {
        Some(session) => format!(
            r#"<div class="auth" id="authUser">
        <span id="userName">Hello, {}</span>
        <form method="post" action="/logout"><button class="link" id="logoutBtn" type="submit">Log out</button></form>
      </div>"#,
            escape(&session.user.name)
        ),
        None => r#"<div class="auth" id="authGuest">
        <a href="/login">Log in</a>
        <a href="/register">Register</a>
      </div>"#
            .to_string(),
    };

    format!(
        r#"<nav class="navbar">
      <a class="brand" href="/">Smart City</a>
      <div class="links">
        <a href="/">Dashboard</a>
        <a href="/reports">Reports</a>
        <a href="/report">Report an issue</a>
        <a href="/traffic">Check traffic</a>
        <a href="/subscribe">Alerts</a>
      </div>
      {auth}
    </nav>"#
    )
}

fn render_notice(notice: &Notice) -> String {
    let kind = match notice.kind {
        NoticeKind::Ok => "ok",
        NoticeKind::Error => "error",
    };
    format!(
        r#"<div class="status" role="alert" data-type="{kind}">{}</div>"#,
        escape(&notice.message)
    )
}

fn badge(class: &str, text: &str) -> String {
    format!(r#"<span class="badge badge-{class}">{text}</span>"#)
}

fn card(id: &str, title: &str, badge: &str, body: &str) -> String {
    format!(
        r#"<div class="card" id="{id}">
  <div class="card-header"><h3>{title}</h3>{badge}</div>
  <div class="card-body">{body}</div>
</div>"#
    )
}

fn stat_box(label: &str, value: &str) -> String {
    format!(
        r#"<div class="stat-box"><div class="stat-label">{label}</div><div class="stat-value">{value}</div></div>"#
    )
}

fn list_items(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("<li>{}</li>", escape(item)))
        .collect()
}

const NO_DATA: &str = r#"<p class="no-data">No data yet</p>"#;

pub fn render_dashboard(dashboard: &Dashboard) -> String {
    format!(
        r#"<section class="dashboard-grid">
{}
{}
{}
{}
</section>"#,
        traffic_card(dashboard.traffic.as_ref()),
        energy_card(dashboard.energy.as_ref()),
        waste_card(dashboard.waste.as_ref()),
        reports_card(&dashboard.reports)
    )
}

pub fn render_dashboard_error() -> String {
    let failed = r#"<div class="error-message">Failed to load data</div>"#;
    let cards: String = ["trafficCard", "energyCard", "wasteCard", "reportsCard"]
        .iter()
        .map(|id| format!(r#"<div class="card" id="{id}">{failed}</div>"#))
        .collect();
    format!(r#"<section class="dashboard-grid">{cards}</section>"#)
}

fn traffic_card(traffic: Option<&TrafficStatus>) -> String {
    let Some(traffic) = traffic else {
        return card("trafficCard", "🚦 Traffic Status", "", NO_DATA);
    };

    let incident = if traffic.has_incident {
        badge("warning", &format!("⚠️ {} Incident(s)", traffic.incident_count))
    } else {
        badge("success", "✅ Clear")
    };
    let color = escape(&traffic.status_color);

    let body = format!(
        r#"<div class="location-badge" style="background-color: {color}20; color: {color}; border: 2px solid {color};">{code}</div>
<p class="location"><strong>📍 {address}</strong></p>
<div class="mini-stats">
  <div class="mini-stat"><span class="mini-label">Speed</span><span class="mini-value">{speed:.2} km/h</span></div>
  <div class="mini-stat"><span class="mini-label">Delay</span><span class="mini-value">{delay:.2} min</span></div>
  <div class="mini-stat"><span class="mini-label">Congestion</span><span class="mini-value">{congestion:.2}%</span></div>
</div>
<p class="analysis">{analysis}</p>
<p class="recommendation"><strong>Recommendation:</strong> {recommendation}</p>"#,
        code = escape(&traffic.status_code),
        address = escape(&traffic.address),
        speed = traffic.flow_speed,
        delay = traffic.delay_time,
        congestion = traffic.congestion_rate,
        analysis = escape(&traffic.analysis),
        recommendation = escape(&traffic.recommendation),
    );

    card("trafficCard", "🚦 Traffic Status", &incident, &body)
}

fn energy_card(energy: Option<&EnergyStatus>) -> String {
    let Some(energy) = energy else {
        return card("energyCard", "⚡ Energy Status", "", NO_DATA);
    };

    let anomalies = if energy.anomalies_detected {
        badge("error", "⚠️ Anomalies Detected")
    } else {
        badge("success", "✅ Normal")
    };
    let voltage = &energy.voltage_stats;

    let body = format!(
        r#"<div class="stat-grid">{}{}</div>
<div class="voltage-stats">
  <h4>Voltage Statistics</h4>
  <div class="voltage-grid">
    <div><span class="voltage-label">Min:</span> <strong>{}V</strong></div>
    <div><span class="voltage-label">Avg:</span> <strong>{}V</strong></div>
    <div><span class="voltage-label">Max:</span> <strong>{}V</strong></div>
  </div>
</div>"#,
        stat_box(
            "Total Consumption",
            &format!(r#"{} <span class="unit">kWh</span>"#, energy.total_consumption)
        ),
        stat_box(
            "Average Power",
            &format!(r#"{:.2} <span class="unit">W</span>"#, energy.avg_power)
        ),
        voltage.min,
        voltage.average,
        voltage.max,
    );

    card("energyCard", "⚡ Energy Status", &anomalies, &body)
}

fn waste_card(waste: Option<&WasteStatus>) -> String {
    let Some(waste) = waste else {
        return card("wasteCard", "🗑️ Waste Management", "", NO_DATA);
    };

    let critical = if waste.critical_count > 0 {
        badge("error", &format!("🚨 {} Critical", waste.critical_count))
    } else {
        badge("success", "✅ Normal")
    };

    let warnings = if waste.warning_count > 0 {
        format!(
            r#"<div class="warning-locations"><h4>⚠️ Warning Locations ({})</h4><ul>{}</ul></div>"#,
            waste.warning_count,
            list_items(&waste.warning_locations)
        )
    } else {
        String::new()
    };

    let body = format!(
        r#"<div class="stat-grid">{}{}</div>{warnings}"#,
        stat_box(
            "Average Fill Level",
            &format!(r#"{}<span class="unit">%</span>"#, waste.avg_fill_level)
        ),
        stat_box("Critical Bins", &waste.critical_count.to_string()),
    );

    card("wasteCard", "🗑️ Waste Management", &critical, &body)
}

fn reports_card(reports: &ReportsSummary) -> String {
    let recent = if reports.recent.is_empty() {
        r#"<p class="no-data">No recent reports</p>"#.to_string()
    } else {
        reports
            .recent
            .iter()
            .take(RECENT_REPORTS_SHOWN)
            .map(recent_report)
            .collect()
    };

    let body = format!(
        r#"<div class="reports-summary">
  <div class="summary-item"><span class="summary-label">Pending</span><span class="summary-value">{}</span></div>
  <div class="summary-item"><span class="summary-label">Total</span><span class="summary-value">{}</span></div>
</div>
<div class="recent-reports"><h4>Recent Reports</h4>{recent}</div>"#,
        reports.pending_count, reports.total_count
    );

    card(
        "reportsCard",
        "📝 Citizen Reports",
        &badge("info", &format!("{} Total", reports.total_count)),
        &body,
    )
}

fn recent_report(report: &CitizenReport) -> String {
    let issue_type = report
        .issue_type_display
        .clone()
        .unwrap_or_else(|| reports::format_type(&report.issue_type));
    let status = report
        .status_display
        .clone()
        .unwrap_or_else(|| reports::format_status(&report.status));

    format!(
        r#"<div class="report-item">
  <div class="report-header"><span class="report-type">{}</span><span class="report-status status-{}">{}</span></div>
  <div class="report-location">📍 {}</div>
  <div class="report-desc">{}</div>
  <div class="report-meta">by {}</div>
</div>"#,
        escape(&issue_type),
        escape(&report.status),
        escape(&status),
        escape(&report.location),
        escape(&report.description),
        escape(&report.reporter_name),
    )
}

pub fn render_reports_page(
    filter: &ReportFilter,
    stats: &ReportStats,
    visible: &[&CitizenReport],
) -> String {
    format!(
        r#"<section id="reportsAnalysis">{}</section>
{}
<section id="reportsList">{}</section>"#,
        render_reports_analysis(stats),
        render_filters(filter),
        render_report_list(visible)
    )
}

pub fn render_reports_error(filter: &ReportFilter) -> String {
    format!(
        r#"<section id="reportsAnalysis"><div class="error-message"><span class="error-icon">❌</span><p>Unable to load analysis.</p></div></section>
{}
<section id="reportsList"><div class="error-message"><span class="error-icon">❌</span><p>Unable to load reports. Please try again.</p></div></section>"#,
        render_filters(filter)
    )
}

pub fn render_reports_analysis(stats: &ReportStats) -> String {
    let overview = [
        stat_box("Total Reports", &stats.total.to_string()),
        stat_box("Pending", &stats.pending.to_string()),
        stat_box("In Progress", &stats.in_progress.to_string()),
        stat_box("Resolved", &stats.resolved.to_string()),
    ]
    .concat();

    let mut categories = String::new();
    for category in &stats.by_category {
        let _ = write!(
            categories,
            r#"<div class="category-item"><span class="category-label">{}</span><span class="category-value">{}</span><div class="category-bar"><div class="category-bar-fill" style="width: {:.1}%"></div></div></div>"#,
            escape(&reports::format_type(&category.issue_type)),
            category.count,
            stats.category_share(category),
        );
    }

    let rate = format!(
        r#"<div class="resolution-rate"><div class="rate-circle"><div class="stat-value-lg">{}%</div></div><p>{} of {} reports resolved</p></div>"#,
        stats.resolution_rate(),
        stats.resolved,
        stats.total
    );

    format!(
        r#"<div class="dashboard-grid">{}{}{}</div>"#,
        card("overviewCard", "📊 Overview", "", &format!(r#"<div class="stat-grid">{overview}</div>"#)),
        card("categoryCard", "📈 By Category", "", &format!(r#"<div class="category-stats">{categories}</div>"#)),
        card("resolutionCard", "🎯 Resolution Rate", "", &rate),
    )
}

fn options(values: &[&str], selected: &str, label: fn(&str) -> String) -> String {
    let mut out = format!(
        r#"<option value="all"{}>All</option>"#,
        if selected.is_empty() || selected == "all" { " selected" } else { "" }
    );
    for value in values {
        let _ = write!(
            out,
            r#"<option value="{value}"{}>{}</option>"#,
            if *value == selected { " selected" } else { "" },
            escape(&label(value)),
        );
    }
    out
}

pub fn render_filters(filter: &ReportFilter) -> String {
    format!(
        r#"<form class="filters" method="get" action="/reports">
  <select id="statusFilter" name="status">{}</select>
  <select id="typeFilter" name="issue_type">{}</select>
  <input id="searchInput" name="q" type="search" placeholder="Search location or description" value="{}" />
  <button type="submit">Filter</button>
</form>"#,
        options(&STATUSES, &filter.status, reports::format_status),
        options(&ISSUE_TYPES, &filter.issue_type, reports::format_type),
        escape(&filter.q)
    )
}

pub fn render_report_list(reports: &[&CitizenReport]) -> String {
    if reports.is_empty() {
        return r#"<div class="no-data"><p>No reports found matching your filters.</p></div>"#
            .to_string();
    }

    reports.iter().map(|report| report_card(report)).collect()
}

fn report_card(report: &CitizenReport) -> String {
    let image = report
        .image
        .as_deref()
        .filter(|src| !src.is_empty())
        .map(|src| {
            format!(
                r#"<div class="report-image"><img src="{}" alt="Report image" /></div>"#,
                escape(src)
            )
        })
        .unwrap_or_default();

    let updated = report
        .updated_at
        .as_deref()
        .filter(|date| !date.is_empty())
        .map(|date| {
            format!(
                r#"<span class="meta-item">🔄 Updated: {}</span>"#,
                escape(&reports::format_date(Some(date)))
            )
        })
        .unwrap_or_default();

    format!(
        r#"<div class="report-card">
  <div class="report-card-header">
    <div class="report-card-left"><span class="report-type-badge">{}</span><h3 class="report-location">📍 {}</h3></div>
    <span class="report-status-badge status-{}">{}</span>
  </div>
  <div class="report-card-body">
    <p class="report-description">{}</p>
    {image}
    <div class="report-meta"><span class="meta-item">👤 {}</span><span class="meta-item">📅 {}</span>{updated}</div>
  </div>
</div>"#,
        escape(&reports::format_type(&report.issue_type)),
        escape(&report.location),
        escape(&report.status),
        escape(&reports::format_status(&report.status)),
        escape(&report.description),
        escape(&report.reporter_name),
        escape(&reports::format_date(report.created_at.as_deref())),
    )
}

pub fn render_report_form(draft: &NewReport) -> String {
    let issue_options: String = ISSUE_TYPES
        .iter()
        .map(|value| {
            format!(
                r#"<option value="{value}"{}>{}</option>"#,
                if *value == draft.issue_type { " selected" } else { "" },
                escape(&reports::format_type(value))
            )
        })
        .collect();

    format!(
        r#"<form id="reportForm" class="panel-form" method="post" action="/report" enctype="multipart/form-data">
  <label>Your name <input name="reporter_name" required value="{}" /></label>
  <label>Issue type <select name="issue_type" required>{issue_options}</select></label>
  <label>Location <input name="location" required value="{}" /></label>
  <label>Description <textarea name="description" required>{}</textarea></label>
  <label>Photo <input name="image" type="file" accept="image/*" /></label>
  <button type="submit">Submit report</button>
</form>"#,
        escape(&draft.reporter_name),
        escape(&draft.location),
        escape(&draft.description),
    )
}

pub fn render_traffic_form(location: &str, result: Option<&str>) -> String {
    let result = result
        .map(|markup| format!(r#"<div id="resultContainer"><div id="result">{markup}</div></div>"#))
        .unwrap_or_default();

    format!(
        r#"<form class="panel-form" method="post" action="/traffic">
  <label>Road or area <input id="roadName" name="location" value="{}" /></label>
  <button id="checkBtn" type="submit">Check traffic</button>
</form>
{result}"#,
        escape(location)
    )
}

pub fn render_traffic_result(traffic: &TrafficStatus) -> String {
    let incident = if traffic.has_incident {
        badge("warning", &format!("⚠️ {} Incident(s)", traffic.incident_count))
    } else {
        badge("success", "✅ No Incidents")
    };

    let routes = if traffic.alternative_routes.is_empty() {
        String::new()
    } else {
        format!(
            r#"<div class="routes-section"><h3>🛣️ Alternative Routes</h3><ul class="routes-list">{}</ul></div>"#,
            list_items(&traffic.alternative_routes)
        )
    };

    format!(
        r#"<div class="result-header">
  <h2>📍 {address}</h2>
  <div class="badges"><span class="status-badge" style="background-color: {color}; color: white;">{code}</span>{incident}</div>
</div>
<div class="traffic-stats">
  <div class="stat-item"><div class="stat-label">Congestion Rate</div><div class="stat-value">{congestion:.2}%</div></div>
  <div class="stat-item"><div class="stat-label">Flow Speed</div><div class="stat-value">{speed} km/h</div></div>
  <div class="stat-item"><div class="stat-label">Delay Time</div><div class="stat-value">{delay} min</div></div>
</div>
<div class="analysis-section"><h3>📊 Analysis</h3><p>{analysis}</p></div>
<div class="recommendation-section"><h3>💡 Recommendation</h3><p>{recommendation}</p></div>
{routes}"#,
        address = escape(&traffic.address),
        color = escape(&traffic.status_color),
        code = escape(&traffic.status_code),
        congestion = traffic.congestion_rate,
        speed = traffic.flow_speed,
        delay = traffic.delay_time,
        analysis = escape(&traffic.analysis),
        recommendation = escape(&traffic.recommendation),
    )
}

pub fn render_traffic_error() -> String {
    r#"<div class="error-message"><span class="error-icon">❌</span><p>Unable to check traffic conditions. Please try again.</p></div>"#
        .to_string()
}

pub fn render_subscribe_form(email: &str) -> String {
    format!(
        r#"<form id="subscribeForm" class="panel-form" method="post" action="/subscribe">
  <label>Email for traffic alerts <input name="email" type="email" required value="{}" /></label>
  <button type="submit">Subscribe</button>
</form>"#,
        escape(email)
    )
}

pub fn render_login_form(email: &str) -> String {
    format!(
        r#"<form id="loginForm" class="panel-form" method="post" action="/login">
  <label>Email <input name="email" type="email" required value="{}" /></label>
  <label>Password <input name="password" type="password" required /></label>
  <button type="submit">Log in</button>
  <p class="hint">No account yet? <a href="/register">Register</a></p>
</form>"#,
        escape(email)
    )
}

pub fn render_register_form() -> String {
    r#"<form id="registerForm" class="panel-form" method="post" action="/register">
  <label>Name <input name="name" required /></label>
  <label>Email <input name="email" type="email" required /></label>
  <label>Password <input name="password" type="password" required /></label>
  <button type="submit">Register</button>
  <p class="hint">The account is stored on this device only.</p>
</form>"#
        .to_string()
}

const LAYOUT_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{{TITLE}} · Smart City</title>
  <style>
    :root {
      --bg: #eef3f7;
      --ink: #1f2a33;
      --accent: #1e88e5;
      --ok: #2d7a4b;
      --warn: #e6a100;
      --error: #c63b2b;
      --card: #ffffff;
      --shadow: 0 18px 40px rgba(31, 42, 51, 0.12);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: "Segoe UI", "Trebuchet MS", sans-serif;
    }

    .navbar {
      display: flex;
      flex-wrap: wrap;
      align-items: center;
      justify-content: space-between;
      gap: 16px;
      padding: 16px 28px;
      background: var(--ink);
    }

    .navbar a,
    .navbar span,
    .navbar .link {
      color: white;
      text-decoration: none;
      margin-right: 14px;
    }

    .navbar .brand {
      font-weight: 700;
      font-size: 1.2rem;
    }

    .auth {
      display: flex;
      align-items: center;
    }

    .link {
      background: none;
      border: none;
      cursor: pointer;
      font: inherit;
    }

    main {
      width: min(1100px, 100%);
      margin: 0 auto;
      padding: 28px 18px 48px;
      display: grid;
      gap: 24px;
    }

    h1 {
      margin: 0;
    }

    .dashboard-grid {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(260px, 1fr));
      gap: 18px;
    }

    .card,
    .report-card,
    .panel-form,
    #resultContainer {
      background: var(--card);
      border-radius: 18px;
      box-shadow: var(--shadow);
      padding: 20px;
    }

    .card-header,
    .report-card-header,
    .result-header {
      display: flex;
      flex-wrap: wrap;
      align-items: center;
      justify-content: space-between;
      gap: 10px;
    }

    .stat-grid,
    .mini-stats,
    .traffic-stats {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(110px, 1fr));
      gap: 12px;
    }

    .stat-label,
    .mini-label,
    .summary-label {
      display: block;
      font-size: 0.8rem;
      text-transform: uppercase;
      letter-spacing: 0.08em;
      color: #6b7780;
    }

    .stat-value,
    .stat-value-lg {
      font-size: 1.5rem;
      font-weight: 600;
    }

    .badge {
      border-radius: 999px;
      padding: 4px 10px;
      font-size: 0.85rem;
    }

    .badge-success { background: #e3f4e9; color: var(--ok); }
    .badge-warning { background: #fff4d6; color: var(--warn); }
    .badge-error { background: #fbe4e1; color: var(--error); }
    .badge-info { background: #e1effc; color: var(--accent); }

    .category-bar {
      height: 6px;
      border-radius: 999px;
      background: #e5ebf0;
    }

    .category-bar-fill {
      height: 100%;
      border-radius: 999px;
      background: var(--accent);
    }

    .report-image img {
      max-width: 100%;
      border-radius: 12px;
    }

    .filters {
      display: flex;
      flex-wrap: wrap;
      gap: 10px;
    }

    .panel-form {
      display: grid;
      gap: 14px;
    }

    .panel-form label {
      display: grid;
      gap: 6px;
    }

    input,
    select,
    textarea,
    button {
      font: inherit;
      padding: 10px 12px;
      border-radius: 10px;
      border: 1px solid #c9d3db;
    }

    button {
      background: var(--accent);
      color: white;
      border: none;
      cursor: pointer;
    }

    .status {
      padding: 12px 16px;
      border-radius: 12px;
    }

    .status[data-type="error"],
    .error-message {
      color: var(--error);
    }

    .status[data-type="ok"] {
      color: var(--ok);
    }

    .no-data,
    .hint {
      color: #6b7780;
    }
  </style>
</head>
<body>
  {{NAV}}
  <main>
    <h1>{{TITLE}}</h1>
    {{NOTICE}}
    {{CONTENT}}
  </main>
</body>
</html>
"#;
