use crate::models::CitizenReport;
use chrono::{DateTime, NaiveDateTime};
use serde::Deserialize;
use serde_json::Value;

pub const STATUSES: [&str; 4] = ["pending", "in_progress", "resolved", "rejected"];
pub const ISSUE_TYPES: [&str; 5] = ["traffic", "waste", "energy", "infrastructure", "other"];

const ANY: &str = "all";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCount {
    pub issue_type: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportStats {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub resolved: usize,
    /// In order of first appearance in the loaded list.
    pub by_category: Vec<CategoryCount>,
}

impl ReportStats {
    pub fn resolution_rate(&self) -> u32 {
        percent(self.resolved, self.total).round() as u32
    }

    pub fn category_share(&self, category: &CategoryCount) -> f64 {
        percent(category.count, self.total)
    }
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    part as f64 / total as f64 * 100.0
}

/// Reads the report list out of a `GET /api/reports/` payload. Anything
/// other than an array counts as an empty list.
pub fn from_payload(data: Value) -> Result<Vec<CitizenReport>, serde_json::Error> {
    match data {
        Value::Array(_) => serde_json::from_value(data),
        _ => Ok(Vec::new()),
    }
}

pub fn build_stats(reports: &[CitizenReport]) -> ReportStats {
    let mut stats = ReportStats {
        total: reports.len(),
        ..ReportStats::default()
    };

    for report in reports {
        match report.status.as_str() {
            "pending" => stats.pending += 1,
            "in_progress" => stats.in_progress += 1,
            "resolved" => stats.resolved += 1,
            _ => {}
        }

        match stats
            .by_category
            .iter_mut()
            .find(|category| category.issue_type == report.issue_type)
        {
            Some(category) => category.count += 1,
            None => stats.by_category.push(CategoryCount {
                issue_type: report.issue_type.clone(),
                count: 1,
            }),
        }
    }

    stats
}

/// Filter controls of the reports page. Empty or `all` matches anything.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ReportFilter {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub issue_type: String,
    #[serde(default)]
    pub q: String,
}

impl ReportFilter {
    pub fn matches(&self, report: &CitizenReport) -> bool {
        let status_match = is_any(&self.status) || report.status == self.status;
        let type_match = is_any(&self.issue_type) || report.issue_type == self.issue_type;
        let search_match = self.q.is_empty() || {
            let needle = self.q.to_lowercase();
            report.location.to_lowercase().contains(&needle)
                || report.description.to_lowercase().contains(&needle)
        };

        status_match && type_match && search_match
    }

    /// Keeps matching reports in their loaded order.
    pub fn apply<'a>(&self, reports: &'a [CitizenReport]) -> Vec<&'a CitizenReport> {
        reports.iter().filter(|report| self.matches(report)).collect()
    }
}

fn is_any(value: &str) -> bool {
    value.is_empty() || value == ANY
}

pub fn format_type(issue_type: &str) -> String {
    match issue_type {
        "traffic" => "🚗 Traffic".to_string(),
        "infrastructure" => "🏗️ Infrastructure".to_string(),
        "waste" => "🗑️ Waste".to_string(),
        "energy" => "⚡ Energy".to_string(),
        "other" => "📌 Other".to_string(),
        other => other.to_string(),
    }
}

pub fn format_status(status: &str) -> String {
    match status {
        "pending" => "Pending".to_string(),
        "in_progress" => "In Progress".to_string(),
        "resolved" => "Resolved".to_string(),
        "rejected" => "Rejected".to_string(),
        other => other.to_string(),
    }
}

pub fn format_date(value: Option<&str>) -> String {
    const FORMAT: &str = "%d %b %Y, %H:%M";

    let Some(value) = value.filter(|value| !value.is_empty()) else {
        return "N/A".to_string();
    };

    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return date.format(FORMAT).to_string();
    }
    if let Ok(date) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return date.format(FORMAT).to_string();
    }

    value.to_string()
}
