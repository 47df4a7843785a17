use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Deserializer, Serialize};

/// Latest traffic reading. The dashboard sends it in snake_case; the
/// check-traffic endpoint sends the same data as [`TrafficCheck`].
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct TrafficStatus {
    #[serde(default)]
    pub address: String,
    #[serde(default, deserialize_with = "flexible_f64")]
    pub congestion_rate: f64,
    #[serde(default, deserialize_with = "flexible_f64")]
    pub flow_speed: f64,
    #[serde(default, deserialize_with = "flexible_f64")]
    pub delay_time: f64,
    #[serde(default)]
    pub has_incident: bool,
    #[serde(default)]
    pub incident_count: u32,
    #[serde(default)]
    pub status_code: String,
    #[serde(default)]
    pub status_color: String,
    #[serde(default)]
    pub analysis: String,
    #[serde(default)]
    pub recommendation: String,
    #[serde(default)]
    pub alternative_routes: Vec<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Wire shape of `POST /api/check-traffic/`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TrafficCheck {
    #[serde(default)]
    pub address: String,
    #[serde(default, deserialize_with = "flexible_f64")]
    pub congestion_rate: f64,
    #[serde(default, deserialize_with = "flexible_f64")]
    pub flow_speed: f64,
    #[serde(default, deserialize_with = "flexible_f64")]
    pub delay_time: f64,
    #[serde(default)]
    pub has_incident: bool,
    #[serde(default)]
    pub incident_count: u32,
    #[serde(default)]
    pub status_code: String,
    #[serde(default)]
    pub status_color: String,
    #[serde(default)]
    pub analysis: String,
    #[serde(default)]
    pub recommendation: String,
    #[serde(default)]
    pub alternative_routes: Vec<String>,
}

impl From<TrafficCheck> for TrafficStatus {
    fn from(check: TrafficCheck) -> Self {
        Self {
            address: check.address,
            congestion_rate: check.congestion_rate,
            flow_speed: check.flow_speed,
            delay_time: check.delay_time,
            has_incident: check.has_incident,
            incident_count: check.incident_count,
            status_code: check.status_code,
            status_color: check.status_color,
            analysis: check.analysis,
            recommendation: check.recommendation,
            alternative_routes: check.alternative_routes,
            created_at: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct VoltageStats {
    #[serde(default, deserialize_with = "flexible_f64")]
    pub min: f64,
    #[serde(default, deserialize_with = "flexible_f64")]
    pub max: f64,
    #[serde(default, deserialize_with = "flexible_f64")]
    pub average: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct EnergyStatus {
    #[serde(default, deserialize_with = "flexible_f64")]
    pub total_consumption: f64,
    #[serde(default, deserialize_with = "flexible_f64")]
    pub avg_power: f64,
    #[serde(default)]
    pub voltage_stats: VoltageStats,
    #[serde(default)]
    pub anomalies_detected: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct WasteStatus {
    #[serde(default, deserialize_with = "flexible_f64")]
    pub avg_fill_level: f64,
    #[serde(default)]
    pub critical_count: u32,
    #[serde(default)]
    pub warning_count: u32,
    #[serde(default)]
    pub warning_locations: Vec<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ReportsSummary {
    #[serde(default)]
    pub pending_count: u64,
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub recent: Vec<CitizenReport>,
}

/// `GET /api/dashboard/`. Sections are `null` while their table is empty.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Dashboard {
    #[serde(default)]
    pub traffic: Option<TrafficStatus>,
    #[serde(default)]
    pub energy: Option<EnergyStatus>,
    #[serde(default)]
    pub waste: Option<WasteStatus>,
    #[serde(default)]
    pub reports: ReportsSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CitizenReport {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub reporter_name: String,
    #[serde(default)]
    pub issue_type: String,
    #[serde(default)]
    pub issue_type_display: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub status_display: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Profile echoed into the session store at registration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    #[serde(default)]
    pub registered: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TrafficForm {
    #[serde(default)]
    pub location: String,
}

#[derive(Debug, Deserialize)]
pub struct SubscribeForm {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// A citizen report as typed into the submission form.
#[derive(Debug, Clone, Default)]
pub struct NewReport {
    pub reporter_name: String,
    pub issue_type: String,
    pub description: String,
    pub location: String,
    pub image: Option<ImageUpload>,
}

impl NewReport {
    /// Multipart body for `POST /api/reports/`.
    pub fn to_form(&self) -> Result<Form, reqwest::Error> {
        let form = Form::new()
            .text("reporter_name", self.reporter_name.clone())
            .text("issue_type", self.issue_type.clone())
            .text("description", self.description.clone())
            .text("location", self.location.clone());

        let Some(image) = &self.image else {
            return Ok(form);
        };

        let part = Part::bytes(image.bytes.clone()).file_name(image.file_name.clone());
        let part = match image.content_type.as_deref() {
            Some(content_type) => part.mime_str(content_type)?,
            None => part,
        };
        Ok(form.part("image", part))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

// The backend serializes some decimals as strings.
fn flexible_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrText>::deserialize(deserializer)? {
        Some(NumberOrText::Number(value)) => Ok(value),
        Some(NumberOrText::Text(text)) => text.trim().parse().map_err(serde::de::Error::custom),
        None => Ok(0.0),
    }
}
