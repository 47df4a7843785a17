use crate::config::{CHECK_TRAFFIC_ENDPOINT, DASHBOARD_ENDPOINT, REPORTS_ENDPOINT, SUBSCRIBE_ENDPOINT};
use crate::errors::AppError;
use crate::models::{
    Dashboard, ImageUpload, LoginForm, LoginQuery, NewReport, SubscribeForm, TrafficCheck,
    TrafficForm, TrafficStatus, User,
};
use crate::reports::{self, ReportFilter};
use crate::session::{AuthError, Session};
use crate::state::AppState;
use crate::ui::{self, Notice};
use axum::{
    extract::{Multipart, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde_json::json;
use tracing::{error, info};

async fn current_session(state: &AppState) -> Option<Session> {
    match state.auth.current().await {
        Ok(session) => session,
        Err(err) => {
            error!("failed to read session: {err}");
            None
        }
    }
}

async fn page(state: &AppState, title: &str, notice: Option<Notice>, content: &str) -> Html<String> {
    let session = current_session(state).await;
    Html(ui::render_page(title, session.as_ref(), notice.as_ref(), content))
}

pub async fn dashboard(State(state): State<AppState>) -> Html<String> {
    let content = match state.api.get_as::<Dashboard>(DASHBOARD_ENDPOINT).await {
        Ok(dashboard) => ui::render_dashboard(&dashboard),
        Err(err) => {
            error!("dashboard load failed: {err}");
            ui::render_dashboard_error()
        }
    };

    page(&state, "City Dashboard", None, &content).await
}

pub async fn reports_view(
    State(state): State<AppState>,
    Query(filter): Query<ReportFilter>,
) -> Html<String> {
    let loaded = match state.api.get(REPORTS_ENDPOINT).await {
        Ok(data) => reports::from_payload(data).map_err(|err| err.to_string()),
        Err(err) => Err(err.to_string()),
    };

    let content = match loaded {
        Ok(all) => {
            let stats = reports::build_stats(&all);
            let visible = filter.apply(&all);
            ui::render_reports_page(&filter, &stats, &visible)
        }
        Err(err) => {
            error!("error loading reports: {err}");
            ui::render_reports_error(&filter)
        }
    };

    page(&state, "Citizen Reports", None, &content).await
}

pub async fn report_form(State(state): State<AppState>) -> Html<String> {
    page(&state, "Report an Issue", None, &ui::render_report_form(&NewReport::default())).await
}

pub async fn submit_report(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Html<String>, AppError> {
    let draft = read_report(multipart).await?;

    let submitted = match draft.to_form() {
        Ok(form) => state.api.post(REPORTS_ENDPOINT, form).await.map_err(|err| err.to_string()),
        Err(err) => Err(err.to_string()),
    };

    let (notice, form) = match submitted {
        Ok(_) => {
            info!(location = %draft.location, "report submitted");
            (
                Notice::ok("✅ Report submitted successfully!"),
                ui::render_report_form(&NewReport::default()),
            )
        }
        Err(err) => {
            error!("report submission error: {err}");
            (
                Notice::error("❌ Failed to submit report. Please try again."),
                ui::render_report_form(&draft),
            )
        }
    };

    Ok(page(&state, "Report an Issue", Some(notice), &form).await)
}

async fn read_report(mut multipart: Multipart) -> Result<NewReport, AppError> {
    let mut report = NewReport::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::bad_request(err.to_string()))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == "image" {
            let file_name = field.file_name().unwrap_or("upload").to_string();
            let content_type = field.content_type().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|err| AppError::bad_request(err.to_string()))?;
            // Browsers send an empty part when no file was picked.
            if !bytes.is_empty() {
                report.image = Some(ImageUpload {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|err| AppError::bad_request(err.to_string()))?;
        match name.as_str() {
            "reporter_name" => report.reporter_name = value,
            "issue_type" => report.issue_type = value,
            "description" => report.description = value,
            "location" => report.location = value,
            _ => {}
        }
    }

    Ok(report)
}

pub async fn traffic_form(State(state): State<AppState>) -> Html<String> {
    page(&state, "Check Traffic", None, &ui::render_traffic_form("", None)).await
}

pub async fn check_traffic(
    State(state): State<AppState>,
    Form(form): Form<TrafficForm>,
) -> Html<String> {
    let location = form.location.trim();
    if location.is_empty() {
        let content = ui::render_traffic_form("", None);
        return page(&state, "Check Traffic", Some(Notice::error("Please enter a location!")), &content)
            .await;
    }

    let result = match state
        .api
        .post_as::<TrafficCheck>(CHECK_TRAFFIC_ENDPOINT, json!({ "location": location }))
        .await
    {
        Ok(check) => ui::render_traffic_result(&TrafficStatus::from(check)),
        Err(err) => {
            error!("traffic check failed: {err}");
            ui::render_traffic_error()
        }
    };

    let content = ui::render_traffic_form(location, Some(&result));
    page(&state, "Check Traffic", None, &content).await
}

pub async fn subscribe_form(State(state): State<AppState>) -> Html<String> {
    page(&state, "Traffic Alerts", None, &ui::render_subscribe_form("")).await
}

pub async fn subscribe(
    State(state): State<AppState>,
    Form(form): Form<SubscribeForm>,
) -> Html<String> {
    let email = form.email.trim();

    let (notice, content) = match state.api.post(SUBSCRIBE_ENDPOINT, json!({ "email": email })).await {
        Ok(_) => (
            Notice::ok(format!(
                "✅ Successfully subscribed! You will receive traffic alerts at {email}"
            )),
            ui::render_subscribe_form(""),
        ),
        Err(err) => {
            error!("subscribe error: {err}");
            (
                Notice::error("❌ Failed to subscribe. Please try again."),
                ui::render_subscribe_form(email),
            )
        }
    };

    page(&state, "Traffic Alerts", Some(notice), &content).await
}

pub async fn login_form(
    State(state): State<AppState>,
    Query(query): Query<LoginQuery>,
) -> Html<String> {
    let notice = query
        .registered
        .map(|_| Notice::ok("Registration successful! Please log in."));
    page(&state, "Log in", notice, &ui::render_login_form("")).await
}

pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    match state.auth.login(&form.email, &form.password).await {
        Ok(_) => Ok(Redirect::to("/").into_response()),
        Err(AuthError::InvalidCredentials) => {
            let notice = Notice::error("Invalid login credentials");
            let html = page(&state, "Log in", Some(notice), &ui::render_login_form(&form.email)).await;
            Ok((StatusCode::UNAUTHORIZED, html).into_response())
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn register_form(State(state): State<AppState>) -> Html<String> {
    page(&state, "Register", None, &ui::render_register_form()).await
}

pub async fn register(
    State(state): State<AppState>,
    Form(user): Form<User>,
) -> Result<Redirect, AppError> {
    state.auth.register(user).await?;
    Ok(Redirect::to("/login?registered=1"))
}

pub async fn logout(State(state): State<AppState>) -> Result<Redirect, AppError> {
    state.auth.logout().await?;
    Ok(Redirect::to("/"))
}
