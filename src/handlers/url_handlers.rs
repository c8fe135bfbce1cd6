use actix_web::{HttpRequest, HttpResponse, http, web};

use crate::errors::ServiceError;
use crate::state::app_state::AppState;
use crate::structs::url_request::{ShortenRequest, ShortenResponse, StatsSummary, StatsView};

/// Create a shortened URL
pub async fn create_short_url(
    app_state: web::Data<AppState>,
    web::Json(req): web::Json<ShortenRequest>,
) -> Result<HttpResponse, ServiceError> {
    let created = app_state
        .shortener
        .create(req.url.as_deref(), req.validity.as_ref(), req.shortcode.as_deref())
        .await?;

    Ok(HttpResponse::Created().json(ShortenResponse::from_created(&created)))
}

/// Redirect to the original URL, recording the click best-effort.
pub async fn redirect_to_url(
    app_state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let code = path.into_inner();
    let record = app_state.shortener.fetch_for_redirect(&code).await?;

    // Best-effort visitor detail extraction.
    let ip = req
        .connection_info()
        .realip_remote_addr()
        .unwrap_or("unknown")
        .to_string();

    let user_agent = req
        .headers()
        .get(http::header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    let referrer = req
        .headers()
        .get(http::header::REFERER)
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    // Recording failures are logged inside the service and never reach here.
    app_state
        .shortener
        .record_click(&code, referrer, ip, user_agent)
        .await;

    Ok(HttpResponse::Found()
        .append_header((http::header::LOCATION, record.original_url))
        .finish())
}

/// Get per-code statistics with the full click list.
pub async fn get_url_statistics(
    app_state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let code = path.into_inner();
    let stats = app_state.shortener.fetch_statistics(&code).await?;
    Ok(HttpResponse::Ok().json(StatsView::from_stats(&stats)))
}

/// List all mappings with aggregate click counts.
pub async fn get_all_urls(
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ServiceError> {
    let summaries = app_state.analytics.list_all().await?;
    let body: Vec<StatsSummary> = summaries.iter().map(StatsSummary::from_summary).collect();
    Ok(HttpResponse::Ok().json(body))
}
