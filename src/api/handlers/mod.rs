use axum::response::Response;
use serde::Deserialize;

use crate::api::envelope;
use crate::config::settings::AppConfig;
use crate::database::DbPool;

pub mod games;
pub mod matchmaking;
pub mod players;

pub struct AppState {
    pub pool: DbPool,
    pub config: AppConfig,
}

/// Query parameters shared by the list endpoints. Each handler reads
/// the filters that apply to its entity and ignores the rest.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(rename = "_page")]
    pub page: Option<i64>,
    #[serde(rename = "_per_page")]
    pub per_page: Option<i64>,
    #[serde(rename = "_sort")]
    pub sort: Option<String>,
    #[serde(rename = "_order")]
    pub order: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub not_email: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub title: Option<String>,
    pub status: Option<String>,
}

pub async fn ping() -> Response {
    envelope::ok("OK", "pong")
}
