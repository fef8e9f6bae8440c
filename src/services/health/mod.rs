use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};

use crate::models::{AppStartTime, ApiResponse, health::responses::HealthResponse};

pub struct HealthService;

impl HealthService {
    pub fn new_lazy() -> Self {
        Self
    }

    /// 根路径的存活探针
    pub async fn root(&self) -> ActixResult<HttpResponse> {
        Ok(HttpResponse::Ok()
            .content_type("text/plain; charset=utf-8")
            .body("API works"))
    }

    pub async fn health(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        let uptime_seconds = request
            .app_data::<web::Data<AppStartTime>>()
            .map(|start| {
                chrono::Utc::now()
                    .signed_duration_since(start.start_datetime)
                    .num_seconds()
            })
            .unwrap_or_default();

        Ok(HttpResponse::Ok().json(ApiResponse::success(
            HealthResponse {
                status: "ok".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                uptime_seconds,
            },
            "Service is healthy",
        )))
    }
}
