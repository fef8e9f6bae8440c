use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::services::HealthService;

static HEALTH_SERVICE: Lazy<HealthService> = Lazy::new(HealthService::new_lazy);

pub async fn root() -> ActixResult<HttpResponse> {
    HEALTH_SERVICE.root().await
}

pub async fn health(request: HttpRequest) -> ActixResult<HttpResponse> {
    HEALTH_SERVICE.health(&request).await
}

// 无需认证
pub fn configure_health_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(root))
        .route("/api/v1/health", web::get().to(health));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AppStartTime;
    use crate::routes::configure_group_routes;
    use crate::storage::{SeaOrmStorage, Storage};
    use actix_web::{App, test};
    use std::sync::Arc;

    #[actix_web::test]
    async fn test_root_and_health() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(AppStartTime {
                    start_datetime: chrono::Utc::now() - chrono::Duration::seconds(30),
                }))
                .configure(configure_health_routes),
        )
        .await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(test::read_body(resp).await, "API works");

        let resp = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/v1/health").to_request(),
        )
        .await;
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["status"], "ok");
        assert!(body["data"]["uptime_seconds"].as_i64().unwrap() >= 30);
    }

    #[actix_web::test]
    async fn test_protected_route_without_token() {
        let storage: Arc<dyn Storage> = Arc::new(SeaOrmStorage::in_memory().await);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(storage))
                .configure(configure_health_routes)
                .configure(configure_group_routes),
        )
        .await;

        let resp = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/v1/groups").to_request(),
        )
        .await;
        assert_eq!(resp.status(), 401);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], crate::models::ErrorCode::Unauthorized as i32);
    }
}
