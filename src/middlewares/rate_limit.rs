/*!
 * 速率限制中间件
 *
 * 固定窗口计数，按「前缀 + 用户 ID 或客户端 IP」分别计数，超过限制返回 429。
 *
 * ```rust,ignore
 * web::resource("/login").route(web::post().to(login).wrap(RateLimit::login()))
 * ```
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
    http::header::{HeaderName, HeaderValue},
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use moka::future::Cache;
use once_cell::sync::Lazy;
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::warn;

use super::create_error_response;
use crate::models::ErrorCode;

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    started: Instant,
}

/// 全局计数缓存，键为 `前缀:标识`
static RATE_LIMIT_CACHE: Lazy<Cache<String, Window>> = Lazy::new(|| {
    Cache::builder()
        .time_to_idle(Duration::from_secs(3600))
        .max_capacity(100_000)
        .build()
});

#[derive(Clone)]
pub struct RateLimit {
    max_requests: u32,
    window_secs: u64,
    key_prefix: String,
}

impl RateLimit {
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window_secs: window_secs.max(1),
            key_prefix: String::new(),
        }
    }

    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.key_prefix = prefix.to_string();
        self
    }

    /// 登录：5 次/分钟/IP
    pub fn login() -> Self {
        Self::new(5, 60).with_prefix("login")
    }

    /// 注册：3 次/分钟/IP
    pub fn register() -> Self {
        Self::new(3, 60).with_prefix("register")
    }

    /// 刷新令牌：10 次/分钟/IP
    pub fn refresh_token() -> Self {
        Self::new(10, 60).with_prefix("refresh")
    }
}

/// 推进固定窗口，返回本次请求之后的窗口状态
fn advance(existing: Option<Window>, now: Instant, window: Duration) -> Window {
    match existing {
        Some(w) if now.duration_since(w.started) < window => Window {
            count: w.count.saturating_add(1),
            started: w.started,
        },
        _ => Window {
            count: 1,
            started: now,
        },
    }
}

/// 客户端 IP：优先连接信息，其次 X-Forwarded-For 的第一个地址，再次 X-Real-IP
fn extract_client_ip(req: &ServiceRequest) -> String {
    let connection_ip = req
        .connection_info()
        .realip_remote_addr()
        .map(|s| s.to_string());

    if let Some(ref ip) = connection_ip
        && is_valid_ip(ip)
    {
        return ip.clone();
    }

    if let Some(forwarded) = req.headers().get("X-Forwarded-For")
        && let Ok(value) = forwarded.to_str()
        && let Some(ip) = value.split(',').next()
    {
        let ip = ip.trim();
        if is_valid_ip(ip) {
            return ip.to_string();
        }
    }

    if let Some(real_ip) = req.headers().get("X-Real-IP")
        && let Ok(ip) = real_ip.to_str()
    {
        let ip = ip.trim();
        if is_valid_ip(ip) {
            return ip.to_string();
        }
    }

    connection_ip.unwrap_or_else(|| "unknown".to_string())
}

fn is_valid_ip(ip: &str) -> bool {
    ip.parse::<std::net::IpAddr>().is_ok()
}

fn extract_user_id(req: &ServiceRequest) -> Option<i64> {
    use crate::models::users::entities::User;
    req.extensions().get::<User>().map(|user| user.id)
}

fn create_rate_limit_response(retry_after: u64) -> HttpResponse {
    let mut response = create_error_response(
        StatusCode::TOO_MANY_REQUESTS,
        ErrorCode::RateLimitExceeded,
        "Too many requests, please try again later",
    );
    let headers = response.headers_mut();
    headers.insert(
        HeaderName::from_static("retry-after"),
        HeaderValue::from(retry_after),
    );
    headers.insert(
        HeaderName::from_static("x-ratelimit-remaining"),
        HeaderValue::from_static("0"),
    );
    response
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddleware {
            service: Rc::new(service),
            limit: self.clone(),
        }))
    }
}

pub struct RateLimitMiddleware<S> {
    service: Rc<S>,
    limit: RateLimit,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let limit = self.limit.clone();

        Box::pin(async move {
            let identifier = extract_user_id(&req)
                .map(|id| format!("user:{id}"))
                .unwrap_or_else(|| format!("ip:{}", extract_client_ip(&req)));

            let cache_key = if limit.key_prefix.is_empty() {
                identifier
            } else {
                format!("{}:{}", limit.key_prefix, identifier)
            };

            let window = Duration::from_secs(limit.window_secs);
            let now = Instant::now();
            let state = RATE_LIMIT_CACHE
                .entry(cache_key.clone())
                .and_upsert_with(|existing| {
                    ready(advance(existing.map(|e| e.into_value()), now, window))
                })
                .await
                .into_value();

            if state.count > limit.max_requests {
                let elapsed = now.duration_since(state.started).as_secs();
                let retry_after = limit.window_secs.saturating_sub(elapsed).max(1);
                warn!(
                    "Rate limit exceeded for key: {} (count: {}/{})",
                    cache_key, state.count, limit.max_requests
                );
                return Ok(req
                    .into_response(create_rate_limit_response(retry_after).map_into_right_body()));
            }

            let remaining = limit.max_requests - state.count;
            let mut res = srv.call(req).await?.map_into_left_body();
            let headers = res.headers_mut();
            headers.insert(
                HeaderName::from_static("x-ratelimit-limit"),
                HeaderValue::from(limit.max_requests),
            );
            headers.insert(
                HeaderName::from_static("x-ratelimit-remaining"),
                HeaderValue::from(remaining),
            );
            Ok(res)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::{TestRequest, call_service, init_service};
    use actix_web::{App, web};

    #[test]
    fn test_rate_limit_presets() {
        let login = RateLimit::login();
        assert_eq!(login.max_requests, 5);
        assert_eq!(login.window_secs, 60);
        assert_eq!(login.key_prefix, "login");

        assert_eq!(RateLimit::register().max_requests, 3);
        assert_eq!(RateLimit::refresh_token().max_requests, 10);
    }

    #[test]
    fn test_window_resets_after_expiry() {
        let start = Instant::now();
        let window = Duration::from_secs(60);

        let first = advance(None, start, window);
        assert_eq!(first.count, 1);
        let second = advance(Some(first), start + Duration::from_secs(10), window);
        assert_eq!(second.count, 2);
        assert_eq!(second.started, start);

        let reset = advance(Some(second), start + Duration::from_secs(61), window);
        assert_eq!(reset.count, 1);
    }

    #[actix_web::test]
    async fn test_requests_over_limit_get_429() {
        let app = init_service(
            App::new().service(
                web::resource("/limited")
                    .wrap(RateLimit::new(2, 60).with_prefix("test-limited"))
                    .route(web::get().to(|| async { HttpResponse::Ok().finish() })),
            ),
        )
        .await;

        for remaining in ["1", "0"] {
            let resp = call_service(
                &app,
                TestRequest::get()
                    .uri("/limited")
                    .peer_addr("10.1.2.3:4000".parse().unwrap())
                    .to_request(),
            )
            .await;
            assert_eq!(resp.status(), StatusCode::OK);
            assert_eq!(resp.headers().get("x-ratelimit-remaining").unwrap(), remaining);
        }

        let resp = call_service(
            &app,
            TestRequest::get()
                .uri("/limited")
                .peer_addr("10.1.2.3:4000".parse().unwrap())
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(resp.headers().contains_key("retry-after"));

        // 其他 IP 不受影响
        let resp = call_service(
            &app,
            TestRequest::get()
                .uri("/limited")
                .peer_addr("10.9.9.9:4000".parse().unwrap())
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
