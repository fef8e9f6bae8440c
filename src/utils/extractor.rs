//! 路径参数提取器
//!
//! 非正整数的 ID 直接返回 400 响应，不进入业务层。

use actix_web::{FromRequest, HttpRequest, HttpResponse, dev::Payload, error::InternalError};
use std::future::{Ready, ready};

use crate::models::{ApiResponse, ErrorCode};

fn parse_positive_id(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|value| value.parse::<i64>().ok())
        .filter(|id| *id > 0)
}

macro_rules! define_safe_i64_extractor {
    ($name:ident, $param:literal) => {
        #[derive(Debug, Clone, Copy)]
        pub struct $name(pub i64);

        impl FromRequest for $name {
            type Error = actix_web::Error;
            type Future = Ready<Result<Self, Self::Error>>;

            fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
                match parse_positive_id(req.match_info().get($param)) {
                    Some(id) => ready(Ok($name(id))),
                    None => {
                        let message = concat!("Invalid path parameter: ", $param);
                        let response = HttpResponse::BadRequest()
                            .json(ApiResponse::error_empty(ErrorCode::BadRequest, message));
                        ready(Err(InternalError::from_response(message, response).into()))
                    }
                }
            }
        }
    };
}

define_safe_i64_extractor!(SafeIDI64, "id");
define_safe_i64_extractor!(SafeLessonIdI64, "lesson_id");
define_safe_i64_extractor!(SafeAssignmentIdI64, "assignment_id");
define_safe_i64_extractor!(SafeSubmissionIdI64, "submission_id");

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_parse_positive_id() {
        assert_eq!(parse_positive_id(Some("42")), Some(42));
        assert_eq!(parse_positive_id(Some("0")), None);
        assert_eq!(parse_positive_id(Some("-3")), None);
        assert_eq!(parse_positive_id(Some("abc")), None);
        assert_eq!(parse_positive_id(None), None);
    }

    #[actix_web::test]
    async fn test_extractor_reads_named_param() {
        let req = TestRequest::default()
            .param("lesson_id", "7")
            .to_http_request();
        let id = SafeLessonIdI64::extract(&req).await.unwrap();
        assert_eq!(id.0, 7);

        let bad = TestRequest::default().param("id", "x").to_http_request();
        let err = SafeIDI64::extract(&bad).await.unwrap_err();
        assert_eq!(
            err.as_response_error().status_code(),
            actix_web::http::StatusCode::BAD_REQUEST
        );
    }
}
