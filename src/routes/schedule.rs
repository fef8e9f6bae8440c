use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::lessons::requests::{
    CreateLessonRequest, LessonListParams, UpdateAttendanceRequest, UpdateLessonRequest,
};
use crate::models::users::entities::UserRole;
use crate::services::LessonService;
use crate::utils::SafeIDI64;

static LESSON_SERVICE: Lazy<LessonService> = Lazy::new(LessonService::new_lazy);

pub async fn list_lessons(
    req: HttpRequest,
    query: web::Query<LessonListParams>,
) -> ActixResult<HttpResponse> {
    LESSON_SERVICE.list_lessons(query.into_inner(), &req).await
}

pub async fn create_lesson(
    req: HttpRequest,
    lesson_data: web::Json<CreateLessonRequest>,
) -> ActixResult<HttpResponse> {
    LESSON_SERVICE
        .create_lesson(lesson_data.into_inner(), &req)
        .await
}

pub async fn get_lesson(req: HttpRequest, lesson_id: SafeIDI64) -> ActixResult<HttpResponse> {
    LESSON_SERVICE.get_lesson(lesson_id.0, &req).await
}

pub async fn update_lesson(
    req: HttpRequest,
    lesson_id: SafeIDI64,
    update_data: web::Json<UpdateLessonRequest>,
) -> ActixResult<HttpResponse> {
    LESSON_SERVICE
        .update_lesson(lesson_id.0, update_data.into_inner(), &req)
        .await
}

pub async fn update_attendance(
    req: HttpRequest,
    lesson_id: SafeIDI64,
    attendance_data: web::Json<UpdateAttendanceRequest>,
) -> ActixResult<HttpResponse> {
    LESSON_SERVICE
        .update_attendance(lesson_id.0, attendance_data.into_inner(), &req)
        .await
}

pub async fn delete_lesson(req: HttpRequest, lesson_id: SafeIDI64) -> ActixResult<HttpResponse> {
    LESSON_SERVICE.delete_lesson(lesson_id.0, &req).await
}

pub fn configure_schedule_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/schedule")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    // 所有登录用户，业务层按角色过滤
                    .route(web::get().to(list_lessons))
                    // 教师只能为自己的小组排课（业务层检查）
                    .route(
                        web::post()
                            .to(create_lesson)
                            .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles())),
                    ),
            )
            .service(
                web::resource("/{id}")
                    .route(web::get().to(get_lesson))
                    .route(
                        web::put()
                            .to(update_lesson)
                            .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles())),
                    )
                    .route(
                        web::delete()
                            .to(delete_lesson)
                            .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles())),
                    ),
            )
            .service(
                web::resource("/{id}/attendance").route(
                    web::put()
                        .to(update_attendance)
                        .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles())),
                ),
            ),
    );
}
