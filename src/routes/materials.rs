use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::materials::requests::CreateMaterialRequest;
use crate::models::submissions::requests::{GradeSubmissionRequest, SubmitAssignmentRequest};
use crate::models::users::entities::UserRole;
use crate::services::MaterialService;
use crate::utils::{SafeAssignmentIdI64, SafeIDI64, SafeLessonIdI64, SafeSubmissionIdI64};

static MATERIAL_SERVICE: Lazy<MaterialService> = Lazy::new(MaterialService::new_lazy);

pub async fn create_material(
    req: HttpRequest,
    material_data: web::Json<CreateMaterialRequest>,
) -> ActixResult<HttpResponse> {
    MATERIAL_SERVICE
        .create_material(material_data.into_inner(), &req)
        .await
}

pub async fn list_lesson_materials(
    req: HttpRequest,
    lesson_id: SafeLessonIdI64,
) -> ActixResult<HttpResponse> {
    MATERIAL_SERVICE
        .list_lesson_materials(lesson_id.0, &req)
        .await
}

pub async fn delete_material(req: HttpRequest, material_id: SafeIDI64) -> ActixResult<HttpResponse> {
    MATERIAL_SERVICE.delete_material(material_id.0, &req).await
}

pub async fn submit_assignment(
    req: HttpRequest,
    assignment_id: SafeAssignmentIdI64,
    submission_data: web::Json<SubmitAssignmentRequest>,
) -> ActixResult<HttpResponse> {
    MATERIAL_SERVICE
        .submit_assignment(assignment_id.0, submission_data.into_inner(), &req)
        .await
}

pub async fn list_submissions(
    req: HttpRequest,
    assignment_id: SafeAssignmentIdI64,
) -> ActixResult<HttpResponse> {
    MATERIAL_SERVICE
        .list_submissions(assignment_id.0, &req)
        .await
}

pub async fn list_my_submissions(req: HttpRequest) -> ActixResult<HttpResponse> {
    MATERIAL_SERVICE.list_my_submissions(&req).await
}

pub async fn grade_submission(
    req: HttpRequest,
    submission_id: SafeSubmissionIdI64,
    grade_data: web::Json<GradeSubmissionRequest>,
) -> ActixResult<HttpResponse> {
    MATERIAL_SERVICE
        .grade_submission(submission_id.0, grade_data.into_inner(), &req)
        .await
}

pub fn configure_material_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/materials")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("").route(
                    web::post()
                        .to(create_material)
                        .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles())),
                ),
            )
            // 权限在业务层检查（管理员、小组教师、小组学生）
            .service(
                web::resource("/lesson/{lesson_id}").route(web::get().to(list_lesson_materials)),
            )
            .service(
                web::resource("/submissions/mine").route(
                    web::get()
                        .to(list_my_submissions)
                        .wrap(middlewares::RequireRole::new_any(UserRole::student_roles())),
                ),
            )
            .service(
                web::resource("/submit/{assignment_id}").route(
                    web::post()
                        .to(submit_assignment)
                        .wrap(middlewares::RequireRole::new_any(UserRole::student_roles())),
                ),
            )
            .service(
                web::resource("/grade/{submission_id}").route(
                    web::put()
                        .to(grade_submission)
                        .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles())),
                ),
            )
            .service(
                web::resource("/{assignment_id}/submissions").route(
                    web::get()
                        .to(list_submissions)
                        .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles())),
                ),
            )
            .service(
                web::resource("/{id}").route(
                    web::delete()
                        .to(delete_material)
                        .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles())),
                ),
            ),
    );
}
