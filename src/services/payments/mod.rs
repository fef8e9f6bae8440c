pub mod balance;
pub mod courses;
pub mod create;
pub mod list;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::ErrorCode;
use crate::models::payments::requests::{
    BalanceParams, CreatePaymentRequest, PaymentListParams, StudentCoursesParams,
};
use crate::models::users::entities::User;
use crate::storage::Storage;

pub struct PaymentService {
    storage: Option<Arc<dyn Storage>>,
}

impl PaymentService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    pub async fn list_payments(
        &self,
        query: PaymentListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_payments(self, query, request).await
    }

    pub async fn create_payment(
        &self,
        payment_data: CreatePaymentRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_payment(self, payment_data, request).await
    }

    // 缴费表单可选的课程
    pub async fn list_student_courses(
        &self,
        query: StudentCoursesParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        courses::list_student_courses(self, query, request).await
    }

    pub async fn get_balance(
        &self,
        query: BalanceParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        balance::get_balance(self, query, request).await
    }
}

/// 缴费只能关联到角色为学生的用户
pub(crate) async fn load_student(
    storage: &Arc<dyn Storage>,
    student_id: i64,
) -> Result<User, HttpResponse> {
    match storage.get_user_by_id(student_id).await {
        Ok(Some(user)) if user.is_student() => Ok(user),
        Ok(_) => Err(super::bad_request(
            ErrorCode::PaymentStudentInvalid,
            "student_id must reference a student",
        )),
        Err(e) => Err(super::internal_error("Failed to load student", e)),
    }
}
