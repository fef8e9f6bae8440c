use serde::Deserialize;
use ts_rs::TS;

// 用户登录请求
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/auth.ts")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    /// 是否记住我（延长 refresh token 有效期）
    #[serde(default)]
    pub remember_me: bool,
}

// 自助注册请求，新账号始终为学生
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/auth.ts")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}
