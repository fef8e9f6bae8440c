pub mod auth;

pub mod users;

pub mod courses;

pub mod groups;

pub mod schedule;

pub mod materials;

pub mod payments;

pub mod health;

pub use auth::configure_auth_routes;
pub use courses::configure_course_routes;
pub use groups::configure_group_routes;
pub use health::configure_health_routes;
pub use materials::configure_material_routes;
pub use payments::configure_payment_routes;
pub use schedule::configure_schedule_routes;
pub use users::configure_user_routes;
