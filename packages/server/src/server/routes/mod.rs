mod auth;
mod documents;
mod health;
mod register;
mod sms;

pub use auth::{login_handler, logout_handler, refresh_handler};
pub use documents::{review_handler, sign_handler, submit_handler};
pub use health::health_handler;
pub use register::{confirm_handler, register_handler, resend_handler};
pub use sms::{
    sms_confirm_handler, sms_delete_handler, sms_latest_handler, sms_resend_handler,
    sms_send_handler,
};
