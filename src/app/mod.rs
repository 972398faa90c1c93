pub mod dispatch;
pub mod services;
pub mod status;
