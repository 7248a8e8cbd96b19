pub mod credential_service;
pub mod session_service;
pub mod user_service;
