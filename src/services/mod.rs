pub mod email;
pub mod error;
pub mod password;
pub mod response;
pub mod session;
