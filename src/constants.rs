/// Upper bound for multipart upload bodies
pub const MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024; // 10 MB

/// Default local directory for uploaded media
pub const DEFAULT_MEDIA_DIR: &str = "./media";
