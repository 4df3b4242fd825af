//! Per-request admin identity

use aihow_audit::RequestHeaders;

/// Who is making an admin request, and from where
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminContext {
    pub admin_id: String,
    /// Role name as known to the role registry
    pub role: String,
    pub session_id: String,
    pub headers: RequestHeaders,
}

impl AdminContext {
    pub fn new(
        admin_id: impl Into<String>,
        role: impl Into<String>,
        session_id: impl Into<String>,
    ) -> Self {
        Self {
            admin_id: admin_id.into(),
            role: role.into(),
            session_id: session_id.into(),
            headers: RequestHeaders::new(),
        }
    }

    pub fn with_headers(mut self, headers: RequestHeaders) -> Self {
        self.headers = headers;
        self
    }
}
