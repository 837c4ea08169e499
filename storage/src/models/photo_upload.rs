//! Upload tuple handed to PhotoStorage::persist.

/// Raw upload as supplied by the transport: bytes plus the client-declared name and type.
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub bytes: Vec<u8>,
    pub filename: Option<String>,
    pub content_type: Option<String>,
}

impl PhotoUpload {
    pub fn new(
        bytes: impl Into<Vec<u8>>,
        filename: Option<String>,
        content_type: Option<String>,
    ) -> Self {
        Self {
            bytes: bytes.into(),
            filename,
            content_type,
        }
    }

    /// Name used in error messages when the client sent none.
    pub fn display_name(&self) -> &str {
        self.filename
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or("unnamed")
    }
}
