//! Attachment identifier helpers

use uuid::Uuid;

/// Generate a random identifier suitable for attachment filenames.
///
/// Discord attachment names cannot contain hyphens that we later need to
/// reference via `attachment://`, so the UUID is flattened to hex only.
pub fn attachment_id() -> String {
    Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attachment_id_format() {
        let id = attachment_id();
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(!id.contains('-'));
    }

    #[test]
    fn test_attachment_id_unique() {
        assert_ne!(attachment_id(), attachment_id());
    }
}
