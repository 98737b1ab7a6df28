// ABOUTME: Shared utility functions for OpsDesk
// ABOUTME: Prefixed id generation and human-readable submission numbers

/// Generate a unique id with an entity prefix, e.g. `req-V1StGXR8_Z5jdHi6B-myT`
pub fn generate_id(prefix: &str) -> String {
    format!("{}-{}", prefix, nanoid::nanoid!())
}

/// Human-readable form of a submission number (`SUB-0042`)
pub fn display_submission_number(number: i64) -> String {
    format!("SUB-{:04}", number)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_id() {
        let id1 = generate_id("req");
        let id2 = generate_id("req");

        assert!(id1.starts_with("req-"));
        assert_ne!(id1, id2);
        // nanoid default length is 21
        assert_eq!(id1.len(), "req-".len() + 21);
    }

    #[test]
    fn test_display_submission_number() {
        assert_eq!(display_submission_number(7), "SUB-0007");
        assert_eq!(display_submission_number(12345), "SUB-12345");
    }
}
