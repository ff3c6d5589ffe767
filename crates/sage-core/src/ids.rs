//! ID prefix constants and generation helpers.
//!
//! Every generated identifier is `<prefix>-<8 hex chars>`; project ids also
//! embed the creation time in Unix milliseconds (`prj-<millis>-<hex>`) so
//! that they sort by creation order.

use chrono::Utc;

pub const PREFIX_PROJECT: &str = "prj";
pub const PREFIX_SECTION: &str = "sec";
pub const PREFIX_SUBSECTION: &str = "sub";
pub const PREFIX_QUESTION: &str = "qst";

/// Four random bytes rendered as eight lowercase hex characters.
///
/// Falls back to the sub-second nanoseconds of the wall clock when the OS
/// random source is unavailable.
#[must_use]
pub fn random_suffix() -> String {
    let mut buf = [0u8; 4];
    if getrandom::fill(&mut buf).is_err() {
        let nanos = Utc::now().timestamp_subsec_nanos();
        buf = nanos.to_le_bytes();
    }
    buf.iter().map(|b| format!("{b:02x}")).collect()
}

/// Generate `<prefix>-<8 hex>`.
#[must_use]
pub fn generate(prefix: &str) -> String {
    format!("{prefix}-{}", random_suffix())
}

/// Generate a time-ordered project id.
#[must_use]
pub fn generate_project_id() -> String {
    format!(
        "{PREFIX_PROJECT}-{}-{}",
        Utc::now().timestamp_millis(),
        random_suffix()
    )
}

/// Return `true` when `id` starts with `<prefix>-`.
#[must_use]
pub fn has_prefix(id: &str, prefix: &str) -> bool {
    id.strip_prefix(prefix)
        .is_some_and(|rest| rest.starts_with('-'))
}

/// A uniformly distributed value in `0..bound` taken from the OS random
/// source. Returns 0 when `bound` is 0.
#[must_use]
pub fn random_below(bound: u64) -> u64 {
    if bound == 0 {
        return 0;
    }
    let mut buf = [0u8; 8];
    if getrandom::fill(&mut buf).is_err() {
        return u64::from(Utc::now().timestamp_subsec_nanos()) % bound;
    }
    u64::from_le_bytes(buf) % bound
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_have_prefix_and_hex_suffix() {
        let id = generate(PREFIX_SECTION);
        assert!(has_prefix(&id, PREFIX_SECTION));
        let suffix = &id[PREFIX_SECTION.len() + 1..];
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn project_ids_embed_millis() {
        let id = generate_project_id();
        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], PREFIX_PROJECT);
        assert!(parts[1].parse::<i64>().is_ok());
    }

    #[test]
    fn has_prefix_requires_dash() {
        assert!(has_prefix("sec-0011aabb", "sec"));
        assert!(!has_prefix("section", "sec"));
        assert!(!has_prefix("qst-1", "sec"));
    }

    #[test]
    fn random_below_respects_bound() {
        for _ in 0..50 {
            assert!(random_below(7) < 7);
        }
        assert_eq!(random_below(0), 0);
    }
}
