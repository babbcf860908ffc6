/// What to do when a repository read fails on the read-only routes (list,
/// edit-form).
///
/// Write-path failures always surface to the caller; this policy only
/// governs reads, where the legacy behavior was to log and render an empty
/// result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadFailurePolicy {
    /// Surface every read failure as a JSON error response (default).
    Surface,
    /// Log the failure and render an empty result (legacy behavior).
    LogOnly,
}

impl ReadFailurePolicy {
    /// Read the policy from the `SURFACE_READ_ERRORS` environment variable.
    /// Anything other than `false`/`0` surfaces read errors.
    pub fn from_env() -> Self {
        Self::parse(std::env::var("SURFACE_READ_ERRORS").ok().as_deref())
    }

    fn parse(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("false") || v == "0" => ReadFailurePolicy::LogOnly,
            _ => ReadFailurePolicy::Surface,
        }
    }

    /// Whether read failures should be surfaced to the caller.
    pub fn surfaces(self) -> bool {
        self == ReadFailurePolicy::Surface
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults_to_surface() {
        assert_eq!(ReadFailurePolicy::parse(None), ReadFailurePolicy::Surface);
        assert_eq!(
            ReadFailurePolicy::parse(Some("garbage")),
            ReadFailurePolicy::Surface
        );
        assert_eq!(
            ReadFailurePolicy::parse(Some("true")),
            ReadFailurePolicy::Surface
        );
    }

    #[test]
    fn test_parse_legacy_values() {
        assert_eq!(
            ReadFailurePolicy::parse(Some("false")),
            ReadFailurePolicy::LogOnly
        );
        assert_eq!(
            ReadFailurePolicy::parse(Some("FALSE")),
            ReadFailurePolicy::LogOnly
        );
        assert_eq!(ReadFailurePolicy::parse(Some("0")), ReadFailurePolicy::LogOnly);
    }
}
