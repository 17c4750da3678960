//! Pagination parameter handling shared by the list endpoints.

/// Largest page any endpoint will serve, regardless of the requested limit.
const MAX_PAGE_SIZE: usize = 1000;

/// Resolve optional `limit`/`offset` query parameters against an
/// endpoint-specific default, capping the limit at [`MAX_PAGE_SIZE`].
pub fn clamp(limit: Option<usize>, offset: Option<usize>, default_limit: usize) -> (usize, usize) {
    (
        limit.unwrap_or(default_limit).min(MAX_PAGE_SIZE),
        offset.unwrap_or(0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_absent() {
        assert_eq!(clamp(None, None, 50), (50, 0));
    }

    #[test]
    fn explicit_values_pass_through() {
        assert_eq!(clamp(Some(10), Some(30), 50), (10, 30));
    }

    #[test]
    fn oversized_limits_are_capped() {
        assert_eq!(clamp(Some(1_000_000), None, 50), (MAX_PAGE_SIZE, 0));
    }
}
