use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// Health check payloads.
pub mod health;
/// Box score payloads.
pub mod linescore;
/// Play log payloads.
pub mod plays;
/// Scoring requests and responses.
pub mod scoring;
/// SSE event payloads.
pub mod sse;
/// Field validators.
pub mod validation;

/// Render a microsecond Unix timestamp as RFC 3339.
fn format_micros(micros: u64) -> String {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(micros) * 1_000)
        .ok()
        .and_then(|time| time.format(&Rfc3339).ok())
        .unwrap_or_else(|| "invalid-timestamp".into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_micros_as_rfc3339() {
        assert_eq!(format_micros(0), "1970-01-01T00:00:00Z");
        assert_eq!(format_micros(86_400_000_000), "1970-01-02T00:00:00Z");
    }
}
