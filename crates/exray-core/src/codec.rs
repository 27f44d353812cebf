// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Codec for the trace-chain wire format:
//! `Root=<root>;Self=<self>;CalledFrom=<service>;TotalTimeSoFar=<int>ms`.
//!
//! Parsing is deliberately forgiving. An unrecognized downstream header must
//! never crash propagation, so malformed segments degrade to missing fields
//! and only a wholly empty header is reported as an error.

use rand::Rng;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::context::TraceContext;
use crate::error::TraceError;

const ROOT_KEY: &str = "Root";
const SELF_KEY: &str = "Self";
const CALLED_FROM_KEY: &str = "CalledFrom";
const TOTAL_TIME_KEY: &str = "TotalTimeSoFar";

const HEX_CHARS: &[u8; 16] = b"0123456789abcdef";

/// Fields recovered from an incoming trace header.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParsedHeader {
    pub root_id: Option<String>,
    pub self_id: Option<String>,
    pub called_from: Option<String>,
    pub total_time_so_far_ms: u64,
}

impl ParsedHeader {
    /// Copies the recovered fields into a trace context.
    pub fn apply(self, trace: &mut TraceContext) {
        trace.root_id = self.root_id;
        trace.self_id = self.self_id;
        trace.called_from = self.called_from;
        trace.total_time_so_far_ms = self.total_time_so_far_ms;
    }
}

/// Parses a raw trace header.
///
/// Segments are split on `;`, then on the first `=` only, so values may
/// carry embedded `=` characters. Keys are case-sensitive and may appear in
/// any order; unknown keys are ignored, repeated keys keep the last value.
pub fn parse(raw: &str) -> Result<ParsedHeader, TraceError> {
    if raw.is_empty() {
        return Err(TraceError::EmptyHeader);
    }
    let mut parsed = ParsedHeader::default();
    for segment in raw.split(';') {
        let Some((key, value)) = segment.split_once('=') else {
            continue;
        };
        match key {
            ROOT_KEY => parsed.root_id = Some(value.to_string()),
            SELF_KEY => parsed.self_id = Some(value.to_string()),
            CALLED_FROM_KEY => parsed.called_from = Some(value.to_string()),
            TOTAL_TIME_KEY => parsed.total_time_so_far_ms = parse_millis(value),
            _ => {}
        }
    }
    Ok(parsed)
}

/// Renders the outgoing header for one outbound propagation.
///
/// This is a pure read of the given state plus the clock: cumulative time
/// is recomputed from `created_at` on every call and the store is never
/// mutated, so successive outbound calls within one unit of work report
/// increasing totals. Two calls within the same wall-clock second mint the
/// same self id; that weak uniqueness is tolerated.
pub fn generate(state: &TraceContext, now: SystemTime) -> String {
    let root = match &state.root_id {
        Some(root) => root.clone(),
        None => generate_new_root(None, now),
    };
    let elapsed_ms = state
        .created_at
        .and_then(|created| now.duration_since(created).ok())
        .map(|elapsed| (elapsed.as_secs_f64() * 1000.0).round() as u64)
        .unwrap_or(0);
    let total = state.total_time_so_far_ms + elapsed_ms;
    let self_id = format!(
        "1-{:x}-{}",
        unix_seconds(now),
        clean_id(state.request_id.as_deref())
    );
    format!(
        "{ROOT_KEY}={root};{SELF_KEY}={self_id};{CALLED_FROM_KEY}={service};{TOTAL_TIME_KEY}={total}ms",
        service = state.service_name
    )
}

/// Mints a root id: `1-<hex unix seconds>-<24 hex chars>`.
///
/// With a seed, the last 8 characters are the zero-padded hex encoding of
/// the seed, so roots originated by one instance stay attributable to it.
pub fn generate_new_root(seed: Option<u64>, now: SystemTime) -> String {
    let unique = match seed {
        Some(seed) => format!("{}{seed:08x}", random_hex(16)),
        None => random_hex(24),
    };
    format!("1-{:x}-{unique}", unix_seconds(now))
}

/// Normalizes a request id into self-id material: strip every `-`, then
/// take the first 24 characters. Shorter sources stay short; the codec
/// never re-pads.
pub fn clean_id(request_id: Option<&str>) -> String {
    let source = match request_id {
        Some(id) => id.replace('-', ""),
        None => random_hex(24),
    };
    source.chars().take(24).collect()
}

/// `len` random lowercase hex characters.
pub fn random_hex(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| HEX_CHARS[rng.gen_range(0..HEX_CHARS.len())] as char)
        .collect()
}

/// `TotalTimeSoFar` values carry a trailing `ms` unit, any case. Absent or
/// non-numeric content parses to 0 rather than erroring.
fn parse_millis(value: &str) -> u64 {
    let digits = value
        .strip_suffix(&['s', 'S'][..])
        .and_then(|rest| rest.strip_suffix(&['m', 'M'][..]))
        .unwrap_or(value);
    digits.trim().parse().unwrap_or(0)
}

fn unix_seconds(now: SystemTime) -> u64 {
    now.duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::time::Duration;

    const FULL_HEADER: &str = "Root=1-5e1a2b3c-aaaaaaaaaaaaaaaaaaaaaaaa;Self=1-5e1a2b3d-bbbbbbbbbbbbbbbbbbbbbbbb;CalledFrom=ServiceA;TotalTimeSoFar=120ms";

    fn assert_root_format(root: &str) {
        let mut parts = root.splitn(3, '-');
        assert_eq!(parts.next(), Some("1"));
        let timestamp = parts.next().expect("missing timestamp section");
        let unique = parts.next().expect("missing unique section");
        assert!(!timestamp.is_empty() && timestamp.len() <= 16);
        assert!(timestamp.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_eq!(unique.len(), 24);
        assert!(unique.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_parse_full_header() {
        let parsed = parse(FULL_HEADER).unwrap();
        assert_eq!(
            parsed.root_id.as_deref(),
            Some("1-5e1a2b3c-aaaaaaaaaaaaaaaaaaaaaaaa")
        );
        assert_eq!(
            parsed.self_id.as_deref(),
            Some("1-5e1a2b3d-bbbbbbbbbbbbbbbbbbbbbbbb")
        );
        assert_eq!(parsed.called_from.as_deref(), Some("ServiceA"));
        assert_eq!(parsed.total_time_so_far_ms, 120);
    }

    #[test]
    fn test_parse_tolerates_reordered_and_unknown_keys() {
        let parsed = parse("Extra=1;TotalTimeSoFar=7ms;Root=1-aa-bb").unwrap();
        assert_eq!(parsed.root_id.as_deref(), Some("1-aa-bb"));
        assert_eq!(parsed.self_id, None);
        assert_eq!(parsed.total_time_so_far_ms, 7);
    }

    #[test]
    fn test_parse_malformed_header_degrades_to_defaults() {
        let parsed = parse("garbage;;Root").unwrap();
        assert_eq!(parsed, ParsedHeader::default());
    }

    #[test]
    fn test_parse_empty_header_is_an_error() {
        assert!(matches!(parse(""), Err(TraceError::EmptyHeader)));
    }

    #[test]
    fn test_parse_keeps_embedded_equals_in_values() {
        let parsed = parse("Root=1-aa-bb;CalledFrom=Service=A").unwrap();
        assert_eq!(parsed.called_from.as_deref(), Some("Service=A"));
    }

    #[test]
    fn test_parse_millis_suffix_is_case_insensitive() {
        let parsed = parse("TotalTimeSoFar=120MS").unwrap();
        assert_eq!(parsed.total_time_so_far_ms, 120);
    }

    #[test]
    fn test_parse_millis_non_numeric_is_zero() {
        let parsed = parse("TotalTimeSoFar=soonish").unwrap();
        assert_eq!(parsed.total_time_so_far_ms, 0);
    }

    #[test]
    fn test_generate_without_created_at_adds_no_elapsed_time() {
        let state = TraceContext {
            root_id: Some("1-5e1a2b3c-aaaaaaaaaaaaaaaaaaaaaaaa".to_string()),
            service_name: "ServiceA".to_string(),
            total_time_so_far_ms: 100,
            request_id: Some("req".to_string()),
            ..TraceContext::default()
        };
        let header = generate(&state, SystemTime::now());
        assert!(header.ends_with("TotalTimeSoFar=100ms"), "header: {header}");
    }

    #[test]
    fn test_generate_accumulates_elapsed_time() {
        let now = SystemTime::now();
        let state = TraceContext {
            root_id: Some("1-5e1a2b3c-aaaaaaaaaaaaaaaaaaaaaaaa".to_string()),
            service_name: "ServiceA".to_string(),
            total_time_so_far_ms: 100,
            created_at: Some(now - Duration::from_millis(250)),
            request_id: Some("req".to_string()),
            ..TraceContext::default()
        };
        let parsed = parse(&generate(&state, now)).unwrap();
        assert!(parsed.total_time_so_far_ms >= 350);
    }

    #[test]
    fn test_generate_backwards_clock_clamps_elapsed_to_zero() {
        let now = SystemTime::now();
        let state = TraceContext {
            root_id: Some("1-5e1a2b3c-aaaaaaaaaaaaaaaaaaaaaaaa".to_string()),
            service_name: "ServiceA".to_string(),
            total_time_so_far_ms: 40,
            created_at: Some(now + Duration::from_secs(60)),
            ..TraceContext::default()
        };
        let parsed = parse(&generate(&state, now)).unwrap();
        assert_eq!(parsed.total_time_so_far_ms, 40);
    }

    #[test]
    fn test_generate_derives_self_id_from_request_id() {
        let now = SystemTime::now();
        let state = TraceContext {
            root_id: Some("1-5e1a2b3c-aaaaaaaaaaaaaaaaaaaaaaaa".to_string()),
            service_name: "ServiceA".to_string(),
            request_id: Some("f3a0d1c2-b5e6-477a-8899-aabbccddeeff".to_string()),
            ..TraceContext::default()
        };
        let parsed = parse(&generate(&state, now)).unwrap();
        let self_id = parsed.self_id.unwrap();
        let expected_suffix = format!("-{}", clean_id(state.request_id.as_deref()));
        assert!(self_id.ends_with(&expected_suffix), "self id: {self_id}");
        assert!(self_id.starts_with(&format!("1-{:x}-", unix_seconds(now))));
    }

    #[test]
    fn test_generate_new_root_matches_format() {
        for _ in 0..32 {
            assert_root_format(&generate_new_root(None, SystemTime::now()));
        }
    }

    #[test]
    fn test_generate_new_root_seed_is_zero_padded_suffix() {
        let root = generate_new_root(Some(42), SystemTime::now());
        assert_root_format(&root);
        assert!(root.ends_with("0000002a"), "root: {root}");
    }

    #[test]
    fn test_clean_id_strips_dashes_then_truncates() {
        assert_eq!(
            clean_id(Some("a1-b2-c3-d4-e5-f6-0000000000000000000000")),
            "a1b2c3d4e5f6000000000000"
        );
    }

    #[test]
    fn test_clean_id_never_repads_short_ids() {
        assert_eq!(clean_id(Some("ab-cd")), "abcd");
    }

    #[test]
    fn test_clean_id_without_source_is_24_random_hex() {
        let id = clean_id(None);
        assert_eq!(id.len(), 24);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    proptest! {
        #[test]
        fn prop_roundtrip_preserves_root_and_accumulates_time(
            root_suffix in "[0-9a-f]{24}",
            service in "[A-Za-z][A-Za-z0-9-]{0,15}",
            total in 0u64..100_000,
            elapsed_ms in 0u64..5_000,
        ) {
            let now = SystemTime::now();
            let state = TraceContext {
                root_id: Some(format!("1-5e1a2b3c-{root_suffix}")),
                service_name: service.clone(),
                total_time_so_far_ms: total,
                created_at: Some(now - Duration::from_millis(elapsed_ms)),
                request_id: Some("f3a0d1c2-b5e6-477a-8899-aabbccddeeff".to_string()),
                ..TraceContext::default()
            };
            let parsed = parse(&generate(&state, now)).unwrap();
            prop_assert_eq!(parsed.root_id, state.root_id);
            prop_assert_eq!(parsed.called_from, Some(service));
            prop_assert!(parsed.total_time_so_far_ms >= total);
        }
    }
}
