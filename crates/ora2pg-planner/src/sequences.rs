//! Sequence DDL emission: drops `ORDER`/`NO ORDER` (unsupported target
//! concept), clamps `CACHE` to at least 1, and omits `MAXVALUE` when it
//! exceeds the target's signed 64-bit range.

use ora2pg_namemap::NameMapper;
use ora2pg_types::Sequence;

const BIGINT_MAX: i64 = 9_223_372_036_854_775_807;

pub fn emit_sequence(seq: &Sequence, schema: &str, nm: &mut NameMapper) -> String {
    let fq = format!("{}.{}", nm.map_always_quoted(schema), nm.map_always_quoted(&seq.name));
    let mut parts = vec![format!("CREATE SEQUENCE IF NOT EXISTS {fq}")];

    parts.push(format!("INCREMENT BY {}", seq.increment));

    if let Some(min) = seq.min.as_deref().and_then(fits_bigint) {
        parts.push(format!("MINVALUE {min}"));
    }

    if let Some(max) = seq.max.as_deref().and_then(fits_bigint) {
        parts.push(format!("MAXVALUE {max}"));
    }

    let cache = seq.cache.filter(|c| *c >= 1).unwrap_or(1);
    parts.push(format!("CACHE {cache}"));

    parts.push(if seq.cycle { "CYCLE".to_string() } else { "NO CYCLE".to_string() });

    format!("{};", parts.join(" "))
}

/// Parses a decimal-text value and returns it only if it fits in a
/// signed 64-bit integer; anything that doesn't parse (huge values,
/// non-numeric text) is treated the same as "exceeds the target's
/// range" and silently omitted.
fn fits_bigint(raw: &str) -> Option<i64> {
    let value: i64 = raw.trim().parse().ok()?;
    (value <= BIGINT_MAX).then_some(value)
}
