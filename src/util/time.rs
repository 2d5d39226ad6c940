use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone};

const KST_OFFSET_SECS: i32 = 9 * 3600;

/// Korea Standard Time (UTC+9, no DST).
pub fn kst() -> FixedOffset {
    FixedOffset::east_opt(KST_OFFSET_SECS).expect("UTC+9 is within the valid offset range")
}

/// Parses the search API's RFC 2822 `pubDate` into KST.
pub fn parse_rfc2822_kst(raw: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc2822(raw.trim())
        .ok()
        .map(|dt| dt.with_timezone(&kst()))
}

/// Parses a timestamp found in page metadata.
///
/// Accepts RFC 3339, RFC 2822 and a handful of naive layouts; naive values are
/// taken to be KST already.
pub fn parse_page_datetime_kst(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&kst()));
    }
    if let Some(dt) = parse_rfc2822_kst(raw) {
        return Some(dt);
    }
    for layout in ["%Y-%m-%dT%H:%M:%S%z", "%Y-%m-%d %H:%M:%S%z"] {
        if let Ok(dt) = DateTime::parse_from_str(raw, layout) {
            return Some(dt.with_timezone(&kst()));
        }
    }
    for layout in [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y.%m.%d %H:%M",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, layout) {
            return kst().from_local_datetime(&naive).single();
        }
    }
    None
}

/// Local midnight (KST) of the day containing `now`.
pub fn start_of_day_kst(now: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    let local = now.with_timezone(&kst());
    local
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .and_then(|midnight| kst().from_local_datetime(&midnight).single())
        .unwrap_or(local)
}
