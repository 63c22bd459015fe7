use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use scraper::{ElementRef, Selector};
use tracing::warn;

use super::ExtractError;

static EVENT_TIME_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.broadcast-event__time[content]").unwrap());
static TIME_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("time[datetime]").unwrap());

/// Earliest broadcast date and time. Classic episodes only carry a plain
/// `<time>` element, which gives a date without a time.
pub fn extract(root: ElementRef) -> (Option<NaiveDate>, Option<NaiveTime>) {
    let mut stamps: Vec<Stamp> = root
        .select(&EVENT_TIME_SEL)
        .filter_map(|el| el.value().attr("content"))
        .filter_map(|value| match parse_timestamp(value) {
            Ok(stamp) => Some(stamp),
            Err(e) => {
                warn!(error = %e, "Ignoring broadcast timestamp");
                None
            }
        })
        .collect();
    stamps.sort_by_key(|s| s.instant);

    if let Some(first) = stamps.first() {
        return (Some(first.local.date()), Some(first.local.time()));
    }

    let date = root
        .select(&TIME_SEL)
        .next()
        .and_then(|el| el.value().attr("datetime"))
        .and_then(|value| match parse_date(value) {
            Ok(date) => Some(date),
            Err(e) => {
                warn!(error = %e, "Ignoring broadcast date");
                None
            }
        });
    (date, None)
}

struct Stamp {
    /// Comparable point in time (UTC for offset timestamps).
    instant: NaiveDateTime,
    /// Wall-clock time in the timestamp's own offset.
    local: NaiveDateTime,
}

fn parse_timestamp(value: &str) -> Result<Stamp, ExtractError> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(Stamp {
            instant: dt.naive_utc(),
            local: dt.naive_local(),
        });
    }
    let naive = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M"))
        .map_err(|source| ExtractError::Timestamp {
            value: value.to_string(),
            source,
        })?;
    Ok(Stamp {
        instant: naive,
        local: naive,
    })
}

fn parse_date(value: &str) -> Result<NaiveDate, ExtractError> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.date_naive());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|source| ExtractError::Timestamp {
        value: value.to_string(),
        source,
    })
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn run(body: &str) -> (Option<NaiveDate>, Option<NaiveTime>) {
        let doc = Html::parse_document(&format!("<html><body>{}</body></html>", body));
        extract(doc.root_element())
    }

    #[test]
    fn earliest_wins_regardless_of_order() {
        let (date, time) = run(
            r#"<div class="broadcast-event__time beta" content="2019-06-09T11:15:00+01:00">Sun 9 Jun</div>
               <div class="broadcast-event__time beta" content="2019-06-02T11:15:00+01:00">Sun 2 Jun</div>"#,
        );
        assert_eq!(date, NaiveDate::from_ymd_opt(2019, 6, 2));
        assert_eq!(time, NaiveTime::from_hms_opt(11, 15, 0));
    }

    #[test]
    fn classic_episode_has_date_only() {
        let (date, time) = run(r#"<time datetime="1968-04-13">13 April 1968</time>"#);
        assert_eq!(date, NaiveDate::from_ymd_opt(1968, 4, 13));
        assert_eq!(time, None);
    }

    #[test]
    fn malformed_stamp_is_not_fatal() {
        let (date, time) = run(
            r#"<div class="broadcast-event__time beta" content="yesterday">?</div>
               <div class="broadcast-event__time beta" content="2020-01-05T09:00:00Z">x</div>"#,
        );
        assert_eq!(date, NaiveDate::from_ymd_opt(2020, 1, 5));
        assert_eq!(time, NaiveTime::from_hms_opt(9, 0, 0));

        assert_eq!(run(r#"<time datetime="sometime">?</time>"#), (None, None));
        assert_eq!(run("<p>no dates here</p>"), (None, None));
    }

    #[test]
    fn ordering_compares_instants() {
        // 10:30 in UTC+02:00 is earlier than 09:00 UTC
        let (date, time) = run(
            r#"<div class="broadcast-event__time" content="2021-03-07T09:00:00Z">a</div>
               <div class="broadcast-event__time" content="2021-03-07T10:30:00+02:00">b</div>"#,
        );
        assert_eq!(date, NaiveDate::from_ymd_opt(2021, 3, 7));
        assert_eq!(time, NaiveTime::from_hms_opt(10, 30, 0));
    }
}
