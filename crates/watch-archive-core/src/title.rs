//! Title policy: which title a record is published under, and the
//! path-safe key it is stored under.

use watch_archive_models::{DetailRecord, RecordKey, WatchEntry};
use watch_archive_sources::douban::TRACKER_NOISE_PREFIXES;

/// Strip tracker status prefixes ("看过" and friends) from a listing title.
pub fn strip_tracker_noise(title: &str) -> &str {
    let mut title = title.trim();
    while let Some(rest) = TRACKER_NOISE_PREFIXES
        .iter()
        .find_map(|prefix| title.strip_prefix(prefix))
    {
        title = rest.trim_start();
    }
    title
}

/// Local title as a human-readable fallback: tracker noise stripped, line
/// breaks dropped, path separators and colons turned into `.`.
pub fn clean_title(title: &str) -> String {
    strip_tracker_noise(title)
        .chars()
        .filter(|c| !matches!(c, '\n' | '\r'))
        .map(|c| if matches!(c, '/' | ':') { '.' } else { c })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Make a title safe to use as a file name stem.
///
/// Same as [`clean_title`] with all whitespace removed, so "摇曳露营△ 第二季"
/// from the feed and "摇曳露营△第二季" from the collection pages share a key.
pub fn sanitize_title(title: &str) -> String {
    clean_title(title).chars().filter(|c| !c.is_whitespace()).collect()
}

/// Storage key for an entry. The title part may be empty when the listing
/// title was nothing but tracker noise; callers must not persist such keys.
pub fn record_key(entry: &WatchEntry) -> RecordKey {
    RecordKey::new(sanitize_title(&entry.local_title), entry.watched_date)
}

/// Foreign title from the listing, then the detail page's original title,
/// then the cleaned-up local title.
pub fn display_title(entry: &WatchEntry, detail: &DetailRecord) -> String {
    let explicit = entry
        .foreign_title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .or_else(|| Some(detail.original_title.trim()).filter(|t| !t.is_empty()));

    match explicit {
        Some(title) => title.to_string(),
        None => clean_title(&entry.local_title),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use watch_archive_sources::douban::{parse_collection_page, parse_feed};

    fn entry(title: &str) -> WatchEntry {
        WatchEntry::new(title, "https://movie.douban.com/subject/1/", NaiveDate::from_ymd_opt(2024, 3, 9).unwrap())
    }

    #[test]
    fn test_sanitize_replaces_separators() {
        assert_eq!(sanitize_title("现代启示录/Apocalypse Now"), "现代启示录.ApocalypseNow");
        assert_eq!(sanitize_title("Mission: Impossible"), "Mission.Impossible");
        assert_eq!(clean_title("Mission: Impossible"), "Mission. Impossible");
    }

    #[test]
    fn test_sanitize_strips_noise_and_newlines() {
        assert_eq!(sanitize_title("看过 无名之辈\n"), "无名之辈");
        assert_eq!(sanitize_title("看过"), "");
        assert_eq!(sanitize_title("  想看花样\r\n年华 "), "花样年华");
    }

    #[test]
    fn test_record_key() {
        let key = record_key(&entry("现代启示录/Apocalypse Now"));
        assert_eq!(key.file_name(), "现代启示录.ApocalypseNow.2024-03-09.md");
    }

    #[test]
    fn test_display_title_order() {
        let detail = DetailRecord {
            original_title: "Apocalypse Now".to_string(),
            ..Default::default()
        };

        let with_foreign = entry("现代启示录").with_foreign_title("Apocalypse Now Redux");
        assert_eq!(display_title(&with_foreign, &detail), "Apocalypse Now Redux");
        assert_eq!(display_title(&entry("现代启示录"), &detail), "Apocalypse Now");
        assert_eq!(display_title(&entry("看过现代/启示录"), &DetailRecord::default()), "现代.启示录");
    }

    #[test]
    fn test_feed_and_collection_share_a_key() {
        let feed = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"><channel><title>t</title>
  <item>
    <title>看过摇曳露营△ 第二季</title>
    <link>https://movie.douban.com/subject/34894753/</link>
    <description></description>
    <pubDate>Sat, 19 Jul 2025 13:04:11 GMT</pubDate>
  </item>
</channel></rss>"#;
        let collection = r#"<html><body><div class="item"><div class="info"><ul>
  <li class="title"><a href="https://movie.douban.com/subject/34894753/"><em>摇曳露营△ 第二季 / ゆるキャン△ SEASON 2</em></a></li>
  <li><span class="date">2025-07-19</span></li>
</ul></div></div></body></html>"#;

        let from_feed = parse_feed(feed).unwrap();
        let from_collection = parse_collection_page(collection).entries;
        assert_eq!(from_feed.len(), 1);
        assert_eq!(from_collection.len(), 1);

        let key = record_key(&from_feed[0]);
        assert_eq!(key, record_key(&from_collection[0]));
        assert_eq!(key.file_name(), "摇曳露营△第二季.2025-07-19.md");
    }
}
