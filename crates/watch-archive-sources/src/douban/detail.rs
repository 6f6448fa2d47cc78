use super::{
    COVER_IMAGE_REL, HEADING_TAG, HIGH_RES_COVER_MARKER, IMDB_LABEL, INFO_BLOCK_ID, INFO_LABEL_CLASS,
    LOW_RES_COVER_MARKER, RELEASE_DATE_LABELS, TITLE_SPAN_PROPERTY,
};
use crate::fetcher::ResilientFetcher;
use crate::markup::{following_text, next_text_sibling, text_of, AttrFilter, Query};
use regex::Regex;
use scraper::Html;
use std::sync::OnceLock;
use thiserror::Error;
use tracing::{debug, warn};
use watch_archive_models::DetailRecord;

/// Why a single detail field could not be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Absent {
    #[error("no {0} element")]
    NoElement(&'static str),
    #[error("no {0} in markup")]
    NoMatch(&'static str),
}

type Field<T> = Result<T, Absent>;

fn year_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\((\d{4})\)").expect("year pattern is valid"))
}

fn release_year_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(\d{4})").expect("release year pattern is valid"))
}

fn imdb_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^tt\d{7,8}$").expect("imdb id pattern is valid"))
}

fn imdb_fallback_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"IMDb:\s*(?:</span>)?\s*(?:<[^>]*>\s*)*(tt\d{7,8})\b").expect("imdb fallback pattern is valid")
    })
}

/// Fetches a title's detail page and reads the identity fields from it.
#[derive(Clone)]
pub struct DetailExtractor {
    fetcher: ResilientFetcher,
}

impl DetailExtractor {
    pub fn new(fetcher: ResilientFetcher) -> Self {
        Self { fetcher }
    }

    /// Never fails: an unreachable page yields an empty record.
    pub async fn extract_details(&self, detail_url: &str) -> DetailRecord {
        if detail_url.trim().is_empty() {
            debug!("No detail URL, skipping detail extraction");
            return DetailRecord::default();
        }

        match self.fetcher.fetch(detail_url).await {
            Ok(page) => parse_detail_page(page.text()),
            Err(err) => {
                warn!(url = %detail_url, error = %err, "Detail page unavailable");
                DetailRecord::default()
            }
        }
    }
}

/// Read every field independently; one missing field never hides another.
pub fn parse_detail_page(html: &str) -> DetailRecord {
    let doc = Html::parse_document(html);

    DetailRecord {
        original_title: settle("original_title", extract_title(&doc)).unwrap_or_default(),
        year: settle("year", extract_year(&doc)),
        cover_url: settle("cover_url", extract_cover(&doc)),
        external_id: settle("external_id", extract_external_id(&doc)),
    }
}

fn settle<T>(field: &'static str, result: Field<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(reason) => {
            debug!(field, %reason, "Detail field unavailable");
            None
        }
    }
}

fn extract_title(doc: &Html) -> Field<String> {
    let heading = doc.find_first(HEADING_TAG, &[]).ok_or(Absent::NoElement("heading"))?;
    let span = heading
        .find_first("span", &[AttrFilter::Equals("property", TITLE_SPAN_PROPERTY)])
        .ok_or(Absent::NoElement("title span"))?;
    let title = text_of(span).trim().to_string();
    if title.is_empty() {
        return Err(Absent::NoMatch("title text"));
    }
    Ok(title)
}

/// Heading year first, then the first-aired or release-date row of the info block.
fn extract_year(doc: &Html) -> Field<String> {
    extract_heading_year(doc).or_else(|heading_miss| {
        extract_release_year(doc).map_err(|release_miss| {
            debug!(%heading_miss, %release_miss, "No year in heading or release date");
            release_miss
        })
    })
}

fn extract_heading_year(doc: &Html) -> Field<String> {
    let heading = doc.find_first(HEADING_TAG, &[]).ok_or(Absent::NoElement("heading"))?;
    let text = text_of(heading);
    year_pattern()
        .captures(&text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or(Absent::NoMatch("year"))
}

fn extract_release_year(doc: &Html) -> Field<String> {
    let info = doc
        .find_first("div", &[AttrFilter::Id(INFO_BLOCK_ID)])
        .ok_or(Absent::NoElement("info block"))?;

    info.find_all("span", &[AttrFilter::Class(INFO_LABEL_CLASS)])
        .into_iter()
        .filter(|label| {
            let label = text_of(*label);
            RELEASE_DATE_LABELS.iter().any(|marker| label.contains(marker))
        })
        .filter_map(following_text)
        .find_map(|value| {
            release_year_pattern()
                .captures(&value)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
        })
        .ok_or(Absent::NoMatch("release year"))
}

fn extract_cover(doc: &Html) -> Field<String> {
    let img = doc
        .find_first("img", &[AttrFilter::Equals("rel", COVER_IMAGE_REL)])
        .ok_or(Absent::NoElement("cover image"))?;
    let src = img.value().attr("src").ok_or(Absent::NoMatch("cover src"))?;
    Ok(upgrade_cover_url(src))
}

/// Swap the CDN's low-resolution poster marker for the high-resolution one.
/// Plain substring replacement; nothing else in the URL changes.
pub fn upgrade_cover_url(url: &str) -> String {
    url.replace(LOW_RES_COVER_MARKER, HIGH_RES_COVER_MARKER)
}

fn extract_external_id(doc: &Html) -> Field<String> {
    let info = doc
        .find_first("div", &[AttrFilter::Id(INFO_BLOCK_ID)])
        .ok_or(Absent::NoElement("info block"))?;

    let labelled = info
        .find_all("span", &[AttrFilter::Class(INFO_LABEL_CLASS)])
        .into_iter()
        .find(|label| text_of(*label).trim() == IMDB_LABEL)
        .and_then(next_text_sibling)
        .filter(|id| imdb_id_pattern().is_match(id));

    if let Some(id) = labelled {
        return Ok(id);
    }

    // Markup around the label has changed between site revisions
    imdb_fallback_pattern()
        .captures(&info.html())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or(Absent::NoMatch("imdb id"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::ScriptedTransport;
    use std::sync::Arc;
    use std::time::Duration;

    const DETAIL_PAGE: &str = r#"
        <html><body>
        <div id="content">
          <h1>
            <span property="v:itemreviewed">现代启示录 Apocalypse Now</span>
            <span class="year">(1979)</span>
          </h1>
          <div id="mainpic">
            <img src="https://img1.doubanio.com/view/photo/s_ratio_poster/public/p2563780504.jpg" rel="v:image" />
          </div>
          <div id="info">
            <span><span class="pl">导演</span>: <span class="attrs"><a>弗朗西斯·福特·科波拉</a></span></span><br/>
            <span class="pl">制片国家/地区:</span> 美国<br/>
            <span class="pl">IMDb:</span> tt0078788<br/>
          </div>
        </div>
        </body></html>
    "#;

    #[test]
    fn test_parse_full_detail_page() {
        let record = parse_detail_page(DETAIL_PAGE);
        assert_eq!(record.original_title, "现代启示录 Apocalypse Now");
        assert_eq!(record.year.as_deref(), Some("1979"));
        assert_eq!(
            record.cover_url.as_deref(),
            Some("https://img1.doubanio.com/view/photo/l_ratio_poster/public/p2563780504.jpg")
        );
        assert_eq!(record.external_id.as_deref(), Some("tt0078788"));
    }

    #[test]
    fn test_upgrade_cover_url_is_exact_swap() {
        assert_eq!(
            upgrade_cover_url("https://img9.doubanio.com/view/photo/s_ratio_poster/public/p1.jpg"),
            "https://img9.doubanio.com/view/photo/l_ratio_poster/public/p1.jpg"
        );
        assert_eq!(upgrade_cover_url("https://x/photo/m/public/p1.jpg"), "https://x/photo/m/public/p1.jpg");
    }

    #[test]
    fn test_missing_info_block_keeps_other_fields() {
        let html = r#"<h1><span property="v:itemreviewed">花样年华</span> (2000)</h1>"#;
        let record = parse_detail_page(html);
        assert_eq!(record.original_title, "花样年华");
        assert_eq!(record.year.as_deref(), Some("2000"));
        assert!(record.cover_url.is_none());
        assert!(record.external_id.is_none());
    }

    #[test]
    fn test_year_without_title_span() {
        let html = r#"<h1>Untitled (2011)</h1><img rel="v:image" src="https://img/s_ratio_poster/a.jpg">"#;
        let record = parse_detail_page(html);
        assert_eq!(record.original_title, "");
        assert_eq!(record.year.as_deref(), Some("2011"));
        assert_eq!(record.cover_url.as_deref(), Some("https://img/l_ratio_poster/a.jpg"));
    }

    #[test]
    fn test_year_from_release_date_when_heading_has_none() {
        let html = r#"
            <h1><span property="v:itemreviewed">现代启示录 Apocalypse Now</span></h1>
            <div id="info">
              <span class="pl">上映日期:</span> <span property="v:initialReleaseDate" content="1979-05-10(戛纳电影节)">1979-05-10(戛纳电影节)</span><br/>
              <span class="pl">IMDb:</span> tt0078788<br/>
            </div>"#;
        let record = parse_detail_page(html);
        assert_eq!(record.year.as_deref(), Some("1979"));
        assert_eq!(record.external_id.as_deref(), Some("tt0078788"));
    }

    #[test]
    fn test_year_from_first_aired_row() {
        let html = r#"
            <h1><span property="v:itemreviewed">摇曳露营△ 第二季</span></h1>
            <div id="info"><span class="pl">首播:</span> 2021-01-07(日本)<br/></div>"#;
        assert_eq!(parse_detail_page(html).year.as_deref(), Some("2021"));
    }

    #[test]
    fn test_heading_year_wins_over_release_date() {
        let html = r#"
            <h1><span property="v:itemreviewed">花样年华</span> (2000)</h1>
            <div id="info"><span class="pl">上映日期:</span> 2001-03-09(中国香港)<br/></div>"#;
        assert_eq!(parse_detail_page(html).year.as_deref(), Some("2000"));
    }

    #[test]
    fn test_release_row_without_year_is_absent() {
        let html = r#"
            <h1><span property="v:itemreviewed">未定</span></h1>
            <div id="info"><span class="pl">上映日期:</span> 待定<br/></div>"#;
        assert!(parse_detail_page(html).year.is_none());
    }

    #[test]
    fn test_rejects_malformed_imdb_id() {
        let html = r#"<div id="info"><span class="pl">IMDb:</span> tt12<br/></div>"#;
        assert!(parse_detail_page(html).external_id.is_none());
    }

    #[test]
    fn test_imdb_id_fallback_scan() {
        // Label is not a span.pl, so the structural lookup misses it
        let html = r#"<div id="info"><b>IMDb:</b> <a href="https://www.imdb.com/title/tt1234567">tt1234567</a></div>"#;
        let record = parse_detail_page(html);
        assert_eq!(record.external_id.as_deref(), Some("tt1234567"));
    }

    #[test]
    fn test_empty_page_is_empty_record() {
        assert!(parse_detail_page("").is_empty());
        assert!(parse_detail_page("<html><p>blocked</p></html>").is_empty());
    }

    #[tokio::test]
    async fn test_extract_details_fetch_failure_is_empty() {
        let transport = Arc::new(ScriptedTransport::new().route("subject/1", 403, "forbidden"));
        let extractor = DetailExtractor::new(ResilientFetcher::new(transport.clone(), 2, Duration::ZERO));

        let record = extractor.extract_details("https://movie.douban.com/subject/1/").await;
        assert!(record.is_empty());
        assert_eq!(transport.call_count(), 2);
    }

    #[tokio::test]
    async fn test_extract_details_from_page() {
        let transport = Arc::new(ScriptedTransport::new().route("subject/1292260", 200, DETAIL_PAGE));
        let extractor = DetailExtractor::new(ResilientFetcher::new(transport, 3, Duration::ZERO));

        let record = extractor.extract_details("https://movie.douban.com/subject/1292260/").await;
        assert_eq!(record.external_id(), "tt0078788");
    }

    #[tokio::test]
    async fn test_blank_url_makes_no_request() {
        let transport = Arc::new(ScriptedTransport::new());
        let extractor = DetailExtractor::new(ResilientFetcher::new(transport.clone(), 3, Duration::ZERO));
        assert!(extractor.extract_details("  ").await.is_empty());
        assert_eq!(transport.call_count(), 0);
    }
}
