//! Douban watch history: RSS feed, paginated collection pages, and the
//! per-title detail page.
//!
//! Every assumption about Douban's markup lives in the constants below so a
//! site revision is a one-place fix.

pub mod collection;
pub mod detail;
pub mod feed;

pub use collection::{parse_collection_page, split_listing_title, CollectionPage, DoubanCollection};
pub use detail::{parse_detail_page, upgrade_cover_url, Absent, DetailExtractor};
pub use feed::{parse_feed, DoubanFeed};

pub const COLLECTION_URL_BASE: &str = "https://movie.douban.com/people";

// Detail page
pub const HEADING_TAG: &str = "h1";
pub const TITLE_SPAN_PROPERTY: &str = "v:itemreviewed";
pub const COVER_IMAGE_REL: &str = "v:image";
pub const INFO_BLOCK_ID: &str = "info";
pub const INFO_LABEL_CLASS: &str = "pl";
pub const IMDB_LABEL: &str = "IMDb:";
/// Info-block rows carrying a date when the heading has no year ("first aired", "release date")
pub const RELEASE_DATE_LABELS: [&str; 2] = ["首播", "上映日期"];
pub const LOW_RES_COVER_MARKER: &str = "s_ratio_poster";
pub const HIGH_RES_COVER_MARKER: &str = "l_ratio_poster";

// Collection pages
pub const COLLECTION_ITEM_CLASS: &str = "item";
pub const COLLECTION_TITLE_CLASS: &str = "title";
pub const COLLECTION_DATE_CLASS: &str = "date";
pub const COLLECTION_RATING_PREFIX: &str = "rating";
pub const NO_MORE_CONTENT_MARKER: &str = "没有更多内容了";

// RSS feed
pub const WATCHED_MARKER: &str = "看过";

/// Status prefixes the tracker puts in front of titles ("watched", "watching", "want to watch")
pub const TRACKER_NOISE_PREFIXES: [&str; 3] = ["看过", "在看", "想看"];
