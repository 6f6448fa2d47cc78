pub mod douban;
pub mod error;
pub mod factory;
pub mod fetcher;
pub mod http;
pub mod markup;
pub mod omdb;
pub mod tmdb;

#[cfg(any(test, feature = "test-util"))]
pub mod mock;

pub use douban::{DetailExtractor, DoubanCollection, DoubanFeed};
pub use error::{AttemptError, FetchFailure, SourceError};
pub use factory::SourceFactory;
pub use fetcher::{Fetched, ResilientFetcher};
pub use http::{HttpResponse, ReqwestTransport, Transport};
pub use omdb::OmdbClient;
pub use tmdb::{TmdbClient, TmdbMatch};
