//! API Domain Module
//!
//! External API families fronted by the cache, their source tags, TTLs, and
//! the cache keys their clients use.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::config::Config;
use crate::error::CacheError;

/// One cached external API family. Each gets its own facade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiDomain {
    TmdbSearch,
    TmdbDetails,
    OmdbRatings,
}

impl ApiDomain {
    pub const ALL: [ApiDomain; 3] = [
        ApiDomain::TmdbSearch,
        ApiDomain::TmdbDetails,
        ApiDomain::OmdbRatings,
    ];

    /// Cache name used in logs, reports and the admin API.
    pub fn name(self) -> &'static str {
        match self {
            ApiDomain::TmdbSearch => "tmdb-search",
            ApiDomain::TmdbDetails => "tmdb-details",
            ApiDomain::OmdbRatings => "omdb-ratings",
        }
    }

    /// `api_source` tag written to the persistent store.
    pub fn api_source(self) -> &'static str {
        match self {
            ApiDomain::TmdbSearch | ApiDomain::TmdbDetails => "tmdb",
            ApiDomain::OmdbRatings => "omdb",
        }
    }

    /// Configured TTL. Search results churn faster than canonical details.
    pub fn ttl(self, config: &Config) -> Duration {
        match self {
            ApiDomain::TmdbSearch => config.tmdb_search_ttl,
            ApiDomain::TmdbDetails => config.tmdb_details_ttl,
            ApiDomain::OmdbRatings => config.omdb_ratings_ttl,
        }
    }
}

impl fmt::Display for ApiDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ApiDomain {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ApiDomain::ALL
            .into_iter()
            .find(|domain| domain.name() == s)
            .ok_or_else(|| CacheError::UnknownCache(s.to_string()))
    }
}

// == Cache Keys ==
/// Key for a TMDB search. Queries are case- and whitespace-normalized so
/// "Dune " and "dune" share an entry; a missing media type means `multi`.
pub fn search_key(query: &str, media_type: Option<&str>) -> String {
    format!(
        "search:{}:{}",
        query.trim().to_lowercase(),
        media_type.unwrap_or("multi")
    )
}

/// Key for TMDB movie/tv details.
pub fn details_key(media_type: &str, id: impl fmt::Display) -> String {
    format!("details:{media_type}:{id}")
}

/// Key for OMDb ratings of an IMDb title.
pub fn ratings_key(imdb_id: &str) -> String {
    format!("ratings:{imdb_id}")
}
