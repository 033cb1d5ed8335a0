use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;
use url::Url;

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    /// Sonarr's own id, not the TVDB id used to look the series up.
    pub id: i64,
    pub title: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeFile {
    pub season_number: u32,
    /// Path as seen by Sonarr, which may differ from the path on this host.
    pub path: String,
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub scene_name: String,
}

fn deserialize_nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(<Option<String>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("invalid endpoint url")]
    Url(#[from] url::ParseError),
    #[error(transparent)]
    Http(#[from] ureq::Error),
    #[error("malformed response")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum SonarrError {
    #[error("invalid sonarr url {url:?}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("unable to get series for tvdb id {tvdb_id}")]
    GetSeries {
        tvdb_id: i64,
        #[source]
        source: RequestError,
    },
    #[error("no series found for tvdb id {tvdb_id}")]
    SeriesNotFound { tvdb_id: i64 },
    #[error("unable to get episode files for series {series_id} ({title})")]
    GetEpisodeFiles {
        series_id: i64,
        title: String,
        #[source]
        source: RequestError,
    },
}

pub trait SeriesLibrary {
    /// Looks up a series by TVDB id.
    fn series(&self, tvdb_id: i64) -> Result<Series, SonarrError>;

    /// Lists every episode file on disk for `series`. May be empty.
    fn episode_files(&self, series: &Series) -> Result<Vec<EpisodeFile>, SonarrError>;
}

pub struct SonarrClient {
    agent: ureq::Agent,
    base_url: Url,
    api_key: String,
}

impl SonarrClient {
    pub fn new(url: &str, api_key: &str) -> Result<Self, SonarrError> {
        let mut base_url = Url::parse(url).map_err(|source| SonarrError::InvalidUrl {
            url: url.to_owned(),
            source,
        })?;
        // Sonarr is often served under a prefix like /sonarr; keep it when joining endpoints.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            agent: ureq::Agent::new_with_defaults(),
            base_url,
            api_key: api_key.to_owned(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, url::ParseError> {
        self.base_url.join(path)
    }

    fn get<T: DeserializeOwned>(&self, path: &str, query: (&str, String)) -> Result<T, RequestError> {
        let url = self.endpoint(path)?;
        debug!(%url, key = query.0, value = %query.1, "sonarr request");
        let body = self
            .agent
            .get(url.as_str())
            .header("X-Api-Key", self.api_key.as_str())
            .query(query.0, query.1)
            .call()?
            .body_mut()
            .read_to_string()?;
        Ok(serde_json::from_str(&body)?)
    }
}

impl SeriesLibrary for SonarrClient {
    fn series(&self, tvdb_id: i64) -> Result<Series, SonarrError> {
        let series = self
            .get("api/v3/series", ("tvdbId", tvdb_id.to_string()))
            .map_err(|source| SonarrError::GetSeries { tvdb_id, source })?;
        first_series(series, tvdb_id)
    }

    fn episode_files(&self, series: &Series) -> Result<Vec<EpisodeFile>, SonarrError> {
        self.get("api/v3/episodefile", ("seriesId", series.id.to_string()))
            .map_err(|source| SonarrError::GetEpisodeFiles {
                series_id: series.id,
                title: series.title.clone(),
                source,
            })
    }
}

/// Sonarr answers a TVDB lookup with a list; only the first entry is meaningful.
fn first_series(series: Vec<Series>, tvdb_id: i64) -> Result<Series, SonarrError> {
    series
        .into_iter()
        .next()
        .ok_or(SonarrError::SeriesNotFound { tvdb_id })
}
