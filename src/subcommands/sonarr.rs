use anyhow::Context;
use clap::Args;
use tracing::{debug, warn};

use crate::config::{self, LinkConfig, SonarrConfig};
use crate::fs::{Filesystem, PosixFilesystem};
use crate::link::{self, LinkPlan};
use crate::sonarr::{SeriesLibrary, SonarrClient};
use crate::subcommands::Workflow;
use crate::util;

#[derive(Args)]
pub struct SonarrArgs {
    /// The Sonarr url [env: SONARR_URL].
    #[arg(long, value_name = "URL")]
    sonarr_url: Option<String>,

    /// The Sonarr API key [env: SONARR_KEY].
    #[arg(long, value_name = "KEY")]
    sonarr_key: Option<String>,

    /// The TVDB id of the series to link.
    #[arg(long, value_name = "ID", default_value_t = -1, allow_negative_numbers = true)]
    series: i64,
}

impl Workflow for SonarrArgs {
    fn exec(self, link_config: &LinkConfig) -> anyhow::Result<()> {
        let config = SonarrConfig::resolve(
            self.sonarr_url,
            self.sonarr_key,
            self.series,
            config::env_lookup,
        )?;
        let client = SonarrClient::new(&config.url, &config.api_key).context("sonarr")?;
        link_series(&client, &PosixFilesystem, config.series_id, link_config).context("sonarr")
    }
}

/// Looks up the series with TVDB id `tvdb_id` in `library` and links every episode file into
/// `config.destination_root`.
pub fn link_series(
    library: &dyn SeriesLibrary,
    fs: &dyn Filesystem,
    tvdb_id: i64,
    config: &LinkConfig,
) -> anyhow::Result<()> {
    let spinner = util::new_progress_spinner(format!("looking up series {tvdb_id}"));
    let series = library.series(tvdb_id)?;
    spinner.set_message(format!("listing episode files for {}", series.title));
    let files = library.episode_files(&series)?;
    spinner.finish_and_clear();
    debug!(id = series.id, title = %series.title, files = files.len(), "fetched series");

    let plans = files
        .iter()
        .map(|file| {
            if file.scene_name.is_empty() {
                warn!(path = %file.path, "episode file has no scene name");
            }
            if config
                .path_map
                .as_ref()
                .is_some_and(|path_map| !path_map.matches(&file.path))
            {
                warn!(path = %file.path, "episode file path does not start with -map-from");
            }
            let plan = link::plan(config, &series, file);
            debug!(source = %plan.source.display(), destination = %plan.destination.display(), "planned link");
            plan
        })
        .collect::<Vec<LinkPlan>>();

    link::execute(fs, &plans)?;
    Ok(())
}
