mod sonarr;

pub use sonarr::SonarrArgs;

use crate::config::LinkConfig;

/// A library backend that knows how to find episode files and link them under the shared
/// [`LinkConfig`]. Flags come from the implementor's `clap::Args` derive.
pub trait Workflow {
    fn exec(self, link_config: &LinkConfig) -> anyhow::Result<()>;
}
