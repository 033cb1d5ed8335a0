use std::ffi::OsString;
use std::path::{Path, PathBuf};

use console::Style;
use thiserror::Error;

use crate::config::LinkConfig;
use crate::fs::Filesystem;
use crate::sonarr::{EpisodeFile, Series};

/// Rewrites paths as recorded by the library service into paths visible on this host, e.g. when
/// the media share is mounted at `/data` for Sonarr but at `/mnt/media` here.
#[derive(Clone, Debug, PartialEq)]
pub struct PathMap {
    from: String,
    to: PathBuf,
}

impl PathMap {
    /// Returns `None` unless both sides are set and non-empty.
    pub fn new(from: Option<String>, to: Option<String>) -> Option<Self> {
        match (from, to) {
            (Some(from), Some(to)) if !from.is_empty() && !to.is_empty() => Some(Self {
                from,
                to: to.into(),
            }),
            _ => None,
        }
    }

    /// Whether `path` starts with the `from` prefix.
    pub fn matches(&self, path: &str) -> bool {
        path.starts_with(&self.from)
    }

    /// Strips `from` when it is a literal string prefix of `path` and joins what remains onto
    /// `to`. A path without the prefix is joined onto `to` as a whole.
    pub fn map(&self, path: &str) -> PathBuf {
        let remainder = path
            .strip_prefix(self.from.as_str())
            .unwrap_or(path)
            .trim_start_matches(std::path::MAIN_SEPARATOR);
        self.to.join(remainder).components().collect()
    }
}

/// Identity when `path_map` is `None`.
pub fn map_path(path: &str, path_map: Option<&PathMap>) -> PathBuf {
    match path_map {
        Some(path_map) => path_map.map(path),
        None => PathBuf::from(path),
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LinkPlan {
    /// The existing file, after path mapping.
    pub source: PathBuf,
    /// The season directory that has to exist before linking.
    pub directory: PathBuf,
    pub destination: PathBuf,
}

/// e.g. `Breaking.Bad.S01`.
pub fn season_dir_name(title: &str, season: u32) -> String {
    format!("{}.S{season:02}", title.replace(' ', "."))
}

fn link_file_name(scene_name: &str, original: &Path) -> OsString {
    let mut name = OsString::from(scene_name);
    if let Some(extension) = original.extension() {
        name.push(".");
        name.push(extension);
    }
    name
}

pub fn plan(config: &LinkConfig, series: &Series, file: &EpisodeFile) -> LinkPlan {
    let directory = config
        .destination_root
        .join(season_dir_name(&series.title, file.season_number));
    let destination = directory.join(link_file_name(&file.scene_name, Path::new(&file.path)));
    LinkPlan {
        source: map_path(&file.path, config.path_map.as_ref()),
        directory,
        destination,
    }
}

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("unable to create destination {}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(
        "unable to create link at {}: {} is on a different filesystem",
        .link.display(),
        .original.display()
    )]
    CrossDevice {
        original: PathBuf,
        link: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unable to create link at {}", .link.display())]
    Link {
        original: PathBuf,
        link: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LinkError {
    fn link_failed(plan: &LinkPlan, source: std::io::Error) -> Self {
        let (original, link) = (plan.source.clone(), plan.destination.clone());
        if source.kind() == std::io::ErrorKind::CrossesDevices {
            Self::CrossDevice {
                original,
                link,
                source,
            }
        } else {
            Self::Link {
                original,
                link,
                source,
            }
        }
    }
}

/// Creates every planned link in order, printing each one as it is created. Stops at the first
/// failure; links created before it are left in place.
pub fn execute(fs: &dyn Filesystem, plans: &[LinkPlan]) -> Result<(), LinkError> {
    let cyan = Style::new().cyan();
    for plan in plans {
        fs.create_dir_all(&plan.directory)
            .map_err(|source| LinkError::CreateDir {
                path: plan.directory.clone(),
                source,
            })?;
        fs.hard_link(&plan.source, &plan.destination)
            .map_err(|source| LinkError::link_failed(plan, source))?;
        println!("created link {}", cyan.apply_to(plan.destination.display()));
    }
    Ok(())
}
