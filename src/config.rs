use crate::organizer::GroupBy;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub source_directory: PathBuf,
    pub destination_directory: Option<PathBuf>,
    pub group_by: GroupBy,
    pub log_level: String,
    pub dry_run: bool,
    pub report_path: Option<PathBuf>,
}

/// Values given on the command line; `None` leaves lower layers in place.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub source_directory: Option<PathBuf>,
    pub destination_directory: Option<PathBuf>,
    pub group_by: Option<GroupBy>,
    pub log_level: Option<String>,
    pub dry_run: bool,
    pub report_path: Option<PathBuf>,
}

fn path_value(path: Option<&PathBuf>) -> Option<String> {
    path.map(|p| p.to_string_lossy().into_owned())
}

impl AppConfig {
    /// Layers defaults, the config file, `WHICHCAM_*` variables and
    /// command-line overrides, in that order.
    pub fn new(config_file: Option<&Path>, overrides: &Overrides) -> Result<Self, ConfigError> {
        let file = match config_file {
            Some(path) => File::from(path).required(true),
            None => File::with_name("config/default").required(false),
        };

        let group_by = overrides.group_by.map(|g| match g {
            GroupBy::Maker => "maker",
            GroupBy::Model => "model",
        });

        let mut builder = Config::builder()
            .set_default("group_by", "maker")?
            .set_default("log_level", "info")?
            .set_default("dry_run", false)?
            .add_source(file)
            .add_source(Environment::with_prefix("WHICHCAM"))
            .set_override_option("source_directory", path_value(overrides.source_directory.as_ref()))?
            .set_override_option(
                "destination_directory",
                path_value(overrides.destination_directory.as_ref()),
            )?
            .set_override_option("group_by", group_by)?
            .set_override_option("log_level", overrides.log_level.clone())?
            .set_override_option("report_path", path_value(overrides.report_path.as_ref()))?;
        if overrides.dry_run {
            builder = builder.set_override("dry_run", true)?;
        }

        builder.build()?.try_deserialize()
    }

    /// Where organized copies go; the source directory when unset.
    pub fn destination(&self) -> &Path {
        self.destination_directory
            .as_deref()
            .unwrap_or(&self.source_directory)
    }
}
