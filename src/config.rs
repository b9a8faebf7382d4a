use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::cli::{GlobalArgs, RunArgs};
use crate::error::{Error, Result};

const APP_NAME: &str = "lotwatch";
const DEFAULT_REPORTS_DIR: &str = "reports";

/// Optional settings from config.toml. CLI flags take precedence.
#[derive(Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub database: Option<PathBuf>,
    pub reports_dir: Option<PathBuf>,
}

impl FileConfig {
    pub fn parse(text: &str, path: &Path) -> Result<Self> {
        toml::from_str(text).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn read(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(Error::io(path))?;
        Self::parse(&text, path)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// `None` selects the store's platform default location.
    pub database: Option<PathBuf>,
    pub reports_dir: PathBuf,
    pub overwrite: bool,
    pub json_output: bool,
    pub verbose: bool,
}

impl Config {
    /// Resolves settings from flags, then the config file, then defaults.
    pub fn load(args: &GlobalArgs) -> Result<Self> {
        let file = match &args.config {
            Some(path) => FileConfig::read(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => FileConfig::read(&path)?,
                _ => FileConfig::default(),
            },
        };

        Ok(Self::resolve(args, file))
    }

    fn resolve(args: &GlobalArgs, file: FileConfig) -> Self {
        Config {
            database: args.database.clone().or(file.database),
            reports_dir: file.reports_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_REPORTS_DIR)),
            overwrite: false,
            json_output: false,
            verbose: args.verbose,
        }
    }

    pub fn with_run_args(mut self, args: &RunArgs) -> Self {
        if let Some(dir) = &args.reports_dir {
            self.reports_dir = dir.clone();
        }
        self.overwrite = args.overwrite;
        self.json_output = args.json;
        self
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("", "", APP_NAME)
}

fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(database: Option<&str>) -> GlobalArgs {
        GlobalArgs {
            config: None,
            database: database.map(PathBuf::from),
            verbose: false,
        }
    }

    #[test]
    fn file_config_parses_known_keys() {
        let file = FileConfig::parse(
            "database = \"/var/lib/lotwatch/lot.db\"\nreports_dir = \"/srv/reports\"\n",
            Path::new("config.toml"),
        )
        .unwrap();

        assert_eq!(file.database, Some(PathBuf::from("/var/lib/lotwatch/lot.db")));
        assert_eq!(file.reports_dir, Some(PathBuf::from("/srv/reports")));
    }

    #[test]
    fn file_config_rejects_unknown_keys() {
        let err = FileConfig::parse("databse = \"x\"\n", Path::new("config.toml")).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn flag_overrides_file_database() {
        let file = FileConfig {
            database: Some(PathBuf::from("from-file.db")),
            reports_dir: Some(PathBuf::from("out")),
        };
        let config = Config::resolve(&args(Some("from-flag.db")), file);

        assert_eq!(config.database, Some(PathBuf::from("from-flag.db")));
        assert_eq!(config.reports_dir, PathBuf::from("out"));
    }

    #[test]
    fn reports_dir_defaults_to_reports() {
        let config = Config::resolve(&args(Some("x.db")), FileConfig::default());
        assert_eq!(config.reports_dir, PathBuf::from("reports"));
        assert!(!config.overwrite);
    }

    #[test]
    fn database_unset_leaves_default_to_store() {
        let config = Config::resolve(&args(None), FileConfig::default());
        assert_eq!(config.database, None);
    }
}
