//! Layered configuration loading.
//!
//! Sources, each overriding the ones before it:
//!
//! 1. Built-in defaults, then values passed to [`ConfigLoader::merge`]
//! 2. `lynx.<profile>.<ext>` next to the main file
//! 3. The main file, `lynx.toml` (feature `toml-config`) or `lynx.yaml` /
//!    `lynx.yml` (feature `yaml-config`)
//! 4. `LYNX_`-prefixed environment variables, `__` separating sections:
//!    `LYNX_CHANNEL__CHANNEL_SECRET=...`, `LYNX_SERVER__PORT=9000`
//!
//! Without an explicit [`ConfigLoader::file`], the main file is looked up in
//! the working directory and then in `<user config dir>/lynx`.

use std::fmt;
use std::path::{Path, PathBuf};

use figment::Figment;
#[cfg(any(feature = "toml-config", feature = "yaml-config"))]
use figment::providers::Format;
#[cfg(feature = "toml-config")]
use figment::providers::Toml;
#[cfg(feature = "yaml-config")]
use figment::providers::Yaml;
use figment::providers::{Env, Serialized};
use tracing::{debug, info, warn};

use super::error::{ConfigError, ConfigResult};
use super::schema::LynxConfig;

const FILE_STEM: &str = "lynx";
const ENV_PREFIX: &str = "LYNX_";
const PROFILE_VAR: &str = "LYNX_PROFILE";

/// Name of the deployment whose `lynx.<profile>.<ext>` file is merged.
///
/// `dev` and `prod` are aliases of `development` and `production`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile(String);

impl Profile {
    pub fn parse(name: &str) -> Self {
        let name = name.trim().to_lowercase();
        match name.as_str() {
            "" | "dev" => Self::default(),
            "prod" => Self("production".to_string()),
            _ => Self(name),
        }
    }

    /// Reads `LYNX_PROFILE`, defaulting to `development`.
    pub fn from_env() -> Self {
        std::env::var(PROFILE_VAR)
            .map(|name| Self::parse(&name))
            .unwrap_or_default()
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self("development".to_string())
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A configuration file format compiled into this build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFormat {
    #[cfg(feature = "toml-config")]
    Toml,
    #[cfg(feature = "yaml-config")]
    Yaml,
}

impl FileFormat {
    const ENABLED: &'static [FileFormat] = &[
        #[cfg(feature = "toml-config")]
        FileFormat::Toml,
        #[cfg(feature = "yaml-config")]
        FileFormat::Yaml,
    ];

    fn extensions(self) -> &'static [&'static str] {
        match self {
            #[cfg(feature = "toml-config")]
            Self::Toml => &["toml"],
            #[cfg(feature = "yaml-config")]
            Self::Yaml => &["yaml", "yml"],
        }
    }

    fn of(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        Self::ENABLED
            .iter()
            .copied()
            .find(|format| format.extensions().contains(&ext))
    }

    fn merge_into(self, figment: Figment, path: &Path) -> Figment {
        match self {
            #[cfg(feature = "toml-config")]
            Self::Toml => figment.merge(Toml::file(path)),
            #[cfg(feature = "yaml-config")]
            Self::Yaml => figment.merge(Yaml::file(path)),
        }
    }
}

/// Builder collecting configuration sources.
///
/// ```rust,ignore
/// let config = ConfigLoader::new()
///     .file("deploy/lynx.toml")
///     .profile("production")
///     .load()?;
/// ```
pub struct ConfigLoader {
    overrides: Figment,
    profile: Profile,
    search_paths: Vec<PathBuf>,
    explicit_file: Option<PathBuf>,
    read_env: bool,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            overrides: Figment::new(),
            profile: Profile::from_env(),
            search_paths: Vec::new(),
            explicit_file: None,
            read_env: true,
        }
    }

    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.profile = Profile::parse(profile.as_ref());
        self
    }

    /// Looks for the main file in `dir`; replaces the default directories.
    pub fn search_path(mut self, dir: impl AsRef<Path>) -> Self {
        self.search_paths.push(dir.as_ref().to_path_buf());
        self
    }

    /// Loads exactly this file instead of searching.
    pub fn file(mut self, path: impl AsRef<Path>) -> Self {
        self.explicit_file = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn without_env(mut self) -> Self {
        self.read_env = false;
        self
    }

    /// Values set in code; files and environment still override them.
    pub fn merge(mut self, config: LynxConfig) -> Self {
        self.overrides = self.overrides.merge(Serialized::defaults(config));
        self
    }

    pub fn load(self) -> ConfigResult<LynxConfig> {
        let mut figment = Figment::from(Serialized::defaults(LynxConfig::default()))
            .merge(self.overrides.clone());

        for path in self.files()? {
            let format = FileFormat::of(&path)
                .ok_or_else(|| ConfigError::UnsupportedFormat(path.clone()))?;
            info!(path = %path.display(), "Loading configuration file");
            figment = format.merge_into(figment, &path);
        }

        if self.read_env {
            figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));
        }

        let config: LynxConfig = figment.extract()?;
        debug!(profile = %self.profile, port = config.server.port, "Configuration loaded");
        Ok(config)
    }

    /// Files to merge, lowest priority first.
    fn files(&self) -> ConfigResult<Vec<PathBuf>> {
        if let Some(path) = &self.explicit_file {
            if !path.exists() {
                return Err(ConfigError::FileNotFound(path.clone()));
            }
            return Ok(vec![path.clone()]);
        }

        let dirs = self.directories();
        let mut files = Vec::new();
        for format in FileFormat::ENABLED {
            if let Some(main) = self.find_main_file(*format, &dirs) {
                files.extend(self.profile_file(&main));
                files.push(main);
            }
        }
        if files.is_empty() {
            warn!(dirs = ?dirs, "No configuration file found, using defaults");
        }
        Ok(files)
    }

    fn directories(&self) -> Vec<PathBuf> {
        if !self.search_paths.is_empty() {
            return self.search_paths.clone();
        }
        std::env::current_dir()
            .ok()
            .into_iter()
            .chain(dirs::config_dir().map(|dir| dir.join(FILE_STEM)))
            .collect()
    }

    fn find_main_file(&self, format: FileFormat, dirs: &[PathBuf]) -> Option<PathBuf> {
        dirs.iter()
            .flat_map(|dir| {
                format
                    .extensions()
                    .iter()
                    .map(move |ext| dir.join(format!("{FILE_STEM}.{ext}")))
            })
            .find(|path| path.is_file())
    }

    /// `lynx.<profile>.<ext>` beside `main`, if present.
    fn profile_file(&self, main: &Path) -> Option<PathBuf> {
        let ext = main.extension()?.to_str()?;
        let path = main.with_file_name(format!("{FILE_STEM}.{}.{ext}", self.profile));
        path.is_file().then(|| {
            debug!(path = %path.display(), "Found profile configuration");
            path
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogLevel;
    use figment::Jail;

    #[test]
    fn test_defaults_without_files() {
        Jail::expect_with(|_jail| {
            let config = ConfigLoader::new()
                .search_path(".")
                .without_env()
                .load()
                .map_err(|e| e.to_string())?;

            assert_eq!(config.logging.level, LogLevel::Info);
            assert_eq!(config.server.port, 8080);
            Ok(())
        });
    }

    #[test]
    fn test_profile_aliases() {
        assert_eq!(Profile::parse("prod"), Profile::parse("production"));
        assert_eq!(Profile::parse(" Dev "), Profile::default());
        assert_eq!(Profile::parse("Staging").name(), "staging");
    }

    #[test]
    fn test_profile_from_env() {
        Jail::expect_with(|jail| {
            jail.set_env(PROFILE_VAR, "prod");
            assert_eq!(Profile::from_env().name(), "production");
            Ok(())
        });
    }

    #[test]
    fn test_file_and_env_layers() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "lynx.toml",
                r#"
                    [channel]
                    channel_secret = "from-file"
                    channel_access_token = "token"

                    [server]
                    port = 9000

                    [logging]
                    level = "debug"
                "#,
            )?;
            jail.set_env("LYNX_SERVER__PORT", "9100");

            let config = ConfigLoader::new()
                .search_path(".")
                .load()
                .map_err(|e| e.to_string())?;

            assert_eq!(config.channel.channel_secret, "from-file");
            assert_eq!(config.server.port, 9100);
            assert_eq!(config.server.path, "/callback");
            assert_eq!(config.logging.level, LogLevel::Debug);
            Ok(())
        });
    }

    #[test]
    fn test_profile_file_sits_under_main_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "lynx.production.toml",
                "[server]\nport = 7000\nhost = \"127.0.0.1\"",
            )?;
            jail.create_file("lynx.toml", "[server]\nport = 9000")?;

            let config = ConfigLoader::new()
                .profile("prod")
                .search_path(".")
                .without_env()
                .load()
                .map_err(|e| e.to_string())?;

            assert_eq!(config.server.port, 9000);
            assert_eq!(config.server.host, "127.0.0.1");
            Ok(())
        });
    }

    #[test]
    fn test_code_values_sit_under_files() {
        Jail::expect_with(|jail| {
            jail.create_file("lynx.toml", "[server]\nport = 9000")?;

            let mut config = LynxConfig::default();
            config.server.port = 1234;
            config.messages.max_per_reply = 3;

            let config = ConfigLoader::new()
                .merge(config)
                .search_path(".")
                .without_env()
                .load()
                .map_err(|e| e.to_string())?;

            assert_eq!(config.server.port, 9000);
            assert_eq!(config.messages.max_per_reply, 3);
            Ok(())
        });
    }

    #[test]
    fn test_missing_explicit_file() {
        let result = ConfigLoader::new().file("does/not/exist.toml").load();
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_unsupported_extension() {
        Jail::expect_with(|jail| {
            jail.create_file("lynx.ini", "port = 1")?;
            let result = ConfigLoader::new().file("lynx.ini").without_env().load();
            assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
            Ok(())
        });
    }

    #[test]
    fn test_malformed_value_fails_extraction() {
        Jail::expect_with(|jail| {
            jail.create_file("lynx.toml", "[server]\nport = \"not a port\"")?;
            let result = ConfigLoader::new().search_path(".").without_env().load();
            assert!(matches!(result, Err(ConfigError::Extract(_))));
            Ok(())
        });
    }
}
