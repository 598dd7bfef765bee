//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

const PROJECT_FILES: [&str; 2] = ["arena.toml", ".arena.toml"];

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. `ARENA_*` environment variables, `__` separating nested keys
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./arena.toml` or `./.arena.toml`
    /// 4. XDG config: `$XDG_CONFIG_HOME/prompt-arena/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&PathBuf>) -> Result<FileConfig, Box<figment::Error>> {
        Self::figment(
            Self::global_config_path().as_deref(),
            Path::new("."),
            config_path.map(PathBuf::as_path),
        )?
        .merge(Env::prefixed("ARENA_").split("__"))
        .extract()
        .map_err(Box::new)
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// File layers without the environment, lowest priority first
    fn figment(
        global: Option<&Path>,
        project_dir: &Path,
        explicit: Option<&Path>,
    ) -> Result<Figment, Box<figment::Error>> {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(global_path) = global
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        if let Some(project_path) = Self::find_project_file(project_dir) {
            figment = figment.merge(Toml::file(project_path));
        }

        // A missing explicit file is an error rather than silently skipped
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(Box::new(figment::Error::from(format!(
                    "config file not found: {}",
                    path.display()
                ))));
            }
            figment = figment.merge(Toml::file(path));
        }

        Ok(figment)
    }

    /// Get the global config file path
    ///
    /// Returns `$XDG_CONFIG_HOME/prompt-arena/config.toml` if set, otherwise
    /// the platform config directory.
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("prompt-arena").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        Self::find_project_file(Path::new("."))
    }

    fn find_project_file(dir: &Path) -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists())
    }

    /// Print the config file locations being used (for debugging)
    pub fn print_config_sources(explicit: Option<&PathBuf>) {
        println!("Configuration sources (in priority order):");
        println!("  [     ] Env:     ARENA_* variables");

        if let Some(path) = explicit {
            let tag = if path.exists() { "FOUND" } else { "MISSING" };
            println!("  [{:^5}] Explicit: {}", tag, path.display());
        }

        if let Some(path) = Self::project_config_path() {
            println!("  [FOUND] Project: {}", path.display());
        } else {
            println!("  [     ] Project: ./arena.toml or ./.arena.toml");
        }

        if let Some(path) = Self::global_config_path() {
            if path.exists() {
                println!("  [FOUND] Global:  {}", path.display());
            } else {
                println!("  [     ] Global:  {}", path.display());
            }
        }

        println!("  [     ] Default: built-in defaults");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert_eq!(config.battle.max_rounds, 5);
        assert!(config.output.color);
    }

    #[test]
    fn test_global_config_path_returns_some() {
        // Should return a path (even if file doesn't exist)
        let path = ConfigLoader::global_config_path();
        assert!(path.is_some());
        assert!(path.unwrap().to_string_lossy().contains("prompt-arena"));
    }

    #[test]
    fn test_layers_merge_in_priority_order() {
        let dir = tempfile::tempdir().unwrap();
        let global = dir.path().join("global.toml");
        fs::write(
            &global,
            "[battle]\nmax_rounds = 8\nmax_plateau = 4\n[dispatcher]\nmin_interval_ms = 2000\n",
        )
        .unwrap();

        let project_dir = dir.path().join("project");
        fs::create_dir(&project_dir).unwrap();
        fs::write(project_dir.join(".arena.toml"), "[battle]\nmax_rounds = 6\n").unwrap();

        let explicit = dir.path().join("explicit.toml");
        fs::write(&explicit, "[dispatcher]\nmin_interval_ms = 500\n").unwrap();

        let config: FileConfig =
            ConfigLoader::figment(Some(&global), &project_dir, Some(&explicit))
                .unwrap()
                .extract()
                .unwrap();

        assert_eq!(config.battle.max_rounds, 6);
        assert_eq!(config.battle.max_plateau, 4);
        assert_eq!(config.dispatcher.min_interval_ms, 500);
        // Fields nobody set keep their defaults
        assert_eq!(config.retry.max_attempts, 3);
    }

    #[test]
    fn test_arena_toml_wins_over_dotfile() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("arena.toml"), "[battle]\nmax_rounds = 2\n").unwrap();
        fs::write(dir.path().join(".arena.toml"), "[battle]\nmax_rounds = 9\n").unwrap();

        let config: FileConfig = ConfigLoader::figment(None, dir.path(), None)
            .unwrap()
            .extract()
            .unwrap();
        assert_eq!(config.battle.max_rounds, 2);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(ConfigLoader::figment(None, dir.path(), Some(&missing)).is_err());
    }

    #[test]
    fn test_invalid_value_type_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("arena.toml"), "[battle]\nmax_rounds = \"many\"\n").unwrap();
        let result: Result<FileConfig, _> = ConfigLoader::figment(None, dir.path(), None)
            .unwrap()
            .extract();
        assert!(result.is_err());
    }
}
