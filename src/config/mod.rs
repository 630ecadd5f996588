use std::env;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
pub struct ConfigFile {
    pub input: Option<String>,
    pub output: Option<String>,
    pub output_format: Option<String>,
    pub page_size: Option<usize>,
    pub page: Option<usize>,
    #[serde(alias = "sample_group")]
    pub group: Option<usize>,
    pub show_pending: Option<bool>,
    pub interactive: Option<bool>,
    pub no_color: Option<bool>,
}

fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("USERPROFILE").map(PathBuf::from))
        .or_else(|| {
            let drive = env::var_os("HOMEDRIVE")?;
            let path = env::var_os("HOMEPATH")?;
            Some(PathBuf::from(drive).join(path))
        })
}

pub fn default_config_path() -> Option<PathBuf> {
    Some(home_dir()?.join(".featurescope").join("config.yml"))
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        if let Some(home) = home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

pub fn parse_config(contents: &str) -> Result<ConfigFile, serde_yaml::Error> {
    if contents.trim().is_empty() {
        return Ok(ConfigFile::default());
    }
    serde_yaml::from_str::<ConfigFile>(contents)
}

pub fn load_config(path: &PathBuf, allow_missing: bool) -> Result<ConfigFile, String> {
    match std::fs::read_to_string(path) {
        Ok(contents) => parse_config(&contents)
            .map_err(|e| format!("failed to parse config '{}': {e}", path.display())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && allow_missing => {
            Ok(ConfigFile::default())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(format!("config file not found '{}'", path.display()))
        }
        Err(e) => Err(format!("failed to read config '{}': {e}", path.display())),
    }
}

fn default_config_yaml() -> String {
    r#"# featurescope config
#
# Location (default):
#   ~/.featurescope/config.yml

# Feature document (JSON or YAML)
# input: ./feature.json

# Output (optional; prints to stdout when unset)
# output: ./feature.html
# output_format: html

# Paging
page_size: 5
page: 1
# group: 0

# Render trailing token bytes that never decode
show_pending: false

interactive: false

# Output styling
no_color: false
"#
    .to_string()
}

pub fn ensure_default_config_file(path: &PathBuf) -> Result<bool, String> {
    if path.exists() {
        return Ok(false);
    }
    let parent = path
        .parent()
        .ok_or_else(|| format!("invalid config path '{}'", path.display()))?;
    std::fs::create_dir_all(parent).map_err(|e| {
        format!(
            "failed to create config directory '{}': {e}",
            parent.display()
        )
    })?;
    std::fs::write(path, default_config_yaml())
        .map_err(|e| format!("failed to write config file '{}': {e}", path.display()))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_template_parses() {
        let cfg = parse_config(&default_config_yaml()).unwrap();
        assert_eq!(cfg.page_size, Some(5));
        assert_eq!(cfg.page, Some(1));
        assert_eq!(cfg.show_pending, Some(false));
        assert_eq!(cfg.input, None);
    }

    #[test]
    fn empty_config_is_default() {
        assert_eq!(parse_config("  \n").unwrap(), ConfigFile::default());
    }

    #[test]
    fn group_alias_is_accepted() {
        let cfg = parse_config("sample_group: 2\n").unwrap();
        assert_eq!(cfg.group, Some(2));
    }

    #[test]
    fn missing_config_is_allowed_when_requested() {
        let path = PathBuf::from("/nonexistent/featurescope/config.yml");
        assert_eq!(load_config(&path, true).unwrap(), ConfigFile::default());
        assert!(load_config(&path, false).is_err());
    }

    #[test]
    fn plain_paths_are_not_expanded() {
        assert_eq!(expand_tilde("data/f.json"), PathBuf::from("data/f.json"));
    }
}
