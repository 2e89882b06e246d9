use std::path::{Path, PathBuf};

/// Default JDK version string used for `jdk` profile activation when
/// neither `--jdk` nor the environment tells us otherwise. Matches the
/// current LTS line so profiles targeting recent JDKs activate
/// out of the box.
const DEFAULT_JDK_VERSION: &str = "21.0.2";

/// Everything a resolution run is parameterized by: the facts profile
/// activation compares against, the local repository root, and the seed
/// properties supplied on the command line.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    pub jdk_version: String,
    pub os_name: String,
    pub os_family: String,
    pub os_arch: String,
    pub os_version: String,
    pub m2_home: PathBuf,
    pub color: bool,
    /// `-D name=value` properties, seeded into `initial_props` ahead of
    /// anything declared in a POM.
    pub initial_properties: Vec<(String, String)>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        ResolverConfig {
            jdk_version: DEFAULT_JDK_VERSION.to_string(),
            os_name: detected_os_name().to_string(),
            os_family: detected_os_family().to_string(),
            os_arch: detected_os_arch().to_string(),
            os_version: String::new(),
            m2_home: default_m2_home(),
            color: true,
            initial_properties: Vec::new(),
        }
    }
}

impl ResolverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_jdk_version(mut self, version: impl Into<String>) -> Self {
        self.jdk_version = version.into();
        self
    }

    pub fn with_m2_home(mut self, path: impl Into<PathBuf>) -> Self {
        self.m2_home = path.into();
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.initial_properties.push((name.into(), value.into()));
        self
    }

    /// `<m2_home>/<g-with-slashes>/<a>/<v>/<a>-<v>.pom`
    pub fn local_pom_path(&self, group_id: &str, artifact_id: &str, version: &str) -> PathBuf {
        let mut path = self.m2_home.clone();
        for segment in group_id.split('.') {
            path.push(segment);
        }
        path.push(artifact_id);
        path.push(version);
        path.push(format!("{artifact_id}-{version}.pom"));
        path
    }

    /// Directory under which all versions of an artifact live, used by
    /// the range resolver to enumerate candidates.
    pub fn local_artifact_dir(&self, group_id: &str, artifact_id: &str) -> PathBuf {
        let mut path = self.m2_home.clone();
        for segment in group_id.split('.') {
            path.push(segment);
        }
        path.push(artifact_id);
        path
    }

    pub fn is_under_repository(&self, file: &Path) -> bool {
        file.starts_with(&self.m2_home)
    }
}

fn default_m2_home() -> PathBuf {
    if let Ok(override_home) = std::env::var("M2_HOME") {
        return PathBuf::from(override_home);
    }
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    Path::new(&home).join(".m2").join("repository")
}

fn detected_os_name() -> &'static str {
    std::env::consts::OS
}

fn detected_os_family() -> &'static str {
    std::env::consts::FAMILY
}

fn detected_os_arch() -> &'static str {
    std::env::consts::ARCH
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_jdk_matches_expected_lts() {
        let config = ResolverConfig::default();
        assert_eq!(config.jdk_version, "21.0.2");
    }

    #[test]
    fn m2_home_override_is_respected() {
        std::env::set_var("M2_HOME", "/custom/repo");
        let config = ResolverConfig::default();
        assert_eq!(config.m2_home, PathBuf::from("/custom/repo"));
        std::env::remove_var("M2_HOME");
    }

    #[test]
    fn local_pom_path_builds_expected_layout() {
        let config = ResolverConfig::default().with_m2_home("/repo");
        let path = config.local_pom_path("com.example.foo", "bar", "1.2.3");
        assert_eq!(
            path,
            PathBuf::from("/repo/com/example/foo/bar/1.2.3/bar-1.2.3.pom")
        );
    }

    #[test]
    fn local_artifact_dir_drops_version_segment() {
        let config = ResolverConfig::default().with_m2_home("/repo");
        let dir = config.local_artifact_dir("com.example", "bar");
        assert_eq!(dir, PathBuf::from("/repo/com/example/bar"));
    }
}
