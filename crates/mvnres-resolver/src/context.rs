use std::collections::HashMap;
use std::path::PathBuf;

use mvnres_core::config::ResolverConfig;
use mvnres_core::model::Project;
use mvnres_util::errors::Warning;

/// Process-lifetime state threaded through a resolution run: the POM
/// cache (file path → raw, uncomputed `Project`), the coordinate
/// registration table built by `register_locations`, and the warnings
/// accumulated along the way.
///
/// Passed explicitly rather than kept as global state, per the "global
/// state" design note: this is what makes the resolver testable and
/// leaves the door open for a future parallel implementation.
#[derive(Debug)]
pub struct ResolverContext {
    pub config: ResolverConfig,
    cache: HashMap<PathBuf, Project>,
    registered: HashMap<String, PathBuf>,
    pub warnings: Vec<Warning>,
}

impl ResolverContext {
    pub fn new(config: ResolverConfig) -> Self {
        ResolverContext {
            config,
            cache: HashMap::new(),
            registered: HashMap::new(),
            warnings: Vec::new(),
        }
    }

    pub fn cached(&self, file: &std::path::Path) -> Option<&Project> {
        self.cache.get(file)
    }

    /// Every POM loaded so far, for the CLI's `--trace-poms` flag.
    pub fn visited(&self) -> impl Iterator<Item = &Project> {
        self.cache.values()
    }

    pub fn insert_cache(&mut self, file: PathBuf, project: Project) {
        self.cache.insert(file, project);
    }

    pub fn register(&mut self, coordinate: String, file: PathBuf) {
        self.registered.entry(coordinate).or_insert(file);
    }

    pub fn registered_file(&self, coordinate: &str) -> Option<&PathBuf> {
        self.registered.get(coordinate)
    }

    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!(%warning, "resolver warning");
        self.warnings.push(warning);
    }
}
