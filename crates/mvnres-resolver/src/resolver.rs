use std::collections::VecDeque;

use indexmap::IndexMap;

use mvnres_core::model::{Dependency, DependencyPaths, Exclusion, Path, PathStep, Project};
use mvnres_util::errors::{ResolverError, Warning};

use crate::context::ResolverContext;
use crate::loader;
use crate::management;
use crate::profile;
use crate::properties;
use crate::range::{resolve_range, VersionRange};

pub const DEFAULT_SCOPE: &str = "all";

/// Scopes a `<dependency>` or `<dependencyManagement>` entry may
/// declare. Notably excludes `system` — real-world POMs that force it
/// do so only through management, never direct declaration.
pub(crate) const KNOWN_SCOPES: [&str; 6] = ["compile", "test", "runtime", "provided", "import", ""];

/// Scope priority, lowest index binds tightest. Mirrors the ordering
/// used to decide which of two conflicting occurrences "wins".
const PRIORITY_SCOPES: [&str; 6] = ["all", "compile", "runtime", "provided", "system", "test"];

fn priority(scope: &str) -> usize {
    PRIORITY_SCOPES
        .iter()
        .position(|s| *s == scope)
        .unwrap_or(PRIORITY_SCOPES.len())
}

/// `parent scope -> dependency scope -> scope seen by the parent's own
/// consumers`, or `None` if the edge doesn't propagate transitively.
fn transitive_scope(parent_scope: &str, dep_scope: &str) -> Option<&'static str> {
    match (parent_scope, dep_scope) {
        ("all", "compile") => Some("compile"),
        ("all", "test") => Some("test"),
        ("all", "runtime") => Some("runtime"),
        ("all", "provided") => Some("provided"),
        ("all", "") => Some("compile"),
        ("all", "all") => Some("compile"),
        ("compile", "compile") => Some("compile"),
        ("compile", "runtime") => Some("runtime"),
        ("compile", "") => Some("compile"),
        ("test", "compile") => Some("test"),
        ("test", "runtime") => Some("test"),
        ("test", "") => Some("test"),
        ("runtime", "compile") => Some("runtime"),
        ("runtime", "runtime") => Some("runtime"),
        ("runtime", "") => Some("runtime"),
        _ => None,
    }
}

fn is_non_recursable_type(type_: &str) -> bool {
    type_ == "pom"
}

/// State shared across the *entire* resolution run, not per-POM: every
/// node visited appends to the same flat tables, matching how the
/// upstream algorithm hands the same list/dict objects down by
/// reference to every recursively-visited sub-POM.
#[derive(Default)]
struct Shared {
    added: Vec<Dependency>,
    computed: IndexMap<String, Dependency>,
}

/// One deferred recursion: a POM already located on disk, waiting to
/// have its own dependencies resolved. Queued depth-first-declared,
/// drained breadth-first, so nearer occurrences are settled before
/// farther ones reach the same coordinate.
struct PendingJob {
    project: Project,
    path: Path,
    initial_managements: IndexMap<String, Dependency>,
    exclusions: Vec<Exclusion>,
    scope: String,
    computed_type: String,
}

/// Resolve the full effective dependency graph for the POM at
/// `root_file`, seeded with `initial_properties` (`-D name=value`
/// overrides). Returns the root [`Project`] with `computed_dependencies`
/// and `added_dependencies` populated.
pub fn resolve(
    ctx: &mut ResolverContext,
    root_file: &std::path::Path,
    initial_properties: &[(String, String)],
) -> miette::Result<Project> {
    loader::register_locations(ctx, root_file, initial_properties)?;
    let root = loader::load_by_file(ctx, root_file)?;

    let mut shared = Shared::default();
    let mut queue: VecDeque<PendingJob> = VecDeque::new();
    queue.push_back(PendingJob {
        project: root,
        path: Path::root(),
        initial_managements: IndexMap::new(),
        exclusions: Vec::new(),
        scope: DEFAULT_SCOPE.to_string(),
        computed_type: "pom".to_string(),
    });

    let mut root_result: Option<Project> = None;
    while let Some(job) = queue.pop_front() {
        let resolved = resolve_node(ctx, job, &mut shared, &mut queue, initial_properties)?;
        if root_result.is_none() {
            root_result = Some(resolved);
        }
    }

    let mut root = root_result.expect("the root job is always queued and processed first");
    root.added_dependencies = shared.added;
    root.computed_dependencies = shared.computed;
    Ok(root)
}

fn resolve_node(
    ctx: &mut ResolverContext,
    job: PendingJob,
    shared: &mut Shared,
    queue: &mut VecDeque<PendingJob>,
    initial_properties: &[(String, String)],
) -> miette::Result<Project> {
    let mut project = job.project;
    loader::load_parents(ctx, &mut project, initial_properties)?;
    profile::resolve_profiles(ctx, &mut project);
    properties::resolve_properties(&mut project);

    project.computed_scope = job.scope.clone();
    project.computed_exclusions = job.exclusions.clone();
    project.computed_type = job.computed_type.clone();
    project.initial_managements = job.initial_managements.clone();
    project.computed_managements = management::build_computed_managements(ctx, &project, &job.path)?;

    let this_path = job.path.push(
        PathStep {
            coordinate: project.coordinate(),
            file: project.file.clone(),
        },
        if project.computed_type == "parent" { 0 } else { 1 },
    );
    let transitive_only = this_path.length() > 1;
    let child_initial_managements = new_initial_managements(&project.initial_managements, &project.computed_managements);

    let mut recurse: Vec<Dependency> = Vec::new();

    // The parent edge is a pure recursion trigger: it never shows up in
    // `computed_dependencies`/`added_dependencies`, only in the graph
    // traversal, and it inherits the owning POM's own scope untouched.
    if let Some(parent) = project.parent.clone() {
        if let Some(parent_file) = parent.resolved_file.clone() {
            let mut parent_as_dep = Dependency::new(parent.group_id.clone(), parent.artifact_id.clone());
            parent_as_dep.version = parent.version.clone();
            parent_as_dep.scope = project.computed_scope.clone();
            parent_as_dep.type_ = "parent".to_string();
            parent_as_dep.provenance = DependencyPaths::at(this_path.clone());
            let parent_project = loader::load_by_file(ctx, &parent_file)?;
            recurse.push(parent_as_dep);
            queue.push_back(PendingJob {
                project: parent_project,
                path: this_path.clone(),
                initial_managements: child_initial_managements.clone(),
                exclusions: project.computed_exclusions.clone(),
                scope: project.computed_scope.clone(),
                computed_type: "parent".to_string(),
            });
        }
    }

    let raw_dependencies = project.dependencies.clone();
    for raw in raw_dependencies {
        let mut dep = raw;
        expand_coordinate(&mut dep, &project);

        if project.computed_exclusions.iter().any(|e| e.key() == dep.key_ga()) {
            continue;
        }

        if dep.scope != "all" && !KNOWN_SCOPES.contains(&dep.scope.as_str()) {
            return Err(ResolverError::InvalidField {
                field: "scope",
                value: dep.scope.clone(),
                coordinate: dep.fullname(),
                path: project.file.display().to_string(),
            }
            .into());
        }

        if mvnres_core::model::is_silently_skipped_type(&dep.type_) {
            continue;
        }
        if mvnres_core::model::DepType::parse(&dep.type_).is_none() {
            return Err(ResolverError::InvalidField {
                field: "type",
                value: dep.type_.clone(),
                coordinate: dep.fullname(),
                path: project.file.display().to_string(),
            }
            .into());
        }

        dep.provenance.paths = this_path.clone();
        dep.provenance.paths_version = this_path.clone();
        dep.provenance.paths_scope = this_path.clone();
        dep.provenance.paths_optional = this_path.clone();
        dep.provenance.paths_exclusions = this_path.clone();
        if let Some(mgt) = project.computed_managements.get(&dep.key_gat()).cloned() {
            apply_default_management(&mgt, &mut dep);
        }

        let is_transitive = transitive_scope(&project.computed_scope, &dep.scope).is_none();
        if transitive_only && is_transitive {
            if dep.scope == "provided" {
                ctx.warn(Warning::ProvidedEdgeDropped { coordinate: dep.fullname() });
            }
            continue;
        }
        if transitive_only && dep.optional == "true" {
            continue;
        }

        if let Some(forced) = project.initial_managements.get(&dep.key_gat()).cloned() {
            apply_forced_management(&forced, &mut dep);
        }
        expand_coordinate(&mut dep, &project);

        let max_scope = if project.computed_scope == "all" {
            "compile".to_string()
        } else {
            project.computed_scope.clone()
        };
        if dep.scope.is_empty() {
            dep.scope = max_scope.clone();
        }
        if priority(&dep.scope) < priority(&max_scope) {
            dep.scope = max_scope.clone();
        }

        dep.version = resolve_dependency_version(ctx, &dep);
        if dep.optional.is_empty() {
            dep.optional = "false".to_string();
        }
        if dep.optional != "true" && dep.optional != "false" {
            return Err(ResolverError::InvalidField {
                field: "optional",
                value: dep.optional.clone(),
                coordinate: dep.fullname(),
                path: project.file.display().to_string(),
            }
            .into());
        }

        let key = dep.key_ga();
        let mut skip = false;
        if let Some(loaded) = shared.computed.get(&key) {
            if priority(&dep.scope) == priority(&loaded.scope) {
                if this_path.length() >= loaded.provenance.paths.length() {
                    skip = true;
                }
            } else if priority(&dep.scope) >= priority(&loaded.scope) {
                skip = true;
            }
        }

        match shared.computed.get_mut(&key) {
            Some(loaded) => {
                if priority(&dep.scope) < priority(&loaded.scope) {
                    loaded.scope = dep.scope.clone();
                }
                if this_path.length() < loaded.provenance.paths.length() {
                    loaded.version = dep.version.clone();
                    loaded.type_ = dep.type_.clone();
                    loaded.classifier = dep.classifier.clone();
                    loaded.optional = dep.optional.clone();
                    loaded.exclusions = dep.exclusions.clone();
                    loaded.not_found = dep.not_found;
                    loaded.provenance = dep.provenance.clone();
                }
            }
            None => {
                shared.computed.insert(key, dep.clone());
            }
        }

        shared.added.push(dep.clone());

        if skip {
            continue;
        }
        if is_non_recursable_type(&dep.type_) {
            continue;
        }
        recurse.push(dep);
    }

    for mut dep in recurse {
        if dep.type_ == "parent" {
            // Already queued above alongside its located file.
            continue;
        }
        let located = loader::load_by_coordinate(ctx, &dep, true)?;
        let Some(dep_project) = located else {
            ctx.warn(Warning::MissingTransitivePom { coordinate: dep.fullname() });
            dep.not_found = true;
            if let Some(loaded) = shared.computed.get_mut(&dep.key_ga()) {
                loaded.not_found = true;
            }
            continue;
        };

        let mut child_exclusions = project.computed_exclusions.clone();
        for excl in &dep.exclusions {
            if !child_exclusions.iter().any(|e| e.key() == excl.key()) {
                child_exclusions.push(excl.clone());
            }
        }

        queue.push_back(PendingJob {
            project: dep_project,
            path: this_path.clone(),
            initial_managements: child_initial_managements.clone(),
            exclusions: child_exclusions,
            scope: dep.scope.clone(),
            computed_type: dep.type_.clone(),
        });
    }

    Ok(project)
}

fn expand_coordinate(dep: &mut Dependency, project: &Project) {
    dep.group_id = properties::expand(&dep.group_id, &project.computed_properties, &project.builtins);
    dep.artifact_id = properties::expand(&dep.artifact_id, &project.computed_properties, &project.builtins);
    dep.version = properties::expand(&dep.version, &project.computed_properties, &project.builtins);
}

fn resolve_dependency_version(ctx: &mut ResolverContext, dep: &Dependency) -> String {
    let version = dep.version.trim();
    if !version.starts_with('[') && !version.starts_with('(') {
        return version.to_string();
    }
    match VersionRange::parse(version) {
        Some(range) => {
            let dir = ctx.config.local_artifact_dir(&dep.group_id, &dep.artifact_id);
            match resolve_range(&dir, &range) {
                Some(v) => v.original,
                None => {
                    ctx.warn(Warning::RangeUnresolvable {
                        coordinate: dep.key_ga(),
                        range: version.to_string(),
                    });
                    version.to_string()
                }
            }
        }
        None => version.to_string(),
    }
}

/// Build the set of forced overrides to hand down to this node's
/// children: this node's own computed managements, overlaid wherever an
/// ancestor's forced override (`initials`) named the same `g:a:t` — the
/// ancestor's non-empty fields win, its empty fields fall back to this
/// node's computed value.
fn new_initial_managements(
    initials: &IndexMap<String, Dependency>,
    computed: &IndexMap<String, Dependency>,
) -> IndexMap<String, Dependency> {
    let mut merged = computed.clone();
    for ini in initials.values() {
        let key = ini.key_gat();
        match computed.get(&key) {
            Some(existing) => {
                let mut candidate = existing.clone();
                apply_forced_management(ini, &mut candidate);
                merged.insert(key, candidate);
            }
            None => {
                merged.insert(key, ini.clone());
            }
        }
    }
    merged
}

/// Fill only the empty fields of `dep` from `mgt` — dependencyManagement
/// acting as a default.
fn apply_default_management(mgt: &Dependency, dep: &mut Dependency) {
    if !mgt.version.is_empty() && dep.version.is_empty() {
        dep.version = mgt.version.clone();
        dep.provenance.paths_version = mgt.provenance.paths_version.clone();
    }
    if !mgt.scope.is_empty() && dep.scope.is_empty() {
        dep.scope = mgt.scope.clone();
        dep.provenance.paths_scope = mgt.provenance.paths_scope.clone();
    }
    if !mgt.optional.is_empty() && dep.optional.is_empty() {
        dep.optional = mgt.optional.clone();
        dep.provenance.paths_optional = mgt.provenance.paths_optional.clone();
    }
    if !mgt.exclusions.is_empty() && dep.exclusions.is_empty() {
        dep.exclusions = mgt.exclusions.clone();
        dep.provenance.paths_exclusions = mgt.provenance.paths_exclusions.clone();
    }
}

/// Overwrite every non-empty field of `dep` with `mgt`'s — an ancestor's
/// forced override acting unconditionally.
fn apply_forced_management(mgt: &Dependency, dep: &mut Dependency) {
    if !mgt.version.is_empty() {
        dep.version = mgt.version.clone();
        dep.provenance.paths_version = mgt.provenance.paths_version.clone();
    }
    if !mgt.scope.is_empty() {
        dep.scope = mgt.scope.clone();
        dep.provenance.paths_scope = mgt.provenance.paths_scope.clone();
    }
    if !mgt.optional.is_empty() {
        dep.optional = mgt.optional.clone();
        dep.provenance.paths_optional = mgt.provenance.paths_optional.clone();
    }
    if !mgt.exclusions.is_empty() {
        dep.exclusions = mgt.exclusions.clone();
        dep.provenance.paths_exclusions = mgt.provenance.paths_exclusions.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mvnres_core::config::ResolverConfig;

    fn write(dir: &std::path::Path, rel: &str, xml: &str) -> std::path::PathBuf {
        let file = dir.join(rel);
        if let Some(parent) = file.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&file, xml).unwrap();
        file
    }

    #[test]
    fn direct_dependency_resolves_version_and_scope() {
        let tmp = tempfile::tempdir().unwrap();
        let root = write(
            tmp.path(),
            "pom.xml",
            r#"<project>
                <groupId>com.x</groupId><artifactId>root</artifactId><version>1.0</version>
                <dependencies>
                    <dependency><groupId>com.x</groupId><artifactId>leaf</artifactId><version>2.0</version></dependency>
                </dependencies>
            </project>"#,
        );
        let mut ctx = ResolverContext::new(ResolverConfig::default());
        let resolved = resolve(&mut ctx, &root, &[]).unwrap();
        let dep = resolved.computed_dependencies.get("com.x:leaf").unwrap();
        assert_eq!(dep.version, "2.0");
        assert_eq!(dep.scope, "compile");
    }

    #[test]
    fn managed_version_fills_blank_dependency_version() {
        let tmp = tempfile::tempdir().unwrap();
        let root = write(
            tmp.path(),
            "pom.xml",
            r#"<project>
                <groupId>com.x</groupId><artifactId>root</artifactId><version>1.0</version>
                <dependencyManagement>
                    <dependencies>
                        <dependency><groupId>com.x</groupId><artifactId>leaf</artifactId><version>3.0</version></dependency>
                    </dependencies>
                </dependencyManagement>
                <dependencies>
                    <dependency><groupId>com.x</groupId><artifactId>leaf</artifactId></dependency>
                </dependencies>
            </project>"#,
        );
        let mut ctx = ResolverContext::new(ResolverConfig::default());
        let resolved = resolve(&mut ctx, &root, &[]).unwrap();
        let dep = resolved.computed_dependencies.get("com.x:leaf").unwrap();
        assert_eq!(dep.version, "3.0");
    }

    #[test]
    fn exclusion_drops_transitive_occurrence() {
        let tmp = tempfile::tempdir().unwrap();
        let m2 = tmp.path().join(".m2");
        write(
            &m2,
            "com/x/mid/1.0/mid-1.0.pom",
            r#"<project>
                <groupId>com.x</groupId><artifactId>mid</artifactId><version>1.0</version>
                <dependencies>
                    <dependency><groupId>com.x</groupId><artifactId>excluded</artifactId><version>1.0</version></dependency>
                </dependencies>
            </project>"#,
        );
        let root = write(
            tmp.path(),
            "pom.xml",
            r#"<project>
                <groupId>com.x</groupId><artifactId>root</artifactId><version>1.0</version>
                <dependencies>
                    <dependency>
                        <groupId>com.x</groupId><artifactId>mid</artifactId><version>1.0</version>
                        <exclusions>
                            <exclusion><groupId>com.x</groupId><artifactId>excluded</artifactId></exclusion>
                        </exclusions>
                    </dependency>
                </dependencies>
            </project>"#,
        );
        let mut ctx = ResolverContext::new(ResolverConfig::default().with_m2_home(&m2));
        let resolved = resolve(&mut ctx, &root, &[]).unwrap();
        assert!(resolved.computed_dependencies.contains_key("com.x:mid"));
        assert!(!resolved.computed_dependencies.contains_key("com.x:excluded"));
    }

    #[test]
    fn invalid_scope_is_a_fatal_error() {
        let tmp = tempfile::tempdir().unwrap();
        let root = write(
            tmp.path(),
            "pom.xml",
            r#"<project>
                <groupId>com.x</groupId><artifactId>root</artifactId><version>1.0</version>
                <dependencies>
                    <dependency><groupId>com.x</groupId><artifactId>leaf</artifactId><version>1.0</version><scope>bogus</scope></dependency>
                </dependencies>
            </project>"#,
        );
        let mut ctx = ResolverContext::new(ResolverConfig::default());
        assert!(resolve(&mut ctx, &root, &[]).is_err());
    }

    #[test]
    fn nearer_occurrence_overrides_farther_one() {
        let tmp = tempfile::tempdir().unwrap();
        let m2 = tmp.path().join(".m2");
        write(
            &m2,
            "com/x/a/1.0/a-1.0.pom",
            r#"<project>
                <groupId>com.x</groupId><artifactId>a</artifactId><version>1.0</version>
                <dependencies>
                    <dependency><groupId>com.x</groupId><artifactId>shared</artifactId><version>1.0</version></dependency>
                </dependencies>
            </project>"#,
        );
        let root = write(
            tmp.path(),
            "pom.xml",
            r#"<project>
                <groupId>com.x</groupId><artifactId>root</artifactId><version>1.0</version>
                <dependencies>
                    <dependency><groupId>com.x</groupId><artifactId>a</artifactId><version>1.0</version></dependency>
                    <dependency><groupId>com.x</groupId><artifactId>shared</artifactId><version>2.0</version></dependency>
                </dependencies>
            </project>"#,
        );
        let mut ctx = ResolverContext::new(ResolverConfig::default().with_m2_home(&m2));
        let resolved = resolve(&mut ctx, &root, &[]).unwrap();
        let dep = resolved.computed_dependencies.get("com.x:shared").unwrap();
        assert_eq!(dep.version, "2.0");
    }
}
