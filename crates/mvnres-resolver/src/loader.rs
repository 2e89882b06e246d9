use std::path::{Path, PathBuf};

use mvnres_core::model::{Dependency, Parent, Project};
use mvnres_util::errors::{ResolverError, Warning};

use crate::context::ResolverContext;
use crate::properties;
use crate::range::{resolve_range, VersionRange};

/// Absolute-path `file`, consult the cache, and on miss parse and cache
/// it. Returns a copy with computed fields reset, never the cached
/// original — callers mutate their own copy during resolution.
pub fn load_by_file(ctx: &mut ResolverContext, file: &Path) -> miette::Result<Project> {
    let absolute = std::fs::canonicalize(file).unwrap_or_else(|_| file.to_path_buf());
    if let Some(cached) = ctx.cached(&absolute) {
        let mut copy = cached.clone();
        copy.reset_computed();
        return Ok(copy);
    }
    let project = mvnres_pom::reader::read_pom(&absolute)?;
    ctx.insert_cache(absolute, project.clone());
    let mut copy = project;
    copy.reset_computed();
    Ok(copy)
}

/// Location discovery for an ordinary (non-parent) dependency coordinate,
/// per the loader's 4-step order (registered location, then range
/// resolution, then the `M2_HOME` layout fallback — the relativePath step
/// only applies to parent lookups, handled by [`resolve_parent_file`]).
pub fn load_by_coordinate(
    ctx: &mut ResolverContext,
    dep: &Dependency,
    allow_missing: bool,
) -> miette::Result<Option<Project>> {
    let coordinate = dep.fullname();
    if let Some(file) = ctx.registered_file(&coordinate).cloned() {
        return Ok(Some(load_by_file(ctx, &file)?));
    }

    let version = dep.version.trim();
    let resolved_version = if version.starts_with('[') || version.starts_with('(') {
        match VersionRange::parse(version) {
            Some(range) => {
                let dir = ctx
                    .config
                    .local_artifact_dir(&dep.group_id, &dep.artifact_id);
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
    } else {
        version.to_string()
    };

    let file = ctx
        .config
        .local_pom_path(&dep.group_id, &dep.artifact_id, &resolved_version);

    if file.is_file() {
        return Ok(Some(load_by_file(ctx, &file)?));
    }

    if allow_missing {
        Ok(None)
    } else {
        Err(ResolverError::MissingPom {
            coordinate: coordinate.clone(),
            searched: file.display().to_string(),
        }
        .into())
    }
}

/// Location discovery for a `<parent>` reference: registered location,
/// then `relativePath` (only when `base_file` isn't already under the
/// local repository), then the `M2_HOME` fallback.
pub fn resolve_parent_file(
    ctx: &mut ResolverContext,
    parent: &Parent,
    base_file: &Path,
) -> Option<PathBuf> {
    let coordinate = parent.coordinate();
    if let Some(file) = ctx.registered_file(&coordinate) {
        return Some(file.clone());
    }

    if !parent.relative_path.is_empty() && !ctx.config.is_under_repository(base_file) {
        let candidate = base_file
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(&parent.relative_path);
        let candidate = if candidate.is_dir() {
            candidate.join("pom.xml")
        } else {
            candidate
        };
        if candidate.is_file() {
            return Some(candidate);
        }
    }

    let file = ctx
        .config
        .local_pom_path(&parent.group_id, &parent.artifact_id, &parent.version);
    if file.is_file() {
        Some(file)
    } else {
        None
    }
}

/// Recursively register the root POM and every declared module's
/// `pom.xml` by coordinate, so later lookups by `g:a:v` skip disk probing
/// entirely. Seeds each module's properties with `initial_props` only
/// where absent, and walks just enough of the parent chain to resolve
/// its own coordinate.
pub fn register_locations(
    ctx: &mut ResolverContext,
    root_file: &Path,
    initial_props: &[(String, String)],
) -> miette::Result<()> {
    register_one(ctx, root_file, initial_props)
}

fn register_one(
    ctx: &mut ResolverContext,
    file: &Path,
    initial_props: &[(String, String)],
) -> miette::Result<()> {
    let mut project = load_by_file(ctx, file)?;
    seed_properties(&mut project, initial_props);
    load_parents(ctx, &mut project, initial_props)?;

    let absolute = std::fs::canonicalize(file).unwrap_or_else(|_| file.to_path_buf());
    ctx.register(project.coordinate(), absolute);

    let base_dir = file.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();
    for module in project.modules.clone() {
        let module_file = base_dir.join(&module).join("pom.xml");
        if module_file.is_file() {
            register_one(ctx, &module_file, initial_props)?;
        }
    }
    Ok(())
}

fn seed_properties(project: &mut Project, initial_props: &[(String, String)]) {
    for (name, value) in initial_props {
        project
            .properties
            .entry(name.clone())
            .or_insert_with(|| mvnres_core::model::Property::new(name.clone(), value.clone(), Default::default()));
    }
}

/// Merge `initial_props` then the POM's own properties (only where
/// absent) into `computed_properties`, then recurse into the parent (if
/// any), then resolve the POM's own `groupId`/`artifactId`/`version`
/// against `computed_properties ∪ builtins`. Guarantees a POM has a
/// fully-resolved coordinate before any dependency references it.
pub fn load_parents(
    ctx: &mut ResolverContext,
    project: &mut Project,
    initial_props: &[(String, String)],
) -> miette::Result<()> {
    for (name, value) in initial_props {
        project
            .computed_properties
            .entry(name.clone())
            .or_insert_with(|| mvnres_core::model::Property::new(name.clone(), value.clone(), Default::default()));
    }
    for (name, prop) in project.properties.clone() {
        project.computed_properties.entry(name).or_insert(prop);
    }

    if let Some(parent) = project.parent.clone() {
        if let Some(parent_file) = resolve_parent_file(ctx, &parent, &project.file) {
            let mut parent_project = load_by_file(ctx, &parent_file)?;
            load_parents(ctx, &mut parent_project, &[])?;
            for (name, prop) in parent_project.computed_properties.clone() {
                project.computed_properties.entry(name).or_insert(prop);
            }
            if let Some(p) = project.parent.as_mut() {
                p.resolved_file = Some(parent_project.file.clone());
            }
            if project.group_id.is_empty() {
                project.group_id = parent_project.group_id.clone();
            }
            if project.version.is_empty() {
                project.version = parent_project.version.clone();
            }
        }
    }

    project.group_id = properties::expand(&project.group_id, &project.computed_properties, &project.builtins);
    project.artifact_id =
        properties::expand(&project.artifact_id, &project.computed_properties, &project.builtins);
    project.version = properties::expand(&project.version, &project.computed_properties, &project.builtins);

    if project.group_id.is_empty() || project.version.is_empty() {
        return Err(ResolverError::MalformedPom {
            path: project.file.display().to_string(),
            message: "groupId/version missing after parent-fill".to_string(),
        }
        .into());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mvnres_core::config::ResolverConfig;

    fn write_pom(dir: &Path, name: &str, xml: &str) -> PathBuf {
        let file = dir.join(name);
        std::fs::write(&file, xml).unwrap();
        file
    }

    #[test]
    fn load_by_file_caches_and_resets_computed() {
        let tmp = tempfile::tempdir().unwrap();
        let pom = write_pom(
            tmp.path(),
            "pom.xml",
            r#"<project><groupId>g</groupId><artifactId>a</artifactId><version>1</version></project>"#,
        );
        let mut ctx = ResolverContext::new(ResolverConfig::default());
        let first = load_by_file(&mut ctx, &pom).unwrap();
        assert_eq!(first.artifact_id, "a");
        assert!(first.computed_dependencies.is_empty());
    }

    #[test]
    fn load_parents_resolves_coordinate_from_parent() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("child")).unwrap();
        write_pom(
            tmp.path(),
            "pom.xml",
            r#"<project><groupId>com.x</groupId><artifactId>parent</artifactId><version>9.0</version></project>"#,
        );
        let child = write_pom(
            &tmp.path().join("child"),
            "pom.xml",
            r#"<project>
                <parent><groupId>com.x</groupId><artifactId>parent</artifactId><version>9.0</version><relativePath>../pom.xml</relativePath></parent>
                <artifactId>child</artifactId>
            </project>"#,
        );
        let mut ctx = ResolverContext::new(ResolverConfig::default());
        let mut project = load_by_file(&mut ctx, &child).unwrap();
        load_parents(&mut ctx, &mut project, &[]).unwrap();
        assert_eq!(project.group_id, "com.x");
        assert_eq!(project.version, "9.0");
    }
}
