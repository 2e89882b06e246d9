use indexmap::IndexMap;

use mvnres_core::model::{Dependency, DependencyPaths, Path, Project};
use mvnres_util::errors::ResolverError;

use crate::context::ResolverContext;
use crate::loader;
use crate::properties;
use crate::resolver::KNOWN_SCOPES;

/// Build `computed_managements: g:a:t -> Dependency` for `project`.
///
/// Every POM visited — `project` itself, each parent hop, each BOM
/// import — costs one step of path length, uniformly (unlike dependency
/// resolution, where a parent hop is free). `path` is the path *up to
/// but not including* `project`; traversal order within one POM is
/// direct `<dependencyManagement>` entries in document order (recursing
/// into BOM imports as they're encountered), then the parent's own
/// computed managements. Merging keeps whichever candidate has the
/// shorter `paths.length`; ties keep the earlier (already-inserted)
/// entry.
pub fn build_computed_managements(
    ctx: &mut ResolverContext,
    project: &Project,
    path: &Path,
) -> miette::Result<IndexMap<String, Dependency>> {
    let this_path = path.push(
        mvnres_core::model::PathStep {
            coordinate: project.coordinate(),
            file: project.file.clone(),
        },
        1,
    );

    let mut result = IndexMap::new();

    for raw in &project.managements {
        let mut resolved = raw.clone();
        resolved.group_id = properties::expand(&resolved.group_id, &project.computed_properties, &project.builtins);
        resolved.artifact_id =
            properties::expand(&resolved.artifact_id, &project.computed_properties, &project.builtins);
        resolved.version = properties::expand(&resolved.version, &project.computed_properties, &project.builtins);
        resolved.provenance = DependencyPaths::at(this_path.clone());

        if !KNOWN_SCOPES.contains(&resolved.scope.as_str()) {
            return Err(ResolverError::InvalidField {
                field: "scope",
                value: resolved.scope.clone(),
                coordinate: resolved.fullname(),
                path: project.file.display().to_string(),
            }
            .into());
        }

        let is_bom_import = resolved.scope == "import" && resolved.effective_type() == "pom";
        if is_bom_import {
            if let Some(imported) = load_bom(ctx, &resolved, project) {
                let bom_managements = build_computed_managements(ctx, &imported, &this_path)?;
                for (key, candidate) in bom_managements {
                    merge(&mut result, key, candidate);
                }
            }
            continue;
        }

        merge(&mut result, resolved.key_gat(), resolved);
    }

    if let Some(parent_ref) = &project.parent {
        if let Some(parent_file) = parent_ref.resolved_file.clone() {
            if let Ok(mut parent_project) = loader::load_by_file(ctx, &parent_file) {
                if loader::load_parents(ctx, &mut parent_project, &[]).is_ok() {
                    properties::resolve_properties(&mut parent_project);
                    let parent_managements = build_computed_managements(ctx, &parent_project, &this_path)?;
                    for (key, candidate) in parent_managements {
                        merge(&mut result, key, candidate);
                    }
                }
            }
        }
    }

    Ok(result)
}

fn merge(map: &mut IndexMap<String, Dependency>, key: String, candidate: Dependency) {
    match map.get(&key) {
        None => {
            map.insert(key, candidate);
        }
        Some(existing) => {
            if candidate.provenance.paths.length() < existing.provenance.paths.length() {
                map.insert(key, candidate);
            }
        }
    }
}

fn load_bom(ctx: &mut ResolverContext, import: &Dependency, project: &Project) -> Option<Project> {
    let mut bom_dep = import.clone();
    bom_dep.type_ = "pom".to_string();
    let mut loaded = loader::load_by_coordinate(ctx, &bom_dep, true).ok().flatten()?;
    loader::load_parents(ctx, &mut loaded, &[]).ok()?;
    properties::resolve_properties(&mut loaded);
    let _ = project;
    Some(loaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mvnres_core::config::ResolverConfig;

    fn write(dir: &std::path::Path, name: &str, xml: &str) -> std::path::PathBuf {
        let file = dir.join(name);
        std::fs::write(&file, xml).unwrap();
        file
    }

    #[test]
    fn direct_management_registers_by_gat() {
        let tmp = tempfile::tempdir().unwrap();
        let pom = write(
            tmp.path(),
            "pom.xml",
            r#"<project>
                <groupId>g</groupId><artifactId>a</artifactId><version>1</version>
                <dependencyManagement>
                    <dependencies>
                        <dependency><groupId>com.x</groupId><artifactId>lib</artifactId><version>2.0</version></dependency>
                    </dependencies>
                </dependencyManagement>
            </project>"#,
        );
        let mut ctx = ResolverContext::new(ResolverConfig::default());
        let mut project = loader::load_by_file(&mut ctx, &pom).unwrap();
        loader::load_parents(&mut ctx, &mut project, &[]).unwrap();
        properties::resolve_properties(&mut project);
        let managements = build_computed_managements(&mut ctx, &project, &Path::root()).unwrap();
        assert_eq!(managements.get("com.x:lib:jar").unwrap().version, "2.0");
    }

    #[test]
    fn invalid_management_scope_is_a_fatal_error() {
        let tmp = tempfile::tempdir().unwrap();
        let pom = write(
            tmp.path(),
            "pom.xml",
            r#"<project>
                <groupId>g</groupId><artifactId>a</artifactId><version>1</version>
                <dependencyManagement>
                    <dependencies>
                        <dependency><groupId>com.x</groupId><artifactId>lib</artifactId><version>2.0</version><scope>bogus</scope></dependency>
                    </dependencies>
                </dependencyManagement>
            </project>"#,
        );
        let mut ctx = ResolverContext::new(ResolverConfig::default());
        let mut project = loader::load_by_file(&mut ctx, &pom).unwrap();
        loader::load_parents(&mut ctx, &mut project, &[]).unwrap();
        properties::resolve_properties(&mut project);
        assert!(build_computed_managements(&mut ctx, &project, &Path::root()).is_err());
    }

    #[test]
    fn nearer_management_wins_on_conflicting_length() {
        let mut map = IndexMap::new();
        let mut far = Dependency::new("com.x", "lib");
        far.version = "1.0".into();
        far.provenance = DependencyPaths::at(Path::root().push(
            mvnres_core::model::PathStep {
                coordinate: "a".into(),
                file: "a".into(),
            },
            1,
        ));
        merge(&mut map, far.key_gat(), far);

        let mut near = Dependency::new("com.x", "lib");
        near.version = "2.0".into();
        near.provenance = DependencyPaths::at(Path::root());
        merge(&mut map, near.key_gat(), near);

        assert_eq!(map.get("com.x:lib:jar").unwrap().version, "2.0");
    }
}
