use mvnres_core::model::{Activation, Path, Profile, Project, Property};
use mvnres_util::errors::Warning;

use crate::context::ResolverContext;
use crate::properties;
use crate::range::{MavenVersion, VersionRange};

/// Evaluate `project`'s profiles and merge the activated ones' payload
/// (dependencies, managements, properties) into `project`'s raw fields,
/// ahead of property expansion.
///
/// A profile with no dependencies/managements/properties/modules is
/// never considered. `activeByDefault` profiles are deferred: they only
/// apply as a fallback when no other profile activated. Whichever
/// criteria a profile declares (jdk/os/property/file) are evaluated
/// independently and OR'd together — real POMs declare exactly one kind
/// per `<activation>`, so this matches observed behavior without
/// needing to model Maven's stricter AND-of-siblings semantics.
pub fn resolve_profiles(ctx: &mut ResolverContext, project: &mut Project) {
    if project.profiles.is_empty() {
        return;
    }

    let mut activated: Vec<Profile> = Vec::new();
    for profile in &project.profiles {
        if profile.dependencies.is_empty()
            && profile.managements.is_empty()
            && profile.properties.is_empty()
            && profile.modules.is_empty()
        {
            continue;
        }
        if is_active_by_default(profile) {
            continue;
        }
        if is_active(ctx, project, profile) {
            activated.push(profile.clone());
        }
    }

    if activated.is_empty() {
        activated = project
            .profiles
            .iter()
            .filter(|p| is_active_by_default(p))
            .cloned()
            .collect();
    }

    // Later-processed profiles must win ties in the direct-vs-parent
    // merges done downstream, which favor whatever appears earliest in
    // document order — so each profile's payload is prepended, putting
    // the last-merged profile at the very front.
    for profile in activated {
        project.dependencies = profile
            .dependencies
            .iter()
            .cloned()
            .chain(project.dependencies.drain(..))
            .collect();
        project.managements = profile
            .managements
            .iter()
            .cloned()
            .chain(project.managements.drain(..))
            .collect();
        for (name, value) in &profile.properties {
            project
                .computed_properties
                .insert(name.clone(), Property::new(name.clone(), value.clone(), Path::root()));
        }
    }
}

fn is_active_by_default(profile: &Profile) -> bool {
    profile.activations.iter().any(|a| matches!(a, Activation::ActiveByDefault))
}

fn is_active(ctx: &mut ResolverContext, project: &Project, profile: &Profile) -> bool {
    profile
        .activations
        .iter()
        .any(|activation| evaluate(ctx, project, profile, activation))
}

fn evaluate(ctx: &mut ResolverContext, project: &Project, profile: &Profile, activation: &Activation) -> bool {
    match activation {
        Activation::ActiveByDefault => false,
        Activation::Jdk(spec) => {
            let range = VersionRange::parse_jdk(spec);
            range.contains(&MavenVersion::parse(&ctx.config.jdk_version))
        }
        Activation::Os {
            name,
            family,
            arch,
            version,
        } => {
            if let Some(name) = name {
                if !matches_negatable(name, &ctx.config.os_name) {
                    return false;
                }
            }
            if let Some(family) = family {
                if !matches_negatable(family, &ctx.config.os_family) {
                    return false;
                }
            }
            if let Some(arch) = arch {
                if !matches_negatable(arch, &ctx.config.os_arch) {
                    return false;
                }
            }
            if version.is_some() {
                ctx.warn(Warning::UnsupportedProfileActivation {
                    profile_id: profile.id.clone(),
                    pom: project.coordinate(),
                    detail: "os.version activation is unsupported".to_string(),
                });
                return false;
            }
            true
        }
        Activation::Property { name, value } => evaluate_property(ctx, project, profile, name, value.as_deref()),
        Activation::FileExists(path) => evaluate_file(ctx, project, profile, path, true),
        Activation::FileMissing(path) => evaluate_file(ctx, project, profile, path, false),
        Activation::Unsupported(detail) => {
            ctx.warn(Warning::UnsupportedProfileActivation {
                profile_id: profile.id.clone(),
                pom: project.coordinate(),
                detail: detail.clone(),
            });
            false
        }
    }
}

fn matches_negatable(pattern: &str, actual: &str) -> bool {
    if let Some(bare) = pattern.strip_prefix('!') {
        !bare.eq_ignore_ascii_case(actual)
    } else {
        pattern.eq_ignore_ascii_case(actual)
    }
}

fn evaluate_property(
    ctx: &mut ResolverContext,
    project: &Project,
    profile: &Profile,
    name: &str,
    value: Option<&str>,
) -> bool {
    if let Some(bare) = name.strip_prefix('!') {
        return !project.computed_properties.contains_key(bare);
    }
    let Some(current) = project.computed_properties.get(name) else {
        return false;
    };
    let Some(expected) = value else {
        return true;
    };
    let expanded_expected = properties::expand(expected, &project.computed_properties, &project.builtins);
    let expanded_current = properties::expand(&current.value, &project.computed_properties, &project.builtins);
    if expanded_expected.contains('$') || expanded_current.contains('$') {
        ctx.warn(Warning::UnsupportedProfileActivation {
            profile_id: profile.id.clone(),
            pom: project.coordinate(),
            detail: format!("unresolved property reference in activation '{expanded_expected}'"),
        });
        return false;
    }
    expanded_expected == expanded_current
}

fn evaluate_file(ctx: &mut ResolverContext, project: &Project, profile: &Profile, raw_path: &str, must_exist: bool) -> bool {
    if raw_path.contains('$') {
        ctx.warn(Warning::UnsupportedProfileActivation {
            profile_id: profile.id.clone(),
            pom: project.coordinate(),
            detail: format!("unsupported '$' in file activation '{raw_path}'"),
        });
        return false;
    }
    let base = project.file.parent().unwrap_or_else(|| std::path::Path::new("."));
    let candidate = base.join(raw_path);
    if must_exist {
        candidate.exists()
    } else {
        !candidate.exists()
    }
}
