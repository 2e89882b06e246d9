//! The "Tree Dependencies" section: re-derives parent/child edges from
//! each dependency's own provenance path (the last POM in its `paths`
//! chain declared it) and walks that tree depth-first.
//!
//! Unlike the proof-of-concept this was ported from, the resolver here
//! never lets a synthesized parent-POM edge reach `computed_dependencies`
//! in the first place (see `mvnres-resolver::resolver`), so there is no
//! splicing pass to drop `type = parent` nodes: every entry handed to
//! [`render`] is already a real dependency.

use std::collections::HashMap;
use std::io::{self, Write};

use mvnres_core::model::Dependency;

use crate::{dump_path, print_comment, Styles};

pub(crate) fn render<W: Write>(
    out: &mut W,
    root_coordinate: &str,
    deps: &[&Dependency],
    styles: &Styles,
    indent2: usize,
    basic: bool,
) -> io::Result<()> {
    let mut children: HashMap<String, Vec<&Dependency>> = HashMap::new();
    for dep in deps {
        let parent = dep
            .provenance
            .paths
            .steps()
            .last()
            .map(|s| s.coordinate.clone())
            .unwrap_or_else(|| root_coordinate.to_string());
        children.entry(parent).or_default().push(dep);
    }
    for kids in children.values_mut() {
        kids.sort_by(|a, b| (&a.group_id, &a.artifact_id).cmp(&(&b.group_id, &b.artifact_id)));
    }

    writeln!(out, "Tree Dependencies ({}):", deps.len())?;

    let (elbow, pipe, tee, blank) = if basic {
        ("\\- ", "|  ", "+- ", "   ")
    } else {
        ("\u{2514}\u{2500} ", "\u{2502}  ", "\u{251c}\u{2500} ", "   ")
    };

    walk(out, root_coordinate, &children, "", styles, indent2, elbow, pipe, tee, blank)
}

#[allow(clippy::too_many_arguments)]
fn walk<W: Write>(
    out: &mut W,
    key: &str,
    children: &HashMap<String, Vec<&Dependency>>,
    header: &str,
    styles: &Styles,
    indent2: usize,
    elbow: &str,
    pipe: &str,
    tee: &str,
    blank: &str,
) -> io::Result<()> {
    let Some(kids) = children.get(key) else {
        return Ok(());
    };
    let size = kids.len();
    for (i, dep) in kids.iter().enumerate() {
        let last = i + 1 == size;
        let branch = format!("{header}{}", if last { elbow } else { tee });
        let line = format!(
            "    {branch}{}:{}:{}",
            styles.name(&dep.key_gat()),
            styles.value(&dep.version),
            dep.scope
        );
        print_comment(out, indent2, &line, &dump_path(&dep.provenance.paths_version), "ver: ")?;

        let next_header = format!("{header}{}", if last { blank } else { pipe });
        walk(out, &dep.fullname(), children, &next_header, styles, indent2, elbow, pipe, tee, blank)?;
    }
    Ok(())
}
