//! Prints a resolved [`Project`]: a project header, then whichever of the
//! properties / management / dependency / tree sections the caller asks
//! for, each line optionally trailed by a provenance comment showing the
//! POM chain that produced it.
//!
//! Assumes `project` has already been fully resolved (`computed_*` fields
//! populated) — this crate only renders, it never resolves.

mod tree;

use std::io::{self, Write};

use console::Style;

use mvnres_core::model::{Dependency, Project};

/// One selectable section of the printed output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Project,
    Properties,
    Managements,
    Dependencies,
    Collect,
    Tree,
}

impl Section {
    pub const ALL: [Section; 6] = [
        Section::Project,
        Section::Properties,
        Section::Managements,
        Section::Dependencies,
        Section::Collect,
        Section::Tree,
    ];

    /// Parses a section name or its short alias (`proj`, `props`, `mgts`,
    /// `deps`, `coll`; `tree` has no alias).
    pub fn parse(raw: &str) -> Option<Section> {
        match raw {
            "project" | "proj" => Some(Section::Project),
            "properties" | "props" => Some(Section::Properties),
            "managements" | "mgts" => Some(Section::Managements),
            "dependencies" | "deps" => Some(Section::Dependencies),
            "collect" | "coll" => Some(Section::Collect),
            "tree" => Some(Section::Tree),
            _ => None,
        }
    }
}

/// Printer knobs: which sections to emit, the column width provenance
/// comments are aligned to, ANSI color, and ASCII-only tree connectors
/// (for output that can't render box-drawing characters).
#[derive(Debug, Clone)]
pub struct PrintOptions {
    pub indent: usize,
    pub color: bool,
    pub basic: bool,
    pub sections: Vec<Section>,
}

impl Default for PrintOptions {
    fn default() -> Self {
        PrintOptions {
            indent: 120,
            color: console::colors_enabled(),
            basic: false,
            sections: Section::ALL.to_vec(),
        }
    }
}

pub(crate) struct Styles {
    name: Option<Style>,
    value: Option<Style>,
}

impl Styles {
    fn new(color: bool) -> Self {
        if color {
            Styles {
                name: Some(Style::new().yellow().bold()),
                value: Some(Style::new().green().bold()),
            }
        } else {
            Styles {
                name: None,
                value: None,
            }
        }
    }

    pub(crate) fn name(&self, text: &str) -> String {
        match &self.name {
            Some(style) => style.apply_to(text).to_string(),
            None => text.to_string(),
        }
    }

    pub(crate) fn value(&self, text: &str) -> String {
        match &self.value {
            Some(style) => style.apply_to(text).to_string(),
            None => text.to_string(),
        }
    }
}

/// Render `project` into `out` according to `options`.
pub fn print_project<W: Write>(out: &mut W, project: &Project, options: &PrintOptions) -> io::Result<()> {
    let styles = Styles::new(options.color);
    let indent = options.indent;
    // Escape codes add invisible bytes that `ljust`-style padding still
    // counts; absorb the difference the same way the column widths below
    // do when color is on.
    let c_indent = if options.color { 11 } else { 0 };
    let indent1 = indent + c_indent;
    let indent2 = indent + 2 * c_indent;

    let header = format!("# {}:{}:{} ", project.group_id, project.artifact_id, project.version);
    writeln!(out, "{}", "#".repeat(indent))?;
    writeln!(out, "{}#", pad(&header, indent.saturating_sub(1)))?;
    writeln!(out, "{}", "#".repeat(indent))?;

    let want = |s: Section| options.sections.contains(&s);

    if want(Section::Project) {
        writeln!(out)?;
        let gap = format!("{}:{}:{}", project.group_id, project.artifact_id, project.packaging);
        writeln!(out, "Project: {}:{}", styles.name(&gap), styles.value(&project.version))?;
    }

    if want(Section::Properties) {
        writeln!(out)?;
        writeln!(out, "Properties ({}):", project.computed_properties.len())?;
        let mut props: Vec<_> = project.computed_properties.values().collect();
        props.sort_by(|a, b| a.name.cmp(&b.name));
        for prop in props {
            let text = format!("    {}: {}", styles.name(&prop.name), styles.value(&prop.value));
            print_comment(out, indent2, &text, &dump_path(&prop.paths), "")?;
        }
    }

    if want(Section::Managements) {
        writeln!(out)?;
        writeln!(out, "Dependency Management ({}):", project.computed_managements.len())?;
        let mut mgts: Vec<_> = project.computed_managements.values().collect();
        mgts.sort_by(|a, b| (&a.group_id, &a.artifact_id, &a.scope).cmp(&(&b.group_id, &b.artifact_id, &b.scope)));
        for dep in mgts {
            let text = format!("    {}:{}", styles.name(&dep.key_gat()), styles.value(&dep.version));
            print_comment(out, indent2, &text, &dump_path(&dep.provenance.paths), "")?;
        }
    }

    if want(Section::Dependencies) || want(Section::Collect) || want(Section::Tree) {
        if want(Section::Dependencies) {
            writeln!(out)?;
            writeln!(out, "Dependencies ({}):", project.added_dependencies.len())?;
        }
        print_raw_dependencies(out, project, &styles, indent1, indent, want(Section::Dependencies))?;

        if want(Section::Collect) {
            writeln!(out)?;
            writeln!(out, "Collected Dependencies ({}):", project.computed_dependencies.len())?;
            let mut cols: Vec<&Dependency> = project.computed_dependencies.values().collect();
            cols.sort_by(|a, b| (&a.group_id, &a.artifact_id).cmp(&(&b.group_id, &b.artifact_id)));
            for dep in cols {
                let text = format!(
                    "    {}:{}:{}",
                    styles.name(&dep.key_gat()),
                    styles.value(&dep.version),
                    dep.scope
                );
                print_comment(out, indent2, &text, &dump_path(&dep.provenance.paths), "dep: ")?;
            }
        }

        if want(Section::Tree) {
            writeln!(out)?;
            let deps: Vec<&Dependency> = project.computed_dependencies.values().collect();
            tree::render(out, &project.coordinate(), &deps, &styles, indent2, options.basic)?;
        }
    }

    Ok(())
}

fn print_raw_dependencies<W: Write>(
    out: &mut W,
    project: &Project,
    styles: &Styles,
    indent1: usize,
    indent: usize,
    emit: bool,
) -> io::Result<()> {
    let mut deps: Vec<&Dependency> = project.added_dependencies.iter().collect();
    deps.sort_by(|a, b| (&a.group_id, &a.artifact_id).cmp(&(&b.group_id, &b.artifact_id)));

    let mut previous = String::new();
    for dep in deps {
        let key = dep.key_gat();
        if previous.is_empty() || previous != key {
            previous = key.clone();
            if emit {
                print_comment(out, indent1, &format!("    {}", styles.name(&key)), "", "")?;
            }
        }
        if emit {
            let text = format!("        {}:{}", styles.value(&dep.version), dep.scope);
            print_comment(out, indent1, &text, &dump_path(&dep.provenance.paths), "dep: ")?;
            print_comment(out, indent, "", &dump_path(&dep.provenance.paths_version), "ver: ")?;
        }
    }
    Ok(())
}

/// `prop.paths`/`dep.provenance.paths` rendered for a trailing comment:
/// `.` at the root, otherwise the POM chain joined by ` -> `.
pub(crate) fn dump_path(path: &mvnres_core::model::Path) -> String {
    if path.is_root() {
        ".".to_string()
    } else {
        path.render()
    }
}

pub(crate) fn print_comment<W: Write>(out: &mut W, indent: usize, text: &str, comment: &str, prefix: &str) -> io::Result<()> {
    if comment.is_empty() {
        writeln!(out, "{text}")
    } else {
        writeln!(out, "{}  # {prefix}{comment}", pad(text, indent))
    }
}

fn pad(text: &str, width: usize) -> String {
    if text.len() >= width {
        text.to_string()
    } else {
        format!("{text}{}", " ".repeat(width - text.len()))
    }
}
