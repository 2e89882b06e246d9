//! CLI argument definitions.
//!
//! There is exactly one thing to do — resolve a POM and print some view
//! of the result — so this is a flat argument struct rather than a
//! `Subcommand` enum; the verbs live in the flags that pick what gets
//! printed and how it gets traced.

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "mvnres",
    version,
    about = "Print the effective Maven dependency graph for a POM"
)]
pub struct Cli {
    /// Path to the POM file to resolve
    pub pom: PathBuf,

    /// Section to print (repeatable): project, properties, managements,
    /// dependencies, collect, tree. Defaults to all.
    #[arg(long = "section", value_name = "SECTION")]
    pub sections: Vec<String>,

    /// Define an extra property, pre-seeded ahead of anything declared in
    /// the POM: -D name=value
    #[arg(short = 'D', value_name = "NAME=VALUE")]
    pub properties: Vec<String>,

    /// JDK version used for `<activation><jdk>` profile activation
    #[arg(long)]
    pub jdk: Option<String>,

    /// Override the local repository root (defaults to $M2_HOME or
    /// ~/.m2/repository)
    #[arg(long)]
    pub m2_home: Option<PathBuf>,

    /// Disable ANSI color in the printed output
    #[arg(long)]
    pub no_color: bool,

    /// Use ASCII tree connectors instead of box-drawing characters
    #[arg(long)]
    pub basic: bool,

    /// Trace every POM visited during resolution
    #[arg(long)]
    pub trace_poms: bool,

    /// Trace a dependency by groupId:artifactId (repeatable); '*' traces all
    #[arg(long = "trace-dep", value_name = "G:A")]
    pub trace_deps: Vec<String>,

    /// Trace a property by name (repeatable); '*' traces all
    #[arg(long = "trace-prop", value_name = "NAME")]
    pub trace_props: Vec<String>,

    /// Trace version-range resolution
    #[arg(long)]
    pub trace_ranges: bool,

    /// Enable verbose (debug-level) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

pub fn parse() -> Cli {
    Cli::parse()
}
