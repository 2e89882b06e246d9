use std::path::PathBuf;
use std::rc::Rc;

use indexmap::IndexMap;

/// One step of a [`Path`]: the coordinate and file of the POM visited at
/// that step. Kept lightweight (not a full [`Project`]) since a path is
/// cloned into every dependency and property that flows through the
/// resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathStep {
    pub coordinate: String,
    pub file: PathBuf,
}

struct PathNode {
    step: PathStep,
    parent: Option<Rc<PathNode>>,
}

/// The chain of POMs from the resolution root to the current position,
/// plus a length counter used to break "nearest wins" ties.
///
/// Steps share structure: appending clones only the new node and bumps a
/// reference count, not the whole chain.
#[derive(Clone)]
pub struct Path {
    length: u32,
    node: Option<Rc<PathNode>>,
}

impl Default for Path {
    fn default() -> Self {
        Self::root()
    }
}

impl Path {
    /// An empty path at the resolution root.
    pub fn root() -> Self {
        Path {
            length: 0,
            node: None,
        }
    }

    /// Append a step. `increment` is `1` for a dependency edge and `0` for
    /// a parent-inheritance edge (see the length-counter rule).
    pub fn push(&self, step: PathStep, increment: u32) -> Path {
        Path {
            length: self.length + increment,
            node: Some(Rc::new(PathNode {
                step,
                parent: self.node.clone(),
            })),
        }
    }

    pub fn length(&self) -> u32 {
        self.length
    }

    /// Steps from root to current, in traversal order.
    pub fn steps(&self) -> Vec<PathStep> {
        let mut out = Vec::new();
        let mut cur = self.node.clone();
        while let Some(node) = cur {
            out.push(node.step.clone());
            cur = node.parent.clone();
        }
        out.reverse();
        out
    }

    /// `"root -> middle -> leaf"` rendering used by the tracer and printer.
    pub fn render(&self) -> String {
        self.steps()
            .into_iter()
            .map(|s| s.coordinate)
            .collect::<Vec<_>>()
            .join(" -> ")
    }

    pub fn is_root(&self) -> bool {
        self.node.is_none()
    }
}

impl std::fmt::Debug for Path {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Path(len={}, {})", self.length, self.render())
    }
}

/// `groupId:artifactId` key used for exclusions and dependency conflict
/// resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Exclusion {
    pub group_id: String,
    pub artifact_id: String,
}

impl Exclusion {
    pub fn new(group_id: impl Into<String>, artifact_id: impl Into<String>) -> Self {
        Exclusion {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
        }
    }

    pub fn key(&self) -> String {
        format!("{}:{}", self.group_id, self.artifact_id)
    }
}

/// Known dependency scopes. `Blank` is the unset state prior to default
/// management and defaulting; it is never a valid scope on a resolved,
/// recursable dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Compile,
    Provided,
    Runtime,
    Test,
    System,
    Import,
    Blank,
}

impl Scope {
    pub fn parse(raw: &str) -> Option<Scope> {
        match raw {
            "" => Some(Scope::Blank),
            "compile" => Some(Scope::Compile),
            "provided" => Some(Scope::Provided),
            "runtime" => Some(Scope::Runtime),
            "test" => Some(Scope::Test),
            "system" => Some(Scope::System),
            "import" => Some(Scope::Import),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Scope::Compile => "compile",
            Scope::Provided => "provided",
            Scope::Runtime => "runtime",
            Scope::Test => "test",
            Scope::System => "system",
            Scope::Import => "import",
            Scope::Blank => "",
        }
    }

    /// Priority used by Rule 4's "strictly higher priority wins" and
    /// Rule 3i's scope-lowering check. Lower index binds tighter
    /// (`compile` is the most expansive, `test` the narrowest).
    pub fn priority(self) -> u8 {
        match self {
            Scope::Compile => 0,
            Scope::Runtime => 1,
            Scope::Provided => 2,
            Scope::System => 3,
            Scope::Test => 4,
            Scope::Import => 5,
            Scope::Blank => 6,
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Recognized dependency packaging types. `Parent` is synthetic: the
/// resolver uses it to route a parent POM through the same dependency
/// pipeline as a real dependency, but it is never emitted in output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DepType {
    Jar,
    Pom,
    Parent,
}

impl DepType {
    pub fn parse(raw: &str) -> Option<DepType> {
        match raw {
            "" | "jar" => Some(DepType::Jar),
            "pom" => Some(DepType::Pom),
            "parent" => Some(DepType::Parent),
            "test-jar" | "zip" | "dll" | "dylib" | "so" => None,
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DepType::Jar => "jar",
            DepType::Pom => "pom",
            DepType::Parent => "parent",
        }
    }
}

impl std::fmt::Display for DepType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Packaging types that are recognized but explicitly non-recursable and
/// silently skipped, per the type validation rule (§4.5 rule 3c in the
/// component design).
pub fn is_silently_skipped_type(raw: &str) -> bool {
    matches!(raw, "test-jar" | "zip" | "dll" | "dylib" | "so")
}

/// The five provenance paths carried alongside a [`Dependency`], recording
/// *why* each group of fields took its current value.
#[derive(Debug, Clone, Default)]
pub struct DependencyPaths {
    /// Where this dependency occurrence itself came from.
    pub paths: Path,
    /// Where the `version` field's value came from (may differ from
    /// `paths` once default/forced management has filled it in).
    pub paths_version: Path,
    /// Where the `scope` field's value came from.
    pub paths_scope: Path,
    /// Where the `optional` field's value came from.
    pub paths_optional: Path,
    /// Where the `exclusions` list came from.
    pub paths_exclusions: Path,
}

impl DependencyPaths {
    pub fn at(path: Path) -> Self {
        DependencyPaths {
            paths: path.clone(),
            paths_version: path.clone(),
            paths_scope: path.clone(),
            paths_optional: path.clone(),
            paths_exclusions: path,
        }
    }
}

/// A single `<dependency>` or `<dependencyManagement><dependency>` entry,
/// or a synthesized `type=parent` pseudo-dependency.
#[derive(Debug, Clone)]
pub struct Dependency {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    pub scope: String,
    pub type_: String,
    pub classifier: String,
    pub optional: String,
    pub exclusions: Vec<Exclusion>,
    /// Set when recursion into this dependency's POM failed and the
    /// caller tolerated a miss; the subtree is pruned but the occurrence
    /// still shows up in `added_dependencies`.
    pub not_found: bool,
    pub provenance: DependencyPaths,
}

impl Dependency {
    pub fn new(group_id: impl Into<String>, artifact_id: impl Into<String>) -> Self {
        Dependency {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: String::new(),
            scope: String::new(),
            type_: String::new(),
            classifier: String::new(),
            optional: String::new(),
            exclusions: Vec::new(),
            not_found: false,
            provenance: DependencyPaths::default(),
        }
    }

    /// `groupId:artifactId` — the conflict-resolution key used by
    /// `computed_dependencies`.
    pub fn key_ga(&self) -> String {
        format!("{}:{}", self.group_id, self.artifact_id)
    }

    /// `groupId:artifactId:type` — the key used by `computed_managements`.
    pub fn key_gat(&self) -> String {
        let effective_type = if self.type_.is_empty() {
            "jar"
        } else {
            self.type_.as_str()
        };
        format!("{}:{}:{}", self.group_id, self.artifact_id, effective_type)
    }

    /// `groupId:artifactId:version` — used for location registration and
    /// display.
    pub fn fullname(&self) -> String {
        format!("{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }

    pub fn effective_type(&self) -> &str {
        if self.type_.is_empty() {
            "jar"
        } else {
            &self.type_
        }
    }

    pub fn is_optional(&self) -> bool {
        self.optional == "true"
    }
}

/// A `<property>` entry, tagged with the provenance of its value.
#[derive(Debug, Clone)]
pub struct Property {
    pub name: String,
    pub value: String,
    pub paths: Path,
}

impl Property {
    pub fn new(name: impl Into<String>, value: impl Into<String>, paths: Path) -> Self {
        Property {
            name: name.into(),
            value: value.into(),
            paths,
        }
    }
}

/// Insertion-ordered `name -> Property` table. Properties are looked up
/// and iterated in declaration order (Maven property expansion does not
/// depend on order, but the printer and tracer surface properties in the
/// order they were declared).
pub type Properties = IndexMap<String, Property>;

/// `groupId:artifactId:version` plus the (unresolved) path to the parent
/// POM, and a back-pointer filled in once the parent has been loaded.
#[derive(Debug, Clone)]
pub struct Parent {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    pub relative_path: String,
    pub resolved_file: Option<PathBuf>,
}

impl Parent {
    pub fn coordinate(&self) -> String {
        format!("{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }
}

/// One activation criterion on a `<profile>`. A profile may combine
/// several; per the spec only one needs to hold for the profile to
/// activate (Maven's actual OR-of-one-condition semantics).
#[derive(Debug, Clone)]
pub enum Activation {
    ActiveByDefault,
    Jdk(String),
    Os {
        name: Option<String>,
        family: Option<String>,
        arch: Option<String>,
        version: Option<String>,
    },
    Property {
        name: String,
        value: Option<String>,
    },
    FileExists(String),
    FileMissing(String),
    /// A recognized-but-unsupported criterion (e.g. a combination the
    /// source does not handle). Always inactive; triggers a warning.
    Unsupported(String),
}

/// A `<profile>`: activation criteria plus an overlay of properties,
/// dependencies, managements and modules merged in when activated.
#[derive(Debug, Clone, Default)]
pub struct Profile {
    pub id: String,
    pub activations: Vec<Activation>,
    pub properties: Vec<(String, String)>,
    pub dependencies: Vec<Dependency>,
    pub managements: Vec<Dependency>,
    pub modules: Vec<String>,
}

impl Profile {
    pub fn new(id: impl Into<String>) -> Self {
        Profile {
            id: id.into(),
            ..Default::default()
        }
    }
}

/// One POM. Raw fields are produced directly by the reader; `computed_*`
/// fields start empty and are populated by the resolver over the course
/// of `resolve_pom`.
#[derive(Debug, Clone)]
pub struct Project {
    pub file: PathBuf,
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    pub packaging: String,
    pub parent: Option<Parent>,
    pub properties: Properties,
    pub managements: Vec<Dependency>,
    pub dependencies: Vec<Dependency>,
    pub modules: Vec<String>,
    pub profiles: Vec<Profile>,

    pub builtins: Properties,
    pub computed_properties: Properties,
    pub initial_managements: IndexMap<String, Dependency>,
    pub computed_managements: IndexMap<String, Dependency>,
    pub added_dependencies: Vec<Dependency>,
    pub computed_dependencies: IndexMap<String, Dependency>,
    pub computed_scope: String,
    pub computed_exclusions: Vec<Exclusion>,
    pub computed_type: String,
}

impl Project {
    pub fn new(file: PathBuf) -> Self {
        Project {
            file,
            group_id: String::new(),
            artifact_id: String::new(),
            version: String::new(),
            packaging: "jar".to_string(),
            parent: None,
            properties: Properties::new(),
            managements: Vec::new(),
            dependencies: Vec::new(),
            modules: Vec::new(),
            profiles: Vec::new(),
            builtins: Properties::new(),
            computed_properties: Properties::new(),
            initial_managements: IndexMap::new(),
            computed_managements: IndexMap::new(),
            added_dependencies: Vec::new(),
            computed_dependencies: IndexMap::new(),
            computed_scope: String::new(),
            computed_exclusions: Vec::new(),
            computed_type: String::new(),
        }
    }

    /// `groupId:artifactId:version`, as used in diagnostics and tracer
    /// output.
    pub fn coordinate(&self) -> String {
        format!("{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }

    /// Resets every `computed_*` field to its empty state. Used by the
    /// loader so a cached raw `Project` can be handed to a fresh
    /// resolution run without re-parsing the file.
    pub fn reset_computed(&mut self) {
        self.builtins = Properties::new();
        self.computed_properties = Properties::new();
        self.initial_managements = IndexMap::new();
        self.computed_managements = IndexMap::new();
        self.added_dependencies = Vec::new();
        self.computed_dependencies = IndexMap::new();
        self.computed_scope = String::new();
        self.computed_exclusions = Vec::new();
        self.computed_type = String::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_length_tracks_increments() {
        let root = Path::root();
        assert_eq!(root.length(), 0);
        let via_parent = root.push(
            PathStep {
                coordinate: "g:p:1".into(),
                file: PathBuf::from("p/pom.xml"),
            },
            0,
        );
        assert_eq!(via_parent.length(), 0);
        let via_dep = via_parent.push(
            PathStep {
                coordinate: "g:c:1".into(),
                file: PathBuf::from("c/pom.xml"),
            },
            1,
        );
        assert_eq!(via_dep.length(), 1);
        assert_eq!(via_dep.render(), "g:p:1 -> g:c:1");
    }

    #[test]
    fn path_clone_shares_structure() {
        let base = Path::root().push(
            PathStep {
                coordinate: "g:a:1".into(),
                file: PathBuf::from("a/pom.xml"),
            },
            1,
        );
        let left = base.push(
            PathStep {
                coordinate: "g:b:1".into(),
                file: PathBuf::from("b/pom.xml"),
            },
            1,
        );
        let right = base.push(
            PathStep {
                coordinate: "g:c:1".into(),
                file: PathBuf::from("c/pom.xml"),
            },
            1,
        );
        assert_eq!(left.length(), 2);
        assert_eq!(right.length(), 2);
        assert_eq!(base.length(), 1);
    }

    #[test]
    fn dependency_keys() {
        let mut dep = Dependency::new("com.x", "lib");
        dep.version = "1.0".into();
        assert_eq!(dep.key_ga(), "com.x:lib");
        assert_eq!(dep.key_gat(), "com.x:lib:jar");
        dep.type_ = "pom".into();
        assert_eq!(dep.key_gat(), "com.x:lib:pom");
        assert_eq!(dep.fullname(), "com.x:lib:1.0");
    }

    #[test]
    fn scope_priority_ordering() {
        assert!(Scope::Compile.priority() < Scope::Runtime.priority());
        assert!(Scope::Runtime.priority() < Scope::Provided.priority());
        assert!(Scope::Provided.priority() < Scope::System.priority());
        assert!(Scope::System.priority() < Scope::Test.priority());
    }

    #[test]
    fn dep_type_rejects_silently_skipped() {
        assert!(DepType::parse("test-jar").is_none());
        assert!(is_silently_skipped_type("test-jar"));
        assert!(!is_silently_skipped_type("jar"));
    }

    #[test]
    fn project_reset_computed_clears_only_computed_fields() {
        let mut project = Project::new(PathBuf::from("pom.xml"));
        project.group_id = "com.x".into();
        project
            .computed_dependencies
            .insert("com.x:lib".into(), Dependency::new("com.x", "lib"));
        project.reset_computed();
        assert_eq!(project.group_id, "com.x");
        assert!(project.computed_dependencies.is_empty());
    }
}
