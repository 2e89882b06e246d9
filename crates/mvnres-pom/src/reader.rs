//! Event-based POM parser built on `quick-xml`.
//!
//! Tracks the current element path as a stack of tag names (namespace
//! prefixes stripped, so both the `http://maven.apache.org/POM/4.0.0`
//! default namespace and no-namespace legacy POMs parse identically) and
//! dispatches on the joined path, the same `a>b>c` context-matching idiom
//! the teacher's POM reader uses.

use std::path::{Path as FsPath, PathBuf};

use quick_xml::events::Event;
use quick_xml::Reader;

use mvnres_core::model::{Activation, Dependency, Exclusion, Parent, Profile, Project};
use mvnres_util::errors::ResolverError;

const DEPENDENCY_ELEMENTS: &[&str] = &[
    "groupId",
    "artifactId",
    "version",
    "type",
    "scope",
    "exclusions",
    "classifier",
    "optional",
    "systemPath",
];

const PARENT_ELEMENTS: &[&str] = &["groupId", "artifactId", "version", "relativePath"];

const PROFILE_ELEMENTS: &[&str] = &[
    "id",
    "activation",
    "dependencies",
    "dependencyManagement",
    "properties",
    "build",
    "repositories",
    "pluginRepositories",
    "modules",
    "file",
    "distributionManagement",
    "reporting",
];

const ACTIVATION_ELEMENTS: &[&str] = &["activeByDefault", "jdk", "property", "os", "file"];
const ACTIVATION_PROPERTY_ELEMENTS: &[&str] = &["name", "value"];
const ACTIVATION_OS_ELEMENTS: &[&str] = &["name", "family", "arch", "version"];
const ACTIVATION_FILE_ELEMENTS: &[&str] = &["exists", "missing"];

/// Read and parse a POM file from disk into a raw [`Project`].
///
/// Produces no parent inheritance, property expansion, or management
/// resolution — just a faithful transcription of what's on the page.
pub fn read_pom(file: &FsPath) -> miette::Result<Project> {
    let xml = std::fs::read_to_string(file).map_err(ResolverError::Io)?;
    parse_pom(file.to_path_buf(), &xml)
}

/// Parse POM XML text already in memory, tagging the resulting [`Project`]
/// with `file` for diagnostics and cache keys.
pub fn parse_pom(file: PathBuf, xml: &str) -> miette::Result<Project> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut project = Project::new(file.clone());
    let mut path: Vec<String> = Vec::new();
    let mut text_buf = String::new();

    let mut current_dep: Option<DepBuilder> = None;
    let mut current_exclusion: Option<Exclusion> = None;
    let mut current_parent: Option<Parent> = None;
    let mut current_profile: Option<ProfileBuilder> = None;
    let mut current_property_name: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                open_element(
                    e,
                    &mut path,
                    &mut text_buf,
                    &file,
                    &project,
                    &mut current_dep,
                    &mut current_exclusion,
                    &mut current_parent,
                    &mut current_profile,
                    &mut current_property_name,
                )?;
            }
            Ok(Event::Empty(ref e)) => {
                // Self-closing tags (`<relativePath/>`) get no separate End
                // event; open then immediately close with empty text.
                open_element(
                    e,
                    &mut path,
                    &mut text_buf,
                    &file,
                    &project,
                    &mut current_dep,
                    &mut current_exclusion,
                    &mut current_parent,
                    &mut current_profile,
                    &mut current_property_name,
                )?;
                close_element(
                    &mut project,
                    &mut path,
                    &mut text_buf,
                    &mut current_dep,
                    &mut current_exclusion,
                    &mut current_parent,
                    &mut current_profile,
                    &mut current_property_name,
                );
            }
            Ok(Event::Text(ref e)) => {
                text_buf = e.unescape().unwrap_or_default().to_string();
            }
            Ok(Event::End(ref _e)) => {
                close_element(
                    &mut project,
                    &mut path,
                    &mut text_buf,
                    &mut current_dep,
                    &mut current_exclusion,
                    &mut current_parent,
                    &mut current_profile,
                    &mut current_property_name,
                );
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ResolverError::MalformedPom {
                    path: file.display().to_string(),
                    message: e.to_string(),
                }
                .into());
            }
            _ => {}
        }
    }

    if project.packaging.is_empty() {
        project.packaging = "jar".to_string();
    }

    synthesize_builtins(&mut project);

    Ok(project)
}

#[allow(clippy::too_many_arguments)]
fn open_element(
    e: &quick_xml::events::BytesStart<'_>,
    path: &mut Vec<String>,
    text_buf: &mut String,
    file: &FsPath,
    project: &Project,
    current_dep: &mut Option<DepBuilder>,
    current_exclusion: &mut Option<Exclusion>,
    current_parent: &mut Option<Parent>,
    current_profile: &mut Option<ProfileBuilder>,
    current_property_name: &mut Option<String>,
) -> miette::Result<()> {
    let tag = local_name(e.name().as_ref());
    validate_child(path, &tag, file, project)?;

    path.push(tag);
    text_buf.clear();
    let ctx = path_context(path);

    match ctx.as_str() {
        "project>dependencyManagement>dependencies>dependency"
        | "project>dependencies>dependency"
        | "project>profiles>profile>dependencyManagement>dependencies>dependency"
        | "project>profiles>profile>dependencies>dependency" => {
            *current_dep = Some(DepBuilder::default());
        }
        _ if ctx.ends_with(">exclusions>exclusion") && current_dep.is_some() => {
            *current_exclusion = Some(Exclusion::new("", ""));
        }
        "project>parent" => {
            *current_parent = Some(Parent {
                group_id: String::new(),
                artifact_id: String::new(),
                version: String::new(),
                relative_path: String::new(),
                resolved_file: None,
            });
        }
        "project>profiles>profile" => {
            *current_profile = Some(ProfileBuilder::default());
        }
        _ if ctx.ends_with(">properties>property") => {
            for attr in e.attributes().flatten() {
                let key = local_name(attr.key.as_ref());
                let value = attr.unescape_value().unwrap_or_default().to_string();
                if key == "name" {
                    *current_property_name = Some(value);
                } else if key == "value" && current_property_name.is_some() {
                    *text_buf = value;
                }
            }
        }
        _ => {}
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn close_element(
    project: &mut Project,
    path: &mut Vec<String>,
    text_buf: &mut String,
    current_dep: &mut Option<DepBuilder>,
    current_exclusion: &mut Option<Exclusion>,
    current_parent: &mut Option<Parent>,
    current_profile: &mut Option<ProfileBuilder>,
    current_property_name: &mut Option<String>,
) {
    let ctx = path_context(path);
    let depth = path.len();

    if depth == 3 && path.get(1).map(String::as_str) == Some("properties") {
        let name = current_property_name
            .take()
            .unwrap_or_else(|| path.last().cloned().unwrap_or_default());
        project.properties.insert(
            name.clone(),
            mvnres_core::model::Property::new(name, text_buf.clone(), Default::default()),
        );
    }

    handle_dependency_end(current_dep, current_exclusion, path, &ctx, text_buf);
    if ctx == "project>dependencies>dependency" {
        if let Some(dep) = current_dep.take() {
            project.dependencies.push(dep.into_dependency());
        }
    }
    if ctx == "project>dependencyManagement>dependencies>dependency" {
        if let Some(dep) = current_dep.take() {
            project.managements.push(dep.into_dependency());
        }
    }
    if ctx == "project>profiles>profile>dependencies>dependency" {
        if let (Some(dep), Some(profile)) = (current_dep.take(), current_profile.as_mut()) {
            profile.dependencies.push(dep.into_dependency());
        }
    }
    if ctx == "project>profiles>profile>dependencyManagement>dependencies>dependency" {
        if let (Some(dep), Some(profile)) = (current_dep.take(), current_profile.as_mut()) {
            profile.managements.push(dep.into_dependency());
        }
    }

    if let Some(parent) = current_parent.as_mut() {
        match path.last().map(String::as_str) {
            Some("groupId") if ctx == "project>parent>groupId" => {
                parent.group_id = text_buf.clone();
            }
            Some("artifactId") if ctx == "project>parent>artifactId" => {
                parent.artifact_id = text_buf.clone();
            }
            Some("version") if ctx == "project>parent>version" => {
                parent.version = text_buf.clone();
            }
            Some("relativePath") if ctx == "project>parent>relativePath" => {
                parent.relative_path = text_buf.clone();
            }
            _ => {}
        }
        if ctx == "project>parent" {
            project.parent = current_parent.take();
        }
    }

    if depth == 2 {
        match path.last().map(String::as_str) {
            Some("groupId") => project.group_id = text_buf.clone(),
            Some("artifactId") => project.artifact_id = text_buf.clone(),
            Some("version") => project.version = text_buf.clone(),
            Some("packaging") => project.packaging = text_buf.clone(),
            _ => {}
        }
    }

    if ctx == "project>modules>module" {
        project.modules.push(text_buf.clone());
    }
    if ctx.ends_with(">profile>modules>module") {
        if let Some(profile) = current_profile.as_mut() {
            profile.modules.push(text_buf.clone());
        }
    }

    if let Some(profile) = current_profile.as_mut() {
        handle_profile_field(profile, path, &ctx, text_buf);
        if depth == 5
            && path.get(1).map(String::as_str) == Some("profiles")
            && path.get(3).map(String::as_str) == Some("properties")
        {
            let name = current_property_name
                .take()
                .unwrap_or_else(|| path.last().cloned().unwrap_or_default());
            profile.properties.push((name, text_buf.clone()));
        }
    }

    if ctx == "project>profiles>profile" {
        if let Some(profile) = current_profile.take() {
            project.profiles.push(profile.into_profile());
        }
    }

    path.pop();
    text_buf.clear();
}

fn synthesize_builtins(project: &mut Project) {
    let mut set = |key: &str, value: &str| {
        project.builtins.insert(
            key.to_string(),
            mvnres_core::model::Property::new(key, value, Default::default()),
        );
    };
    set("artifactId", &project.artifact_id);
    set("groupId", &project.group_id);
    set("version", &project.version);
    set("project.artifactId", &project.artifact_id);
    set("project.groupId", &project.group_id);
    set("project.version", &project.version);
    set("pom.artifactId", &project.artifact_id);
    set("pom.groupId", &project.group_id);
    set("pom.version", &project.version);

    if let Some(parent) = project.parent.clone() {
        let mut set_parent = |key: &str, value: &str| {
            project.builtins.insert(
                key.to_string(),
                mvnres_core::model::Property::new(key, value, Default::default()),
            );
        };
        set_parent("parent.artifactId", &parent.artifact_id);
        set_parent("parent.groupId", &parent.group_id);
        set_parent("parent.version", &parent.version);
        set_parent("project.parent.artifactId", &parent.artifact_id);
        set_parent("project.parent.groupId", &parent.group_id);
        set_parent("project.parent.version", &parent.version);
    }
}

#[derive(Default)]
struct DepBuilder {
    group_id: String,
    artifact_id: String,
    version: String,
    scope: String,
    type_: String,
    classifier: String,
    optional: String,
    exclusions: Vec<Exclusion>,
}

impl DepBuilder {
    fn into_dependency(self) -> Dependency {
        let mut dep = Dependency::new(self.group_id, self.artifact_id);
        dep.version = self.version;
        dep.scope = self.scope;
        dep.type_ = self.type_;
        dep.classifier = self.classifier;
        dep.optional = self.optional;
        dep.exclusions = self.exclusions;
        dep
    }
}

fn handle_dependency_end(
    current_dep: &mut Option<DepBuilder>,
    current_exclusion: &mut Option<Exclusion>,
    path: &[String],
    ctx: &str,
    text_buf: &str,
) {
    let Some(dep) = current_dep.as_mut() else {
        return;
    };

    if let Some(excl) = current_exclusion.as_mut() {
        match path.last().map(String::as_str) {
            Some("groupId") => excl.group_id = text_buf.to_string(),
            Some("artifactId") => excl.artifact_id = text_buf.to_string(),
            _ => {}
        }
        if ctx.ends_with(">exclusion") {
            if let Some(excl) = current_exclusion.take() {
                dep.exclusions.push(excl);
            }
        }
        return;
    }

    match path.last().map(String::as_str) {
        Some("groupId") if ctx.ends_with(">dependency>groupId") => dep.group_id = text_buf.to_string(),
        Some("artifactId") if ctx.ends_with(">dependency>artifactId") => {
            dep.artifact_id = text_buf.to_string()
        }
        Some("version") if ctx.ends_with(">dependency>version") => dep.version = text_buf.to_string(),
        Some("scope") if ctx.ends_with(">dependency>scope") => dep.scope = text_buf.to_string(),
        Some("type") if ctx.ends_with(">dependency>type") => dep.type_ = text_buf.to_string(),
        Some("classifier") if ctx.ends_with(">dependency>classifier") => {
            dep.classifier = text_buf.to_string()
        }
        Some("optional") if ctx.ends_with(">dependency>optional") => {
            dep.optional = text_buf.trim().to_string()
        }
        _ => {}
    }
}

#[derive(Default)]
struct ProfileBuilder {
    id: String,
    active_by_default: bool,
    jdk: Option<String>,
    os_name: Option<String>,
    os_family: Option<String>,
    os_arch: Option<String>,
    os_version: Option<String>,
    property_name: Option<String>,
    property_value: Option<String>,
    file_exists: Option<String>,
    file_missing: Option<String>,
    properties: Vec<(String, String)>,
    dependencies: Vec<Dependency>,
    managements: Vec<Dependency>,
    modules: Vec<String>,
}

impl ProfileBuilder {
    fn into_profile(self) -> Profile {
        let mut profile = Profile::new(self.id);
        if self.active_by_default {
            profile.activations.push(Activation::ActiveByDefault);
        }
        if let Some(jdk) = self.jdk {
            profile.activations.push(Activation::Jdk(jdk));
        }
        if self.os_name.is_some()
            || self.os_family.is_some()
            || self.os_arch.is_some()
            || self.os_version.is_some()
        {
            profile.activations.push(Activation::Os {
                name: self.os_name,
                family: self.os_family,
                arch: self.os_arch,
                version: self.os_version,
            });
        }
        if let Some(name) = self.property_name {
            profile.activations.push(Activation::Property {
                name,
                value: self.property_value,
            });
        }
        if let Some(path) = self.file_exists {
            profile.activations.push(Activation::FileExists(path));
        }
        if let Some(path) = self.file_missing {
            profile.activations.push(Activation::FileMissing(path));
        }
        profile.properties = self.properties;
        profile.dependencies = self.dependencies;
        profile.managements = self.managements;
        profile.modules = self.modules;
        profile
    }
}

fn handle_profile_field(profile: &mut ProfileBuilder, path: &[String], ctx: &str, text_buf: &str) {
    match ctx {
        "project>profiles>profile>id" => profile.id = text_buf.to_string(),
        "project>profiles>profile>activation>activeByDefault" => {
            profile.active_by_default = text_buf.trim() == "true";
        }
        "project>profiles>profile>activation>jdk" => profile.jdk = Some(text_buf.to_string()),
        "project>profiles>profile>activation>property>name" => {
            profile.property_name = Some(text_buf.to_string());
        }
        "project>profiles>profile>activation>property>value" => {
            profile.property_value = Some(text_buf.to_string());
        }
        "project>profiles>profile>activation>os>name" => profile.os_name = Some(text_buf.to_string()),
        "project>profiles>profile>activation>os>family" => {
            profile.os_family = Some(text_buf.to_string());
        }
        "project>profiles>profile>activation>os>arch" => profile.os_arch = Some(text_buf.to_string()),
        "project>profiles>profile>activation>os>version" => {
            profile.os_version = Some(text_buf.to_string());
        }
        "project>profiles>profile>activation>file>exists" => {
            profile.file_exists = Some(text_buf.to_string());
        }
        "project>profiles>profile>activation>file>missing" => {
            profile.file_missing = Some(text_buf.to_string());
        }
        _ => {
            let _ = path;
        }
    }
}

fn local_name(raw: &[u8]) -> String {
    let full = String::from_utf8_lossy(raw);
    match full.rsplit_once(':') {
        Some((_, local)) => local.to_string(),
        None => full.to_string(),
    }
}

fn path_context(path: &[String]) -> String {
    path.join(">")
}

/// Check `tag` against the whitelist for its parent context, if that
/// parent context is one of the ones recognized elements are validated
/// strictly against. Contexts outside this list are read tolerantly.
fn validate_child(
    path: &[String],
    tag: &str,
    file: &FsPath,
    project: &Project,
) -> miette::Result<()> {
    let parent_ctx = path_context(path);

    let whitelist: Option<&[&str]> = match parent_ctx.as_str() {
        "project>parent" => Some(PARENT_ELEMENTS),
        "project>dependencyManagement>dependencies>dependency"
        | "project>dependencies>dependency"
        | "project>profiles>profile>dependencyManagement>dependencies>dependency"
        | "project>profiles>profile>dependencies>dependency" => Some(DEPENDENCY_ELEMENTS),
        "project>profiles>profile" => Some(PROFILE_ELEMENTS),
        _ if parent_ctx.ends_with(">activation") => Some(ACTIVATION_ELEMENTS),
        _ if parent_ctx.ends_with(">activation>property") => Some(ACTIVATION_PROPERTY_ELEMENTS),
        _ if parent_ctx.ends_with(">activation>os") => Some(ACTIVATION_OS_ELEMENTS),
        _ if parent_ctx.ends_with(">activation>file") => Some(ACTIVATION_FILE_ELEMENTS),
        _ => None,
    };

    if let Some(allowed) = whitelist {
        if !allowed.contains(&tag) {
            return Err(ResolverError::UnexpectedElement {
                path: file.display().to_string(),
                tag: format!("{parent_ctx}>{tag}"),
            }
            .into());
        }
    }

    let _ = project;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIMPLE_POM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0">
    <modelVersion>4.0.0</modelVersion>
    <groupId>org.example</groupId>
    <artifactId>my-lib</artifactId>
    <version>1.0.0</version>
    <packaging>jar</packaging>

    <properties>
        <jv>1.8</jv>
    </properties>

    <dependencies>
        <dependency>
            <groupId>com.x</groupId>
            <artifactId>lib</artifactId>
            <version>${jv}</version>
        </dependency>
        <dependency>
            <groupId>junit</groupId>
            <artifactId>junit</artifactId>
            <version>4.13.2</version>
            <scope>test</scope>
        </dependency>
    </dependencies>
</project>"#;

    #[test]
    fn parses_basic_fields_and_dependencies() {
        let project = parse_pom(PathBuf::from("pom.xml"), SIMPLE_POM).unwrap();
        assert_eq!(project.group_id, "org.example");
        assert_eq!(project.artifact_id, "my-lib");
        assert_eq!(project.version, "1.0.0");
        assert_eq!(project.dependencies.len(), 2);
        assert_eq!(project.properties.get("jv").unwrap().value, "1.8");
        assert_eq!(project.dependencies[1].scope, "test");
    }

    #[test]
    fn synthesizes_bare_and_prefixed_builtins() {
        let project = parse_pom(PathBuf::from("pom.xml"), SIMPLE_POM).unwrap();
        assert_eq!(project.builtins.get("artifactId").unwrap().value, "my-lib");
        assert_eq!(
            project.builtins.get("project.artifactId").unwrap().value,
            "my-lib"
        );
        assert_eq!(project.builtins.get("pom.version").unwrap().value, "1.0.0");
    }

    #[test]
    fn parses_parent_and_relative_path() {
        let xml = r#"<?xml version="1.0"?>
<project>
    <parent>
        <groupId>org.example</groupId>
        <artifactId>parent-pom</artifactId>
        <version>2.0.0</version>
        <relativePath>../pom.xml</relativePath>
    </parent>
    <artifactId>child</artifactId>
</project>"#;
        let project = parse_pom(PathBuf::from("child/pom.xml"), xml).unwrap();
        let parent = project.parent.unwrap();
        assert_eq!(parent.group_id, "org.example");
        assert_eq!(parent.relative_path, "../pom.xml");
        assert_eq!(
            project.builtins.get("parent.version").unwrap().value,
            "2.0.0"
        );
    }

    #[test]
    fn rejects_unexpected_dependency_child() {
        let xml = r#"<?xml version="1.0"?>
<project>
    <groupId>g</groupId>
    <artifactId>a</artifactId>
    <version>1</version>
    <dependencies>
        <dependency>
            <groupId>com.x</groupId>
            <artifactId>lib</artifactId>
            <bogus>1</bogus>
        </dependency>
    </dependencies>
</project>"#;
        let result = parse_pom(PathBuf::from("pom.xml"), xml);
        assert!(result.is_err());
    }

    #[test]
    fn tolerates_unrecognized_top_level_elements() {
        let xml = r#"<?xml version="1.0"?>
<project>
    <groupId>g</groupId>
    <artifactId>a</artifactId>
    <version>1</version>
    <name>A project</name>
    <description>does things</description>
    <licenses>
        <license><name>Apache-2.0</name></license>
    </licenses>
</project>"#;
        let project = parse_pom(PathBuf::from("pom.xml"), xml).unwrap();
        assert_eq!(project.artifact_id, "a");
    }

    #[test]
    fn parses_exclusions() {
        let xml = r#"<?xml version="1.0"?>
<project>
    <groupId>g</groupId>
    <artifactId>a</artifactId>
    <version>1</version>
    <dependencies>
        <dependency>
            <groupId>com.example</groupId>
            <artifactId>lib</artifactId>
            <version>1.0</version>
            <exclusions>
                <exclusion>
                    <groupId>commons-logging</groupId>
                    <artifactId>commons-logging</artifactId>
                </exclusion>
            </exclusions>
        </dependency>
    </dependencies>
</project>"#;
        let project = parse_pom(PathBuf::from("pom.xml"), xml).unwrap();
        assert_eq!(project.dependencies[0].exclusions.len(), 1);
        assert_eq!(
            project.dependencies[0].exclusions[0].group_id,
            "commons-logging"
        );
    }

    #[test]
    fn parses_bom_import_management() {
        let xml = r#"<?xml version="1.0"?>
<project>
    <groupId>g</groupId>
    <artifactId>parent</artifactId>
    <version>1.0.0</version>
    <dependencyManagement>
        <dependencies>
            <dependency>
                <groupId>org.example</groupId>
                <artifactId>bom</artifactId>
                <version>1.8.0</version>
                <type>pom</type>
                <scope>import</scope>
            </dependency>
            <dependency>
                <groupId>com.google.guava</groupId>
                <artifactId>guava</artifactId>
                <version>32.0.0-jre</version>
            </dependency>
        </dependencies>
    </dependencyManagement>
</project>"#;
        let project = parse_pom(PathBuf::from("pom.xml"), xml).unwrap();
        assert_eq!(project.managements.len(), 2);
        assert_eq!(project.managements[0].type_, "pom");
        assert_eq!(project.managements[0].scope, "import");
    }

    #[test]
    fn parses_profile_with_activation_and_overlay() {
        let xml = r#"<?xml version="1.0"?>
<project>
    <groupId>g</groupId>
    <artifactId>a</artifactId>
    <version>1</version>
    <profiles>
        <profile>
            <id>jdk17</id>
            <activation>
                <jdk>[17,)</jdk>
                <property>
                    <name>env</name>
                    <value>ci</value>
                </property>
            </activation>
            <properties>
                <extra.flag>on</extra.flag>
            </properties>
            <dependencies>
                <dependency>
                    <groupId>com.y</groupId>
                    <artifactId>mid</artifactId>
                    <version>3.4</version>
                </dependency>
            </dependencies>
        </profile>
    </profiles>
</project>"#;
        let project = parse_pom(PathBuf::from("pom.xml"), xml).unwrap();
        assert_eq!(project.profiles.len(), 1);
        let profile = &project.profiles[0];
        assert_eq!(profile.id, "jdk17");
        assert_eq!(profile.dependencies.len(), 1);
        assert_eq!(profile.properties, vec![("extra.flag".to_string(), "on".to_string())]);
        assert!(profile
            .activations
            .iter()
            .any(|a| matches!(a, Activation::Jdk(v) if v == "[17,)")));
        assert!(profile.activations.iter().any(|a| matches!(
            a,
            Activation::Property { name, value } if name == "env" && value.as_deref() == Some("ci")
        )));
    }
}
