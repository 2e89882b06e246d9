use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn mvnres_cmd() -> Command {
    Command::cargo_bin("mvnres").unwrap()
}

#[test]
fn test_resolve_prints_project_and_dependency_sections() {
    let tmp = TempDir::new().unwrap();
    let pom = tmp.path().join("pom.xml");
    fs::write(
        &pom,
        r#"<project>
            <groupId>com.x</groupId><artifactId>root</artifactId><version>1.0</version>
            <dependencies>
                <dependency><groupId>com.x</groupId><artifactId>leaf</artifactId><version>2.0</version></dependency>
            </dependencies>
        </project>"#,
    )
    .unwrap();

    mvnres_cmd()
        .arg(&pom)
        .arg("--no-color")
        .assert()
        .success()
        .stdout(predicate::str::contains("Project: com.x:root:jar"))
        .stdout(predicate::str::contains("com.x:leaf:jar"))
        .stdout(predicate::str::contains("Tree Dependencies"));
}

#[test]
fn test_resolve_restricts_to_requested_section() {
    let tmp = TempDir::new().unwrap();
    let pom = tmp.path().join("pom.xml");
    fs::write(
        &pom,
        r#"<project>
            <groupId>com.x</groupId><artifactId>root</artifactId><version>1.0</version>
        </project>"#,
    )
    .unwrap();

    mvnres_cmd()
        .arg(&pom)
        .arg("--no-color")
        .args(["--section", "project"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Project: com.x:root:jar"))
        .stdout(predicate::str::contains("Properties").not());
}

#[test]
fn test_unknown_section_is_a_parse_error() {
    let tmp = TempDir::new().unwrap();
    let pom = tmp.path().join("pom.xml");
    fs::write(
        &pom,
        r#"<project>
            <groupId>com.x</groupId><artifactId>root</artifactId><version>1.0</version>
        </project>"#,
    )
    .unwrap();

    mvnres_cmd()
        .arg(&pom)
        .args(["--section", "bogus"])
        .assert()
        .failure();
}

#[test]
fn test_invalid_scope_exits_non_zero() {
    let tmp = TempDir::new().unwrap();
    let pom = tmp.path().join("pom.xml");
    fs::write(
        &pom,
        r#"<project>
            <groupId>com.x</groupId><artifactId>root</artifactId><version>1.0</version>
            <dependencies>
                <dependency><groupId>com.x</groupId><artifactId>leaf</artifactId><version>1.0</version><scope>bogus</scope></dependency>
            </dependencies>
        </project>"#,
    )
    .unwrap();

    mvnres_cmd().arg(&pom).assert().failure();
}
