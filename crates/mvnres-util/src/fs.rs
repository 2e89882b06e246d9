use std::path::{Path, PathBuf};

/// Walk up from `start` looking for a file named `filename`.
/// Returns the path to the directory containing the file, or `None`.
pub fn find_ancestor_with(start: &Path, filename: &str) -> Option<PathBuf> {
    let mut current = start;
    loop {
        let candidate = current.join(filename);
        if candidate.is_file() {
            return Some(current.to_path_buf());
        }
        current = current.parent()?;
    }
}

/// Turn a POM directory argument into the `pom.xml` file it implies,
/// if the argument isn't already a file.
pub fn resolve_root_pom(path: &Path) -> PathBuf {
    if path.is_dir() {
        path.join("pom.xml")
    } else {
        path.to_path_buf()
    }
}
