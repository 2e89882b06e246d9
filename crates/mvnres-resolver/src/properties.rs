use mvnres_core::model::{Project, Properties};

fn lookup(name: &str, props: &Properties, builtins: &Properties) -> Option<String> {
    props
        .get(name)
        .map(|p| p.value.clone())
        .or_else(|| builtins.get(name).map(|p| p.value.clone()))
}

/// One pass of `${name}` substitution: unresolved keys are left literal.
fn expand_once(value: &str, props: &Properties, builtins: &Properties) -> String {
    let mut result = String::new();
    let mut rest = value;
    loop {
        match rest.find("${") {
            None => {
                result.push_str(rest);
                break;
            }
            Some(start) => {
                result.push_str(&rest[..start]);
                let after_marker = &rest[start + 2..];
                match after_marker.find('}') {
                    None => {
                        result.push_str(&rest[start..]);
                        break;
                    }
                    Some(end) => {
                        let key = &after_marker[..end];
                        match lookup(key, props, builtins) {
                            Some(value) => result.push_str(&value),
                            None => result.push_str(&rest[start..start + 2 + end + 1]),
                        }
                        rest = &after_marker[end + 1..];
                    }
                }
            }
        }
    }
    result
}

/// Expand `${name}` tokens to a fixpoint: re-expand until a pass changes
/// nothing, including when the only change left is an unresolvable
/// self-reference (the pass is a no-op and the loop halts).
pub fn expand(value: &str, props: &Properties, builtins: &Properties) -> String {
    let mut current = value.to_string();
    loop {
        let next = expand_once(&current, props, builtins);
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Walk `computed_properties` and rewrite each value in place against
/// itself (so properties may reference each other) and the builtins.
pub fn resolve_properties(project: &mut Project) {
    let snapshot = project.computed_properties.clone();
    let builtins = project.builtins.clone();
    for (_, prop) in project.computed_properties.iter_mut() {
        prop.value = expand(&prop.value, &snapshot, &builtins);
    }
}
