//! Name normalization.
//!
//! Pure helpers mapping operation names, namespaces and tag keys onto
//! identifiers the metrics backend accepts. Every function here is
//! deterministic: the registry keys vectors on their output.

/// Replace every character outside `[A-Za-z0-9-_/.]` with `-`.
pub fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '/' | '.') {
                c
            } else {
                '-'
            }
        })
        .collect()
}

/// Replace `.` and `-` with `_`.
pub fn identifier(name: &str) -> String {
    name.replace(['.', '-'], "_")
}

/// Fully-qualified metric name: `namespace:name`, each half passed
/// through [`identifier`]. Degenerates to whichever half is non-empty.
pub fn qualify(name: &str, namespace: &str) -> String {
    match (namespace.is_empty(), name.is_empty()) {
        (true, _) => identifier(name),
        (false, true) => identifier(namespace),
        (false, false) => format!("{}:{}", identifier(namespace), identifier(name)),
    }
}

/// Prometheus label-name grammar: `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_label_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
