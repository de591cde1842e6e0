use super::library::{BUILTIN_GROUPS_TOML, GroupLibrary};

/// Builtin `groups.toml` with the active vocabulary narrowed to `labels`.
pub(crate) fn groups_toml_with(labels: &[&str]) -> String {
    let start = BUILTIN_GROUPS_TOML
        .find("vocabulary = [")
        .expect("builtin table declares a vocabulary");
    let end = start
        + BUILTIN_GROUPS_TOML[start..]
            .find(']')
            .expect("vocabulary array is closed")
        + 1;
    let quoted: Vec<String> = labels.iter().map(|l| format!("\"{}\"", l)).collect();
    format!(
        "{}vocabulary = [{}]{}",
        &BUILTIN_GROUPS_TOML[..start],
        quoted.join(", "),
        &BUILTIN_GROUPS_TOML[end..]
    )
}

pub(crate) fn library_with(labels: &[&str]) -> GroupLibrary {
    GroupLibrary::from_toml_str(&groups_toml_with(labels)).expect("narrowed builtin library loads")
}
