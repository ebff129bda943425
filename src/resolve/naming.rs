//! Mapping from on-disk unit locations to unit identifiers.

/// Namespace every unit identifier is rooted under.
pub const ROOT_NAMESPACE: &str = "SmartVagrant";

/// Uppercase the first character and lowercase the rest.
#[must_use]
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect()
    })
}

/// Identifier of the unit living at `path` (project-relative, no extension).
///
/// A leading `./` and the first `provision/` segment are stripped, the rest
/// is split on `/`, each `-`-separated piece is capitalized and re-joined,
/// and the segments are joined with `::` under [`ROOT_NAMESPACE`].
///
/// ```
/// use smart_provision::resolve::naming::unit_identifier;
///
/// assert_eq!(
///     unit_identifier("plugins/web-stack/provision/packages/Nodejs"),
///     "SmartVagrant::Plugins::WebStack::Packages::Nodejs"
/// );
/// ```
#[must_use]
pub fn unit_identifier(path: &str) -> String {
    let path = path.strip_prefix("./").unwrap_or(path);
    let path = path.replacen("provision/", "", 1);
    std::iter::once(ROOT_NAMESPACE.to_string())
        .chain(
            path.split('/')
                .filter(|segment| !segment.is_empty())
                .map(|segment| segment.split('-').map(capitalize).collect::<String>()),
        )
        .collect::<Vec<_>>()
        .join("::")
}

/// Identifier of the unit for package `name` inside `dir`.
#[must_use]
pub fn package_identifier(dir: &str, name: &str) -> String {
    unit_identifier(&format!("{}/{}", dir.trim_end_matches('/'), capitalize(name)))
}
