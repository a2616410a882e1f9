//! Convenience macros for extension development.

/// Builds an [`ExtensionInfo`](crate::info::ExtensionInfo).
///
/// # Example
/// ```rust,ignore
/// let info = extension_info!(
///     id: "rb-stats",
///     name: "Review Stats",
///     version: "1.0.0",
///     description: "Adds review statistics columns",
///     author: "Dev"
/// );
/// ```
#[macro_export]
macro_rules! extension_info {
    (
        id: $id:expr,
        name: $name:expr,
        version: $version:expr
    ) => {
        $crate::info::ExtensionInfo::new($id, $name, $version)
    };
    (
        id: $id:expr,
        name: $name:expr,
        version: $version:expr,
        description: $desc:expr,
        author: $author:expr
    ) => {
        $crate::info::ExtensionInfo {
            id: $id.to_string(),
            name: $name.to_string(),
            version: $version.to_string(),
            description: $desc.to_string(),
            author: $author.to_string(),
        }
    };
}
