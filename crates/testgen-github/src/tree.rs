//! Source-file filtering over a recursive git tree.

use crate::types::{TreeEntry, TreeEntryKind};

/// Extensions the generator knows how to write tests for.
const SOURCE_EXTENSIONS: [&str; 6] = ["js", "jsx", "ts", "tsx", "py", "java"];

/// Keep only blob entries whose extension is on the source allow-list.
pub fn filter_source_entries(entries: Vec<TreeEntry>) -> Vec<TreeEntry> {
    entries
        .into_iter()
        .filter(|entry| entry.kind == TreeEntryKind::Blob && has_source_extension(&entry.path))
        .collect()
}

fn has_source_extension(path: &str) -> bool {
    path.rsplit_once('.')
        .is_some_and(|(stem, ext)| !stem.is_empty() && SOURCE_EXTENSIONS.contains(&ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{TreeEntry, TreeEntryKind};

    fn entry(path: &str, kind: TreeEntryKind) -> TreeEntry {
        TreeEntry {
            path: path.to_owned(),
            kind,
            sha: "0000".to_owned(),
            size: None,
        }
    }

    #[test]
    fn keeps_only_source_blobs() {
        let filtered = filter_source_entries(vec![
            entry("src/app.tsx", TreeEntryKind::Blob),
            entry("src", TreeEntryKind::Tree),
            entry("README.md", TreeEntryKind::Blob),
            entry("lib/util.py", TreeEntryKind::Blob),
            entry("Main.java", TreeEntryKind::Blob),
            entry("image.png", TreeEntryKind::Blob),
        ]);

        let paths: Vec<_> = filtered.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["src/app.tsx", "lib/util.py", "Main.java"]);
    }

    #[test]
    fn dotfiles_and_extensionless_paths_are_excluded() {
        let filtered = filter_source_entries(vec![
            entry("Makefile", TreeEntryKind::Blob),
            entry(".ts", TreeEntryKind::Blob),
            entry("scripts/build", TreeEntryKind::Blob),
        ]);
        assert!(filtered.is_empty());
    }
}
