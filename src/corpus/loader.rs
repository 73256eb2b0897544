use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use super::{AssetDocument, MemoryCorpus};
use crate::errors::CorpusError;

/// Read one asset document from a JSON file.
pub fn load_asset_file(path: &Path) -> Result<AssetDocument, CorpusError> {
    let display = path.to_string_lossy().to_string();
    let content = fs::read_to_string(path).map_err(|e| CorpusError::Read(display.clone(), e))?;
    serde_json::from_str(&content).map_err(|e| CorpusError::Parse(display, e))
}

/// Load every `*.json` asset under `root`.
///
/// Files that cannot be read or parsed are logged and skipped; only a
/// missing root is an error.
pub fn load_corpus_dir(root: &Path) -> Result<MemoryCorpus, CorpusError> {
    if !root.exists() {
        return Err(CorpusError::RootMissing(root.to_string_lossy().to_string()));
    }

    let mut paths: Vec<_> = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("Failed to walk corpus directory: {e}");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().and_then(|s| s.to_str()) == Some("json"))
        .collect();
    // stable order keeps mining deterministic
    paths.sort();

    let mut corpus = MemoryCorpus::new();
    let mut loaded = 0usize;
    for path in &paths {
        match load_asset_file(path) {
            Ok(asset) => {
                corpus.add_asset(asset);
                loaded += 1;
            }
            Err(e) => tracing::warn!("Skipping corpus file: {e}"),
        }
    }

    tracing::info!(
        root = %root.display(),
        files = paths.len(),
        assets = loaded,
        graphs = corpus.graph_count(),
        nodes = corpus.node_count(),
        skipped = corpus.skipped_count(),
        "Loaded corpus"
    );
    Ok(corpus)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{GraphDocument, NodeDocument};
    use tempfile::TempDir;

    #[test]
    fn test_missing_root_is_an_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            load_corpus_dir(&missing),
            Err(CorpusError::RootMissing(_))
        ));
    }

    #[test]
    fn test_bad_files_are_skipped() {
        let dir = TempDir::new().unwrap();
        let asset = AssetDocument::new("Good")
            .graph(GraphDocument::new("Main").node(NodeDocument::new("a", "A")));
        fs::write(
            dir.path().join("good.json"),
            serde_json::to_string(&asset).unwrap(),
        )
        .unwrap();
        fs::write(dir.path().join("bad.json"), "{ not json").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let corpus = load_corpus_dir(dir.path()).unwrap();
        assert_eq!(corpus.graph_count(), 1);
        assert_eq!(corpus.node_count(), 1);
    }

    #[test]
    fn test_skipped_links_are_counted() {
        let dir = TempDir::new().unwrap();
        let asset = AssetDocument::new("Partial").graph(
            GraphDocument::new("Main")
                .node(NodeDocument::new("a", "A").output("out", "int"))
                .node(NodeDocument::new("b", "B").input("in", "int"))
                .link("a", "out", "b", "in")
                .link("a", "out", "ghost", "in")
                .link("b", "in", "a", "out"),
        );
        fs::write(
            dir.path().join("partial.json"),
            serde_json::to_string(&asset).unwrap(),
        )
        .unwrap();

        let corpus = load_corpus_dir(dir.path()).unwrap();
        assert_eq!(corpus.node_count(), 2);
        assert_eq!(corpus.skipped_count(), 2);
    }
}
