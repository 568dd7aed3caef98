//! Document loading and front-matter metadata extraction.
//!
//! Recursively discovers markdown files under the corpus root and parses
//! each into a [`Document`]. Metadata precedence: explicit front-matter
//! fields override path-derived values; a top-level heading supplies the
//! title when front-matter does not. Per-file failures are logged and skip
//! only that file; a single bad document never aborts the batch.

use crate::types::Document;
use nexus_core::{AppError, AppResult};
use serde::Deserialize;
use std::path::Path;
use walkdir::WalkDir;

/// Category assigned to documents that live directly in the corpus root.
const DEFAULT_CATEGORY: &str = "general";

/// Optional metadata block at the start of a document.
#[derive(Debug, Default, Deserialize)]
struct FrontMatter {
    id: Option<String>,
    title: Option<String>,
    category: Option<String>,
}

/// Load all handbook documents under `root`, in sorted path order.
///
/// # Errors
/// Returns `AppError::NotFound` if the corpus root does not exist. Per-file
/// errors are recovered locally.
pub fn load_documents(root: &Path) -> AppResult<Vec<Document>> {
    if !root.exists() {
        return Err(AppError::NotFound(format!(
            "Corpus directory not found: {}",
            root.display()
        )));
    }

    let mut files: Vec<_> = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.path().is_file()
                && entry.path().extension().and_then(|e| e.to_str()) == Some("md")
        })
        .map(|entry| entry.into_path())
        .collect();
    files.sort();

    let mut documents = Vec::with_capacity(files.len());

    for path in &files {
        match load_document(root, path) {
            Ok(doc) => documents.push(doc),
            Err(e) => {
                tracing::warn!("Skipping {}: {}", path.display(), e);
            }
        }
    }

    tracing::info!(
        "Loaded {} documents from {} ({} files found)",
        documents.len(),
        root.display(),
        files.len()
    );

    Ok(documents)
}

/// Parse a single document file.
fn load_document(root: &Path, path: &Path) -> AppResult<Document> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| AppError::Ingest(format!("Failed to read file: {}", e)))?;

    // Some editors prepend a UTF-8 BOM.
    let content = raw.strip_prefix('\u{feff}').unwrap_or(&raw);

    let relative = path.strip_prefix(root).unwrap_or(path);
    let source_file = relative.to_string_lossy().replace('\\', "/");

    let mut id = derive_id(relative);
    let mut category = derive_category(relative);
    let mut title = None;

    let (front_matter, body) = split_front_matter(content);

    if let Some(yaml) = front_matter {
        // The body is already separated out above, so malformed metadata
        // degrades to path-derived defaults without losing the document.
        match serde_yaml::from_str::<FrontMatter>(yaml) {
            Ok(fields) => {
                if let Some(value) = fields.id {
                    id = value;
                }
                if let Some(value) = fields.category {
                    category = value;
                }
                title = fields.title;
            }
            Err(e) => {
                tracing::warn!("Invalid front-matter in {}: {}", source_file, e);
            }
        }
    }

    let title = title
        .or_else(|| first_heading(body))
        .unwrap_or_else(|| title_case(&file_stem(relative)));

    Ok(Document {
        id,
        title,
        category,
        content: body.to_string(),
        source_file,
    })
}

/// Split a delimited front-matter block from the body.
///
/// The body after the second marker is ALWAYS the clean content, whether or
/// not the block between the markers parses as YAML.
fn split_front_matter(content: &str) -> (Option<&str>, &str) {
    if !content.starts_with("---") {
        return (None, content);
    }

    let mut parts = content.splitn(3, "---");
    let _leading = parts.next();

    match (parts.next(), parts.next()) {
        (Some(yaml), Some(body)) => (Some(yaml), body.trim()),
        _ => (None, content),
    }
}

/// Derive a document id from its relative path.
///
/// `benefits/vacation_policy.md` becomes `benefits-vacation_policy`.
/// Deterministic: the same path always yields the same id.
fn derive_id(relative: &Path) -> String {
    let without_ext = relative.with_extension("");
    without_ext
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("-")
}

/// Derive a category from the first folder component, or the sentinel
/// value for documents at the corpus root.
fn derive_category(relative: &Path) -> String {
    let components: Vec<_> = relative.components().collect();
    if components.len() > 1 {
        title_case(&components[0].as_os_str().to_string_lossy())
    } else {
        DEFAULT_CATEGORY.to_string()
    }
}

fn file_stem(relative: &Path) -> String {
    relative
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Find the first top-level markdown heading in the body.
fn first_heading(body: &str) -> Option<String> {
    body.lines()
        .find(|line| line.starts_with("# "))
        .map(|line| line[2..].trim().to_string())
        .filter(|heading| !heading.is_empty())
}

/// `vacation_policy` / `it-security` -> `Vacation Policy` / `It Security`.
fn title_case(raw: &str) -> String {
    raw.replace(['_', '-'], " ")
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_doc(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_front_matter_overrides_path_metadata() {
        let dir = TempDir::new().unwrap();
        write_doc(
            dir.path(),
            "benefits/vacation_policy.md",
            "---\nid: vacation\ntitle: Vacation Policy\ncategory: Benefits\n---\nYou get 25 days.",
        );

        let docs = load_documents(dir.path()).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, "vacation");
        assert_eq!(docs[0].title, "Vacation Policy");
        assert_eq!(docs[0].category, "Benefits");
        assert_eq!(docs[0].content, "You get 25 days.");
        assert!(!docs[0].content.contains("---"));
    }

    #[test]
    fn test_path_derived_metadata_without_front_matter() {
        let dir = TempDir::new().unwrap();
        write_doc(
            dir.path(),
            "it-security/vpn_setup.md",
            "Use the company VPN.",
        );

        let docs = load_documents(dir.path()).unwrap();
        assert_eq!(docs[0].id, "it-security-vpn_setup");
        assert_eq!(docs[0].title, "Vpn Setup");
        assert_eq!(docs[0].category, "It Security");
        assert_eq!(docs[0].source_file, "it-security/vpn_setup.md");
    }

    #[test]
    fn test_root_level_document_gets_sentinel_category() {
        let dir = TempDir::new().unwrap();
        write_doc(dir.path(), "welcome.md", "Welcome aboard.");

        let docs = load_documents(dir.path()).unwrap();
        assert_eq!(docs[0].category, "general");
        assert_eq!(docs[0].id, "welcome");
    }

    #[test]
    fn test_heading_supplies_title_when_front_matter_does_not() {
        let dir = TempDir::new().unwrap();
        write_doc(
            dir.path(),
            "handbook_intro.md",
            "# Welcome to the Company\n\nIntro text.",
        );

        let docs = load_documents(dir.path()).unwrap();
        assert_eq!(docs[0].title, "Welcome to the Company");
    }

    #[test]
    fn test_front_matter_title_beats_heading() {
        let dir = TempDir::new().unwrap();
        write_doc(
            dir.path(),
            "intro.md",
            "---\ntitle: Official Title\n---\n# Heading Title\n\nBody.",
        );

        let docs = load_documents(dir.path()).unwrap();
        assert_eq!(docs[0].title, "Official Title");
    }

    #[test]
    fn test_malformed_front_matter_still_strips_block() {
        let dir = TempDir::new().unwrap();
        write_doc(
            dir.path(),
            "policies/remote.md",
            "---\n: not : valid : yaml [\n---\nRemote work is allowed.",
        );

        let docs = load_documents(dir.path()).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].content, "Remote work is allowed.");
        // Metadata degrades to path-derived values.
        assert_eq!(docs[0].id, "policies-remote");
        assert_eq!(docs[0].category, "Policies");
    }

    #[test]
    fn test_unreadable_file_skips_only_that_file() {
        let dir = TempDir::new().unwrap();
        write_doc(dir.path(), "good.md", "Readable content.");
        fs::write(dir.path().join("bad.md"), [0xff, 0xfe, 0x00, 0x80]).unwrap();

        let docs = load_documents(dir.path()).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, "good");
    }

    #[test]
    fn test_missing_corpus_root_is_not_found() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");

        let result = load_documents(&missing);
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_bom_is_stripped() {
        let dir = TempDir::new().unwrap();
        write_doc(dir.path(), "bom.md", "\u{feff}---\nid: bom-doc\n---\nBody.");

        let docs = load_documents(dir.path()).unwrap();
        assert_eq!(docs[0].id, "bom-doc");
        assert_eq!(docs[0].content, "Body.");
    }

    #[test]
    fn test_id_is_deterministic() {
        assert_eq!(
            derive_id(Path::new("benefits/vacation_policy.md")),
            "benefits-vacation_policy"
        );
        assert_eq!(
            derive_id(Path::new("benefits/vacation_policy.md")),
            "benefits-vacation_policy"
        );
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("vacation_policy"), "Vacation Policy");
        assert_eq!(title_case("it-security"), "It Security");
        assert_eq!(title_case("README"), "Readme");
    }

    #[test]
    fn test_split_front_matter_without_closing_marker() {
        let (front, body) = split_front_matter("---\nid: x\nno closing marker");
        assert!(front.is_none());
        assert!(body.starts_with("---"));
    }
}
