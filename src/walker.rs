//! Discovery of style and subvariant folders under the input root
//!
//! The input tree is at most two levels deep:
//!
//! ```text
//! svg/
//!   square/          -> square.xml
//!     sq_box.svg
//!   circle/
//!     red/           -> circle_red.xml
//!     blue/          -> circle_blue.xml
//! ```
//!
//! A style folder with subfolders only yields its subvariants. SVG files
//! placed directly inside such a folder are skipped with a warning.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConvertError;

/// Style and optional subvariant an icon belongs to
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StyleContext {
    pub style: String,
    pub subvariant: Option<String>,
}

impl StyleContext {
    /// Create a context for a style folder without subvariants
    pub fn new(style: impl Into<String>) -> Self {
        Self {
            style: style.into(),
            subvariant: None,
        }
    }

    /// Create a context for a subvariant folder of a style
    pub fn with_subvariant(style: impl Into<String>, subvariant: impl Into<String>) -> Self {
        Self {
            style: style.into(),
            subvariant: Some(subvariant.into()),
        }
    }

    /// Output library name: `style` or `style_subvariant`
    pub fn library_name(&self) -> String {
        match &self.subvariant {
            Some(subvariant) => format!("{}_{}", self.style, subvariant),
            None => self.style.clone(),
        }
    }
}

/// A directory to scan together with the context its icons belong to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryGroup {
    pub dir: PathBuf,
    pub context: StyleContext,
}

/// Result of scanning the input root
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discovery {
    pub groups: Vec<LibraryGroup>,
    /// SVG files beside subvariant folders, which belong to no library
    pub skipped: Vec<PathBuf>,
}

/// Enumerate every library group under `root`, logging skipped files
pub fn discover_groups(root: &Path) -> Result<Vec<LibraryGroup>, ConvertError> {
    let discovery = discover(root)?;
    for skipped in &discovery.skipped {
        log::warn!(
            "skipping '{}': its style folder has subvariant folders",
            skipped.display()
        );
    }
    Ok(discovery.groups)
}

/// Scan `root` for library groups and loose files that will be skipped
pub fn discover(root: &Path) -> Result<Discovery, ConvertError> {
    let mut groups = Vec::new();
    let mut skipped = Vec::new();

    for style_dir in subdirectories(root)? {
        let style = file_name(&style_dir);
        let subvariants = subdirectories(&style_dir)?;

        if subvariants.is_empty() {
            groups.push(LibraryGroup {
                context: StyleContext::new(style),
                dir: style_dir,
            });
            continue;
        }

        skipped.extend(svg_files(&style_dir)?);

        for subvariant_dir in subvariants {
            groups.push(LibraryGroup {
                context: StyleContext::with_subvariant(&style, file_name(&subvariant_dir)),
                dir: subvariant_dir,
            });
        }
    }

    Ok(Discovery { groups, skipped })
}

/// List the `.svg` files directly inside `dir`, sorted by name
pub fn svg_files(dir: &Path) -> Result<Vec<PathBuf>, ConvertError> {
    Ok(read_dir_sorted(dir)?
        .into_iter()
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "svg"))
        .collect())
}

fn subdirectories(dir: &Path) -> Result<Vec<PathBuf>, ConvertError> {
    Ok(read_dir_sorted(dir)?
        .into_iter()
        .filter(|path| path.is_dir())
        .collect())
}

fn read_dir_sorted(dir: &Path) -> Result<Vec<PathBuf>, ConvertError> {
    let entries = fs::read_dir(dir).map_err(|e| ConvertError::io(dir, e))?;
    let mut paths = entries
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ConvertError::io(dir, e))?;
    paths.sort();
    Ok(paths)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "<svg/>").unwrap();
    }

    #[test]
    fn test_library_name() {
        assert_eq!(StyleContext::new("square").library_name(), "square");
        assert_eq!(
            StyleContext::with_subvariant("circle", "blue").library_name(),
            "circle_blue"
        );
    }

    #[test]
    fn test_style_without_subvariants() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("square/sq_box.svg"));

        let groups = discover_groups(tmp.path()).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].context, StyleContext::new("square"));
        assert_eq!(groups[0].dir, tmp.path().join("square"));
    }

    #[test]
    fn test_subvariants_replace_style_group() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("circle/red/c_cam_red.svg"));
        touch(&tmp.path().join("circle/blue/c_cam_blue.svg"));
        touch(&tmp.path().join("circle/c_loose.svg"));

        let mut contexts: Vec<_> = discover_groups(tmp.path())
            .unwrap()
            .into_iter()
            .map(|g| g.context)
            .collect();
        contexts.sort();

        assert_eq!(
            contexts,
            vec![
                StyleContext::with_subvariant("circle", "blue"),
                StyleContext::with_subvariant("circle", "red"),
            ]
        );
    }

    #[test]
    fn test_loose_files_beside_subvariants_are_skipped() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("circle/red/c_cam_red.svg"));
        touch(&tmp.path().join("circle/c_loose.svg"));
        touch(&tmp.path().join("circle/c_other.svg"));
        touch(&tmp.path().join("square/sq_box.svg"));

        let discovery = discover(tmp.path()).unwrap();
        assert_eq!(
            discovery.skipped,
            vec![
                tmp.path().join("circle/c_loose.svg"),
                tmp.path().join("circle/c_other.svg"),
            ]
        );
        assert_eq!(discovery.groups.len(), 2);
    }

    #[test]
    fn test_no_skipped_files_without_subvariants() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("square/sq_box.svg"));

        let discovery = discover(tmp.path()).unwrap();
        assert!(discovery.skipped.is_empty());
    }

    #[test]
    fn test_files_in_root_ignored() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("stray.svg"));
        touch(&tmp.path().join("square/sq_box.svg"));

        let groups = discover_groups(tmp.path()).unwrap();
        assert_eq!(groups.len(), 1);
    }

    #[test]
    fn test_empty_style_folder_still_a_group() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("empty")).unwrap();

        let groups = discover_groups(tmp.path()).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].context.library_name(), "empty");
    }

    #[test]
    fn test_svg_files_filters_extension() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("b.svg"));
        touch(&tmp.path().join("a.svg"));
        touch(&tmp.path().join("notes.txt"));
        touch(&tmp.path().join("nested/c.svg"));

        let files = svg_files(tmp.path()).unwrap();
        assert_eq!(
            files,
            vec![tmp.path().join("a.svg"), tmp.path().join("b.svg")]
        );
    }

    #[test]
    fn test_missing_root_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let result = discover_groups(&tmp.path().join("missing"));
        assert!(matches!(result, Err(ConvertError::Io { .. })));
    }
}
