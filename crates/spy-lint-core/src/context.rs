//! Context types for rule execution.

use std::path::{Component, Path, PathBuf};

use crate::model::CompilationUnit;
use crate::semantic::SemanticModel;
use crate::syntax::{NodeId, NodeRef, SyntaxTree, TextSpan};
use crate::types::Location;

/// Read-only view of one compilation unit handed to every rule.
///
/// Contains the unit's tree and semantic model plus path metadata that
/// folder-aware rules use (e.g., the unit's position under the project root).
#[derive(Debug, Clone)]
pub struct FileContext<'a> {
    /// The unit being analyzed.
    pub unit: &'a CompilationUnit,
    /// Path used in reported locations.
    pub path: &'a Path,
    /// Path relative to the project root, when the unit lies under it.
    pub relative_path: Option<PathBuf>,
}

impl<'a> FileContext<'a> {
    /// Creates a new file context.
    #[must_use]
    pub fn new(unit: &'a CompilationUnit) -> Self {
        let relative_path = match (&unit.path, &unit.project_root) {
            (Some(path), Some(root)) if path.is_absolute() => {
                path.strip_prefix(root).ok().map(Path::to_path_buf)
            }
            _ => None,
        };

        Self {
            unit,
            path: unit.display_path(),
            relative_path,
        }
    }

    /// Syntax tree of the unit.
    #[must_use]
    pub fn tree(&self) -> &'a SyntaxTree {
        &self.unit.tree
    }

    /// Semantic model of the unit.
    #[must_use]
    pub fn semantic(&self) -> &'a SemanticModel {
        &self.unit.semantic
    }

    /// Resolves a node id to a navigation handle.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<NodeRef<'a>> {
        self.unit.tree.get(id)
    }

    /// Builds a diagnostic location in this file.
    #[must_use]
    pub fn location(&self, span: TextSpan) -> Location {
        Location::new(self.path.to_path_buf(), span.line, span.column)
            .with_span(span.offset, span.length)
    }

    /// Folder segments from the project root down to the file's directory.
    ///
    /// The first segment is the project root's own folder name. Returns
    /// `None` when the unit has no project root, no rooted path, or lies
    /// outside the root.
    #[must_use]
    pub fn folder_segments(&self) -> Option<Vec<String>> {
        let root = self.unit.project_root.as_deref()?;
        let relative = self.relative_path.as_deref()?;
        let root_name = root.file_name()?.to_str()?.to_string();

        let mut segments = vec![root_name];
        if let Some(dir) = relative.parent() {
            segments.extend(Self::normal_components(dir));
        }
        Some(segments)
    }

    fn normal_components(path: &Path) -> Vec<String> {
        path.components()
            .filter_map(|c| {
                if let Component::Normal(s) = c {
                    s.to_str().map(String::from)
                } else {
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::SemanticModel;
    use crate::syntax::{SyntaxKind, TreeBuilder};

    fn unit(path: Option<&str>, root: Option<&str>) -> CompilationUnit {
        let mut b = TreeBuilder::new();
        b.leaf(SyntaxKind::CompilationUnit, None);
        let mut unit = CompilationUnit::new(b.build().expect("tree"), SemanticModel::new());
        unit.path = path.map(PathBuf::from);
        unit.project_root = root.map(PathBuf::from);
        unit
    }

    #[test]
    fn folder_segments_start_with_root_name() {
        let unit = unit(Some("/work/Proj/Feature/Sub/File.cs"), Some("/work/Proj"));
        let ctx = FileContext::new(&unit);
        assert_eq!(
            ctx.folder_segments(),
            Some(vec![
                "Proj".to_string(),
                "Feature".to_string(),
                "Sub".to_string()
            ])
        );
    }

    #[test]
    fn file_directly_under_root_yields_root_name_only() {
        let unit = unit(Some("/work/Proj/File.cs"), Some("/work/Proj"));
        let ctx = FileContext::new(&unit);
        assert_eq!(ctx.folder_segments(), Some(vec!["Proj".to_string()]));
    }

    #[test]
    fn outside_root_or_unrooted_is_inapplicable() {
        let outside = unit(Some("/elsewhere/File.cs"), Some("/work/Proj"));
        assert_eq!(FileContext::new(&outside).folder_segments(), None);

        let relative = unit(Some("Proj/File.cs"), Some("/work/Proj"));
        assert_eq!(FileContext::new(&relative).folder_segments(), None);

        let no_root = unit(Some("/work/Proj/File.cs"), None);
        assert_eq!(FileContext::new(&no_root).folder_segments(), None);
    }

    #[test]
    fn sibling_folder_with_shared_prefix_is_outside_root() {
        let unit = unit(Some("/work/ProjExtra/File.cs"), Some("/work/Proj"));
        assert_eq!(FileContext::new(&unit).folder_segments(), None);
    }

    #[test]
    fn location_uses_span_coordinates() {
        let unit = unit(Some("/work/Proj/File.cs"), None);
        let ctx = FileContext::new(&unit);
        let loc = ctx.location(TextSpan::new(40, 5, 3, 9));
        assert_eq!(loc.file, PathBuf::from("/work/Proj/File.cs"));
        assert_eq!((loc.line, loc.column, loc.offset, loc.length), (3, 9, 40, 5));
    }
}
