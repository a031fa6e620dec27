//! Rule requiring namespaces to follow the folder layout.
//!
//! # Rationale
//!
//! When namespaces mirror folders, a type's namespace tells you where its
//! file lives and vice versa.
//!
//! # Expected Namespace
//!
//! The project root's folder name followed by every folder between the
//! root and the file, joined with dots. For root `/work/Proj` and file
//! `/work/Proj/Feature/Sub/File.cs` that is `Proj.Feature.Sub`.
//!
//! # Partial Matches
//!
//! The declared namespace may stop early: `Proj` and `Proj.Feature` both
//! match `Proj.Feature.Sub`. The comparison is a plain ordinal string
//! prefix, so `Proj.Feat` matches as well.
//!
//! Files without a project root, with a relative path, or outside the
//! root are not checked.

use spy_lint_core::{
    DiagnosticDescriptor, FileContext, NodeRef, Rule, RuleError, RuleResult, Severity, SyntaxKind,
    Trigger,
};
use tracing::debug;

/// Rule code for namespace-matches-folder.
pub const CODE: &str = "SPY04";

/// Rule name for namespace-matches-folder.
pub const NAME: &str = "namespace-matches-folder";

const DESCRIPTOR: DiagnosticDescriptor = DiagnosticDescriptor {
    id: CODE,
    name: NAME,
    title: "Namespace does not match folder structure",
    message_format: "Namespace '{0}' does not match folder structure, expected '{1}'",
    category: "Naming",
    default_severity: Severity::Error,
    description: "The declared namespace must match the folder structure. Partial match is allowed.",
};

const TRIGGERS: &[Trigger] = &[
    Trigger::Node(SyntaxKind::NamespaceDeclaration),
    Trigger::Node(SyntaxKind::FileScopedNamespaceDeclaration),
];

/// Flags namespaces that are not a prefix of the folder-derived namespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct NamespaceMatchesFolder;

impl NamespaceMatchesFolder {
    /// Creates the rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// Ordinal, case-sensitive string prefix.
fn is_namespace_prefix(declared: &str, expected: &str) -> bool {
    expected.starts_with(declared)
}

impl Rule for NamespaceMatchesFolder {
    fn descriptor(&self) -> &DiagnosticDescriptor {
        &DESCRIPTOR
    }

    fn triggers(&self) -> &[Trigger] {
        TRIGGERS
    }

    fn check_node(&self, ctx: &FileContext<'_>, node: NodeRef<'_>) -> RuleResult {
        let name = node
            .child_of_kind(SyntaxKind::Name)
            .ok_or_else(|| RuleError::missing_child(node, SyntaxKind::Name))?;
        let declared = name.name_text().ok_or_else(|| {
            RuleError::Inconsistent(format!(
                "namespace name node {} carries no name token",
                name.id().0
            ))
        })?;

        let Some(segments) = ctx.folder_segments() else {
            debug!("{}: no rooted path under project root, skipping", ctx.path.display());
            return Ok(Vec::new());
        };

        let expected = segments.join(".");
        if is_namespace_prefix(declared, &expected) {
            return Ok(Vec::new());
        }

        Ok(vec![DESCRIPTOR.create(
            ctx.location(name.span()),
            &[declared, expected.as_str()],
        )])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{check, Fixture};
    use spy_lint_core::{Engine, EngineError, SourceModel};

    const ROOT: &str = "/work/Proj";
    const FILE: &str = "/work/Proj/Feature/Sub/File.cs";

    fn unit_declaring(namespace: &str, path: &str, root: Option<&str>) -> spy_lint_core::CompilationUnit {
        let mut f = Fixture::new().at(path, root);
        f.open(SyntaxKind::NamespaceDeclaration);
        f.leaf(SyntaxKind::Name, Some(namespace));
        f.leaf(SyntaxKind::ClassDeclaration, Some("Widget"));
        f.close();
        f.finish()
    }

    #[test]
    fn test_root_namespace_is_a_prefix() {
        let diagnostics = check(NamespaceMatchesFolder::new(), unit_declaring("Proj", FILE, Some(ROOT)));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_full_namespace_passes() {
        let unit = unit_declaring("Proj.Feature.Sub", FILE, Some(ROOT));
        assert!(check(NamespaceMatchesFolder::new(), unit).is_empty());
    }

    #[test]
    fn test_unrelated_namespace_reports_declared_and_expected() {
        let diagnostics = check(NamespaceMatchesFolder::new(), unit_declaring("Other", FILE, Some(ROOT)));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].message,
            "Namespace 'Other' does not match folder structure, expected 'Proj.Feature.Sub'"
        );
    }

    #[test]
    fn test_file_scoped_namespace_is_checked() {
        let mut f = Fixture::new().at(FILE, Some(ROOT));
        f.open(SyntaxKind::FileScopedNamespaceDeclaration);
        f.leaf(SyntaxKind::Name, Some("Proj.Other"));
        f.close();

        assert_eq!(check(NamespaceMatchesFolder::new(), f.finish()).len(), 1);
    }

    #[test]
    fn test_partial_segment_matches_as_string_prefix() {
        let unit = unit_declaring("Proj.Feat", FILE, Some(ROOT));
        assert!(check(NamespaceMatchesFolder::new(), unit).is_empty());
    }

    #[test]
    fn test_deeper_than_folder_fails() {
        let unit = unit_declaring("Proj.Feature.Sub.Extra", FILE, Some(ROOT));
        assert_eq!(check(NamespaceMatchesFolder::new(), unit).len(), 1);
    }

    #[test]
    fn test_inapplicable_without_root_or_outside_root() {
        assert!(check(NamespaceMatchesFolder::new(), unit_declaring("Other", FILE, None)).is_empty());
        assert!(check(
            NamespaceMatchesFolder::new(),
            unit_declaring("Other", "/elsewhere/File.cs", Some(ROOT))
        )
        .is_empty());
        assert!(check(
            NamespaceMatchesFolder::new(),
            unit_declaring("Other", "Feature/File.cs", Some(ROOT))
        )
        .is_empty());
    }

    #[test]
    fn test_missing_name_child_is_fatal() {
        let mut f = Fixture::new().at(FILE, Some(ROOT));
        f.leaf(SyntaxKind::NamespaceDeclaration, None);
        let model = SourceModel::new().with_unit(f.finish());

        let engine = Engine::builder()
            .rule(NamespaceMatchesFolder::new())
            .build()
            .expect("engine");
        let err = engine.run(&model).expect_err("should fail");
        match err {
            EngineError::Rule { rule, source, .. } => {
                assert_eq!(rule, CODE);
                assert!(matches!(source, RuleError::MissingChild { expected: SyntaxKind::Name, .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_namespace_prefix() {
        let expected = "Proj.Feature.Sub";
        assert!(is_namespace_prefix("Proj", expected));
        assert!(is_namespace_prefix("Proj.Feature", expected));
        assert!(is_namespace_prefix("Proj.Feat", expected));
        assert!(!is_namespace_prefix("proj", expected));
        assert!(!is_namespace_prefix("Proj.Feature.Sub.Extra", expected));
    }
}
