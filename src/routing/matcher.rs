//! Convention matching for directory entries.
//!
//! # Responsibilities
//! - Decide which naming convention a file name satisfies
//! - Report which exports the loaded module must provide
//! - Reject directories whose convention files cannot coexist
//!
//! # Design Decisions
//! - Standard mode: one file per method (`get.rs`, `post.rs`, ...) or a
//!   `page.rs` (GET only) or a `route.rs` (one export per method)
//! - Template mode: a literal or regex file pattern with a configurable
//!   render export; never mixed with standard mode in one configuration
//! - Matching is on the file name only, case-sensitive

use std::collections::BTreeMap;
use std::path::Path;

use regex::Regex;

use crate::routing::error::{RoutingError, RoutingResult};
use crate::routing::types::RouteMethod;

/// Export name a page file provides.
pub const DEFAULT_EXPORT: &str = "default";

/// Accepted template file name.
#[derive(Debug, Clone)]
pub enum FilePattern {
    Literal(String),
    Regex(Regex),
}

impl FilePattern {
    /// Returns `None` on no match, otherwise the first capture group if any.
    fn capture(&self, name: &str) -> Option<Option<String>> {
        match self {
            FilePattern::Literal(literal) => (literal == name).then_some(None),
            FilePattern::Regex(re) => re
                .captures(name)
                .map(|caps| caps.get(1).map(|m| m.as_str().to_string())),
        }
    }
}

/// Template-file convention.
#[derive(Debug, Clone)]
pub struct TemplateConvention {
    pub pattern: FilePattern,
    /// Name of the render function to extract from the module.
    pub export: String,
}

/// Active matching rules for a discovery run.
#[derive(Debug, Clone)]
pub enum Conventions {
    /// Method files plus `page`/`route` files with the given extensions.
    Standard { extensions: Vec<String> },
    Template(TemplateConvention),
}

impl Default for Conventions {
    fn default() -> Self {
        Conventions::Standard {
            extensions: vec!["rs".to_string()],
        }
    }
}

impl Conventions {
    /// Build the matcher for these rules.
    pub fn matcher(&self) -> Box<dyn Matcher> {
        match self {
            Conventions::Standard { extensions } => {
                Box::new(StandardMatcher::new(extensions.clone()))
            }
            Conventions::Template(convention) => {
                Box::new(PatternMatcher::new(convention.clone()))
            }
        }
    }
}

/// Single-file convention kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// `get.rs`, `post.rs`, ...: one method per file.
    Method,
    /// `page.rs`: whole-page default handler served on GET.
    Page,
}

/// What a directory entry name means under the active conventions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    None,
    SingleFile { kind: FileKind, method: RouteMethod },
    /// `route.rs`: every method export becomes a slot.
    MultiFile,
    TemplateMatch {
        export: String,
        capture: Option<String>,
    },
}

impl Classification {
    pub fn is_match(&self) -> bool {
        !matches!(self, Classification::None)
    }

    /// Export names the loaded module is expected to provide.
    pub fn expected_exports(&self) -> Vec<String> {
        match self {
            Classification::None => Vec::new(),
            Classification::SingleFile {
                kind: FileKind::Page,
                ..
            } => vec![DEFAULT_EXPORT.to_string()],
            Classification::SingleFile { method, .. } => vec![method.to_string()],
            Classification::MultiFile => {
                RouteMethod::ALL.iter().map(|m| m.to_string()).collect()
            }
            Classification::TemplateMatch { export, .. } => vec![export.clone()],
        }
    }
}

/// Trait for classifying directory entry names.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    fn classify(&self, name: &str) -> Classification;
}

/// Matches method, page and route files.
#[derive(Debug, Clone)]
pub struct StandardMatcher {
    extensions: Vec<String>,
}

impl StandardMatcher {
    pub fn new(extensions: Vec<String>) -> Self {
        Self { extensions }
    }
}

impl Matcher for StandardMatcher {
    fn classify(&self, name: &str) -> Classification {
        let Some((stem, ext)) = name.rsplit_once('.') else {
            return Classification::None;
        };
        if !self.extensions.iter().any(|e| e == ext) {
            return Classification::None;
        }

        let method = match stem {
            "page" => {
                return Classification::SingleFile {
                    kind: FileKind::Page,
                    method: RouteMethod::Get,
                }
            }
            "route" => return Classification::MultiFile,
            "get" => RouteMethod::Get,
            "put" => RouteMethod::Put,
            "post" => RouteMethod::Post,
            "del" | "delete" => RouteMethod::Delete,
            "patch" => RouteMethod::Patch,
            "head" => RouteMethod::Head,
            "options" => RouteMethod::Options,
            _ => return Classification::None,
        };

        Classification::SingleFile {
            kind: FileKind::Method,
            method,
        }
    }
}

/// Matches template files by literal name or regex.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    convention: TemplateConvention,
}

impl PatternMatcher {
    pub fn new(convention: TemplateConvention) -> Self {
        Self { convention }
    }
}

impl Matcher for PatternMatcher {
    fn classify(&self, name: &str) -> Classification {
        match self.convention.pattern.capture(name) {
            Some(capture) => Classification::TemplateMatch {
                export: self.convention.export.clone(),
                capture,
            },
            None => Classification::None,
        }
    }
}

/// Check that the convention files of one directory can coexist.
///
/// Rejects: `page` with `route`; either of them with method files; two files
/// for the same method; more than one page, route or template file.
pub fn check_conflicts(directory: &Path, files: &[(&str, &Classification)]) -> RoutingResult<()> {
    let mut pages = Vec::new();
    let mut routes = Vec::new();
    let mut templates = Vec::new();
    let mut methods: BTreeMap<RouteMethod, Vec<&str>> = BTreeMap::new();

    for (name, classification) in files {
        match classification {
            Classification::None => {}
            Classification::SingleFile {
                kind: FileKind::Page,
                ..
            } => pages.push(*name),
            Classification::SingleFile {
                kind: FileKind::Method,
                method,
            } => methods.entry(*method).or_default().push(*name),
            Classification::MultiFile => routes.push(*name),
            Classification::TemplateMatch { .. } => templates.push(*name),
        }
    }

    let method_files: Vec<&str> = methods.values().flatten().copied().collect();
    let whole_files = pages.len() + routes.len();

    let conflict: Option<Vec<&str>> = if pages.len() > 1 {
        Some(pages)
    } else if routes.len() > 1 {
        Some(routes)
    } else if templates.len() > 1 {
        Some(templates)
    } else if whole_files > 1 || (whole_files > 0 && !method_files.is_empty()) {
        Some(pages.into_iter().chain(routes).chain(method_files).collect())
    } else {
        methods.into_values().find(|names| names.len() > 1)
    };

    match conflict {
        Some(mut names) => {
            names.sort_unstable();
            Err(RoutingError::StructuralConflict {
                directory: directory.to_path_buf(),
                files: names.into_iter().map(String::from).collect(),
            })
        }
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard() -> StandardMatcher {
        StandardMatcher::new(vec!["rs".into(), "ts".into()])
    }

    #[test]
    fn test_method_files() {
        let matcher = standard();
        assert_eq!(
            matcher.classify("get.rs"),
            Classification::SingleFile {
                kind: FileKind::Method,
                method: RouteMethod::Get
            }
        );
        assert_eq!(
            matcher.classify("del.ts"),
            Classification::SingleFile {
                kind: FileKind::Method,
                method: RouteMethod::Delete
            }
        );
        assert_eq!(matcher.classify("GET.rs"), Classification::None); // Case sensitive
        assert_eq!(matcher.classify("get.py"), Classification::None);
        assert_eq!(matcher.classify("get"), Classification::None);
    }

    #[test]
    fn test_page_and_route_files() {
        let matcher = standard();
        let page = matcher.classify("page.ts");
        assert_eq!(page.expected_exports(), vec!["default".to_string()]);

        let route = matcher.classify("route.rs");
        assert_eq!(route, Classification::MultiFile);
        assert!(route.expected_exports().contains(&"POST".to_string()));

        assert!(!matcher.classify("helpers.rs").is_match());
    }

    #[test]
    fn test_literal_pattern() {
        let matcher = PatternMatcher::new(TemplateConvention {
            pattern: FilePattern::Literal("post.md".into()),
            export: "render".into(),
        });
        assert_eq!(
            matcher.classify("post.md"),
            Classification::TemplateMatch {
                export: "render".into(),
                capture: None
            }
        );
        assert_eq!(matcher.classify("post.md.bak"), Classification::None);
    }

    #[test]
    fn test_regex_pattern_capture() {
        let matcher = PatternMatcher::new(TemplateConvention {
            pattern: FilePattern::Regex(Regex::new(r"^(\w+)\.md$").unwrap()),
            export: "render".into(),
        });
        assert_eq!(
            matcher.classify("index.md"),
            Classification::TemplateMatch {
                export: "render".into(),
                capture: Some("index".into())
            }
        );
        assert_eq!(matcher.classify("index.html"), Classification::None);
    }

    #[test]
    fn test_page_with_route_conflicts() {
        let matcher = standard();
        let page = matcher.classify("page.rs");
        let route = matcher.classify("route.rs");
        let err = check_conflicts(
            Path::new("/app/routes/users"),
            &[("route.rs", &route), ("page.rs", &page)],
        )
        .unwrap_err();

        match err {
            RoutingError::StructuralConflict { directory, files } => {
                assert_eq!(directory, Path::new("/app/routes/users"));
                assert_eq!(files, vec!["page.rs".to_string(), "route.rs".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_method_files_coexist() {
        let matcher = standard();
        let get = matcher.classify("get.rs");
        let post = matcher.classify("post.rs");
        let other = matcher.classify("README.md");
        assert!(check_conflicts(
            Path::new("/r"),
            &[("get.rs", &get), ("post.rs", &post), ("README.md", &other)]
        )
        .is_ok());
    }

    #[test]
    fn test_method_file_with_route_conflicts() {
        let matcher = standard();
        let get = matcher.classify("get.rs");
        let route = matcher.classify("route.rs");
        assert!(check_conflicts(Path::new("/r"), &[("get.rs", &get), ("route.rs", &route)]).is_err());
    }

    #[test]
    fn test_duplicate_method_files_conflict() {
        let matcher = standard();
        let del = matcher.classify("del.rs");
        let delete = matcher.classify("delete.rs");
        assert!(check_conflicts(Path::new("/r"), &[("del.rs", &del), ("delete.rs", &delete)]).is_err());
    }
}
