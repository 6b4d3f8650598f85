//! Built-in checks.
//!
//! Every check is a pure function of the file path and content. Line numbers
//! in diagnostics are 1-based. Source-structure checks (namespaces, classes,
//! keywords) look at trimmed line prefixes only; nothing here parses a
//! language.
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::rules::{CheckInput, Predicate, RuleDefinition};
use crate::types::Diagnostic;

/// Keywords that must be followed by a space before their open paren.
pub const KEYWORDS_WITH_SPACED_PARENS: [&str; 8] =
    ["catch", "for", "foreach", "if", "lock", "switch", "using", "while"];

static KEYWORD_PAREN: LazyLock<Regex> = LazyLock::new(|| {
    let alternation = KEYWORDS_WITH_SPACED_PARENS.join("|");
    Regex::new(&format!(r"^({alternation})\(")).expect("keyword pattern is valid")
});

static CLASS_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:public |internal )?class\s+([^\s:<{(]+)").expect("class pattern is valid")
});

const CSHARP: &[&str] = &[".cs"];

/// Every rule the catalog knows, one variant per name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    DoNothing,
    NoTabs,
    NoLeadingSpaces,
    TabsVsSpacesOnly,
    ConsistentNewlines,
    ConsistentIndentWidth,
    BadNameSpace,
    BadClassName,
    NoMultiplePublicClasses,
    WindowsNewlines,
    LinuxNewlines,
    OldMacNewlines,
    NeedSpaceAfterKeyword,
}

impl RuleKind {
    pub const ALL: [RuleKind; 13] = [
        RuleKind::DoNothing,
        RuleKind::NoTabs,
        RuleKind::NoLeadingSpaces,
        RuleKind::TabsVsSpacesOnly,
        RuleKind::ConsistentNewlines,
        RuleKind::ConsistentIndentWidth,
        RuleKind::BadNameSpace,
        RuleKind::BadClassName,
        RuleKind::NoMultiplePublicClasses,
        RuleKind::WindowsNewlines,
        RuleKind::LinuxNewlines,
        RuleKind::OldMacNewlines,
        RuleKind::NeedSpaceAfterKeyword,
    ];

    pub fn name(self) -> &'static str {
        match self {
            RuleKind::DoNothing => "DoNothing",
            RuleKind::NoTabs => "NoTabs",
            RuleKind::NoLeadingSpaces => "NoLeadingSpaces",
            RuleKind::TabsVsSpacesOnly => "TabsVsSpacesOnly",
            RuleKind::ConsistentNewlines => "ConsistentNewlines",
            RuleKind::ConsistentIndentWidth => "ConsistentIndentWidth",
            RuleKind::BadNameSpace => "BadNameSpace",
            RuleKind::BadClassName => "BadClassName",
            RuleKind::NoMultiplePublicClasses => "NoMultiplePublicClasses",
            RuleKind::WindowsNewlines => "WindowsNewlines",
            RuleKind::LinuxNewlines => "LinuxNewlines",
            RuleKind::OldMacNewlines => "OldMacNewlines",
            RuleKind::NeedSpaceAfterKeyword => "NeedSpaceAfterKeyword",
        }
    }

    fn extensions(self) -> &'static [&'static str] {
        match self {
            RuleKind::BadNameSpace
            | RuleKind::BadClassName
            | RuleKind::NoMultiplePublicClasses
            | RuleKind::NeedSpaceAfterKeyword => CSHARP,
            _ => &[],
        }
    }

    /// Catalog entry for this rule; all built-ins inspect text files only.
    pub fn definition(self) -> RuleDefinition {
        RuleDefinition::new(self.name(), self)
            .with_kinds(true, false)
            .with_extensions(self.extensions())
    }
}

impl Predicate for RuleKind {
    fn check(&self, input: &CheckInput<'_>) -> Vec<Diagnostic> {
        match self {
            RuleKind::DoNothing => Vec::new(),
            RuleKind::NoTabs => first_bad_line(input, "Tabs not allowed", |l| l.contains('\t')),
            RuleKind::NoLeadingSpaces => {
                first_bad_line(input, "Leading spaces not allowed", |l| l.starts_with(' '))
            }
            RuleKind::TabsVsSpacesOnly => tabs_vs_spaces_only(input),
            RuleKind::ConsistentNewlines => consistent_newlines(input),
            RuleKind::ConsistentIndentWidth => consistent_indent_width(input),
            RuleKind::BadNameSpace => bad_namespace(input),
            RuleKind::BadClassName => bad_class_name(input),
            RuleKind::NoMultiplePublicClasses => no_multiple_public_classes(input),
            RuleKind::WindowsNewlines => windows_newlines(input),
            RuleKind::LinuxNewlines => linux_newlines(input),
            RuleKind::OldMacNewlines => old_mac_newlines(input),
            RuleKind::NeedSpaceAfterKeyword => need_space_after_keyword(input),
        }
    }
}

fn first_bad_line(input: &CheckInput<'_>, message: &str, is_bad: impl Fn(&str) -> bool) -> Vec<Diagnostic> {
    input
        .lines
        .iter()
        .position(|line| is_bad(line.as_str()))
        .map(|idx| Diagnostic::at_line(input.path, idx + 1, message))
        .into_iter()
        .collect()
}

fn trim_blanks(line: &str) -> &str {
    line.trim_matches(|c| c == ' ' || c == '\t')
}

/// Once a tab or a space has been seen in any indent, the first indent
/// character of the other kind fails, including within the same line.
fn tabs_vs_spaces_only(input: &CheckInput<'_>) -> Vec<Diagnostic> {
    let mut seen_tab = false;
    let mut seen_space = false;

    for (idx, line) in input.lines.iter().enumerate() {
        for c in line.chars() {
            match c {
                ' ' if seen_tab => {
                    let msg = "Found first space indent with prior tab indents";
                    return vec![Diagnostic::at_line(input.path, idx + 1, msg)];
                }
                ' ' => seen_space = true,
                '\t' if seen_space => {
                    let msg = "Found first tab indent with prior space indents";
                    return vec![Diagnostic::at_line(input.path, idx + 1, msg)];
                }
                '\t' => seen_tab = true,
                _ => break,
            }
        }
    }
    Vec::new()
}

/// Which newline conventions occur in a text. LF and CR are only counted
/// when they are not part of a CRLF pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewlineStyles {
    pub windows: bool,
    pub linux: bool,
    pub old_mac: bool,
}

impl NewlineStyles {
    pub fn of(text: &str) -> Self {
        let windows = text.contains("\r\n");
        let rest = text.replace("\r\n", "");
        Self {
            windows,
            linux: rest.contains('\n'),
            old_mac: rest.contains('\r'),
        }
    }

    pub fn count(self) -> usize {
        [self.windows, self.linux, self.old_mac].into_iter().filter(|b| *b).count()
    }
}

fn consistent_newlines(input: &CheckInput<'_>) -> Vec<Diagnostic> {
    if NewlineStyles::of(input.text).count() > 1 {
        return vec![Diagnostic::file(input.path, "File uses inconsistent newlines")];
    }
    Vec::new()
}

fn windows_newlines(input: &CheckInput<'_>) -> Vec<Diagnostic> {
    let styles = NewlineStyles::of(input.text);
    newline_violation(input, "Windows", [("Linux", styles.linux), ("Old Mac", styles.old_mac)])
}

fn linux_newlines(input: &CheckInput<'_>) -> Vec<Diagnostic> {
    let styles = NewlineStyles::of(input.text);
    newline_violation(input, "Linux", [("Windows", styles.windows), ("Old Mac", styles.old_mac)])
}

fn old_mac_newlines(input: &CheckInput<'_>) -> Vec<Diagnostic> {
    let styles = NewlineStyles::of(input.text);
    newline_violation(input, "Old Mac", [("Windows", styles.windows), ("Linux", styles.linux)])
}

/// Report the first foreign style found, in the given order.
fn newline_violation(input: &CheckInput<'_>, wanted: &str, foreign: [(&str, bool); 2]) -> Vec<Diagnostic> {
    foreign
        .into_iter()
        .find(|(_, present)| *present)
        .map(|(style, _)| {
            let msg = format!("File contains non-{wanted} ({style}) newlines");
            Diagnostic::file(input.path, msg)
        })
        .into_iter()
        .collect()
}

/// Fails only when the indents are neither all multiples of 3 nor all
/// multiples of 4. The line reported is always the first non-multiple of 4.
fn consistent_indent_width(input: &CheckInput<'_>) -> Vec<Diagnostic> {
    let mut first_non_3: Option<usize> = None;
    let mut first_non_4: Option<usize> = None;

    for (idx, line) in input.lines.iter().enumerate() {
        let spaces = line.chars().take_while(|c| *c == ' ').count();
        if first_non_3.is_none() && spaces % 3 != 0 {
            first_non_3 = Some(idx + 1);
        }
        if first_non_4.is_none() && spaces % 4 != 0 {
            first_non_4 = Some(idx + 1);
        }
    }

    match (first_non_3, first_non_4) {
        (Some(_), Some(line)) => {
            vec![Diagnostic::at_line(input.path, line, "File has first non 4-space indent")]
        }
        _ => Vec::new(),
    }
}

/// Directory part of `path` as a dotted name: drive prefix up to the first
/// colon and a leading separator are dropped, remaining separators become dots.
pub fn path_as_namespace(path: &str) -> String {
    let path = path.replace('\\', "/");
    let dir = path.rfind('/').map_or("", |i| &path[..i]);
    let dir = dir.find(':').map_or(dir, |i| &dir[i + 1..]);
    let dir = dir.strip_prefix('/').unwrap_or(dir);
    dir.replace('/', ".")
}

fn bad_namespace(input: &CheckInput<'_>) -> Vec<Diagnostic> {
    let mut expected: Option<String> = None;
    let mut out = Vec::new();

    for (idx, line) in input.lines.iter().enumerate() {
        let Some(declared) = trim_blanks(line).strip_prefix("namespace ") else {
            continue;
        };
        let declared = declared.trim_end_matches(|c: char| c == '{' || c == ';' || c.is_whitespace());
        let expected = expected.get_or_insert_with(|| path_as_namespace(input.path));

        if !expected.ends_with(&format!(".{declared}")) {
            let msg = format!("Namespace {declared} is not a suffix of {expected}");
            out.push(Diagnostic::at_line(input.path, idx + 1, msg));
        }
    }
    out
}

fn bad_class_name(input: &CheckInput<'_>) -> Vec<Diagnostic> {
    let expected = Path::new(input.path)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    input
        .lines
        .iter()
        .enumerate()
        .filter_map(|(idx, line)| {
            let caps = CLASS_DECL.captures(trim_blanks(line))?;
            let found = caps.get(1)?.as_str();
            (found != expected).then(|| {
                let msg = format!("Class name {found} should be {expected} instead");
                Diagnostic::at_line(input.path, idx + 1, msg)
            })
        })
        .collect()
}

fn no_multiple_public_classes(input: &CheckInput<'_>) -> Vec<Diagnostic> {
    input
        .lines
        .iter()
        .enumerate()
        .filter(|(_, line)| trim_blanks(line).starts_with("public class "))
        .nth(1)
        .map(|(idx, _)| {
            Diagnostic::at_line(input.path, idx + 1, "Cannot have multiple public classes per file")
        })
        .into_iter()
        .collect()
}

fn need_space_after_keyword(input: &CheckInput<'_>) -> Vec<Diagnostic> {
    input
        .lines
        .iter()
        .enumerate()
        .filter_map(|(idx, line)| {
            let caps = KEYWORD_PAREN.captures(trim_blanks(line))?;
            let msg = format!("Need space between keyword {} and open paren", &caps[1]);
            Some(Diagnostic::at_line(input.path, idx + 1, msg))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::split_lines;

    fn run(kind: RuleKind, path: &str, text: &str) -> Vec<String> {
        let lines = split_lines(text);
        let input = CheckInput { path, text, lines: &lines, argument: None };
        kind.check(&input).iter().map(ToString::to_string).collect()
    }

    fn indented(indents: &[usize]) -> String {
        indents.iter().map(|n| format!("{}x\n", " ".repeat(*n))).collect()
    }

    #[test]
    fn do_nothing_always_passes() {
        assert!(run(RuleKind::DoNothing, "/f.txt", "\t  \r\n\r junk").is_empty());
    }

    #[test]
    fn no_tabs_reports_first_tab_line() {
        let out = run(RuleKind::NoTabs, "/f.txt", "ok\nbad\there\n\tagain\n");
        assert_eq!(out, vec!["/f.txt:2: Tabs not allowed"]);
    }

    #[test]
    fn no_leading_spaces_allows_tabs() {
        assert!(run(RuleKind::NoLeadingSpaces, "/f", "\tx\n\t  y\n").is_empty());
        let out = run(RuleKind::NoLeadingSpaces, "/f", "x\n\ty\n  z\n");
        assert_eq!(out, vec!["/f:3: Leading spaces not allowed"]);
    }

    #[test]
    fn tabs_only_file_passes() {
        assert!(run(RuleKind::TabsVsSpacesOnly, "/f", "a\n\tb\n\t\tc\nd\n").is_empty());
    }

    #[test]
    fn space_after_tab_indent_fails_at_that_line() {
        let out = run(RuleKind::TabsVsSpacesOnly, "/f", "a\n\tb\nc\n  d\n");
        assert_eq!(out, vec!["/f:4: Found first space indent with prior tab indents"]);
    }

    #[test]
    fn tab_after_space_indent_fails() {
        let out = run(RuleKind::TabsVsSpacesOnly, "/f", "  a\n\tb\n");
        assert_eq!(out, vec!["/f:2: Found first tab indent with prior space indents"]);
    }

    #[test]
    fn mixed_indent_within_one_line_fails() {
        let out = run(RuleKind::TabsVsSpacesOnly, "/f", "\t x\n");
        assert_eq!(out, vec!["/f:1: Found first space indent with prior tab indents"]);
    }

    #[test]
    fn newline_styles_detection() {
        let s = NewlineStyles::of("a\r\nb\nc\r");
        assert_eq!(s, NewlineStyles { windows: true, linux: true, old_mac: true });
        assert_eq!(s.count(), 3);
        assert_eq!(NewlineStyles::of("no newline").count(), 0);
    }

    #[test]
    fn consistent_newlines() {
        assert!(run(RuleKind::ConsistentNewlines, "/f", "a\r\nb\r\n").is_empty());
        assert!(run(RuleKind::ConsistentNewlines, "/f", "a\nb\n").is_empty());
        let out = run(RuleKind::ConsistentNewlines, "/f", "a\r\nb\nc");
        assert_eq!(out, vec!["/f: File uses inconsistent newlines"]);
    }

    #[test]
    fn windows_newlines_rule() {
        assert!(run(RuleKind::WindowsNewlines, "/f", "a\r\nb\r\n").is_empty());
        assert_eq!(
            run(RuleKind::WindowsNewlines, "/f", "a\r\nb\nc\r"),
            vec!["/f: File contains non-Windows (Linux) newlines"]
        );
        assert_eq!(
            run(RuleKind::WindowsNewlines, "/f", "a\rb"),
            vec!["/f: File contains non-Windows (Old Mac) newlines"]
        );
    }

    #[test]
    fn linux_newlines_rule() {
        assert!(run(RuleKind::LinuxNewlines, "/f", "a\nb\n").is_empty());
        assert_eq!(
            run(RuleKind::LinuxNewlines, "/f", "a\r\nb\r"),
            vec!["/f: File contains non-Linux (Windows) newlines"]
        );
        assert_eq!(
            run(RuleKind::LinuxNewlines, "/f", "a\nb\r"),
            vec!["/f: File contains non-Linux (Old Mac) newlines"]
        );
    }

    #[test]
    fn old_mac_newlines_rule() {
        assert!(run(RuleKind::OldMacNewlines, "/f", "a\rb\r").is_empty());
        assert_eq!(
            run(RuleKind::OldMacNewlines, "/f", "a\rb\r\n"),
            vec!["/f: File contains non-Old Mac (Windows) newlines"]
        );
        assert_eq!(
            run(RuleKind::OldMacNewlines, "/f", "a\rb\n"),
            vec!["/f: File contains non-Old Mac (Linux) newlines"]
        );
    }

    #[test]
    fn indent_width_consistent_threes_or_fours_pass() {
        assert!(run(RuleKind::ConsistentIndentWidth, "/f", &indented(&[0, 3, 6, 9])).is_empty());
        assert!(run(RuleKind::ConsistentIndentWidth, "/f", &indented(&[0, 4, 8, 4])).is_empty());
        assert!(run(RuleKind::ConsistentIndentWidth, "/f", "a\nb\n").is_empty());
    }

    #[test]
    fn indent_width_both_broken_reports_four_space_line() {
        let out = run(RuleKind::ConsistentIndentWidth, "/f", &indented(&[0, 4, 5]));
        assert_eq!(out, vec!["/f:3: File has first non 4-space indent"]);
    }

    #[test]
    fn indent_width_tie_break_prefers_four_space_line_even_when_later() {
        // 3-multiple broken at line 2, 4-multiple broken at line 3.
        let out = run(RuleKind::ConsistentIndentWidth, "/f", &indented(&[0, 4, 6]));
        assert_eq!(out, vec!["/f:3: File has first non 4-space indent"]);
        // 4-multiple broken first (line 2), 3-multiple later (line 3).
        let out = run(RuleKind::ConsistentIndentWidth, "/f", &indented(&[0, 3, 4]));
        assert_eq!(out, vec!["/f:2: File has first non 4-space indent"]);
    }

    #[test]
    fn indent_width_stops_counting_at_tab() {
        assert!(run(RuleKind::ConsistentIndentWidth, "/f", "    \t  x\n   \ty\n").len() == 1);
        assert!(run(RuleKind::ConsistentIndentWidth, "/f", "\t  x\n").is_empty());
    }

    #[test]
    fn path_as_namespace_variants() {
        assert_eq!(path_as_namespace("src/foo/bar/Baz.cs"), "src.foo.bar");
        assert_eq!(path_as_namespace("/repo/src/foo/Baz.cs"), "repo.src.foo");
        assert_eq!(path_as_namespace(r"C:\work\App\Main.cs"), "work.App");
        assert_eq!(path_as_namespace("Baz.cs"), "");
    }

    #[test]
    fn namespace_suffix_of_directory_passes() {
        let path = "src/foo/bar/Baz.cs";
        assert!(run(RuleKind::BadNameSpace, path, "namespace bar\n{\n}\n").is_empty());
        assert!(run(RuleKind::BadNameSpace, path, "  namespace foo.bar {\n").is_empty());
        let abs = "/repo/src/foo/bar/Baz.cs";
        assert!(run(RuleKind::BadNameSpace, abs, "namespace src.foo.bar;\n").is_empty());
        // the full dotted path is not a dot-suffix of itself
        assert_eq!(run(RuleKind::BadNameSpace, path, "namespace src.foo.bar\n").len(), 1);
    }

    #[test]
    fn namespace_not_a_suffix_fails() {
        let out = run(RuleKind::BadNameSpace, "src/foo/bar/Baz.cs", "using X;\nnamespace qux\n");
        assert_eq!(out, vec!["src/foo/bar/Baz.cs:2: Namespace qux is not a suffix of src.foo.bar"]);
        // partial segment is not a dot-suffix
        assert_eq!(run(RuleKind::BadNameSpace, "src/foo/bar/Baz.cs", "namespace ar\n").len(), 1);
    }

    #[test]
    fn each_namespace_declaration_is_checked() {
        let text = "namespace bar\nnamespace x\nnamespace y\n";
        let out = run(RuleKind::BadNameSpace, "src/foo/bar/Baz.cs", text);
        assert_eq!(out.len(), 2);
        assert!(out[0].contains(":2: Namespace x"));
        assert!(out[1].contains(":3: Namespace y"));
    }

    #[test]
    fn class_name_matches_file_stem() {
        assert!(run(RuleKind::BadClassName, "/p/Widget.cs", "public class Widget\n{\n}\n").is_empty());
        assert!(run(RuleKind::BadClassName, "/p/Widget.cs", "  internal class Widget : Base {\n").is_empty());
        assert!(run(RuleKind::BadClassName, "/p/Widget.cs", "class Widget<T>\n").is_empty());
    }

    #[test]
    fn class_name_mismatch_reports_every_line() {
        let text = "public class Gadget\n{\n}\nclass Widget\ninternal class Gizmo\n";
        let out = run(RuleKind::BadClassName, "/p/Widget.cs", text);
        assert_eq!(
            out,
            vec![
                "/p/Widget.cs:1: Class name Gadget should be Widget instead",
                "/p/Widget.cs:5: Class name Gizmo should be Widget instead",
            ]
        );
    }

    #[test]
    fn extra_space_after_class_keyword_still_names_the_class() {
        let out = run(RuleKind::BadClassName, "/p/Widget.cs", "public class  Gadget\n");
        assert_eq!(out, vec!["/p/Widget.cs:1: Class name Gadget should be Widget instead"]);
        assert!(run(RuleKind::BadClassName, "/p/Widget.cs", "class \tWidget\n").is_empty());
    }

    #[test]
    fn other_class_modifiers_are_ignored() {
        assert!(run(RuleKind::BadClassName, "/p/Widget.cs", "public static class Helpers\n").is_empty());
    }

    #[test]
    fn single_public_class_passes() {
        assert!(run(RuleKind::NoMultiplePublicClasses, "/p/X.cs", "public class X\nclass Y\n").is_empty());
    }

    #[test]
    fn second_public_class_fails() {
        let text = "public class X\n{\n}\n  public class Y\npublic class Z\n";
        let out = run(RuleKind::NoMultiplePublicClasses, "/p/X.cs", text);
        assert_eq!(out, vec!["/p/X.cs:4: Cannot have multiple public classes per file"]);
    }

    #[test]
    fn keyword_without_space_fails() {
        assert_eq!(
            run(RuleKind::NeedSpaceAfterKeyword, "/p/A.cs", "    if(x)\n"),
            vec!["/p/A.cs:1: Need space between keyword if and open paren"]
        );
        assert!(run(RuleKind::NeedSpaceAfterKeyword, "/p/A.cs", "if (x)\nifx(y)\nprint(z)\n").is_empty());
    }

    #[test]
    fn keyword_violations_are_reported_separately() {
        let text = "try {\n} catch(e) {\n}\ncatch(e)\n\tfor(;;)\nforeach(var x in y)\n";
        let out = run(RuleKind::NeedSpaceAfterKeyword, "/p/A.cs", text);
        assert_eq!(
            out,
            vec![
                "/p/A.cs:4: Need space between keyword catch and open paren",
                "/p/A.cs:5: Need space between keyword for and open paren",
                "/p/A.cs:6: Need space between keyword foreach and open paren",
            ]
        );
    }

    #[test]
    fn definitions_mirror_kind() {
        let def = RuleKind::BadClassName.definition();
        assert_eq!(def.name, "BadClassName");
        assert!(def.applies_to_text && !def.applies_to_binary);
        assert_eq!(def.extensions, vec![".cs"]);
    }
}
