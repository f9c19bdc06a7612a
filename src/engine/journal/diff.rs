// Memory Journal — Diff Engine
//
// Two granularities:
//   • compare_file_systems — which paths were added, removed or modified
//     between two snapshots (set membership, exact content inequality).
//   • generate_inline_diff — line-level diff of one file built on a classic
//     dynamic-programming LCS.
//
// The inline diff is lossless in both directions: keeping unchanged and "+ "
// lines rebuilds the new content, keeping unchanged and "- " lines rebuilds
// the old content. The LCS table is O(n·m) in time and space.

use crate::atoms::types::{DiffStats, FileSystemDiff, MemoryFileSystem};
use std::fmt;

pub const UNCHANGED_PREFIX: &str = "  ";
pub const ADDED_PREFIX: &str = "+ ";
pub const REMOVED_PREFIX: &str = "- ";

// ═════════════════════════════════════════════════════════════════════════════
// Filesystem diff
// ═════════════════════════════════════════════════════════════════════════════

/// `added` = in `b` only, `removed` = in `a` only, `modified` = in both with
/// different content. Each list is in path order.
pub fn compare_file_systems(a: &MemoryFileSystem, b: &MemoryFileSystem) -> FileSystemDiff {
    let mut diff = FileSystemDiff::default();

    for file in b.files() {
        match a.get(&file.path) {
            Some(old) if old.content != file.content => diff.modified.push(file.path.clone()),
            Some(_) => {}
            None => diff.added.push(file.path.clone()),
        }
    }
    for path in a.paths() {
        if !b.contains(path) {
            diff.removed.push(path.to_string());
        }
    }
    diff
}

// ═════════════════════════════════════════════════════════════════════════════
// Line diff
// ═════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffLine<'a> {
    Unchanged(&'a str),
    Added(&'a str),
    Removed(&'a str),
}

impl fmt::Display for DiffLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffLine::Unchanged(line) => write!(f, "{}{}", UNCHANGED_PREFIX, line),
            DiffLine::Added(line) => write!(f, "{}{}", ADDED_PREFIX, line),
            DiffLine::Removed(line) => write!(f, "{}{}", REMOVED_PREFIX, line),
        }
    }
}

/// Longest common subsequence of two line slices.
///
/// Fills an (m+1)×(n+1) table of match lengths, then backtracks from (m, n).
/// On ties the walk steps back in `a` first, which attributes divergent runs
/// as removals before additions.
pub fn compute_lcs<'a>(a: &[&'a str], b: &[&str]) -> Vec<&'a str> {
    let (m, n) = (a.len(), b.len());
    let mut table = vec![vec![0usize; n + 1]; m + 1];

    for i in 1..=m {
        for j in 1..=n {
            table[i][j] = if a[i - 1] == b[j - 1] {
                table[i - 1][j - 1] + 1
            } else {
                table[i - 1][j].max(table[i][j - 1])
            };
        }
    }

    let mut common = Vec::with_capacity(table[m][n]);
    let (mut i, mut j) = (m, n);
    while i > 0 && j > 0 {
        if a[i - 1] == b[j - 1] {
            common.push(a[i - 1]);
            i -= 1;
            j -= 1;
        } else if table[i - 1][j] >= table[i][j - 1] {
            i -= 1;
        } else {
            j -= 1;
        }
    }
    common.reverse();
    common
}

/// Structured line diff of `old` → `new` (both split on `\n`).
pub fn diff_lines<'a>(old: &'a str, new: &'a str) -> Vec<DiffLine<'a>> {
    let old_lines: Vec<&str> = old.split('\n').collect();
    let new_lines: Vec<&str> = new.split('\n').collect();
    let lcs = compute_lcs(&old_lines, &new_lines);

    let mut out = Vec::with_capacity(old_lines.len().max(new_lines.len()));
    let (mut i, mut j, mut k) = (0, 0, 0);

    while i < old_lines.len() || j < new_lines.len() {
        let next_common = lcs.get(k).copied();
        let old_line = old_lines.get(i).copied();
        let new_line = new_lines.get(j).copied();

        match (old_line, new_line, next_common) {
            (Some(o), Some(n), Some(c)) if o == c && n == c => {
                out.push(DiffLine::Unchanged(o));
                i += 1;
                j += 1;
                k += 1;
            }
            (Some(o), _, c) if c != Some(o) => {
                out.push(DiffLine::Removed(o));
                i += 1;
            }
            (_, Some(n), c) if c != Some(n) => {
                out.push(DiffLine::Added(n));
                j += 1;
            }
            // `old` sits on the next common line while `new` has run out (or
            // the reverse). Unreachable for a true LCS; consume so we terminate.
            (Some(o), _, _) => {
                out.push(DiffLine::Removed(o));
                i += 1;
            }
            (None, Some(n), _) => {
                out.push(DiffLine::Added(n));
                j += 1;
            }
            (None, None, _) => break,
        }
    }
    out
}

/// Inline diff rendered as `"  "`, `"+ "` and `"- "` prefixed lines.
pub fn generate_inline_diff(old: &str, new: &str) -> Vec<String> {
    diff_lines(old, new).iter().map(ToString::to_string).collect()
}

pub fn diff_stats(lines: &[DiffLine<'_>]) -> DiffStats {
    lines.iter().fold(DiffStats::default(), |mut stats, line| {
        match line {
            DiffLine::Unchanged(_) => stats.unchanged += 1,
            DiffLine::Added(_) => stats.added += 1,
            DiffLine::Removed(_) => stats.removed += 1,
        }
        stats
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atoms::types::MemoryFile;
    use chrono::Utc;

    fn fs(files: &[(&str, &str)]) -> MemoryFileSystem {
        let now = Utc::now();
        files
            .iter()
            .map(|(p, c)| MemoryFile {
                path: p.to_string(),
                content: c.to_string(),
                created_at: now,
                updated_at: now,
            })
            .collect()
    }

    /// Rebuild one side of a rendered diff by dropping the other side's prefix.
    fn rebuild(lines: &[String], drop_prefix: &str) -> String {
        lines
            .iter()
            .filter(|l| !l.starts_with(drop_prefix))
            .map(|l| &l[2..])
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn single_line_change() {
        assert_eq!(generate_inline_diff("hello", "world"), vec!["- hello", "+ world"]);
    }

    #[test]
    fn identical_content_is_all_unchanged() {
        assert_eq!(generate_inline_diff("a\nb", "a\nb"), vec!["  a", "  b"]);
    }

    #[test]
    fn insertion_in_the_middle() {
        assert_eq!(
            generate_inline_diff("a\nc", "a\nb\nc"),
            vec!["  a", "+ b", "  c"]
        );
    }

    #[test]
    fn removals_come_before_additions() {
        assert_eq!(
            generate_inline_diff("a\nx\nc", "a\ny\nc"),
            vec!["  a", "- x", "+ y", "  c"]
        );
    }

    #[test]
    fn round_trip_reconstructs_both_sides() {
        let cases = [
            ("", ""),
            ("", "a"),
            ("a", ""),
            ("a\nb\nc", "c\nb\na"),
            ("x\ny\nx\ny", "y\nx\ny\nx\nz"),
            ("line\n\nline\n", "\nline\nline"),
            ("the quick\nbrown fox\njumps", "the quick\nred fox\njumps\nover"),
        ];
        for (old, new) in cases {
            let lines = generate_inline_diff(old, new);
            assert_eq!(rebuild(&lines, REMOVED_PREFIX), new, "new side of {:?} → {:?}", old, new);
            assert_eq!(rebuild(&lines, ADDED_PREFIX), old, "old side of {:?} → {:?}", old, new);
        }
    }

    #[test]
    fn lcs_prefers_stepping_in_a_on_ties() {
        let a = ["x", "y"];
        let b = ["y", "x"];
        // Both "x" and "y" are length-1 LCSs; stepping back in `a` first keeps "x".
        assert_eq!(compute_lcs(&a, &b), vec!["x"]);
        assert_eq!(generate_inline_diff("x\ny", "y\nx"), vec!["+ y", "  x", "- y"]);
        assert_eq!(compute_lcs(&["a", "b", "c"], &["a", "c"]), vec!["a", "c"]);
        assert!(compute_lcs(&[], &["a"]).is_empty());
    }

    #[test]
    fn stats_count_each_kind() {
        let lines = diff_lines("a\nb\nc", "a\nc\nd");
        assert_eq!(diff_stats(&lines), DiffStats { added: 1, removed: 1, unchanged: 2 });
    }

    #[test]
    fn compare_file_systems_detects_each_change_kind() {
        let a = fs(&[("/keep", "1"), ("/gone", "2"), ("/edit", "3")]);
        let b = fs(&[("/keep", "1"), ("/edit", "33"), ("/new", "4")]);
        let diff = compare_file_systems(&a, &b);
        assert_eq!(diff.added, vec!["/new"]);
        assert_eq!(diff.removed, vec!["/gone"]);
        assert_eq!(diff.modified, vec!["/edit"]);
        assert_eq!(diff.total(), 3);
    }

    #[test]
    fn compare_file_systems_is_symmetric() {
        let a = fs(&[("/a", "1"), ("/b", "2")]);
        let b = fs(&[("/b", "3"), ("/c", "4")]);
        let ab = compare_file_systems(&a, &b);
        let ba = compare_file_systems(&b, &a);
        assert_eq!(ab.added, ba.removed);
        assert_eq!(ab.removed, ba.added);
        assert_eq!(ab.modified, ba.modified);
        assert!(compare_file_systems(&a, &a).is_empty());
    }
}
