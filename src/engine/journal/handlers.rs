// Memory Journal — Command Handlers
// Each handler applies one mutation to a filesystem snapshot and reports
// success or a CommandError. No persistence, no journal awareness, no clock:
// the caller supplies `now`, so replay can stamp entries with their own time.

use crate::atoms::constants::VIEW_LINE_NUMBER_WIDTH;
use crate::atoms::error::{CommandError, CommandResult};
use crate::atoms::types::{JournalCommand, MemoryFile, MemoryFileSystem, Timestamp};

/// Insert or overwrite. Overwriting keeps the original `created_at`.
pub fn create(fs: &mut MemoryFileSystem, path: &str, file_text: &str, now: Timestamp) -> CommandResult {
    let created_at = fs.get(path).map(|f| f.created_at).unwrap_or(now);
    let existed = fs.contains(path);
    fs.insert(MemoryFile {
        path: path.to_string(),
        content: file_text.to_string(),
        created_at,
        updated_at: now,
    });
    Ok(if existed {
        format!("File overwritten: {}", path)
    } else {
        format!("File created successfully at: {}", path)
    })
}

pub fn str_replace(
    fs: &mut MemoryFileSystem,
    path: &str,
    old_str: &str,
    new_str: &str,
    now: Timestamp,
) -> CommandResult {
    let file = fs
        .get_mut(path)
        .ok_or_else(|| CommandError::PathNotFound { path: path.to_string() })?;

    // An empty needle matches everywhere; never unique.
    let count = if old_str.is_empty() {
        file.content.len() + 1
    } else {
        file.content.matches(old_str).count()
    };
    if count != 1 || old_str.is_empty() {
        return Err(CommandError::AmbiguousOrMissingMatch { path: path.to_string(), count });
    }

    file.content = file.content.replacen(old_str, new_str, 1);
    file.updated_at = now;
    Ok(format!("The memory file {} has been edited", path))
}

/// Splice `insert_text` in as a new line at 0-based index `insert_line`
/// (0 = before the first line, line_count = after the last).
pub fn insert(
    fs: &mut MemoryFileSystem,
    path: &str,
    insert_line: i64,
    insert_text: &str,
    now: Timestamp,
) -> CommandResult {
    let file = fs
        .get_mut(path)
        .ok_or_else(|| CommandError::PathNotFound { path: path.to_string() })?;

    let mut lines: Vec<&str> = file.content.split('\n').collect();
    let line_count = lines.len();
    let index = usize::try_from(insert_line)
        .ok()
        .filter(|i| *i <= line_count)
        .ok_or_else(|| CommandError::LineOutOfRange {
            path: path.to_string(),
            line: insert_line,
            line_count,
        })?;

    lines.insert(index, insert_text);
    file.content = lines.join("\n");
    file.updated_at = now;
    Ok(format!("Text inserted at line {} in {}", insert_line, path))
}

pub fn delete(fs: &mut MemoryFileSystem, path: &str) -> CommandResult {
    fs.remove(path)
        .map(|_| format!("File deleted: {}", path))
        .ok_or_else(|| CommandError::PathNotFound { path: path.to_string() })
}

/// Move `old_path` to `new_path`, keeping content and `created_at`.
pub fn rename(fs: &mut MemoryFileSystem, old_path: &str, new_path: &str, now: Timestamp) -> CommandResult {
    if !fs.contains(old_path) {
        return Err(CommandError::PathNotFound { path: old_path.to_string() });
    }
    if fs.contains(new_path) {
        return Err(CommandError::DestinationExists { path: new_path.to_string() });
    }
    let Some(mut file) = fs.remove(old_path) else {
        return Err(CommandError::PathNotFound { path: old_path.to_string() });
    };
    file.path = new_path.to_string();
    file.updated_at = now;
    fs.insert(file);
    Ok(format!("Renamed {} to {}", old_path, new_path))
}

/// Read-only. A file path shows numbered content (optionally an inclusive
/// 1-based `[start, end]` range, `end = -1` meaning to the end); any other path
/// is treated as a directory prefix and lists the files beneath it.
pub fn view(fs: &MemoryFileSystem, path: &str, view_range: Option<[i64; 2]>) -> CommandResult {
    if let Some(file) = fs.get(path) {
        return Ok(numbered_lines(&file.content, view_range));
    }

    let prefix = if path.ends_with('/') { path.to_string() } else { format!("{}/", path) };
    let listing: Vec<String> = fs
        .files()
        .filter(|f| f.path.starts_with(&prefix))
        .map(|f| format!("{}\t{}", human_size(f.content.len()), f.path))
        .collect();

    if listing.is_empty() {
        return Err(CommandError::PathNotFound { path: path.to_string() });
    }
    Ok(format!(
        "Here are the files in {}:\n{}",
        path.trim_end_matches('/'),
        listing.join("\n")
    ))
}

/// Apply a journaled command with live (non-replay) semantics.
/// `View` is accepted and changes nothing.
pub fn apply(fs: &mut MemoryFileSystem, command: &JournalCommand, now: Timestamp) -> CommandResult {
    match command {
        JournalCommand::Create { path, file_text } => create(fs, path, file_text, now),
        JournalCommand::StrReplace { path, old_str, new_str } => str_replace(fs, path, old_str, new_str, now),
        JournalCommand::Insert { path, insert_line, insert_text } => {
            insert(fs, path, *insert_line, insert_text, now)
        }
        JournalCommand::Delete { path } => delete(fs, path),
        JournalCommand::Rename { old_path, new_path } => rename(fs, old_path, new_path, now),
        JournalCommand::View { path } => view(fs, path, None),
        JournalCommand::UserEdit { path, file_text } | JournalCommand::UserRollback { path, file_text } => {
            replace_content(fs, path, file_text, now)
        }
    }
}

/// Full-content replacement used for user edits and rollbacks: whatever was
/// at `path` is discarded and `file_text` becomes the content verbatim.
pub fn replace_content(fs: &mut MemoryFileSystem, path: &str, file_text: &str, now: Timestamp) -> CommandResult {
    let _ = delete(fs, path);
    create(fs, path, file_text, now)
}

fn numbered_lines(content: &str, view_range: Option<[i64; 2]>) -> String {
    let lines: Vec<&str> = content.split('\n').collect();
    let (start, end) = match view_range {
        Some([start, end]) => {
            let start = start.max(1) as usize;
            let end = if end < 0 { lines.len() } else { (end as usize).min(lines.len()) };
            (start, end)
        }
        None => (1, lines.len()),
    };
    lines
        .iter()
        .enumerate()
        .skip(start - 1)
        .take(end.saturating_sub(start - 1))
        .map(|(i, line)| format!("{:>width$}\t{}", i + 1, line, width = VIEW_LINE_NUMBER_WIDTH))
        .collect::<Vec<_>>()
        .join("\n")
}

fn human_size(bytes: usize) -> String {
    if bytes < 1024 {
        format!("{}B", bytes)
    } else {
        format!("{:.1}K", bytes as f64 / 1024.0)
    }
}
