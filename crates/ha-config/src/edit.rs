//! Line-based text edits over a YAML source
//!
//! Edits address the source by zero-based line and byte column, the same
//! coordinates the [`Outline`](crate::outline::Outline) reports. Everything
//! an edit does not touch (comments, blank lines, quoting, line endings) is
//! copied through unchanged.

use crate::error::{ConfigError, ConfigResult};
use tracing::trace;

/// A single change to the source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    /// Replace `len` bytes at `col` on `line`
    Replace {
        line: usize,
        col: usize,
        len: usize,
        text: String,
    },
    /// Turn the block mapping on `first_line..=last_line` (starting at
    /// `col`) into the single item of a block sequence
    WrapInSequence {
        first_line: usize,
        last_line: usize,
        col: usize,
    },
}

/// Apply edits to `source`
///
/// Replacements run first, right to left within a line, so that columns
/// computed on the original text stay valid; wraps run afterwards.
pub fn apply_edits(source: &str, mut edits: Vec<Edit>) -> ConfigResult<String> {
    let mut lines: Vec<String> = source.split_inclusive('\n').map(str::to_string).collect();

    edits.sort_by(|a, b| edit_order(a).cmp(&edit_order(b)));

    for edit in edits {
        trace!("Applying {:?}", edit);
        match edit {
            Edit::Replace {
                line,
                col,
                len,
                text,
            } => replace(&mut lines, line, col, len, &text)?,
            Edit::WrapInSequence {
                first_line,
                last_line,
                col,
            } => wrap_in_sequence(&mut lines, first_line, last_line, col)?,
        }
    }

    Ok(lines.concat())
}

/// Sort key: replacements (by line, then descending column) before wraps
fn edit_order(edit: &Edit) -> (u8, usize, std::cmp::Reverse<usize>) {
    match edit {
        Edit::Replace { line, col, .. } => (0, *line, std::cmp::Reverse(*col)),
        Edit::WrapInSequence {
            first_line, col, ..
        } => (1, *first_line, std::cmp::Reverse(*col)),
    }
}

fn line_mut(lines: &mut [String], line: usize) -> ConfigResult<&mut String> {
    lines.get_mut(line).ok_or_else(|| ConfigError::InvalidEdit {
        line,
        reason: "line is past the end of the document".to_string(),
    })
}

fn replace(lines: &mut [String], line: usize, col: usize, len: usize, text: &str) -> ConfigResult<()> {
    let target = line_mut(lines, line)?;
    let end = col + len;
    if end > target.len() || !target.is_char_boundary(col) || !target.is_char_boundary(end) {
        return Err(ConfigError::InvalidEdit {
            line,
            reason: format!("span {}..{} does not fit the line", col, end),
        });
    }
    target.replace_range(col..end, text);
    Ok(())
}

fn wrap_in_sequence(
    lines: &mut [String],
    first_line: usize,
    last_line: usize,
    col: usize,
) -> ConfigResult<()> {
    if last_line < first_line {
        return Err(ConfigError::InvalidEdit {
            line: first_line,
            reason: "wrap range is reversed".to_string(),
        });
    }

    let first = line_mut(lines, first_line)?;
    let indent_ok = first.len() >= col && first.as_bytes()[..col].iter().all(|b| *b == b' ');
    if !indent_ok {
        return Err(ConfigError::InvalidEdit {
            line: first_line,
            reason: format!("column {} is not preceded by indentation only", col),
        });
    }
    first.insert_str(col, "- ");

    for line in first_line + 1..=last_line {
        let target = line_mut(lines, line)?;
        if !target.trim().is_empty() {
            target.insert_str(0, "  ");
        }
    }

    // comments trailing the mapping at its indentation move with it
    for target in lines.iter_mut().skip(last_line + 1) {
        let trimmed = target.trim_start_matches(' ');
        if trimmed.trim().is_empty() {
            continue;
        }
        if !trimmed.starts_with('#') || target.len() - trimmed.len() < col {
            break;
        }
        target.insert_str(0, "  ");
    }

    Ok(())
}
