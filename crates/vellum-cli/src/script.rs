//! The line-based edit script read by the CLI.
//!
//! One command per line; blank lines and lines starting with `#` are
//! skipped.
//!
//! ```text
//! select 6 11          # text offsets, anchor then focus (focus optional)
//! select-path 0.1 0.3  # model paths, dot separated
//! mark bold            # add a mark over the selection
//! unmark bold
//! type hello world     # replace the selection with the rest of the line
//! delete
//! split 2              # split two levels at the selection start
//! merge 1              # merge the elements on either side of path 1
//! move 2.0             # move the selected content to path 2.0
//! wrap span
//! set class intro      # attribute on the element holding the selection
//! set class            # ... or remove it
//! print
//! ```

use anyhow::{Context, Result, anyhow, bail};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Select { anchor: usize, focus: usize },
    SelectPath { start: Vec<usize>, end: Vec<usize> },
    Mark { name: String },
    Unmark { name: String },
    Type { text: String },
    Delete,
    Split { depth: usize },
    Merge { path: Vec<usize> },
    Move { target: Vec<usize> },
    Wrap { tag: String },
    Set { key: String, value: Option<String> },
    Print,
}

/// Parse a whole script, pairing each command with its 1-based line.
pub fn parse_script(source: &str) -> Result<Vec<(usize, Command)>> {
    let mut commands = Vec::new();
    for (index, line) in source.lines().enumerate() {
        let number = index + 1;
        if let Some(command) = parse_line(line).with_context(|| format!("line {number}: {line:?}"))? {
            commands.push((number, command));
        }
    }
    Ok(commands)
}

fn parse_line(line: &str) -> Result<Option<Command>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    let (word, rest) = trimmed.split_once(char::is_whitespace).unwrap_or((trimmed, ""));
    let args: Vec<&str> = rest.split_whitespace().collect();

    let command = match (word, args.as_slice()) {
        ("select", [anchor]) => {
            let at = offset(anchor)?;
            Command::Select { anchor: at, focus: at }
        }
        ("select", [anchor, focus]) => Command::Select {
            anchor: offset(anchor)?,
            focus: offset(focus)?,
        },
        ("select-path", [start]) => {
            let start = path(start)?;
            Command::SelectPath {
                end: start.clone(),
                start,
            }
        }
        ("select-path", [start, end]) => Command::SelectPath {
            start: path(start)?,
            end: path(end)?,
        },
        ("mark", [name]) => Command::Mark { name: name.to_string() },
        ("unmark", [name]) => Command::Unmark { name: name.to_string() },
        // Everything after the first space, so inner spacing survives
        ("type", _) if !rest.is_empty() => Command::Type {
            text: line.trim_start()[word.len() + 1..].to_string(),
        },
        ("delete", []) => Command::Delete,
        ("split", []) => Command::Split { depth: 1 },
        ("split", [depth]) => Command::Split { depth: offset(depth)? },
        ("merge", [at]) => Command::Merge { path: path(at)? },
        ("move", [to]) => Command::Move { target: path(to)? },
        ("wrap", [tag]) => Command::Wrap { tag: tag.to_string() },
        ("set", [key]) => Command::Set {
            key: key.to_string(),
            value: None,
        },
        ("set", [key, ..]) => Command::Set {
            key: key.to_string(),
            value: Some(rest.trim_start()[key.len()..].trim().to_string()),
        },
        ("print", []) => Command::Print,
        _ => bail!("unknown command or wrong arguments"),
    };
    Ok(Some(command))
}

fn offset(text: &str) -> Result<usize> {
    text.parse().map_err(|_| anyhow!("{text:?} is not a number"))
}

fn path(text: &str) -> Result<Vec<usize>> {
    text.split('.').map(offset).collect()
}
