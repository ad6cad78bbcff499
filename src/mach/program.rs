use crate::error;
use crate::lang::ast::ListRange;
use crate::lang::{Error, MAX_LINE_NUMBER};
use std::collections::BTreeMap;
use std::path::Path;

type Result<T> = std::result::Result<T, Error>;

/// ## Program store
///
/// Line number to raw statement text, executed in ascending numeric
/// order. Submitting an empty text deletes the line.
#[derive(Debug, Default)]
pub struct Program {
    lines: BTreeMap<u16, String>,
}

impl Program {
    pub fn new() -> Program {
        Program::default()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn insert(&mut self, number: u16, text: &str) {
        if text.is_empty() {
            self.lines.remove(&number);
        } else {
            self.lines.insert(number, text.to_string());
        }
    }

    pub fn text(&self, number: u16) -> Option<&str> {
        self.lines.get(&number).map(|s| s.as_str())
    }

    pub fn contains(&self, number: u16) -> bool {
        self.lines.contains_key(&number)
    }

    /// The snapshot RUN executes from.
    pub fn sorted_numbers(&self) -> Vec<u16> {
        self.lines.keys().copied().collect()
    }

    pub fn list(&self, range: &ListRange) -> Vec<(u16, &str)> {
        let from = range.from.unwrap_or(0);
        let to = match (range.to, range.dashed) {
            (Some(to), _) => to,
            (None, true) => MAX_LINE_NUMBER,
            // a bare number lists only that line
            (None, false) => match range.from {
                Some(n) => n,
                None => MAX_LINE_NUMBER,
            },
        };
        self.lines
            .range(from..=to)
            .map(|(n, s)| (*n, s.as_str()))
            .collect()
    }

    // DATA scanning for READ. A data line is one whose text starts
    // with the keyword; its items are the raw rest of the line.
    fn data_items(text: &str) -> Option<&str> {
        let trimmed = text.trim_start();
        if trimmed.starts_with("dA") {
            Some(trimmed[2..].trim_start())
        } else if trimmed.len() >= 4 && trimmed[..4].eq_ignore_ascii_case("data") {
            Some(trimmed[4..].trim_start())
        } else {
            None
        }
    }

    pub fn first_data_line(&self) -> Option<u16> {
        self.lines
            .iter()
            .find(|(_, text)| Program::data_items(text).is_some())
            .map(|(n, _)| *n)
    }

    pub fn next_data_line(&self, after: u16) -> Option<u16> {
        self.lines
            .range(after..)
            .filter(|(n, _)| **n > after)
            .find(|(_, text)| Program::data_items(text).is_some())
            .map(|(n, _)| *n)
    }

    /// The nth comma-separated item of a DATA line, if present.
    pub fn data_item(&self, line: u16, index: usize) -> Option<&str> {
        let items = Program::data_items(self.text(line)?)?;
        items.split(',').nth(index)
    }

    /// Serialize as `"<lineNumber> <statementText>"`, ascending, one
    /// line each.
    pub fn to_source(&self) -> String {
        let mut out = String::new();
        for (number, text) in self.lines.iter() {
            out.push_str(&format!("{} {}\n", number, text));
        }
        out
    }

    /// Parse saved source. Lines starting with a digit carry their own
    /// numbers; otherwise the whole file is auto-numbered by order.
    pub fn from_source(source: &str) -> Result<Program> {
        let mut program = Program::new();
        let numbered = source
            .lines()
            .find(|l| !l.trim().is_empty())
            .map(|l| l.trim_start().starts_with(|c: char| c.is_ascii_digit()))
            .unwrap_or(true);
        let mut auto = 10u16;
        for line in source.lines() {
            let line = line.trim_end();
            if line.trim().is_empty() {
                continue;
            }
            if numbered {
                let mut split = line.trim_start().splitn(2, char::is_whitespace);
                let number = match split.next().unwrap_or("").parse::<u16>() {
                    Ok(n) if n <= MAX_LINE_NUMBER => n,
                    _ => return Err(error!(FileError; "INVALID FILE TYPE")),
                };
                program.insert(number, split.next().unwrap_or("").trim());
            } else {
                program.insert(auto, line.trim());
                auto = match auto.checked_add(10) {
                    Some(n) => n,
                    None => return Err(error!(FileError; "FILE TOO LONG")),
                };
            }
        }
        Ok(program)
    }

    /// Fetch program text from the drive directory or, when the name
    /// is a URL, over HTTP. Returns the resolved name and the source.
    pub fn fetch_source(name: &str, drive: &Path) -> Result<(String, String)> {
        if name.starts_with("http://") || name.starts_with("https://") {
            let response = reqwest::blocking::get(name)
                .and_then(|r| r.error_for_status())
                .map_err(|e| error!(FileError).message(&e.to_string().to_ascii_uppercase()))?;
            let text = response
                .text()
                .map_err(|e| error!(FileError).message(&e.to_string().to_ascii_uppercase()))?;
            return Ok((name.to_string(), text));
        }
        let resolved = Program::resolve(name, drive)?;
        match std::fs::read_to_string(drive.join(&resolved)) {
            Ok(text) => Ok((resolved, text)),
            Err(_) => Err(error!(FileError; "FILE NOT FOUND")),
        }
    }

    // `load "*"` takes the first match in the drive directory.
    fn resolve(name: &str, drive: &Path) -> Result<String> {
        if !name.contains('*') {
            if drive.join(name).is_file() {
                return Ok(name.to_string());
            }
            let with_ext = format!("{}.bas", name);
            if drive.join(&with_ext).is_file() {
                return Ok(with_ext);
            }
            return Err(error!(FileError; "FILE NOT FOUND"));
        }
        let prefix = name.trim_end_matches('*');
        let mut matches: Vec<String> = match std::fs::read_dir(drive) {
            Ok(entries) => entries
                .filter_map(|e| e.ok())
                .filter(|e| e.path().is_file())
                .filter_map(|e| e.file_name().into_string().ok())
                .filter(|n| n.starts_with(prefix))
                .collect(),
            Err(_) => return Err(error!(FileError; "FILE NOT FOUND")),
        };
        matches.sort();
        match matches.into_iter().next() {
            Some(name) => Ok(name),
            None => Err(error!(FileError; "FILE NOT FOUND")),
        }
    }

    /// Write the program under the drive directory, appending `.bas`
    /// when the name has no extension. Returns the final file name.
    pub fn save(&self, name: &str, drive: &Path) -> Result<String> {
        let name = if name.ends_with(".bas") {
            name.to_string()
        } else {
            format!("{}.bas", name)
        };
        if std::fs::create_dir_all(drive).is_err() {
            return Err(error!(FileError; "DRIVE NOT READY"));
        }
        match std::fs::write(drive.join(&name), self.to_source()) {
            Ok(_) => Ok(name),
            Err(_) => Err(error!(FileError; "SAVE FAILED")),
        }
    }
}
