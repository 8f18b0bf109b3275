//! JSON with comments
//!
//! Configuration files may contain `//` line comments, `/* */` block
//! comments and trailing commas. They are removed before handing the text
//! to `serde_json`; string contents are left untouched.

use thiserror::Error;

/// Text that cannot be turned into plain JSON
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JsoncError {
    /// A `/*` comment is never closed
    #[error("unterminated block comment starting at line {line}")]
    UnterminatedComment { line: usize },
}

/// Strip comments and trailing commas, preserving line structure so
/// `serde_json` error positions still point at the right line.
pub fn strip_comments(input: &str) -> Result<String, JsoncError> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;
    let mut escaped = false;
    let mut line = 1;

    while let Some(c) = chars.next() {
        if c == '\n' {
            line += 1;
        }
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            '/' if chars.peek() == Some(&'/') => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        line += 1;
                        out.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let start = line;
                let mut prev = '\0';
                let mut closed = false;
                for next in chars.by_ref() {
                    if next == '\n' {
                        line += 1;
                        out.push('\n');
                    }
                    if prev == '*' && next == '/' {
                        closed = true;
                        break;
                    }
                    prev = next;
                }
                if !closed {
                    return Err(JsoncError::UnterminatedComment { line: start });
                }
            }
            _ => out.push(c),
        }
    }

    Ok(remove_trailing_commas(&out))
}

fn remove_trailing_commas(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_string = false;
    let mut escaped = false;
    let chars: Vec<char> = input.chars().collect();

    for (i, &c) in chars.iter().enumerate() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        if c == '"' {
            in_string = true;
        } else if c == ',' {
            let next = chars[i + 1..].iter().find(|ch| !ch.is_whitespace());
            if matches!(next, Some('}') | Some(']')) {
                continue;
            }
        }
        out.push(c);
    }

    out
}
