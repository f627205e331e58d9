//! Locating and editing the `dependencies` object as raw text

/// Bytes scanned after the opening brace when the block never closes
pub const SCAN_WINDOW: usize = 4096;

const ANCHOR: &str = "\"dependencies\"";

/// Byte span of the dependencies object inside the manifest text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DependenciesBlock {
    /// Index of the opening `{`
    pub open: usize,
    /// Index of the matching `}`, None for a truncated document
    pub close: Option<usize>,
}

fn skip_whitespace(bytes: &[u8], mut at: usize) -> usize {
    while at < bytes.len() && bytes[at].is_ascii_whitespace() {
        at += 1;
    }
    at
}

/// End index (exclusive) of the JSON string starting at `start` (a `"`)
fn string_end(bytes: &[u8], start: usize) -> usize {
    let mut at = start + 1;
    while at < bytes.len() {
        match bytes[at] {
            b'\\' => at += 2,
            b'"' => return at + 1,
            _ => at += 1,
        }
    }
    bytes.len()
}

fn matching_brace(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut at = open;
    while at < bytes.len() {
        match bytes[at] {
            b'"' => {
                at = string_end(bytes, at);
                continue;
            }
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(at);
                }
            }
            _ => {}
        }
        at += 1;
    }
    None
}

impl DependenciesBlock {
    /// Find the object following the first `"dependencies":` key
    pub fn locate(text: &str) -> Option<Self> {
        let bytes = text.as_bytes();
        let mut search_from = 0;

        while let Some(found) = text[search_from..].find(ANCHOR) {
            let key_end = search_from + found + ANCHOR.len();
            let colon = skip_whitespace(bytes, key_end);
            if bytes.get(colon) == Some(&b':') {
                let open = skip_whitespace(bytes, colon + 1);
                if bytes.get(open) == Some(&b'{') {
                    return Some(Self {
                        open,
                        close: matching_brace(bytes, open),
                    });
                }
            }
            search_from = key_end;
        }
        None
    }

    /// Text between the braces, or the bounded window for an unclosed block
    pub fn body<'a>(&self, text: &'a str) -> &'a str {
        let start = self.open + 1;
        let end = match self.close {
            Some(close) => close,
            None => floor_char_boundary(text, (start + SCAN_WINDOW).min(text.len())),
        };
        &text[start..end]
    }

    pub fn is_empty(&self, text: &str) -> bool {
        self.body(text).trim().is_empty()
    }

    /// Whether the block already has a key `name`
    pub fn contains_key(&self, text: &str, name: &str) -> bool {
        let body = self.body(text);
        let needle = quoted(name);
        let bytes = body.as_bytes();

        let mut search_from = 0;
        while let Some(found) = body[search_from..].find(&needle) {
            let end = search_from + found + needle.len();
            let next = skip_whitespace(bytes, end);
            if bytes.get(next) == Some(&b':') {
                return true;
            }
            search_from = end;
        }
        false
    }

    /// Copy of `text` with `"name": "value"` as the block's first entry
    ///
    /// A multi-line block gets the entry on its own line right after the
    /// opening line, indented like its neighbours. An inline block gets it
    /// right after the brace. Nothing else in the document changes.
    pub fn insert_entry(&self, text: &str, name: &str, value: &str) -> String {
        let entry = format!("{}: {}", quoted(name), quoted(value));
        let empty = self.is_empty(text);
        let after_open = self.open + 1;

        let rest_of_line = text[after_open..].find('\n').map(|nl| after_open + nl);
        let multi_line = rest_of_line.is_some_and(|nl| text[after_open..nl].trim().is_empty());

        let mut out = String::with_capacity(text.len() + entry.len() + 16);
        match rest_of_line {
            Some(newline) if multi_line => {
                let line_ending = if text[..newline].ends_with('\r') {
                    "\r\n"
                } else {
                    "\n"
                };
                let indent = self.entry_indent(text, newline + 1, empty);
                let comma = if empty { "" } else { "," };

                out.push_str(&text[..=newline]);
                out.push_str(&indent);
                out.push_str(&entry);
                out.push_str(comma);
                out.push_str(line_ending);
                out.push_str(&text[newline + 1..]);
            }
            _ => {
                out.push_str(&text[..after_open]);
                out.push_str(&entry);
                if !empty {
                    out.push_str(", ");
                }
                out.push_str(&text[after_open..]);
            }
        }
        out
    }

    fn entry_indent(&self, text: &str, next_line: usize, empty: bool) -> String {
        if !empty {
            let line = &text[next_line..];
            let width = line.len() - line.trim_start_matches([' ', '\t']).len();
            return line[..width].to_string();
        }

        let line_start = text[..self.open].rfind('\n').map_or(0, |nl| nl + 1);
        let line = &text[line_start..self.open];
        let width = line.len() - line.trim_start_matches([' ', '\t']).len();
        let unit = if line.starts_with('\t') { "\t" } else { "  " };
        format!("{}{unit}", &line[..width])
    }
}

fn quoted(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

fn floor_char_boundary(text: &str, mut at: usize) -> usize {
    while !text.is_char_boundary(at) {
        at -= 1;
    }
    at
}
