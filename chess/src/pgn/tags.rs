//! PGN tag-pair section (`[Name "value"]`).

/// A PGN document split into its ordered tag pairs and raw movetext.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PgnDocument {
    pub tags: Vec<(String, String)>,
    pub movetext: String,
}

impl PgnDocument {
    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Render tags one per line, a blank line, then the movetext.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (name, value) in &self.tags {
            let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
            out.push_str(&format!("[{} \"{}\"]\n", name, escaped));
        }
        if !self.tags.is_empty() {
            out.push('\n');
        }
        out.push_str(&self.movetext);
        out
    }
}

/// Split a document into tags and movetext.
///
/// Leading lines starting with `[` are tag pairs; everything after them is
/// movetext, with line breaks folded into single spaces. `;` comments end at
/// their line break, so they are dropped before folding.
pub fn parse_document(input: &str) -> Result<PgnDocument, TagError> {
    let mut doc = PgnDocument::default();
    let mut lines = input.lines().peekable();

    while let Some(line) = lines.peek() {
        let trimmed = line.trim();
        if trimmed.is_empty() && doc.tags.is_empty() {
            lines.next();
            continue;
        }
        if !trimmed.starts_with('[') {
            break;
        }
        doc.tags.push(parse_tag_line(trimmed)?);
        lines.next();
    }

    let mut in_brace = false;
    doc.movetext = lines
        .map(|line| strip_line_comment(line, &mut in_brace).trim())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    Ok(doc)
}

/// Cut `line` at a `;` that sits outside a `{...}` comment. Brace comments
/// may span lines; `in_brace` carries that state from one line to the next.
fn strip_line_comment<'a>(line: &'a str, in_brace: &mut bool) -> &'a str {
    for (i, c) in line.char_indices() {
        match c {
            '{' => *in_brace = true,
            '}' => *in_brace = false,
            ';' if !*in_brace => return &line[..i],
            _ => {}
        }
    }
    line
}

fn parse_tag_line(line: &str) -> Result<(String, String), TagError> {
    let inner = line
        .strip_prefix('[')
        .and_then(|l| l.strip_suffix(']'))
        .ok_or_else(|| TagError::Malformed(line.to_string()))?
        .trim();

    let (name, rest) = inner
        .split_once(char::is_whitespace)
        .ok_or_else(|| TagError::Malformed(line.to_string()))?;
    let quoted = rest.trim();
    let value = quoted
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .ok_or_else(|| TagError::Malformed(line.to_string()))?;

    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(TagError::InvalidName(name.to_string()));
    }

    Ok((
        name.to_string(),
        value.replace("\\\"", "\"").replace("\\\\", "\\"),
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TagError {
    #[error("Malformed tag pair: {0}")]
    Malformed(String),
    #[error("Invalid tag name: {0}")]
    InvalidName(String),
}
