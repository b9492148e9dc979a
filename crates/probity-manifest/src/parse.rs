//! Manifest parsing - the inverse of the renderer
//!
//! Accepts the subset of the declarative language that the renderer emits
//! and that `puppet resource` prints:
//!
//! ```text
//! manifest := item*
//! item     := "node" STRING "{" item* "}" | block
//! block    := WORD "{" STRING ":" attrs? "}"
//! attrs    := attr ("," attr)* ","?
//! attr     := WORD "=>" (STRING | WORD)
//! ```

use crate::error::ManifestError;
use crate::properties::{EnsureState, PropertyMap, ENSURE};
use serde::{Deserialize, Serialize};

/// One parsed resource block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestBlock {
    /// Resource type name
    pub resource_type: String,
    /// Title as written
    pub title: String,
    /// Ensure state, if the block declares one
    pub ensure: Option<EnsureState>,
    /// Every attribute except `ensure`, in source order
    pub properties: PropertyMap,
}

impl ManifestBlock {
    /// Parse text holding exactly one resource block
    ///
    /// # Errors
    /// Returns [`ManifestError::Empty`] when no block is present, and a
    /// syntax error when there is more than one or the text is malformed.
    pub fn parse(text: &str) -> Result<Self, ManifestError> {
        let mut blocks = parse_all(text)?;
        match blocks.len() {
            0 => Err(ManifestError::Empty),
            1 => Ok(blocks.remove(0)),
            n => Err(ManifestError::syntax(0, format!("expected one resource block, found {n}"))),
        }
    }
}

/// Parse every resource block, descending into node definitions
///
/// # Errors
/// Returns [`ManifestError`] on malformed input.
pub fn parse_all(text: &str) -> Result<Vec<ManifestBlock>, ManifestError> {
    let tokens = tokenize(text)?;
    let mut parser = Parser { tokens, pos: 0, end: text.len() };
    let mut blocks = Vec::new();
    parser.items(&mut blocks, false)?;
    Ok(blocks)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Tok {
    Word(String),
    Str(String),
    LBrace,
    RBrace,
    Colon,
    Comma,
    Arrow,
}

fn tokenize(text: &str) -> Result<Vec<(usize, Tok)>, ManifestError> {
    let bytes: Vec<(usize, char)> = text.char_indices().collect();
    let mut out = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let (offset, c) = bytes[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '#' => {
                while i < bytes.len() && bytes[i].1 != '\n' {
                    i += 1;
                }
            }
            '{' => {
                out.push((offset, Tok::LBrace));
                i += 1;
            }
            '}' => {
                out.push((offset, Tok::RBrace));
                i += 1;
            }
            ',' => {
                out.push((offset, Tok::Comma));
                i += 1;
            }
            ':' if bytes.get(i + 1).map(|b| b.1) != Some(':') => {
                out.push((offset, Tok::Colon));
                i += 1;
            }
            '=' => {
                if bytes.get(i + 1).map(|b| b.1) != Some('>') {
                    return Err(ManifestError::syntax(offset, "expected '=>'"));
                }
                out.push((offset, Tok::Arrow));
                i += 2;
            }
            '\'' | '"' => {
                let quote = c;
                let mut value = String::new();
                i += 1;
                loop {
                    let Some(&(_, ch)) = bytes.get(i) else {
                        return Err(ManifestError::UnterminatedString(offset));
                    };
                    i += 1;
                    match ch {
                        '\\' => {
                            if let Some(&(_, next)) = bytes.get(i) {
                                value.push(next);
                                i += 1;
                            }
                        }
                        ch if ch == quote => break,
                        ch => value.push(ch),
                    }
                }
                out.push((offset, Tok::Str(value)));
            }
            _ => {
                let mut word = String::new();
                while let Some(&(_, ch)) = bytes.get(i) {
                    let double_colon = ch == ':' && bytes.get(i + 1).map(|b| b.1) == Some(':');
                    if double_colon {
                        word.push_str("::");
                        i += 2;
                    } else if ch.is_whitespace() || "{}:,='\"#".contains(ch) {
                        break;
                    } else {
                        word.push(ch);
                        i += 1;
                    }
                }
                out.push((offset, Tok::Word(word)));
            }
        }
    }

    Ok(out)
}

struct Parser {
    tokens: Vec<(usize, Tok)>,
    pos: usize,
    end: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Tok> {
        self.tokens.get(self.pos).map(|(_, t)| t)
    }

    fn offset(&self) -> usize {
        self.tokens.get(self.pos).map_or(self.end, |(o, _)| *o)
    }

    fn bump(&mut self) -> Option<Tok> {
        let tok = self.tokens.get(self.pos).map(|(_, t)| t.clone());
        self.pos += 1;
        tok
    }

    fn expect(&mut self, want: &Tok, what: &str) -> Result<(), ManifestError> {
        let offset = self.offset();
        match self.bump() {
            Some(ref tok) if tok == want => Ok(()),
            _ => Err(ManifestError::syntax(offset, format!("expected {what}"))),
        }
    }

    fn string(&mut self, what: &str) -> Result<String, ManifestError> {
        let offset = self.offset();
        match self.bump() {
            Some(Tok::Str(s)) => Ok(s),
            _ => Err(ManifestError::syntax(offset, format!("expected quoted {what}"))),
        }
    }

    fn items(&mut self, blocks: &mut Vec<ManifestBlock>, nested: bool) -> Result<(), ManifestError> {
        loop {
            match self.peek() {
                None if nested => {
                    return Err(ManifestError::syntax(self.end, "unclosed node definition"));
                }
                None => return Ok(()),
                Some(Tok::RBrace) if nested => {
                    self.pos += 1;
                    return Ok(());
                }
                Some(Tok::Word(w)) if w == "node" => {
                    self.pos += 1;
                    self.string("node name")?;
                    self.expect(&Tok::LBrace, "'{'")?;
                    self.items(blocks, true)?;
                }
                Some(Tok::Word(_)) => blocks.push(self.block()?),
                Some(_) => {
                    return Err(ManifestError::syntax(self.offset(), "expected resource type"));
                }
            }
        }
    }

    fn block(&mut self) -> Result<ManifestBlock, ManifestError> {
        let offset = self.offset();
        let resource_type = match self.bump() {
            Some(Tok::Word(w)) => w,
            _ => return Err(ManifestError::syntax(offset, "expected resource type")),
        };
        self.expect(&Tok::LBrace, "'{'")?;
        let title = self.string("title")?;
        self.expect(&Tok::Colon, "':'")?;

        let mut ensure = None;
        let mut properties = Vec::new();

        loop {
            let offset = self.offset();
            match self.bump() {
                Some(Tok::RBrace) => break,
                Some(Tok::Word(key)) => {
                    self.expect(&Tok::Arrow, "'=>'")?;
                    let value_offset = self.offset();
                    let value = match self.bump() {
                        Some(Tok::Str(v) | Tok::Word(v)) => v,
                        _ => return Err(ManifestError::syntax(value_offset, "expected value")),
                    };
                    if key == ENSURE {
                        ensure = Some(value.parse()?);
                    } else {
                        properties.push((key, value));
                    }
                    match self.peek() {
                        Some(Tok::Comma) => self.pos += 1,
                        Some(Tok::RBrace) => {}
                        _ => return Err(ManifestError::syntax(self.offset(), "expected ',' or '}'")),
                    }
                }
                _ => return Err(ManifestError::syntax(offset, "expected attribute or '}'")),
            }
        }

        Ok(ManifestBlock {
            resource_type,
            title,
            ensure,
            properties: properties.into_iter().collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{wrap_node, ManifestRenderer};
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_rendered_block() {
        let props = PropertyMap::builder()
            .set("bfd", "true")
            .set("note", "it's")
            .build();
        let text = ManifestRenderer::new().render_block("cisco_bgp", "2 default", EnsureState::Present, &props);
        let block = ManifestBlock::parse(&text).unwrap();

        assert_eq!(block.resource_type, "cisco_bgp");
        assert_eq!(block.title, "2 default");
        assert_eq!(block.ensure, Some(EnsureState::Present));
        assert_eq!(block.properties, props);
    }

    #[test]
    fn parses_introspection_style_output() {
        let text = "cisco_bgp { '2 default':\n  ensure => 'present',\n  timer_bgp_keepalive => '60',\n  shutdown => false\n}\n";
        let block = ManifestBlock::parse(text).unwrap();

        assert_eq!(block.properties.get("timer_bgp_keepalive"), Some("60"));
        assert_eq!(block.properties.get("shutdown"), Some("false"));
    }

    #[test]
    fn descends_into_node() {
        let a = ManifestRenderer::new().render_block("t", "a", EnsureState::Absent, &PropertyMap::new());
        let b = ManifestRenderer::new().render_block("t", "b", EnsureState::Present, &PropertyMap::new());
        let text = wrap_node("default", &format!("{a}{b}"));

        let blocks = parse_all(&text).unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].ensure, Some(EnsureState::Absent));
        assert_eq!(blocks[1].title, "b");
    }

    #[test]
    fn namespaced_type_and_comment() {
        let text = "# generated\nfoo::bar { 'x':\n  ensure => present,\n}\n";
        assert_eq!(ManifestBlock::parse(text).unwrap().resource_type, "foo::bar");
    }

    #[test]
    fn rejects_unterminated_string() {
        assert_eq!(
            ManifestBlock::parse("t { 'x:\n}"),
            Err(ManifestError::UnterminatedString(4))
        );
    }

    #[test]
    fn rejects_missing_arrow() {
        let err = ManifestBlock::parse("t { 'x':\n  ensure present,\n}").unwrap_err();
        assert!(matches!(err, ManifestError::Syntax { .. }));
    }

    #[test]
    fn rejects_bad_ensure() {
        assert_eq!(
            ManifestBlock::parse("t { 'x': ensure => purged }"),
            Err(ManifestError::InvalidEnsure("purged".into()))
        );
    }

    #[test]
    fn empty_text() {
        assert_eq!(ManifestBlock::parse("  \n"), Err(ManifestError::Empty));
    }

    #[test]
    fn unclosed_node() {
        assert!(parse_all("node 'default' {\n t { 'x': }\n").is_err());
    }
}
