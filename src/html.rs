use super::*;

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Bodies kept verbatim as a single inert text node.
const RAW_TEXT_TAGS: &[&str] = &["script", "style"];

pub(crate) fn is_void_tag(tag: &str) -> bool {
    VOID_TAGS.contains(&tag)
}

pub(crate) fn parse_html(html: &str) -> Result<Document> {
    let mut doc = Document::new();
    parse_into(&mut doc, Document::ROOT, html)?;
    Ok(doc)
}

/// Parses `html` as children of `parent` and returns the top-level nodes it
/// created.
///
/// Unknown end tags are dropped, an end tag closes every element opened after
/// its match, and void elements never take children.
pub(crate) fn parse_into(doc: &mut Document, parent: NodeId, html: &str) -> Result<Vec<NodeId>> {
    let mut src = Cursor::new(html);
    let mut open = vec![parent];
    let mut top_level = Vec::new();

    while !src.at_end() {
        let current = open.last().copied().unwrap_or(parent);

        if src.eat("<!--") {
            src.skip_past("-->")
                .ok_or_else(|| Error::HtmlParse("unclosed HTML comment".into()))?;
        } else if src.eat("<!") {
            src.skip_past(">")
                .ok_or_else(|| Error::HtmlParse("unclosed markup declaration".into()))?;
        } else if src.at_end_tag() {
            let tag = src.end_tag()?;
            let matched = open
                .iter()
                .skip(1)
                .rposition(|node| doc.tag(*node) == Some(tag.as_str()));
            if let Some(depth) = matched {
                open.truncate(depth + 1);
            }
        } else if src.at_start_tag() {
            let tag = src.start_tag()?;
            let name = tag.name.clone();
            let node = doc.insert_element(current, ElementData::new(tag.name, tag.attrs));
            if open.len() == 1 {
                top_level.push(node);
            }
            if RAW_TEXT_TAGS.contains(&name.as_str()) {
                let body = src.raw_text_until_end_tag(&name)?;
                if !body.is_empty() {
                    doc.insert_text(node, body);
                }
            } else if !tag.self_closing && !is_void_tag(&name) {
                open.push(node);
            }
        } else {
            let text = src.text();
            let node = doc.insert_text(current, text);
            if open.len() == 1 {
                top_level.push(node);
            }
        }
    }

    doc.reindex();
    Ok(top_level)
}

struct StartTag {
    name: String,
    attrs: Vec<(String, String)>,
    self_closing: bool,
}

/// Byte offset into the source. It only ever advances by whole characters.
struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        self.src.get(self.pos..).unwrap_or_default()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn eat(&mut self, prefix: &str) -> bool {
        let found = self.rest().starts_with(prefix);
        if found {
            self.pos += prefix.len();
        }
        found
    }

    fn skip_past(&mut self, needle: &str) -> Option<()> {
        let at = self.rest().find(needle)?;
        self.pos += at + needle.len();
        Some(())
    }

    fn skip_ws(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn take_while(&mut self, keep: impl Fn(char) -> bool) -> &'a str {
        let rest = self.rest();
        let len = rest.find(|ch: char| !keep(ch)).unwrap_or(rest.len());
        self.pos += len;
        &rest[..len]
    }

    fn second_char(&self) -> Option<char> {
        self.rest().chars().nth(1)
    }

    fn at_start_tag(&self) -> bool {
        self.peek() == Some('<') && self.second_char().is_some_and(|ch| ch.is_ascii_alphabetic())
    }

    fn at_end_tag(&self) -> bool {
        self.rest().starts_with("</")
            && self.rest()[2..]
                .chars()
                .next()
                .is_some_and(|ch| ch.is_ascii_alphabetic())
    }

    /// Text up to the next `<`; a `<` that opens no tag is kept as text.
    fn text(&mut self) -> &'a str {
        let start = self.pos;
        if let Some(first) = self.peek() {
            self.pos += first.len_utf8();
        }
        self.take_while(|ch| ch != '<');
        &self.src[start..self.pos]
    }

    fn name(&mut self) -> String {
        self.take_while(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || ch == ':')
            .to_ascii_lowercase()
    }

    fn end_tag(&mut self) -> Result<String> {
        self.eat("</");
        let tag = self.name();
        self.skip_past(">")
            .ok_or_else(|| Error::HtmlParse(format!("unclosed end tag </{tag}")))?;
        Ok(tag)
    }

    fn start_tag(&mut self) -> Result<StartTag> {
        self.eat("<");
        let name = self.name();
        let mut attrs: Vec<(String, String)> = Vec::new();

        loop {
            self.skip_ws();
            if self.eat(">") {
                return Ok(StartTag {
                    name,
                    attrs,
                    self_closing: false,
                });
            }
            if self.eat("/>") {
                return Ok(StartTag {
                    name,
                    attrs,
                    self_closing: true,
                });
            }
            if self.at_end() {
                return Err(unclosed_start_tag(&name));
            }

            let attr = self.name();
            if attr.is_empty() {
                return Err(Error::HtmlParse(format!(
                    "unexpected {:?} in <{name}>",
                    self.peek().unwrap_or_default()
                )));
            }
            self.skip_ws();
            let value = if self.eat("=") {
                self.skip_ws();
                self.attr_value()
                    .ok_or_else(|| unclosed_start_tag(&name))?
            } else {
                String::new()
            };
            if !attrs.iter().any(|(existing, _)| *existing == attr) {
                attrs.push((attr, value));
            }
        }
    }

    fn attr_value(&mut self) -> Option<String> {
        match self.peek()? {
            quote @ ('"' | '\'') => {
                self.pos += 1;
                let value = self.take_while(|ch| ch != quote);
                self.eat(&quote.to_string()).then(|| value.to_string())
            }
            _ => {
                let value = self.take_while(|ch| !ch.is_ascii_whitespace() && ch != '>');
                match value.strip_suffix('/') {
                    // `<img src=a.png/>`
                    Some(trimmed) if self.peek() == Some('>') => {
                        self.pos -= 1;
                        Some(trimmed.to_string())
                    }
                    _ => Some(value.to_string()),
                }
            }
        }
    }

    /// Consumes up to and including `</tag ...>`, matched case-insensitively.
    fn raw_text_until_end_tag(&mut self, tag: &str) -> Result<&'a str> {
        let rest = self.rest();
        let close = rest
            .to_ascii_lowercase()
            .find(&format!("</{tag}"))
            .ok_or_else(|| Error::HtmlParse(format!("unclosed <{tag}>")))?;
        let body = &rest[..close];
        self.pos += close;
        self.end_tag()?;
        Ok(body)
    }
}

fn unclosed_start_tag(name: &str) -> Error {
    Error::HtmlParse(format!("unclosed start tag <{name}>"))
}
