use super::*;

/// One compound step such as `li`, `#row`, `img.thumb` or `section#a.b`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
}

impl Compound {
    fn parse(word: &str, selector: &str) -> Result<Self> {
        let unsupported = || Error::UnsupportedSelector(selector.to_string());
        let tag_end = word.find(['#', '.']).unwrap_or(word.len());
        let (tag, mut rest) = word.split_at(tag_end);

        let mut compound = Self::default();
        if !tag.is_empty() {
            if !is_ident(tag) {
                return Err(unsupported());
            }
            compound.tag = Some(tag.to_ascii_lowercase());
        }

        while let Some(sigil) = rest.chars().next() {
            let body = &rest[sigil.len_utf8()..];
            let end = body.find(['#', '.']).unwrap_or(body.len());
            let name = &body[..end];
            if !is_ident(name) {
                return Err(unsupported());
            }
            match sigil {
                '#' if compound.id.is_none() => compound.id = Some(name.to_string()),
                '.' => compound.classes.push(name.to_string()),
                _ => return Err(unsupported()),
            }
            rest = &body[end..];
        }
        Ok(compound)
    }

    fn matches(&self, doc: &Document, node: NodeId) -> bool {
        let Some(element) = doc.element(node) else {
            return false;
        };
        self.tag.as_deref().is_none_or(|tag| element.tag == tag)
            && self.id.as_deref().is_none_or(|id| element.attr("id") == Some(id))
            && self.classes.iter().all(|class| element.has_class(class))
    }

    fn bare_id(&self) -> Option<&str> {
        match self {
            Self {
                tag: None,
                id: Some(id),
                classes,
            } if classes.is_empty() => Some(id.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Relation {
    /// `a b`
    Descendant,
    /// `a > b`
    Child,
}

/// A parsed selector: compounds left to right, with `relations[i]` linking
/// `compounds[i]` to `compounds[i + 1]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Selector {
    compounds: Vec<Compound>,
    relations: Vec<Relation>,
}

impl Selector {
    /// Accepts type, `#id` and `.class` steps joined by whitespace or `>`.
    /// Everything else is [`Error::UnsupportedSelector`].
    pub(crate) fn parse(selector: &str) -> Result<Self> {
        let unsupported = || Error::UnsupportedSelector(selector.to_string());
        let mut compounds = Vec::new();
        let mut relations = Vec::new();
        let mut pending = None;

        let spaced = selector.replace('>', " > ");
        for word in spaced.split_whitespace() {
            if word == ">" {
                if compounds.is_empty() || pending.replace(Relation::Child).is_some() {
                    return Err(unsupported());
                }
                continue;
            }
            if !compounds.is_empty() {
                relations.push(pending.take().unwrap_or(Relation::Descendant));
            }
            compounds.push(Compound::parse(word, selector)?);
        }

        if compounds.is_empty() || pending.is_some() {
            return Err(unsupported());
        }
        Ok(Self {
            compounds,
            relations,
        })
    }

    pub(crate) fn matches(&self, doc: &Document, node: NodeId) -> bool {
        self.compounds
            .len()
            .checked_sub(1)
            .is_some_and(|last| self.matches_through(doc, node, last))
    }

    // Right to left, trying every ancestor for a descendant link.
    fn matches_through(&self, doc: &Document, node: NodeId, index: usize) -> bool {
        if !self.compounds[index].matches(doc, node) {
            return false;
        }
        let Some(left) = index.checked_sub(1) else {
            return true;
        };
        match self.relations[left] {
            Relation::Child => doc
                .parent(node)
                .is_some_and(|parent| self.matches_through(doc, parent, left)),
            Relation::Descendant => doc
                .ancestors(node)
                .any(|ancestor| self.matches_through(doc, ancestor, left)),
        }
    }

    fn bare_id(&self) -> Option<&str> {
        match self.compounds.as_slice() {
            [only] => only.bare_id(),
            _ => None,
        }
    }
}

fn is_ident(text: &str) -> bool {
    !text.is_empty()
        && text
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
}

impl Document {
    pub(crate) fn query_selector(&self, selector: &str) -> Result<Option<NodeId>> {
        Ok(self.query_selector_all(selector)?.into_iter().next())
    }

    /// Connected elements matching `selector`, in document order.
    pub(crate) fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>> {
        let selector = Selector::parse(selector)?;
        if let Some(id) = selector.bare_id() {
            return Ok(self.by_id(id).into_iter().collect());
        }
        Ok(self
            .elements_in_order()
            .into_iter()
            .filter(|node| selector.matches(self, *node))
            .collect())
    }
}
