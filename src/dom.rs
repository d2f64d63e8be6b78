use super::*;

/// Stable reference to a node of a [`Harness`] document.
///
/// Ids are never reused: a node removed from the tree keeps its id and its
/// element state, it is only detached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

#[derive(Debug, Clone)]
pub(crate) enum NodeKind {
    Root,
    Element(ElementData),
    Text(String),
}

#[derive(Debug, Clone)]
pub(crate) struct ElementData {
    pub(crate) tag: String,
    /// Source order, `style` excluded.
    pub(crate) attrs: Vec<(String, String)>,
    pub(crate) style: InlineStyle,
}

impl ElementData {
    pub(crate) fn new(tag: String, attrs: Vec<(String, String)>) -> Self {
        let mut style = InlineStyle::default();
        let mut plain = Vec::with_capacity(attrs.len());
        for (name, value) in attrs {
            if name == "style" {
                style = InlineStyle::parse(&value);
            } else {
                plain.push((name, value));
            }
        }
        Self {
            tag,
            attrs: plain,
            style,
        }
    }

    pub(crate) fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub(crate) fn has_class(&self, class_name: &str) -> bool {
        self.attr("class")
            .is_some_and(|classes| classes.split_ascii_whitespace().any(|c| c == class_name))
    }
}

/// Declarations of an element's `style` attribute, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct InlineStyle {
    decls: Vec<(String, String)>,
}

impl InlineStyle {
    /// Later duplicates overwrite earlier ones in place; malformed pieces are
    /// skipped.
    pub(crate) fn parse(text: &str) -> Self {
        let mut style = Self::default();
        for (name, value) in text.split(';').filter_map(|piece| piece.split_once(':')) {
            if !name.trim().is_empty() {
                style.set(name, value.trim());
            }
        }
        style
    }

    pub(crate) fn get(&self, property: &str) -> Option<&str> {
        let property = css_property_name(property);
        self.decls
            .iter()
            .find(|(name, _)| *name == property)
            .map(|(_, value)| value.as_str())
    }

    /// An empty `value` removes the declaration.
    pub(crate) fn set(&mut self, property: &str, value: &str) {
        let property = css_property_name(property);
        let slot = self.decls.iter().position(|(name, _)| *name == property);
        match (slot, value.is_empty()) {
            (Some(idx), true) => {
                self.decls.remove(idx);
            }
            (Some(idx), false) => self.decls[idx].1 = value.to_string(),
            (None, false) => self.decls.push((property, value.to_string())),
            (None, true) => {}
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }
}

impl fmt::Display for InlineStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, (name, value)) in self.decls.iter().enumerate() {
            let sep = if idx == 0 { "" } else { " " };
            write!(f, "{sep}{name}: {value};")?;
        }
        Ok(())
    }
}

/// `textDecoration` and `Text-Decoration` both become `text-decoration`.
pub(crate) fn css_property_name(property: &str) -> String {
    property
        .trim()
        .chars()
        .flat_map(|ch| {
            let dash = ch.is_ascii_uppercase().then_some('-');
            dash.into_iter().chain(std::iter::once(ch.to_ascii_lowercase()))
        })
        .collect::<String>()
        .trim_start_matches('-')
        .replace("--", "-")
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

/// Arena-backed document tree. Node `0` is the root.
#[derive(Debug, Clone)]
pub(crate) struct Document {
    nodes: Vec<Node>,
    ids: HashMap<String, NodeId>,
}

impl Document {
    pub(crate) const ROOT: NodeId = NodeId(0);

    pub(crate) fn new() -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                kind: NodeKind::Root,
            }],
            ids: HashMap::new(),
        }
    }

    fn push_node(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: Some(parent),
            children: Vec::new(),
            kind,
        });
        if let Some(parent) = self.nodes.get_mut(parent.0) {
            parent.children.push(id);
        }
        id
    }

    /// Callers run [`Document::reindex`] once a batch of inserts is done.
    pub(crate) fn insert_element(&mut self, parent: NodeId, element: ElementData) -> NodeId {
        self.push_node(parent, NodeKind::Element(element))
    }

    pub(crate) fn insert_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.push_node(parent, NodeKind::Text(text.to_string()))
    }

    pub(crate) fn element(&self, node: NodeId) -> Option<&ElementData> {
        match &self.nodes.get(node.0)?.kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    fn element_mut(&mut self, node: NodeId) -> Option<&mut ElementData> {
        match &mut self.nodes.get_mut(node.0)?.kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    pub(crate) fn tag(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(|element| element.tag.as_str())
    }

    pub(crate) fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node)?.attr(name)
    }

    pub(crate) fn is_disabled(&self, node: NodeId) -> bool {
        self.attr(node, "disabled").is_some()
    }

    pub(crate) fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0)?.parent
    }

    pub(crate) fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node.0)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    /// Parent, grandparent, ... up to and including the root.
    pub(crate) fn ancestors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(node), |current| self.parent(*current))
    }

    pub(crate) fn by_id(&self, id: &str) -> Option<NodeId> {
        self.ids.get(id).copied()
    }

    pub(crate) fn is_connected(&self, node: NodeId) -> bool {
        node == Self::ROOT || self.ancestors(node).any(|ancestor| ancestor == Self::ROOT)
    }

    /// Connected elements, preorder.
    pub(crate) fn elements_in_order(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut pending = vec![Self::ROOT];
        while let Some(node) = pending.pop() {
            if self.element(node).is_some() {
                out.push(node);
            }
            pending.extend(self.children(node).iter().rev());
        }
        out
    }

    /// Rebuilds the id lookup; the first element in document order wins.
    pub(crate) fn reindex(&mut self) {
        let mut ids = HashMap::new();
        for node in self.elements_in_order() {
            if let Some(id) = self.attr(node, "id").filter(|id| !id.is_empty()) {
                ids.entry(id.to_string()).or_insert(node);
            }
        }
        self.ids = ids;
    }

    pub(crate) fn style(&self, node: NodeId, property: &str) -> Result<String> {
        let element = self.element(node).ok_or_else(|| not_an_element("style", node))?;
        Ok(element.style.get(property).unwrap_or_default().to_string())
    }

    pub(crate) fn set_style(&mut self, node: NodeId, property: &str, value: &str) -> Result<()> {
        let element = self
            .element_mut(node)
            .ok_or_else(|| not_an_element("style", node))?;
        element.style.set(property, value);
        Ok(())
    }

    /// Unhooks `node` from its parent. The node and its subtree stay in the
    /// arena and keep their state.
    pub(crate) fn detach(&mut self, node: NodeId) -> Result<()> {
        if node == Self::ROOT {
            return Err(Error::DomRuntime("the document root cannot be removed".into()));
        }
        let Some(parent) = self.parent(node) else {
            return Ok(());
        };
        if let Some(parent) = self.nodes.get_mut(parent.0) {
            parent.children.retain(|child| *child != node);
        }
        if let Some(node) = self.nodes.get_mut(node.0) {
            node.parent = None;
        }
        self.reindex();
        Ok(())
    }

    /// `#id` when the element has one, its tag otherwise.
    pub(crate) fn label(&self, node: NodeId) -> String {
        match (self.attr(node, "id"), self.tag(node)) {
            (Some(id), _) if !id.is_empty() => format!("#{id}"),
            (_, Some(tag)) => tag.to_string(),
            _ => format!("node-{}", node.0),
        }
    }

    /// Serialises `node` as markup. Attributes keep source order; the inline
    /// style comes last.
    pub(crate) fn render(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.render_into(node, &mut out);
        out
    }

    fn render_into(&self, node: NodeId, out: &mut String) {
        let Some(entry) = self.nodes.get(node.0) else {
            return;
        };
        let element = match &entry.kind {
            NodeKind::Text(text) => {
                out.push_str(text);
                return;
            }
            NodeKind::Root => None,
            NodeKind::Element(element) => Some(element),
        };

        if let Some(element) = element {
            out.push_str(&format!("<{}", element.tag));
            for (name, value) in &element.attrs {
                out.push_str(&format!(" {name}=\"{value}\""));
            }
            if !element.style.is_empty() {
                out.push_str(&format!(" style=\"{}\"", element.style));
            }
            out.push('>');
            if is_void_tag(&element.tag) {
                return;
            }
        }
        for child in &entry.children {
            self.render_into(*child, out);
        }
        if let Some(element) = element {
            out.push_str(&format!("</{}>", element.tag));
        }
    }
}

fn not_an_element(what: &str, node: NodeId) -> Error {
    Error::DomRuntime(format!("{what} target node-{} is not an element", node.0))
}
