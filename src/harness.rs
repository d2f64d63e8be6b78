use super::*;

const DISPATCH_STACK_BYTES: usize = 32 * 1024 * 1024;
const DEFAULT_TRACE_LOG_LIMIT: usize = 10_000;
const SNIPPET_CHARS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TraceCategory {
    /// `[event]` lines.
    Event,
    /// `[bind]` and `[effect]` lines.
    Effect,
}

/// Bounded trace buffer; the oldest line goes first once it is full.
#[derive(Debug)]
struct TraceLog {
    enabled: bool,
    events: bool,
    effects: bool,
    to_stderr: bool,
    limit: usize,
    lines: VecDeque<String>,
}

impl Default for TraceLog {
    fn default() -> Self {
        Self {
            enabled: false,
            events: true,
            effects: true,
            to_stderr: true,
            limit: DEFAULT_TRACE_LOG_LIMIT,
            lines: VecDeque::new(),
        }
    }
}

impl TraceLog {
    fn wants(&self, category: TraceCategory) -> bool {
        self.enabled
            && match category {
                TraceCategory::Event => self.events,
                TraceCategory::Effect => self.effects,
            }
    }

    fn push(&mut self, line: String) {
        if self.to_stderr {
            eprintln!("{line}");
        }
        self.lines.push_back(line);
        self.shrink_to_limit();
    }

    fn shrink_to_limit(&mut self) {
        while self.lines.len() > self.limit {
            self.lines.pop_front();
        }
    }
}

/// A parsed document plus its listeners and trace buffer.
#[derive(Debug)]
pub struct Harness {
    pub(crate) doc: Document,
    pub(crate) listeners: ListenerStore,
    pub(crate) effects_installed: bool,
    trace_log: TraceLog,
}

impl Harness {
    pub fn from_html(html: &str) -> Result<Self> {
        Ok(Self {
            doc: parse_html(html)?,
            listeners: ListenerStore::default(),
            effects_installed: false,
            trace_log: TraceLog::default(),
        })
    }

    pub fn enable_trace(&mut self, enabled: bool) {
        self.trace_log.enabled = enabled;
    }

    pub fn take_trace_logs(&mut self) -> Vec<String> {
        self.trace_log.lines.drain(..).collect()
    }

    pub fn set_trace_stderr(&mut self, enabled: bool) {
        self.trace_log.to_stderr = enabled;
    }

    pub fn set_trace_events(&mut self, enabled: bool) {
        self.trace_log.events = enabled;
    }

    /// Also governs `[bind]` lines.
    pub fn set_trace_effects(&mut self, enabled: bool) {
        self.trace_log.effects = enabled;
    }

    pub fn set_trace_log_limit(&mut self, max_entries: usize) -> Result<()> {
        if max_entries == 0 {
            return Err(Error::DomRuntime(
                "trace log limit must keep at least one line".into(),
            ));
        }
        self.trace_log.limit = max_entries;
        self.trace_log.shrink_to_limit();
        Ok(())
    }

    pub fn query_selector(&self, selector: &str) -> Result<Option<NodeId>> {
        self.doc.query_selector(selector)
    }

    /// Connected elements matching `selector`, in document order.
    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>> {
        self.doc.query_selector_all(selector)
    }

    pub fn add_listener(
        &mut self,
        node: NodeId,
        event_type: &str,
        action: ListenerAction,
    ) -> Result<()> {
        self.require_element("listener", node)?;
        self.listeners.add(node, event_type, action);
        Ok(())
    }

    pub fn add_click_listener(&mut self, node: NodeId, action: ListenerAction) -> Result<()> {
        self.add_listener(node, "click", action)
    }

    pub fn click(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.click_node(target)
    }

    /// Clicking a `disabled` element does nothing.
    pub fn click_node(&mut self, target: NodeId) -> Result<()> {
        self.require_element("click", target)?;
        if self.doc.is_disabled(target) {
            return Ok(());
        }
        self.dispatch_node(target, "click")
    }

    pub fn dispatch(&mut self, selector: &str, event_type: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.dispatch_node(target, event_type)
    }

    /// Parses `html` into the first element matching `parent_selector`.
    /// New elements get no listeners.
    pub fn append_html(&mut self, parent_selector: &str, html: &str) -> Result<Vec<NodeId>> {
        let parent = self.select_one(parent_selector)?;
        parse_into(&mut self.doc, parent, html)
    }

    /// Detaches the first element matching `selector` from the document.
    pub fn remove(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.doc.detach(target)
    }

    pub fn is_connected(&self, node: NodeId) -> bool {
        self.doc.is_connected(node)
    }

    pub fn style(&self, selector: &str, property: &str) -> Result<String> {
        self.doc.style(self.select_one(selector)?, property)
    }

    /// Inline style lookup by node, which also works for detached elements.
    pub fn node_style(&self, node: NodeId, property: &str) -> Result<String> {
        self.doc.style(node, property)
    }

    pub fn click_listener_count(&self, selector: &str) -> Result<usize> {
        Ok(self.node_click_listener_count(self.select_one(selector)?))
    }

    pub fn node_click_listener_count(&self, node: NodeId) -> usize {
        self.listeners.count(node, "click")
    }

    pub fn assert_style(&self, selector: &str, property: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.doc.style(target, property)?;
        if actual == expected {
            return Ok(());
        }
        Err(Error::AssertionFailed {
            selector: format!("{selector} style {property}"),
            expected: expected.to_string(),
            actual,
            dom_snippet: snippet(self.doc.render(target)),
        })
    }

    pub fn assert_exists(&self, selector: &str) -> Result<()> {
        self.select_one(selector).map(drop)
    }

    /// Markup of the first element matching `selector`, attributes in source
    /// order with the inline style last.
    pub fn dump_dom(&self, selector: &str) -> Result<String> {
        Ok(self.doc.render(self.select_one(selector)?))
    }

    pub(crate) fn select_one(&self, selector: &str) -> Result<NodeId> {
        self.doc
            .query_selector(selector)?
            .ok_or_else(|| Error::SelectorNotFound(selector.to_string()))
    }

    fn require_element(&self, what: &str, node: NodeId) -> Result<()> {
        match self.doc.element(node) {
            Some(_) => Ok(()),
            None => Err(Error::DomRuntime(format!(
                "{what} target node-{} is not an element",
                node.0
            ))),
        }
    }

    fn dispatch_node(&mut self, target: NodeId, event_type: &str) -> Result<()> {
        stacker::grow(DISPATCH_STACK_BYTES, || self.dispatch_event(target, event_type))
    }

    /// Target phase on `target`, then bubbling through every ancestor.
    fn dispatch_event(&mut self, target: NodeId, event_type: &str) -> Result<()> {
        let path = std::iter::once(target)
            .chain(self.doc.ancestors(target))
            .collect::<Vec<_>>();

        for current_target in path {
            let event = EventState {
                event_type: event_type.to_string(),
                target,
                current_target,
            };
            for action in self.listeners.snapshot(current_target, event_type) {
                self.trace(TraceCategory::Event, |doc| {
                    format!(
                        "[event] {} target={} current={} phase={}",
                        event.event_type,
                        doc.label(event.target),
                        doc.label(event.current_target),
                        event.phase()
                    )
                });
                self.run_listener(&action, &event)?;
            }
        }

        self.trace(TraceCategory::Event, |doc| {
            format!("[event] done {event_type} target={}", doc.label(target))
        });
        Ok(())
    }

    fn run_listener(&mut self, action: &ListenerAction, event: &EventState) -> Result<()> {
        match action {
            ListenerAction::ApplyToTarget(effect) => self.apply_effect(*effect, event.target),
            ListenerAction::ApplyAll(effects) => effects.apply_all(self),
        }
    }

    /// Builds the line only when `category` is being recorded.
    pub(crate) fn trace(
        &mut self,
        category: TraceCategory,
        line: impl FnOnce(&Document) -> String,
    ) {
        if self.trace_log.wants(category) {
            let line = line(&self.doc);
            self.trace_log.push(line);
        }
    }
}

fn snippet(markup: String) -> String {
    match markup.char_indices().nth(SNIPPET_CHARS) {
        Some((cut, _)) => format!("{}...", &markup[..cut]),
        None => markup,
    }
}
