use super::*;

/// A one-way visual mutation of a single inline style property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Effect {
    /// `text-decoration: line-through`
    StrikeThrough,
    /// `opacity: 0`; the element stays in layout and keeps receiving clicks.
    Fade,
    /// `width: 0px`; the element stays in the document.
    Collapse,
}

impl Effect {
    pub const ALL: [Effect; 3] = [Effect::StrikeThrough, Effect::Fade, Effect::Collapse];

    pub fn property(self) -> &'static str {
        match self {
            Self::StrikeThrough => "text-decoration",
            Self::Fade => "opacity",
            Self::Collapse => "width",
        }
    }

    pub fn value(self) -> &'static str {
        match self {
            Self::StrikeThrough => "line-through",
            Self::Fade => "0",
            Self::Collapse => "0px",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::StrikeThrough => "strike-through",
            Self::Fade => "fade",
            Self::Collapse => "collapse",
        }
    }

    pub(crate) fn apply(self, doc: &mut Document, node: NodeId) -> Result<()> {
        doc.set_style(node, self.property(), self.value())
    }
}

/// Selectors used to resolve the collections and the control element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectSelectors {
    pub ordered_items: String,
    pub unordered_items: String,
    pub images: String,
    pub control: String,
}

impl Default for EffectSelectors {
    fn default() -> Self {
        Self {
            ordered_items: "ol li".to_string(),
            unordered_items: "ul li".to_string(),
            images: "#row img".to_string(),
            control: "#destroy-all".to_string(),
        }
    }
}

/// Elements matched by one selector at install time, paired with the effect
/// they receive. Membership never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetCollection {
    selector: String,
    effect: Effect,
    members: Vec<NodeId>,
}

impl TargetCollection {
    fn resolve(harness: &mut Harness, selector: &str, effect: Effect) -> Result<Self> {
        let members = harness.query_selector_all(selector)?;
        harness.trace(TraceCategory::Effect, |_| {
            format!(
                "[bind] resolved {selector} -> {} element(s) for {}",
                members.len(),
                effect.label()
            )
        });
        Ok(Self {
            selector: selector.to_string(),
            effect,
            members,
        })
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    pub fn effect(&self) -> Effect {
        self.effect
    }

    pub fn members(&self) -> &[NodeId] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    fn bind_single_targets(&self, harness: &mut Harness) -> Result<()> {
        for node in &self.members {
            harness.add_click_listener(*node, ListenerAction::ApplyToTarget(self.effect))?;
        }
        if !self.members.is_empty() {
            harness.trace(TraceCategory::Effect, |_| {
                format!(
                    "[bind] {} click listener(s) on {} -> {}",
                    self.members.len(),
                    self.selector,
                    self.effect.label()
                )
            });
        }
        Ok(())
    }
}

/// Handle returned by [`ClickEffects::install`].
///
/// Cloning is cheap; clones share the same collections. The control
/// element's listener holds one such clone.
#[derive(Debug, Clone)]
pub struct ClickEffects {
    collections: Rc<[TargetCollection; 3]>,
    control: NodeId,
}

impl ClickEffects {
    /// Installs the effects with [`EffectSelectors::default`].
    pub fn install(harness: &mut Harness) -> Result<Self> {
        Self::install_with(harness, &EffectSelectors::default())
    }

    /// Resolves the three collections and the control element once, binds a
    /// click listener to every collected element, then binds the control.
    ///
    /// A missing control element fails with [`Error::SelectorNotFound`] after
    /// the per-element listeners are already in place; those stay installed,
    /// and the document then refuses another install. A selector that fails
    /// to parse binds nothing and leaves the document installable.
    pub fn install_with(harness: &mut Harness, selectors: &EffectSelectors) -> Result<Self> {
        if harness.effects_installed {
            return Err(Error::DomRuntime(
                "click effects are already installed on this document".into(),
            ));
        }

        let collections = Rc::new([
            TargetCollection::resolve(harness, &selectors.ordered_items, Effect::StrikeThrough)?,
            TargetCollection::resolve(harness, &selectors.unordered_items, Effect::Fade)?,
            TargetCollection::resolve(harness, &selectors.images, Effect::Collapse)?,
        ]);
        let control = harness.query_selector(&selectors.control)?;
        harness.effects_installed = true;

        for collection in collections.iter() {
            collection.bind_single_targets(harness)?;
        }

        let control = control.ok_or_else(|| Error::SelectorNotFound(selectors.control.clone()))?;
        let effects = Self {
            collections,
            control,
        };
        harness.add_click_listener(control, ListenerAction::ApplyAll(effects.clone()))?;
        harness.trace(TraceCategory::Effect, |doc| {
            format!("[bind] control {} -> apply-all", doc.label(control))
        });
        Ok(effects)
    }

    pub fn collections(&self) -> &[TargetCollection] {
        self.collections.as_slice()
    }

    pub fn collection(&self, effect: Effect) -> &TargetCollection {
        match effect {
            Effect::StrikeThrough => &self.collections[0],
            Effect::Fade => &self.collections[1],
            Effect::Collapse => &self.collections[2],
        }
    }

    pub fn control(&self) -> NodeId {
        self.control
    }

    /// Applies each collection's effect to all of its members, first
    /// collection to last. Members detached since install are still styled.
    pub fn apply_all(&self, harness: &mut Harness) -> Result<()> {
        let mut applied = 0usize;
        for collection in self.collections.iter() {
            for node in &collection.members {
                harness.apply_effect(collection.effect, *node)?;
                applied += 1;
            }
        }
        harness.trace(TraceCategory::Effect, |_| {
            format!("[effect] apply-all styled {applied} element(s)")
        });
        Ok(())
    }
}

impl Harness {
    pub(crate) fn apply_effect(&mut self, effect: Effect, node: NodeId) -> Result<()> {
        effect.apply(&mut self.doc, node)?;
        self.trace(TraceCategory::Effect, |doc| {
            format!(
                "[effect] {} {} {}: {}",
                effect.label(),
                doc.label(node),
                effect.property(),
                effect.value()
            )
        });
        Ok(())
    }
}
