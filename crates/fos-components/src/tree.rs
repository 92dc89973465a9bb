//! Element Tree (arena-based allocation)
//!
//! Owns every element built in one view context and drives the construction
//! lifecycle: tag-seed copy → input overrides → attribute resolution → slot
//! initialization → content capture → validation → `after_init`.

use std::rc::Rc;
use std::sync::Arc;

use serde::Deserialize;

use crate::config::Config;
use crate::element::{Element, SlotValue};
use crate::error::{ComponentError, Result};
use crate::host::{Captured, Content, DirectHost, RenderHost};
use crate::registry::ComponentRegistry;
use crate::schema::{Accessor, Schema};
use crate::validation::{RuleValidator, ValidationProvider};
use crate::value::{Value, ValueMap};

/// Element identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub(crate) u32);

impl ElementId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Raw attribute input for a new element
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Input(ValueMap);

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a key
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_map(self) -> ValueMap {
        self.0
    }
}

impl From<ValueMap> for Input {
    fn from(map: ValueMap) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Input {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Result of dispatching an accessor
#[derive(Debug, PartialEq)]
pub enum Read<'a> {
    /// Declared attribute value
    Value(&'a Value),
    /// Hand-written method result
    Computed(Value),
    /// Single slot, or the child a slot call just built
    Child(Option<ElementId>),
    /// Repeated slot
    Children(&'a [ElementId]),
}

/// Single-slot binding replaced while an outer construction is in progress
#[derive(Debug)]
struct Replaced {
    parent: ElementId,
    slot: String,
    previous: ElementId,
    child: ElementId,
}

/// Arena of elements sharing one host, validator and configuration
pub struct ElementTree {
    nodes: Vec<Element>,
    host: Rc<dyn RenderHost>,
    validator: Rc<dyn ValidationProvider>,
    config: Config,
    /// Nesting of all-or-nothing steps currently running
    depth: usize,
    replaced: Vec<Replaced>,
}

impl ElementTree {
    /// Create an empty tree with the direct host and rule validator
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            nodes: Vec::new(),
            host: Rc::new(DirectHost),
            validator: Rc::new(RuleValidator),
            config,
            depth: 0,
            replaced: Vec::new(),
        }
    }

    /// Use `host` to evaluate content callbacks
    pub fn host(mut self, host: impl RenderHost + 'static) -> Self {
        self.host = Rc::new(host);
        self
    }

    /// Use `validator` instead of the schema rule validator
    pub fn validator(mut self, validator: impl ValidationProvider + 'static) -> Self {
        self.validator = Rc::new(validator);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get an element by ID
    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.nodes.get(id.index())
    }

    /// Get a mutable element by ID
    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.nodes.get_mut(id.index())
    }

    /// Get an element by ID, failing when it does not exist
    pub fn element(&self, id: ElementId) -> Result<&Element> {
        self.get(id).ok_or(ComponentError::NoSuchElement(id))
    }

    pub fn element_mut(&mut self, id: ElementId) -> Result<&mut Element> {
        self.nodes
            .get_mut(id.index())
            .ok_or(ComponentError::NoSuchElement(id))
    }

    /// Number of elements in the tree
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Build a root element
    pub fn create(&mut self, schema: &Arc<Schema>, input: Input, content: Option<Content<'_>>) -> Result<ElementId> {
        self.construct(schema, None, input, content)
    }

    /// Enclosing elements, outermost first
    pub fn ancestors(&self, id: ElementId) -> Vec<ElementId> {
        let mut chain = Vec::new();
        let mut current = self.get(id).and_then(Element::parent);
        while let Some(parent) = current {
            chain.push(parent);
            current = self.get(parent).and_then(Element::parent);
        }
        chain.reverse();
        chain
    }

    /// `base-name` using the configured separator
    pub fn join_class(&self, id: ElementId, name: &str) -> Result<Option<String>> {
        Ok(self.element(id)?.join_class(name, &self.config.class_separator))
    }

    /// Captured content of an element, empty when nothing was captured
    pub fn content(&self, id: ElementId) -> String {
        self.get(id).map(ToString::to_string).unwrap_or_default()
    }

    /// Dispatch an accessor by name.
    ///
    /// Attribute and method accessors take no arguments. A slot accessor
    /// with neither input nor content is a pure read; otherwise it builds a
    /// child and returns it as [`Read::Child`].
    pub fn call(
        &mut self,
        id: ElementId,
        name: &str,
        input: Option<Input>,
        content: Option<Content<'_>>,
    ) -> Result<Read<'_>> {
        let schema = Arc::clone(self.element(id)?.schema());
        let accessor = schema
            .accessor(name)
            .ok_or_else(|| ComponentError::UnknownAccessor(name.to_string()))?;
        let has_args = input.is_some() || content.is_some();

        match accessor {
            Accessor::Slot(slot) if has_args => {
                let child = self.fill_slot(id, slot, input.unwrap_or_default(), content)?;
                Ok(Read::Child(Some(child)))
            }
            _ if has_args => Err(ComponentError::input_shape(name, "accessor takes no arguments")),
            Accessor::Attribute(attr) => {
                let element = self.element(id)?;
                element
                    .get(attr)
                    .map(Read::Value)
                    .ok_or_else(|| ComponentError::UnknownAccessor(name.to_string()))
            }
            Accessor::Method(method) => {
                let f = schema
                    .method(method)
                    .ok_or_else(|| ComponentError::UnknownAccessor(name.to_string()))?;
                Ok(Read::Computed(f(self, id)))
            }
            Accessor::Slot(slot) | Accessor::Plural(slot) => match self.element(id)?.slot(slot) {
                Some(SlotValue::Single(child)) => Ok(Read::Child(*child)),
                Some(SlotValue::Repeated(children)) => Ok(Read::Children(children)),
                None => Err(ComponentError::UnknownAccessor(name.to_string())),
            },
        }
    }

    /// Build a child in `slot` of `parent`.
    ///
    /// Children of a rendering type get `pre_render` and `render` run, and
    /// the render output replaces their captured content. Repeated slots
    /// append; single slots replace.
    pub fn fill_slot(
        &mut self,
        parent: ElementId,
        slot: &str,
        input: Input,
        content: Option<Content<'_>>,
    ) -> Result<ElementId> {
        let spec = self
            .element(parent)?
            .schema()
            .slot(slot)
            .cloned()
            .ok_or_else(|| ComponentError::UnknownAccessor(slot.to_string()))?;

        let child = self.atomic(|tree| {
            let child = tree.construct(&spec.schema, Some(parent), input, content)?;
            if spec.schema.renders() {
                let rendered = tree.render_element(child)?;
                tree.nodes[child.index()].captured = Some(rendered);
            }
            Ok(child)
        })?;

        let previous = self.nodes[parent.index()]
            .slots
            .get_mut(slot)
            .and_then(|binding| binding.bind(child));
        if let Some(previous) = previous.filter(|_| self.depth > 0) {
            self.replaced.push(Replaced {
                parent,
                slot: slot.to_string(),
                previous,
                child,
            });
        }
        tracing::trace!("Filled slot {} of {}", slot, self.nodes[parent.index()].schema.name());
        Ok(child)
    }

    /// Build a registered component as a root element and render it
    pub fn render_component(
        &mut self,
        registry: &ComponentRegistry,
        name: &str,
        input: Input,
        content: Option<Content<'_>>,
    ) -> Result<Captured> {
        let schema = registry.resolve(name)?;
        let id = self.create(&schema, input, content)?;
        self.render_element(id)
    }

    /// `pre_render` then `render`; without a render hook the captured
    /// content is returned as is
    fn render_element(&mut self, id: ElementId) -> Result<Captured> {
        let hooks = self.element(id)?.schema().hooks().clone();
        if let Some(pre_render) = &hooks.pre_render {
            pre_render(self, id)?;
        }
        match &hooks.render {
            Some(render) => render(self, id),
            None => Ok(self.element(id)?.captured().cloned().unwrap_or_default()),
        }
    }

    /// Run the full lifecycle; on any failure every element created by this
    /// attempt is discarded
    fn construct(
        &mut self,
        schema: &Arc<Schema>,
        parent: Option<ElementId>,
        input: Input,
        content: Option<Content<'_>>,
    ) -> Result<ElementId> {
        self.atomic(|tree| tree.construct_inner(schema, parent, input, content))
    }

    /// Run `f` as one all-or-nothing step. On failure every element it
    /// created is discarded and the single-slot bindings it replaced are
    /// put back.
    fn atomic<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let mark = self.nodes.len();
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;

        if result.is_err() {
            self.rollback(mark);
        }
        if self.depth == 0 {
            self.replaced.clear();
        }
        result
    }

    fn construct_inner(
        &mut self,
        schema: &Arc<Schema>,
        parent: Option<ElementId>,
        input: Input,
        content: Option<Content<'_>>,
    ) -> Result<ElementId> {
        tracing::debug!("Constructing {} element", schema.name());

        let mut input = input.into_map();

        let mut tags = schema.seeds().clone();
        if let Some(class) = input.shift_remove("class") {
            tags.class.add(class_tokens(&class)?);
        }
        if let Some(data) = input.shift_remove("data") {
            tags.data.add(map_entries("data", data)?);
        }
        if let Some(aria) = input.shift_remove("aria") {
            tags.aria.add(map_entries("aria", aria)?);
        }
        if let Some(splat) = input.shift_remove("splat") {
            tags.tag.add(map_entries("splat", splat)?);
        }

        if self.config.reject_unknown_input {
            if let Some(key) = input.keys().find(|key| schema.default_value(key).is_none()) {
                return Err(ComponentError::input_shape(key, "not a declared attribute"));
            }
        }

        // Only a null or missing input falls back to the default; `false`
        // and `""` are kept as given.
        let mut values = ValueMap::with_capacity(schema.attributes().len());
        for (name, default) in schema.attributes() {
            let value = match input.shift_remove(name) {
                Some(value) if !value.is_null() => value,
                _ => default.clone(),
            };
            for group in tags.keyed_mut() {
                if group.contains_key(name) {
                    group.insert(name.clone(), value.clone());
                }
            }
            values.insert(name.clone(), value);
        }

        let slots = schema
            .slots()
            .iter()
            .map(|(name, spec)| (name.clone(), SlotValue::empty(spec.is_repeated())))
            .collect();

        let id = ElementId(self.nodes.len() as u32);
        self.nodes.push(Element {
            schema: Arc::clone(schema),
            parent,
            values,
            tags,
            slots,
            captured: None,
        });

        if let Some(content) = content {
            let host = Rc::clone(&self.host);
            let captured = host.capture(self, id, content)?;
            self.nodes[id.index()].captured = Some(captured);
        }

        let validator = Rc::clone(&self.validator);
        if let Err(failure) = validator.validate(self, id) {
            tracing::debug!("Validation failed for {}: {}", schema.name(), failure);
            return Err(failure.into());
        }

        if let Some(after_init) = schema.hooks().after_init.clone() {
            after_init(self, id)?;
        }

        Ok(id)
    }

    /// Discard every element from `mark` on, and any slot binding to them
    fn rollback(&mut self, mark: usize) {
        // Replacements made since `mark` sit at the tail, newest last
        while self.replaced.last().is_some_and(|entry| entry.child.index() >= mark) {
            let Some(entry) = self.replaced.pop() else {
                break;
            };
            if let Some(binding) = self
                .nodes
                .get_mut(entry.parent.index())
                .and_then(|node| node.slots.get_mut(&entry.slot))
            {
                binding.restore(entry.previous);
            }
        }

        if self.nodes.len() <= mark {
            return;
        }
        tracing::debug!("Discarding {} partially built elements", self.nodes.len() - mark);
        self.nodes.truncate(mark);
        for node in &mut self.nodes {
            for binding in node.slots.values_mut() {
                binding.truncate(mark);
            }
        }
    }
}

impl Default for ElementTree {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ElementTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementTree")
            .field("nodes", &self.nodes)
            .field("config", &self.config)
            .finish()
    }
}

/// Expand a `class` input into tokens
fn class_tokens(value: &Value) -> Result<Vec<String>> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Str(s) => Ok(s.split_whitespace().map(str::to_string).collect()),
        Value::Int(_) | Value::Float(_) => Ok(vec![value.to_string()]),
        Value::List(items) => {
            let mut tokens = Vec::with_capacity(items.len());
            for item in items {
                tokens.extend(class_tokens(item)?);
            }
            Ok(tokens)
        }
        other => Err(ComponentError::input_shape(
            "class",
            format!("expected string or list, got {}", other.kind()),
        )),
    }
}

/// Entries of a map-shaped input (`data`, `aria`, `splat`)
fn map_entries(key: &str, value: Value) -> Result<ValueMap> {
    match value {
        Value::Map(map) => Ok(map),
        Value::Null => Ok(ValueMap::new()),
        other => Err(ComponentError::input_shape(key, format!("expected map, got {}", other.kind()))),
    }
}
