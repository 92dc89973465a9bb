//! Component Schemas
//!
//! Per-type declarations: attributes with defaults, child slots, tag-attribute
//! seeds, hand-written methods, validation rules and lifecycle hooks.
//!
//! A schema is assembled with a [`SchemaBuilder`] and frozen into an
//! `Arc<Schema>`, shared read-only by every element of that type. Deriving a
//! type starts from a structural copy of its parent, so later declarations
//! can extend the inherited set but never touch the parent.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::attributes::TagAttributes;
use crate::error::{ComponentError, Result};
use crate::host::Captured;
use crate::inflect::pluralize;
use crate::registry::ComponentRegistry;
use crate::tree::{ElementId, ElementTree};
use crate::validation::Rule;
use crate::value::{Value, ValueMap};

/// Lifecycle hook (`after_init`, `pre_render`)
pub type Hook = Arc<dyn Fn(&mut ElementTree, ElementId) -> Result<()> + Send + Sync>;

/// Render hook
pub type RenderFn = Arc<dyn Fn(&mut ElementTree, ElementId) -> Result<Captured> + Send + Sync>;

/// Hand-written computed method
pub type MethodFn = Arc<dyn Fn(&ElementTree, ElementId) -> Value + Send + Sync>;

/// Names of methods every element already has. Declarations may not shadow them.
pub const RESERVED_METHODS: &[&str] = &[
    "add_class", "after_init", "ancestors", "aria_attr", "attrs", "base_class",
    "call", "captured", "classnames", "data_attr", "get", "join_class",
    "parent", "pre_render", "render", "schema", "slot", "tag_attr", "to_string",
];

/// What an accessor name dispatches to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Accessor {
    /// Declared attribute
    Attribute(String),
    /// Slot under its own name: reads, or builds a child when given input
    Slot(String),
    /// Plural read accessor of a repeated slot
    Plural(String),
    /// Hand-written method
    Method(String),
}

/// Where an accessor was generated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Declared on this type
    Own,
    /// Copied from the parent type
    Inherited,
}

/// Child slot declaration
#[derive(Debug, Clone)]
pub struct SlotSpec {
    /// Plural accessor name, for repeated slots
    pub plural: Option<String>,
    /// Schema children of this slot are built against
    pub schema: Arc<Schema>,
}

impl SlotSpec {
    pub fn is_repeated(&self) -> bool {
        self.plural.is_some()
    }
}

/// Slot declaration options
#[derive(Debug, Clone, Default)]
pub struct SlotOptions {
    repeated: bool,
    delegate: Option<Delegate>,
}

#[derive(Debug, Clone)]
enum Delegate {
    Schema(Arc<Schema>),
    Named(String),
}

impl SlotOptions {
    /// Single child slot
    pub fn single() -> Self {
        Self::default()
    }

    /// Ordered list of children, with a plural read accessor
    pub fn repeated() -> Self {
        Self {
            repeated: true,
            delegate: None,
        }
    }

    /// Build children as specializations of `schema`
    pub fn delegate(mut self, schema: &Arc<Schema>) -> Self {
        self.delegate = Some(Delegate::Schema(Arc::clone(schema)));
        self
    }

    /// Build children as specializations of a registered component,
    /// resolved when the slot is declared
    pub fn component(mut self, name: impl Into<String>) -> Self {
        self.delegate = Some(Delegate::Named(name.into()));
        self
    }
}

/// Optional lifecycle hooks
#[derive(Clone, Default)]
pub struct Hooks {
    pub after_init: Option<Hook>,
    pub pre_render: Option<Hook>,
    pub render: Option<RenderFn>,
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("after_init", &self.after_init.is_some())
            .field("pre_render", &self.pre_render.is_some())
            .field("render", &self.render.is_some())
            .finish()
    }
}

/// Immutable declaration of a component type
#[derive(Clone)]
pub struct Schema {
    name: String,
    attributes: ValueMap,
    slots: IndexMap<String, SlotSpec>,
    seeds: TagAttributes,
    methods: IndexMap<String, MethodFn>,
    accessors: IndexMap<String, (Accessor, Origin)>,
    rules: Vec<(String, Rule)>,
    hooks: Hooks,
}

impl Schema {
    /// Start declaring a type with no ancestor
    pub fn base(name: impl Into<String>) -> SchemaBuilder<'static> {
        SchemaBuilder::new(Self::empty(name.into()), None)
    }

    /// Start declaring a specialization of `parent`
    pub fn extend(parent: &Schema, name: impl Into<String>) -> SchemaBuilder<'static> {
        SchemaBuilder::new(parent.inherit(name.into()), None)
    }

    fn empty(name: String) -> Self {
        Self {
            name,
            attributes: ValueMap::new(),
            slots: IndexMap::new(),
            seeds: TagAttributes::new(),
            methods: IndexMap::new(),
            accessors: IndexMap::new(),
            rules: Vec::new(),
            hooks: Hooks::default(),
        }
    }

    /// Structural copy with every accessor marked inherited
    fn inherit(&self, name: String) -> Self {
        let mut schema = self.clone();
        schema.name = name;
        for (_, origin) in schema.accessors.values_mut() {
            *origin = Origin::Inherited;
        }
        schema
    }

    /// Type name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared attributes and their defaults
    pub fn attributes(&self) -> &ValueMap {
        &self.attributes
    }

    /// Default for a declared attribute
    pub fn default_value(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Declared slots
    pub fn slots(&self) -> &IndexMap<String, SlotSpec> {
        &self.slots
    }

    /// Get slot by name
    pub fn slot(&self, name: &str) -> Option<&SlotSpec> {
        self.slots.get(name)
    }

    /// Tag-attribute templates copied into every element
    pub fn seeds(&self) -> &TagAttributes {
        &self.seeds
    }

    /// Resolve an accessor name
    pub fn accessor(&self, name: &str) -> Option<&Accessor> {
        self.accessors.get(name).map(|(accessor, _)| accessor)
    }

    /// Where an accessor was generated
    pub fn origin(&self, name: &str) -> Option<Origin> {
        self.accessors.get(name).map(|(_, origin)| *origin)
    }

    /// All accessor names in declaration order
    pub fn accessor_names(&self) -> impl Iterator<Item = &str> {
        self.accessors.keys().map(String::as_str)
    }

    /// Hand-written method by name
    pub fn method(&self, name: &str) -> Option<&MethodFn> {
        self.methods.get(name)
    }

    /// Declared validation rules
    pub fn rules(&self) -> &[(String, Rule)] {
        &self.rules
    }

    /// Lifecycle hooks
    pub fn hooks(&self) -> &Hooks {
        &self.hooks
    }

    /// Whether elements of this type have a render pass
    pub fn renders(&self) -> bool {
        self.hooks.render.is_some()
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("name", &self.name)
            .field("attributes", &self.attributes)
            .field("slots", &self.slots.keys().collect::<Vec<_>>())
            .field("seeds", &self.seeds)
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .field("rules", &self.rules)
            .field("hooks", &self.hooks)
            .finish()
    }
}

/// Mutable schema under declaration
#[derive(Debug)]
pub struct SchemaBuilder<'r> {
    schema: Schema,
    registry: Option<&'r ComponentRegistry>,
}

impl<'r> SchemaBuilder<'r> {
    fn new(schema: Schema, registry: Option<&'r ComponentRegistry>) -> Self {
        Self { schema, registry }
    }

    /// Resolve component-delegating slots through `registry`
    pub fn with_registry<'a>(self, registry: &'a ComponentRegistry) -> SchemaBuilder<'a> {
        SchemaBuilder {
            schema: self.schema,
            registry: Some(registry),
        }
    }

    /// Schema declared so far
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Declare an attribute with a null default
    pub fn attribute(&mut self, name: &str) -> Result<&mut Self> {
        self.attribute_with_default(name, Value::Null)
    }

    /// Declare an attribute with a default, cloned into every element
    pub fn attribute_with_default(&mut self, name: &str, default: impl Into<Value>) -> Result<&mut Self> {
        self.define_accessor(name, Accessor::Attribute(name.to_string()))?;
        self.schema.attributes.insert(name.to_string(), default.into());
        Ok(self)
    }

    /// Declare several attributes at once: bare names with a null default,
    /// then name/default pairs. Returns what was declared.
    pub fn attributes<I, K, V>(&mut self, names: &[&str], defaults: I) -> Result<ValueMap>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut declared = ValueMap::new();
        for name in names {
            self.attribute(name)?;
            declared.insert(name.to_string(), Value::Null);
        }
        for (name, default) in defaults {
            let (name, default) = (name.into(), default.into());
            self.attribute_with_default(&name, default.clone())?;
            declared.insert(name, default);
        }
        Ok(declared)
    }

    /// Set the base class of the classname seed
    pub fn base_class(&mut self, token: &str) -> &mut Self {
        self.schema.seeds.class.set_base(token);
        self
    }

    /// Add modifier classes to the classname seed
    pub fn add_class<I, S>(&mut self, tokens: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.schema.seeds.class.add(tokens);
        self
    }

    /// Declare an attribute that also feeds a `data-` attribute
    pub fn data_attr(&mut self, name: &str) -> Result<&mut Self> {
        self.data_attr_with_default(name, Value::Null)
    }

    pub fn data_attr_with_default(&mut self, name: &str, default: impl Into<Value>) -> Result<&mut Self> {
        let default = default.into();
        self.attribute_with_default(name, default.clone())?;
        self.schema.seeds.data.insert(name, default);
        Ok(self)
    }

    /// Declare an attribute that also feeds an `aria-` attribute
    pub fn aria_attr(&mut self, name: &str) -> Result<&mut Self> {
        self.aria_attr_with_default(name, Value::Null)
    }

    pub fn aria_attr_with_default(&mut self, name: &str, default: impl Into<Value>) -> Result<&mut Self> {
        let default = default.into();
        self.attribute_with_default(name, default.clone())?;
        self.schema.seeds.aria.insert(name, default);
        Ok(self)
    }

    /// Declare an attribute that also feeds a plain tag attribute
    pub fn tag_attr(&mut self, name: &str) -> Result<&mut Self> {
        self.tag_attr_with_default(name, Value::Null)
    }

    pub fn tag_attr_with_default(&mut self, name: &str, default: impl Into<Value>) -> Result<&mut Self> {
        let default = default.into();
        self.attribute_with_default(name, default.clone())?;
        self.schema.seeds.tag.insert(name, default);
        Ok(self)
    }

    /// Declare several `data-` attributes at once
    pub fn data_attrs<I, K, V>(&mut self, names: &[&str], defaults: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let declared = self.attributes(names, defaults)?;
        self.schema.seeds.data.add(declared);
        Ok(self)
    }

    /// Declare several `aria-` attributes at once
    pub fn aria_attrs<I, K, V>(&mut self, names: &[&str], defaults: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let declared = self.attributes(names, defaults)?;
        self.schema.seeds.aria.add(declared);
        Ok(self)
    }

    /// Declare several plain tag attributes at once
    pub fn tag_attrs<I, K, V>(&mut self, names: &[&str], defaults: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let declared = self.attributes(names, defaults)?;
        self.schema.seeds.tag.add(declared);
        Ok(self)
    }

    /// Declare a child slot with no extra configuration
    pub fn slot(&mut self, name: &str, options: SlotOptions) -> Result<&mut Self> {
        self.slot_with(name, options, |_| Ok(()))
    }

    /// Declare a child slot; `config` runs against the child schema, which
    /// starts as the delegate (or an empty type)
    pub fn slot_with<F>(&mut self, name: &str, options: SlotOptions, config: F) -> Result<&mut Self>
    where
        F: FnOnce(&mut SchemaBuilder<'r>) -> Result<()>,
    {
        let plural = options.repeated.then(|| pluralize(name));
        let plural_accessor = plural.as_deref().filter(|p| *p != name);

        // Both names are checked before anything is replaced
        self.check_accessor(name, &Accessor::Slot(name.to_string()))?;
        if let Some(plural) = plural_accessor {
            self.check_accessor(plural, &Accessor::Plural(name.to_string()))?;
        }

        let child_name = format!("{}::{}", self.schema.name, name);
        let base = match &options.delegate {
            Some(Delegate::Schema(schema)) => schema.inherit(child_name),
            Some(Delegate::Named(component)) => {
                let registry = self
                    .registry
                    .ok_or_else(|| ComponentError::UnknownComponent(component.clone()))?;
                registry.resolve(component)?.inherit(child_name)
            }
            None => Schema::empty(child_name),
        };

        let mut child = SchemaBuilder::new(base, self.registry);
        config(&mut child)?;

        // A redeclared slot keeps the inherited plural only if it still uses it
        if let Some(previous) = self.schema.slots.get(name).and_then(|spec| spec.plural.clone()) {
            if plural.as_deref() != Some(previous.as_str()) {
                self.drop_plural(name, &previous);
            }
        }

        self.define_accessor(name, Accessor::Slot(name.to_string()))?;
        if let Some(plural) = plural_accessor {
            self.define_accessor(plural, Accessor::Plural(name.to_string()))?;
        }

        self.schema.slots.insert(
            name.to_string(),
            SlotSpec {
                plural,
                schema: child.build(),
            },
        );
        Ok(self)
    }

    /// Declare a hand-written method
    pub fn method<F>(&mut self, name: &str, f: F) -> Result<&mut Self>
    where
        F: Fn(&ElementTree, ElementId) -> Value + Send + Sync + 'static,
    {
        self.define_accessor(name, Accessor::Method(name.to_string()))?;
        self.schema.methods.insert(name.to_string(), Arc::new(f));
        Ok(self)
    }

    /// Declare a validation rule for an attribute or slot
    pub fn validates(&mut self, name: &str, rule: Rule) -> &mut Self {
        self.schema.rules.push((name.to_string(), rule));
        self
    }

    /// Hook run after construction succeeds
    pub fn after_init<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&mut ElementTree, ElementId) -> Result<()> + Send + Sync + 'static,
    {
        self.schema.hooks.after_init = Some(Arc::new(f));
        self
    }

    /// Hook run right before `render`
    pub fn pre_render<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&mut ElementTree, ElementId) -> Result<()> + Send + Sync + 'static,
    {
        self.schema.hooks.pre_render = Some(Arc::new(f));
        self
    }

    /// Give the type a render pass
    pub fn render<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&mut ElementTree, ElementId) -> Result<Captured> + Send + Sync + 'static,
    {
        self.schema.hooks.render = Some(Arc::new(f));
        self
    }

    /// Freeze the schema
    pub fn build(self) -> Arc<Schema> {
        tracing::debug!(
            "Declared schema {}: {} attributes, {} slots",
            self.schema.name,
            self.schema.attributes.len(),
            self.schema.slots.len()
        );
        Arc::new(self.schema)
    }

    /// Refuse a name that would shadow a reserved method, anything this type
    /// declared itself, or an inherited hand-written method. Inherited
    /// generated accessors may be redeclared; methods may override methods.
    fn check_accessor(&self, name: &str, accessor: &Accessor) -> Result<()> {
        if RESERVED_METHODS.contains(&name) {
            return Err(ComponentError::SchemaConflict(name.to_string()));
        }

        match self.schema.accessors.get(name) {
            Some((_, Origin::Own)) => Err(ComponentError::SchemaConflict(name.to_string())),
            Some((Accessor::Method(_), Origin::Inherited)) if !matches!(accessor, Accessor::Method(_)) => {
                Err(ComponentError::SchemaConflict(name.to_string()))
            }
            _ => Ok(()),
        }
    }

    /// Register an accessor, replacing the inherited entry behind the name
    fn define_accessor(&mut self, name: &str, accessor: Accessor) -> Result<()> {
        self.check_accessor(name, &accessor)?;

        if let Some((previous, _)) = self.schema.accessors.get(name).cloned() {
            if previous != accessor {
                self.forget(&previous);
            }
        }
        self.schema.accessors.insert(name.to_string(), (accessor, Origin::Own));
        Ok(())
    }

    /// Drop the registry entry behind an inherited accessor being replaced
    /// by a different kind of declaration
    fn forget(&mut self, accessor: &Accessor) {
        match accessor {
            Accessor::Attribute(name) => {
                self.schema.attributes.shift_remove(name);
            }
            Accessor::Method(name) => {
                self.schema.methods.shift_remove(name);
            }
            Accessor::Slot(name) => {
                if let Some(plural) = self.schema.slots.shift_remove(name).and_then(|spec| spec.plural) {
                    self.drop_plural(name, &plural);
                }
            }
            Accessor::Plural(_) => {}
        }
    }

    /// Remove an inherited plural accessor that still points at `slot`
    fn drop_plural(&mut self, slot: &str, plural: &str) {
        let stale = matches!(
            self.schema.accessors.get(plural),
            Some((Accessor::Plural(target), Origin::Inherited)) if target == slot
        );
        if stale {
            self.schema.accessors.shift_remove(plural);
        }
    }
}
