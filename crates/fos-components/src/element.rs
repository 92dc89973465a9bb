//! Elements
//!
//! An instantiated component: resolved attribute values, owned tag-attribute
//! groups, a parent link and slot-bound children.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::attributes::{AttrMap, TagAttributes};
use crate::classlist::ClassList;
use crate::host::Captured;
use crate::schema::Schema;
use crate::tree::ElementId;
use crate::value::{Value, ValueMap};

/// Children bound to a slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotValue {
    Single(Option<ElementId>),
    Repeated(Vec<ElementId>),
}

impl SlotValue {
    pub(crate) fn empty(repeated: bool) -> Self {
        if repeated {
            SlotValue::Repeated(Vec::new())
        } else {
            SlotValue::Single(None)
        }
    }

    /// Bound children in order
    pub fn ids(&self) -> &[ElementId] {
        match self {
            SlotValue::Single(child) => child.as_slice(),
            SlotValue::Repeated(children) => children,
        }
    }

    /// Bind a child, returning the single child it replaced
    pub(crate) fn bind(&mut self, child: ElementId) -> Option<ElementId> {
        match self {
            SlotValue::Single(slot) => slot.replace(child),
            SlotValue::Repeated(children) => {
                children.push(child);
                None
            }
        }
    }

    /// Put back a single child replaced by a discarded one
    pub(crate) fn restore(&mut self, previous: ElementId) {
        if let SlotValue::Single(slot) = self {
            *slot = Some(previous);
        }
    }

    /// Drop references to discarded elements. Replaced single children are
    /// restored separately, before this runs.
    pub(crate) fn truncate(&mut self, len: usize) {
        match self {
            SlotValue::Single(slot) => {
                if slot.is_some_and(|id| id.index() >= len) {
                    *slot = None;
                }
            }
            SlotValue::Repeated(children) => children.retain(|id| id.index() < len),
        }
    }
}

/// Element node
#[derive(Debug, Clone)]
pub struct Element {
    pub(crate) schema: Arc<Schema>,
    pub(crate) parent: Option<ElementId>,
    pub(crate) values: ValueMap,
    pub(crate) tags: TagAttributes,
    pub(crate) slots: IndexMap<String, SlotValue>,
    pub(crate) captured: Option<Captured>,
}

impl Element {
    /// Schema this element was built against
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Immediate parent, `None` for a root
    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    /// Resolved value of a declared attribute
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Mutable resolved value; each element owns its own copy
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.values.get_mut(name)
    }

    /// All resolved attribute values
    pub fn values(&self) -> &ValueMap {
        &self.values
    }

    /// Children bound to a slot
    pub fn slot(&self, name: &str) -> Option<&SlotValue> {
        self.slots.get(name)
    }

    /// Single child of a slot
    pub fn child(&self, slot: &str) -> Option<ElementId> {
        match self.slots.get(slot) {
            Some(SlotValue::Single(child)) => *child,
            _ => None,
        }
    }

    /// Children of a repeated slot, in the order they were added
    pub fn children(&self, slot: &str) -> &[ElementId] {
        match self.slots.get(slot) {
            Some(SlotValue::Repeated(children)) => children,
            _ => &[],
        }
    }

    /// Captured or rendered content
    pub fn captured(&self) -> Option<&Captured> {
        self.captured.as_ref()
    }

    pub fn classnames(&self) -> &ClassList {
        &self.tags.class
    }

    pub fn classnames_mut(&mut self) -> &mut ClassList {
        &mut self.tags.class
    }

    pub fn base_class(&self) -> Option<&str> {
        self.tags.class.base()
    }

    pub fn set_base_class(&mut self, token: &str) {
        self.tags.class.set_base(token);
    }

    pub fn add_class<I, S>(&mut self, tokens: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tags.class.add(tokens);
    }

    /// `base-name`, or `None` without a base class
    pub fn join_class(&self, name: &str, separator: &str) -> Option<String> {
        self.base_class().map(|base| format!("{}{}{}", base, separator, name))
    }

    pub fn data_attr(&self) -> &AttrMap {
        &self.tags.data
    }

    pub fn data_attr_mut(&mut self) -> &mut AttrMap {
        &mut self.tags.data
    }

    pub fn aria_attr(&self) -> &AttrMap {
        &self.tags.aria
    }

    pub fn aria_attr_mut(&mut self) -> &mut AttrMap {
        &mut self.tags.aria
    }

    pub fn tag_attr(&self) -> &AttrMap {
        &self.tags.tag
    }

    pub fn tag_attr_mut(&mut self) -> &mut AttrMap {
        &mut self.tags.tag
    }

    /// All tag attributes in emission order: `id`, `class`, `data-*`,
    /// `aria-*`, then the remaining plain attributes. Later keys win.
    pub fn attrs(&self, add_class: bool) -> AttrMap {
        let mut attrs = AttrMap::new();
        if let Some(id) = self.tags.tag.get("id").filter(|v| !v.is_absent()) {
            attrs.insert("id", id.clone());
        }
        if add_class {
            attrs.insert("class", self.tags.class.value());
        }
        attrs.add(self.tags.data.collapse());
        attrs.add(self.tags.aria.collapse());
        attrs.add(self.tags.tag.collapse().into_iter().filter(|(name, _)| name != "id"));
        attrs
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.captured {
            Some(captured) => write!(f, "{}", captured),
            None => Ok(()),
        }
    }
}
