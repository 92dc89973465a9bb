//! fOS Components - Declarative UI component schemas
//!
//! Component types declare attributes with defaults, child slots, tag
//! attributes and hooks. Types inherit from one another without sharing
//! mutable state, and elements built from them live in an [`ElementTree`].
//!
//! ```
//! use fos_components::{ElementTree, Input, Schema, SlotOptions};
//!
//! let mut card = Schema::base("card");
//! card.attribute("title").unwrap();
//! card.slot("section", SlotOptions::repeated()).unwrap();
//! let card = card.build();
//!
//! let mut tree = ElementTree::new();
//! let id = tree.create(&card, Input::new().with("title", "Hello"), None).unwrap();
//! tree.fill_slot(id, "section", Input::new(), None).unwrap();
//!
//! assert_eq!(tree.element(id).unwrap().children("section").len(), 1);
//! ```

mod attributes;
mod classlist;
mod config;
mod element;
mod error;
mod host;
mod inflect;
mod registry;
mod schema;
mod tree;
mod validation;
mod value;

pub use attributes::{AttrMap, TagAttributes};
pub use classlist::ClassList;
pub use config::Config;
pub use element::{Element, SlotValue};
pub use error::{ComponentError, Result};
pub use host::{content, Captured, Content, DirectHost, RenderHost};
pub use inflect::{humanize, pluralize};
pub use registry::ComponentRegistry;
pub use schema::{
    Accessor, Hook, Hooks, MethodFn, Origin, RenderFn, Schema, SchemaBuilder, SlotOptions, SlotSpec,
    RESERVED_METHODS,
};
pub use tree::{ElementId, ElementTree, Input, Read};
pub use validation::{Check, Rule, RuleValidator, ValidationFailure, ValidationProvider};
pub use value::{value_map, Value, ValueMap};
