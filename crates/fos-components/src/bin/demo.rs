//! Build and render a small card component

use std::sync::Arc;

use fos_components::{
    content, Captured, ComponentRegistry, ElementId, ElementTree, Input, Rule, Schema, SlotOptions,
};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut registry = ComponentRegistry::new();
    registry.define("header", header_schema()?)?;

    let mut card = Schema::base("card").with_registry(&registry);
    card.tag_attr("id")?.base_class("card");
    card.slot("header", SlotOptions::single().component("header"))?;
    card.slot_with("section", SlotOptions::repeated(), |section| {
        section.attribute_with_default("size", "md")?;
        section.slot("header", SlotOptions::single())?;
        section.validates("size", Rule::Presence);
        Ok(())
    })?;
    card.render(render_card);
    let card = card.build();
    registry.define("card", card)?;

    let mut tree = ElementTree::new();
    let html = tree.render_component(
        &registry,
        "card",
        Input::new().with("id", "intro").with("class", "wide"),
        Some(content(|tree, card| {
            tree.fill_slot(card, "header", Input::new().with("title", "Welcome"), None)?;
            for size in ["sm", "lg"] {
                tree.fill_slot(
                    card,
                    "section",
                    Input::new().with("size", size),
                    Some(content(move |_, _| Ok(format!("A {} section", size).into()))),
                )?;
            }
            Ok(Captured::default())
        })),
    )?;

    tracing::info!("Built {} elements", tree.len());
    println!("{}", html);
    Ok(())
}

fn header_schema() -> fos_components::Result<Arc<Schema>> {
    let mut header = Schema::base("header");
    header.attribute("title")?.base_class("card-header");
    header.render(|tree, id| {
        let element = tree.element(id)?;
        let title = element.get("title").map(ToString::to_string).unwrap_or_default();
        Ok(format!("<h2 {}>{}</h2>", element.attrs(true), title).into())
    });
    Ok(header.build())
}

fn render_card(tree: &mut ElementTree, id: ElementId) -> fos_components::Result<Captured> {
    let card = tree.element(id)?;
    let mut html = format!("<div {}>\n", card.attrs(true));

    if let Some(header) = card.child("header") {
        html.push_str(&format!("  {}\n", tree.content(header)));
    }
    for &section in card.children("section") {
        let section_el = tree.element(section)?;
        let size = section_el.get("size").map(ToString::to_string).unwrap_or_default();
        let class = tree.join_class(id, &size)?.unwrap_or_default();
        html.push_str(&format!("  <section class=\"{}\">{}</section>\n", class, tree.content(section)));
    }

    html.push_str("</div>");
    Ok(html.into())
}
