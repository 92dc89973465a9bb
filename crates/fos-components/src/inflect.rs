//! English Inflection
//!
//! Just enough pluralization and humanization for slot accessors and
//! validation messages. Names are expected in snake_case.

const UNCOUNTABLE: &[&str] = &[
    "equipment", "information", "rice", "money", "species", "series",
    "fish", "sheep", "jeans", "police", "news", "data",
];

const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("man", "men"),
    ("woman", "women"),
    ("child", "children"),
    ("sex", "sexes"),
    ("move", "moves"),
    ("zombie", "zombies"),
];

/// Pluralize the last word of a snake_case name
pub fn pluralize(name: &str) -> String {
    let (head, word) = match name.rfind('_') {
        Some(pos) => name.split_at(pos + 1),
        None => ("", name),
    };
    if word.is_empty() {
        return name.to_string();
    }

    let lower = word.to_lowercase();
    if UNCOUNTABLE.contains(&lower.as_str()) {
        return name.to_string();
    }
    for (singular, plural) in IRREGULAR {
        if lower == *singular {
            return format!("{}{}", head, plural);
        }
        if lower == *plural {
            return name.to_string();
        }
    }

    format!("{}{}", head, pluralize_word(word, &lower))
}

fn pluralize_word(word: &str, lower: &str) -> String {
    let stem = |n: usize| &word[..word.len() - n];

    if lower.ends_with("quiz") {
        format!("{}zes", word)
    } else if lower.ends_with("octopus") || lower.ends_with("virus") {
        format!("{}i", stem(2))
    } else if lower.ends_with("octopi") || lower.ends_with("viri") {
        word.to_string()
    } else if lower.ends_with("alias") || lower.ends_with("status") || lower.ends_with("bus") {
        format!("{}es", word)
    } else if ["x", "ch", "ss", "sh"].iter().any(|s| lower.ends_with(s)) {
        format!("{}es", word)
    } else if lower.ends_with("sis") {
        format!("{}ses", stem(3))
    } else if lower.ends_with("fe") && !lower.ends_with("ffe") {
        format!("{}ves", stem(2))
    } else if (lower.ends_with("lf") || lower.ends_with("rf")) && lower.len() > 2 {
        format!("{}ves", stem(1))
    } else if ends_with_consonant_y(lower) {
        format!("{}ies", stem(1))
    } else if lower.ends_with('s') {
        word.to_string()
    } else {
        format!("{}s", word)
    }
}

fn ends_with_consonant_y(lower: &str) -> bool {
    if !lower.ends_with('y') {
        return false;
    }
    if lower.ends_with("quy") {
        return true;
    }
    match lower.chars().rev().nth(1) {
        Some(c) => !matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y'),
        None => false,
    }
}

/// Turn an attribute name into a message subject: `first_name` → `First name`
pub fn humanize(name: &str) -> String {
    let name = name.strip_suffix("_id").unwrap_or(name);
    let spaced = name.replace('_', " ");
    let spaced = spaced.trim();

    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
