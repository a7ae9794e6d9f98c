//! Naming conventions — case conversion and Spartacus naming rules
//!
//! Class names are PascalCase, file and directory names are kebab-case and
//! component selectors carry a `cx-` (or `app-`) prefix.

const SELECTOR_PREFIXES: [&str; 2] = ["cx-", "app-"];

/// Split an identifier into words.
///
/// Word boundaries are any non-alphanumeric character, a lower-case letter or
/// digit followed by an upper-case letter, and the last capital of an acronym
/// that starts a new capitalised word (`UIButton` → `UI`, `Button`).
pub fn split_words(input: &str) -> Vec<String> {
    let chars: Vec<char> = input.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_ascii_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }

        if c.is_ascii_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
            if prev.is_ascii_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_ascii_uppercase() && next_is_lower)
            {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }

    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// `product rating`, `product-rating`, `productRating` → `ProductRating`
pub fn to_pascal_case(input: &str) -> String {
    split_words(input)
        .iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

/// `ProductRating` → `product-rating`
pub fn to_kebab_case(input: &str) -> String {
    split_words(input)
        .iter()
        .map(|word| word.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}

/// Normalize a selector to kebab-case, keeping a `cx-`/`app-` prefix or adding `cx-`.
pub fn normalize_selector(selector: &str) -> String {
    let trimmed = selector.trim();
    let lowered = trimmed.to_ascii_lowercase();
    for prefix in SELECTOR_PREFIXES {
        if lowered.starts_with(prefix) {
            return format!("{prefix}{}", to_kebab_case(&trimmed[prefix.len()..]));
        }
    }
    format!("cx-{}", to_kebab_case(trimmed))
}

/// Default selector for a component name
pub fn generate_selector(name: &str) -> String {
    format!("cx-{}", to_kebab_case(name))
}

/// Selector without its prefix, used as the root CSS block name
pub fn selector_block(selector: &str) -> &str {
    SELECTOR_PREFIXES
        .iter()
        .find_map(|prefix| selector.strip_prefix(prefix))
        .unwrap_or(selector)
}

/// PascalCase name ending in `suffix` exactly once
pub fn with_suffix(base: &str, suffix: &str) -> String {
    let name = to_pascal_case(base);
    if name.ends_with(suffix) {
        name
    } else {
        format!("{name}{suffix}")
    }
}

pub fn service_name(base: &str) -> String {
    with_suffix(base, "Service")
}

pub fn module_name(base: &str) -> String {
    with_suffix(base, "Module")
}

/// `ProductRating` → `product.rating`
pub fn translation_key(name: &str) -> String {
    to_kebab_case(name).replace('-', ".")
}

/// Whether `name` yields at least one identifier word
pub fn has_words(name: &str) -> bool {
    !split_words(name).is_empty()
}

/// Validate a component name, returning every rule it breaks
pub fn validate_component_name(name: &str) -> Vec<String> {
    let mut errors = Vec::new();
    let trimmed = name.trim();

    if trimmed.is_empty() {
        errors.push("Component name cannot be empty".to_string());
        return errors;
    }
    if trimmed.chars().filter(|c| c.is_ascii_alphanumeric()).count() < 2 {
        errors.push("Component name must be at least 2 characters long".to_string());
    }
    if !trimmed.starts_with(|c: char| c.is_ascii_alphabetic()) {
        errors.push("Component name must start with a letter".to_string());
    }
    if trimmed
        .chars()
        .any(|c| !(c.is_ascii_alphanumeric() || c == ' ' || c == '-' || c == '_'))
    {
        errors.push(
            "Component name may only contain letters, digits, spaces, hyphens and underscores"
                .to_string(),
        );
    }
    if to_pascal_case(trimmed).ends_with("Component") {
        errors.push("Component name should not include the \"Component\" suffix".to_string());
    }
    errors
}

/// Validate an already-normalized selector
pub fn validate_selector(selector: &str) -> Vec<String> {
    let mut errors = Vec::new();

    let Some(body) = SELECTOR_PREFIXES
        .iter()
        .find_map(|prefix| selector.strip_prefix(prefix))
    else {
        errors.push("Selector should start with \"cx-\" or \"app-\"".to_string());
        return errors;
    };

    let well_formed = !body.is_empty()
        && body.split('-').all(|segment| {
            !segment.is_empty()
                && segment
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        });
    if !well_formed {
        errors.push(format!("Selector \"{selector}\" must be kebab-case"));
    }
    errors
}
