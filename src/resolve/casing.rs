//! Casing conversions between path-form and type-form identifiers

/// Convert an identifier to lower-cased, underscore-separated path form
///
/// `::` separators become `/`, CamelCase words gain underscores at word
/// boundaries (acronym-aware), and dashes become underscores:
/// `Foo::V1::UsersIndex` → `foo/v1/users_index`.
#[must_use]
pub fn underscore(input: &str) -> String {
    let path = input.replace("::", "/");
    let chars: Vec<char> = path.chars().collect();
    let mut out = String::with_capacity(path.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() {
            let boundary = match chars.get(i.wrapping_sub(1)) {
                Some(prev) if prev.is_ascii_lowercase() || prev.is_ascii_digit() => true,
                // Acronym tail: the last capital before a lowercase run starts
                // a new word (HTTPIndex -> http_index)
                Some(prev) if prev.is_ascii_uppercase() => {
                    chars.get(i + 1).is_some_and(char::is_ascii_lowercase)
                }
                _ => false,
            };
            if boundary {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else if c == '-' {
            out.push('_');
        } else {
            out.push(c);
        }
    }

    out
}

/// Convert a path-form identifier to a fully-qualified type name
///
/// Slash-separated segments become `::`-separated namespace segments, each
/// segment camel-cased: `foo/v1/users_index` → `Foo::V1::UsersIndex`.
#[must_use]
pub fn classify(path: &str) -> String {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(camelize)
        .collect::<Vec<_>>()
        .join("::")
}

fn camelize(segment: &str) -> String {
    segment
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_ascii_uppercase().to_string() + chars.as_str()
            })
        })
        .collect()
}
