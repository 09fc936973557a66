//! Naming variants derived from a project name.
//!
//! Templates address the same name in several casings (a React component
//! wants `MyWidget`, a directory wants `my-widget`). All variants are derived
//! once, up front, from the raw name.

/// Every casing of a name that templates may reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Names {
    /// The name exactly as supplied.
    pub name: String,
    /// kebab-case: `my-widget`.
    pub file_name: String,
    /// PascalCase: `MyWidget`.
    pub class_name: String,
    /// camelCase: `myWidget`.
    pub property_name: String,
    /// SCREAMING_SNAKE_CASE: `MY_WIDGET`.
    pub constant_name: String,
}

impl Names {
    pub fn derive(name: &str) -> Self {
        let class_name = to_pascal_case(name);
        Self {
            name: name.to_string(),
            file_name: to_kebab_case(name),
            property_name: lower_first(&class_name),
            constant_name: to_snake_case(name).to_uppercase(),
            class_name,
        }
    }
}

// ============================================================================
// String Case Conversion Helpers
// ============================================================================

/// | Input | Output |
/// |-------|--------|
/// | "MyApp" | "my_app" |
/// | "my-app" | "my_app" |
/// | "HTTPRequest" | "http_request" |
pub fn to_snake_case(s: &str) -> String {
    split_words(s).join("_")
}

/// Same as `to_snake_case` but joins with `-`.
pub fn to_kebab_case(s: &str) -> String {
    split_words(s).join("-")
}

/// | Input | Output |
/// |-------|--------|
/// | "my-app" | "MyApp" |
/// | "HTTPRequest" | "HttpRequest" |
pub fn to_pascal_case(s: &str) -> String {
    split_words(s)
        .into_iter()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => {
                    let mut out = String::new();
                    out.extend(first.to_uppercase());
                    out.push_str(chars.as_str());
                    out
                }
                None => String::new(),
            }
        })
        .collect()
}

fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Split a string into lowercase words.
///
/// Boundaries:
/// 1. `_`, `-`, `.` and whitespace always split
/// 2. lower → upper transition (`myApp` → `my` + `App`)
/// 3. acronym end (`HTTPServer` → `HTTP` + `Server`)
fn split_words(input: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '_' || c == '-' || c == '.' || c.is_whitespace() {
            if !current.is_empty() {
                words.push(current.to_lowercase());
                current.clear();
            }
            continue;
        }

        if let Some(next) = chars.peek() {
            if (c.is_lowercase() || c.is_ascii_digit()) && next.is_uppercase() {
                current.push(c);
                words.push(current.to_lowercase());
                current.clear();
                continue;
            }

            if c.is_uppercase()
                && next.is_uppercase()
                && chars.clone().nth(1).is_some_and(|n| n.is_lowercase())
            {
                current.push(c);
                words.push(current.to_lowercase());
                current.clear();
                continue;
            }
        }

        current.push(c);
    }

    if !current.is_empty() {
        words.push(current.to_lowercase());
    }

    words
}
