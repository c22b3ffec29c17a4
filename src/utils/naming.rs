//! Naming utilities for table_forge
//!
//! Transforms catalog identifiers into Rust struct and field names.

use inflector::Inflector;

/// Keywords that cannot be used as raw identifiers either
const UNESCAPABLE_KEYWORDS: &[&str] = &["crate", "self", "super", "Self"];

/// Reserved words that need the raw-identifier prefix when a column name
/// collides with them
const RUST_KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "dyn", "else", "enum", "extern",
    "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut",
    "pub", "ref", "return", "static", "struct", "trait", "true", "type", "unsafe", "use",
    "where", "while", "yield",
];

/// Apply a naming convention to a string
pub fn apply_naming_convention(name: &str, convention: &str) -> String {
    match convention {
        "snake_case" => name.to_snake_case(),
        "camel_case" => name.to_camel_case(),
        "pascal_case" => name.to_pascal_case(),
        "screaming_snake_case" => name.to_screaming_snake_case(),
        _ => name.to_string(), // Default: keep as is
    }
}

/// Struct name for a table
pub fn struct_name(table_name: &str, style: &str) -> String {
    apply_naming_convention(table_name, style)
}

/// Field name for a column, escaped when it collides with a Rust keyword
pub fn field_name(column_name: &str, style: &str) -> String {
    let name = apply_naming_convention(column_name, style);

    if UNESCAPABLE_KEYWORDS.contains(&name.as_str()) {
        return format!("{}_", name);
    }
    if RUST_KEYWORDS.contains(&name.as_str()) {
        return format!("r#{}", name);
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("user_profiles", "pascal_case", "UserProfiles")]
    #[case("ORDER_ITEMS", "pascal_case", "OrderItems")]
    #[case("customers", "pascal_case", "Customers")]
    #[case("CustomerId", "snake_case", "customer_id")]
    fn test_apply_naming_convention(
        #[case] input: &str,
        #[case] convention: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(apply_naming_convention(input, convention), expected);
    }

    #[rstest]
    #[case("customer_id", "customer_id")]
    #[case("TYPE", "r#type")]
    #[case("match", "r#match")]
    #[case("self", "self_")]
    fn test_field_name_escaping(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(field_name(input, "snake_case"), expected);
    }
}
