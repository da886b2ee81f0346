//! Inline style declaration parsing and serialization.
//!
//! Deliberately small: declarations are `name: value` pairs split on `;`,
//! which covers the inline styles this crate reads and writes. Values are
//! kept verbatim apart from trimming; property names are lowercased.

/// Parse a `style` attribute value into ordered declarations.
pub fn parse_declarations(raw: &str) -> Vec<(String, String)> {
    raw.split(';')
        .filter_map(|decl| {
            let (name, value) = decl.split_once(':')?;
            let name = name.trim();
            let value = value.trim();
            if name.is_empty() || value.is_empty() {
                return None;
            }
            Some((name.to_ascii_lowercase(), value.to_string()))
        })
        .collect()
}

/// Render declarations back into a `style` attribute value.
pub fn serialize_declarations(decls: &[(String, String)]) -> String {
    decls
        .iter()
        .map(|(k, v)| format!("{}: {}", k, v))
        .collect::<Vec<_>>()
        .join("; ")
}
