//! Small XML helpers for scheme and property list output

use std::fmt::Write;

const PLIST_HEADER: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!DOCTYPE plist PUBLIC \"-//Apple//DTD PLIST 1.0//EN\" \"http://www.apple.com/DTDs/PropertyList-1.0.dtd\">\n<plist version=\"1.0\">\n";

/// Escapes text for use in attribute values and element content
pub fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlistValue {
    String(String),
    Bool(bool),
}

impl From<&str> for PlistValue {
    fn from(value: &str) -> Self {
        PlistValue::String(value.to_string())
    }
}

impl From<bool> for PlistValue {
    fn from(value: bool) -> Self {
        PlistValue::Bool(value)
    }
}

/// Renders a flat property list dictionary, keeping entry order
pub fn plist_dict(entries: &[(&str, PlistValue)]) -> String {
    let mut plist = String::from(PLIST_HEADER);
    plist.push_str("<dict>\n");
    for (key, value) in entries {
        let _ = writeln!(plist, "\t<key>{}</key>", escape(key));
        match value {
            PlistValue::String(text) => {
                let _ = writeln!(plist, "\t<string>{}</string>", escape(text));
            }
            PlistValue::Bool(true) => plist.push_str("\t<true/>\n"),
            PlistValue::Bool(false) => plist.push_str("\t<false/>\n"),
        }
    }
    plist.push_str("</dict>\n</plist>\n");
    plist
}
