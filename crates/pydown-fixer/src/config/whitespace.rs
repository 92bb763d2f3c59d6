//! Indentation and line terminator settings shared by the unparser and
//! the layout fixers

use serde::Deserialize;

/// One level of indentation: a number of spaces or a tab
///
/// Written in configuration files as a width (`indent = 4`) or as
/// `indent = "tab"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "IndentValue")]
pub enum IndentStyle {
    Spaces(usize),
    Tabs,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IndentValue {
    Width(usize),
    Name(String),
}

impl TryFrom<IndentValue> for IndentStyle {
    type Error = String;

    fn try_from(value: IndentValue) -> Result<Self, Self::Error> {
        match value {
            IndentValue::Width(0) => Err("indent width must be at least 1".to_string()),
            IndentValue::Width(n) => Ok(IndentStyle::Spaces(n)),
            IndentValue::Name(name) if name == "tab" || name == "tabs" => Ok(IndentStyle::Tabs),
            IndentValue::Name(name) => Err(format!("unknown indent style '{}'", name)),
        }
    }
}

impl Default for IndentStyle {
    fn default() -> Self {
        IndentStyle::Spaces(4)
    }
}

impl IndentStyle {
    /// Text of one indentation level
    pub fn unit(&self) -> String {
        match self {
            IndentStyle::Spaces(n) => " ".repeat(*n),
            IndentStyle::Tabs => "\t".to_string(),
        }
    }
}

/// Line terminator written by the formatter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

/// Indentation plus line terminator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WhitespaceConfig {
    pub indent: IndentStyle,
    pub line_ending: LineEnding,
}

impl WhitespaceConfig {
    pub fn new(indent: IndentStyle, line_ending: LineEnding) -> Self {
        Self { indent, line_ending }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indent_unit() {
        assert_eq!(IndentStyle::Spaces(4).unit(), "    ");
        assert_eq!(IndentStyle::Spaces(2).unit(), "  ");
        assert_eq!(IndentStyle::Spaces(3).unit(), "   ");
        assert_eq!(IndentStyle::Tabs.unit(), "\t");
    }

    #[test]
    fn test_deserialize_width_and_tabs() {
        let config: WhitespaceConfig = toml::from_str("indent = 2\nline_ending = \"crlf\"").unwrap();
        assert_eq!(config.indent, IndentStyle::Spaces(2));
        assert_eq!(config.line_ending, LineEnding::CrLf);

        let config: WhitespaceConfig = toml::from_str("indent = \"tab\"").unwrap();
        assert_eq!(config.indent, IndentStyle::Tabs);
        assert_eq!(config.line_ending, LineEnding::Lf);
    }

    #[test]
    fn test_deserialize_rejects_bad_indent() {
        assert!(toml::from_str::<WhitespaceConfig>("indent = 0").is_err());
        assert!(toml::from_str::<WhitespaceConfig>("indent = \"wide\"").is_err());
    }

    #[test]
    fn test_line_ending_as_str() {
        assert_eq!(LineEnding::Lf.as_str(), "\n");
        assert_eq!(LineEnding::CrLf.as_str(), "\r\n");
    }
}
