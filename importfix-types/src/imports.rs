use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Half-open byte range into a source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..self.end]
    }
}

/// Quote character used around a module specifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStyle {
    Single,
    #[default]
    Double,
}

impl QuoteStyle {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '\'' => Some(QuoteStyle::Single),
            '"' => Some(QuoteStyle::Double),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            QuoteStyle::Single => '\'',
            QuoteStyle::Double => '"',
        }
    }
}

/// How a rendered import declaration is punctuated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderStyle {
    pub quote: QuoteStyle,
    pub semicolon: bool,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            quote: QuoteStyle::Double,
            semicolon: true,
        }
    }
}

/// One recognized `import <clause> from '<specifier>'` declaration.
///
/// `span` covers the declaration from the `import` keyword through the
/// terminator (or the closing quote when there is none).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRecord {
    pub specifier: String,
    pub span: Span,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_binding: Option<String>,

    /// Named bindings in source order. Aliased items keep their `a as b` text.
    #[serde(default)]
    pub named: Vec<String>,

    pub quote: QuoteStyle,
    pub semicolon: bool,
}

impl ImportRecord {
    pub fn style(&self) -> RenderStyle {
        RenderStyle {
            quote: self.quote,
            semicolon: self.semicolon,
        }
    }

    /// True when the named list is already sorted and free of duplicates.
    pub fn named_is_canonical(&self) -> bool {
        self.named.windows(2).all(|w| w[0] < w[1])
    }
}

/// Whether a symbol is imported as the module's default or by name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingKind {
    #[default]
    Named,
    Default,
}

/// A vocabulary symbol found in code.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DetectedSymbol {
    pub module: String,
    pub name: String,
    pub binding: BindingKind,
}

/// Symbols used by one file. Ordered, so iteration is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageSet {
    symbols: BTreeSet<DetectedSymbol>,
}

impl UsageSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, symbol: DetectedSymbol) -> bool {
        self.symbols.insert(symbol)
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DetectedSymbol> {
        self.symbols.iter()
    }

    pub fn for_module<'a>(&'a self, module: &'a str) -> impl Iterator<Item = &'a DetectedSymbol> {
        self.symbols.iter().filter(move |s| s.module == module)
    }
}

impl FromIterator<DetectedSymbol> for UsageSet {
    fn from_iter<I: IntoIterator<Item = DetectedSymbol>>(iter: I) -> Self {
        Self {
            symbols: iter.into_iter().collect(),
        }
    }
}

/// The single import declaration a run computes for one module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalImport {
    pub specifier: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_binding: Option<String>,

    #[serde(default)]
    pub named: BTreeSet<String>,
}

impl CanonicalImport {
    /// `Default, { a, b }`, `Default`, or `{ a, b }`. `None` when nothing is bound.
    pub fn clause(&self) -> Option<String> {
        let named = if self.named.is_empty() {
            None
        } else {
            let items: Vec<&str> = self.named.iter().map(String::as_str).collect();
            Some(format!("{{ {} }}", items.join(", ")))
        };

        match (&self.default_binding, named) {
            (Some(d), Some(n)) => Some(format!("{d}, {n}")),
            (Some(d), None) => Some(d.clone()),
            (None, Some(n)) => Some(n),
            (None, None) => None,
        }
    }

    /// Does this import bind `name`, either as default or by name?
    pub fn binds(&self, name: &str) -> bool {
        self.default_binding.as_deref() == Some(name) || self.named.contains(name)
    }

    /// Same bindings as `record`, in the same (sorted) order.
    pub fn matches_record(&self, record: &ImportRecord) -> bool {
        record.default_binding == self.default_binding
            && record.named_is_canonical()
            && record.named.len() == self.named.len()
            && record.named.iter().zip(self.named.iter()).all(|(a, b)| a == b)
    }
}
