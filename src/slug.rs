//! Category slug derivation.

/// Stateless name → slug function.
///
/// Built once at startup and handed to the category service; holds no
/// configuration, so copies are free.
#[derive(Debug, Clone, Copy, Default)]
pub struct Slugifier;

impl Slugifier {
    pub fn new() -> Self {
        Self
    }

    /// Lowercase, ASCII-folded, with every run of whitespace or punctuation
    /// collapsed to a single hyphen and no leading or trailing hyphen.
    pub fn slugify(&self, name: &str) -> String {
        ::slug::slugify(name)
    }
}
