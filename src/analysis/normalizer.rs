use crate::core::config::TextNormalizerSetup;

/// Bounds the fixed-point loop over string replacements so a pathological
/// replacement table (e.g. one mapping "a" to "aa") cannot spin forever.
const MAX_REPLACEMENT_PASSES: usize = 8;

/// Deterministic, idempotent text normalizer: case folding, then repeated
/// string substitution to a fixed point, then a single char-substitution
/// pass.
pub struct TextNormalizer {
    setup: TextNormalizerSetup,
}

impl TextNormalizer {
    pub fn new(setup: TextNormalizerSetup) -> Self {
        TextNormalizer { setup }
    }

    pub fn normalize(&self, text: &str) -> String {
        let mut out = if self.setup.case_sensitive {
            text.to_string()
        } else {
            text.to_lowercase()
        };

        for _ in 0..MAX_REPLACEMENT_PASSES {
            let mut changed = false;
            for (from, to) in &self.setup.string_replacements {
                if from.is_empty() {
                    continue;
                }
                if out.contains(from.as_str()) {
                    out = out.replace(from.as_str(), to);
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }

        if self.setup.char_replacements.is_empty() {
            return out;
        }

        out.chars()
            .map(|c| *self.setup.char_replacements.get(&c).unwrap_or(&c))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_by_default() {
        let normalizer = TextNormalizer::new(TextNormalizerSetup::default());
        assert_eq!(normalizer.normalize("Fantasy Novel"), "fantasy novel");
    }

    #[test]
    fn is_idempotent() {
        let mut setup = TextNormalizerSetup::default();
        setup.string_replacements.push(("colour".into(), "color".into()));
        let normalizer = TextNormalizer::new(setup);
        let once = normalizer.normalize("Colour Colour");
        let twice = normalizer.normalize(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn respects_case_sensitive_flag() {
        let mut setup = TextNormalizerSetup::default();
        setup.case_sensitive = true;
        let normalizer = TextNormalizer::new(setup);
        assert_eq!(normalizer.normalize("Fantasy"), "Fantasy");
    }
}
