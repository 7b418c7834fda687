//! Singular/plural inflection.

/// Converts words between singular and plural.
///
/// Inputs are lower-cased identifiers, possibly containing `_`.
pub trait Inflector {
    fn to_plural(&self, word: &str) -> String;
    fn to_singular(&self, word: &str) -> String;
}

/// Pairs whose plural does not follow the suffix rules, or whose
/// singular cannot be recovered from them.
const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("child", "children"),
    ("man", "men"),
    ("woman", "women"),
    ("mouse", "mice"),
    ("goose", "geese"),
    ("foot", "feet"),
    ("tooth", "teeth"),
    ("ox", "oxen"),
    ("leaf", "leaves"),
    ("knife", "knives"),
    ("wife", "wives"),
    ("life", "lives"),
    ("house", "houses"),
    ("cache", "caches"),
    ("move", "moves"),
    ("quiz", "quizzes"),
    ("index", "indices"),
    ("matrix", "matrices"),
    ("vertex", "vertices"),
    ("criterion", "criteria"),
];

const UNCOUNTABLE: &[&str] = &[
    "data",
    "deer",
    "equipment",
    "fish",
    "information",
    "metadata",
    "money",
    "news",
    "rice",
    "series",
    "sheep",
    "species",
];

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}

/// Split `word` into a prefix and the last `_`-separated segment.
///
/// Only the last segment of a compound identifier is inflected.
fn split_tail(word: &str) -> (&str, &str) {
    match word.rfind('_') {
        Some(idx) if idx + 1 < word.len() => word.split_at(idx + 1),
        _ => ("", word),
    }
}

fn ends_with_consonant_y(word: &str) -> bool {
    let mut chars = word.chars().rev();
    matches!((chars.next(), chars.next()), (Some('y'), Some(c)) if !is_vowel(c))
}

/// Default English inflection rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishInflector;

impl EnglishInflector {
    fn plural_word(word: &str) -> String {
        if UNCOUNTABLE.contains(&word) || IRREGULAR.iter().any(|(_, p)| *p == word) {
            return word.to_string();
        }
        if let Some((_, plural)) = IRREGULAR.iter().find(|(s, _)| *s == word) {
            return plural.to_string();
        }

        if let Some(stem) = word.strip_suffix("is") {
            return format!("{stem}es");
        }
        if word.ends_with("us")
            || word.ends_with("ss")
            || word.ends_with('x')
            || word.ends_with('z')
            || word.ends_with("ch")
            || word.ends_with("sh")
        {
            return format!("{word}es");
        }
        if word.ends_with('s') {
            return word.to_string();
        }
        if ends_with_consonant_y(word) {
            return format!("{}ies", &word[..word.len() - 1]);
        }
        if let Some(stem) = word.strip_suffix("lf") {
            return format!("{stem}lves");
        }
        format!("{word}s")
    }

    fn singular_word(word: &str) -> String {
        if UNCOUNTABLE.contains(&word) || IRREGULAR.iter().any(|(s, _)| *s == word) {
            return word.to_string();
        }
        if let Some((singular, _)) = IRREGULAR.iter().find(|(_, p)| *p == word) {
            return singular.to_string();
        }

        if word.len() > 3 {
            if let Some(stem) = word.strip_suffix("ies") {
                return format!("{stem}y");
            }
        }
        if let Some(stem) = word.strip_suffix("lves") {
            return format!("{stem}lf");
        }
        if let Some(stem) = word.strip_suffix("yses") {
            return format!("{stem}ysis");
        }
        for suffix in ["sses", "uses", "xes", "zes", "ches", "shes"] {
            if word.ends_with(suffix) {
                return word[..word.len() - 2].to_string();
            }
        }
        if word.ends_with('s') && !word.ends_with("ss") && !word.ends_with("us") && !word.ends_with("is")
        {
            return word[..word.len() - 1].to_string();
        }
        word.to_string()
    }
}

impl Inflector for EnglishInflector {
    fn to_plural(&self, word: &str) -> String {
        let (prefix, tail) = split_tail(word);
        format!("{prefix}{}", Self::plural_word(tail))
    }

    fn to_singular(&self, word: &str) -> String {
        let (prefix, tail) = split_tail(word);
        format!("{prefix}{}", Self::singular_word(tail))
    }
}

/// Historical naive inflection, kept so older dumps regenerate unchanged.
///
/// Plural appends `s` unless the word already ends in one; singular strips
/// a single trailing `s`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyInflector;

impl Inflector for LegacyInflector {
    fn to_plural(&self, word: &str) -> String {
        if word.ends_with('s') {
            word.to_string()
        } else {
            format!("{word}s")
        }
    }

    fn to_singular(&self, word: &str) -> String {
        match word.strip_suffix('s') {
            Some(stem) if !stem.is_empty() && !stem.ends_with('s') => stem.to_string(),
            _ => word.to_string(),
        }
    }
}
