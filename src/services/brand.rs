// src/services/brand.rs

/// Marca e modelo deduzidos de uma descrição livre.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandModel {
    pub brand: String,
    pub model: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct BrandRule {
    keyword: String,
    canonical: String,
}

pub const UNKNOWN_BRAND: &str = "Autre";
pub const UNKNOWN_MODEL: &str = "Non specifie";
const MAX_MODEL_CHARS: usize = 100;

// Ordem importa: a primeira palavra-chave encontrada vence.
const DEFAULT_RULES: &[(&str, &str)] = &[
    ("Lancel", "Lancel"),
    ("Longchamp", "Longchamp"),
    ("Louis Vuitton", "Louis Vuitton"),
    ("LV", "Louis Vuitton"),
    ("Chanel", "Chanel"),
    ("Hermes", "Hermes"),
    ("Burberry", "Burberry"),
    ("Maje", "Maje"),
    ("Gerard Darel", "Gerard Darel"),
    ("See by Chloe", "See by Chloe"),
    ("Celine", "Celine"),
    ("Balenciaga", "Balenciaga"),
    ("Fossil", "Fossil"),
    ("Sezane", "Sezane"),
    ("Brigitte Bardot", "Brigitte Bardot"),
    ("Michael Kors", "Michael Kors"),
    ("Coach", "Coach"),
    ("Guess", "Guess"),
    ("Lancaster", "Lancaster"),
    ("Furla", "Furla"),
];

/// Lista ordenada de palavras-chave de marca, configurável.
#[derive(Debug, Clone)]
pub struct BrandMatcher {
    rules: Vec<BrandRule>,
}

impl Default for BrandMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_RULES.iter().map(|(k, c)| (k.to_string(), c.to_string())))
    }
}

impl BrandMatcher {
    pub fn new(rules: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            rules: rules
                .into_iter()
                .filter(|(keyword, _)| !keyword.trim().is_empty())
                .map(|(keyword, canonical)| BrandRule {
                    keyword: keyword.trim().to_string(),
                    canonical: canonical.trim().to_string(),
                })
                .collect(),
        }
    }

    /// Lê uma lista "Marque" ou "Alias=Marque" separada por vírgulas
    /// (formato de `IMPORT_BRANDS`).
    pub fn from_list(raw: &str) -> Self {
        Self::new(raw.split(',').map(|entry| match entry.split_once('=') {
            Some((keyword, canonical)) => (keyword.to_string(), canonical.to_string()),
            None => (entry.to_string(), entry.to_string()),
        }))
    }

    pub fn extract(&self, description: &str) -> BrandModel {
        let description = description.trim();

        for rule in &self.rules {
            let keyword: Vec<char> = rule.keyword.to_lowercase().chars().collect();
            if let Some((start, end)) = find_ignore_case(description, &keyword) {
                return BrandModel {
                    brand: rule.canonical.clone(),
                    model: model_around(description, start, end),
                };
            }
        }

        BrandModel {
            brand: UNKNOWN_BRAND.to_string(),
            model: description.chars().take(MAX_MODEL_CHARS).collect(),
        }
    }
}

/// Primeira ocorrência de `needle` (já minúscula) em `haystack`, comparando
/// caractere a caractere. Devolve o intervalo em bytes do texto original,
/// sempre em fronteiras de caractere.
fn find_ignore_case(haystack: &str, needle: &[char]) -> Option<(usize, usize)> {
    if needle.is_empty() {
        return None;
    }

    haystack.char_indices().find_map(|(start, _)| {
        let mut pending = needle.iter();
        let mut remaining = needle.len();
        for (offset, c) in haystack[start..].char_indices() {
            for lower in c.to_lowercase() {
                if pending.next() != Some(&lower) {
                    return None;
                }
                remaining -= 1;
            }
            if remaining == 0 {
                return Some((start, start + offset + c.len_utf8()));
            }
        }
        None
    })
}

// Modelo = o que vem depois da marca; se nada vier depois, o que sobra antes.
fn model_around(original: &str, start: usize, end: usize) -> String {
    let after = clean(&original[end..]);
    let model = if after.is_empty() {
        clean(&original[..start])
    } else {
        after
    };

    if model.is_empty() {
        UNKNOWN_MODEL.to_string()
    } else {
        model
    }
}

fn clean(fragment: &str) -> String {
    fragment
        .trim_matches(|c: char| c.is_whitespace() || c == '-')
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
