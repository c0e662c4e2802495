//! Product categories and their storage rules.

use serde::Serialize;

/// Shelf life and storage temperature for one product category
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRule {
    pub name: String,
    pub shelf_life_days: u32,
    pub temperature_range: String,  // Display text, e.g. "0-4°C"
}

impl CategoryRule {
    pub fn new(name: impl Into<String>, shelf_life_days: u32, temperature_range: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shelf_life_days,
            temperature_range: temperature_range.into(),
        }
    }
}

/// Built-in kitchen categories: (name, shelf life in days, temperature)
const BUILTIN: &[(&str, u32, &str)] = &[
    ("Мясо", 3, "0-4°C"),
    ("Рыба", 2, "0-2°C"),
    ("Молочные продукты", 5, "2-6°C"),
    ("Овощи", 7, "0-8°C"),
    ("Готовые блюда", 2, "0-4°C"),
    ("Соусы", 10, "2-8°C"),
    ("Десерты", 3, "2-6°C"),
];

/// Ordered, fixed set of category rules
#[derive(Debug, Clone)]
pub struct Catalog {
    rules: Vec<CategoryRule>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Catalog {
    pub fn new(rules: Vec<CategoryRule>) -> Self {
        Self { rules }
    }

    /// The catalog the kitchen ships with
    pub fn builtin() -> Self {
        Self::new(
            BUILTIN
                .iter()
                .map(|(name, days, temp)| CategoryRule::new(*name, *days, *temp))
                .collect(),
        )
    }

    /// Exact-match lookup. Names are compared byte for byte.
    pub fn lookup(&self, name: &str) -> Option<&CategoryRule> {
        self.rules.iter().find(|r| r.name == name)
    }

    /// Index of a category in display order
    pub fn position(&self, name: &str) -> Option<usize> {
        self.rules.iter().position(|r| r.name == name)
    }

    pub fn get(&self, index: usize) -> Option<&CategoryRule> {
        self.rules.get(index)
    }

    pub fn rules(&self) -> impl Iterator<Item = &CategoryRule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
