use serde::{Deserialize, Serialize};

/// A paid add-on from the shop's fixed topping list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topping {
    pub id: u32,
    pub name: String,
    pub price: u64,
    #[serde(rename = "image")]
    pub glyph: String,
}

impl Topping {
    pub fn new(id: u32, name: impl Into<String>, price: u64, glyph: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            glyph: glyph.into(),
        }
    }
}

/// Static topping configuration. Not a managed entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToppingCatalog {
    toppings: Vec<Topping>,
}

impl ToppingCatalog {
    pub fn new(toppings: Vec<Topping>) -> Self {
        Self { toppings }
    }

    pub fn find(&self, id: u32) -> Option<&Topping> {
        self.toppings.iter().find(|topping| topping.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Topping> {
        self.toppings.iter()
    }
}

impl Default for ToppingCatalog {
    fn default() -> Self {
        Self::new(vec![
            Topping::new(18, "Đác rim thốt nốt", 10_000, "🥥"),
            Topping::new(19, "Trân châu trắng", 5_000, "⚪"),
            Topping::new(20, "Trân châu đường đen", 5_000, "⚫"),
        ])
    }
}
