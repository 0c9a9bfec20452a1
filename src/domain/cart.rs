use thiserror::Error;

use super::{IceLevel, Product, SugarLevel, Topping};

/// Errors raised while editing a cart.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CartError {
    #[error("Product is not available: {0}")]
    ProductInactive(String),
    #[error("Cart line not found: {0}")]
    LineNotFound(u64),
    #[error("Topping {topping_id} is not on cart line {line_id}")]
    ToppingNotFound { line_id: u64, topping_id: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartTopping {
    pub topping: Topping,
    pub quantity: u32,
}

/// One product selection with its customizations. Never persisted on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub line_id: u64,
    pub product: Product,
    pub quantity: u32,
    pub toppings: Vec<CartTopping>,
    pub note: String,
    pub is_upsize: bool,
    pub sugar_level: SugarLevel,
    pub ice_level: IceLevel,
}

impl CartLine {
    /// `price·q + (upsize ? surcharge·q : 0) + Σ topping.price·topping.q`
    ///
    /// Toppings are charged once per line, not once per unit. `None` on overflow.
    pub fn total(&self, upsize_surcharge: u64) -> Option<u64> {
        let quantity = u64::from(self.quantity);
        let surcharge = if self.is_upsize { upsize_surcharge } else { 0 };
        let mut total = self.product.price.checked_add(surcharge)?.checked_mul(quantity)?;
        for t in &self.toppings {
            total = total.checked_add(t.topping.price.checked_mul(u64::from(t.quantity))?)?;
        }
        Some(total)
    }
}

/// Client-side order being assembled at the counter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<CartLine>,
    next_line_id: u64,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Adds a fresh line with default customizations and returns its id.
    ///
    /// Adding the same product twice yields two independent lines.
    pub fn add_product(&mut self, product: &Product) -> Result<u64, CartError> {
        if !product.is_active {
            return Err(CartError::ProductInactive(product.name.clone()));
        }
        self.next_line_id += 1;
        let line_id = self.next_line_id;
        self.lines.push(CartLine {
            line_id,
            product: product.clone(),
            quantity: 1,
            toppings: Vec::new(),
            note: String::new(),
            is_upsize: false,
            sugar_level: SugarLevel::default(),
            ice_level: IceLevel::default(),
        });
        Ok(line_id)
    }

    /// Sets a line's quantity; zero removes the line.
    pub fn set_quantity(&mut self, line_id: u64, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return self.remove_line(line_id);
        }
        self.line_mut(line_id)?.quantity = quantity;
        Ok(())
    }

    pub fn set_note(&mut self, line_id: u64, note: impl Into<String>) -> Result<(), CartError> {
        self.line_mut(line_id)?.note = note.into();
        Ok(())
    }

    pub fn set_upsize(&mut self, line_id: u64, is_upsize: bool) -> Result<(), CartError> {
        self.line_mut(line_id)?.is_upsize = is_upsize;
        Ok(())
    }

    pub fn set_sugar_level(&mut self, line_id: u64, level: SugarLevel) -> Result<(), CartError> {
        self.line_mut(line_id)?.sugar_level = level;
        Ok(())
    }

    pub fn set_ice_level(&mut self, line_id: u64, level: IceLevel) -> Result<(), CartError> {
        self.line_mut(line_id)?.ice_level = level;
        Ok(())
    }

    /// Adds one unit of a topping, merging with an existing entry.
    pub fn add_topping(&mut self, line_id: u64, topping: &Topping) -> Result<(), CartError> {
        let line = self.line_mut(line_id)?;
        match line.toppings.iter_mut().find(|t| t.topping.id == topping.id) {
            Some(existing) => existing.quantity += 1,
            None => line.toppings.push(CartTopping {
                topping: topping.clone(),
                quantity: 1,
            }),
        }
        Ok(())
    }

    /// Sets the quantity of a topping already on the line; zero removes it.
    /// Use [`Cart::add_topping`] to put a new topping on a line.
    pub fn set_topping_quantity(
        &mut self,
        line_id: u64,
        topping_id: u32,
        quantity: u32,
    ) -> Result<(), CartError> {
        let line = self.line_mut(line_id)?;
        let Some(index) = line.toppings.iter().position(|t| t.topping.id == topping_id) else {
            return Err(CartError::ToppingNotFound { line_id, topping_id });
        };
        if quantity == 0 {
            line.toppings.remove(index);
        } else {
            line.toppings[index].quantity = quantity;
        }
        Ok(())
    }

    pub fn remove_line(&mut self, line_id: u64) -> Result<(), CartError> {
        let before = self.lines.len();
        self.lines.retain(|line| line.line_id != line_id);
        if self.lines.len() == before {
            return Err(CartError::LineNotFound(line_id));
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Sum of all line totals; `None` if any step overflows.
    pub fn total(&self, upsize_surcharge: u64) -> Option<u64> {
        self.lines
            .iter()
            .try_fold(0u64, |sum, line| sum.checked_add(line.total(upsize_surcharge)?))
    }

    fn line_mut(&mut self, line_id: u64) -> Result<&mut CartLine, CartError> {
        self.lines
            .iter_mut()
            .find(|line| line.line_id == line_id)
            .ok_or(CartError::LineNotFound(line_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ToppingCatalog;
    use chrono::Utc;

    fn product(price: u64, is_active: bool) -> Product {
        Product {
            id: "p1".to_string(),
            name: "Trà sữa".to_string(),
            price,
            image: "🧋".to_string(),
            category_id: "c1".to_string(),
            is_active,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn inactive_products_cannot_be_added() {
        let mut cart = Cart::new();
        assert_eq!(
            cart.add_product(&product(20_000, false)),
            Err(CartError::ProductInactive("Trà sữa".to_string()))
        );
        assert!(cart.is_empty());
    }

    #[test]
    fn new_line_has_defaults() {
        let mut cart = Cart::new();
        let id = cart.add_product(&product(20_000, true)).unwrap();
        let line = &cart.lines()[0];
        assert_eq!(line.line_id, id);
        assert_eq!(line.quantity, 1);
        assert_eq!(line.sugar_level, SugarLevel::NormalSugar);
        assert_eq!(line.ice_level, IceLevel::NormalIce);
        assert!(!line.is_upsize);
    }

    #[test]
    fn zero_quantity_removes_line() {
        let mut cart = Cart::new();
        let first = cart.add_product(&product(20_000, true)).unwrap();
        let second = cart.add_product(&product(20_000, true)).unwrap();
        cart.set_quantity(first, 0).unwrap();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.lines()[0].line_id, second);
        assert_eq!(cart.set_quantity(first, 2), Err(CartError::LineNotFound(first)));
    }

    #[test]
    fn toppings_merge_and_drop_at_zero() {
        let catalog = ToppingCatalog::default();
        let pearls = catalog.find(19).unwrap();
        let mut cart = Cart::new();
        let id = cart.add_product(&product(15_000, true)).unwrap();

        cart.add_topping(id, pearls).unwrap();
        cart.add_topping(id, pearls).unwrap();
        assert_eq!(cart.lines()[0].toppings.len(), 1);
        assert_eq!(cart.lines()[0].toppings[0].quantity, 2);

        cart.set_topping_quantity(id, 19, 0).unwrap();
        assert!(cart.lines()[0].toppings.is_empty());
    }

    #[test]
    fn topping_quantity_requires_existing_topping() {
        let mut cart = Cart::new();
        let id = cart.add_product(&product(15_000, true)).unwrap();

        assert_eq!(
            cart.set_topping_quantity(id, 19, 2),
            Err(CartError::ToppingNotFound { line_id: id, topping_id: 19 })
        );
        assert_eq!(
            cart.set_topping_quantity(id, 19, 0),
            Err(CartError::ToppingNotFound { line_id: id, topping_id: 19 })
        );
        assert!(cart.lines()[0].toppings.is_empty());

        let pearls = ToppingCatalog::default().find(19).cloned().unwrap();
        cart.add_topping(id, &pearls).unwrap();
        cart.set_topping_quantity(id, 19, 2).unwrap();
        assert_eq!(cart.lines()[0].toppings[0].quantity, 2);
    }

    #[test]
    fn overflowing_total_is_none() {
        let mut cart = Cart::new();
        let id = cart.add_product(&product(u64::MAX / 2, true)).unwrap();
        assert_eq!(cart.total(0), Some(u64::MAX / 2));
        cart.set_quantity(id, 3).unwrap();
        assert_eq!(cart.total(0), None);
    }

    #[test]
    fn line_total_charges_upsize_per_unit() {
        let catalog = ToppingCatalog::default();
        let mut cart = Cart::new();
        let id = cart.add_product(&product(15_000, true)).unwrap();
        cart.set_quantity(id, 2).unwrap();
        cart.set_upsize(id, true).unwrap();
        cart.add_topping(id, catalog.find(18).unwrap()).unwrap();

        // 15000*2 + 10000*2 + 10000*1
        assert_eq!(cart.total(10_000), Some(60_000));
    }
}
