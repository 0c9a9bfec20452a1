pub mod cart;
pub mod category;
pub mod customization;
pub mod order;
pub mod product;
pub mod topping;

pub use cart::*;
pub use category::*;
pub use customization::*;
pub use order::*;
pub use product::*;
pub use topping::*;
