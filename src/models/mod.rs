pub mod ingredient;
pub mod recipe;
pub mod tag;
pub mod user;

pub use ingredient::Ingredient;
pub use recipe::{Recipe, RecipeIngredient};
pub use tag::Tag;
pub use user::User;
