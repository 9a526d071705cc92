//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod category;
pub mod country;
pub mod deal;
pub mod deal_category;
pub mod store;
pub mod store_category;

// Re-export specific types to avoid conflicts
pub use category::{Column as CategoryColumn, Entity as Category, Model as CategoryModel};
pub use country::{Column as CountryColumn, Entity as Country, Model as CountryModel};
pub use deal::{Column as DealColumn, DealType, Entity as Deal, Model as DealModel};
pub use deal_category::{Column as DealCategoryColumn, Entity as DealCategory};
pub use store::{Column as StoreColumn, Entity as Store, Model as StoreModel};
pub use store_category::{Column as StoreCategoryColumn, Entity as StoreCategory};
