pub mod blog;
pub mod brand;
pub mod category;
pub mod chat;
pub mod product;
pub mod spec;
pub mod user;

pub use blog::Blog;
pub use brand::Brand;
pub use category::{Category, CategoryWithSubcategories, Subcategory};
pub use chat::ChatMessage;
pub use product::{Product, ProductImage, Review};
pub use spec::SpecAttribute;
pub use user::{PublicUser, User, UserRole};
