pub mod repository;
pub mod view;

pub use repository::CartRepository;
pub use view::{CartLine, CartView};
