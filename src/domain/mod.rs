mod customer;
mod order;
mod product;
mod subscription;
mod validation;

pub use customer::*;
pub use order::*;
pub use product::*;
pub use subscription::*;
pub use validation::*;
