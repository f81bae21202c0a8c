mod product;
mod replication;

pub use product::*;
pub use replication::*;
