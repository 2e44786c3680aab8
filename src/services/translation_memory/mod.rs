pub mod hash;
pub mod matcher;
pub mod model;
pub mod normalize;
pub mod store;

pub use model::TmEntry;
pub use store::TmStore;
