pub mod crd;

pub use crd::{create_crd_provider, CrdProvider};
