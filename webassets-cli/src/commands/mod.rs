pub mod extract;
pub mod sync;
