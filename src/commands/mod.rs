pub mod serve;

pub use serve::{build_adapters, handle_serve};
