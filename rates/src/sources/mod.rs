pub mod fixed;

pub use fixed::FixedSource;
