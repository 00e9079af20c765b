pub mod microwave_oven_mode;

pub use microwave_oven_mode as mwom;
