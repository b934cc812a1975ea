pub mod envelope;
pub mod ride;
pub mod vehicle;

mod wire;
