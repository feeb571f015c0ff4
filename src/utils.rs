pub mod datetime;
pub mod financial;
pub mod net;
pub mod stats;
