pub mod dividend;
pub mod quote;
pub mod returns;
pub mod series;
