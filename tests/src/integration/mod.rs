pub mod atomicity;
pub mod convergence;
pub mod flows;
