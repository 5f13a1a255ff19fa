pub mod advisory;
pub mod health;
pub mod prices;
pub mod recommendations;
pub mod speech;
