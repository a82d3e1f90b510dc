pub mod health;
pub mod livechess;
