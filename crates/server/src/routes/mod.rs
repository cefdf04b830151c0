pub mod charges;
pub mod health;
pub mod webhooks;
