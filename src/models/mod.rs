pub mod bundle;
pub mod draft;
pub mod item;
pub mod metrics;
pub mod user;
