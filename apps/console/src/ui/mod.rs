pub mod charts;
pub mod notifications;
pub mod search;
pub mod summary;
