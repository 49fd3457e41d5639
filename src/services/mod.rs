pub mod formatter;
pub mod queue;
pub mod results;
pub mod router;
pub mod storage;
pub mod telegram;
