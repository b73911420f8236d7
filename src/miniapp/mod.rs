pub mod form;
pub mod models;
pub mod session;
pub mod shortcuts;
pub mod storage;
