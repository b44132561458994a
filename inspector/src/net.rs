pub mod buffer;
pub mod dump;
pub mod flow;
pub mod interface;
pub mod sender;
pub mod source;
pub mod storage;
