pub mod ai;
pub mod clients;
pub mod conversation;
pub mod dedup;
pub mod locale;
pub mod locks;
pub mod messaging;
pub mod responder;
pub mod sheets;
