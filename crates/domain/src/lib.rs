pub mod request;
pub mod setting;
pub mod template;
