pub mod redirect;
pub mod shorturl;
