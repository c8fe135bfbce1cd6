pub mod click;
pub mod url;
