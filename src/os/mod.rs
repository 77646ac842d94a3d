pub mod permissions;
pub mod root;
