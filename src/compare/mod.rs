pub mod compositor;
pub mod layout;
