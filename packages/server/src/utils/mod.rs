pub mod hash;
pub mod jwt;
pub mod list;
pub mod lookup;
