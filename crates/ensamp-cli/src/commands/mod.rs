pub mod dump;
pub mod inspect;
