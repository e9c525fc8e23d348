pub mod canonical;
pub mod common;
pub mod qti12;
pub mod qti21;
pub mod qti30;
