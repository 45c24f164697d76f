pub mod check;
pub mod export;
pub mod import;
pub mod tag_ops;
