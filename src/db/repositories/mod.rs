pub mod article;
pub mod recommendation;
pub mod tag;
