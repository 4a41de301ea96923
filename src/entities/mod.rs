pub mod prelude;

pub mod article_tags;
pub mod articles;
pub mod book_recommendations;
pub mod tags;
