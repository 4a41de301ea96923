pub use super::article_tags::Entity as ArticleTags;
pub use super::articles::Entity as Articles;
pub use super::book_recommendations::Entity as BookRecommendations;
pub use super::tags::Entity as Tags;
