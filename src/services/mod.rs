pub mod article_service;
pub use article_service::ArticleService;

pub mod tag_service;
pub use tag_service::TagService;

pub mod generator_service;
pub use generator_service::GeneratorService;

pub mod recommendation_service;
pub use recommendation_service::{EmptyCachePolicy, RecommendationService};

pub mod search;
pub use search::SearchQuery;
