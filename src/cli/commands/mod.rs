mod list;
mod recommend;
mod search;

pub use list::cmd_list_articles;
pub use recommend::cmd_recommend;
pub use search::cmd_search_articles;

use crate::domain::Article;

fn print_article(article: &Article) {
    println!("[{}] {}", article.id, article.title);
    println!("    {}", article.url);
    if !article.tags.is_empty() {
        println!("    tags: {}", article.tags.join(", "));
    }
}
