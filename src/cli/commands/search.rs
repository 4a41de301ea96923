//! Search articles command handler

use super::print_article;
use crate::config::Config;
use crate::state::SharedState;

pub async fn cmd_search_articles(config: &Config, keyword: &str) -> anyhow::Result<()> {
    let state = SharedState::new(config.clone()).await?;
    let articles = state.articles.search(keyword).await?;

    if articles.is_empty() {
        println!("No articles match '{}'", keyword);
        return Ok(());
    }

    println!("Found {} article(s) for '{}'", articles.len(), keyword);
    println!("{:-<70}", "");

    for article in &articles {
        print_article(article);
    }

    Ok(())
}
