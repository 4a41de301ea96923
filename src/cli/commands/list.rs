//! List articles command handler

use super::print_article;
use crate::config::Config;
use crate::state::SharedState;

pub async fn cmd_list_articles(config: &Config) -> anyhow::Result<()> {
    let state = SharedState::new(config.clone()).await?;
    let articles = state.articles.list().await?;

    if articles.is_empty() {
        println!("No articles saved yet.");
        println!();
        println!("Save one through the API: POST /api/articles");
        return Ok(());
    }

    println!("Articles ({} total)", articles.len());
    println!("{:-<70}", "");

    for article in &articles {
        print_article(article);
    }

    Ok(())
}
