//! Book recommendation command handler

use crate::api::format_jst;
use crate::config::Config;
use crate::state::SharedState;

pub async fn cmd_recommend(config: &Config) -> anyhow::Result<()> {
    let state = SharedState::new(config.clone()).await?;

    println!("Fetching book recommendations...");
    let cache = state.recommendations.get_recommendations().await?;

    if cache.books.is_empty() {
        println!("No recommendations. Save a few articles first.");
        return Ok(());
    }

    println!(
        "Recommended books (generated {}, expires {})",
        format_jst(cache.generated_at),
        format_jst(cache.expires_at)
    );
    println!("{:-<70}", "");

    for (i, book) in cache.books.iter().enumerate() {
        println!("{}. {} / {}", i + 1, book.title, book.author);
        if let Some(isbn) = &book.isbn {
            println!("   ISBN: {}", isbn);
        }
        if let Some(amazon) = &book.purchase_links.amazon {
            println!("   Amazon:  {}", amazon);
        }
        if let Some(rakuten) = &book.purchase_links.rakuten {
            println!("   Rakuten: {}", rakuten);
        }
    }

    Ok(())
}
