//! `codeward search` — Search the standards corpus.

use std::path::Path;

use codeward_core::SearchHit;

pub async fn run(config: Option<&Path>, query: &str, categories: bool) -> Result<(), Box<dyn std::error::Error>> {
    let engine = super::engine(config)?;

    if categories {
        for category in engine.categories().await? {
            println!("{category}");
        }
        return Ok(());
    }

    let hits = engine.search_standards(query).await?;
    if hits.is_empty() {
        println!("No standards match \"{}\"", query.trim());
        return Ok(());
    }
    print!("{}", render(&hits));
    Ok(())
}

fn render(hits: &[SearchHit]) -> String {
    let mut out = String::new();
    for hit in hits {
        out.push_str(&format!(
            "📄 {} [{}] `{}`, {} match(es)\n",
            hit.name, hit.category, hit.document_id, hit.match_count
        ));
        for excerpt in &hit.excerpts {
            for line in excerpt.lines() {
                out.push_str(&format!("   │ {line}\n"));
            }
            out.push_str("   │\n");
        }
        out.push('\n');
    }
    out
}
