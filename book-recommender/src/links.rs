use crate::model::{RecommendationBatch, RetailerLinks};

const AMAZON_SEARCH: &str = "https://www.amazon.co.jp/s?k=";
const RAKUTEN_SEARCH: &str = "https://books.rakuten.co.jp/search?sitem=";
const KINOKUNIYA_SEARCH: &str = "https://www.kinokuniya.co.jp/disp/CSfDispListPage_001.jsp?qs=";

/// Bookstore search links for a title/author pair. Pure and deterministic.
pub fn retailer_links(title: &str, author: &str) -> RetailerLinks {
    let query = format!(
        "{}+{}",
        urlencoding::encode(title),
        urlencoding::encode(author)
    );

    RetailerLinks {
        amazon: format!("{AMAZON_SEARCH}{query}"),
        rakuten: format!("{RAKUTEN_SEARCH}{query}"),
        kinokuniya: format!("{KINOKUNIYA_SEARCH}{query}"),
    }
}

/// Attach purchase links to every recommendation, replacing any already present.
pub fn enrich(batch: &mut RecommendationBatch) {
    for rec in batch.iter_mut() {
        rec.purchase_links = Some(retailer_links(&rec.title, &rec.author));
    }
}
