//! Review submission and listing.

use chrono::Utc;
use common::{BuyerId, ProductId};
use domain::{Rating, Review};
use market_store::MarketStore;

use crate::error::ReviewError;

/// Review engine: at most one review per (buyer, product), writable only
/// once the buyer has a `delivered` order containing the product.
///
/// The write path is a single atomic upsert keyed on (buyer, product), so
/// concurrent duplicate submissions collapse into one row instead of
/// racing a find-then-create.
pub struct ReviewService<S: MarketStore> {
    store: S,
}

impl<S: MarketStore> ReviewService<S> {
    /// Creates a new review service over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Creates the buyer's review for a product, or replaces the existing
    /// one (rating, comment and timestamp).
    #[tracing::instrument(skip(self, comment))]
    pub async fn submit(
        &self,
        buyer: BuyerId,
        product: ProductId,
        rating: u8,
        comment: String,
    ) -> Result<Review, ReviewError> {
        let rating = Rating::new(rating)?;

        let delivered = self
            .store
            .has_delivered_order_containing(buyer, product)
            .await?;
        if !delivered {
            return Err(ReviewError::NotAllowed);
        }

        let review = Review {
            buyer_id: buyer,
            product_id: product,
            rating,
            comment,
            created_at: Utc::now(),
        };
        self.store.upsert_review(review.clone()).await?;

        tracing::info!(%buyer, %product, stars = rating.stars(), "review stored");
        Ok(review)
    }

    /// All reviews for a product, newest first.
    #[tracing::instrument(skip(self))]
    pub async fn for_product(&self, product: ProductId) -> Result<Vec<Review>, ReviewError> {
        Ok(self.store.reviews_for_product(product).await?)
    }
}
