//! Seller partitioning and order materialization.
//!
//! Both steps are pure: they run between the cart snapshot read and the
//! atomic commit, and every price they touch is the snapshotted one.

use domain::{CartSnapshotLine, Money, SellerRef};
use market_store::{OrderDraft, OrderLineDraft};

/// The subset of one checkout's cart lines belonging to a single owning
/// seller (or the platform).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SellerPartition {
    pub seller: SellerRef,
    pub lines: Vec<CartSnapshotLine>,
}

/// Groups cart lines by owning seller.
///
/// Partition order is the insertion order of each seller's first line, so
/// the result is deterministic for a given cart. Products without an owning
/// seller all land in the single `SellerRef::Platform` partition.
pub fn partition_by_seller(lines: Vec<CartSnapshotLine>) -> Vec<SellerPartition> {
    let mut partitions: Vec<SellerPartition> = Vec::new();
    for line in lines {
        match partitions.iter_mut().find(|p| p.seller == line.seller) {
            Some(partition) => partition.lines.push(line),
            None => partitions.push(SellerPartition {
                seller: line.seller,
                lines: vec![line],
            }),
        }
    }
    partitions
}

/// Turns each partition into an order draft.
///
/// The total is Σ(snapshotted unit price × quantity) over the partition,
/// and each line's `price_at_purchase` is that same snapshotted price, so
/// an order total always equals the sum of its own lines, no matter what
/// the catalog does meanwhile.
pub fn materialize(partitions: Vec<SellerPartition>) -> Vec<OrderDraft> {
    partitions
        .into_iter()
        .map(|partition| {
            let total: Money = partition.lines.iter().map(CartSnapshotLine::line_total).sum();
            let lines = partition
                .lines
                .into_iter()
                .map(|line| OrderLineDraft {
                    product_id: line.product_id,
                    product_name: line.product_name,
                    quantity: line.quantity,
                    price_at_purchase: line.unit_price,
                })
                .collect();
            OrderDraft {
                seller: partition.seller,
                total,
                lines,
            }
        })
        .collect()
}
