// Campaign Discount Resolver
//
// Picks at most one automatic campaign per product and rewrites the product's price.
// Two entry points share the same selection order and arithmetic:
// - `resolve_price` for one product against the campaigns matched for it
// - `resolve_batch` for many products against one snapshot of all live campaigns,
//   indexed by product and category so a catalog page costs one campaign query
//
// Selection order: scope tier first (PRODUCT, then CATEGORY, then GENERAL), then
// discount_percent descending, then discount_amount descending, nulls last.
// Ties keep the order the store returned the campaigns in.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::pricing::types::{Campaign, CampaignScope, Discount, PriceResolution, PricedProduct};

/// Decimal places kept on computed discounts (kuruş)
const MONEY_SCALE: u32 = 2;

/// Price before any campaign: sale price if set, list price otherwise
pub fn baseline(product: &PricedProduct) -> PriceResolution {
    let (final_price, original_price) = match product.sale_price {
        Some(sale_price) => (sale_price, Some(product.price)),
        None => (product.price, None),
    };

    PriceResolution {
        final_price: final_price.max(Decimal::ZERO),
        original_price,
        has_campaign: false,
        campaign_id: None,
        campaign_title: None,
        campaign_discount: None,
    }
}

/// Apply one campaign on top of a resolution
///
/// A campaign without any discount still marks the product as campaigned
/// but leaves the price untouched. A percent discount is rounded to kuruş
/// (2 dp, midpoint away from zero) before it is subtracted.
pub fn apply_campaign(mut resolution: PriceResolution, campaign: &Campaign) -> PriceResolution {
    resolution.has_campaign = true;
    resolution.campaign_id = Some(campaign.id);
    resolution.campaign_title = Some(campaign.title.clone());

    let discount = match campaign.discount() {
        Some(Discount::Percent(percent)) => (resolution.final_price * percent / Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero),
        Some(Discount::Amount(amount)) => amount,
        None => return resolution,
    };

    resolution.original_price = Some(resolution.final_price);
    resolution.final_price = (resolution.final_price - discount).max(Decimal::ZERO);
    resolution.campaign_discount = Some(discount);
    resolution
}

/// Resolve one product against the campaigns fetched for it
pub fn resolve_price(
    product: &PricedProduct,
    campaigns: &[Campaign],
    now: DateTime<Utc>,
) -> PriceResolution {
    let base = baseline(product);

    match select_campaign(product, campaigns, now) {
        Some(campaign) => {
            tracing::debug!(
                product_id = product.id,
                campaign_id = campaign.id,
                "Applying campaign '{}'",
                campaign.title
            );
            apply_campaign(base, campaign)
        }
        None => base,
    }
}

/// Pick the campaign `resolve_price` would apply, if any
///
/// Every candidate is re-checked in memory even when the store already
/// filtered by scope and window.
pub fn select_campaign<'a>(
    product: &PricedProduct,
    campaigns: &'a [Campaign],
    now: DateTime<Utc>,
) -> Option<&'a Campaign> {
    let mut candidates: Vec<&Campaign> = campaigns
        .iter()
        .filter(|campaign| campaign.is_automatic(now) && campaign.applies_to(product))
        .collect();

    candidates.sort_by(|a, b| scope_tier(a).cmp(&scope_tier(b)).then_with(|| discount_order(a, b)));

    candidates.into_iter().next()
}

/// Resolve many products against one snapshot of live campaigns
pub fn resolve_batch(
    products: &[PricedProduct],
    campaigns: &[Campaign],
    now: DateTime<Utc>,
) -> HashMap<i32, PriceResolution> {
    let index = CampaignIndex::build(campaigns, now);

    products
        .iter()
        .map(|product| {
            let base = baseline(product);
            let resolution = match index.select(product) {
                Some(campaign) => apply_campaign(base, campaign),
                None => base,
            };
            (product.id, resolution)
        })
        .collect()
}

/// Lookup tables over automatic campaigns, each list in selection order
#[derive(Debug, Default)]
pub struct CampaignIndex<'a> {
    general: Option<&'a Campaign>,
    by_category: HashMap<i32, Vec<&'a Campaign>>,
    by_product: HashMap<i32, Vec<&'a Campaign>>,
}

impl<'a> CampaignIndex<'a> {
    pub fn build(campaigns: &'a [Campaign], now: DateTime<Utc>) -> Self {
        let mut ordered: Vec<&Campaign> = campaigns
            .iter()
            .filter(|campaign| campaign.is_automatic(now))
            .collect();
        ordered.sort_by(|a, b| discount_order(a, b));

        let mut index = CampaignIndex::default();

        for campaign in ordered {
            match &campaign.scope {
                CampaignScope::General { .. } => {
                    if index.general.is_none() {
                        index.general = Some(campaign);
                    }
                }
                CampaignScope::Category { category_ids, .. } => {
                    for category_id in category_ids {
                        index.by_category.entry(*category_id).or_default().push(campaign);
                    }
                }
                CampaignScope::Product { product_ids, .. } => {
                    for product_id in product_ids {
                        index.by_product.entry(*product_id).or_default().push(campaign);
                    }
                }
                CampaignScope::Package { .. } => {}
            }
        }

        index
    }

    /// PRODUCT beats CATEGORY beats GENERAL
    pub fn select(&self, product: &PricedProduct) -> Option<&'a Campaign> {
        if let Some(campaign) = self.by_product.get(&product.id).and_then(|list| list.first()) {
            return Some(campaign);
        }

        if let Some(campaign) = product
            .category_id
            .and_then(|category_id| self.by_category.get(&category_id))
            .and_then(|list| list.first())
        {
            return Some(campaign);
        }

        self.general
    }
}

fn scope_tier(campaign: &Campaign) -> u8 {
    match campaign.scope {
        CampaignScope::Product { .. } => 0,
        CampaignScope::Category { .. } => 1,
        CampaignScope::General { .. } => 2,
        CampaignScope::Package { .. } => 3,
    }
}

/// discount_percent DESC NULLS LAST, then discount_amount DESC NULLS LAST
fn discount_order(a: &Campaign, b: &Campaign) -> Ordering {
    let a_discount = a.discount();
    let b_discount = b.discount();

    desc_nulls_last(
        a_discount.and_then(|d| d.percent()),
        b_discount.and_then(|d| d.percent()),
    )
    .then_with(|| {
        desc_nulls_last(
            a_discount.and_then(|d| d.amount()),
            b_discount.and_then(|d| d.amount()),
        )
    })
}

fn desc_nulls_last(a: Option<Decimal>, b: Option<Decimal>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
