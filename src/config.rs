use std::str::FromStr;

use chrono::{FixedOffset, Offset, Utc};

use crate::actors::AssetBucket;
use crate::order_actor::{LifecyclePolicy, DEFAULT_UPSIZE_SURCHARGE, WALK_IN_LABEL};

/// Shop configuration, read from environment variables.
///
/// Unset or unparsable values fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Per-unit upsize surcharge in đồng.
    pub upsize_surcharge: u64,
    /// Table label stored for walk-in customers.
    pub walk_in_label: String,
    /// Request channel capacity of each store actor.
    pub store_buffer_size: usize,
    /// Per-subscriber change-feed capacity.
    pub feed_buffer_size: usize,
    pub asset_base_url: String,
    pub asset_bucket: String,
    pub allow_cancel_while_preparing: bool,
    /// Offset used for dashboard calendar buckets.
    pub shop_utc_offset_hours: i32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            upsize_surcharge: DEFAULT_UPSIZE_SURCHARGE,
            walk_in_label: WALK_IN_LABEL.to_string(),
            store_buffer_size: 32,
            feed_buffer_size: 64,
            asset_base_url: "http://localhost:54321".to_string(),
            asset_bucket: "product-images".to_string(),
            allow_cancel_while_preparing: true,
            shop_utc_offset_hours: 7,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup, so tests need not touch the process env.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            upsize_surcharge: parse_var(&lookup, "UPSIZE_SURCHARGE").unwrap_or(defaults.upsize_surcharge),
            walk_in_label: lookup("WALK_IN_LABEL")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.walk_in_label),
            store_buffer_size: parse_var::<usize>(&lookup, "STORE_BUFFER_SIZE")
                .filter(|&n: &usize| n > 0)
                .unwrap_or(defaults.store_buffer_size),
            feed_buffer_size: parse_var::<usize>(&lookup, "FEED_BUFFER_SIZE")
                .filter(|&n: &usize| n > 0)
                .unwrap_or(defaults.feed_buffer_size),
            asset_base_url: lookup("ASSET_BASE_URL").unwrap_or(defaults.asset_base_url),
            asset_bucket: lookup("ASSET_BUCKET").unwrap_or(defaults.asset_bucket),
            allow_cancel_while_preparing: parse_var(&lookup, "ALLOW_CANCEL_WHILE_PREPARING")
                .unwrap_or(defaults.allow_cancel_while_preparing),
            shop_utc_offset_hours: parse_var::<i32>(&lookup, "SHOP_UTC_OFFSET_HOURS")
                .filter(|h: &i32| (-23..=23).contains(h))
                .unwrap_or(defaults.shop_utc_offset_hours),
        }
    }

    pub fn policy(&self) -> LifecyclePolicy {
        LifecyclePolicy {
            upsize_surcharge: self.upsize_surcharge,
            walk_in_label: self.walk_in_label.clone(),
            allow_cancel_while_preparing: self.allow_cancel_while_preparing,
        }
    }

    pub fn asset_bucket(&self) -> AssetBucket {
        AssetBucket {
            base_url: self.asset_base_url.clone(),
            bucket: self.asset_bucket.clone(),
        }
    }

    /// Falls back to UTC when the configured hours are out of range.
    pub fn utc_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.shop_utc_offset_hours * 3600).unwrap_or_else(|| Utc.fix())
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|value| value.trim().parse().ok())
}
