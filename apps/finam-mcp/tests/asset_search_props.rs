//! Asset Search Property Tests
//!
//! Ordering and windowing laws of `AssetQuery::apply`.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use finam_mcp::AssetQuery;
use finam_mcp::application::dto::AssetInfo;
use proptest::prelude::*;

fn asset(id: String, ticker: String) -> AssetInfo {
    AssetInfo {
        symbol: format!("{ticker}@MISX"),
        id,
        ticker,
        mic: "MISX".to_string(),
        isin: String::new(),
        asset_type: "EQUITIES".to_string(),
        name: String::new(),
    }
}

fn listing() -> impl Strategy<Value = Vec<AssetInfo>> {
    prop::collection::hash_set("[0-9]{1,4}", 0..60).prop_flat_map(|ids| {
        let ids: Vec<String> = ids.into_iter().collect();
        let n = ids.len();
        (
            Just(ids),
            prop::collection::vec("[A-C]{1,3}", n..=n),
        )
            .prop_map(|(ids, tickers)| {
                ids.into_iter()
                    .zip(tickers)
                    .map(|(id, ticker)| asset(id, ticker))
                    .collect()
            })
    })
}

proptest! {
    #[test]
    fn result_is_sorted_by_id(assets in listing(), limit in 0usize..80, offset in 0usize..80) {
        let page = AssetQuery::default().with_window(limit, offset).apply(assets);
        prop_assert!(page.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[test]
    fn window_never_exceeds_limit(assets in listing(), limit in 0usize..80, offset in 0usize..80) {
        let total = assets.len();
        let page = AssetQuery::default().with_window(limit, offset).apply(assets);
        prop_assert_eq!(page.len(), limit.min(total.saturating_sub(offset)));
    }

    #[test]
    fn consecutive_pages_tile_the_result(assets in listing(), limit in 1usize..20) {
        let whole = AssetQuery::default().with_window(usize::MAX, 0).apply(assets.clone());

        let mut stitched = Vec::new();
        let mut offset = 0;
        while offset < whole.len() {
            let page = AssetQuery::default().with_window(limit, offset).apply(assets.clone());
            stitched.extend(page);
            offset += limit;
        }

        prop_assert_eq!(stitched, whole);
    }

    #[test]
    fn every_result_matches_the_filter(assets in listing(), needle in "[a-c]{1,2}") {
        let query = AssetQuery::default().with_ticker(needle.clone()).with_window(usize::MAX, 0);
        let page = query.apply(assets.clone());

        let expected = assets
            .iter()
            .filter(|a| a.ticker.to_lowercase().contains(&needle))
            .count();
        prop_assert_eq!(page.len(), expected);
        prop_assert!(page.iter().all(|a| query.matches(a)));
    }
}
