mod support;

use std::sync::Arc;

use anyhow::Result;
use aptfolio::models::{AssetId, Portfolio, PositionKind};
use aptfolio::protocols::{Protocol, ProtocolRegistry, StaticPositionFetcher};
use rust_decimal::Decimal;
use serde_json::json;
use support::{
    aggregator, balances, d, fixed_now, standard_prices, FailingBalanceSource, FailingFetcher,
    MockPriceSource, RecordingFetcher, APT_COIN, USDC,
};

fn echelon_payload() -> serde_json::Value {
    json!({
        "data": {
            "0xa": {"supply": "300000000", "market": "0xm1"},
            (USDC): {"borrow": "5000000", "market": "0xm2"}
        }
    })
}

fn static_fetcher(payload: serde_json::Value) -> Arc<StaticPositionFetcher> {
    Arc::new(StaticPositionFetcher::new(payload))
}

fn protocol_keys(portfolio: &Portfolio) -> Vec<&str> {
    portfolio
        .protocols
        .iter()
        .map(|p| p.protocol_key.as_str())
        .collect()
}

#[tokio::test]
async fn supply_minus_borrow_and_totals_add_up() -> Result<()> {
    let prices = Arc::new(MockPriceSource::new(standard_prices()));
    let service = aggregator(
        balances(&[("0xa", "200000000"), (USDC, "1000000")]),
        prices,
        ProtocolRegistry::new().with(Protocol::Echelon, static_fetcher(echelon_payload())),
    );

    let portfolio = service.build_portfolio("0xABC").await?;

    assert_eq!(portfolio.address, "0xabc");
    assert_eq!(portfolio.wallet_value_usd(), d("11"));

    let echelon = portfolio.protocol("echelon").unwrap();
    assert_eq!(echelon.positions.len(), 2);
    assert!(echelon.positions.iter().all(|p| p.value_usd >= Decimal::ZERO));
    assert_eq!(echelon.total_value_usd, d("10"));

    assert_eq!(portfolio.protocols_value_usd(), d("10"));
    assert_eq!(
        portfolio.total_value_usd(),
        portfolio.wallet_value_usd() + portfolio.protocols_value_usd()
    );
    assert_eq!(portfolio.date_time, fixed_now());
    Ok(())
}

#[tokio::test]
async fn one_price_batch_covers_wallet_and_protocol_assets() -> Result<()> {
    let prices = Arc::new(MockPriceSource::new(standard_prices()));
    let amnis = json!({"stakes": [{"pool": "amAPT", "token": "0xam", "staked": "100"}]});
    let service = aggregator(
        balances(&[(APT_COIN, "100000000")]),
        prices.clone(),
        ProtocolRegistry::new()
            .with(Protocol::Echelon, static_fetcher(echelon_payload()))
            .with(Protocol::Amnis, static_fetcher(amnis)),
    );

    service.build_portfolio("0xabc").await?;

    assert_eq!(prices.calls(), 1);
    let batch = &prices.batches()[0];
    for id in [APT_COIN, "0xa", USDC, "0xam"] {
        assert!(batch.contains(&AssetId::parse(id)), "missing {id} in {batch:?}");
    }
    Ok(())
}

#[tokio::test]
async fn unpriced_token_does_not_affect_priced_ones() -> Result<()> {
    let prices = Arc::new(MockPriceSource::new(standard_prices()));
    let service = aggregator(
        balances(&[("0xcafe::moon::MoonCoin", "999"), ("0xa", "100000000")]),
        prices,
        ProtocolRegistry::new(),
    );

    let portfolio = service.build_portfolio("0xabc").await?;

    assert_eq!(portfolio.tokens[0].display_symbol, "APT");
    assert_eq!(portfolio.tokens[0].value_usd, Some(d("5")));
    assert_eq!(portfolio.tokens[1].display_symbol, "MoonCoin");
    assert_eq!(portfolio.tokens[1].value_usd, None);
    assert_eq!(portfolio.wallet_value_usd(), d("5"));
    Ok(())
}

#[tokio::test]
async fn failing_protocol_is_isolated() -> Result<()> {
    let aries = json!({
        "profiles": {
            "Main": {"owner": "0xabc", "deposits": {(APT_COIN): {"collateral_amount": "100000000"}}}
        }
    });
    let hyperion = json!({"data": [{"value": "42", "position": {"pool": {"poolId": "p"}}}]});
    let joule = json!({"positions": [{"lends": [{"tokenAddress": "0xa", "amount": "100000000"}]}]});

    let healthy = |registry: ProtocolRegistry| {
        registry
            .with(Protocol::Aries, static_fetcher(aries.clone()))
            .with(Protocol::Hyperion, static_fetcher(hyperion.clone()))
    };

    let with_failure = aggregator(
        balances(&[]),
        Arc::new(MockPriceSource::new(standard_prices())),
        healthy(
            ProtocolRegistry::new()
                .with(Protocol::Echelon, static_fetcher(echelon_payload()))
                .with(Protocol::Joule, static_fetcher(joule.clone()))
                .with(Protocol::Meso, Arc::new(FailingFetcher)),
        ),
    );
    let without_failure = aggregator(
        balances(&[]),
        Arc::new(MockPriceSource::new(standard_prices())),
        healthy(
            ProtocolRegistry::new()
                .with(Protocol::Echelon, static_fetcher(echelon_payload()))
                .with(Protocol::Joule, static_fetcher(joule)),
        ),
    );

    let degraded = with_failure.build_portfolio("0xabc").await?;
    let reference = without_failure.build_portfolio("0xabc").await?;

    assert_eq!(
        protocol_keys(&degraded),
        vec!["echelon", "joule", "meso", "aries", "hyperion"]
    );
    let meso = degraded.protocol("meso").unwrap();
    assert!(meso.positions.is_empty());
    assert_eq!(meso.total_value_usd, Decimal::ZERO);

    for key in ["echelon", "joule", "aries", "hyperion"] {
        assert_eq!(degraded.protocol(key), reference.protocol(key), "{key} changed");
    }
    assert_eq!(degraded.total_value_usd(), reference.total_value_usd());
    assert_eq!(degraded.total_value_usd(), d("10") + d("5") + d("5") + d("42"));
    Ok(())
}

#[tokio::test]
async fn overflowing_protocol_total_is_isolated() -> Result<()> {
    let huge = "50000000000000000000000000000";
    let hyperion = json!({
        "data": [
            {"value": huge, "position": {"pool": {"poolId": "p1"}}},
            {"value": huge, "position": {"pool": {"poolId": "p2"}}}
        ]
    });
    let service = aggregator(
        balances(&[("0xa", "100000000")]),
        Arc::new(MockPriceSource::new(standard_prices())),
        ProtocolRegistry::new()
            .with(Protocol::Echelon, static_fetcher(echelon_payload()))
            .with(Protocol::Hyperion, static_fetcher(hyperion)),
    );

    let portfolio = service.build_portfolio("0xabc").await?;

    let hyperion = portfolio.protocol("hyperion").unwrap();
    assert!(hyperion.positions.is_empty());
    assert_eq!(hyperion.total_value_usd, Decimal::ZERO);
    assert_eq!(portfolio.protocol("echelon").unwrap().total_value_usd, d("10"));
    assert_eq!(portfolio.total_value_usd(), d("15"));
    Ok(())
}

#[tokio::test]
async fn wallet_failure_propagates() {
    let service = aggregator(
        Arc::new(FailingBalanceSource),
        Arc::new(MockPriceSource::new(standard_prices())),
        ProtocolRegistry::new().with(Protocol::Echelon, static_fetcher(echelon_payload())),
    );
    let err = service.build_portfolio("0xabc").await.unwrap_err();
    assert!(format!("{err:#}").contains("indexer unavailable"));
}

#[tokio::test]
async fn price_outage_keeps_amounts_with_unknown_values() -> Result<()> {
    let service = aggregator(
        balances(&[("0xa", "100000000")]),
        Arc::new(MockPriceSource::failing()),
        ProtocolRegistry::new().with(Protocol::Echelon, static_fetcher(echelon_payload())),
    );

    let portfolio = service.build_portfolio("0xabc").await?;
    assert_eq!(portfolio.tokens[0].value_usd, None);
    assert_eq!(portfolio.tokens[0].raw_amount, "100000000");
    let echelon = portfolio.protocol("echelon").unwrap();
    assert_eq!(echelon.positions.len(), 2);
    assert_eq!(echelon.total_value_usd, Decimal::ZERO);
    assert_eq!(portfolio.total_value_usd(), Decimal::ZERO);
    Ok(())
}

#[tokio::test]
async fn invalid_address_is_rejected_before_any_fetch() {
    let recorder = Arc::new(RecordingFetcher::default());
    let service = aggregator(
        balances(&[]),
        Arc::new(MockPriceSource::new(standard_prices())),
        ProtocolRegistry::new().with(Protocol::Kofi, recorder.clone()),
    );
    assert!(service.build_portfolio("not-an-address").await.is_err());
    assert!(recorder.addresses.lock().unwrap().is_empty());
}

#[tokio::test]
async fn protocols_receive_the_canonical_address() -> Result<()> {
    let recorder = Arc::new(RecordingFetcher::default());
    let service = aggregator(
        balances(&[]),
        Arc::new(MockPriceSource::new(standard_prices())),
        ProtocolRegistry::new().with(Protocol::Kofi, recorder.clone()),
    );
    service.build_portfolio("  0x00ABC ").await?;
    assert_eq!(*recorder.addresses.lock().unwrap(), vec!["0xabc".to_string()]);
    Ok(())
}

#[tokio::test]
async fn rebuilding_with_same_inputs_is_idempotent() -> Result<()> {
    let prices = Arc::new(MockPriceSource::new(standard_prices()));
    let service = aggregator(
        balances(&[("0xa", "200000000"), (USDC, "1000000")]),
        prices.clone(),
        ProtocolRegistry::new().with(Protocol::Echelon, static_fetcher(echelon_payload())),
    );

    let first = service.build_portfolio("0xabc").await?;
    let second = service.build_portfolio("0xabc").await?;

    assert_eq!(first, second);
    assert_eq!(prices.calls(), 1, "second build should be served from the price cache");
    Ok(())
}

#[tokio::test]
async fn json_shape_matches_contract() -> Result<()> {
    let service = aggregator(
        balances(&[("0xa", "100000000")]),
        Arc::new(MockPriceSource::new(standard_prices())),
        ProtocolRegistry::new()
            .with(Protocol::Echelon, static_fetcher(echelon_payload()))
            .with(Protocol::Meso, Arc::new(FailingFetcher)),
    );

    let value = serde_json::to_value(service.build_portfolio("0xabc").await?)?;

    assert_eq!(value["address"], "0xabc");
    assert_eq!(value["tokens"][0]["valueUsd"], 5.0);
    assert_eq!(value["protocols"]["echelon"]["totalValueUsd"], 10.0);
    assert_eq!(value["protocols"]["meso"]["positions"], json!([]));
    assert_eq!(value["totals"]["totalValueUsd"], 15.0);
    assert_eq!(value["dateTime"], "2024-06-01T12:00:00Z");

    let kinds: Vec<&str> = value["protocols"]["echelon"]["positions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["kind"].as_str().unwrap())
        .collect();
    assert!(kinds.contains(&PositionKind::Borrow.as_str()));
    Ok(())
}
