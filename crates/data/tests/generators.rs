use kairos_types::Candle;
use proptest::prelude::*;

/// Generates valid bar sequences with a strictly increasing one-minute index.
pub fn valid_candle_sequence(len: usize) -> impl Strategy<Value = Vec<Candle>> {
    prop::collection::vec(valid_candle(), len..=len).prop_map(|mut candles| {
        let mut ts = 1_704_067_200_000_000_000i64; // 2024-01-01 00:00:00 UTC
        for candle in &mut candles {
            candle.timestamp_ns = ts;
            ts += 60_000_000_000;
        }
        candles
    })
}

fn valid_candle() -> impl Strategy<Value = Candle> {
    (1.0f64..2.0, 0.0001..0.01).prop_map(|(base, spread)| Candle {
        timestamp_ns: 0,
        open: base,
        high: base + spread,
        low: base - spread,
        close: base + (spread * 0.5),
        volume: 100.0,
    })
}
