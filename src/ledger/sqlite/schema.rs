diesel::table! {
    swaps (txhash) {
        txhash -> Text,
        wallet_address -> Text,
        network -> Text,
        status -> Text,
        timestamp -> BigInt,
        swap_type -> Text,
        fee -> Double,
        fee_rate -> Double,
        fee_currency -> Text,
        network_fee -> Double,
        network_fee_currency -> Text,
        currency -> Text,
        from_token -> Text,
        from_token_amount -> Double,
        from_token_decimals -> Integer,
        from_token_symbol -> Text,
        from_token_price -> Double,
        to_token -> Text,
        to_token_amount -> Double,
        to_token_decimals -> Integer,
        to_token_symbol -> Text,
        to_token_price -> Double,
        contract_address -> Text,
        provider -> Text,
        slippage -> Double,
        created_at -> BigInt,
    }
}
