use alloy::sol;

sol! {
    contract TokenSale {
        constructor(
            address token,
            uint256 minReserve,
            uint256 maxReserve,
            uint256 tokensPerNative,
            uint256 vestingPeriod,
            uint256 vestingPeriodCounter,
            uint256 lockPeriod
        );
    }
}
