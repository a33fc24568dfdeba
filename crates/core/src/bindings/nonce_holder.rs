use alloy::sol;

sol! {
    #[sol(rpc)]
    contract NonceHolder {
        function getDeploymentNonce(address _address) external view returns (uint256 deploymentNonce);
    }
}
