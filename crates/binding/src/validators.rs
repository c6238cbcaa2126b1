//! Validator manager bindings used by the multisig gateway.

use alloy_sol_types::sol;

sol! {
    /// ValidatorManagerContract - holds the oracle signer set and quorum
    #[sol(rpc)]
    interface IValidatorManager {
        /// Current validator addresses, in index order
        function getValidators() external view returns (address[] memory);

        /// Total voting power
        function totalPower() external view returns (uint256);

        /// Quorum threshold numerator
        function threshold_num() external view returns (uint8);

        /// Quorum threshold denominator
        function threshold_denom() external view returns (uint8);
    }
}
