//! Transfer gateway bindings.
//!
//! Two generations of the mainnet gateway are deployed. Both lock ERC20 deposits
//! and release withdrawals against an oracle attestation, but they disagree on how
//! that attestation is passed in:
//! - `IERC20Gateway` takes the oracle signature as opaque bytes
//! - `IERC20MultisigGateway` takes one signature per validator, split into
//!   index/v/r/s arrays checked against the validator manager

use alloy_sol_types::sol;

sol! {
    /// Token kinds understood by the gateway contracts.
    enum GatewayTokenKind {
        ETH,
        ERC20,
        ERC721,
        ERC721X,
        LoomCoin
    }

    /// Single-signature gateway (oracle signature passed through as bytes)
    #[sol(rpc)]
    interface IERC20Gateway {
        /// Emitted when ERC20 tokens are received by the gateway
        event ERC20Received(address from, uint256 amount, address contractAddress);

        /// Emitted when a withdrawal is released
        event TokenWithdrawn(
            address indexed owner,
            GatewayTokenKind kind,
            address contractAddress,
            uint256 value
        );

        /// Deposit previously approved tokens into the gateway
        function depositERC20(uint256 amount, address contractAddress) external;

        /// Release tokens against an oracle signature
        function withdrawERC20(uint256 amount, bytes calldata sig, address contractAddress) external;

        /// Withdrawal nonce of an owner, bumped on every successful withdrawal
        function nonces(address owner) external view returns (uint256);
    }

    /// Multisig gateway (validator signatures checked by the validator manager)
    #[sol(rpc)]
    interface IERC20MultisigGateway {
        event ERC20Received(address from, uint256 amount, address contractAddress);

        event TokenWithdrawn(
            address indexed owner,
            GatewayTokenKind kind,
            address contractAddress,
            uint256 value
        );

        function depositERC20(uint256 amount, address contractAddress) external;

        /// Release tokens against signatures from a validator quorum.
        /// Indexes must be strictly increasing.
        function withdrawERC20(
            uint256 amount,
            address contractAddress,
            uint256[] calldata _signersIndexes,
            uint8[] calldata _v,
            bytes32[] calldata _r,
            bytes32[] calldata _s
        ) external;

        function nonces(address owner) external view returns (uint256);

        /// Validator manager holding the current signer set
        function vmc() external view returns (address);
    }
}
