// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JSON-RPC methods the browser tools may call.
//!
//! Read-only account, token and transaction queries plus transaction
//! submission and simulation. Anything else (airdrops, validator admin,
//! vote account queries the tools never make) is refused.

pub const ALLOWED_METHODS: &[&str] = &[
    // Accounts
    "getAccountInfo",
    "getBalance",
    "getMultipleAccounts",
    "getProgramAccounts",
    "getMinimumBalanceForRentExemption",
    // Tokens
    "getTokenAccountBalance",
    "getTokenAccountsByOwner",
    "getTokenAccountsByDelegate",
    "getTokenLargestAccounts",
    "getTokenSupply",
    // Blocks and cluster
    "getBlock",
    "getBlockHeight",
    "getBlockTime",
    "getEpochInfo",
    "getGenesisHash",
    "getHealth",
    "getLatestBlockhash",
    "getSlot",
    "getSupply",
    "getVersion",
    "isBlockhashValid",
    // Transactions
    "getFeeForMessage",
    "getRecentPrioritizationFees",
    "getSignatureStatuses",
    "getSignaturesForAddress",
    "getTransaction",
    "sendTransaction",
    "simulateTransaction",
];

pub fn is_allowed(method: &str) -> bool {
    ALLOWED_METHODS.contains(&method)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allow_list_is_closed() {
        assert!(is_allowed("getBalance"));
        assert!(is_allowed("sendTransaction"));
        assert!(!is_allowed("requestAirdrop"));
        assert!(!is_allowed("getbalance"));
        assert!(!is_allowed(""));
    }
}
