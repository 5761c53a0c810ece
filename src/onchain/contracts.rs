use alloy_sol_types::sol;

sol! {
    /// Market.Props as returned by the Reader and MarketFactory
    struct MarketPropsAbi {
        address marketToken;
        address indexToken;
        address longToken;
        address shortToken;
    }

    interface IDataStore {
        function getUint(bytes32 key) external view returns (uint256);
        function getBytes32(bytes32 key) external view returns (bytes32);
        function setUint(bytes32 key, uint256 value) external returns (uint256);
        function setBytes32(bytes32 key, bytes32 value) external returns (bytes32);
    }

    interface IReader {
        function getMarkets(address dataStore, uint256 start, uint256 end) external view returns (MarketPropsAbi[] memory);
    }

    interface IMarketFactory {
        function createMarket(address indexToken, address longToken, address shortToken, bytes32 marketType) external returns (MarketPropsAbi memory);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{B256, U256};
    use alloy_sol_types::SolCall;

    #[test]
    fn test_selectors() {
        assert_eq!(IDataStore::getUintCall::SIGNATURE, "getUint(bytes32)");
        assert_eq!(IDataStore::setBytes32Call::SIGNATURE, "setBytes32(bytes32,bytes32)");
        assert_eq!(IReader::getMarketsCall::SIGNATURE, "getMarkets(address,uint256,uint256)");
        assert_eq!(IMarketFactory::createMarketCall::SIGNATURE, "createMarket(address,address,address,bytes32)");
    }

    #[test]
    fn test_set_uint_calldata() {
        let call = IDataStore::setUintCall { key: B256::repeat_byte(0xab), value: U256::from(7) };
        let data = call.abi_encode();
        assert_eq!(data.len(), 4 + 64);
        assert_eq!(&data[0..4], IDataStore::setUintCall::SELECTOR.as_slice());
        assert_eq!(&data[4..36], B256::repeat_byte(0xab).as_slice());
        assert_eq!(data[67], 7);
    }
}
