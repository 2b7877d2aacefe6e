//! Event decoders for the nLP / Pendle contracts
//!
//! Dispatch is purely on topic-0 plus the emitting contract:
//! - Transfer: wNLP and SY-wNLP supply movements
//! - Swap: Pendle market trades
//! - Mint / Burn: Pendle market liquidity
//! - RedeemRewards: Pendle market reward claims

pub mod lp;
pub mod rewards;
pub mod swap;
pub mod transfer;

use alloy::primitives::{Address, B256};
use analytics_store::{
    entity::{DecodedTransfer, LogEntry, LpAction, LpEvent, RewardClaim, SwapEvent},
    Market, Settings, TrackedToken,
};
use chrono::{DateTime, Utc};

use crate::error::AppError;

/// Event topics (keccak256 hashes)
pub mod topics {
    use alloy::primitives::{b256, B256};

    /// Transfer(address indexed from, address indexed to, uint256 value)
    pub const TRANSFER: B256 =
        b256!("ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef");
    /// Swap(address indexed caller, address indexed receiver, int256 netPtOut, int256 netSyOut, uint256 netSyFee, uint256 netSyToReserve)
    pub const SWAP: B256 =
        b256!("829000a5bc6a12d46e30cdcecd7c56b1efd88f6d7d059da6734a04f3764557c4");
    /// Mint(address indexed receiver, uint256 netLpMinted, uint256 netSyUsed, uint256 netPtUsed)
    pub const MINT: B256 =
        b256!("b4c03061fb5b7fed76389d5af8f2e0ddb09f8c70d1333abbb62582835e10accb");
    /// Burn(address indexed receiverSy, address indexed receiverPt, uint256 netLpBurned, uint256 netSyOut, uint256 netPtOut)
    pub const BURN: B256 =
        b256!("4cf25bc1d991c17529c25213d3cc0cdb935e6805f54b7b3c66c68b92c6f39d00");
    /// RedeemRewards(address indexed user, uint256[] rewardsOut)
    pub const REDEEM_REWARDS: B256 =
        b256!("78d61a0c27b13f43911095f9f356f14daa3cd8b125eea1aa22421245e90e813d");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Transfer,
    Swap,
    Mint,
    Burn,
    RedeemRewards,
}

impl EventKind {
    pub fn from_topic0(topic0: &B256) -> Option<Self> {
        match *topic0 {
            topics::TRANSFER => Some(Self::Transfer),
            topics::SWAP => Some(Self::Swap),
            topics::MINT => Some(Self::Mint),
            topics::BURN => Some(Self::Burn),
            topics::REDEEM_REWARDS => Some(Self::RedeemRewards),
            _ => None,
        }
    }

    pub fn topic0(&self) -> B256 {
        match self {
            Self::Transfer => topics::TRANSFER,
            Self::Swap => topics::SWAP,
            Self::Mint => topics::MINT,
            Self::Burn => topics::BURN,
            Self::RedeemRewards => topics::REDEEM_REWARDS,
        }
    }
}

/// Contract registry used to attach token labels and market identity
#[derive(Debug, Clone)]
pub struct DecodeContext {
    pub tokens: Vec<TrackedToken>,
    pub markets: Vec<Market>,
}

impl DecodeContext {
    pub fn new(settings: &Settings) -> Self {
        Self {
            tokens: settings.tracked_tokens().into_iter().cloned().collect(),
            markets: settings.markets.clone(),
        }
    }

    pub fn token(&self, address: &Address) -> Option<&TrackedToken> {
        self.tokens.iter().find(|token| &token.address == address)
    }

    pub fn market(&self, address: &Address) -> Option<&Market> {
        self.markets.iter().find(|market| &market.address == address)
    }
}

/// A log turned into its typed record
#[derive(Debug, Clone, PartialEq)]
pub enum ChainEvent {
    Transfer(DecodedTransfer),
    Swap(SwapEvent),
    Lp(LpEvent),
    RewardClaim(RewardClaim),
}

/// Decode a log based on its event signature and emitting contract
pub fn decode_event(
    log: &LogEntry,
    ctx: &DecodeContext,
    timestamp: DateTime<Utc>,
) -> Result<ChainEvent, AppError> {
    let topic0 = log.topic0().ok_or(AppError::MissingTopic)?;
    let kind = EventKind::from_topic0(topic0)
        .ok_or_else(|| AppError::UnknownEventTopic(topic0.to_string()))?;
    let untracked = || AppError::UntrackedContract(log.address.to_string());

    match kind {
        EventKind::Transfer => {
            let token = ctx.token(&log.address).ok_or_else(untracked)?;
            Ok(ChainEvent::Transfer(transfer::decode(log, token).at(timestamp)))
        }
        EventKind::Swap => {
            let market = ctx.market(&log.address).ok_or_else(untracked)?;
            Ok(ChainEvent::Swap(swap::decode(log, market, timestamp)))
        }
        EventKind::Mint | EventKind::Burn => {
            let market = ctx.market(&log.address).ok_or_else(untracked)?;
            let action = if kind == EventKind::Mint {
                LpAction::Mint
            } else {
                LpAction::Burn
            };
            Ok(ChainEvent::Lp(lp::decode(log, market, action, timestamp)))
        }
        EventKind::RedeemRewards => {
            let market = ctx.market(&log.address).ok_or_else(untracked)?;
            Ok(ChainEvent::RewardClaim(rewards::decode(log, market, timestamp)))
        }
    }
}


#[cfg(test)]
mod tests {
    use alloy::primitives::{address, Bytes, U256};
    use analytics_store::entity::TransferKind;

    use super::{fixtures::*, *};

    const ALICE: Address = address!("00000000000000000000000000000000000000a1");

    #[test]
    fn test_topic_table_round_trips() {
        for kind in [
            EventKind::Transfer,
            EventKind::Swap,
            EventKind::Mint,
            EventKind::Burn,
            EventKind::RedeemRewards,
        ] {
            assert_eq!(EventKind::from_topic0(&kind.topic0()), Some(kind));
        }
        assert_eq!(EventKind::from_topic0(&B256::ZERO), None);
    }

    #[test]
    fn test_context_resolves_markets_and_tokens() {
        let settings = Settings::default();
        let ctx = DecodeContext::new(&settings);

        let market = ctx
            .market(&address!("c1ef65d86f82d5a8160b577a150f65d52d6b266f"))
            .map(|m| m.label.as_str());
        assert_eq!(market, Some("25 Jun 2026"));
        assert!(ctx.market(&Address::ZERO).is_none());
        assert_eq!(ctx.token(&settings.sy.address).map(|t| t.name.as_str()), Some("SY_wNLP"));
    }

    #[test]
    fn test_decode_event_dispatches_by_contract() {
        let settings = Settings::default();
        let ctx = DecodeContext::new(&settings);
        let now = Utc::now();

        let sy_mint = log(
            settings.sy.address,
            10,
            vec![topics::TRANSFER, topic_for(Address::ZERO), topic_for(ALICE)],
            words(&[U256::from(10).pow(U256::from(18))]),
        );
        match decode_event(&sy_mint, &ctx, now).unwrap() {
            ChainEvent::Transfer(transfer) => assert_eq!(transfer.kind, TransferKind::Deposit),
            other => panic!("unexpected {other:?}"),
        }

        let market = &settings.markets[0];
        let lp_burn = log(market.address, 11, vec![topics::BURN, topic_for(ALICE)], Bytes::new());
        match decode_event(&lp_burn, &ctx, now).unwrap() {
            ChainEvent::Lp(event) => {
                assert_eq!(event.action, LpAction::Burn);
                assert_eq!(event.market, market.label);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_decode_event_rejects_unknown_logs() {
        let ctx = DecodeContext::new(&Settings::default());
        let now = Utc::now();

        let no_topics = log(ALICE, 1, vec![], Bytes::new());
        assert!(matches!(decode_event(&no_topics, &ctx, now), Err(AppError::MissingTopic)));

        let unknown = log(ALICE, 1, vec![B256::repeat_byte(1)], Bytes::new());
        assert!(matches!(
            decode_event(&unknown, &ctx, now),
            Err(AppError::UnknownEventTopic(_))
        ));

        let stray = log(ALICE, 1, vec![topics::SWAP], Bytes::new());
        assert!(matches!(
            decode_event(&stray, &ctx, now),
            Err(AppError::UntrackedContract(_))
        ));
    }
}
