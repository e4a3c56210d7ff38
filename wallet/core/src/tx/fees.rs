use crate::imports::*;
use crate::rpc::RpcFeeEstimate;
use crate::utils::sompi_to_kaspa;

/// Number of fee options offered for a transaction: low, normal and priority.
pub const FEE_OPTIONS: usize = 3;

/// Transaction fees, in sompi.
///
/// Coin transfers pay a single fee. Token transfers pay for two transactions:
/// the commit fee is paid by the commit transaction, the reveal fee is locked into
/// the commit output and paid when the reveal transaction spends it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FeeParams {
    Simple(u64),
    TokenCommitReveal { commit: u64, reveal: u64 },
    /// Fee of a reveal transaction whose commit is already on chain
    RevealOnly(u64),
}

impl FeeParams {
    /// Total sompi paid by the wallet.
    pub fn total(&self) -> u64 {
        match self {
            FeeParams::Simple(fee) | FeeParams::RevealOnly(fee) => *fee,
            FeeParams::TokenCommitReveal { commit, reveal } => commit.saturating_add(*reveal),
        }
    }

    pub fn simple(&self) -> Result<u64> {
        match self {
            FeeParams::Simple(fee) => Ok(*fee),
            _ => Err(Error::BuildFailure("coin transfers take a single fee".to_string())),
        }
    }

    /// `(commit, reveal)` fees of a token transfer.
    pub fn commit_reveal(&self) -> Result<(u64, u64)> {
        match self {
            FeeParams::TokenCommitReveal { commit, reveal } => Ok((*commit, *reveal)),
            _ => Err(Error::MissingFeeParameters),
        }
    }

    pub fn reveal(&self) -> Result<u64> {
        match self {
            FeeParams::TokenCommitReveal { reveal, .. } | FeeParams::RevealOnly(reveal) => Ok(*reveal),
            FeeParams::Simple(_) => Err(Error::MissingFeeParameters),
        }
    }
}

/// A fee option computed from a fee-rate bucket.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fee {
    /// sompi per gram of mass
    pub feerate: f64,
    pub params: FeeParams,
}

impl Fee {
    pub fn sompi(&self) -> u64 {
        self.params.total()
    }

    /// The fee in KAS, for display.
    pub fn kaspa(&self) -> f64 {
        sompi_to_kaspa(self.sompi())
    }
}

/// Maps network fee-rate estimates onto fee options for a transaction of known mass.
#[derive(Debug, Clone, Copy)]
pub struct FeeMapper {
    reveal_transaction_mass: u64,
}

impl FeeMapper {
    pub fn new(reveal_transaction_mass: u64) -> Self {
        Self { reveal_transaction_mass }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.reveal_transaction_mass)
    }

    /// Low, normal and priority fees of a coin transfer of the given mass.
    pub fn coin_fees(&self, estimate: &RpcFeeEstimate, mass: u64) -> Result<[Fee; FEE_OPTIONS]> {
        Ok(top_feerates(estimate)?.map(|feerate| Fee { feerate, params: FeeParams::Simple(fee_for_mass(mass, feerate)) }))
    }

    /// Low, normal and priority fees of a token transfer. The reveal transaction can not be
    /// built before the commit id is known, so its fee is estimated from a fixed mass.
    pub fn token_fees(&self, estimate: &RpcFeeEstimate, commit_mass: u64) -> Result<[Fee; FEE_OPTIONS]> {
        Ok(top_feerates(estimate)?.map(|feerate| Fee {
            feerate,
            params: FeeParams::TokenCommitReveal {
                commit: fee_for_mass(commit_mass, feerate),
                reveal: fee_for_mass(self.reveal_transaction_mass, feerate),
            },
        }))
    }
}

/// `mass * feerate`, rounded up to whole sompi.
pub fn fee_for_mass(mass: u64, feerate: f64) -> u64 {
    (mass as f64 * feerate.max(0.0)).ceil() as u64
}

/// The three largest feerates among all buckets, ascending.
fn top_feerates(estimate: &RpcFeeEstimate) -> Result<[f64; FEE_OPTIONS]> {
    let mut feerates = estimate.ordered_buckets().into_iter().map(|bucket| bucket.feerate).collect::<Vec<_>>();
    if feerates.len() < FEE_OPTIONS {
        return Err(Error::BuildFailure(format!("fee estimate carries {} buckets, {FEE_OPTIONS} are required", feerates.len())));
    }

    feerates.sort_by(f64::total_cmp);
    let top = &feerates[feerates.len() - FEE_OPTIONS..];
    debug!("selected feerates {top:?}");
    Ok([top[0], top[1], top[2]])
}
