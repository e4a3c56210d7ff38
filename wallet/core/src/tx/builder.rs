//!
//! Builds Kaspa coin transfers and KRC20 commit/reveal transactions from the wallet's
//! UTXO snapshot, and assembles them again once the signatures are known.
//!

use super::{FeeParams, UnsignedTransaction};
use crate::imports::*;
use crate::krc20::{
    COMPRESSED_PUBLIC_KEY_SIZE, CommitTransaction, Envelope, IncompleteTokenTransactionParams, RedeemScript, RevealTransaction,
    TransactionGroup, TransactionMeta,
};
use crate::rpc::RpcTransaction;
use crate::signer::compress_public_key;
use crate::utxo::{UnspentOutput, UtxoSet, total_amount};
use kastx_addresses::AddressError;
use kastx_consensus_core::hashing::sighash_type::SIG_HASH_ALL;
use kastx_consensus_core::tx::{
    SignableTransaction, Transaction, TransactionInput, TransactionOutpoint, TransactionOutput, UtxoEntry,
};
use kastx_txscript::{pay_to_address_script, pay_to_pub_key_signature_script, pay_to_script_hash_signature_script};

/// Length of the placeholder signatures used when a transaction is only built to measure its mass.
pub const DUMMY_SIGNATURE_SIZE: usize = 65;

/// What a transfer moves: KAS or a KRC20 token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferAmount {
    /// Amount in sompi
    Coin(u64),
    /// Amount in the token's smallest units
    Token { ticker: String, amount: u128 },
}

/// A transfer request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    pub amount: TransferAmount,
    pub fee: FeeParams,
    /// Sender address, change is paid back to it
    pub source: String,
    pub destination: String,
}

impl Transfer {
    pub fn coin<S: Into<String>, D: Into<String>>(amount: u64, fee: u64, source: S, destination: D) -> Self {
        Self { amount: TransferAmount::Coin(amount), fee: FeeParams::Simple(fee), source: source.into(), destination: destination.into() }
    }

    pub fn token<T: Into<String>, S: Into<String>, D: Into<String>>(
        ticker: T,
        amount: u128,
        commit_fee: u64,
        reveal_fee: u64,
        source: S,
        destination: D,
    ) -> Self {
        Self {
            amount: TransferAmount::Token { ticker: ticker.into(), amount },
            fee: FeeParams::TokenCommitReveal { commit: commit_fee, reveal: reveal_fee },
            source: source.into(),
            destination: destination.into(),
        }
    }
}

enum FeeMode<'a> {
    Exactly(&'a FeeParams),
    Calculation,
}

/// Builds transactions spending the wallet's UTXO snapshot.
///
/// Every build spends all outputs of the snapshot and pays the remainder back to the
/// source address. Builds are deterministic: the same snapshot and request produce
/// byte-identical transactions and digests.
pub struct TransactionBuilder {
    public_key: [u8; COMPRESSED_PUBLIC_KEY_SIZE],
    address: Address,
    settings: Settings,
    utxos: UtxoSet,
}

impl TransactionBuilder {
    /// `public_key` may be compressed or uncompressed.
    pub fn try_new(public_key: &[u8], settings: &Settings) -> Result<Self> {
        let public_key = compress_public_key(public_key)?;
        let address = Address::from_public_key(settings.network, &public_key)?;
        Ok(Self { public_key, address, settings: settings.clone(), utxos: UtxoSet::new(settings.max_inputs) })
    }

    pub fn public_key(&self) -> &[u8; COMPRESSED_PUBLIC_KEY_SIZE] {
        &self.public_key
    }

    /// The wallet address derived from its public key.
    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn utxos(&self) -> &UtxoSet {
        &self.utxos
    }

    pub fn set_unspent_outputs(&self, outputs: Vec<UnspentOutput>) {
        self.utxos.set_unspent_outputs(outputs);
    }

    /// Records a transaction accepted by the network: its inputs leave the snapshot and
    /// its outputs paying to the wallet join it.
    pub fn apply_transaction(&self, transaction: &Transaction) {
        self.utxos.apply_transaction(transaction, &pay_to_address_script(&self.address));
    }

    /// Available balance in KAS.
    pub fn available_amount(&self) -> f64 {
        self.utxos.available_amount()
    }

    pub fn available_sompi(&self) -> u64 {
        self.utxos.available_sompi()
    }

    /// Builds a coin transfer and the digests its inputs must be signed over.
    pub fn build_for_sign(&self, transfer: &Transfer) -> Result<UnsignedTransaction> {
        self.build_coin(transfer, FeeMode::Exactly(&transfer.fee))
    }

    /// Builds a coin transfer of up to `amount` sompi signed with placeholder signatures,
    /// so the network can measure its mass before the real signatures exist.
    pub fn build_for_mass_calculation(&self, amount: u64, source: &str, destination: &str) -> Result<RpcTransaction> {
        let amount = amount.min(self.available_sompi());
        let transfer = Transfer::coin(amount, 0, source, destination);
        let unsigned = self.build_coin(&transfer, FeeMode::Calculation)?;
        self.with_dummy_signatures(&unsigned)
    }

    /// Inserts the signatures into the inputs and returns the transaction ready for broadcast.
    pub fn build_for_send<S: AsRef<[u8]>>(&self, unsigned: &UnsignedTransaction, signatures: &[S]) -> Result<Transaction> {
        apply_signatures(unsigned, signatures, |_, signature| Ok(pay_to_pub_key_signature_script(signature, SIG_HASH_ALL.to_u8())?))
    }

    /// Same as [`TransactionBuilder::build_for_send`] for a reveal transaction: its first input
    /// spends the commit output and carries the redeem script after the signature.
    pub fn build_reveal_for_send<S: AsRef<[u8]>>(
        &self,
        unsigned: &UnsignedTransaction,
        redeem_script: &RedeemScript,
        signatures: &[S],
    ) -> Result<Transaction> {
        apply_signatures(unsigned, signatures, |index, signature| {
            let signature_script = pay_to_pub_key_signature_script(signature, SIG_HASH_ALL.to_u8())?;
            match index {
                0 => Ok(pay_to_script_hash_signature_script(redeem_script.script(), &signature_script)?),
                _ => Ok(signature_script),
            }
        })
    }

    /// Builds both phases of a token transfer.
    pub fn build_for_sign_krc20(&self, transfer: &Transfer) -> Result<(TransactionGroup, TransactionMeta)> {
        let commit = self.build_commit(transfer)?;
        let reveal = self.build_reveal(&transfer.source, &commit.params, &transfer.fee)?;

        Ok((
            TransactionGroup { commit: commit.transaction, reveal: reveal.transaction },
            TransactionMeta { redeem_script: commit.redeem_script, incomplete_params: commit.params },
        ))
    }

    /// Builds the commit transaction of a token transfer. Its first output locks the dust value
    /// plus the reveal fee under the hash of the transfer's redeem script.
    pub fn build_commit(&self, transfer: &Transfer) -> Result<CommitTransaction> {
        self.build_commit_with(transfer, FeeMode::Exactly(&transfer.fee))
    }

    /// Commit transaction locking only the dust value, signed with placeholder signatures.
    pub fn build_for_mass_calculation_krc20(&self, transfer: &Transfer) -> Result<RpcTransaction> {
        let commit = self.build_commit_with(transfer, FeeMode::Calculation)?;
        self.with_dummy_signatures(&commit.transaction)
    }

    /// Builds the reveal transaction spending the commit output described by `params`.
    /// Only persisted data is needed, the redeem script is rebuilt from the envelope.
    pub fn build_reveal(&self, source: &str, params: &IncompleteTokenTransactionParams, fee: &FeeParams) -> Result<RevealTransaction> {
        let reveal_fee = fee.reveal()?;
        let change_script = pay_to_address_script(&self.resolve_address(source)?);
        let redeem_script = RedeemScript::new(&self.public_key, &params.envelope)?;

        // the reveal must return something, an output-less transaction can not be relayed
        let change = params
            .target_output_amount
            .checked_sub(reveal_fee)
            .filter(|change| *change > 0)
            .ok_or(Error::InsufficientFunds { available: params.target_output_amount, required: reveal_fee.saturating_add(1) })?;

        let input = TransactionInput::standard(TransactionOutpoint::new(params.commit_transaction_id, 0), vec![]);
        let entry = UtxoEntry::new(params.target_output_amount, redeem_script.script_public_key());
        let outputs = vec![TransactionOutput::new(change, change_script)];

        let transaction = UnsignedTransaction::new(SignableTransaction::with_entries(Transaction::new_native(vec![input], outputs), vec![entry]));
        debug!("built reveal transaction {} spending commit {}", transaction.id(), params.commit_transaction_id);
        Ok(RevealTransaction { transaction, redeem_script })
    }

    fn build_coin(&self, transfer: &Transfer, fee_mode: FeeMode) -> Result<UnsignedTransaction> {
        let TransferAmount::Coin(amount) = transfer.amount else {
            return Err(Error::BuildFailure("expected a coin amount".to_string()));
        };
        let fee = match fee_mode {
            FeeMode::Exactly(fee) => fee.simple()?,
            FeeMode::Calculation => 0,
        };

        let destination = pay_to_address_script(&self.resolve_address(&transfer.destination)?);
        let change = pay_to_address_script(&self.resolve_address(&transfer.source)?);

        let utxos = self.utxos.snapshot();
        validate_available(&utxos, amount)?;
        let transaction = UnsignedTransaction::new(build_transaction(&utxos, amount, fee, destination, change)?);
        debug!("built transaction {} sending {amount} sompi with fee {fee}", transaction.id());
        Ok(transaction)
    }

    fn build_commit_with(&self, transfer: &Transfer, fee_mode: FeeMode) -> Result<CommitTransaction> {
        let TransferAmount::Token { ticker, amount } = &transfer.amount else {
            return Err(Error::BuildFailure("expected a token amount".to_string()));
        };

        let utxos = self.utxos.snapshot();
        let dust = self.settings.dust_sompi;
        let (target_output_amount, fee) = match fee_mode {
            FeeMode::Exactly(fee) => {
                let (commit_fee, reveal_fee) = fee.commit_reveal()?;
                // token amounts are not native balance, only the fees are paid from it
                validate_available(&utxos, fee.total())?;
                let target = dust.checked_add(reveal_fee).ok_or_else(|| Error::BuildFailure("reveal fee overflow".to_string()))?;
                (target, commit_fee)
            }
            FeeMode::Calculation => (dust, 0),
        };

        let recipient = self.resolve_address(&transfer.destination)?;
        let change = pay_to_address_script(&self.resolve_address(&transfer.source)?);
        let envelope = Envelope::new(*amount, recipient.to_string(), ticker.clone());
        let redeem_script = RedeemScript::new(&self.public_key, &envelope)?;

        let transaction =
            UnsignedTransaction::new(build_transaction(&utxos, target_output_amount, fee, redeem_script.script_public_key(), change)?);
        let params = IncompleteTokenTransactionParams {
            commit_transaction_id: transaction.id(),
            token_amount: *amount,
            target_output_amount,
            envelope,
        };
        debug!("built commit transaction {} locking {target_output_amount} sompi for {amount} {ticker}", params.commit_transaction_id);

        Ok(CommitTransaction { transaction, redeem_script, params })
    }

    fn with_dummy_signatures(&self, unsigned: &UnsignedTransaction) -> Result<RpcTransaction> {
        let signatures = vec![[1u8; DUMMY_SIGNATURE_SIZE]; unsigned.input_count()];
        Ok(RpcTransaction::from(&self.build_for_send(unsigned, &signatures)?))
    }

    /// Parses an address and checks it belongs to the wallet's network.
    fn resolve_address(&self, address: &str) -> Result<Address> {
        let address = Address::try_from(address)?;
        if address.prefix != self.settings.network {
            return Err(AddressError::InvalidPrefix(address.prefix.to_string()).into());
        }
        Ok(address)
    }
}

fn validate_available(utxos: &[UnspentOutput], required: u64) -> Result<()> {
    let available = total_amount(utxos);
    if required > available {
        return Err(Error::InsufficientFunds { available, required });
    }
    Ok(())
}

/// Spends every output of `utxos`, pays `amount` to `destination` and the remainder after `fee`
/// to `change`. No change output is created when nothing remains.
fn build_transaction(
    utxos: &[UnspentOutput],
    amount: u64,
    fee: u64,
    destination: ScriptPublicKey,
    change: ScriptPublicKey,
) -> Result<SignableTransaction> {
    let available = total_amount(utxos);
    let required = amount.checked_add(fee).ok_or_else(|| Error::BuildFailure("amount and fee overflow".to_string()))?;
    if utxos.is_empty() || available < required {
        return Err(Error::InsufficientFunds { available, required });
    }

    let (inputs, entries): (Vec<_>, Vec<_>) =
        utxos.iter().map(|utxo| (TransactionInput::standard(utxo.outpoint(), vec![]), utxo.entry())).unzip();

    let mut outputs = vec![TransactionOutput::new(amount, destination)];
    let change_amount = available - required;
    if change_amount > 0 {
        outputs.push(TransactionOutput::new(change_amount, change));
    }

    Ok(SignableTransaction::with_entries(Transaction::new_native(inputs, outputs), entries))
}

fn apply_signatures<S, F>(unsigned: &UnsignedTransaction, signatures: &[S], signature_script: F) -> Result<Transaction>
where
    S: AsRef<[u8]>,
    F: Fn(usize, &[u8]) -> Result<Vec<u8>>,
{
    let expected = unsigned.input_count();
    if signatures.len() != expected {
        return Err(Error::SignatureCountMismatch { expected, actual: signatures.len() });
    }

    let mut tx = unsigned.transaction.tx.clone();
    for (index, (input, signature)) in tx.inputs.iter_mut().zip(signatures).enumerate() {
        input.signature_script = signature_script(index, signature.as_ref())?;
    }
    Ok(tx)
}
