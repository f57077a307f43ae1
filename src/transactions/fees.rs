// ============================================================================
// FEE DERIVATION
// ============================================================================
// Fees are not part of the node's transaction dump. They are derived from the
// values of the outputs a transaction spends, so every spent transaction must
// be in the loaded set.

use std::collections::HashMap;

use bitcoin::{Amount, SignedAmount, Txid};

use crate::error::{Error, Result};
use crate::types::Transaction;

fn lookup<'a>(txid: &Txid, txs: &'a HashMap<Txid, Transaction>) -> Result<&'a Transaction> {
    txs.get(txid).ok_or(Error::UnknownTransaction(*txid))
}

/// Value of the output `vout` of `src_txid`, as spent by `spender`.
pub fn get_spent_output_value(
    src_txid: Txid,
    vout: u32,
    spender: Txid,
    txs: &HashMap<Txid, Transaction>,
) -> Result<Amount> {
    let src = txs.get(&src_txid).ok_or(Error::ReferencedTxNotFound {
        txid: src_txid,
        spender,
    })?;
    src.output_value(vout).ok_or(Error::OutputIndexOutOfRange {
        txid: src_txid,
        index: vout,
        outputs: src.vout.len(),
        spender,
    })
}

/// Sum of the values of all outputs spent by the non-coinbase inputs of `txid`.
pub fn get_tx_incoming_value(txid: &Txid, txs: &HashMap<Txid, Transaction>) -> Result<Amount> {
    let tx = lookup(txid, txs)?;
    let mut sats = 0u64;
    for (src_txid, vout) in tx.vin.iter().filter_map(|input| input.outpoint()) {
        sats += get_spent_output_value(src_txid, vout, *txid, txs)?.to_sat();
    }
    Ok(Amount::from_sat(sats))
}

/// Sum of the values of all outputs of `txid`.
pub fn get_tx_outgoing_value(txid: &Txid, txs: &HashMap<Txid, Transaction>) -> Result<Amount> {
    let tx = lookup(txid, txs)?;
    Ok(Amount::from_sat(tx.vout.iter().map(|out| out.value.to_sat()).sum()))
}

/// Fee paid by `txid`: incoming minus outgoing value.
///
/// Coinbase transactions pay no fee. The difference is signed so that an
/// inconsistent dump shows up as a negative fee instead of wrapping.
pub fn find_tx_fee(txid: &Txid, txs: &HashMap<Txid, Transaction>) -> Result<SignedAmount> {
    if lookup(txid, txs)?.is_coinbase() {
        return Ok(SignedAmount::ZERO);
    }

    let incoming = get_tx_incoming_value(txid, txs)?;
    let outgoing = get_tx_outgoing_value(txid, txs)?;
    Ok(SignedAmount::from_sat(incoming.to_sat() as i64 - outgoing.to_sat() as i64))
}

/// Fee rate in sat/vbyte, using the raw size when the dump has no vsize.
pub fn feerate(tx: &Transaction, fee: SignedAmount) -> f64 {
    fee.to_sat() as f64 / tx.vsize_or_size().max(1) as f64
}
