use log::debug;

use crate::error::{Error, Result};
use crate::scripts::disassembler::{decode_script, opcode_name, Token};
use crate::types::{BlockHeight, HtlcClaimPath};

/// One position of the HTLC witness-script template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// A literal opcode, compared by name.
    Op(&'static str),
    /// A small number, pushed or as OP_1..OP_16.
    Num(u64),
    /// Any single token. The label names what BOLT 3 puts there.
    Any(&'static str),
}

/// BOLT 3 received-HTLC output script.
///
/// ```text
/// OP_DUP OP_HASH160 <RIPEMD160(SHA256(revocationpubkey))> OP_EQUAL
/// OP_IF
///     OP_CHECKSIG
/// OP_ELSE
///     <remote_htlcpubkey> OP_SWAP OP_SIZE 32 OP_EQUAL
///     OP_IF
///         OP_HASH160 <RIPEMD160(payment_hash)> OP_EQUALVERIFY
///         2 OP_SWAP <local_htlcpubkey> 2 OP_CHECKMULTISIG
///     OP_ELSE
///         OP_DROP <cltv_expiry> OP_CHECKLOCKTIMEVERIFY OP_DROP
///         OP_CHECKSIG
///     OP_ENDIF
/// OP_ENDIF
/// ```
pub const HTLC_SCRIPT_TEMPLATE: [Slot; 29] = [
    Slot::Op("OP_DUP"),
    Slot::Op("OP_HASH160"),
    Slot::Any("revocation_pubkey_hash"),
    Slot::Op("OP_EQUAL"),
    Slot::Op("OP_IF"),
    Slot::Op("OP_CHECKSIG"),
    Slot::Op("OP_ELSE"),
    Slot::Any("remote_htlcpubkey"),
    Slot::Op("OP_SWAP"),
    Slot::Op("OP_SIZE"),
    Slot::Num(32),
    Slot::Op("OP_EQUAL"),
    Slot::Op("OP_IF"),
    Slot::Op("OP_HASH160"),
    Slot::Any("payment_hash160"),
    Slot::Op("OP_EQUALVERIFY"),
    Slot::Num(2),
    Slot::Op("OP_SWAP"),
    Slot::Any("local_htlcpubkey"),
    Slot::Num(2),
    Slot::Op("OP_CHECKMULTISIG"),
    Slot::Op("OP_ELSE"),
    Slot::Op("OP_DROP"),
    Slot::Any("cltv_expiry"),
    Slot::Op("OP_CHECKLOCKTIMEVERIFY"),
    Slot::Op("OP_DROP"),
    Slot::Op("OP_CHECKSIG"),
    Slot::Op("OP_ENDIF"),
    Slot::Op("OP_ENDIF"),
];

/// Position of `<cltv_expiry>` in [`HTLC_SCRIPT_TEMPLATE`].
pub const CLTV_EXPIRY_SLOT: usize = 23;

/// Legacy names an opcode may be disassembled under.
const OPCODE_ALIASES: &[(&str, &str)] = &[
    ("OP_CHECKLOCKTIMEVERIFY", "OP_NOP2"),
    ("OP_CHECKSEQUENCEVERIFY", "OP_NOP3"),
];

pub(crate) fn opcode_matches(expected: &str, actual: &str) -> bool {
    expected == actual
        || OPCODE_ALIASES
            .iter()
            .any(|(name, alias)| *name == expected && *alias == actual)
}

impl Slot {
    pub fn matches(&self, token: &Token) -> bool {
        match (self, token) {
            (Slot::Any(_), _) => true,
            (Slot::Num(n), token) => token.as_number() == Some(*n),
            (Slot::Op(name), Token::Opcode(op)) if token.as_number().is_none() => {
                opcode_name(*op).map_or(false, |actual| opcode_matches(name, actual))
            }
            (Slot::Op(_), _) => false,
        }
    }
}

/// True iff `tokens` has exactly the template's length and every slot matches.
pub fn matches_htlc_template(tokens: &[Token]) -> bool {
    tokens.len() == HTLC_SCRIPT_TEMPLATE.len()
        && HTLC_SCRIPT_TEMPLATE
            .iter()
            .zip(tokens)
            .all(|(slot, token)| slot.matches(token))
}

/// Whether `script_hex` is a BOLT 3 received-HTLC script.
/// Undecodable scripts are simply not HTLC scripts.
pub fn is_htlc_script(script_hex: &str) -> bool {
    match decode_script(script_hex) {
        Ok(tokens) => matches_htlc_template(&tokens),
        Err(e) => {
            debug!("not an htlc script, decode failed: {}", e);
            false
        }
    }
}

/// The `<cltv_expiry>` of an HTLC script.
pub fn get_htlc_expiration_height(script_hex: &str) -> Result<BlockHeight> {
    let tokens = decode_script(script_hex)?;
    if !matches_htlc_template(&tokens) {
        return Err(Error::NotAnHtlcScript);
    }

    let expiry = &tokens[CLTV_EXPIRY_SLOT];
    expiry
        .as_number()
        .and_then(|n| BlockHeight::try_from(n).ok())
        .ok_or_else(|| Error::NonNumericExpiry(expiry.to_string()))
}

/// Reads the spending path off an HTLC witness stack
/// (`... <selector> <witness_script>`).
///
/// The element right before the script tells the paths apart: a 32-byte
/// payment preimage, an empty vector for the timeout branch, or the 33-byte
/// revocation pubkey.
pub fn claim_path(witness: &[String]) -> Option<HtlcClaimPath> {
    let [.., selector, script] = witness else {
        return None;
    };
    if !is_htlc_script(script) {
        return None;
    }

    // hex, two chars per byte
    match selector.len() / 2 {
        32 => Some(HtlcClaimPath::Success),
        0 => Some(HtlcClaimPath::Timeout),
        33 => Some(HtlcClaimPath::Revocation),
        _ => None,
    }
}
