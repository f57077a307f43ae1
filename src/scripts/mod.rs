pub mod disassembler;
pub mod htlc;

pub use disassembler::{decode_script, script_asm, ScriptDecodeError, Token};
pub use htlc::{claim_path, get_htlc_expiration_height, is_htlc_script};
