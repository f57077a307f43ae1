use std::fmt;

/// Pushed values below this, read as little-endian integers, render in decimal.
/// Heights, expiries and small constants fall under it; keys and hashes do not.
pub const DECIMAL_RENDER_LIMIT: u64 = 1_000_000;

const OP_PUSHDATA1: u8 = 0x4c;
const OP_PUSHDATA2: u8 = 0x4d;
const OP_PUSHDATA4: u8 = 0x4e;
const OP_1: u8 = 0x51;
const OP_16: u8 = 0x60;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScriptDecodeError {
    #[error("invalid script hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
    #[error("push at offset {offset} needs {needed} bytes, only {available} left")]
    TruncatedPush {
        offset: usize,
        needed: usize,
        available: usize,
    },
    #[error("push length of opcode at offset {offset} is truncated")]
    TruncatedPushLength { offset: usize },
}

/// One element of a disassembled script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Any non-push opcode. OP_1..OP_16 are kept as opcodes but render as numbers.
    Opcode(u8),
    /// Bytes pushed by OP_0, a direct push or one of the OP_PUSHDATAn opcodes.
    PushData(Vec<u8>),
}

impl Token {
    /// The token's value when it renders as a decimal number.
    pub fn as_number(&self) -> Option<u64> {
        match self {
            Token::Opcode(op @ OP_1..=OP_16) => Some(u64::from(op - OP_1 + 1)),
            Token::Opcode(_) => None,
            Token::PushData(bytes) => small_le_number(bytes),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(n) = self.as_number() {
            return write!(f, "{}", n);
        }
        match self {
            Token::Opcode(op) => match opcode_name(*op) {
                Some(name) => f.write_str(name),
                None => write!(f, "OP_UNKNOWN_{:#04x}", op),
            },
            Token::PushData(bytes) => f.write_str(&hex::encode(bytes)),
        }
    }
}

/// Reads `bytes` as a little-endian unsigned integer if it is below
/// [`DECIMAL_RENDER_LIMIT`].
fn small_le_number(bytes: &[u8]) -> Option<u64> {
    let significant = bytes
        .iter()
        .rposition(|b| *b != 0)
        .map_or(0, |last| last + 1);
    // 1_000_000 needs three bytes, so anything wider is out of range.
    if significant > 3 {
        return None;
    }
    let n = bytes[..significant]
        .iter()
        .rev()
        .fold(0u64, |acc, b| (acc << 8) | u64::from(*b));
    (n < DECIMAL_RENDER_LIMIT).then_some(n)
}

/// Splits a hex-encoded script into opcode and push-data tokens.
///
/// Only push boundaries are validated. The script is never executed, so
/// disabled or unknown opcodes still tokenize.
pub fn decode_script(script_hex: &str) -> Result<Vec<Token>, ScriptDecodeError> {
    let script = hex::decode(script_hex)?;
    decode_script_bytes(&script)
}

pub fn decode_script_bytes(script: &[u8]) -> Result<Vec<Token>, ScriptDecodeError> {
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < script.len() {
        let offset = pos;
        let op = script[pos];
        pos += 1;

        let push_len = match op {
            0x00..=0x4b => op as usize,
            OP_PUSHDATA1 => read_push_len(script, &mut pos, 1, offset)?,
            OP_PUSHDATA2 => read_push_len(script, &mut pos, 2, offset)?,
            OP_PUSHDATA4 => read_push_len(script, &mut pos, 4, offset)?,
            _ => {
                tokens.push(Token::Opcode(op));
                continue;
            }
        };

        let available = script.len() - pos;
        if push_len > available {
            return Err(ScriptDecodeError::TruncatedPush {
                offset,
                needed: push_len,
                available,
            });
        }
        tokens.push(Token::PushData(script[pos..pos + push_len].to_vec()));
        pos += push_len;
    }

    Ok(tokens)
}

fn read_push_len(
    script: &[u8],
    pos: &mut usize,
    width: usize,
    offset: usize,
) -> Result<usize, ScriptDecodeError> {
    let Some(raw) = script.get(*pos..*pos + width) else {
        return Err(ScriptDecodeError::TruncatedPushLength { offset });
    };
    *pos += width;
    Ok(raw
        .iter()
        .rev()
        .fold(0usize, |acc, b| (acc << 8) | usize::from(*b)))
}

/// Renders every token, space separated, like `bitcoin-cli decodescript` asm.
pub fn script_asm(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Bitcoin Core opcode names for every non-push opcode.
pub fn opcode_name(op: u8) -> Option<&'static str> {
    let name = match op {
        0x4f => "OP_1NEGATE",
        0x50 => "OP_RESERVED",
        0x61 => "OP_NOP",
        0x62 => "OP_VER",
        0x63 => "OP_IF",
        0x64 => "OP_NOTIF",
        0x65 => "OP_VERIF",
        0x66 => "OP_VERNOTIF",
        0x67 => "OP_ELSE",
        0x68 => "OP_ENDIF",
        0x69 => "OP_VERIFY",
        0x6a => "OP_RETURN",
        0x6b => "OP_TOALTSTACK",
        0x6c => "OP_FROMALTSTACK",
        0x6d => "OP_2DROP",
        0x6e => "OP_2DUP",
        0x6f => "OP_3DUP",
        0x70 => "OP_2OVER",
        0x71 => "OP_2ROT",
        0x72 => "OP_2SWAP",
        0x73 => "OP_IFDUP",
        0x74 => "OP_DEPTH",
        0x75 => "OP_DROP",
        0x76 => "OP_DUP",
        0x77 => "OP_NIP",
        0x78 => "OP_OVER",
        0x79 => "OP_PICK",
        0x7a => "OP_ROLL",
        0x7b => "OP_ROT",
        0x7c => "OP_SWAP",
        0x7d => "OP_TUCK",
        0x7e => "OP_CAT",
        0x7f => "OP_SUBSTR",
        0x80 => "OP_LEFT",
        0x81 => "OP_RIGHT",
        0x82 => "OP_SIZE",
        0x83 => "OP_INVERT",
        0x84 => "OP_AND",
        0x85 => "OP_OR",
        0x86 => "OP_XOR",
        0x87 => "OP_EQUAL",
        0x88 => "OP_EQUALVERIFY",
        0x89 => "OP_RESERVED1",
        0x8a => "OP_RESERVED2",
        0x8b => "OP_1ADD",
        0x8c => "OP_1SUB",
        0x8d => "OP_2MUL",
        0x8e => "OP_2DIV",
        0x8f => "OP_NEGATE",
        0x90 => "OP_ABS",
        0x91 => "OP_NOT",
        0x92 => "OP_0NOTEQUAL",
        0x93 => "OP_ADD",
        0x94 => "OP_SUB",
        0x95 => "OP_MUL",
        0x96 => "OP_DIV",
        0x97 => "OP_MOD",
        0x98 => "OP_LSHIFT",
        0x99 => "OP_RSHIFT",
        0x9a => "OP_BOOLAND",
        0x9b => "OP_BOOLOR",
        0x9c => "OP_NUMEQUAL",
        0x9d => "OP_NUMEQUALVERIFY",
        0x9e => "OP_NUMNOTEQUAL",
        0x9f => "OP_LESSTHAN",
        0xa0 => "OP_GREATERTHAN",
        0xa1 => "OP_LESSTHANOREQUAL",
        0xa2 => "OP_GREATERTHANOREQUAL",
        0xa3 => "OP_MIN",
        0xa4 => "OP_MAX",
        0xa5 => "OP_WITHIN",
        0xa6 => "OP_RIPEMD160",
        0xa7 => "OP_SHA1",
        0xa8 => "OP_SHA256",
        0xa9 => "OP_HASH160",
        0xaa => "OP_HASH256",
        0xab => "OP_CODESEPARATOR",
        0xac => "OP_CHECKSIG",
        0xad => "OP_CHECKSIGVERIFY",
        0xae => "OP_CHECKMULTISIG",
        0xaf => "OP_CHECKMULTISIGVERIFY",
        0xb0 => "OP_NOP1",
        0xb1 => "OP_CHECKLOCKTIMEVERIFY",
        0xb2 => "OP_CHECKSEQUENCEVERIFY",
        0xb3 => "OP_NOP4",
        0xb4 => "OP_NOP5",
        0xb5 => "OP_NOP6",
        0xb6 => "OP_NOP7",
        0xb7 => "OP_NOP8",
        0xb8 => "OP_NOP9",
        0xb9 => "OP_NOP10",
        0xba => "OP_CHECKSIGADD",
        0xff => "OP_INVALIDOPCODE",
        _ => return None,
    };
    Some(name)
}
