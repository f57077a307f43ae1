use crate::scripts::disassembler::*;

fn rendered(script_hex: &str) -> Vec<String> {
    decode_script(script_hex)
        .unwrap()
        .iter()
        .map(ToString::to_string)
        .collect()
}

#[test]
fn test_decode_p2pkh_script() {
    // OP_DUP OP_HASH160 <20 bytes> OP_EQUALVERIFY OP_CHECKSIG
    let hash = "89abcdefabbaabbaabbaabbaabbaabbaabbaabba";
    let script_hex = format!("76a914{}88ac", hash);

    assert_eq!(
        rendered(&script_hex),
        vec!["OP_DUP", "OP_HASH160", hash, "OP_EQUALVERIFY", "OP_CHECKSIG"],
        "P2PKH script should tokenize into five tokens"
    );
}

#[test]
fn test_small_pushes_render_as_decimal() {
    // 0x20 -> 32, 0xc800 -> 200 (little endian), 0x3f420f -> 999_999
    assert_eq!(rendered("0120"), vec!["32"]);
    assert_eq!(rendered("02c800"), vec!["200"]);
    assert_eq!(rendered("033f420f"), vec!["999999"]);
}

#[test]
fn test_large_pushes_render_as_hex() {
    // 1_000_000 = 0x0f4240 is the first value rendered as hex
    assert_eq!(rendered("0340420f"), vec!["40420f"]);
    assert_eq!(rendered("04ffffffff"), vec!["ffffffff"]);
}

#[test]
fn test_trailing_zero_bytes_do_not_make_a_number_large() {
    // little endian: high zero bytes do not change the value
    assert_eq!(rendered("050700000000"), vec!["7"]);
}

#[test]
fn test_small_int_opcodes_render_as_numbers() {
    // OP_0 OP_1 OP_2 OP_16 OP_1NEGATE
    assert_eq!(rendered("005152604f"), vec!["0", "1", "2", "16", "OP_1NEGATE"]);
}

#[test]
fn test_cltv_and_csv_names() {
    assert_eq!(
        rendered("b1b2"),
        vec!["OP_CHECKLOCKTIMEVERIFY", "OP_CHECKSEQUENCEVERIFY"]
    );
}

#[test]
fn test_unknown_opcode_still_tokenizes() {
    let tokens = decode_script("bb").unwrap();
    assert_eq!(tokens, vec![Token::Opcode(0xbb)]);
    assert_eq!(tokens[0].to_string(), "OP_UNKNOWN_0xbb");
}

#[test]
fn test_pushdata_opcodes() {
    let data = "ab".repeat(80);

    // OP_PUSHDATA1 <80>
    let tokens = decode_script(&format!("4c50{}", data)).unwrap();
    assert_eq!(tokens, vec![Token::PushData(vec![0xab; 80])]);

    // OP_PUSHDATA2 <80, little endian>
    let tokens = decode_script(&format!("4d5000{}", data)).unwrap();
    assert_eq!(tokens, vec![Token::PushData(vec![0xab; 80])]);

    // OP_PUSHDATA4 <80, little endian>
    let tokens = decode_script(&format!("4e50000000{}ac", data)).unwrap();
    assert_eq!(
        tokens,
        vec![Token::PushData(vec![0xab; 80]), Token::Opcode(0xac)]
    );
}

#[test]
fn test_empty_script() {
    assert_eq!(decode_script("").unwrap(), Vec::<Token>::new());
}

#[test]
fn test_truncated_push_fails() {
    // claims 20 bytes, has 2
    let err = decode_script("14abcd").unwrap_err();
    assert_eq!(
        err,
        ScriptDecodeError::TruncatedPush {
            offset: 0,
            needed: 20,
            available: 2
        }
    );
}

#[test]
fn test_truncated_push_length_fails() {
    // OP_PUSHDATA2 with a single length byte
    let err = decode_script("ac4d01").unwrap_err();
    assert_eq!(err, ScriptDecodeError::TruncatedPushLength { offset: 1 });
}

#[test]
fn test_invalid_hex_fails() {
    assert!(matches!(
        decode_script("zz"),
        Err(ScriptDecodeError::InvalidHex(_))
    ));
    assert_eq!(
        decode_script("abc").unwrap_err(),
        ScriptDecodeError::InvalidHex(hex::FromHexError::OddLength)
    );
}

#[test]
fn test_script_asm_joins_tokens() {
    let tokens = decode_script("5221aa").unwrap_err();
    // 0x21 pushes 33 bytes, only one present
    assert!(matches!(tokens, ScriptDecodeError::TruncatedPush { .. }));

    let tokens = decode_script("5287").unwrap();
    assert_eq!(script_asm(&tokens), "2 OP_EQUAL");
}
