use htlc_forensics::scripts::disassembler::{decode_script, script_asm};
use htlc_forensics::scripts::htlc::{get_htlc_expiration_height, matches_htlc_template};
use htlc_forensics::Result;

pub fn run_decode(script_hex: &str) -> Result<()> {
    let tokens = decode_script(script_hex)?;

    println!("\nTokens ({}):", tokens.len());
    for (i, token) in tokens.iter().enumerate() {
        println!("  {:>2}: {}", i, token);
    }
    println!("\nAsm: {}", script_asm(&tokens));

    if matches_htlc_template(&tokens) {
        println!("\nHTLC script, cltv_expiry = {}", get_htlc_expiration_height(script_hex)?);
    }
    println!();
    Ok(())
}

pub fn run_is_htlc(script_hex: &str) -> Result<()> {
    let tokens = decode_script(script_hex)?;
    println!("{}", matches_htlc_template(&tokens));
    Ok(())
}
