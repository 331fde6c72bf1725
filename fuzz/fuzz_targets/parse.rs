#![no_main]

use libfuzzer_sys::fuzz_target;
use stex_syntax::{lexer, parser};
use stexls::frontend::compiler;
use stexls::frontend::location::FileId;

fuzz_target!(|data: &[u8]| {
    // Convert bytes to UTF-8 string (ignore invalid UTF-8)
    if let Ok(s) = std::str::from_utf8(data) {
        let tokens = lexer::lex(s);
        let _ = parser::parse(&tokens);
        // The compiler re-lexes; it must hold up on anything the parser accepts.
        let _ = compiler::compile(&FileId::new("fuzz", "", "input"), s);
    }
});
