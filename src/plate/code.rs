// ============================================================
// Layer 5 - Plate Code Generator
// ============================================================
// Samples a plate code from a template: every position is drawn
// independently and uniformly from the character set of the class
// at that position. No memoisation and no uniqueness guarantee.

use rand::Rng;

use crate::domain::{
    error::PlateError,
    symbol::{SymbolClass, Template},
};

/// Generate a code for `template`, or for the default "LLDDSLLL"
/// template when None.
pub fn generate_code<R: Rng + ?Sized>(template: Option<&Template>, rng: &mut R) -> String {
    match template {
        Some(t) => sample(t, rng),
        None => sample(&Template::default(), rng),
    }
}

/// Parse `tags` and generate one code from it.
pub fn generate_code_str<R: Rng + ?Sized>(tags: &str, rng: &mut R) -> Result<String, PlateError> {
    let template = Template::parse(tags)?;
    Ok(sample(&template, rng))
}

fn sample<R: Rng + ?Sized>(template: &Template, rng: &mut R) -> String {
    template
        .classes()
        .iter()
        .map(|&class| sample_symbol(class, rng))
        .collect()
}

fn sample_symbol<R: Rng + ?Sized>(class: SymbolClass, rng: &mut R) -> char {
    let charset = class.charset().as_bytes();
    char::from(charset[rng.gen_range(0..charset.len())])
}
