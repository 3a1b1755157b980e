use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod slot_table;

#[proc_macro_derive(SlotTable, attributes(slot))]
pub fn derive_slot_table(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match slot_table::expand_slot_table(&input) {
        Ok(tokens) => tokens,
        Err(err) => err.to_compile_error().into(),
    }
}
