use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{
    Attribute, Data, DeriveInput, Error, Expr, ExprLit, Field, Fields, Ident, Lit, LitStr,
    Result, Type,
    parse::{Parse, ParseStream},
};

pub(crate) fn expand_slot_table(input: &DeriveInput) -> Result<TokenStream> {
    let Data::Struct(data) = &input.data else {
        Err(Error::new_spanned(
            input,
            "`SlotTable` may only be derived on structs.",
        ))?
    };

    let Fields::Named(fields) = &data.fields else {
        Err(Error::new_spanned(
            input,
            "`SlotTable` may only be derived on structs with named fields.",
        ))?
    };

    if !input.generics.params.is_empty() {
        Err(Error::new_spanned(
            &input.generics,
            "`SlotTable` may not be derived on generic structs.",
        ))?
    }

    if !is_repr_c(&input.attrs)? {
        Err(Error::new_spanned(
            &input.ident,
            "`SlotTable` requires `#[repr(C)]` so that offsets are stable.",
        ))?
    }

    let fields = fields
        .named
        .iter()
        .map(FieldMetadata::parse)
        .map(Result::transpose)
        .flatten() // Skip fields marked `#[slot(skip)]`.
        .collect::<Result<Vec<_>>>()?;

    let name = &input.ident;

    let constants = fields.iter().map(|field| {
        let FieldMetadata {
            name: field_name,
            constant,
            label,
            ty,
        } = field;

        let doc = format!("Slot of the `{field_name}` field.");

        quote! {
            #[doc = #doc]
            pub const #constant: Slot = Slot::new(
                #label,
                ::core::mem::offset_of!(#name, #field_name),
                ::core::mem::size_of::<#ty>(),
            );
        }
    });

    let entries = fields.iter().map(|field| {
        let constant = &field.constant;
        quote! { Self::#constant }
    });

    let expanded = quote! {
        impl #name {
            #(#constants)*
        }

        impl SlotTable for #name {
            const SLOTS: &'static [Slot] = &[#(#entries),*];
        }
    };

    Ok(expanded.into())
}

fn is_repr_c(attrs: &[Attribute]) -> Result<bool> {
    for attr in attrs.iter().filter(|a| a.path().is_ident("repr")) {
        let list = attr.meta.require_list()?;

        // Top-level idents only; `align(N)` and friends carry nested groups.
        if list.tokens.clone().into_iter().any(|t| t.to_string() == "C") {
            return Ok(true);
        }
    }

    Ok(false)
}

#[derive(Debug)]
struct FieldMetadata {
    name: Ident,
    constant: Ident,
    label: LitStr,
    ty: Type,
}

impl FieldMetadata {
    fn parse(field: &Field) -> Result<Option<Self>> {
        let name = field.ident.clone().unwrap();

        let attribute = match field.attrs.iter().find(|a| a.path().is_ident("slot")) {
            Some(attr) => attr.meta.require_list()?.parse_args()?,
            None => SlotAttribute::Label(None),
        };

        let label = match attribute {
            SlotAttribute::Skip => return Ok(None),
            SlotAttribute::Label(Some(label)) => label,
            SlotAttribute::Label(None) => LitStr::new(&name.to_string(), name.span()),
        };

        let constant = format_ident!("{}", name.to_string().to_uppercase());

        Ok(Some(Self {
            name,
            constant,
            label,
            ty: field.ty.clone(),
        }))
    }
}

#[derive(Debug)]
enum SlotAttribute {
    Skip,
    Label(Option<LitStr>),
}

impl Parse for SlotAttribute {
    fn parse(input: ParseStream) -> Result<Self> {
        match input.parse::<Expr>()? {
            Expr::Path(path) if path.path.is_ident("skip") => Ok(Self::Skip),
            Expr::Lit(ExprLit {
                lit: Lit::Str(label),
                ..
            }) => Ok(Self::Label(Some(label))),
            other => Err(Error::new_spanned(
                other,
                "Slot attribute must be a string literal label or `skip`.",
            )),
        }
    }
}
