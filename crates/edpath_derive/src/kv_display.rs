use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::{Data, DeriveInput, Fields, Ident, LitStr, parse_macro_input, spanned::Spanned};

pub fn derive_kv_display_inner(item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    let struct_ident = input.ident.clone();

    let Data::Struct(data_struct) = &input.data else {
        return syn::Error::new(input.span(), "KvDisplay can only be derived for structs")
            .to_compile_error()
            .into();
    };

    let Fields::Named(fields) = &data_struct.fields else {
        return syn::Error::new(input.span(), "KvDisplay requires named fields")
            .to_compile_error()
            .into();
    };

    let mut keys = Vec::new();
    let mut vals = Vec::new();

    for field in &fields.named {
        let Some(field_ident) = &field.ident else {
            continue;
        };
        let mut fmt_mode = String::from("display");

        for attr in &field.attrs {
            if !attr.path().is_ident("kv") {
                continue;
            }
            let parse_result = attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("fmt") {
                    let lit: LitStr = meta.value()?.parse()?;
                    fmt_mode = lit.value();
                    return Ok(());
                }
                Err(meta.error("unsupported kv attribute; expected fmt"))
            });
            if let Err(err) = parse_result {
                return err.to_compile_error().into();
            }
        }

        let Some(val) = field_value(field_ident, &fmt_mode) else {
            return syn::Error::new(field.span(), format!("unsupported kv fmt mode: {fmt_mode}"))
                .to_compile_error()
                .into();
        };
        keys.push(field_ident.to_string());
        vals.push(val);
    }

    let width = keys.iter().map(String::len).max().unwrap_or(0);
    let key_lits: Vec<LitStr> = keys
        .iter()
        .map(|k| LitStr::new(&format!("{k:<width$}"), Span::call_site()))
        .collect();

    let expanded = quote! {
        impl std::fmt::Display for #struct_ident {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                #(
                    write!(f, "\n\t{} = {}", #key_lits, #vals)?;
                )*
                Ok(())
            }
        }
    };

    TokenStream::from(expanded)
}

/// Expression rendering one field: `display` (default), `path` or `list`.
fn field_value(ident: &Ident, mode: &str) -> Option<TokenStream2> {
    let expr = match mode {
        "display" => quote! { self.#ident.to_string() },
        "path" => quote! { self.#ident.display().to_string() },
        "list" => quote! {
            if self.#ident.is_empty() {
                String::from("-")
            } else {
                self.#ident
                    .iter()
                    .map(|v| v.to_string())
                    .collect::<Vec<_>>()
                    .join(",")
            }
        },
        _ => return None,
    };
    Some(expr)
}
