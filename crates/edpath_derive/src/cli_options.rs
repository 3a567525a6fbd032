use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::{Data, DeriveInput, Fields, LitStr, Path, Type, parse_macro_input, spanned::Spanned};

use crate::utils;

struct UsageLine {
    flag: String,
    summary: String,
}

pub fn derive_cli_options_inner(item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    let struct_ident = input.ident.clone();

    let Data::Struct(data_struct) = &input.data else {
        return syn::Error::new(input.span(), "CliOptions can only be derived for structs")
            .to_compile_error()
            .into();
    };

    let Fields::Named(fields) = &data_struct.fields else {
        return syn::Error::new(input.span(), "CliOptions requires named fields")
            .to_compile_error()
            .into();
    };

    let mut arms = Vec::new();
    let mut usage = Vec::new();

    for field in &fields.named {
        let Some(field_ident) = &field.ident else {
            continue;
        };

        let mut long_name: Option<String> = None;
        let mut parse_with: Option<Path> = None;
        let mut value_hint: Option<String> = None;

        for attr in &field.attrs {
            if !attr.path().is_ident("cli") {
                continue;
            }
            let parse_result = attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("long") {
                    let lit: LitStr = meta.value()?.parse()?;
                    long_name = Some(lit.value());
                    return Ok(());
                }
                if meta.path.is_ident("parse_with") {
                    let lit: LitStr = meta.value()?.parse()?;
                    parse_with = Some(syn::parse_str(&lit.value())?);
                    return Ok(());
                }
                if meta.path.is_ident("value") {
                    let lit: LitStr = meta.value()?.parse()?;
                    value_hint = Some(lit.value());
                    return Ok(());
                }
                Err(meta.error("unsupported cli attribute; expected long/parse_with/value"))
            });
            if let Err(err) = parse_result {
                return err.to_compile_error().into();
            }
        }

        let Some(long_name) = long_name else {
            continue;
        };
        let summary = utils::doc_summary(&field.attrs);
        let long_name_lit = LitStr::new(&long_name, Span::call_site());

        if utils::is_bool(&field.ty) {
            let negated = format!("no-{long_name}");
            let negated_lit = LitStr::new(&negated, Span::call_site());
            arms.push(quote! {
                #long_name_lit => {
                    self.#field_ident = match value.as_deref() {
                        Some(raw) => Self::parse_cli_flag(name, raw)?,
                        None => true,
                    };
                    Ok(true)
                }
            });
            arms.push(quote! {
                #negated_lit => {
                    if value.is_some() {
                        return Err(crate::Error::invalid_input(format!(
                            "Flag --{name} does not take a value"
                        )));
                    }
                    self.#field_ident = false;
                    Ok(true)
                }
            });
            usage.push(UsageLine {
                flag: format!("--{long_name}[=<bool>]"),
                summary,
            });
            usage.push(UsageLine {
                flag: format!("--{negated}"),
                summary: String::new(),
            });
            continue;
        }

        let assign = if let Some(inner) = utils::inner_of_vec(&field.ty) {
            let parse_expr = utils::build_cli_parse_expr(inner, parse_with.as_ref());
            quote! {
                let mut parsed = Vec::new();
                for raw in joined.split(',').map(str::trim).filter(|s| !s.is_empty()) {
                    parsed.push(#parse_expr);
                }
                self.#field_ident = parsed;
            }
        } else if let Some(inner) = utils::inner_of_option(&field.ty) {
            let parse_expr = utils::build_cli_parse_expr(inner, parse_with.as_ref());
            quote! {
                let raw = joined;
                self.#field_ident = Some(#parse_expr);
            }
        } else {
            let parse_expr = utils::build_cli_parse_expr(&field.ty, parse_with.as_ref());
            quote! {
                let raw = joined;
                self.#field_ident = #parse_expr;
            }
        };

        arms.push(quote! {
            #long_name_lit => {
                let joined: &str = value.as_deref().ok_or_else(|| {
                    crate::Error::invalid_input(format!("Missing value for --{name}"))
                })?;
                #assign
                Ok(true)
            }
        });

        let hint = value_hint.unwrap_or_else(|| default_hint(&field.ty));
        usage.push(UsageLine {
            flag: format!("--{long_name} <{hint}>"),
            summary,
        });
    }

    let usage_lit = LitStr::new(&render_usage(&usage), Span::call_site());

    let expanded = quote! {
        impl #struct_ident {
            fn split_arg(
                raw_name: &str,
                args: &mut std::iter::Peekable<impl Iterator<Item = String>>,
            ) -> (String, Option<String>) {
                if let Some((k, v)) = raw_name.split_once('=') {
                    return (k.to_string(), Some(v.to_string()));
                }

                let value = match args.peek() {
                    Some(next) if !next.starts_with("--") => args.next(),
                    _ => None,
                };

                (raw_name.to_string(), value)
            }

            fn parse_cli_flag(name: &str, raw: &str) -> crate::Result<bool> {
                match raw.trim().to_ascii_lowercase().as_str() {
                    "1" | "true" | "yes" | "on" => Ok(true),
                    "0" | "false" | "no" | "off" => Ok(false),
                    _ => Err(crate::Error::invalid_input(format!(
                        "Invalid boolean for --{name}: {raw} (expected true/false)"
                    ))),
                }
            }

            fn apply_cli_option(
                &mut self,
                name: &str,
                value: Option<String>,
            ) -> crate::Result<bool> {
                match name {
                    #(#arms,)*
                    _ => Ok(false),
                }
            }

            /// One line per option, generated from the field docs.
            pub fn cli_usage() -> &'static str {
                #usage_lit
            }
        }
    };

    TokenStream::from(expanded)
}

fn default_hint(ty: &Type) -> String {
    let ty = utils::inner_of_option(ty)
        .or_else(|| utils::inner_of_vec(ty))
        .unwrap_or(ty);
    match ty {
        Type::Path(p) => p
            .path
            .segments
            .last()
            .map(|seg| seg.ident.to_string().to_ascii_lowercase())
            .unwrap_or_else(|| "value".to_string()),
        _ => "value".to_string(),
    }
}

fn render_usage(lines: &[UsageLine]) -> String {
    let width = lines.iter().map(|l| l.flag.len()).max().unwrap_or(0);
    lines
        .iter()
        .map(|l| {
            if l.summary.is_empty() {
                format!("  {}\n", l.flag)
            } else {
                format!("  {:<width$}  {}\n", l.flag, l.summary)
            }
        })
        .collect()
}
